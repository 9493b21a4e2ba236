#![doc = include_str!("../README.md")]
//!
//! ## Basic API
//!
//! - [`CC1200::new()`](fn@crate::radio::CC1200::new)
//! - [`CC1200::init()`](radio/struct.CC1200.html#method.init)
//! - [`CC1200::listen()`](radio/struct.CC1200.html#method.listen)
//! - [`CC1200::send()`](radio/struct.CC1200.html#method.send)
//! - [`CC1200::read_rx_fifo()`](radio/struct.CC1200.html#method.read_rx_fifo)
//! - [`CC1200::set_channel()`](radio/struct.CC1200.html#method.set_channel)
//! - [`CC1200::get_channel()`](radio/struct.CC1200.html#method.get_channel)
//! - [`CC1200::power_down()`](radio/struct.CC1200.html#method.power_down)
//! - [`CC1200::power_up()`](radio/struct.CC1200.html#method.power_up)
//!
//! ## Advanced API
//!
//! - [`CC1200::set_state()`](radio/struct.CC1200.html#method.set_state)
//! - [`CC1200::get_state()`](radio/struct.CC1200.html#method.get_state)
//! - [`CC1200::strobe()`](radio/struct.CC1200.html#method.strobe)
//! - [`CC1200::calibrate()`](radio/struct.CC1200.html#method.calibrate)
//! - [`CC1200::write_tx_fifo()`](radio/struct.CC1200.html#method.write_tx_fifo)
//! - [`CC1200::flush_rx()`](radio/struct.CC1200.html#method.flush_rx)
//! - [`CC1200::flush_tx()`](radio/struct.CC1200.html#method.flush_tx)
//! - [`CC1200::clear_rx_fifo()`](radio/struct.CC1200.html#method.clear_rx_fifo)
//! - [`CC1200::tx_status()`](radio/struct.CC1200.html#method.tx_status)
//! - [`CC1200::rx_status()`](radio/struct.CC1200.html#method.rx_status)
//! - [`CC1200::rssi()`](radio/struct.CC1200.html#method.rssi)
//! - [`CC1200::print_details()`](radio/struct.CC1200.html#method.print_details)
//! - [`CC1200::state_timeout_us`](crate::radio::CC1200::state_timeout_us)
//!
//! ## Configuration API
//!
//! - [`CC1200::with_config()`](radio/struct.CC1200.html#method.with_config)
//! - [`CC1200::reset()`](radio/struct.CC1200.html#method.reset)
//! - [`hardware_reset()`](fn@crate::radio::hardware_reset)
//! - [`CC1200::read_register()`](radio/struct.CC1200.html#method.read_register)
//! - [`CC1200::write_register()`](radio/struct.CC1200.html#method.write_register)
//! - [`CC1200::set_frequency()`](radio/struct.CC1200.html#method.set_frequency)
//! - [`CC1200::set_address()`](radio/struct.CC1200.html#method.set_address)
//!
#![no_std]

mod types;
pub use types::{ChipState, ChipStatus, LinkStatus};
mod packet;
pub use packet::{Packet, RxOutcome};
pub mod radio;

#[cfg(any(test, feature = "sim"))]
pub mod sim;
