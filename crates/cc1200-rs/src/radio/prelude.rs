//! This module defines the generic traits that may
//! need to imported to use radio implementations.
//!
//! Since rustc only compiles objects that are used,
//! it is convenient to import these traits with the `*` syntax.
//!
//! ```
//! use cc1200::radio::prelude::*;
//! ```

use crate::{
    packet::{Packet, RxOutcome},
    types::{ChipState, ChipStatus},
};

use super::RadioConfig;

/// A trait to represent raw access to the transceiver's register file.
pub trait CcRegisters {
    type RegisterErrorType;

    /// Burst read `buf.len()` consecutive registers starting at `address`.
    ///
    /// The upper byte of `address` selects the address space:
    /// `0x00` for the short space and `0x2F` for the extended space.
    ///
    /// Short space offsets `0x3F` and above belong to the FIFOs, offset `0x2F` is the
    /// extended space prefix and `0x30..=0x3E` are command strobes.
    /// Such addresses are rejected without any SPI traffic, as are bursts
    /// longer than the driver's SPI buffer.
    fn read_register(&mut self, address: u16, buf: &mut [u8])
        -> Result<(), Self::RegisterErrorType>;

    /// Burst write `buf` to consecutive registers starting at `address`.
    ///
    /// Address validation follows [`CcRegisters::read_register()`].
    fn write_register(&mut self, address: u16, buf: &[u8]) -> Result<(), Self::RegisterErrorType>;

    /// Read a single register.
    fn read_register_byte(&mut self, address: u16) -> Result<u8, Self::RegisterErrorType> {
        let mut buf = [0u8];
        self.read_register(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single register and read it back.
    ///
    /// Returns `true` if the register reads back as written.
    fn write_verified(&mut self, address: u16, value: u8) -> Result<bool, Self::RegisterErrorType> {
        self.write_register(address, &[value])?;
        Ok(self.read_register_byte(address)? == value)
    }
}

/// A trait to represent the command strobes and state graph of the transceiver.
pub trait CcState {
    type StateErrorType;

    /// Send a single byte command strobe.
    ///
    /// Returns the status byte clocked out while the strobe was sent
    /// (which describes the chip before the command took effect).
    fn strobe(&mut self, command: u8) -> Result<ChipStatus, Self::StateErrorType>;

    /// Get the [`ChipStatus`] cached from the latest SPI transaction.
    fn get_status(&self) -> ChipStatus;

    /// Fetch the chip's current state with a no-op strobe.
    fn get_state(&mut self) -> Result<ChipState, Self::StateErrorType>;

    /// Walk the chip's state graph until it reports `target`.
    ///
    /// Only [stable states](fn@crate::ChipState::is_stable) are valid targets.
    /// While calibrating or settling, the chip is re-polled every 50 microseconds.
    /// A FIFO error state is cleared by flushing the offending FIFO.
    ///
    /// Gives up once the implementation's deadline has elapsed.
    fn set_state(&mut self, target: ChipState) -> Result<ChipState, Self::StateErrorType>;

    /// Calibrate the frequency synthesizer.
    ///
    /// The chip is put in [`ChipState::Idle`] first.
    fn calibrate(&mut self) -> Result<(), Self::StateErrorType>;
}

/// A trait to represent the transceiver's TX and RX FIFOs.
pub trait CcFifo {
    type FifoErrorType;

    /// Number of bytes pending in the TX FIFO.
    fn tx_bytes(&mut self) -> Result<u8, Self::FifoErrorType>;

    /// Number of bytes pending in the RX FIFO.
    fn rx_bytes(&mut self) -> Result<u8, Self::FifoErrorType>;

    /// Discard the content of the TX FIFO.
    fn flush_tx(&mut self) -> Result<(), Self::FifoErrorType>;

    /// Discard the content of the RX FIFO.
    fn flush_rx(&mut self) -> Result<(), Self::FifoErrorType>;

    /// Go idle, flush the RX FIFO, then resume RX.
    fn clear_rx_fifo(&mut self) -> Result<(), Self::FifoErrorType>;

    /// The chip's status with the number of bytes free in the TX FIFO.
    fn tx_status(&mut self) -> Result<ChipStatus, Self::FifoErrorType>;

    /// The chip's status with the number of bytes available in the RX FIFO.
    fn rx_status(&mut self) -> Result<ChipStatus, Self::FifoErrorType>;

    /// Load `packet` into the TX FIFO as `[length][address][payload]`
    /// in a single burst.
    fn write_tx_fifo(&mut self, packet: &Packet) -> Result<(), Self::FifoErrorType>;

    /// Drain the RX FIFO and parse its content.
    ///
    /// An RX FIFO error is flushed and reported as [`RxOutcome::FifoError`].
    fn read_rx_fifo(&mut self) -> Result<RxOutcome, Self::FifoErrorType>;
}

/// A trait to represent manipulation of a channel (aka frequency)
/// for the transceiver.
pub trait CcChannel {
    type ChannelErrorType;

    /// Tune to a `channel` in range [0, 30].
    ///
    /// Channels are spaced 200 kHz apart, starting at 863.4 MHz.
    /// Returns `true` if the frequency registers read back as written.
    fn set_channel(&mut self, channel: u8) -> Result<bool, Self::ChannelErrorType>;

    /// Get the channel cached from the latest call to [`CcChannel::set_channel()`].
    fn get_channel(&self) -> u8;

    /// Tune to an arbitrary carrier frequency (in Hz).
    ///
    /// Returns `true` if the frequency registers read back as written.
    fn set_frequency(&mut self, frequency: u32) -> Result<bool, Self::ChannelErrorType>;

    /// Get the carrier frequency (in Hz) from the frequency registers.
    ///
    /// The result is rounded down to the register's resolution.
    fn get_frequency(&mut self) -> Result<u32, Self::ChannelErrorType>;
}

/// A trait to represent radio operation.
pub trait CcRadio {
    type RadioErrorType;

    /// Put the chip in RX mode.
    fn listen(&mut self) -> Result<(), Self::RadioErrorType>;

    /// Transmit a `packet`.
    ///
    /// Returns `false` without touching the chip if it was put to sleep by
    /// [`CcRadio::power_down()`].
    fn send(&mut self, packet: &Packet) -> Result<bool, Self::RadioErrorType>;

    /// Put the chip to sleep.
    fn power_down(&mut self) -> Result<(), Self::RadioErrorType>;

    /// Wake the chip and leave it in [`ChipState::Idle`].
    fn power_up(&mut self) -> Result<(), Self::RadioErrorType>;

    /// Was the chip put to sleep with [`CcRadio::power_down()`]?
    fn is_asleep(&self) -> bool;

    /// Set the device address used by the chip's address filtering.
    ///
    /// Returns `true` if the register reads back as written.
    fn set_address(&mut self, address: u8) -> Result<bool, Self::RadioErrorType>;

    /// Read the current signal strength (raw, two's complement).
    fn rssi(&mut self) -> Result<i8, Self::RadioErrorType>;
}

/// A trait to represent debug output of the transceiver's configuration.
pub trait CcDetails {
    type DetailsErrorType;

    /// Print details about the radio's current configuration and state.
    ///
    /// This should only be used for debugging development.
    /// Without the `std` or `defmt` feature, this does nothing.
    fn print_details(&mut self) -> Result<(), Self::DetailsErrorType>;
}

/// A trait to represent initialization and configuration of the transceiver.
pub trait CcInit {
    type ConfigErrorType;

    /// Reset the chip with the `SRES` command.
    fn reset(&mut self) -> Result<(), Self::ConfigErrorType>;

    /// Soft reset the chip, check its part number and
    /// apply the default [`RadioConfig`].
    ///
    /// Returns the number of registers that did not read back as written.
    fn init(&mut self) -> Result<u16, Self::ConfigErrorType>;

    /// Apply all settings of `config`.
    ///
    /// Every register is read back after being written.
    /// A mismatch is logged and counted, but it does not abort the configuration.
    /// Returns the number of mismatches.
    fn with_config(&mut self, config: &RadioConfig) -> Result<u16, Self::ConfigErrorType>;
}
