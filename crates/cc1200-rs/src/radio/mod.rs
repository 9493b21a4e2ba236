//! A module to encapsulate all things related to radio operation.
pub mod prelude;

mod cc1200;
pub use cc1200::{
    access, commands, fifo_headers, hardware_reset, mnemonics, registers, Cc1200Error,
    RegisterAddress, CC1200,
};

mod config;
pub use config::{RadioConfig, RegisterSetting, DEFAULT_SETTINGS};
