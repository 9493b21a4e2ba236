//! This module defines types used by various traits.
//! These types are meant to be agnostic of the trait implementation.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

use bitfield_struct::bitfield;

/// The chip's state as reported in bits 6:4 of every status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChipState {
    Idle,
    Rx,
    Tx,
    /// Frequency synthesizer on, ready for a fast transition to TX.
    FastTxReady,
    /// Frequency synthesizer calibration is running.
    Calibrate,
    /// PLL is settling.
    Settling,
    /// RX FIFO has over/underflowed. Only a flush gets the chip out of this state.
    RxFifoError,
    /// TX FIFO has over/underflowed. Only a flush gets the chip out of this state.
    TxFifoError,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for ChipState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ChipState::Idle => defmt::write!(fmt, "Idle"),
            ChipState::Rx => defmt::write!(fmt, "RX"),
            ChipState::Tx => defmt::write!(fmt, "TX"),
            ChipState::FastTxReady => defmt::write!(fmt, "Fast TX ready"),
            ChipState::Calibrate => defmt::write!(fmt, "Calibrate"),
            ChipState::Settling => defmt::write!(fmt, "Settling"),
            ChipState::RxFifoError => defmt::write!(fmt, "RX FIFO error"),
            ChipState::TxFifoError => defmt::write!(fmt, "TX FIFO error"),
        }
    }
}

impl Display for ChipState {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ChipState::Idle => write!(f, "Idle"),
            ChipState::Rx => write!(f, "RX"),
            ChipState::Tx => write!(f, "TX"),
            ChipState::FastTxReady => write!(f, "Fast TX ready"),
            ChipState::Calibrate => write!(f, "Calibrate"),
            ChipState::Settling => write!(f, "Settling"),
            ChipState::RxFifoError => write!(f, "RX FIFO error"),
            ChipState::TxFifoError => write!(f, "TX FIFO error"),
        }
    }
}

impl ChipState {
    pub const fn into_bits(self) -> u8 {
        match self {
            ChipState::Idle => 0,
            ChipState::Rx => 1,
            ChipState::Tx => 2,
            ChipState::FastTxReady => 3,
            ChipState::Calibrate => 4,
            ChipState::Settling => 5,
            ChipState::RxFifoError => 6,
            ChipState::TxFifoError => 7,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & 7 {
            0 => ChipState::Idle,
            1 => ChipState::Rx,
            2 => ChipState::Tx,
            3 => ChipState::FastTxReady,
            4 => ChipState::Calibrate,
            5 => ChipState::Settling,
            6 => ChipState::RxFifoError,
            _ => ChipState::TxFifoError,
        }
    }

    /// Is this a state that [`set_state()`](fn@crate::radio::prelude::CcState::set_state)
    /// can settle in?
    ///
    /// Calibration, settling and the FIFO error states are only ever transient.
    pub const fn is_stable(self) -> bool {
        matches!(
            self,
            ChipState::Idle | ChipState::Rx | ChipState::Tx | ChipState::FastTxReady
        )
    }
}

/// The status byte clocked out by the chip on the first byte of every SPI transaction.
#[bitfield(u8, new = false, order = Msb)]
#[derive(PartialEq, Eq)]
pub struct ChipStatus {
    /// Stays high until the crystal oscillator is stable.
    #[bits(1, access = RO)]
    pub chip_rdy_n: bool,

    #[bits(3, access = RO)]
    state_bits: u8,

    /// Number of bytes available in the FIFO of the latest access direction.
    #[bits(4, access = RO)]
    pub fifo_bytes: u8,
}

impl ChipStatus {
    /// Is the chip's crystal oscillator running?
    pub const fn is_ready(&self) -> bool {
        !self.chip_rdy_n()
    }

    /// The [`ChipState`] described by this status byte.
    pub const fn state(&self) -> ChipState {
        ChipState::from_bits(self.state_bits())
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for ChipStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ChipStatus {{ ready: {}, state: {}, fifo_bytes: {} }}",
            self.is_ready(),
            self.state(),
            self.fifo_bytes()
        )
    }
}

/// The second status byte that the chip appends to a received packet.
#[bitfield(u8, order = Msb)]
#[derive(PartialEq, Eq)]
pub struct LinkStatus {
    /// Set by the chip when the packet's CRC matched.
    #[bits(1)]
    pub crc_ok: bool,

    /// Link quality indicator. Lower is better.
    #[bits(7)]
    pub lqi: u8,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for LinkStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "LinkStatus {{ crc_ok: {}, lqi: {} }}",
            self.crc_ok(),
            self.lqi()
        )
    }
}
