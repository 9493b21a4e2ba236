use embedded_hal::{delay::DelayNs, spi::SpiDevice};
mod address;
mod channel;
mod constants;
mod details;
mod fifo;
mod init;
mod radio;
mod state;
pub use address::RegisterAddress;
pub use constants::{access, commands, fifo as fifo_headers, mnemonics, registers};
pub use init::hardware_reset;

use super::prelude::CcRegisters;
use crate::{packet::Packet, types::ChipState, ChipStatus};

/// An collection of error types to describe hardware malfunctions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cc1200Error<SPI> {
    /// Represents a SPI transaction error.
    Spi(SPI),
    /// A short space address in the FIFO range (`0x3F` and above) was used as a register.
    ///
    /// No SPI transaction was performed.
    ChipNotReady,
    /// The address is not a register: its upper byte names neither the short nor the
    /// extended register space, or its short space offset is in `0x2F..=0x3E` (the extended
    /// space prefix and the command strobes). No SPI transaction was performed.
    InvalidAddress(u16),
    /// A register burst of this many bytes does not fit the SPI buffer.
    /// No SPI transaction was performed.
    InvalidLength(usize),
    /// The channel is out of range [0, 30]. No SPI transaction was performed.
    InvalidChannel(u8),
    /// The requested state is transient and cannot be waited for.
    InvalidTargetState(ChipState),
    /// [`CC1200::set_state()`](fn@crate::radio::prelude::CcState::set_state)
    /// did not reach `target` within [`CC1200::state_timeout_us`].
    StateTimeout { target: ChipState, last: ChipState },
    /// The chip's `PARTNUMBER` register holds an unexpected value.
    UnknownPart(u8),
}

/// Size of the SPI buffer: a header byte and the longest frame
/// (`[length][address][payload]` plus two status bytes).
const BUF_LEN: usize = 1 + 2 + Packet::PAYLOAD_CAPACITY;

/// This struct implements the [`Cc*` traits](mod@crate::radio::prelude)
/// for the CC1200 transceiver.
pub struct CC1200<SPI, DELAY> {
    /// The time (in microseconds) that
    /// [`set_state()`](fn@crate::radio::prelude::CcState::set_state)
    /// may spend walking the state graph.
    ///
    /// Every poll of the chip's state is accounted as 50 microseconds.
    /// Defaults to 10 milliseconds.
    pub state_timeout_us: u32,
    _spi: SPI,
    _delay_impl: DELAY,
    /// Byte 0 is reserved for the header, which the chip overwrites with its status byte.
    _buf: [u8; BUF_LEN],
    _status: ChipStatus,
    _channel: u8,
    _asleep: bool,
    _discarded: u32,
}

impl<SPI, DELAY> CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    /// Instantiate a [`CC1200`] object for use on the specified `spi` bus.
    ///
    /// The radio's CS pin shall be defined when instantiating the
    /// [`SpiDevice`](trait@embedded_hal::spi::SpiDevice) object
    /// (passed to the `spi` parameter). That device is also responsible for waiting
    /// until the chip pulls its SO line low after CS is asserted.
    pub fn new(spi: SPI, delay_impl: DELAY) -> CC1200<SPI, DELAY> {
        CC1200 {
            state_timeout_us: 10_000,
            _spi: spi,
            _delay_impl: delay_impl,
            _buf: [0u8; BUF_LEN],
            _status: ChipStatus::from_bits(0),
            _channel: 0,
            _asleep: false,
            _discarded: 0,
        }
    }

    fn spi_transfer(&mut self, len: usize) -> Result<(), Cc1200Error<SPI::Error>> {
        self._spi
            .transfer_in_place(&mut self._buf[..len])
            .map_err(Cc1200Error::Spi)?;
        self._status = ChipStatus::from_bits(self._buf[0]);
        Ok(())
    }

    /// Write the header for `address` into the buffer.
    ///
    /// Returns the header's length.
    fn prepare_header(
        &mut self,
        address: u16,
        access_bits: u8,
    ) -> Result<usize, Cc1200Error<SPI::Error>> {
        let address = RegisterAddress::new(address);
        if address.is_fifo() {
            return Err(Cc1200Error::ChipNotReady);
        }
        if !address.is_valid() {
            return Err(Cc1200Error::InvalidAddress(address.into_bits()));
        }
        Ok(address.write_header(access_bits, &mut self._buf))
    }

    /// The number of RX FIFO bytes that followed a received frame and were dropped.
    pub fn discarded_rx_bytes(&self) -> u32 {
        self._discarded
    }

    /// Release the SPI device and delay implementation.
    pub fn free(self) -> (SPI, DELAY) {
        (self._spi, self._delay_impl)
    }
}

impl<SPI, DELAY> CcRegisters for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type RegisterErrorType = Cc1200Error<SPI::Error>;

    /// Bursts longer than the SPI buffer are refused with [`Cc1200Error::InvalidLength`].
    fn read_register(
        &mut self,
        address: u16,
        buf: &mut [u8],
    ) -> Result<(), Self::RegisterErrorType> {
        let header = self.prepare_header(address, access::READ | access::BURST)?;
        let len = buf.len();
        if len > BUF_LEN - header {
            return Err(Cc1200Error::InvalidLength(len));
        }
        self._buf[header..header + len].fill(0);
        self.spi_transfer(header + len)?;
        buf.copy_from_slice(&self._buf[header..header + len]);
        Ok(())
    }

    /// Bursts longer than the SPI buffer are refused with [`Cc1200Error::InvalidLength`].
    fn write_register(&mut self, address: u16, buf: &[u8]) -> Result<(), Self::RegisterErrorType> {
        let header = self.prepare_header(address, access::BURST)?;
        let len = buf.len();
        if len > BUF_LEN - header {
            return Err(Cc1200Error::InvalidLength(len));
        }
        self._buf[header..header + len].copy_from_slice(buf);
        self.spi_transfer(header + len)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{commands, registers, Cc1200Error, CcRegisters};
    use crate::radio::prelude::CcState;
    use crate::{radio::CC1200, sim::SimChip, spi_test_expects, test::mk_radio, ChipState};
    use embedded_hal_mock::eh1::{delay::NoopDelay, spi::Transaction as SpiTransaction};
    use std::vec;

    #[test]
    fn short_space_read() {
        let spi_expectations = spi_test_expects![
            (vec![0xDEu8, 0], vec![0x0Fu8, 0xAA]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        assert_eq!(mocks.0.read_register_byte(registers::DEV_ADDR), Ok(0xAA));
        assert!(mocks.0._status.is_ready());
        assert_eq!(mocks.0._status.fifo_bytes(), 0xF);
        mocks.1.done();
    }

    #[test]
    fn extended_space_burst() {
        let spi_expectations = spi_test_expects![
            // write FREQ2, FREQ1, FREQ0 in one burst
            (vec![0x6Fu8, 0x0C, 0x56, 0x57, 0x0A], vec![0u8; 5]),
            // read them back
            (vec![0xEFu8, 0x0C, 0, 0, 0], vec![0u8, 0, 0x56, 0x57, 0x0A]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        let radio = &mut mocks.0;
        radio
            .write_register(registers::FREQ2, &[0x56, 0x57, 0x0A])
            .unwrap();
        let mut buf = [0u8; 3];
        radio.read_register(registers::FREQ2, &mut buf).unwrap();
        assert_eq!(buf, [0x56, 0x57, 0x0A]);
        mocks.1.done();
    }

    #[test]
    fn reject_fifo_range() {
        // no expectations: the addresses are refused before any SPI traffic
        let mut mocks = mk_radio(&[]);
        let radio = &mut mocks.0;
        assert_eq!(
            radio.write_register(0x003F, &[1]),
            Err(Cc1200Error::ChipNotReady)
        );
        let mut buf = [0u8; 2];
        assert_eq!(
            radio.read_register(0x0080, &mut buf),
            Err(Cc1200Error::ChipNotReady)
        );
        assert_eq!(
            radio.read_register_byte(0x1234),
            Err(Cc1200Error::InvalidAddress(0x1234))
        );
        mocks.1.done();
    }

    #[test]
    fn reject_strobe_offsets() {
        let mut mocks = mk_radio(&[]);
        let radio = &mut mocks.0;
        // SIDLE and SRES as register reads
        assert_eq!(
            radio.read_register_byte(0x0036),
            Err(Cc1200Error::InvalidAddress(0x0036))
        );
        assert_eq!(
            radio.write_register(0x0030, &[0]),
            Err(Cc1200Error::InvalidAddress(0x0030))
        );
        // the extended space prefix
        assert_eq!(
            radio.read_register_byte(0x002F),
            Err(Cc1200Error::InvalidAddress(0x002F))
        );
        mocks.1.done();
    }

    #[test]
    fn strobe_offsets_leave_chip_alone() {
        let chip = SimChip::new();
        let mut radio = CC1200::new(chip.clone(), NoopDelay);
        radio.strobe(commands::SRX).unwrap();
        let before = chip.transactions();
        assert!(radio.read_register_byte(0x0036).is_err());
        assert_eq!(chip.state(), ChipState::Rx);
        assert_eq!(chip.transactions(), before);
    }

    #[test]
    fn reject_oversized_bursts() {
        let mut mocks = mk_radio(&[]);
        let radio = &mut mocks.0;
        let mut buf = [0u8; super::BUF_LEN];
        assert_eq!(
            radio.read_register(registers::IOCFG3, &mut buf),
            Err(Cc1200Error::InvalidLength(super::BUF_LEN))
        );
        // the extended header takes two bytes
        assert_eq!(
            radio.write_register(registers::FREQ2, &buf[..super::BUF_LEN - 1]),
            Err(Cc1200Error::InvalidLength(super::BUF_LEN - 1))
        );
        mocks.1.done();
    }

    #[test]
    fn verified_write() {
        let spi_expectations = spi_test_expects![
            (vec![0x5Eu8, 0xAA], vec![0u8, 0]),
            (vec![0xDEu8, 0], vec![0u8, 0xAA]),
            (vec![0x5Eu8, 0xBB], vec![0u8, 0]),
            (vec![0xDEu8, 0], vec![0u8, 0xAA]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        assert_eq!(mocks.0.write_verified(registers::DEV_ADDR, 0xAA), Ok(true));
        assert_eq!(mocks.0.write_verified(registers::DEV_ADDR, 0xBB), Ok(false));
        mocks.1.done();
    }

    #[test]
    fn register_round_trip_on_chip() {
        let chip = SimChip::new();
        let mut radio = CC1200::new(chip.clone(), NoopDelay);
        for (address, value) in [
            (registers::IOCFG2, 0x06u8),
            (registers::PKT_LEN, 0x7F),
            (registers::FREQ2, 0x56),
            (registers::CHFILT_Q0, 0x09),
        ] {
            radio.write_register(address, &[value]).unwrap();
            assert_eq!(radio.read_register_byte(address), Ok(value));
            assert_eq!(chip.register(address), value);
        }
        assert_eq!(chip.state(), ChipState::Idle);
    }
}
