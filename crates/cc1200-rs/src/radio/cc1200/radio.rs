use super::{commands, registers, Cc1200Error, CC1200};
use crate::{
    packet::Packet,
    radio::prelude::{CcFifo, CcRadio, CcRegisters, CcState},
    types::ChipState,
};
use embedded_hal::{delay::DelayNs, spi::SpiDevice};

impl<SPI, DELAY> CcRadio for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type RadioErrorType = Cc1200Error<SPI::Error>;

    /// Strobe `SRX` without waiting for the chip to settle.
    fn listen(&mut self) -> Result<(), Self::RadioErrorType> {
        self.strobe(commands::SRX)?;
        self._asleep = false;
        Ok(())
    }

    /// See [`CcRadio::send()`] for implementation-agnostic detail.
    ///
    /// Stale bytes in the TX FIFO are flushed first. The packet is loaded while the
    /// synthesizer is running ([`ChipState::FastTxReady`]), then TX is started.
    fn send(&mut self, packet: &Packet) -> Result<bool, Self::RadioErrorType> {
        if self._asleep {
            return Ok(false);
        }
        if self.tx_bytes()? > 0 {
            self.set_state(ChipState::Idle)?;
            self.flush_tx()?;
        }
        self.set_state(ChipState::FastTxReady)?;
        self.write_tx_fifo(packet)?;
        self.set_state(ChipState::Tx)?;
        Ok(true)
    }

    fn power_down(&mut self) -> Result<(), Self::RadioErrorType> {
        self.set_state(ChipState::Idle)?;
        self.strobe(commands::SPWD)?;
        self._asleep = true;
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), Self::RadioErrorType> {
        // asserting CS is enough to wake the chip
        self.strobe(commands::SIDLE)?;
        self._asleep = false;
        Ok(())
    }

    fn is_asleep(&self) -> bool {
        self._asleep
    }

    fn set_address(&mut self, address: u8) -> Result<bool, Self::RadioErrorType> {
        self.write_verified(registers::DEV_ADDR, address)
    }

    fn rssi(&mut self) -> Result<i8, Self::RadioErrorType> {
        Ok(self.read_register_byte(registers::RSSI1)? as i8)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{commands, CcRadio};
    use crate::{
        packet::{Packet, RxOutcome},
        radio::{prelude::CcFifo, CC1200},
        sim::SimChip,
        spi_test_expects,
        test::mk_radio,
        ChipState,
    };
    use embedded_hal_mock::eh1::{delay::NoopDelay, spi::Transaction as SpiTransaction};
    use std::vec;

    const READ_NUM_TXBYTES: [u8; 3] = [0xEF, 0xD6, 0];

    #[test]
    fn send_packet() {
        let spi_expectations = spi_test_expects![
            // stale bytes in TX FIFO
            (READ_NUM_TXBYTES.to_vec(), vec![0x10u8, 0x10, 2]),
            (vec![commands::SNOP], vec![0x10u8]),
            (vec![commands::SIDLE], vec![0x10u8]),
            (vec![commands::SNOP], vec![0x00u8]),
            (vec![commands::SFTX], vec![0x00u8]),
            // go to fast TX ready
            (vec![commands::SNOP], vec![0x00u8]),
            (vec![commands::SFSTXON], vec![0x00u8]),
            (vec![commands::SNOP], vec![0x30u8]),
            (vec![0x7Fu8, 3, 0x11, 0xAB, 0xCD], vec![0x30u8, 0, 0, 0, 0]),
            (vec![commands::SNOP], vec![0x30u8]),
            (vec![commands::STX], vec![0x30u8]),
            (vec![commands::SNOP], vec![0x20u8]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        let packet = Packet::new(0x11, &[0xAB, 0xCD]).unwrap();
        assert_eq!(mocks.0.send(&packet), Ok(true));
        mocks.1.done();
    }

    #[test]
    fn sleeping() {
        let spi_expectations = spi_test_expects![
            (vec![commands::SNOP], vec![0x10u8]),
            (vec![commands::SIDLE], vec![0x10u8]),
            (vec![commands::SNOP], vec![0x00u8]),
            (vec![commands::SPWD], vec![0x00u8]),
            (vec![commands::SIDLE], vec![0x00u8]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        mocks.0.power_down().unwrap();
        assert!(mocks.0.is_asleep());
        // a sleeping radio refuses to transmit without any SPI traffic
        let packet = Packet::new(1, b"zzz").unwrap();
        assert_eq!(mocks.0.send(&packet), Ok(false));
        mocks.0.power_up().unwrap();
        assert!(!mocks.0.is_asleep());
        mocks.1.done();
    }

    #[test]
    fn listen_and_rssi() {
        let spi_expectations = spi_test_expects![
            (vec![commands::SRX], vec![0x00u8]),
            (vec![0xEFu8, 0x71, 0], vec![0x10u8, 0x10, 0xA6]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        mocks.0.listen().unwrap();
        assert_eq!(mocks.0.rssi(), Ok(-90));
        mocks.1.done();
    }

    #[test]
    fn send_on_chip() {
        let chip = SimChip::new();
        let mut radio = CC1200::new(chip.clone(), NoopDelay);
        chip.preload_tx_fifo(&[0xEE; 5]);
        let packet = Packet::new(0x07, b"ping").unwrap();
        assert_eq!(radio.send(&packet), Ok(true));
        assert_eq!(chip.state(), ChipState::Tx);
        assert_eq!(chip.sent_frames(), vec![vec![5u8, 0x07, b'p', b'i', b'n', b'g']]);

        // a transmitted frame looped back into RX parses as the same packet
        chip.loop_back_tx(0xC0, 0x81);
        let RxOutcome::Packet(received) = radio.read_rx_fifo().unwrap() else {
            panic!("expected a packet");
        };
        assert_eq!(received.payload(), packet.payload());
        assert_eq!(received.address, packet.address);
    }
}
