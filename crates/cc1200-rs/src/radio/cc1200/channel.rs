use embedded_hal::{delay::DelayNs, spi::SpiDevice};

use crate::radio::{
    prelude::{CcChannel, CcRegisters},
    Cc1200Error, CC1200,
};

use super::{mnemonics, registers};

/// Convert a carrier frequency (in Hz) into the 24-bit `FREQ` register value.
pub(crate) const fn frequency_word(frequency: u32) -> u32 {
    ((frequency as u64 * 65536 * mnemonics::LO_DIVIDER) / mnemonics::F_XTAL) as u32 & 0xFF_FFFF
}

/// The carrier frequency (in Hz) of a `channel`.
pub const fn channel_frequency(channel: u8) -> u32 {
    mnemonics::BASE_FREQUENCY + channel as u32 * mnemonics::CHANNEL_SPACING
}

impl<SPI, DELAY> CcChannel for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type ChannelErrorType = Cc1200Error<SPI::Error>;

    fn set_channel(&mut self, channel: u8) -> Result<bool, Self::ChannelErrorType> {
        if channel > mnemonics::MAX_CHANNEL {
            return Err(Cc1200Error::InvalidChannel(channel));
        }
        let verified = self.set_frequency(channel_frequency(channel))?;
        self._channel = channel;
        Ok(verified)
    }

    fn get_channel(&self) -> u8 {
        self._channel
    }

    /// See [`CcChannel::set_frequency()`] for implementation-agnostic detail.
    ///
    /// The registers are written least significant byte first
    /// and read back most significant byte first.
    fn set_frequency(&mut self, frequency: u32) -> Result<bool, Self::ChannelErrorType> {
        let [_, freq2, freq1, freq0] = frequency_word(frequency).to_be_bytes();
        self.write_register(registers::FREQ0, &[freq0])?;
        self.write_register(registers::FREQ1, &[freq1])?;
        self.write_register(registers::FREQ2, &[freq2])?;

        let mut mismatched = false;
        for (address, expected) in [
            (registers::FREQ2, freq2),
            (registers::FREQ1, freq1),
            (registers::FREQ0, freq0),
        ] {
            let actual = self.read_register_byte(address)?;
            if actual != expected {
                log::warn!("Frequency register {address:#06X} reads {actual:#04X}, expected {expected:#04X}");
                mismatched = true;
            }
        }
        Ok(!mismatched)
    }

    fn get_frequency(&mut self) -> Result<u32, Self::ChannelErrorType> {
        let mut buf = [0u8; 3];
        self.read_register(registers::FREQ2, &mut buf)?;
        let word = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) as u64;
        Ok((word * mnemonics::F_XTAL / (65536 * mnemonics::LO_DIVIDER)) as u32)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{channel_frequency, frequency_word, CcChannel};
    use crate::{
        radio::{Cc1200Error, CC1200},
        sim::SimChip,
        spi_test_expects,
        test::mk_radio,
    };
    use embedded_hal_mock::eh1::{delay::NoopDelay, spi::Transaction as SpiTransaction};
    use std::vec;

    #[test]
    fn channel_words() {
        assert_eq!(channel_frequency(0), 863_400_000);
        assert_eq!(frequency_word(channel_frequency(0)), 0x56570A);
        assert_eq!(frequency_word(channel_frequency(1)), 0x565C28);
        assert_eq!(frequency_word(channel_frequency(30)), 0x56F0A3);
    }

    #[test]
    fn set_channel() {
        let spi_expectations = spi_test_expects![
            // FREQ0, FREQ1, FREQ2
            (vec![0x6Fu8, 0x0E, 0x28], vec![0u8; 3]),
            (vec![0x6Fu8, 0x0D, 0x5C], vec![0u8; 3]),
            (vec![0x6Fu8, 0x0C, 0x56], vec![0u8; 3]),
            // read back FREQ2, FREQ1, FREQ0
            (vec![0xEFu8, 0x0C, 0], vec![0u8, 0, 0x56]),
            (vec![0xEFu8, 0x0D, 0], vec![0u8, 0, 0x5C]),
            (vec![0xEFu8, 0x0E, 0], vec![0u8, 0, 0x29]),
        ];
        let mut mocks = mk_radio(&spi_expectations);
        // FREQ0 did not stick
        assert_eq!(mocks.0.set_channel(1), Ok(false));
        assert_eq!(mocks.0.get_channel(), 1);
        mocks.1.done();
    }

    #[test]
    fn reject_channel() {
        let mut mocks = mk_radio(&[]);
        assert_eq!(mocks.0.set_channel(31), Err(Cc1200Error::InvalidChannel(31)));
        assert_eq!(mocks.0.get_channel(), 0);
        mocks.1.done();
    }

    #[test]
    fn every_channel_on_chip() {
        let chip = SimChip::new();
        let mut radio = CC1200::new(chip.clone(), NoopDelay);
        for channel in 0..=30u8 {
            assert_eq!(radio.set_channel(channel), Ok(true));
            let frequency = radio.get_frequency().unwrap();
            // within one register step (~153 Hz) of the requested carrier
            assert!(channel_frequency(channel) - frequency < 154);
        }
        assert_eq!(radio.set_channel(200), Err(Cc1200Error::InvalidChannel(200)));
        assert_eq!(radio.get_channel(), 30);
    }
}
