use super::{commands, mnemonics, registers, Cc1200Error, CC1200};
use crate::radio::{
    prelude::{CcChannel, CcInit, CcRadio, CcRegisters, CcState},
    RadioConfig,
};
use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

/// Pulse the chip's active-low RESET_N line.
///
/// On boards where several chips share a reset line, call this once
/// before configuring any of them.
pub fn hardware_reset<PIN, DELAY>(reset_pin: &mut PIN, delay: &mut DELAY) -> Result<(), PIN::Error>
where
    PIN: OutputPin,
    DELAY: DelayNs,
{
    reset_pin.set_high()?;
    delay.delay_us(mnemonics::HW_RESET_US);
    reset_pin.set_low()?;
    delay.delay_us(mnemonics::HW_RESET_US);
    reset_pin.set_high()?;
    delay.delay_us(mnemonics::HW_RESET_US);
    Ok(())
}

impl<SPI, DELAY> CcInit for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type ConfigErrorType = Cc1200Error<SPI::Error>;

    fn reset(&mut self) -> Result<(), Self::ConfigErrorType> {
        self.strobe(commands::SRES)?;
        self._delay_impl.delay_us(mnemonics::SOFT_RESET_US);
        self.strobe(commands::SRES)?;
        self._asleep = false;
        Ok(())
    }

    /// Initialize the radio's hardware using the [`SpiDevice`] given
    /// to [`CC1200::new()`].
    ///
    /// Both the CC1200 and the CC1201 part numbers are accepted.
    fn init(&mut self) -> Result<u16, Self::ConfigErrorType> {
        self.reset()?;
        let part = self.read_register_byte(registers::PARTNUMBER)?;
        if part != mnemonics::PARTNUMBER_CC1200 && part != mnemonics::PARTNUMBER_CC1201 {
            return Err(Cc1200Error::UnknownPart(part));
        }
        self.with_config(&RadioConfig::default())
    }

    fn with_config(&mut self, config: &RadioConfig) -> Result<u16, Self::ConfigErrorType> {
        let mut errors = 0u16;
        for setting in config.settings() {
            if !self.write_verified(setting.address, setting.value)? {
                log::warn!(
                    "Register {:#06X} did not read back as {:#04X}",
                    setting.address,
                    setting.value
                );
                errors += 1;
            }
        }
        if let Some(address) = config.address() {
            if !self.set_address(address)? {
                errors += 1;
            }
        }
        if !self.set_channel(config.channel())? {
            errors += 1;
        }
        if errors > 0 {
            log::warn!("{errors} register(s) failed verification");
        } else {
            log::debug!("Applied {} register settings", config.settings().len());
        }
        Ok(errors)
    }
}
