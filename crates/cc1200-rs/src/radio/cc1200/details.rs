use super::{Cc1200Error, CC1200};
use crate::radio::prelude::CcDetails;
use embedded_hal::{delay::DelayNs, spi::SpiDevice};

#[cfg(any(feature = "defmt", feature = "std"))]
use super::registers;
#[cfg(any(feature = "defmt", feature = "std"))]
use crate::radio::prelude::{CcChannel, CcFifo, CcRadio, CcRegisters, CcState};

#[cfg(feature = "std")]
extern crate std;

impl<SPI, DELAY> CcDetails for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type DetailsErrorType = Cc1200Error<SPI::Error>;

    #[cfg(feature = "defmt")]
    #[cfg(target_os = "none")]
    fn print_details(&mut self) -> Result<(), Self::DetailsErrorType> {
        let part = self.read_register_byte(registers::PARTNUMBER)?;
        let version = self.read_register_byte(registers::PARTVERSION)?;
        defmt::println!(
            "Part number_______________{=u8:#04X} (version {=u8:#04X})",
            part,
            version
        );
        defmt::println!("Chip state________________{}", self.get_state()?);
        defmt::println!("Asleep____________________{=bool}", self.is_asleep());

        let frequency = self.get_frequency()?;
        defmt::println!(
            "Channel___________________{=u8} ~ {=u32} Hz",
            self.get_channel(),
            frequency
        );
        defmt::println!(
            "Device address____________{=u8:#04X}",
            self.read_register_byte(registers::DEV_ADDR)?
        );

        let pkt_cfg1 = self.read_register_byte(registers::PKT_CFG1)?;
        let pkt_cfg0 = self.read_register_byte(registers::PKT_CFG0)?;
        defmt::println!(
            "Variable length packets___{=bool}",
            (pkt_cfg0 >> 5) & 3 == 1
        );
        defmt::println!("Address filtering_________{=bool}", (pkt_cfg1 >> 3) & 3 > 0);
        defmt::println!("CRC enabled_______________{=bool}", (pkt_cfg1 >> 1) & 3 > 0);
        defmt::println!("Status bytes appended_____{=bool}", pkt_cfg1 & 1 > 0);

        defmt::println!("RSSI______________________{=i8}", self.rssi()?);
        defmt::println!("TX FIFO___________________{=u8} bytes", self.tx_bytes()?);
        defmt::println!("RX FIFO___________________{=u8} bytes", self.rx_bytes()?);
        Ok(())
    }

    #[cfg(not(any(feature = "defmt", feature = "std")))]
    fn print_details(&mut self) -> Result<(), Self::DetailsErrorType> {
        Ok(())
    }

    #[cfg(not(target_os = "none"))]
    #[cfg(feature = "std")]
    fn print_details(&mut self) -> Result<(), Self::DetailsErrorType> {
        let part = self.read_register_byte(registers::PARTNUMBER)?;
        let version = self.read_register_byte(registers::PARTVERSION)?;
        std::println!("Part number_______________{part:#04X} (version {version:#04X})");
        std::println!("Chip state________________{}", self.get_state()?);
        std::println!("Asleep____________________{}", self.is_asleep());

        let frequency = self.get_frequency()?;
        std::println!(
            "Channel___________________{} ~ {frequency} Hz",
            self.get_channel()
        );
        std::println!(
            "Device address____________{:#04X}",
            self.read_register_byte(registers::DEV_ADDR)?
        );

        let pkt_cfg1 = self.read_register_byte(registers::PKT_CFG1)?;
        let pkt_cfg0 = self.read_register_byte(registers::PKT_CFG0)?;
        std::println!("Variable length packets___{}", (pkt_cfg0 >> 5) & 3 == 1);
        std::println!("Address filtering_________{}", (pkt_cfg1 >> 3) & 3 > 0);
        std::println!("CRC enabled_______________{}", (pkt_cfg1 >> 1) & 3 > 0);
        std::println!("Status bytes appended_____{}", pkt_cfg1 & 1 > 0);

        std::println!("RSSI______________________{}", self.rssi()?);
        std::println!("TX FIFO___________________{} bytes", self.tx_bytes()?);
        std::println!("RX FIFO___________________{} bytes", self.rx_bytes()?);
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::CcDetails;
    use crate::{
        radio::{prelude::CcInit, CC1200},
        sim::SimChip,
    };
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn print_details() {
        let chip = SimChip::new();
        let mut radio = CC1200::new(chip.clone(), NoopDelay);
        radio.init().unwrap();
        let before = chip.transactions();
        radio.print_details().unwrap();
        if cfg!(feature = "std") {
            assert!(chip.transactions() > before);
        } else {
            assert_eq!(chip.transactions(), before);
        }
    }
}
