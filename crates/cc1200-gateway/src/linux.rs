//! Gateway hardware on Linux: spidev for the bus, GPIO character devices for the pins.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Error, Result};
pub use linux_embedded_hal::{
    gpio_cdev::{chips, Chip, EventRequestFlags, LineEventHandle, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevBus,
};

use crate::{
    bus::{ReadyGatedDevice, SharedBus},
    irq::InterruptLine,
};

/// The SPI device type of every module on a Linux board.
pub type ModuleDevice = ReadyGatedDevice<SpidevBus, CdevPin, CdevPin>;

const CONSUMER: &str = "cc1200-gateway";

pub struct BoardHardware {
    gpio: Chip,
}

impl BoardHardware {
    pub fn new(dev_gpio_chip: u8) -> Result<Self> {
        // get the desired "/dev/gpiochip{dev_gpio_chip}"
        let dev_gpio = chips()?
            .find(|chip| {
                if let Ok(chip) = chip {
                    if chip
                        .path()
                        .to_string_lossy()
                        .ends_with(&dev_gpio_chip.to_string())
                    {
                        return true;
                    }
                }
                false
            })
            .ok_or(anyhow!(
                "Could not find specified dev/gpiochip{dev_gpio_chip} for this system."
            ))??;

        Ok(BoardHardware { gpio: dev_gpio })
    }

    /// Open `/dev/spidev{bus}.0` without letting the driver touch any CS line.
    ///
    /// The modules' chip selects are plain GPIO outputs.
    pub fn get_spi_bus(bus: u8, speed_hz: u32) -> Result<SpidevBus> {
        let mut spi = SpidevBus::open(format!("/dev/spidev{bus}.0"))
            .map_err(|_| anyhow!("SPI bus {bus} is not available in this system"))?;
        let config = SpidevOptions::new()
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
            .bits_per_word(8)
            .build();
        spi.configure(&config).map_err(Error::from)?;
        Ok(spi)
    }

    pub fn get_output_pin(&mut self, line: u32, initial: u8) -> Result<CdevPin> {
        let handle = self
            .gpio
            .get_line(line)
            .map_err(|_| anyhow!("GPIO{line} is unavailable"))?
            .request(LineRequestFlags::OUTPUT, initial, CONSUMER)
            .map_err(Error::from)?;
        CdevPin::new(handle).map_err(Error::from)
    }

    pub fn get_input_pin(&mut self, line: u32) -> Result<CdevPin> {
        let handle = self
            .gpio
            .get_line(line)
            .map_err(|_| anyhow!("GPIO{line} is unavailable"))?
            .request(LineRequestFlags::INPUT, 0, CONSUMER)
            .map_err(Error::from)?;
        CdevPin::new(handle).map_err(Error::from)
    }

    /// The reset line, requested high (not in reset).
    pub fn get_reset_pin(&mut self, line: u32) -> Result<CdevPin> {
        self.get_output_pin(line, 1)
    }

    /// Share a SPI bus (and optionally its ready line) between modules.
    pub fn share_bus(
        &mut self,
        bus: u8,
        speed_hz: u32,
        ready_line: Option<u32>,
    ) -> Result<Arc<Mutex<SharedBus<SpidevBus, CdevPin>>>> {
        let spi = Self::get_spi_bus(bus, speed_hz)?;
        let ready = ready_line.map(|line| self.get_input_pin(line)).transpose()?;
        Ok(SharedBus::new(spi, ready))
    }

    /// A module's device on `shared`, selected by the GPIO `cs_line`.
    pub fn get_module_device(
        &mut self,
        shared: Arc<Mutex<SharedBus<SpidevBus, CdevPin>>>,
        cs_line: u32,
    ) -> Result<ModuleDevice> {
        let cs = self.get_output_pin(cs_line, 1)?;
        ReadyGatedDevice::new(shared, cs).map_err(Error::from)
    }

    /// Subscribe to falling edges of a module's end-of-packet line.
    pub fn get_irq_line(&mut self, line: u32) -> Result<EdgeLine> {
        let events = self
            .gpio
            .get_line(line)
            .map_err(|_| anyhow!("GPIO{line} is unavailable"))?
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::FALLING_EDGE,
                CONSUMER,
            )
            .map_err(Error::from)?;
        Ok(EdgeLine(events))
    }
}

/// Falling edge events of a GPIO line.
pub struct EdgeLine(LineEventHandle);

impl InterruptLine for EdgeLine {
    type Error = linux_embedded_hal::gpio_cdev::Error;

    fn wait_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.0.get_event().map(|_| ())
    }
}
