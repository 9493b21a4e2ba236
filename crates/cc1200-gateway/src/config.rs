//! Board wiring and runtime settings of the gateway.

use std::{path::PathBuf, time::Duration};

/// Where and how one radio module is attached.
///
/// Line numbers are offsets on the board's GPIO character device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Module number in range [1, 4], as used in IPC records.
    pub number: u8,
    /// Channel in range [0, 30]. Out of range values fall back to channel 0.
    pub channel: u8,
    /// Active-low chip select.
    pub cs_line: u32,
    /// The module's GPIO2 output, asserted low at the end of a received packet.
    pub irq_line: u32,
}

impl ModuleConfig {
    pub const fn new(number: u8, channel: u8, cs_line: u32, irq_line: u32) -> Self {
        Self {
            number,
            channel,
            cs_line,
            irq_line,
        }
    }

    /// The default wiring of module slot `number` (1 through 4) on a Raspberry Pi.
    pub fn slot(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::new(1, 12, 21, 20)),
            2 => Some(Self::new(2, 1, 24, 23)),
            3 => Some(Self::new(3, 2, 14, 2)),
            4 => Some(Self::new(4, 3, 17, 27)),
            _ => None,
        }
    }
}

/// Settings for a whole gateway.
///
/// | setting | default value |
/// |--------:|:--------------|
/// | `modules` | slots 1 through 4 |
/// | `gpio_chip` | `0` |
/// | `spi_bus` | `0` |
/// | `spi_speed_hz` | 5 MHz |
/// | `reset_line` | `12` |
/// | `ready_line` | `Some(9)` (the SPI bus' MISO line) |
/// | `queue_depth` | `32` |
/// | `tx_holdoff` | 75 ms |
/// | `rx_pipe` | `/tmp/sfb_rxfifo` |
/// | `tx_pipe` | `/tmp/sfb_txfifo` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub modules: Vec<ModuleConfig>,
    pub gpio_chip: u8,
    pub spi_bus: u8,
    pub spi_speed_hz: u32,
    /// Active-low reset shared by all modules.
    pub reset_line: u32,
    /// Line polled after asserting CS until the chip signals it is ready.
    pub ready_line: Option<u32>,
    /// Packets each module buffers before the oldest ones are dropped.
    pub queue_depth: usize,
    /// Pause after each transmission.
    pub tx_holdoff: Duration,
    /// Named pipe receiving inbound packets.
    pub rx_pipe: PathBuf,
    /// Named pipe providing packets to transmit.
    pub tx_pipe: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            modules: (1..=4).filter_map(ModuleConfig::slot).collect(),
            gpio_chip: 0,
            spi_bus: 0,
            spi_speed_hz: 5_000_000,
            reset_line: 12,
            ready_line: Some(9),
            queue_depth: 32,
            tx_holdoff: Duration::from_millis(75),
            rx_pipe: PathBuf::from("/tmp/sfb_rxfifo"),
            tx_pipe: PathBuf::from("/tmp/sfb_txfifo"),
        }
    }
}

impl GatewayConfig {
    /// Keep only the modules whose numbers are listed in `numbers`.
    pub fn with_modules(mut self, numbers: &[u8]) -> Self {
        self.modules.retain(|m| numbers.contains(&m.number));
        self
    }

    /// Override the channel of module `number`.
    pub fn with_channel(mut self, number: u8, channel: u8) -> Self {
        if let Some(module) = self.modules.iter_mut().find(|m| m.number == number) {
            module.channel = channel;
        }
        self
    }
}
