use crate::radio::{mnemonics, registers};

/// A single register value to be applied by
/// [`CcInit::with_config()`](fn@crate::radio::prelude::CcInit::with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSetting {
    pub address: u16,
    pub value: u8,
}

impl RegisterSetting {
    pub const fn new(address: u16, value: u8) -> Self {
        Self { address, value }
    }
}

macro_rules! settings {
    ($($name:ident = $value:expr),+ $(,)?) => {
        &[$(RegisterSetting::new(registers::$name, $value)),+]
    };
}

/// 868 MHz band, 2-GFSK, packet mode with variable length, CRC and address filtering.
/// IOCFG2 asserts on sync word and deasserts at the end of the packet.
pub const DEFAULT_SETTINGS: &[RegisterSetting] = settings![
    IOCFG2 = 0x06,
    SYNC_CFG1 = 0xA9,
    MODCFG_DEV_E = 0x0B,
    PREAMBLE_CFG1 = 0x30,
    PREAMBLE_CFG0 = 0x8A,
    IQIC = 0xC8,
    CHAN_BW = 0x10,
    MDMCFG1 = 0x40,
    MDMCFG0 = 0x05,
    SYMBOL_RATE2 = 0x8F,
    SYMBOL_RATE1 = 0x75,
    SYMBOL_RATE0 = 0x10,
    AGC_REF = 0x27,
    AGC_CS_THR = 0xEE,
    AGC_CFG1 = 0x11,
    AGC_CFG0 = 0x94,
    FIFO_CFG = 0x00,
    DEV_ADDR = 0xAA,
    FS_CFG = 0x12,
    PKT_CFG2 = 0x00,
    PKT_CFG1 = 0x53,
    PKT_CFG0 = 0x20,
    RFEND_CFG1 = 0x3F,
    RFEND_CFG0 = 0x30,
    PKT_LEN = 0x7F,
    IF_MIX_CFG = 0x1C,
    FREQOFF_CFG = 0x22,
    TOC_CFG = 0x03,
    MDMCFG2 = 0x02,
    FREQ2 = 0x56,
    FREQ1 = 0x4F,
    FREQ0 = 0x5C,
    IF_ADC1 = 0xEE,
    IF_ADC0 = 0x10,
    FS_DIG1 = 0x07,
    FS_DIG0 = 0xAF,
    FS_CAL1 = 0x40,
    FS_CAL0 = 0x0E,
    FS_DIVTWO = 0x03,
    FS_DSM0 = 0x33,
    FS_DVC0 = 0x17,
    FS_PFD = 0x00,
    FS_PRE = 0x6E,
    FS_REG_DIV_CML = 0x1C,
    FS_SPARE = 0xAC,
    FS_VCO4 = 0x10,
    FS_VCO2 = 0x4A,
    FS_VCO1 = 0x9C,
    FS_VCO0 = 0xB5,
    IFAMP = 0x09,
    XOSC5 = 0x0E,
    XOSC1 = 0x03,
    IQIE_I1 = 0xFF,
    IQIE_I0 = 0xBB,
    IQIE_Q1 = 0xFF,
    CHFILT_Q0 = 0x09,
];

/// An object to configure the radio.
///
/// This struct follows a builder pattern. Since all fields are private, users should
/// start with the [`RadioConfig::default`] implementation, then mutate the object
/// accordingly.
/// ```
/// use cc1200::radio::RadioConfig;
/// let config = RadioConfig::default()
///     .with_channel(12)
///     .with_address(0x42);
/// ```
///
/// The default configuration is:
///
/// | feature | default value |
/// |--------:|:--------------|
/// | [`RadioConfig::settings()`] | [`DEFAULT_SETTINGS`] |
/// | [`RadioConfig::channel()`] | `0` (863.4 MHz) |
/// | [`RadioConfig::address()`] | `None` (keep `DEV_ADDR` from the settings) |
#[derive(Debug, Clone, Copy)]
pub struct RadioConfig {
    settings: &'static [RegisterSetting],
    channel: u8,
    address: Option<u8>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            settings: DEFAULT_SETTINGS,
            channel: 0,
            address: None,
        }
    }
}

impl RadioConfig {
    /// Use a different register table.
    ///
    /// The registers are written in order. The frequency registers
    /// are overwritten afterwards per [`RadioConfig::channel()`].
    pub fn with_settings(self, settings: &'static [RegisterSetting]) -> Self {
        Self { settings, ..self }
    }

    pub fn settings(&self) -> &'static [RegisterSetting] {
        self.settings
    }

    /// Set the channel in range [0, 30].
    ///
    /// Channels out of range fall back to channel 0.
    pub fn with_channel(self, channel: u8) -> Self {
        let channel = if channel > mnemonics::MAX_CHANNEL {
            log::warn!("Channel {channel} is out of range; using channel 0");
            0
        } else {
            channel
        };
        Self { channel, ..self }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Override the address used by the chip's address filtering.
    pub fn with_address(self, address: u8) -> Self {
        Self {
            address: Some(address),
            ..self
        }
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }
}
