//! A module to hold constant values used by the CC1200 driver.
//!
//! These values are not meant to be used outside this crate,
//! but they are exposed for advanced usage and testing.

/// Header bits that qualify a register or FIFO access.
pub mod access {
    /// Set for a read; cleared for a write.
    pub const READ: u8 = 0x80;
    /// Set for a burst (auto-incrementing) access.
    pub const BURST: u8 = 0x40;
    /// Address prefix of the extended register space.
    pub const EXTENDED: u8 = 0x2F;
}

/// Single byte command strobes.
pub mod commands {
    /// Reset chip.
    pub const SRES: u8 = 0x30;
    /// Enable and calibrate the frequency synthesizer (fast TX ready).
    pub const SFSTXON: u8 = 0x31;
    /// Turn off the crystal oscillator.
    pub const SXOFF: u8 = 0x32;
    /// Calibrate the frequency synthesizer and turn it off.
    pub const SCAL: u8 = 0x33;
    /// Enable RX.
    pub const SRX: u8 = 0x34;
    /// Enable TX.
    pub const STX: u8 = 0x35;
    /// Exit RX/TX and turn off the frequency synthesizer.
    pub const SIDLE: u8 = 0x36;
    /// Automatic frequency compensation.
    pub const SAFC: u8 = 0x37;
    /// Start automatic RX polling (wake on radio).
    pub const SWOR: u8 = 0x38;
    /// Enter SLEEP mode when CS is deasserted.
    pub const SPWD: u8 = 0x39;
    /// Flush the RX FIFO.
    pub const SFRX: u8 = 0x3A;
    /// Flush the TX FIFO.
    pub const SFTX: u8 = 0x3B;
    /// Reset the eWOR timer.
    pub const SWORRST: u8 = 0x3C;
    /// No operation. Only used to fetch the status byte.
    pub const SNOP: u8 = 0x3D;
}

/// FIFO access headers.
pub mod fifo {
    pub const SINGLE_TXFIFO: u8 = 0x3F;
    pub const BURST_TXFIFO: u8 = 0x7F;
    pub const SINGLE_RXFIFO: u8 = 0xBF;
    pub const BURST_RXFIFO: u8 = 0xFF;
}

/// Register addresses as 16-bit values.
///
/// The upper byte is the address space extension
/// (`0x00` for the short space, `0x2F` for the extended space).
pub mod registers {
    pub const IOCFG3: u16 = 0x0000;
    pub const IOCFG2: u16 = 0x0001;
    pub const IOCFG1: u16 = 0x0002;
    pub const IOCFG0: u16 = 0x0003;
    pub const SYNC3: u16 = 0x0004;
    pub const SYNC2: u16 = 0x0005;
    pub const SYNC1: u16 = 0x0006;
    pub const SYNC0: u16 = 0x0007;
    pub const SYNC_CFG1: u16 = 0x0008;
    pub const SYNC_CFG0: u16 = 0x0009;
    pub const DEVIATION_M: u16 = 0x000A;
    pub const MODCFG_DEV_E: u16 = 0x000B;
    pub const DCFILT_CFG: u16 = 0x000C;
    pub const PREAMBLE_CFG1: u16 = 0x000D;
    pub const PREAMBLE_CFG0: u16 = 0x000E;
    pub const IQIC: u16 = 0x000F;
    pub const CHAN_BW: u16 = 0x0010;
    pub const MDMCFG1: u16 = 0x0011;
    pub const MDMCFG0: u16 = 0x0012;
    pub const SYMBOL_RATE2: u16 = 0x0013;
    pub const SYMBOL_RATE1: u16 = 0x0014;
    pub const SYMBOL_RATE0: u16 = 0x0015;
    pub const AGC_REF: u16 = 0x0016;
    pub const AGC_CS_THR: u16 = 0x0017;
    pub const AGC_GAIN_ADJUST: u16 = 0x0018;
    pub const AGC_CFG3: u16 = 0x0019;
    pub const AGC_CFG2: u16 = 0x001A;
    pub const AGC_CFG1: u16 = 0x001B;
    pub const AGC_CFG0: u16 = 0x001C;
    pub const FIFO_CFG: u16 = 0x001D;
    pub const DEV_ADDR: u16 = 0x001E;
    pub const SETTLING_CFG: u16 = 0x001F;
    pub const FS_CFG: u16 = 0x0020;
    pub const WOR_CFG1: u16 = 0x0021;
    pub const WOR_CFG0: u16 = 0x0022;
    pub const WOR_EVENT0_MSB: u16 = 0x0023;
    pub const WOR_EVENT0_LSB: u16 = 0x0024;
    pub const RXDCM_TIME: u16 = 0x0025;
    pub const PKT_CFG2: u16 = 0x0026;
    pub const PKT_CFG1: u16 = 0x0027;
    pub const PKT_CFG0: u16 = 0x0028;
    pub const RFEND_CFG1: u16 = 0x0029;
    pub const RFEND_CFG0: u16 = 0x002A;
    pub const PA_CFG1: u16 = 0x002B;
    pub const PA_CFG0: u16 = 0x002C;
    pub const ASK_CFG: u16 = 0x002D;
    pub const PKT_LEN: u16 = 0x002E;

    pub const IF_MIX_CFG: u16 = 0x2F00;
    pub const FREQOFF_CFG: u16 = 0x2F01;
    pub const TOC_CFG: u16 = 0x2F02;
    pub const MARC_SPARE: u16 = 0x2F03;
    pub const ECG_CFG: u16 = 0x2F04;
    pub const MDMCFG2: u16 = 0x2F05;
    pub const EXT_CTRL: u16 = 0x2F06;
    pub const RCCAL_FINE: u16 = 0x2F07;
    pub const RCCAL_COARSE: u16 = 0x2F08;
    pub const RCCAL_OFFSET: u16 = 0x2F09;
    pub const FREQOFF1: u16 = 0x2F0A;
    pub const FREQOFF0: u16 = 0x2F0B;
    pub const FREQ2: u16 = 0x2F0C;
    pub const FREQ1: u16 = 0x2F0D;
    pub const FREQ0: u16 = 0x2F0E;
    pub const IF_ADC2: u16 = 0x2F0F;
    pub const IF_ADC1: u16 = 0x2F10;
    pub const IF_ADC0: u16 = 0x2F11;
    pub const FS_DIG1: u16 = 0x2F12;
    pub const FS_DIG0: u16 = 0x2F13;
    pub const FS_CAL3: u16 = 0x2F14;
    pub const FS_CAL2: u16 = 0x2F15;
    pub const FS_CAL1: u16 = 0x2F16;
    pub const FS_CAL0: u16 = 0x2F17;
    pub const FS_CHP: u16 = 0x2F18;
    pub const FS_DIVTWO: u16 = 0x2F19;
    pub const FS_DSM1: u16 = 0x2F1A;
    pub const FS_DSM0: u16 = 0x2F1B;
    pub const FS_DVC1: u16 = 0x2F1C;
    pub const FS_DVC0: u16 = 0x2F1D;
    pub const FS_LBI: u16 = 0x2F1E;
    pub const FS_PFD: u16 = 0x2F1F;
    pub const FS_PRE: u16 = 0x2F20;
    pub const FS_REG_DIV_CML: u16 = 0x2F21;
    pub const FS_SPARE: u16 = 0x2F22;
    pub const FS_VCO4: u16 = 0x2F23;
    pub const FS_VCO3: u16 = 0x2F24;
    pub const FS_VCO2: u16 = 0x2F25;
    pub const FS_VCO1: u16 = 0x2F26;
    pub const FS_VCO0: u16 = 0x2F27;
    pub const GBIAS6: u16 = 0x2F28;
    pub const GBIAS5: u16 = 0x2F29;
    pub const GBIAS4: u16 = 0x2F2A;
    pub const GBIAS3: u16 = 0x2F2B;
    pub const GBIAS2: u16 = 0x2F2C;
    pub const GBIAS1: u16 = 0x2F2D;
    pub const GBIAS0: u16 = 0x2F2E;
    pub const IFAMP: u16 = 0x2F2F;
    pub const LNA: u16 = 0x2F30;
    pub const RXMIX: u16 = 0x2F31;
    pub const XOSC5: u16 = 0x2F32;
    pub const XOSC4: u16 = 0x2F33;
    pub const XOSC3: u16 = 0x2F34;
    pub const XOSC2: u16 = 0x2F35;
    pub const XOSC1: u16 = 0x2F36;
    pub const XOSC0: u16 = 0x2F37;
    pub const IQIE_I1: u16 = 0x2F6D;
    pub const IQIE_I0: u16 = 0x2F6E;
    pub const IQIE_Q1: u16 = 0x2F6F;
    pub const IQIE_Q0: u16 = 0x2F70;
    pub const RSSI1: u16 = 0x2F71;
    pub const RSSI0: u16 = 0x2F72;
    pub const MARCSTATE: u16 = 0x2F73;
    pub const LQI_VAL: u16 = 0x2F74;
    pub const CHFILT_I0: u16 = 0x2F89;
    pub const CHFILT_Q0: u16 = 0x2F8B;
    pub const PARTNUMBER: u16 = 0x2F8F;
    pub const PARTVERSION: u16 = 0x2F90;
    pub const MARC_STATUS1: u16 = 0x2F94;
    pub const MARC_STATUS0: u16 = 0x2F95;
    pub const NUM_TXBYTES: u16 = 0x2FD6;
    pub const NUM_RXBYTES: u16 = 0x2FD7;
}

/// Values and masks interpreted by the driver.
pub mod mnemonics {
    /// `MARCSTATE` bits holding the main radio control state.
    pub const MARC_STATE_MASK: u8 = 0x1F;
    /// `MARCSTATE` value signalling an RX FIFO overflow/underflow.
    pub const MARC_RX_FIFO_ERR: u8 = 0x11;
    /// `MARCSTATE` value signalling a TX FIFO overflow/underflow.
    pub const MARC_TX_FIFO_ERR: u8 = 0x16;
    /// Expected `PARTNUMBER` value.
    pub const PARTNUMBER_CC1200: u8 = 0x20;
    /// `PARTNUMBER` value of the CC1201 sibling.
    pub const PARTNUMBER_CC1201: u8 = 0x21;
    /// First short-space offset that addresses the FIFOs and strobes.
    pub const FIFO_RANGE_START: u8 = 0x3F;
    /// Crystal oscillator frequency in Hz.
    pub const F_XTAL: u64 = 40_000_000;
    /// Local oscillator divider for the 820-960 MHz band.
    pub const LO_DIVIDER: u64 = 4;
    /// Carrier frequency of channel 0 in Hz.
    pub const BASE_FREQUENCY: u32 = 863_400_000;
    /// Spacing between adjacent channels in Hz.
    pub const CHANNEL_SPACING: u32 = 200_000;
    /// Highest selectable channel number.
    pub const MAX_CHANNEL: u8 = 30;
    /// Time to wait between polls of a calibrating/settling chip.
    pub const SETTLE_POLL_US: u32 = 50;
    /// Time between the two reset strobes of a soft reset.
    pub const SOFT_RESET_US: u32 = 5_000;
    /// Width of each phase of the hardware reset pulse.
    pub const HW_RESET_US: u32 = 2_000;
}
