use super::{access, mnemonics};

/// A 16-bit register address split into its address space and offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterAddress(u16);

impl RegisterAddress {
    pub const fn new(address: u16) -> Self {
        Self(address)
    }

    /// The address space prefix: `0x00` (short) or `0x2F` (extended).
    pub const fn extension(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn offset(&self) -> u8 {
        self.0 as u8
    }

    pub const fn into_bits(self) -> u16 {
        self.0
    }

    pub const fn is_extended(&self) -> bool {
        self.extension() == access::EXTENDED
    }

    /// Does this address fall in the FIFO/command strobe range of the short space?
    pub const fn is_fifo(&self) -> bool {
        self.extension() == 0 && self.offset() >= mnemonics::FIFO_RANGE_START
    }

    /// Does this short space offset select the extended space or a command strobe?
    ///
    /// Offset `0x2F` is the extended space prefix and `0x30..=0x3D` are strobes.
    pub const fn is_command(&self) -> bool {
        self.extension() == 0
            && self.offset() >= access::EXTENDED
            && self.offset() < mnemonics::FIFO_RANGE_START
    }

    /// Is this address a register in either register space?
    pub const fn is_valid(&self) -> bool {
        (self.extension() == 0 && self.offset() < access::EXTENDED) || self.is_extended()
    }

    /// Write the SPI header for this address into `buf`.
    ///
    /// Returns the header length (1 for the short space, 2 for the extended space).
    pub(crate) fn write_header(&self, access_bits: u8, buf: &mut [u8]) -> usize {
        if self.is_extended() {
            buf[0] = access_bits | access::EXTENDED;
            buf[1] = self.offset();
            2
        } else {
            buf[0] = access_bits | self.offset();
            1
        }
    }
}

impl From<u16> for RegisterAddress {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
