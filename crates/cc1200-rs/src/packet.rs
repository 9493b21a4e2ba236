//! The in-memory representation of a variable length packet.

use core::fmt::{Debug, Formatter, Result};

use crate::types::LinkStatus;

/// A received (or to-be-transmitted) packet.
///
/// The on-air frame is `[length][address][payload][rssi][crc|lqi]` where the
/// `length` byte counts the address byte too. [`Packet::len()`] always
/// reports the pure payload length.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// First status byte appended by the chip (raw RSSI).
    pub rssi: u8,
    /// Second status byte appended by the chip.
    pub link: LinkStatus,
    /// Destination/source address byte.
    pub address: u8,
    length: u8,
    payload: [u8; Packet::PAYLOAD_CAPACITY],
}

impl Packet {
    /// The longest payload that fits the chip's 8-bit length field
    /// once the address byte is accounted for.
    pub const MAX_PAYLOAD_LENGTH: usize = 254;
    /// Payload storage: the longest payload plus the two appended status bytes.
    pub const PAYLOAD_CAPACITY: usize = Self::MAX_PAYLOAD_LENGTH + 2;
    /// Serialized size in bytes, see [`Packet::to_bytes()`].
    pub const SIZE: usize = 4 + Self::PAYLOAD_CAPACITY;

    /// Create a packet for transmission.
    ///
    /// Returns `None` if `payload` is longer than [`Packet::MAX_PAYLOAD_LENGTH`].
    pub fn new(address: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > Self::MAX_PAYLOAD_LENGTH {
            return None;
        }
        let mut packet = Self {
            address,
            length: payload.len() as u8,
            ..Default::default()
        };
        packet.payload[..payload.len()].copy_from_slice(payload);
        Some(packet)
    }

    /// Build a packet from the fields the RX path parsed out of the FIFO.
    ///
    /// `payload` is truncated to [`Packet::MAX_PAYLOAD_LENGTH`].
    pub(crate) fn received(address: u8, payload: &[u8], rssi: u8, link: LinkStatus) -> Self {
        let len = payload.len().min(Self::MAX_PAYLOAD_LENGTH);
        let mut packet = Self {
            rssi,
            link,
            address,
            length: len as u8,
            payload: [0u8; Self::PAYLOAD_CAPACITY],
        };
        packet.payload[..len].copy_from_slice(&payload[..len]);
        packet
    }

    /// The payload bytes (excluding address and status bytes).
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }

    /// The payload length (excluding the address byte).
    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The value of the on-air length byte (payload plus the address byte).
    pub fn wire_length(&self) -> u8 {
        self.length + 1
    }

    /// Did the chip report a matching CRC for this packet?
    pub fn crc_ok(&self) -> bool {
        self.link.crc_ok()
    }

    /// Serialize as `[rssi][link][length][address][payload storage]`.
    ///
    /// Bytes of the payload storage past [`Packet::len()`] are always zero.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.rssi;
        buf[1] = self.link.into_bits();
        buf[2] = self.length;
        buf[3] = self.address;
        buf[4..4 + self.len()].copy_from_slice(self.payload());
        buf
    }

    /// Deserialize a packet from the layout written by [`Packet::to_bytes()`].
    ///
    /// Returns `None` if `buf` is too short or its length byte exceeds
    /// [`Packet::MAX_PAYLOAD_LENGTH`].
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        let len = buf[2] as usize;
        if len > Self::MAX_PAYLOAD_LENGTH {
            return None;
        }
        Some(Self::received(
            buf[3],
            &buf[4..4 + len],
            buf[0],
            LinkStatus::from_bits(buf[1]),
        ))
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            rssi: 0,
            link: LinkStatus::new(),
            address: 0,
            length: 0,
            payload: [0u8; Self::PAYLOAD_CAPACITY],
        }
    }
}

impl Debug for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Packet")
            .field("rssi", &self.rssi)
            .field("crc_ok", &self.link.crc_ok())
            .field("lqi", &self.link.lqi())
            .field("address", &self.address)
            .field("payload", &self.payload())
            .finish()
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for Packet {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Packet {{ rssi: {}, link: {}, address: {}, payload: {=[u8]} }}",
            self.rssi,
            self.link,
            self.address,
            self.payload()
        )
    }
}

/// The result of draining the RX FIFO.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RxOutcome {
    /// Nothing was pending.
    Empty,
    /// A complete frame was read.
    ///
    /// The CRC flag is reported as received; it is up to the caller to discard
    /// packets with a bad CRC.
    Packet(Packet),
    /// The chip reported an RX FIFO error. The FIFO was flushed.
    FifoError,
    /// The pending bytes did not form a complete frame. The FIFO was flushed.
    Malformed,
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::Packet;
    use crate::types::LinkStatus;

    #[test]
    fn new_packet() {
        let packet = Packet::new(0xAA, b"hello").unwrap();
        assert_eq!(packet.len(), 5);
        assert_eq!(packet.wire_length(), 6);
        assert_eq!(packet.payload(), b"hello");
        assert!(!packet.crc_ok());

        let max = [0x55u8; Packet::MAX_PAYLOAD_LENGTH];
        assert_eq!(Packet::new(0, &max).unwrap().wire_length(), 255);
        let too_long = [0u8; Packet::MAX_PAYLOAD_LENGTH + 1];
        assert!(Packet::new(0, &too_long).is_none());
        assert!(Packet::new(1, &[]).unwrap().is_empty());
    }

    #[test]
    fn serialized_layout() {
        let link = LinkStatus::new().with_crc_ok(true).with_lqi(9);
        let packet = Packet::received(0x12, &[1, 2, 3], 0xC4, link);
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), 260);
        assert_eq!(bytes[..7], [0xC4, 0x89, 3, 0x12, 1, 2, 3]);
        assert!(bytes[7..].iter().all(|b| *b == 0));
        assert_eq!(Packet::from_bytes(&bytes), Some(packet));
    }

    #[test]
    fn reject_malformed_bytes() {
        let mut bytes = [0u8; Packet::SIZE];
        assert!(Packet::from_bytes(&bytes[..Packet::SIZE - 1]).is_none());
        bytes[2] = 255;
        assert!(Packet::from_bytes(&bytes).is_none());
    }
}
