//! Fixed-size records exchanged with the application over a pair of byte streams.
//!
//! A record is the module number followed by the packet layout of
//! [`Packet::to_bytes()`]. Both directions use the same layout.

use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read, Write},
    path::PathBuf,
    sync::mpsc,
};

use cc1200::Packet;

use crate::GatewayError;

/// A packet tagged with the module it was received on (or should be sent from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    pub module: u8,
    pub packet: Packet,
}

impl ApRecord {
    pub const SIZE: usize = 1 + Packet::SIZE;

    pub fn new(module: u8, packet: Packet) -> Self {
        Self { module, packet }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.module;
        buf[1..].copy_from_slice(&self.packet.to_bytes());
        buf
    }

    /// Returns `None` if `buf` is shorter than [`ApRecord::SIZE`]
    /// or the packet's length byte is out of range.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Packet::from_bytes(&buf[1..Self::SIZE]).map(|packet| Self::new(buf[0], packet))
    }
}

/// Where the inbound loop puts good packets.
pub trait PacketSink {
    fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError>;
}

/// Where the outbound loop gets packets to transmit.
pub trait RecordSource {
    /// Block until a complete record is available.
    ///
    /// Returns `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<ApRecord>, GatewayError>;
}

impl PacketSink for Vec<ApRecord> {
    fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError> {
        self.push(record);
        Ok(())
    }
}

impl PacketSink for mpsc::Sender<ApRecord> {
    fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError> {
        self.send(record)
            .map_err(|_| io::Error::new(ErrorKind::BrokenPipe, "record receiver dropped").into())
    }
}

/// Writes records to a byte stream.
#[derive(Debug)]
pub struct RecordWriter<W> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PacketSink for RecordWriter<W> {
    fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError> {
        self.inner.write_all(&record.to_bytes())?;
        self.inner.flush()?;
        Ok(())
    }
}

/// Reads records from a byte stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    buf: Box<[u8; ApRecord::SIZE]>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Box::new([0u8; ApRecord::SIZE]),
        }
    }
}

impl<R: Read> RecordSource for RecordReader<R> {
    /// End of stream on a record boundary is reported as `None`;
    /// anywhere else it is a [`GatewayError::MalformedRecord`].
    fn next_record(&mut self) -> Result<Option<ApRecord>, GatewayError> {
        let mut filled = 0;
        while filled < ApRecord::SIZE {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(GatewayError::MalformedRecord("truncated record")),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => return Err(e.into()),
            }
        }
        ApRecord::from_bytes(&self.buf[..])
            .map(Some)
            .ok_or(GatewayError::MalformedRecord("packet length out of range"))
    }
}

/// A named pipe written by the gateway.
///
/// The pipe is opened on the first record (blocking until a reader shows up)
/// and reopened after the reader goes away.
#[derive(Debug)]
pub struct PipeSink {
    path: PathBuf,
    writer: Option<RecordWriter<File>>,
}

impl PipeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }
}

impl PacketSink for PipeSink {
    fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError> {
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => {
                let file = OpenOptions::new().write(true).open(&self.path)?;
                log::debug!("Opened {} for writing", self.path.display());
                self.writer.insert(RecordWriter::new(file))
            }
        };
        let result = writer.forward(record);
        if result.is_err() {
            self.writer = None;
        }
        result
    }
}

/// A named pipe read by the gateway.
///
/// When a writer closes the pipe, the pipe is reopened and reading resumes,
/// so this source is never exhausted.
#[derive(Debug)]
pub struct PipeSource {
    path: PathBuf,
    reader: Option<RecordReader<File>>,
}

impl PipeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
        }
    }
}

impl RecordSource for PipeSource {
    fn next_record(&mut self) -> Result<Option<ApRecord>, GatewayError> {
        loop {
            let reader = match self.reader.as_mut() {
                Some(reader) => reader,
                None => {
                    let file = File::open(&self.path)?;
                    log::debug!("Opened {} for reading", self.path.display());
                    self.reader.insert(RecordReader::new(file))
                }
            };
            match reader.next_record() {
                Ok(None) => self.reader = None,
                Err(e) => {
                    self.reader = None;
                    return Err(e);
                }
                record => return record,
            }
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{ApRecord, PacketSink, RecordReader, RecordSource, RecordWriter};
    use crate::GatewayError;
    use cc1200::{LinkStatus, Packet};
    use std::io::Cursor;

    fn record(module: u8, payload: &[u8]) -> ApRecord {
        let mut packet = Packet::new(0x42, payload).unwrap();
        packet.rssi = 0xD0;
        packet.link = LinkStatus::from_bits(0x83);
        ApRecord::new(module, packet)
    }

    #[test]
    fn record_layout() {
        let bytes = record(3, b"abc").to_bytes();
        assert_eq!(bytes.len(), 261);
        assert_eq!(bytes[..8], [3, 0xD0, 0x83, 3, 0x42, b'a', b'b', b'c']);
        assert!(bytes[8..].iter().all(|b| *b == 0));
        assert!(ApRecord::from_bytes(&bytes[..260]).is_none());
    }

    #[test]
    fn stream_records() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.forward(record(1, b"one")).unwrap();
        writer.forward(record(4, &[0x55; 254])).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 2 * ApRecord::SIZE);

        let mut reader = RecordReader::new(Cursor::new(bytes));
        assert_eq!(reader.next_record().unwrap(), Some(record(1, b"one")));
        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.module, 4);
        assert_eq!(second.packet.len(), 254);
        assert_eq!(reader.next_record().unwrap(), None);
    }

    #[test]
    fn truncated_stream() {
        let bytes = record(1, b"one").to_bytes();
        let mut reader = RecordReader::new(Cursor::new(bytes[..100].to_vec()));
        assert!(matches!(
            reader.next_record(),
            Err(GatewayError::MalformedRecord(_))
        ));
    }

    #[test]
    fn bad_packet_length() {
        let mut bytes = record(1, b"one").to_bytes();
        bytes[3] = 255;
        let mut reader = RecordReader::new(Cursor::new(bytes.to_vec()));
        assert!(matches!(
            reader.next_record(),
            Err(GatewayError::MalformedRecord(_))
        ));
    }
}
