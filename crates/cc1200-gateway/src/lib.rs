//! A gateway between up to four CC1200 transceivers and a local application.
//!
//! Each [`RadioModule`] is drained by its own interrupt worker into a bounded
//! [`PacketQueue`]. The [`Gateway`]'s inbound loop forwards packets with a good
//! CRC as [`ApRecord`]s to a [`PacketSink`], while its outbound loop transmits
//! records read from a [`RecordSource`] on the module they name.
//!
//! All modules share one SPI bus; see [`bus`].

pub mod bus;
mod config;
pub use config::{GatewayConfig, ModuleConfig};
mod dispatch;
pub use dispatch::{Gateway, GatewayStats};
mod error;
pub use error::GatewayError;
pub mod irq;
mod module;
pub use module::RadioModule;
#[cfg(unix)]
mod pipes;
#[cfg(unix)]
pub use pipes::CreatedPipes;
mod queue;
pub use queue::PacketQueue;
mod record;
pub use record::{
    ApRecord, PacketSink, PipeSink, PipeSource, RecordReader, RecordSource, RecordWriter,
};
mod semaphore;
pub use semaphore::Semaphore;

#[cfg(all(feature = "linux", target_os = "linux"))]
pub mod linux;
