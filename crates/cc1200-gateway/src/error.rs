use std::fmt::Debug;

use thiserror::Error;

/// Errors surfaced by the gateway.
///
/// Hardware errors of the radio driver are generic over the SPI implementation,
/// so they are captured by their `Debug` rendering.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("radio module {module}: {detail}")]
    Radio { module: u8, detail: String },
    #[error("no radio module numbered {0}")]
    UnknownModule(u8),
    #[error("malformed record: {0}")]
    MalformedRecord(&'static str),
    #[error("GPIO: {0}")]
    Gpio(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn radio(module: u8, err: impl Debug) -> Self {
        Self::Radio {
            module,
            detail: format!("{err:?}"),
        }
    }

    pub fn gpio(err: impl Debug) -> Self {
        Self::Gpio(format!("{err:?}"))
    }
}
