// In crates/decoder/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Record payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Malformed observation envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Unparsable timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
