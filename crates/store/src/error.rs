// In crates/store/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to the state store")]
    ConnectionError(#[from] sqlx::Error),
    #[error("State store migration failed: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("State store operation failed")]
    OperationFailed(sqlx::Error),
    #[error("Failed to (de)serialize stored state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Stored value for {asset} is corrupt: {reason}")]
    Corrupt { asset: String, reason: String },
    #[error("Version conflict for {asset}: expected version {expected}")]
    VersionConflict { asset: String, expected: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
