// In crates/notify/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Alert delivery failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Alert endpoint answered with status {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, Error>;
