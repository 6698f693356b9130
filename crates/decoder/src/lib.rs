// In crates/decoder/src/lib.rs

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, FixedOffset};
use core_types::{AssetId, PriceObservation};
use rust_decimal::Decimal;
use serde::Deserialize;

pub mod error;

// Re-export public types
pub use error::{Error, Result};

/// Offset of the reporting timezone (UTC+7). Observation timestamps are
/// converted to this offset before anything else sees them, so it is the
/// offset carried by every persisted and published timestamp.
const REPORTING_OFFSET_SECS: i32 = 7 * 3600;

/// The JSON envelope published by the price-ingestion task.
///
/// `symbol` and `market_cap` are also present on the wire but the engine
/// never consumes them, so they are not deserialized here.
#[derive(Debug, Deserialize)]
struct Envelope {
    id: String,
    // Arbitrary-precision deserialization: the price must never round-trip
    // through binary floating point.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    price: Decimal,
    timestamp: String,
}

/// Decodes one raw stream record into a typed `PriceObservation`.
///
/// `data` is the base64-wrapped JSON envelope as it arrives on the
/// stream. The observation timestamp (RFC 3339, `Z` or explicit offset)
/// becomes the canonical `at` after conversion to the reporting offset.
///
/// A failure here means the record is malformed and must be skipped, not
/// retried; callers log the raw record for diagnosis.
pub fn decode_record(data: &[u8]) -> Result<PriceObservation> {
    let raw = BASE64.decode(data)?;
    let text = std::str::from_utf8(&raw)?;
    let envelope: Envelope = serde_json::from_str(text)?;

    let observed =
        DateTime::parse_from_rfc3339(&envelope.timestamp).map_err(|source| Error::Timestamp {
            value: envelope.timestamp.clone(),
            source,
        })?;
    let reporting =
        FixedOffset::east_opt(REPORTING_OFFSET_SECS).expect("reporting offset is in range");

    Ok(PriceObservation {
        asset_id: AssetId(envelope.id),
        price: envelope.price,
        at: observed.with_timezone(&reporting),
    })
}
