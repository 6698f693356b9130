// In crates/engine/src/lib.rs

pub mod error;
pub mod event;

pub use error::ProcessingError;
pub use event::{StreamEvent, StreamRecord};

use core_types::{AssetId, AssetState, AssetStatePatch, IndicatorFamily, PricePoint, Signal};
use indicators::{append_and_bound, compute, detect};
use notify::{AlertPublisher, TrendAlert};
use position::apply_cross;
use std::sync::Arc;
use store::StateStore;

/// Decimal places applied to indicator values at the persistence and
/// publishing boundaries. The persisted (rounded) values are what the
/// next observation compares against.
const INDICATOR_PLACES: u32 = 5;

/// Outcome of one successfully processed record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub asset_id: AssetId,
    pub ema_signal: Signal,
    pub sma_signal: Signal,
    pub alert_published: bool,
    pub notify_failed: bool,
}

/// Per-batch accounting.
///
/// The batch driver always attempts every record, so "the batch
/// completed" alone says nothing; these counts let callers distinguish
/// a clean run from one that silently dropped everything, and decide
/// what to redrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub processed: usize,
    pub alerts_published: usize,
    pub decode_failures: usize,
    pub store_failures: usize,
    pub notify_failures: usize,
}

/// The stream-triggered trend-detection engine.
///
/// Stateless apart from its injected collaborators: all durable state
/// lives behind the `StateStore`, and alerts leave through the
/// `AlertPublisher`. Both are constructed and owned by the host.
pub struct Engine {
    store: Arc<dyn StateStore>,
    publisher: Arc<dyn AlertPublisher>,
}

impl Engine {
    pub fn new(store: Arc<dyn StateStore>, publisher: Arc<dyn AlertPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Processes a batch of stream records strictly in delivery order,
    /// one at a time, so indicator recomputation for one asset is never
    /// reordered within a batch.
    ///
    /// Individual record failures are logged and counted; no record
    /// aborts the batch.
    pub async fn process_event(&self, event: &StreamEvent) -> BatchSummary {
        let mut summary = BatchSummary {
            records: event.records.len(),
            ..BatchSummary::default()
        };

        for record in &event.records {
            match self.process_record(record.data.as_bytes()).await {
                Ok(processed) => {
                    summary.processed += 1;
                    if processed.alert_published {
                        summary.alerts_published += 1;
                    }
                    if processed.notify_failed {
                        summary.notify_failures += 1;
                    }
                }
                Err(ProcessingError::Decode(err)) => {
                    summary.decode_failures += 1;
                    tracing::error!(error = %err, raw = %record.data, "Skipping undecodable record.");
                }
                Err(ProcessingError::Store(err)) => {
                    summary.store_failures += 1;
                    tracing::error!(error = %err, "State store failure, skipping record.");
                }
            }
        }

        tracing::info!(?summary, "Batch complete.");
        summary
    }

    /// The per-record pipeline: decode, read state, append to the bounded
    /// history, recompute indicators, classify crossovers against the
    /// previously persisted values, run the per-family position machines,
    /// persist, and publish an alert if anything crossed.
    pub async fn process_record(&self, data: &[u8]) -> Result<ProcessedRecord, ProcessingError> {
        // --- 1. Decode ---
        let observation = decoder::decode_record(data)?;
        let asset = observation.asset_id.clone();

        // --- 2. Read prior state (lazily created on first sight) ---
        let (mut state, first_seen) = match self.store.get(&asset).await? {
            Some(state) => (state, false),
            None => (AssetState::default(), true),
        };

        // --- 3. History + indicators ---
        let (history, count) = append_and_bound(
            std::mem::take(&mut state.price_history),
            PricePoint {
                price: observation.price,
                at: observation.at,
            },
        );
        let current = compute(&history);

        // Crossovers are judged against the values persisted by the
        // previous run. A first-ever observation compares against itself
        // and can therefore never claim a cross.
        let previous = if first_seen {
            current
        } else {
            state.indicators()
        };

        // --- 4. Crossover classification ---
        let ema_signal = detect(
            current.ema_short,
            current.ema_long,
            previous.ema_short,
            previous.ema_long,
        );
        let sma_signal = detect(
            current.sma_short,
            current.sma_long,
            previous.sma_short,
            previous.sma_long,
        );
        let trend_status = format!(
            "EMA: {}, SMA: {}",
            ema_signal.trend_label(),
            sma_signal.trend_label()
        );

        // --- 5. Persist history and indicators ---
        let mut version = state.version;
        self.store
            .put(
                &asset,
                AssetStatePatch {
                    expected_version: version,
                    price_history: Some(history),
                    num_price_history: Some(count as u32),
                    indicators: Some(current.round_dp(INDICATOR_PLACES)),
                    last_updated: Some(observation.at),
                    trend_status: Some(trend_status.clone()),
                    ..AssetStatePatch::default()
                },
            )
            .await?;
        version += 1;

        // --- 6. Position machines, one per family that crossed ---
        for (family, signal) in [
            (IndicatorFamily::Ema, ema_signal),
            (IndicatorFamily::Sma, sma_signal),
        ] {
            if !signal.is_cross() {
                continue;
            }
            let mut position = state.position(family).clone();
            let outcome = apply_cross(&mut position, family, signal, observation.price, observation.at);
            tracing::info!(asset = %asset, %family, %signal, ?outcome, "Crossover detected.");

            let mut patch = AssetStatePatch {
                expected_version: version,
                ..AssetStatePatch::default()
            };
            patch.set_position(family, position);
            self.store.put(&asset, patch).await?;
            version += 1;
        }

        // --- 7. Alert (conditional, best-effort) ---
        let mut alert_published = false;
        let mut notify_failed = false;
        if ema_signal.is_cross() || sma_signal.is_cross() {
            let alert = TrendAlert::new(
                &asset,
                ema_signal,
                sma_signal,
                &trend_status,
                observation.price,
                &current,
                observation.at,
            );
            match self.publisher.publish(&alert).await {
                Ok(()) => alert_published = true,
                Err(err) => {
                    // State is already committed; delivery is not
                    // transactional with it.
                    notify_failed = true;
                    tracing::warn!(asset = %asset, error = %err, "Alert delivery failed.");
                }
            }
        }

        Ok(ProcessedRecord {
            asset_id: asset,
            ema_signal,
            sma_signal,
            alert_published,
            notify_failed,
        })
    }
}
