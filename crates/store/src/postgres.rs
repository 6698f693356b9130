// In crates/store/src/postgres.rs

use crate::{Error, Result, StateStore};
use async_trait::async_trait;
use chrono::DateTime;
use core_types::{AssetId, AssetState, AssetStatePatch, PositionState, PricePoint};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

/// A `StateStore` backed by PostgreSQL, one row per asset.
///
/// Scalar fields live in scalar columns; the histories and the two
/// position structures are JSONB. A partial update only touches the
/// columns named by the patch, and every write carries a
/// `WHERE version = expected` guard so concurrent invocations cannot
/// silently overwrite each other.
#[derive(Debug, Clone)]
pub struct PostgresStore(PgPool);

/// Establishes a connection pool to the PostgreSQL state store and runs
/// migrations.
pub async fn connect(url: &str) -> Result<PostgresStore> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        // The `?` operator uses the `#[from]` attribute in our error enum
        // to automatically convert the `sqlx::Error` into a store `Error`.
        .connect(url)
        .await?;

    // Run migrations. This ensures the asset_state schema is up-to-date.
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(Error::from)?;

    Ok(PostgresStore(pool))
}

#[async_trait]
impl StateStore for PostgresStore {
    async fn get(&self, asset: &AssetId) -> Result<Option<AssetState>> {
        let row = sqlx::query(
            r#"
            SELECT version, price_history, num_price_history,
                   ema_short, ema_long, sma_short, sma_long,
                   last_updated, trend_status, ema_position, sma_position
            FROM asset_state
            WHERE coin_id = $1
            "#,
        )
        .bind(&asset.0)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let price_history: Vec<PricePoint> =
            serde_json::from_value(row.try_get("price_history").map_err(Error::OperationFailed)?)?;
        let ema_position: PositionState =
            serde_json::from_value(row.try_get("ema_position").map_err(Error::OperationFailed)?)?;
        let sma_position: PositionState =
            serde_json::from_value(row.try_get("sma_position").map_err(Error::OperationFailed)?)?;

        let version: i64 = row.try_get("version").map_err(Error::OperationFailed)?;
        let num_price_history: i32 = row
            .try_get("num_price_history")
            .map_err(Error::OperationFailed)?;
        let trend_status: String = row.try_get("trend_status").map_err(Error::OperationFailed)?;

        let last_updated = row
            .try_get::<Option<String>, _>("last_updated")
            .map_err(Error::OperationFailed)?
            .map(|text| {
                DateTime::parse_from_rfc3339(&text).map_err(|e| corrupt(asset, "last_updated", e))
            })
            .transpose()?;

        Ok(Some(AssetState {
            version: version as u64,
            price_history,
            num_price_history: num_price_history as u32,
            ema_short: decimal_column(&row, asset, "ema_short")?,
            ema_long: decimal_column(&row, asset, "ema_long")?,
            sma_short: decimal_column(&row, asset, "sma_short")?,
            sma_long: decimal_column(&row, asset, "sma_long")?,
            last_updated,
            trend_status,
            ema_position,
            sma_position,
        }))
    }

    async fn put(&self, asset: &AssetId, patch: AssetStatePatch) -> Result<()> {
        if patch.expected_version == 0 {
            return self.insert(asset, patch).await;
        }
        self.update(asset, patch).await
    }
}

impl PostgresStore {
    /// First write for an asset: materialize the full row from defaults
    /// plus the patch. A concurrent first writer loses on the primary
    /// key and gets a version conflict.
    async fn insert(&self, asset: &AssetId, patch: AssetStatePatch) -> Result<()> {
        let mut state = AssetState::default();
        patch.apply(&mut state);

        let result = sqlx::query(
            r#"
            INSERT INTO asset_state
                (coin_id, version, price_history, num_price_history,
                 ema_short, ema_long, sma_short, sma_long,
                 last_updated, trend_status, ema_position, sma_position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (coin_id) DO NOTHING
            "#,
        )
        .bind(&asset.0)
        .bind(state.version as i64)
        .bind(serde_json::to_value(&state.price_history)?)
        .bind(state.num_price_history as i32)
        .bind(state.ema_short.to_string())
        .bind(state.ema_long.to_string())
        .bind(state.sma_short.to_string())
        .bind(state.sma_long.to_string())
        .bind(state.last_updated.map(|at| at.to_rfc3339()))
        .bind(&state.trend_status)
        .bind(serde_json::to_value(&state.ema_position)?)
        .bind(serde_json::to_value(&state.sma_position)?)
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        if result.rows_affected() == 0 {
            return Err(Error::VersionConflict {
                asset: asset.to_string(),
                expected: 0,
            });
        }
        tracing::debug!(asset = %asset, "Created asset state row.");
        Ok(())
    }

    async fn update(&self, asset: &AssetId, patch: AssetStatePatch) -> Result<()> {
        let expected = patch.expected_version;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE asset_state SET version = ");
        builder.push_bind((expected + 1) as i64);
        if let Some(history) = &patch.price_history {
            builder.push(", price_history = ");
            builder.push_bind(serde_json::to_value(history)?);
        }
        if let Some(count) = patch.num_price_history {
            builder.push(", num_price_history = ");
            builder.push_bind(count as i32);
        }
        if let Some(set) = patch.indicators {
            builder.push(", ema_short = ");
            builder.push_bind(set.ema_short.to_string());
            builder.push(", ema_long = ");
            builder.push_bind(set.ema_long.to_string());
            builder.push(", sma_short = ");
            builder.push_bind(set.sma_short.to_string());
            builder.push(", sma_long = ");
            builder.push_bind(set.sma_long.to_string());
        }
        if let Some(at) = patch.last_updated {
            builder.push(", last_updated = ");
            builder.push_bind(at.to_rfc3339());
        }
        if let Some(trend) = &patch.trend_status {
            builder.push(", trend_status = ");
            builder.push_bind(trend.clone());
        }
        if let Some(position) = &patch.ema_position {
            builder.push(", ema_position = ");
            builder.push_bind(serde_json::to_value(position)?);
        }
        if let Some(position) = &patch.sma_position {
            builder.push(", sma_position = ");
            builder.push_bind(serde_json::to_value(position)?);
        }
        builder.push(" WHERE coin_id = ");
        builder.push_bind(&asset.0);
        builder.push(" AND version = ");
        builder.push_bind(expected as i64);

        let result = builder
            .build()
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        if result.rows_affected() == 0 {
            return Err(Error::VersionConflict {
                asset: asset.to_string(),
                expected,
            });
        }
        Ok(())
    }
}

fn decimal_column(row: &sqlx::postgres::PgRow, asset: &AssetId, field: &str) -> Result<Decimal> {
    let value: Option<String> = row.try_get(field).map_err(Error::OperationFailed)?;
    match value {
        None => Ok(Decimal::ZERO),
        Some(text) => text.parse().map_err(|e| corrupt(asset, field, e)),
    }
}

fn corrupt(asset: &AssetId, field: &str, err: impl std::fmt::Display) -> Error {
    Error::Corrupt {
        asset: asset.to_string(),
        reason: format!("{field}: {err}"),
    }
}
