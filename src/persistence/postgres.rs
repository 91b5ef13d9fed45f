//! PostgreSQL implementation of the persistence layer.
//!
//! Counter updates use `SET x = x + 1` so concurrent increments cannot lose
//! updates; the ledger insert and its counter bump share one transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{LiveStateRow, RedemptionRow};
use crate::domain::VenueLiveState;
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a redemption to the ledger and bumps the offer's redemption
    /// counter in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn record_redemption(&self, row: &RedemptionRow) -> Result<(), GatewayError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO offer_redemptions (id, offer_id, venue_id, user_id, source, redeemed_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(row.id)
        .bind(row.offer_id)
        .bind(row.venue_id)
        .bind(row.user_id)
        .bind(&row.source)
        .bind(row.redeemed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::query("UPDATE offers SET redeem_count = redeem_count + 1 WHERE id = $1")
            .bind(row.offer_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Atomically increments an offer's view counter.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn increment_view_count(&self, offer_id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("UPDATE offers SET view_count = view_count + 1 WHERE id = $1")
            .bind(offer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Atomically increments an offer's click counter.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn increment_click_count(&self, offer_id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("UPDATE offers SET click_count = click_count + 1 WHERE id = $1")
            .bind(offer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Appends a live-state change row for a venue.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_live_state(
        &self,
        venue_id: Uuid,
        state: &VenueLiveState,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO live_state_history \
             (venue_id, busyness, vibe, busyness_updated_at, vibe_updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(venue_id)
        .bind(state.busyness.level.as_str())
        .bind(state.vibe.value.as_str())
        .bind(state.busyness.updated_at)
        .bind(state.vibe.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads redemptions after the given timestamp, optionally filtered by venue.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_redemptions_after(
        &self,
        after: DateTime<Utc>,
        venue_id: Option<Uuid>,
    ) -> Result<Vec<RedemptionRow>, GatewayError> {
        let rows = if let Some(vid) = venue_id {
            sqlx::query_as::<_, (Uuid, Uuid, Uuid, Option<Uuid>, String, DateTime<Utc>)>(
                "SELECT id, offer_id, venue_id, user_id, source, redeemed_at \
                 FROM offer_redemptions \
                 WHERE redeemed_at > $1 AND venue_id = $2 ORDER BY redeemed_at ASC",
            )
            .bind(after)
            .bind(vid)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (Uuid, Uuid, Uuid, Option<Uuid>, String, DateTime<Utc>)>(
                "SELECT id, offer_id, venue_id, user_id, source, redeemed_at \
                 FROM offer_redemptions \
                 WHERE redeemed_at > $1 ORDER BY redeemed_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, offer_id, venue_id, user_id, source, redeemed_at)| RedemptionRow {
                    id,
                    offer_id,
                    venue_id,
                    user_id,
                    source,
                    redeemed_at,
                },
            )
            .collect())
    }

    /// Loads the most recent live-state rows for a venue, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_live_state_history(
        &self,
        venue_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LiveStateRow>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                Uuid,
                String,
                String,
                DateTime<Utc>,
                DateTime<Utc>,
                DateTime<Utc>,
            ),
        >(
            "SELECT id, venue_id, busyness, vibe, busyness_updated_at, vibe_updated_at, \
             recorded_at FROM live_state_history \
             WHERE venue_id = $1 ORDER BY recorded_at DESC LIMIT $2",
        )
        .bind(venue_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, venue_id, busyness, vibe, busyness_updated_at, vibe_updated_at, recorded_at)| {
                    LiveStateRow {
                        id,
                        venue_id,
                        busyness,
                        vibe,
                        busyness_updated_at,
                        vibe_updated_at,
                        recorded_at,
                    }
                },
            )
            .collect())
    }

    /// Deletes live-state history older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_history(&self, before_days: u64) -> Result<u64, GatewayError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM live_state_history WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
