//! Periodic purge of sessions past their expiry.
//!
//! Expired sessions already fail authentication; this only keeps the
//! `sessions` table from growing without bound.

use std::time::Duration;

use innovate_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Sweep once immediately, then every `interval`, until `cancel` fires.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Expired session purge started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => match SessionRepo::purge_expired(&pool).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Expired sessions purged"),
                Err(e) => tracing::error!(error = %e, "Expired session purge failed"),
            },
        }
    }

    tracing::info!("Expired session purge stopped");
}
