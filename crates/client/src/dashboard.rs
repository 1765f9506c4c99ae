//! Dashboard snapshot loading with a single delayed retry.
//!
//! The combined endpoint occasionally loses the race with backend warmup
//! right after deploys. One retry after a short pause absorbs that; a
//! second failure propagates so callers can surface it.

use std::time::Duration;

use tracing::warn;

use dealdesk_core::dashboard::DashboardSnapshot;
use dealdesk_core::source::{DashboardSource, SourceError};

pub async fn load_dashboard<S>(
    source: &S,
    retry_delay: Duration,
) -> Result<DashboardSnapshot, SourceError>
where
    S: DashboardSource + ?Sized,
{
    match source.fetch_snapshot().await {
        Ok(snapshot) => Ok(snapshot),
        Err(error) => {
            warn!(%error, delay_ms = retry_delay.as_millis() as u64, "dashboard fetch failed, retrying once");
            tokio::time::sleep(retry_delay).await;
            source.fetch_snapshot().await
        }
    }
}
