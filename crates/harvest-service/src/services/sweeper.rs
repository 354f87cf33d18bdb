//! Retention sweeper
//!
//! Deletes posts once they have been stored longer than the retention
//! window. Runs on its own timer, independent of polling.

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::shutdown::{self, ShutdownSignal};

/// Retention sweeper
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    ctx: ServiceContext,
}

impl RetentionSweeper {
    /// Create a new RetentionSweeper
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cutoff for a sweep run at `now`; rows ingested exactly then survive
    ///
    /// A window reaching past the earliest representable time keeps
    /// everything.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.ctx.settings().retention_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Delete every post ingested before `now - window`
    #[instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        let cutoff = self.cutoff(now);
        let removed = self.ctx.post_repo().delete_ingested_before(cutoff).await?;
        info!(removed, %cutoff, "Retention sweep finished");
        Ok(removed)
    }

    /// Sweep on every tick until shutdown
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let interval = self.ctx.settings().sweep_interval;
        info!(interval_secs = interval.as_secs(), "Retention sweeper started");

        loop {
            if let Err(e) = self.sweep(Utc::now()).await {
                error!(error = %e, code = e.error_code(), "Retention sweep failed");
            }
            if shutdown::pause(interval, &mut shutdown).await {
                break;
            }
        }

        info!("Retention sweeper stopped");
    }
}
