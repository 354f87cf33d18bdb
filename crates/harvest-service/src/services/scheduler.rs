//! Poll scheduler
//!
//! Outer loop over the configured channels. Each channel pass is isolated:
//! a failure is logged and the cycle moves on. A cycle that blows up
//! entirely (a panic included) is logged and retried after a backoff.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, info, warn};

use super::context::ServiceContext;
use super::poller::{ChannelPoller, PassReport};
use super::shutdown::{self, ShutdownSignal};

/// Result of one cycle over every configured channel
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub passes: Vec<PassReport>,
    pub failed_channels: Vec<String>,
    /// Shutdown arrived before every channel was visited
    pub interrupted: bool,
}

impl CycleReport {
    pub fn persisted(&self) -> usize {
        self.passes.iter().map(|pass| pass.persisted).sum()
    }
}

/// Poll scheduler
#[derive(Debug, Clone)]
pub struct PollScheduler {
    ctx: ServiceContext,
}

impl PollScheduler {
    /// Create a new PollScheduler
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Poll every configured channel once, pacing between channels
    pub async fn run_cycle(&self, shutdown: &mut ShutdownSignal) -> CycleReport {
        let settings = self.ctx.settings();
        let poller = ChannelPoller::new(&self.ctx);
        let mut report = CycleReport::default();

        for (index, name) in settings.channel_names.iter().enumerate() {
            if index > 0 && shutdown::pause(settings.channel_delay, shutdown).await {
                report.interrupted = true;
                break;
            }

            match poller.poll(name).await {
                Ok(pass) => {
                    info!(
                        channel = %pass.channel,
                        fetched = pass.fetched,
                        persisted = pass.persisted,
                        discarded = pass.discarded,
                        already_stored = pass.already_stored,
                        unavailable = pass.unavailable,
                        failed = pass.failed,
                        cursor = ?pass.cursor.map(|id| id.into_inner()),
                        "Channel pass finished"
                    );
                    report.passes.push(pass);
                }
                Err(e) => {
                    warn!(channel = %name, error = %e, code = e.error_code(), "Channel pass failed");
                    report.failed_channels.push(name.clone());
                }
            }
        }

        report
    }

    /// Cycle until shutdown
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let settings = self.ctx.settings().clone();
        info!(
            channels = settings.channel_names.len(),
            interval_secs = settings.poll_interval.as_secs(),
            "Poll scheduler started"
        );

        while !shutdown::requested(&shutdown) {
            let cycle = AssertUnwindSafe(self.run_cycle(&mut shutdown))
                .catch_unwind()
                .await;

            let wait = match cycle {
                Ok(report) => {
                    info!(
                        channels = report.passes.len(),
                        failed = report.failed_channels.len(),
                        persisted = report.persisted(),
                        "Poll cycle finished"
                    );
                    settings.poll_interval
                }
                Err(panic) => {
                    error!(
                        panic = %panic_message(panic.as_ref()),
                        backoff_secs = settings.error_backoff.as_secs(),
                        "Poll cycle aborted"
                    );
                    settings.error_backoff
                }
            };

            if shutdown::pause(wait, &mut shutdown).await {
                break;
            }
        }

        info!("Poll scheduler stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
