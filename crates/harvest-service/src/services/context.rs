//! Service context - dependency container for services
//!
//! Holds the repositories, the message source, and the tuning knobs the
//! polling services read.

use std::sync::Arc;
use std::time::Duration;

use harvest_common::AppConfig;
use harvest_core::traits::{CursorRepository, MessageSource, PostRepository};

/// Tuning knobs for polling and retention
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Channels to poll, as configured
    pub channel_names: Vec<String>,
    /// Messages fetched on each side of a grouped seed
    pub group_window: u32,
    /// Sleep between full cycles
    pub poll_interval: Duration,
    /// Sleep after a cycle that failed unexpectedly
    pub error_backoff: Duration,
    /// Pacing between channels within a cycle
    pub channel_delay: Duration,
    /// Posts ingested longer ago than this are swept
    pub retention_window: chrono::Duration,
    /// Sleep between retention sweeps
    pub sweep_interval: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            channel_names: Vec::new(),
            group_window: 15,
            poll_interval: Duration::from_secs(300),
            error_backoff: Duration::from_secs(60),
            channel_delay: Duration::from_secs(1),
            retention_window: chrono::Duration::hours(48),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl From<&AppConfig> for HarvestSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            channel_names: config.poller.channel_names.clone(),
            group_window: config.poller.group_window,
            poll_interval: config.poller.interval(),
            error_backoff: config.poller.error_backoff(),
            channel_delay: config.poller.channel_delay(),
            retention_window: config.retention.window(),
            sweep_interval: config.retention.sweep_interval(),
        }
    }
}

/// Service context containing all dependencies
///
/// Cloning is cheap: every dependency sits behind an `Arc`, so the
/// scheduler and the sweeper each own a copy.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    cursor_repo: Arc<dyn CursorRepository>,
    post_repo: Arc<dyn PostRepository>,

    // Message source
    source: Arc<dyn MessageSource>,

    settings: Arc<HarvestSettings>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        cursor_repo: Arc<dyn CursorRepository>,
        post_repo: Arc<dyn PostRepository>,
        source: Arc<dyn MessageSource>,
        settings: HarvestSettings,
    ) -> Self {
        Self {
            cursor_repo,
            post_repo,
            source,
            settings: Arc::new(settings),
        }
    }

    // === Repositories ===

    /// Get the cursor repository
    pub fn cursor_repo(&self) -> &dyn CursorRepository {
        self.cursor_repo.as_ref()
    }

    /// Get the post repository
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    // === Message Source ===

    /// Get the message source
    pub fn source(&self) -> &dyn MessageSource {
        self.source.as_ref()
    }

    /// Get the polling and retention settings
    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("source", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    cursor_repo: Option<Arc<dyn CursorRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    source: Option<Arc<dyn MessageSource>>,
    settings: Option<HarvestSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_repo(mut self, repo: Arc<dyn CursorRepository>) -> Self {
        self.cursor_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn source(mut self, source: Arc<dyn MessageSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn settings(mut self, settings: HarvestSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// Settings fall back to their defaults; a group window of zero is
    /// rejected.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        let settings = self.settings.unwrap_or_default();
        if settings.group_window == 0 {
            return Err(ServiceError::validation("group_window must be positive"));
        }

        Ok(ServiceContext::new(
            self.cursor_repo
                .ok_or_else(|| ServiceError::validation("cursor_repo is required"))?,
            self.post_repo
                .ok_or_else(|| ServiceError::validation("post_repo is required"))?,
            self.source
                .ok_or_else(|| ServiceError::validation("source is required"))?,
            settings,
        ))
    }
}
