//! Channel poller
//!
//! One polling pass over one channel: resolve it, fetch everything past the
//! cursor, rebuild and store each group once, then move the cursor a single
//! time at the end.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use harvest_core::entities::ChannelCursor;
use harvest_core::source::{MessageRange, SourceChannel};
use harvest_core::value_objects::{ChannelId, GroupKey, MessageId};

use super::assembler::GroupAssembler;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::writer::{PostWriter, WriteOutcome};

/// Summary of one pass over one channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub channel: String,
    pub channel_id: Option<ChannelId>,
    /// First encounter: the cursor was created by this pass
    pub new_channel: bool,
    pub fetched: usize,
    pub persisted: usize,
    pub discarded: usize,
    pub already_stored: usize,
    /// Groups dropped because none of their attachments could be downloaded
    pub unavailable: usize,
    pub failed: usize,
    /// Cursor position after the pass, when it was written
    pub cursor: Option<MessageId>,
}

impl PassReport {
    fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Persisted { .. } => self.persisted += 1,
            WriteOutcome::NoMedia { .. } => self.discarded += 1,
            WriteOutcome::MediaUnavailable { .. } => self.unavailable += 1,
            WriteOutcome::AlreadyStored { .. } => self.already_stored += 1,
        }
    }
}

/// Names to try when resolving a configured channel, in order
///
/// Links and `@handles` are reduced to the bare username first; the
/// configured text is tried as-is only if that differs.
pub fn resolution_candidates(name: &str) -> Vec<String> {
    let literal = name.trim();
    let mut bare = literal;
    for prefix in ["https://t.me/", "t.me/"] {
        if let Some(rest) = bare.strip_prefix(prefix) {
            bare = rest;
            break;
        }
    }
    let bare = bare.trim_start_matches('@');

    let mut candidates = Vec::with_capacity(2);
    if !bare.is_empty() {
        candidates.push(bare.to_string());
    }
    if literal != bare && !literal.is_empty() {
        candidates.push(literal.to_string());
    }
    candidates
}

/// Channel poller
pub struct ChannelPoller<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelPoller<'a> {
    /// Create a new ChannelPoller
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one pass over the channel configured as `name`
    ///
    /// Any error aborts this pass and leaves the cursor untouched.
    #[instrument(skip(self))]
    pub async fn poll(&self, name: &str) -> ServiceResult<PassReport> {
        let mut report = PassReport::new(name);
        let channel = self.resolve(name).await?;
        report.channel_id = Some(channel.id);

        match self.ctx.cursor_repo().find(channel.id).await? {
            None => self.first_pass(&channel, &mut report).await?,
            Some(cursor) => self.incremental_pass(&channel, &cursor, &mut report).await?,
        }

        Ok(report)
    }

    async fn resolve(&self, name: &str) -> ServiceResult<SourceChannel> {
        let mut last_error = None;
        for candidate in resolution_candidates(name) {
            match self.ctx.source().resolve_channel(&candidate).await {
                Ok(channel) => return Ok(channel),
                Err(e) => {
                    debug!(candidate = %candidate, error = %e, "Channel candidate not resolved");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.map_or_else(|| ServiceError::not_found("Channel", name), ServiceError::from))
    }

    /// Seed the cursor from the newest message, storing its group on the way
    async fn first_pass(
        &self,
        channel: &SourceChannel,
        report: &mut PassReport,
    ) -> ServiceResult<()> {
        report.new_channel = true;
        let latest = self.ctx.source().latest_messages(channel, 1).await?;

        let seed_position = match latest.first() {
            None => MessageId::new(0),
            Some(seed) => {
                report.fetched = 1;
                let group = GroupAssembler::new(self.ctx).assemble(channel, seed).await;
                match PostWriter::new(self.ctx).write(channel, &group).await {
                    Ok(outcome) if outcome.is_persisted() => {
                        report.record(outcome);
                        outcome.max_id()
                    }
                    Ok(outcome) => {
                        report.record(outcome);
                        seed.id
                    }
                    Err(e) => {
                        warn!(
                            channel_id = %channel.id,
                            message_id = %seed.id,
                            error = %e,
                            "Seed group not stored, registering channel anyway"
                        );
                        report.failed += 1;
                        seed.id
                    }
                }
            }
        };

        let cursor = ChannelCursor::new(channel.id, channel.display_name(), seed_position);
        self.ctx.cursor_repo().create(&cursor).await?;
        report.cursor = Some(seed_position);

        info!(channel_id = %channel.id, cursor = %seed_position, "New channel registered");
        Ok(())
    }

    async fn incremental_pass(
        &self,
        channel: &SourceChannel,
        cursor: &ChannelCursor,
        report: &mut PassReport,
    ) -> ServiceResult<()> {
        let start = cursor.last_message_id;
        let latest = self.ctx.source().latest_messages(channel, 1).await?;
        let Some(upper) = latest.first().map(|m| m.id).filter(|&id| id > start) else {
            debug!(channel_id = %channel.id, cursor = %start, "Channel up to date");
            return Ok(());
        };

        let mut messages = self
            .ctx
            .source()
            .fetch_messages(channel, MessageRange::between(start, upper))
            .await?;
        messages.sort_by_key(|m| m.id);
        report.fetched = messages.len();

        let assembler = GroupAssembler::new(self.ctx);
        let writer = PostWriter::new(self.ctx);
        let mut handled: HashSet<GroupKey> = HashSet::new();
        let mut highest = start;
        // Groups at or above a failed seed must be seen again next pass
        let mut ceiling: Option<MessageId> = None;

        for message in &messages {
            let key = message.group_key();
            if !handled.insert(key) {
                continue;
            }

            let group = assembler.assemble(channel, message).await;
            match writer.write(channel, &group).await {
                Ok(outcome) => {
                    report.record(outcome);
                    highest = highest.max(outcome.max_id());
                }
                Err(e) => {
                    warn!(
                        channel_id = %channel.id,
                        group_key = %key,
                        message_id = %message.id,
                        error = %e,
                        "Group failed, will retry next pass"
                    );
                    report.failed += 1;
                    let limit = message.id.prev();
                    ceiling = Some(ceiling.map_or(limit, |c| c.min(limit)));
                }
            }
        }

        let target = ceiling.map_or(highest, |c| highest.min(c));
        if cursor.would_advance(target) {
            self.ctx
                .cursor_repo()
                .advance(channel.id, target, Utc::now())
                .await?;
            report.cursor = Some(target);
        }

        Ok(())
    }
}
