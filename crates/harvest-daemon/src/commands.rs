//! Command implementations

use std::fmt::Write as _;

use chrono::Utc;
use harvest_common::{AppConfig, AppError, AppResult};
use harvest_core::entities::{ChannelCursor, MediaKind};
use harvest_core::traits::{PostStats, PostSummary};
use harvest_service::{PollScheduler, RetentionSweeper, ServiceError};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::{bootstrap, Harvest};
use crate::cli::Command;

const PREVIEW_LEN: usize = 50;

/// Run `command` to completion
pub async fn execute(command: Command, config: AppConfig) -> AppResult<()> {
    let Harvest { pool, ctx } = bootstrap(&config).await?;

    let result: AppResult<()> = match command {
        Command::Run => {
            run_daemon(PollScheduler::new(ctx.clone()), RetentionSweeper::new(ctx)).await
        }
        Command::PollOnce => {
            // The sender stays alive so pacing is not mistaken for shutdown
            let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);
            let report = PollScheduler::new(ctx).run_cycle(&mut shutdown_rx).await;
            info!(
                channels = report.passes.len(),
                failed = report.failed_channels.len(),
                persisted = report.persisted(),
                "Poll cycle finished"
            );
            Ok(())
        }
        Command::Sweep => RetentionSweeper::new(ctx)
            .sweep(Utc::now())
            .await
            .map(|removed| info!(removed, "Sweep done"))
            .map_err(AppError::from),
        Command::Inspect { recent } => inspect(&ctx, recent).await.map_err(AppError::from),
        Command::Purge { cursors } => purge(&ctx, cursors).await.map_err(AppError::from),
    };

    pool.close().await;
    result
}

/// Poll and sweep until Ctrl-C / SIGTERM
///
/// A task that ended abnormally fails the command once both are joined.
async fn run_daemon(scheduler: PollScheduler, sweeper: RetentionSweeper) -> AppResult<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper_task = tokio::spawn(sweeper.run(shutdown_rx.clone()));
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    shutdown_signal().await;
    info!("Shutdown signal received, finishing in-flight work");
    shutdown_tx.send(true).ok();

    let mut outcome = Ok(());
    for (name, task) in [("scheduler", scheduler_task), ("sweeper", sweeper_task)] {
        if let Err(e) = task.await {
            warn!(task = name, error = %e, "Task ended abnormally");
            if outcome.is_ok() {
                outcome = Err(AppError::internal(e));
            }
        }
    }
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn inspect(ctx: &harvest_service::ServiceContext, recent: i64) -> Result<(), ServiceError> {
    let cursors = ctx.cursor_repo().list().await?;
    let posts = ctx.post_repo().recent(recent).await?;
    let stats = ctx.post_repo().stats().await?;
    let kinds = ctx.post_repo().media_kind_counts().await?;

    print!("{}", render_inspect(&cursors, &posts, stats, &kinds));
    Ok(())
}

async fn purge(ctx: &harvest_service::ServiceContext, cursors: bool) -> Result<(), ServiceError> {
    let posts = ctx.post_repo().delete_all().await?;
    println!("Deleted {posts} posts (with their messages and attachments)");
    info!(posts, "Posts purged");

    if cursors {
        let removed = ctx.cursor_repo().delete_all().await?;
        println!("Deleted {removed} channel cursors");
        info!(cursors = removed, "Cursors purged");
    }
    Ok(())
}

fn render_inspect(
    cursors: &[ChannelCursor],
    posts: &[PostSummary],
    stats: PostStats,
    kinds: &[(MediaKind, i64)],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Channel Cursors ===");
    if cursors.is_empty() {
        let _ = writeln!(out, "No channel cursors found");
    }
    for cursor in cursors {
        let _ = writeln!(
            out,
            "{:<24} {:>12}  {}",
            cursor.channel_name,
            cursor.last_message_id.into_inner(),
            cursor.last_polled_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let _ = writeln!(out, "\n=== Recent Posts ===");
    if posts.is_empty() {
        let _ = writeln!(out, "No posts found");
    }
    for summary in posts {
        let post = &summary.post;
        let mut preview = post.preview(PREVIEW_LEN).replace('\n', " ");
        if post.combined_text.len() > PREVIEW_LEN {
            preview.push_str("...");
        }
        let media = summary
            .media_counts
            .iter()
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{} #{} ({}) [{} media: {}] {}",
            post.channel_name,
            post.first_message_id,
            post.posted_at.format("%Y-%m-%d %H:%M"),
            summary.media_total(),
            media,
            preview
        );
    }

    let _ = writeln!(out, "\nTotal posts: {}", stats.posts);
    let _ = writeln!(out, "Total messages: {}", stats.messages);
    let _ = writeln!(out, "Total media items: {}", stats.attachments);

    let _ = writeln!(out, "\n=== Media Types Distribution ===");
    if kinds.is_empty() {
        let _ = writeln!(out, "No media items found");
    }
    for (kind, count) in kinds {
        let _ = writeln!(out, "{:<12} {count}", kind.as_str());
    }

    out
}
