//! Polling and retention services
//!
//! This module contains the application layer that drives the channel
//! polling pipeline: assembler → writer → poller → scheduler, plus the
//! independent retention sweeper.

pub mod assembler;
pub mod context;
pub mod error;
pub mod poller;
pub mod scheduler;
pub mod shutdown;
pub mod sweeper;
pub mod writer;

#[cfg(test)]
mod testing;

// Re-export all services for convenience
pub use assembler::{AssembledGroup, GroupAssembler};
pub use context::{HarvestSettings, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use poller::{resolution_candidates, ChannelPoller, PassReport};
pub use scheduler::{CycleReport, PollScheduler};
pub use shutdown::ShutdownSignal;
pub use sweeper::RetentionSweeper;
pub use writer::{PostWriter, WriteOutcome};
