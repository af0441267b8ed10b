//! Entity sync jobs and the full-sync orchestrator.

pub mod jobs;
pub mod orchestrator;

pub use jobs::{SyncError, SyncOptions, SyncReport, SyncService};
pub use orchestrator::{run_sequence, FullSyncReport, StepOutcome};
