//! Omie synchronization and investor-facing financial services.
//!
//! This crate is the call-contract layer consumed by the HTTP surface
//! (owned elsewhere):
//!
//! - `client` - the Omie transport and the generic paged fetch loop
//! - `sync` - per-entity sync jobs and the best-effort orchestrator
//! - `financial` - read-time reconciliation: investor scope resolution,
//!   visibility, and per-operation financial summaries

pub mod client;
pub mod financial;
pub mod sync;

pub use client::{fetch_all_pages, OmieClient, OmieError, OmieTransport, PagedFetch};
pub use financial::{FinancialError, FinancialService, InvestorScope, OperationFinancials};
pub use sync::{
    FullSyncReport, StepOutcome, SyncError, SyncOptions, SyncReport, SyncService,
};
