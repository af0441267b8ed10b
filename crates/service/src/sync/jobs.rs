//! Per-entity sync jobs.
//!
//! Every job follows the same template: read the checkpoint (falling
//! back to the resource's lookback window), fetch all pages, decode with
//! the tolerant typed decoders, drop key-less records, upsert in
//! batches, then advance the checkpoint to
//! `min(now, max observed record timestamp)` so a slow job cannot
//! record a completion time newer than the data it actually saw.
//!
//! The since-date filter is only sent to endpoints that honor it; the
//! catalog resources always full-fetch.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;

use lastro_core::omie::{decode, OmieResource};
use lastro_db::repositories::{
    CategoryError, CategoryRepository, CheckpointError, MovementError, MovementRepository,
    PartyError, PartyRepository, PayableError, PayableRepository, ProjectError,
    ProjectRepository, SyncCheckpointRepository,
};

use crate::client::{fetch_all_pages, OmieError, OmieTransport, PagedFetch};

/// Error types for sync jobs.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// ERP call failure.
    #[error(transparent)]
    Omie(#[from] OmieError),

    /// Checkpoint read/write failure.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Category upsert failure.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// Party upsert failure.
    #[error(transparent)]
    Party(#[from] PartyError),

    /// Project upsert failure.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Accounts-payable upsert failure.
    #[error(transparent)]
    Payable(#[from] PayableError),

    /// Movement upsert failure.
    #[error(transparent)]
    Movement(#[from] MovementError),
}

/// Options accepted by every sync job.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Ignore the checkpoint and fetch everything.
    pub full_sync: bool,
    /// Override the window to the last N days.
    pub force_days: Option<i64>,
}

/// Result of one sync job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Checkpoint source name.
    pub source: String,
    /// Raw records fetched from the ERP.
    pub fetched: usize,
    /// Pages fetched.
    pub pages: u32,
    /// Rows upserted.
    pub upserted: u64,
    /// Records dropped for lacking a usable primary key.
    pub skipped: usize,
    /// Records whose amount was missing and defaulted to zero.
    pub zero_amount_defaults: usize,
    /// Lower bound of the fetch window (absent on full syncs).
    pub since: Option<DateTime<Utc>>,
    /// The checkpoint written by this run.
    pub new_sync_at: DateTime<Utc>,
}

/// Runs the per-entity sync jobs against the ERP and storage.
pub struct SyncService {
    transport: Arc<dyn OmieTransport>,
    checkpoints: SyncCheckpointRepository,
    categories: CategoryRepository,
    parties: PartyRepository,
    projects: ProjectRepository,
    payables: PayableRepository,
    movements: MovementRepository,
    page_size: u32,
    page_cap: u32,
}

struct IngestOutcome {
    upserted: u64,
    skipped: usize,
    zero_amount_defaults: usize,
    max_record_date: Option<NaiveDate>,
}

impl SyncService {
    /// Creates a sync service over a database connection and an ERP
    /// transport.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        transport: Arc<dyn OmieTransport>,
        page_size: u32,
        page_cap: u32,
    ) -> Self {
        Self {
            transport,
            checkpoints: SyncCheckpointRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            parties: PartyRepository::new(db.clone()),
            projects: ProjectRepository::new(db.clone()),
            payables: PayableRepository::new(db.clone()),
            movements: MovementRepository::new(db),
            page_size,
            page_cap,
        }
    }

    /// Runs one entity sync job end to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch, an upsert batch, or the checkpoint
    /// write fails. A failed upsert batch aborts the job outright; there
    /// is no partial-batch retry.
    pub async fn sync_resource(
        &self,
        resource: OmieResource,
        options: &SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        let source = resource.checkpoint_source();
        let now = Utc::now();

        let checkpoint = self.checkpoints.get_last_sync_at(source).await?;
        let since = since_for(resource, options, checkpoint, now);

        let mut base_params = Map::new();
        base_params.insert(resource.per_page_param().to_string(), json!(self.page_size));
        if let (Some(since), Some(param)) = (since, resource.since_param()) {
            base_params.insert(
                param.to_string(),
                json!(since.format("%d/%m/%Y").to_string()),
            );
        }

        let fetched =
            fetch_all_pages(self.transport.as_ref(), resource, base_params, self.page_cap)
                .await?;

        let outcome = self.ingest(resource, &fetched, now).await?;

        let new_sync_at = next_checkpoint(now, outcome.max_record_date);
        self.checkpoints.set_last_sync_at(source, new_sync_at).await?;

        let report = SyncReport {
            source: source.to_string(),
            fetched: fetched.items.len(),
            pages: fetched.pages,
            upserted: outcome.upserted,
            skipped: outcome.skipped,
            zero_amount_defaults: outcome.zero_amount_defaults,
            since,
            new_sync_at,
        };
        info!(
            source,
            fetched = report.fetched,
            pages = report.pages,
            upserted = report.upserted,
            skipped = report.skipped,
            "sync job finished"
        );

        Ok(report)
    }

    async fn ingest(
        &self,
        resource: OmieResource,
        fetched: &PagedFetch,
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        match resource {
            OmieResource::Categories => self.ingest_categories(&fetched.items, synced_at).await,
            OmieResource::Clients => self.ingest_parties(&fetched.items, synced_at).await,
            OmieResource::Projects => self.ingest_projects(&fetched.items, synced_at).await,
            OmieResource::AccountsPayable => {
                self.ingest_payables(&fetched.items, synced_at).await
            }
            OmieResource::Movements => self.ingest_movements(&fetched.items, synced_at).await,
        }
    }

    async fn ingest_categories(
        &self,
        items: &[Value],
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        let records: Vec<_> = items.iter().filter_map(decode::decode_category).collect();
        let skipped = items.len() - records.len();
        let upserted = self
            .categories
            .upsert_batch(&records, OmieResource::Categories.batch_size(), synced_at)
            .await?;
        Ok(IngestOutcome {
            upserted,
            skipped,
            zero_amount_defaults: 0,
            max_record_date: None,
        })
    }

    async fn ingest_parties(
        &self,
        items: &[Value],
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        let records: Vec<_> = items.iter().filter_map(decode::decode_party).collect();
        let skipped = items.len() - records.len();
        let upserted = self
            .parties
            .upsert_batch(&records, OmieResource::Clients.batch_size(), synced_at)
            .await?;
        Ok(IngestOutcome {
            upserted,
            skipped,
            zero_amount_defaults: 0,
            max_record_date: None,
        })
    }

    async fn ingest_projects(
        &self,
        items: &[Value],
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        let records: Vec<_> = items.iter().filter_map(decode::decode_project).collect();
        let skipped = items.len() - records.len();
        let upserted = self
            .projects
            .upsert_batch(&records, OmieResource::Projects.batch_size(), synced_at)
            .await?;
        Ok(IngestOutcome {
            upserted,
            skipped,
            zero_amount_defaults: 0,
            max_record_date: None,
        })
    }

    async fn ingest_payables(
        &self,
        items: &[Value],
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        let records: Vec<_> = items.iter().filter_map(decode::decode_payable).collect();
        let skipped = items.len() - records.len();
        let max_record_date = records.iter().filter_map(|r| r.latest_date()).max();
        let upserted = self
            .payables
            .upsert_batch(
                &records,
                OmieResource::AccountsPayable.batch_size(),
                synced_at,
            )
            .await?;
        Ok(IngestOutcome {
            upserted,
            skipped,
            zero_amount_defaults: 0,
            max_record_date,
        })
    }

    async fn ingest_movements(
        &self,
        items: &[Value],
        synced_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, SyncError> {
        let records: Vec<_> = items.iter().filter_map(decode::decode_movement).collect();
        let skipped = items.len() - records.len();
        let zero_amount_defaults = records
            .iter()
            .filter(|record| record.zero_amount_defaulted)
            .count();
        let max_record_date = records.iter().filter_map(|r| r.latest_date()).max();
        let upserted = self
            .movements
            .upsert_batch(&records, OmieResource::Movements.batch_size(), synced_at)
            .await?;
        Ok(IngestOutcome {
            upserted,
            skipped,
            zero_amount_defaults,
            max_record_date,
        })
    }
}

/// Computes the lower bound of a job's fetch window.
///
/// Full syncs have no bound; `force_days` overrides the checkpoint; the
/// checkpoint is used when present, else the resource's lookback.
#[must_use]
pub fn since_for(
    resource: OmieResource,
    options: &SyncOptions,
    checkpoint: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if options.full_sync {
        return None;
    }
    if let Some(days) = options.force_days {
        return Some(now - Duration::days(days));
    }
    Some(checkpoint.unwrap_or_else(|| now - Duration::days(resource.default_lookback_days())))
}

/// Computes the checkpoint a finishing job should write.
///
/// `min(now, end of the newest observed record date)`: a job that ran
/// while records for "now" were still being written cannot advance the
/// checkpoint past the data it actually saw. With no dated records the
/// window was empty, so `now` is safe.
#[must_use]
pub fn next_checkpoint(now: DateTime<Utc>, max_record_date: Option<NaiveDate>) -> DateTime<Utc> {
    match max_record_date {
        None => now,
        Some(date) => date
            .and_hms_opt(23, 59, 59)
            .map_or(now, |end_of_day| now.min(Utc.from_utc_datetime(&end_of_day))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_since_uses_checkpoint_when_present() {
        let now = ts("2026-08-07T12:00:00Z");
        let checkpoint = Some(ts("2026-08-01T09:30:00Z"));

        let since = since_for(
            OmieResource::Movements,
            &SyncOptions::default(),
            checkpoint,
            now,
        );
        assert_eq!(since, checkpoint);
    }

    #[test]
    fn test_since_falls_back_to_lookback() {
        let now = ts("2026-08-07T12:00:00Z");

        let since = since_for(OmieResource::Movements, &SyncOptions::default(), None, now);
        assert_eq!(since, Some(ts("2026-07-31T12:00:00Z")));

        let since = since_for(OmieResource::Categories, &SyncOptions::default(), None, now);
        assert_eq!(since, Some(ts("2026-07-08T12:00:00Z")));
    }

    #[test]
    fn test_since_force_days_overrides_checkpoint() {
        let now = ts("2026-08-07T12:00:00Z");
        let options = SyncOptions {
            full_sync: false,
            force_days: Some(2),
        };

        let since = since_for(
            OmieResource::Movements,
            &options,
            Some(ts("2026-08-06T00:00:00Z")),
            now,
        );
        assert_eq!(since, Some(ts("2026-08-05T12:00:00Z")));
    }

    #[test]
    fn test_since_full_sync_is_unbounded() {
        let now = ts("2026-08-07T12:00:00Z");
        let options = SyncOptions {
            full_sync: true,
            force_days: Some(2),
        };

        assert_eq!(
            since_for(OmieResource::Movements, &options, Some(now), now),
            None
        );
    }

    #[test]
    fn test_checkpoint_bounded_by_observed_records() {
        let now = ts("2026-08-07T12:00:00Z");

        // Newest record is older than now: checkpoint stops at its day.
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(
            next_checkpoint(now, Some(date)),
            ts("2026-08-05T23:59:59Z")
        );

        // Newest record is today: end of day lies ahead, so now wins.
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(next_checkpoint(now, Some(today)), now);

        // Empty window: nothing could have been missed.
        assert_eq!(next_checkpoint(now, None), now);
    }

    /// Two chained incremental runs must cover the same records as one
    /// full run over the combined window.
    #[test]
    fn test_incremental_windows_union_equals_full_run() {
        let record_dates: Vec<NaiveDate> = (1..=7)
            .map(|day| NaiveDate::from_ymd_opt(2026, 8, day).unwrap())
            .collect();

        let in_window = |date: NaiveDate, since: Option<DateTime<Utc>>| {
            since.is_none_or(|bound| date >= bound.date_naive())
        };

        // Run 1 at Aug 4 noon, no prior checkpoint.
        let now1 = ts("2026-08-04T12:00:00Z");
        let since1 = since_for(
            OmieResource::Movements,
            &SyncOptions::default(),
            None,
            now1,
        );
        let run1: Vec<NaiveDate> = record_dates
            .iter()
            .copied()
            .filter(|d| *d <= now1.date_naive() && in_window(*d, since1))
            .collect();
        let checkpoint1 = next_checkpoint(now1, run1.iter().copied().max());

        // Run 2 at Aug 7 noon, windowed by run 1's checkpoint.
        let now2 = ts("2026-08-07T12:00:00Z");
        let since2 = since_for(
            OmieResource::Movements,
            &SyncOptions::default(),
            Some(checkpoint1),
            now2,
        );
        let run2: Vec<NaiveDate> = record_dates
            .iter()
            .copied()
            .filter(|d| in_window(*d, since2))
            .collect();

        // A single full run over the combined window.
        let full: Vec<NaiveDate> = record_dates
            .iter()
            .copied()
            .filter(|d| in_window(*d, since1))
            .collect();

        let mut union: Vec<NaiveDate> = run1.into_iter().chain(run2).collect();
        union.sort_unstable();
        union.dedup();

        assert_eq!(union, full);
    }
}
