//! Full-sync orchestrator.
//!
//! Runs every entity job in a fixed sequence, best-effort: a failing
//! step is captured in the report and never aborts its siblings (one
//! ERP endpoint being down must not block the other refreshes). The
//! report carries no aggregate flag; callers inspect `steps`.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use lastro_core::omie::OmieResource;

use super::jobs::{SyncError, SyncOptions, SyncReport, SyncService};

/// Outcome of one orchestrated step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    /// Step name (the resource's stable name).
    pub name: String,
    /// Whether the step succeeded.
    pub ok: bool,
    /// Wall-clock duration in milliseconds.
    pub ms: u64,
    /// Job report, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
    /// Error message, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report of a full orchestrated sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSyncReport {
    /// When the orchestration started.
    pub started_at: DateTime<Utc>,
    /// When the orchestration finished.
    pub finished_at: DateTime<Utc>,
    /// Per-step outcomes, in execution order.
    pub steps: Vec<StepOutcome>,
}

/// Runs named steps sequentially, capturing failures instead of
/// propagating them.
pub async fn run_sequence(
    steps: Vec<(String, BoxFuture<'_, Result<SyncReport, SyncError>>)>,
) -> FullSyncReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(steps.len());

    for (name, step) in steps {
        let step_started = Instant::now();
        let result = step.await;
        let ms = u64::try_from(step_started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(report) => {
                info!(step = %name, ms, "sync step succeeded");
                outcomes.push(StepOutcome {
                    name,
                    ok: true,
                    ms,
                    report: Some(report),
                    error: None,
                });
            }
            Err(err) => {
                warn!(step = %name, ms, error = %err, "sync step failed, continuing");
                outcomes.push(StepOutcome {
                    name,
                    ok: false,
                    ms,
                    report: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    FullSyncReport {
        started_at,
        finished_at: Utc::now(),
        steps: outcomes,
    }
}

impl SyncService {
    /// Runs every entity job in the fixed sequence
    /// categories → parties → projects → payables → movements.
    pub async fn run_full_sync(&self, options: &SyncOptions) -> FullSyncReport {
        let steps = OmieResource::ALL
            .into_iter()
            .map(|resource| {
                (
                    resource.name().to_string(),
                    self.sync_resource(resource, options).boxed(),
                )
            })
            .collect();

        run_sequence(steps).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OmieError;

    fn report(source: &str) -> SyncReport {
        SyncReport {
            source: source.to_string(),
            fetched: 10,
            pages: 1,
            upserted: 10,
            skipped: 0,
            zero_amount_defaults: 0,
            since: None,
            new_sync_at: Utc::now(),
        }
    }

    fn failing_step() -> Result<SyncReport, SyncError> {
        Err(SyncError::Omie(OmieError::Status {
            status: 503,
            body: "categories endpoint down".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_failing_step_does_not_abort_siblings() {
        let steps: Vec<(String, BoxFuture<'_, Result<SyncReport, SyncError>>)> = vec![
            (
                "categories".to_string(),
                futures::future::ready(failing_step()).boxed(),
            ),
            (
                "parties".to_string(),
                futures::future::ready(Ok(report("omie_parties"))).boxed(),
            ),
        ];

        let full = run_sequence(steps).await;

        assert_eq!(full.steps.len(), 2);
        assert!(!full.steps[0].ok);
        assert!(full.steps[0]
            .error
            .as_deref()
            .unwrap()
            .contains("categories endpoint down"));
        assert!(full.steps[1].ok);
        assert_eq!(
            full.steps[1].report.as_ref().unwrap().source,
            "omie_parties"
        );
    }

    #[tokio::test]
    async fn test_steps_run_in_declared_order() {
        let steps: Vec<(String, BoxFuture<'_, Result<SyncReport, SyncError>>)> =
            ["categories", "parties", "projects"]
                .into_iter()
                .map(|name| {
                    (
                        name.to_string(),
                        futures::future::ready(Ok(report(name))).boxed(),
                    )
                })
                .collect();

        let full = run_sequence(steps).await;

        let names: Vec<&str> = full.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["categories", "parties", "projects"]);
        assert!(full.finished_at >= full.started_at);
    }

    #[tokio::test]
    async fn test_all_failures_still_produce_full_report() {
        let steps: Vec<(String, BoxFuture<'_, Result<SyncReport, SyncError>>)> = (0..3)
            .map(|i| {
                (
                    format!("step-{i}"),
                    futures::future::ready(failing_step()).boxed(),
                )
            })
            .collect();

        let full = run_sequence(steps).await;
        assert_eq!(full.steps.len(), 3);
        assert!(full.steps.iter().all(|s| !s.ok));
    }
}
