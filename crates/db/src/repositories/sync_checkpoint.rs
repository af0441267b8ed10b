//! Sync checkpoint repository.
//!
//! One row per source; the stored timestamp bounds the next incremental
//! fetch window. No history is retained.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::sync_checkpoints;

/// Error types for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for per-source sync checkpoints.
#[derive(Debug, Clone)]
pub struct SyncCheckpointRepository {
    db: DatabaseConnection,
}

impl SyncCheckpointRepository {
    /// Creates a new checkpoint repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the last successful sync time for a source, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_last_sync_at(
        &self,
        source: &str,
    ) -> Result<Option<DateTime<Utc>>, CheckpointError> {
        let checkpoint = sync_checkpoints::Entity::find_by_id(source)
            .one(&self.db)
            .await?;
        Ok(checkpoint.map(|row| row.last_sync_at.to_utc()))
    }

    /// Upserts the checkpoint for a source.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn set_last_sync_at(
        &self,
        source: &str,
        last_sync_at: DateTime<Utc>,
    ) -> Result<(), CheckpointError> {
        let now = Utc::now().into();
        let existing = sync_checkpoints::Entity::find_by_id(source)
            .one(&self.db)
            .await?;

        if let Some(existing) = existing {
            let mut active: sync_checkpoints::ActiveModel = existing.into();
            active.last_sync_at = Set(last_sync_at.into());
            active.updated_at = Set(now);
            active.update(&self.db).await?;
        } else {
            let checkpoint = sync_checkpoints::ActiveModel {
                source: Set(source.to_string()),
                last_sync_at: Set(last_sync_at.into()),
                updated_at: Set(now),
            };
            checkpoint.insert(&self.db).await?;
        }

        Ok(())
    }
}
