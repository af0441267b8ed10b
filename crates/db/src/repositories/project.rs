//! Project repository.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use lastro_core::financial::ProjectCandidate;
use lastro_core::omie::ProjectRecord;

use crate::entities::omie_projects;

/// Error types for project operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for ERP projects.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts decoded project records in batches.
    ///
    /// # Errors
    ///
    /// Returns an error if any batch write fails.
    pub async fn upsert_batch(
        &self,
        records: &[ProjectRecord],
        batch_size: usize,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, ProjectError> {
        let mut upserted = 0u64;

        for chunk in records.chunks(batch_size.max(1)) {
            let models = chunk.iter().map(|record| active_model(record, synced_at));
            omie_projects::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(omie_projects::Column::OmieInternalCode)
                        .update_columns([
                            omie_projects::Column::OmieCode,
                            omie_projects::Column::Name,
                            omie_projects::Column::Active,
                            omie_projects::Column::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            upserted += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }

        Ok(upserted)
    }

    /// Projects for the given internal codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_internal_codes(
        &self,
        codes: &[i64],
    ) -> Result<Vec<omie_projects::Model>, ProjectError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let projects = omie_projects::Entity::find()
            .filter(omie_projects::Column::OmieInternalCode.is_in(codes.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(projects)
    }

    /// Every project, as name-matching candidates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_candidates(&self) -> Result<Vec<ProjectCandidate>, ProjectError> {
        let projects = omie_projects::Entity::find().all(&self.db).await?;
        Ok(projects.into_iter().map(candidate).collect())
    }
}

/// Projects a stored project onto the name-matching candidate shape.
#[must_use]
pub fn candidate(model: omie_projects::Model) -> ProjectCandidate {
    ProjectCandidate {
        internal_code: model.omie_internal_code,
        name: model.name,
    }
}

fn active_model(record: &ProjectRecord, synced_at: DateTime<Utc>) -> omie_projects::ActiveModel {
    omie_projects::ActiveModel {
        omie_internal_code: Set(record.internal_code),
        omie_code: Set(record.code.clone()),
        name: Set(record.name.clone()),
        active: Set(record.active),
        synced_at: Set(synced_at.into()),
    }
}
