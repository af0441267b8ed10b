//! Category repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use lastro_core::omie::CategoryRecord;

use crate::entities::omie_categories;

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for ERP chart-of-accounts categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts decoded category records in batches.
    ///
    /// # Errors
    ///
    /// Returns an error if any batch write fails.
    pub async fn upsert_batch(
        &self,
        records: &[CategoryRecord],
        batch_size: usize,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, CategoryError> {
        let mut upserted = 0u64;

        for chunk in records.chunks(batch_size.max(1)) {
            let models = chunk.iter().map(|record| active_model(record, synced_at));
            omie_categories::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(omie_categories::Column::OmieCode)
                        .update_columns([
                            omie_categories::Column::Description,
                            omie_categories::Column::ParentCode,
                            omie_categories::Column::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            upserted += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }

        Ok(upserted)
    }

    /// Descriptions for the given category codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn names_by_codes(
        &self,
        codes: &[String],
    ) -> Result<HashMap<String, String>, CategoryError> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        let categories = omie_categories::Entity::find()
            .filter(omie_categories::Column::OmieCode.is_in(codes.iter().map(String::as_str)))
            .all(&self.db)
            .await?;

        Ok(categories
            .into_iter()
            .map(|category| (category.omie_code, category.description))
            .collect())
    }

    /// Every category description keyed by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all_names(&self) -> Result<HashMap<String, String>, CategoryError> {
        let categories = omie_categories::Entity::find().all(&self.db).await?;
        Ok(categories
            .into_iter()
            .map(|category| (category.omie_code, category.description))
            .collect())
    }
}

fn active_model(
    record: &CategoryRecord,
    synced_at: DateTime<Utc>,
) -> omie_categories::ActiveModel {
    omie_categories::ActiveModel {
        omie_code: Set(record.code.clone()),
        description: Set(record.description.clone()),
        parent_code: Set(record.parent_code.clone()),
        synced_at: Set(synced_at.into()),
    }
}
