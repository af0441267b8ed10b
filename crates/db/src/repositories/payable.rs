//! Accounts-payable repository.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

use lastro_core::omie::PayableRecord;

use crate::entities::accounts_payable;

/// Error types for accounts-payable operations.
#[derive(Debug, thiserror::Error)]
pub enum PayableError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for imported accounts-payable titles.
#[derive(Debug, Clone)]
pub struct PayableRepository {
    db: DatabaseConnection,
}

impl PayableRepository {
    /// Creates a new accounts-payable repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts decoded payable records in batches.
    ///
    /// # Errors
    ///
    /// Returns an error if any batch write fails.
    pub async fn upsert_batch(
        &self,
        records: &[PayableRecord],
        batch_size: usize,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, PayableError> {
        let mut upserted = 0u64;

        for chunk in records.chunks(batch_size.max(1)) {
            let models = chunk.iter().map(|record| active_model(record, synced_at));
            accounts_payable::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(accounts_payable::Column::TitleCode)
                        .update_columns([
                            accounts_payable::Column::ClientCode,
                            accounts_payable::Column::ProjectCode,
                            accounts_payable::Column::CategoryCode,
                            accounts_payable::Column::Amount,
                            accounts_payable::Column::DueDate,
                            accounts_payable::Column::PaymentDate,
                            accounts_payable::Column::Status,
                            accounts_payable::Column::RawPayload,
                            accounts_payable::Column::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            upserted += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }

        Ok(upserted)
    }
}

fn active_model(
    record: &PayableRecord,
    synced_at: DateTime<Utc>,
) -> accounts_payable::ActiveModel {
    accounts_payable::ActiveModel {
        title_code: Set(record.title_code),
        client_code: Set(record.client_code),
        project_code: Set(record.project_code),
        category_code: Set(record.category_code.clone()),
        amount: Set(record.amount),
        due_date: Set(record.due_date),
        payment_date: Set(record.payment_date),
        status: Set(record.status.clone()),
        raw_payload: Set(record.raw.clone()),
        synced_at: Set(synced_at.into()),
    }
}
