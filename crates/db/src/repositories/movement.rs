//! Financial movement repository.
//!
//! Write side: batched upserts keyed on `omie_key`, last-write-wins on
//! every column, rows never deleted. Read side: the lookups the
//! reconciliation engine walks at query time.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
};

use lastro_core::financial::MovementRow;
use lastro_core::omie::MovementRecord;

use crate::entities::financial_movements;

/// Error types for movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for imported ledger movements.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts decoded movement records in batches.
    ///
    /// The conflict target is `omie_key`; a batch failure aborts the
    /// whole call (no partial-batch retry).
    ///
    /// # Errors
    ///
    /// Returns an error if any batch write fails.
    pub async fn upsert_batch(
        &self,
        records: &[MovementRecord],
        batch_size: usize,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, MovementError> {
        let mut upserted = 0u64;

        for chunk in records.chunks(batch_size.max(1)) {
            let models = chunk.iter().map(|record| active_model(record, synced_at));
            financial_movements::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(financial_movements::Column::OmieKey)
                        .update_columns([
                            financial_movements::Column::CodMovCc,
                            financial_movements::Column::MfKey,
                            financial_movements::Column::EntryType,
                            financial_movements::Column::Nature,
                            financial_movements::Column::ClientCode,
                            financial_movements::Column::ProjectCode,
                            financial_movements::Column::CategoryCode,
                            financial_movements::Column::Amount,
                            financial_movements::Column::IssueDate,
                            financial_movements::Column::DueDate,
                            financial_movements::Column::PaymentDate,
                            financial_movements::Column::Status,
                            financial_movements::Column::Description,
                            financial_movements::Column::RawPayload,
                            financial_movements::Column::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            upserted += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }

        Ok(upserted)
    }

    /// Distinct project codes touched by any of the given client codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn distinct_project_codes_for_clients(
        &self,
        client_codes: &[i64],
    ) -> Result<Vec<i64>, MovementError> {
        if client_codes.is_empty() {
            return Ok(Vec::new());
        }

        let codes: Vec<i64> = financial_movements::Entity::find()
            .select_only()
            .column(financial_movements::Column::ProjectCode)
            .distinct()
            .filter(financial_movements::Column::ClientCode.is_in(client_codes.iter().copied()))
            .filter(financial_movements::Column::ProjectCode.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(codes)
    }

    /// All movement rows for the given project codes, as aggregation
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn rows_by_project_codes(
        &self,
        project_codes: &[i64],
    ) -> Result<Vec<MovementRow>, MovementError> {
        if project_codes.is_empty() {
            return Ok(Vec::new());
        }

        let models = financial_movements::Entity::find()
            .filter(financial_movements::Column::ProjectCode.is_in(project_codes.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(models.iter().map(movement_row).collect())
    }
}

/// Projects a stored movement onto the aggregation input shape.
#[must_use]
pub fn movement_row(model: &financial_movements::Model) -> MovementRow {
    MovementRow {
        client_code: model.client_code,
        project_code: model.project_code,
        category_code: model.category_code.clone(),
        nature: model.nature.clone(),
        amount: model.amount,
    }
}

fn active_model(
    record: &MovementRecord,
    synced_at: DateTime<Utc>,
) -> financial_movements::ActiveModel {
    financial_movements::ActiveModel {
        omie_key: Set(record.key.clone()),
        cod_mov_cc: Set(record.cod_mov_cc),
        mf_key: Set(record.mf_key.clone()),
        entry_type: Set(record.entry_type.clone()),
        nature: Set(record.nature.clone()),
        client_code: Set(record.client_code),
        project_code: Set(record.project_code),
        category_code: Set(record.category_code.clone()),
        amount: Set(record.amount),
        issue_date: Set(record.issue_date),
        due_date: Set(record.due_date),
        payment_date: Set(record.payment_date),
        status: Set(record.status.clone()),
        description: Set(record.description.clone()),
        raw_payload: Set(record.raw.clone()),
        synced_at: Set(synced_at.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_active_model_mapping() {
        let record = MovementRecord {
            key: "9001234".to_string(),
            cod_mov_cc: Some(9_001_234),
            mf_key: "PAG:1:::".to_string(),
            entry_type: Some("PAG".to_string()),
            nature: Some("p".to_string()),
            client_code: Some(4455),
            project_code: Some(77),
            category_code: Some("2.01.03".to_string()),
            amount: dec!(1500.75),
            issue_date: None,
            due_date: None,
            payment_date: None,
            status: Some("LIQUIDADO".to_string()),
            description: None,
            raw: json!({"nCodMovCC": 9_001_234}),
            zero_amount_defaulted: false,
        };

        let now = Utc::now();
        let model = active_model(&record, now);

        assert_eq!(model.omie_key, Set("9001234".to_string()));
        assert_eq!(model.cod_mov_cc, Set(Some(9_001_234)));
        assert_eq!(model.amount, Set(dec!(1500.75)));
        assert_eq!(model.nature, Set(Some("p".to_string())));
    }
}
