//! Party (investor/supplier) repository.
//!
//! The CPF/CNPJ lookup is deliberately tolerant: stored documents may be
//! masked, unmasked, or inconsistently formatted, and one identity can
//! map to several ERP client codes (historical re-registration). Every
//! matching code is returned and treated as the same investor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::debug;

use lastro_core::omie::PartyRecord;
use lastro_shared::types::document::digits;
use lastro_shared::types::Document;

use crate::entities::omie_parties;

/// Error types for party operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for ERP-registered parties.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts decoded party records in batches.
    ///
    /// # Errors
    ///
    /// Returns an error if any batch write fails.
    pub async fn upsert_batch(
        &self,
        records: &[PartyRecord],
        batch_size: usize,
        synced_at: DateTime<Utc>,
    ) -> Result<u64, PartyError> {
        let mut upserted = 0u64;

        for chunk in records.chunks(batch_size.max(1)) {
            let models = chunk.iter().map(|record| active_model(record, synced_at));
            omie_parties::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(omie_parties::Column::OmieCode)
                        .update_columns([
                            omie_parties::Column::Name,
                            omie_parties::Column::CpfCnpj,
                            omie_parties::Column::CpfCnpjDigits,
                            omie_parties::Column::Email,
                            omie_parties::Column::City,
                            omie_parties::Column::State,
                            omie_parties::Column::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            upserted += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }

        Ok(upserted)
    }

    /// Resolves a CPF/CNPJ to every matching ERP client code.
    ///
    /// Three strategies are tried in order, first non-empty result wins:
    /// 1. exact match on the stored raw value;
    /// 2. exact match on the digits-only column;
    /// 3. `ILIKE` over a pattern tolerating any interleaved mask.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn find_client_codes_by_document(
        &self,
        document: &Document,
    ) -> Result<Vec<i64>, PartyError> {
        if document.is_empty() {
            return Ok(Vec::new());
        }

        let exact = omie_parties::Entity::find()
            .filter(omie_parties::Column::CpfCnpj.eq(document.raw.as_str()))
            .all(&self.db)
            .await?;
        if !exact.is_empty() {
            return Ok(exact.into_iter().map(|party| party.omie_code).collect());
        }

        let by_digits = omie_parties::Entity::find()
            .filter(omie_parties::Column::CpfCnpjDigits.eq(document.digits.as_str()))
            .all(&self.db)
            .await?;
        if !by_digits.is_empty() {
            return Ok(by_digits.into_iter().map(|party| party.omie_code).collect());
        }

        // Interleaved wildcard pattern matches the digits through any mask.
        let pattern = format!("%{}%", interleave_wildcards(&document.digits));
        debug!(pattern = %pattern, "party lookup fell back to ILIKE");
        let fuzzy = omie_parties::Entity::find()
            .filter(
                Condition::all()
                    .add(Expr::col(omie_parties::Column::CpfCnpj).ilike(pattern)),
            )
            .all(&self.db)
            .await?;

        Ok(fuzzy.into_iter().map(|party| party.omie_code).collect())
    }

    /// Names for the given party codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn names_by_codes(
        &self,
        codes: &[i64],
    ) -> Result<HashMap<i64, String>, PartyError> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        let parties = omie_parties::Entity::find()
            .filter(omie_parties::Column::OmieCode.is_in(codes.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(parties
            .into_iter()
            .map(|party| (party.omie_code, party.name))
            .collect())
    }
}

fn interleave_wildcards(digits: &str) -> String {
    digits
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("%")
}

fn active_model(record: &PartyRecord, synced_at: DateTime<Utc>) -> omie_parties::ActiveModel {
    let document_digits = record
        .cpf_cnpj
        .as_deref()
        .map(digits)
        .filter(|d| !d.is_empty());

    omie_parties::ActiveModel {
        omie_code: Set(record.code),
        name: Set(record.name.clone()),
        cpf_cnpj: Set(record.cpf_cnpj.clone()),
        cpf_cnpj_digits: Set(document_digits),
        email: Set(record.email.clone()),
        city: Set(record.city.clone()),
        state: Set(record.state.clone()),
        synced_at: Set(synced_at.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_model_normalizes_digits() {
        let record = PartyRecord {
            code: 4455,
            name: "Investidor Um".to_string(),
            cpf_cnpj: Some("123.456.789-00".to_string()),
            email: None,
            city: None,
            state: None,
        };

        let model = active_model(&record, Utc::now());
        assert_eq!(model.cpf_cnpj, Set(Some("123.456.789-00".to_string())));
        assert_eq!(model.cpf_cnpj_digits, Set(Some("12345678900".to_string())));
    }

    #[test]
    fn test_active_model_empty_document_stays_null() {
        let record = PartyRecord {
            code: 1,
            name: "Sem documento".to_string(),
            cpf_cnpj: Some("--".to_string()),
            email: None,
            city: None,
            state: None,
        };

        let model = active_model(&record, Utc::now());
        assert_eq!(model.cpf_cnpj_digits, Set(None));
    }

    #[test]
    fn test_interleave_wildcards() {
        assert_eq!(interleave_wildcards("123"), "1%2%3");
        assert_eq!(interleave_wildcards(""), "");
    }
}
