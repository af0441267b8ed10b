//! `SeaORM` Entity for the financial_movements table.
//!
//! Ledger lines imported from the Omie cash-flow API. Rows are upserted
//! by `omie_key` (last-write-wins) and never deleted. Links to parties,
//! projects, and categories are weak ERP codes, not foreign keys.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_movements")]
pub struct Model {
    /// `cod_mov_cc` rendered decimal, or the composite fallback key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub omie_key: String,
    pub cod_mov_cc: Option<i64>,
    /// Composite legacy/debug key, never the conflict target.
    pub mf_key: String,
    pub entry_type: Option<String>,
    pub nature: Option<String>,
    pub client_code: Option<i64>,
    pub project_code: Option<i64>,
    pub category_code: Option<String>,
    /// Non-negative magnitude; `nature` carries direction.
    pub amount: Decimal,
    pub issue_date: Option<Date>,
    pub due_date: Option<Date>,
    pub payment_date: Option<Date>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub raw_payload: Json,
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
