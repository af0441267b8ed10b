//! `SeaORM` Entity for the operations table.
//!
//! Business-facing investment operations, maintained from a spreadsheet
//! by a separate ingestion path. This system only consumes them as a
//! join target; `name` must match an ERP project name.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<Date>,
    pub expected_completion_date: Option<Date>,
    /// Expected ROI as stored in the spreadsheet: a fraction (`0.30`)
    /// or a percentage (`30`); normalized at aggregation time.
    pub expected_roi: Option<Decimal>,
    pub document_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
