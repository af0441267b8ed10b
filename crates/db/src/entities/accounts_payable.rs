//! `SeaORM` Entity for the accounts_payable table.
//!
//! Accounts-payable titles from the ERP, upserted by title code.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts_payable")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub title_code: i64,
    pub client_code: Option<i64>,
    pub project_code: Option<i64>,
    pub category_code: Option<String>,
    pub amount: Decimal,
    pub due_date: Option<Date>,
    pub payment_date: Option<Date>,
    pub status: Option<String>,
    pub raw_payload: Json,
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
