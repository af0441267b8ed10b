//! `SeaORM` Entity for the omie_parties table.
//!
//! Clients and suppliers registered in the ERP. `cpf_cnpj` is stored as
//! received (masked or unmasked); `cpf_cnpj_digits` is the normalized
//! form used by tolerant lookups.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "omie_parties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub omie_code: i64,
    pub name: String,
    pub cpf_cnpj: Option<String>,
    pub cpf_cnpj_digits: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
