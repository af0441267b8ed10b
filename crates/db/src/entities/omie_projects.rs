//! `SeaORM` Entity for the omie_projects table.
//!
//! ERP projects. `omie_internal_code` is the join key used by movement
//! rows; `name` joins to an operation by name match.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "omie_projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub omie_internal_code: i64,
    pub omie_code: Option<String>,
    pub name: String,
    pub active: bool,
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
