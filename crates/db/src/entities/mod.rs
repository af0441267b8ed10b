//! `SeaORM` entity definitions.

pub mod accounts_payable;
pub mod financial_movements;
pub mod omie_categories;
pub mod omie_parties;
pub mod omie_projects;
pub mod operations;
pub mod sync_checkpoints;
