//! Initial database migration.
//!
//! Creates the ERP mirror tables, the operations join target, and the
//! per-source sync checkpoint table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ERP MIRROR TABLES
        // ============================================================
        db.execute_unprepared(OMIE_CATEGORIES_SQL).await?;
        db.execute_unprepared(OMIE_PARTIES_SQL).await?;
        db.execute_unprepared(OMIE_PROJECTS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_PAYABLE_SQL).await?;
        db.execute_unprepared(FINANCIAL_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 2: OPERATIONS (spreadsheet-owned join target)
        // ============================================================
        db.execute_unprepared(OPERATIONS_SQL).await?;

        // ============================================================
        // PART 3: SYNC CHECKPOINTS
        // ============================================================
        db.execute_unprepared(SYNC_CHECKPOINTS_SQL).await?;

        // ============================================================
        // PART 4: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const OMIE_CATEGORIES_SQL: &str = r"
CREATE TABLE omie_categories (
    omie_code VARCHAR(40) PRIMARY KEY,
    description TEXT NOT NULL DEFAULT '',
    parent_code VARCHAR(40),
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const OMIE_PARTIES_SQL: &str = r"
CREATE TABLE omie_parties (
    omie_code BIGINT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    cpf_cnpj VARCHAR(32),
    cpf_cnpj_digits VARCHAR(20),
    email TEXT,
    city TEXT,
    state VARCHAR(4),
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const OMIE_PROJECTS_SQL: &str = r"
CREATE TABLE omie_projects (
    omie_internal_code BIGINT PRIMARY KEY,
    omie_code VARCHAR(60),
    name TEXT NOT NULL DEFAULT '',
    active BOOLEAN NOT NULL DEFAULT TRUE,
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_PAYABLE_SQL: &str = r"
CREATE TABLE accounts_payable (
    title_code BIGINT PRIMARY KEY,
    client_code BIGINT,
    project_code BIGINT,
    category_code VARCHAR(40),
    amount NUMERIC(15, 2) NOT NULL DEFAULT 0,
    due_date DATE,
    payment_date DATE,
    status TEXT,
    raw_payload JSONB NOT NULL DEFAULT '{}'::jsonb,
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const FINANCIAL_MOVEMENTS_SQL: &str = r"
CREATE TABLE financial_movements (
    omie_key VARCHAR(120) PRIMARY KEY,
    cod_mov_cc BIGINT,
    mf_key VARCHAR(200) NOT NULL DEFAULT '',
    entry_type VARCHAR(20),
    nature VARCHAR(4),
    client_code BIGINT,
    project_code BIGINT,
    category_code VARCHAR(40),
    amount NUMERIC(15, 2) NOT NULL DEFAULT 0,
    issue_date DATE,
    due_date DATE,
    payment_date DATE,
    status TEXT,
    description TEXT,
    raw_payload JSONB NOT NULL DEFAULT '{}'::jsonb,
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const OPERATIONS_SQL: &str = r"
CREATE TABLE operations (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    status TEXT,
    city TEXT,
    state VARCHAR(4),
    start_date DATE,
    expected_completion_date DATE,
    expected_roi NUMERIC(8, 4),
    document_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SYNC_CHECKPOINTS_SQL: &str = r"
CREATE TABLE sync_checkpoints (
    source VARCHAR(60) PRIMARY KEY,
    last_sync_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_movements_client_code ON financial_movements (client_code);
CREATE INDEX idx_movements_project_code ON financial_movements (project_code);
CREATE INDEX idx_movements_category_code ON financial_movements (category_code);
CREATE INDEX idx_movements_nature ON financial_movements (nature);
CREATE INDEX idx_parties_cpf_cnpj_digits ON omie_parties (cpf_cnpj_digits);
CREATE INDEX idx_projects_name ON omie_projects (name);
CREATE INDEX idx_payables_project_code ON accounts_payable (project_code);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS sync_checkpoints CASCADE;
DROP TABLE IF EXISTS operations CASCADE;
DROP TABLE IF EXISTS financial_movements CASCADE;
DROP TABLE IF EXISTS accounts_payable CASCADE;
DROP TABLE IF EXISTS omie_projects CASCADE;
DROP TABLE IF EXISTS omie_parties CASCADE;
DROP TABLE IF EXISTS omie_categories CASCADE;
";
