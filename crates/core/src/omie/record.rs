//! Typed records produced by the Omie decoders.
//!
//! These are the storage-ready shapes: every tolerated field-spelling
//! variation has already been resolved, dates are normalized, amounts are
//! `Decimal`, and each record carries the raw payload where the table
//! retains it for audit/back-fill.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

/// A chart-of-accounts category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    /// ERP category code (e.g. `"1.04.02"`).
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Parent category code, when the ERP reports a hierarchy.
    pub parent_code: Option<String>,
}

/// A client or supplier registered in the ERP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyRecord {
    /// ERP-assigned party code (`codigo_cliente_omie`).
    pub code: i64,
    /// Registered name.
    pub name: String,
    /// CPF/CNPJ as stored in the ERP (masked or unmasked).
    pub cpf_cnpj: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State (UF).
    pub state: Option<String>,
}

/// A construction/investment project registered in the ERP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    /// ERP-internal project code; the join key used by movements.
    pub internal_code: i64,
    /// External/display code, may equal the internal code.
    pub code: Option<String>,
    /// Project name; joins to an operation by name match.
    pub name: String,
    /// Whether the project is active in the ERP.
    pub active: bool,
}

/// An accounts-payable title.
#[derive(Debug, Clone, PartialEq)]
pub struct PayableRecord {
    /// ERP title code (`codigo_lancamento_omie`).
    pub title_code: i64,
    /// Supplier party code.
    pub client_code: Option<i64>,
    /// Project code.
    pub project_code: Option<i64>,
    /// Category code.
    pub category_code: Option<String>,
    /// Document amount, non-negative magnitude.
    pub amount: Decimal,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Payment date, when settled.
    pub payment_date: Option<NaiveDate>,
    /// ERP status string.
    pub status: Option<String>,
    /// Full original record, retained for audit.
    pub raw: Value,
}

/// A cash-flow ledger movement.
///
/// `amount` is canonicalized to a non-negative magnitude at decode time;
/// `nature` alone carries direction (`"p"` = payable). Read-side
/// aggregation sums magnitudes and never re-applies `abs`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRecord {
    /// Primary key: `cod_mov_cc` rendered decimal, or the composite
    /// fallback when the ERP id is absent.
    pub key: String,
    /// ERP-assigned movement id, when present.
    pub cod_mov_cc: Option<i64>,
    /// Composite legacy/debug key, always computed, never the conflict
    /// target.
    pub mf_key: String,
    /// Entry type (`tp_lancamento`).
    pub entry_type: Option<String>,
    /// Nature flag, lowercase (`"p"` = payable).
    pub nature: Option<String>,
    /// Party code (`cod_cliente`).
    pub client_code: Option<i64>,
    /// Project code (`cod_projeto`).
    pub project_code: Option<i64>,
    /// Category code (`cod_categoria`).
    pub category_code: Option<String>,
    /// Amount, non-negative magnitude.
    pub amount: Decimal,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Payment date.
    pub payment_date: Option<NaiveDate>,
    /// ERP status string.
    pub status: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Full original record, retained for audit.
    pub raw: Value,
    /// True when `amount` was missing/non-numeric and defaulted to zero.
    pub zero_amount_defaulted: bool,
}

impl MovementRecord {
    /// Newest date observed on this record, used to advance checkpoints.
    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        [self.issue_date, self.due_date, self.payment_date]
            .into_iter()
            .flatten()
            .max()
    }
}

impl PayableRecord {
    /// Newest date observed on this record, used to advance checkpoints.
    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        [self.due_date, self.payment_date].into_iter().flatten().max()
    }
}
