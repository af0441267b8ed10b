//! Aggregation input and output types.

use rust_decimal::Decimal;
use serde::Serialize;

/// A ledger row as needed by the aggregation engine.
///
/// `amount` is a non-negative magnitude (canonicalized at ingestion);
/// `nature` carries direction.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRow {
    /// Party code (investor or supplier depending on nature).
    pub client_code: Option<i64>,
    /// Project code.
    pub project_code: Option<i64>,
    /// Category code.
    pub category_code: Option<String>,
    /// Nature flag, lowercase (`"p"` = payable).
    pub nature: Option<String>,
    /// Amount magnitude.
    pub amount: Decimal,
}

/// Per-operation financial summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// Sum of capital contributions.
    pub amount_invested: Decimal,
    /// Invested amount projected by the expected ROI.
    pub expected_profit: Decimal,
    /// Sum of profit distributions.
    pub realized_profit: Decimal,
    /// Realized profit over invested amount, as a percentage.
    pub realized_roi_percent: Decimal,
    /// Normalized expected ROI, as a percentage.
    pub roi_expected_percent: Decimal,
}

/// Cost totals grouped by category, then by supplier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Sum over every included payable row.
    pub total_costs: Decimal,
    /// Category groups, descending by total.
    pub categories: Vec<CostCategory>,
}

/// One category group of the cost breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCategory {
    /// Category code as stored.
    pub category_code: String,
    /// Resolved category name, falling back to the raw code.
    pub category_name: String,
    /// Sum over the category's rows.
    pub total: Decimal,
    /// Supplier items, descending by total.
    pub items: Vec<CostItem>,
}

/// One supplier line within a category group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    /// Supplier party code; absent when the row carried none.
    pub party_code: Option<i64>,
    /// Resolved supplier name, falling back to the rendered code.
    pub party_name: String,
    /// Sum over the supplier's rows in this category.
    pub total: Decimal,
}

/// A project as a candidate for operation-name matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCandidate {
    /// ERP-internal project code.
    pub internal_code: i64,
    /// Project name.
    pub name: String,
}
