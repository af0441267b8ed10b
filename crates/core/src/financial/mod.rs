//! Investor-facing financial aggregation.
//!
//! Turns raw ledger rows into the summaries investors see: invested
//! capital, expected/realized profit, ROI, and cost breakdowns. All
//! arithmetic is `Decimal`; category comparisons tolerate formatting
//! noise via [`lastro_shared::types::codes`].
//!
//! Two chart-of-accounts codes carry special meaning:
//! - `1.04.02` - capital contribution from an investor
//! - `2.10.98` - profit distribution to an investor
//!
//! `2.10.98`/`2.10.99` are excluded from cost aggregation.

pub mod costs;
pub mod matching;
pub mod summary;
pub mod types;

pub use costs::{cost_breakdown, is_cost_row};
pub use matching::best_project_match;
pub use summary::{normalize_expected_roi, summarize};
pub use types::{
    CostBreakdown, CostCategory, CostItem, FinancialSummary, MovementRow, ProjectCandidate,
};

/// Category code for capital contributions (invested amount).
pub const CAPITAL_CONTRIBUTION_CATEGORY: &str = "1.04.02";

/// Category code for profit distributions (realized profit).
pub const PROFIT_DISTRIBUTION_CATEGORY: &str = "2.10.98";

/// Category codes excluded from cost aggregation.
pub const COST_EXCLUDED_CATEGORIES: [&str; 2] = ["2.10.98", "2.10.99"];

/// Nature flag marking payable rows.
pub const PAYABLE_NATURE: &str = "p";
