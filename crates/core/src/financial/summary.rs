//! Invested/realized/ROI summary computation.

use rust_decimal::Decimal;

use lastro_shared::types::codes_equivalent;

use super::types::{FinancialSummary, MovementRow};
use super::{CAPITAL_CONTRIBUTION_CATEGORY, PROFIT_DISTRIBUTION_CATEGORY};

/// Normalizes a caller-supplied expected ROI to a percentage.
///
/// The spreadsheet feeding `expected_roi` carries both fractions
/// (`0.30`) and percentages (`30`); values below one are treated as
/// fractions and scaled.
#[must_use]
pub fn normalize_expected_roi(roi: Decimal) -> Decimal {
    if roi < Decimal::ONE {
        roi * Decimal::ONE_HUNDRED
    } else {
        roi
    }
}

/// Computes the financial summary for one operation's movement rows.
///
/// Invested amount sums rows in the capital-contribution category,
/// realized profit sums rows in the profit-distribution category; both
/// tolerate category-code formatting noise. Realized ROI is zero when
/// nothing was invested.
#[must_use]
pub fn summarize(rows: &[MovementRow], roi_expected: Decimal) -> FinancialSummary {
    let sum_category = |category: &str| -> Decimal {
        rows.iter()
            .filter(|row| {
                row.category_code
                    .as_deref()
                    .is_some_and(|code| codes_equivalent(code, category))
            })
            .map(|row| row.amount)
            .sum()
    };

    let amount_invested = sum_category(CAPITAL_CONTRIBUTION_CATEGORY);
    let realized_profit = sum_category(PROFIT_DISTRIBUTION_CATEGORY);

    let realized_roi_percent = if amount_invested > Decimal::ZERO {
        realized_profit / amount_invested * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let roi_expected_percent = normalize_expected_roi(roi_expected);
    let expected_profit = amount_invested * roi_expected_percent / Decimal::ONE_HUNDRED;

    FinancialSummary {
        amount_invested,
        expected_profit,
        realized_profit,
        realized_roi_percent,
        roi_expected_percent,
    }
}
