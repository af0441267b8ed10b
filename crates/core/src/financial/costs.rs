//! Cost aggregation: payable rows grouped by category, then supplier.

use std::collections::HashMap;

use rust_decimal::Decimal;

use lastro_shared::types::{codes_equivalent, normalize_code};

use super::types::{CostBreakdown, CostCategory, CostItem, MovementRow};
use super::{COST_EXCLUDED_CATEGORIES, PAYABLE_NATURE};

/// Returns true when a row participates in cost aggregation.
///
/// Costs are payable rows (`nature == "p"`, case-insensitive) outside
/// the profit-distribution categories.
#[must_use]
pub fn is_cost_row(row: &MovementRow) -> bool {
    let payable = row
        .nature
        .as_deref()
        .is_some_and(|nature| nature.eq_ignore_ascii_case(PAYABLE_NATURE));
    if !payable {
        return false;
    }
    match row.category_code.as_deref() {
        Some(code) => !COST_EXCLUDED_CATEGORIES
            .iter()
            .any(|excluded| codes_equivalent(code, excluded)),
        None => true,
    }
}

/// Builds the cost breakdown for one operation's movement rows.
///
/// Rows are grouped by normalized category code and, within each
/// category, by supplier code. Names resolve through the provided maps,
/// falling back to the raw code. Categories and supplier items are both
/// sorted descending by total.
#[must_use]
pub fn cost_breakdown(
    rows: &[MovementRow],
    category_names: &HashMap<String, String>,
    party_names: &HashMap<i64, String>,
) -> CostBreakdown {
    let mut total_costs = Decimal::ZERO;
    // normalized category code -> (display code, total, supplier totals)
    let mut groups: HashMap<String, (String, Decimal, HashMap<Option<i64>, Decimal>)> =
        HashMap::new();

    for row in rows.iter().filter(|row| is_cost_row(row)) {
        total_costs += row.amount;

        let display_code = row.category_code.clone().unwrap_or_default();
        let group = groups
            .entry(normalize_code(&display_code))
            .or_insert_with(|| (display_code, Decimal::ZERO, HashMap::new()));
        group.1 += row.amount;
        *group.2.entry(row.client_code).or_default() += row.amount;
    }

    let mut categories: Vec<CostCategory> = groups
        .into_values()
        .map(|(category_code, total, suppliers)| {
            let mut items: Vec<CostItem> = suppliers
                .into_iter()
                .map(|(party_code, item_total)| CostItem {
                    party_code,
                    party_name: resolve_party_name(party_code, party_names),
                    total: item_total,
                })
                .collect();
            items.sort_by(|a, b| b.total.cmp(&a.total).then(a.party_code.cmp(&b.party_code)));

            CostCategory {
                category_name: resolve_category_name(&category_code, category_names),
                category_code,
                total,
                items,
            }
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_code.cmp(&b.category_code))
    });

    CostBreakdown {
        total_costs,
        categories,
    }
}

fn resolve_category_name(code: &str, names: &HashMap<String, String>) -> String {
    names
        .get(code)
        .cloned()
        .or_else(|| {
            names
                .iter()
                .find(|(stored, _)| codes_equivalent(stored, code))
                .map(|(_, name)| name.clone())
        })
        .unwrap_or_else(|| code.to_string())
}

fn resolve_party_name(code: Option<i64>, names: &HashMap<i64, String>) -> String {
    match code {
        Some(code) => names
            .get(&code)
            .cloned()
            .unwrap_or_else(|| code.to_string()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payable(category: &str, client: i64, amount: Decimal) -> MovementRow {
        MovementRow {
            client_code: Some(client),
            project_code: Some(77),
            category_code: Some(category.to_string()),
            nature: Some("p".to_string()),
            amount,
        }
    }

    #[test]
    fn test_cost_exclusion_scenario() {
        let rows = vec![
            payable("3.01", 100, dec!(1000)),
            payable("2.10.98", 100, dec!(500)),
        ];

        let breakdown = cost_breakdown(&rows, &HashMap::new(), &HashMap::new());

        assert_eq!(breakdown.total_costs, dec!(1000));
        assert_eq!(breakdown.categories.len(), 1);
        let category = &breakdown.categories[0];
        assert_eq!(category.category_code, "3.01");
        assert_eq!(category.total, dec!(1000));
        assert_eq!(category.items.len(), 1);
        assert_eq!(category.items[0].party_code, Some(100));
        assert_eq!(category.items[0].total, dec!(1000));
    }

    #[test]
    fn test_excluded_categories_never_appear() {
        let rows = vec![
            payable("2.10.98", 1, dec!(100)),
            payable("02.10.99", 2, dec!(200)),
            payable("2.10.99", 3, dec!(300)),
        ];

        let breakdown = cost_breakdown(&rows, &HashMap::new(), &HashMap::new());
        assert_eq!(breakdown.total_costs, Decimal::ZERO);
        assert!(breakdown.categories.is_empty());
    }

    #[test]
    fn test_non_payable_rows_ignored() {
        let mut receivable = payable("3.01", 1, dec!(400));
        receivable.nature = Some("r".to_string());
        let mut no_nature = payable("3.01", 1, dec!(400));
        no_nature.nature = None;

        let breakdown =
            cost_breakdown(&[receivable, no_nature], &HashMap::new(), &HashMap::new());
        assert_eq!(breakdown.total_costs, Decimal::ZERO);
    }

    #[test]
    fn test_uppercase_nature_accepted() {
        let mut row = payable("3.01", 1, dec!(50));
        row.nature = Some("P".to_string());

        let breakdown = cost_breakdown(&[row], &HashMap::new(), &HashMap::new());
        assert_eq!(breakdown.total_costs, dec!(50));
    }

    #[test]
    fn test_grouping_and_descending_sort() {
        let rows = vec![
            payable("3.01", 1, dec!(100)),
            payable("03.01", 2, dec!(900)),
            payable("4.02", 1, dec!(600)),
        ];

        let breakdown = cost_breakdown(&rows, &HashMap::new(), &HashMap::new());

        assert_eq!(breakdown.total_costs, dec!(1600));
        assert_eq!(breakdown.categories.len(), 2);
        // "3.01" + "03.01" merge and outrank "4.02".
        assert_eq!(breakdown.categories[0].category_code, "3.01");
        assert_eq!(breakdown.categories[0].total, dec!(1000));
        assert_eq!(breakdown.categories[1].category_code, "4.02");
        // Within the merged category, supplier 2 outranks supplier 1.
        assert_eq!(breakdown.categories[0].items[0].party_code, Some(2));
        assert_eq!(breakdown.categories[0].items[1].party_code, Some(1));
    }

    #[test]
    fn test_name_resolution_with_fallbacks() {
        let mut category_names = HashMap::new();
        category_names.insert("3.01".to_string(), "Obra civil".to_string());
        let mut party_names = HashMap::new();
        party_names.insert(1_i64, "Construtora Alfa".to_string());

        let rows = vec![payable("03.01", 1, dec!(10)), payable("9.99", 2, dec!(5))];
        let breakdown = cost_breakdown(&rows, &category_names, &party_names);

        // Normalized-equivalent stored code still resolves the name.
        assert_eq!(breakdown.categories[0].category_name, "Obra civil");
        assert_eq!(breakdown.categories[0].items[0].party_name, "Construtora Alfa");
        // Unknown category falls back to the raw code, unknown party to
        // the rendered code.
        assert_eq!(breakdown.categories[1].category_name, "9.99");
        assert_eq!(breakdown.categories[1].items[0].party_name, "2");
    }
}
