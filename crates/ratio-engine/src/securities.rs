//! Securities-sector ratio stages: margin on the lending book, leverage,
//! revenue mix, and the volatility of trading income.

use ranking_core::Panel;

use crate::rolling::{ratio, rolling_mean, rolling_std, rolling_sum};

/// Revenue lines that make up total sales, in statement order. Each gets a
/// `{line}_pct` share-of-sales column.
pub const REVENUE_LINES: [&str; 11] = [
    "income_fvtpl",
    "income_htm",
    "income_loans_receivables",
    "income_afs",
    "income_derivatives",
    "revenue_brokerage",
    "revenue_underwriting",
    "revenue_advisory",
    "revenue_auction_trust",
    "revenue_custody",
    "other_revenues",
];

/// Net interest margin on the loan book:
/// (income from loans and receivables − interest expenses − loss provisions) / loans.
/// The numerator is kept as `nim_spread` for the sector-wide aggregate.
pub fn nim_stage(panel: &mut Panel) {
    for row in panel.rows_mut() {
        let spread = match (
            row.get("income_loans_receivables"),
            row.get("interest_expenses"),
            row.get("provision_for_losses"),
        ) {
            (Some(income), Some(interest), Some(provisions)) => {
                Some(income - interest - provisions)
            }
            _ => None,
        };
        row.set("nim_spread", spread);
        row.set("nim_securities", ratio(spread, row.get("loans")));
    }
}

/// Loans-to-equity: the point-in-time ratio plus its 8-quarter-summed
/// variant used as the threshold reference.
pub fn leverage_stage(panel: &mut Panel) {
    rolling_sum(panel, "loans", "loans_8q", 8);
    rolling_sum(panel, "equity", "equity_8q", 8);

    for row in panel.rows_mut() {
        row.set("lte_8q", ratio(row.get("loans_8q"), row.get("equity_8q")));
        row.set("lte", ratio(row.get("loans"), row.get("equity")));
    }
}

/// Debt-to-equity.
pub fn debt_stage(panel: &mut Panel) {
    for row in panel.rows_mut() {
        row.set("debt_to_equity", ratio(row.get("debt"), row.get("equity")));
    }
}

/// Each revenue line as a share of total sales.
pub fn revenue_mix_stage(panel: &mut Panel) {
    for row in panel.rows_mut() {
        let sales = row.get("sales");
        for line in REVENUE_LINES {
            let pct = ratio(row.get(line), sales);
            row.set(&format!("{line}_pct"), pct);
        }
    }
}

/// Coefficient of variation of FVTPL income over a trailing window:
/// rolling mean divided by rolling sample standard deviation.
pub fn fvtpl_variation_stage(panel: &mut Panel, window: usize) {
    rolling_mean(panel, "fvtpl", "fvtpl_mean_12q", window);
    rolling_std(panel, "fvtpl", "fvtpl_std_12q", window);

    for row in panel.rows_mut() {
        let coef = ratio(row.get("fvtpl_mean_12q"), row.get("fvtpl_std_12q"));
        row.set("coef_var_12q", coef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranking_core::{Panel, PanelRow};

    #[test]
    fn nim_subtracts_interest_and_provisions() {
        let rows = vec![PanelRow::new("SEC", 2023, 1)
            .with_field("income_loans_receivables", Some(50.0))
            .with_field("interest_expenses", Some(20.0))
            .with_field("provision_for_losses", Some(5.0))
            .with_field("loans", Some(500.0))];
        let mut panel = Panel::from_raw(rows).unwrap();
        nim_stage(&mut panel);

        assert_eq!(panel.rows()[0].get("nim_spread"), Some(25.0));
        assert!((panel.rows()[0].get("nim_securities").unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn lte_8q_needs_eight_quarters() {
        let rows: Vec<PanelRow> = (0..9)
            .map(|i| {
                PanelRow::new("SEC", 2020 + i / 4, (i % 4) as u8 + 1)
                    .with_field("loans", Some(300.0))
                    .with_field("equity", Some(100.0))
            })
            .collect();
        let mut panel = Panel::from_raw(rows).unwrap();
        leverage_stage(&mut panel);

        assert_eq!(panel.rows()[6].get("lte_8q"), None);
        assert_eq!(panel.rows()[7].get("lte_8q"), Some(3.0));
        assert_eq!(panel.rows()[8].get("lte"), Some(3.0));
    }

    #[test]
    fn revenue_mix_is_share_of_sales() {
        let mut row = PanelRow::new("SEC", 2023, 1).with_field("sales", Some(200.0));
        for line in REVENUE_LINES {
            row.set(line, Some(10.0));
        }
        let mut panel = Panel::from_raw(vec![row]).unwrap();
        revenue_mix_stage(&mut panel);

        assert_eq!(panel.rows()[0].get("income_fvtpl_pct"), Some(0.05));
        assert_eq!(panel.rows()[0].get("other_revenues_pct"), Some(0.05));
    }

    #[test]
    fn zero_sales_leaves_mix_undefined() {
        let mut row = PanelRow::new("SEC", 2023, 1).with_field("sales", Some(0.0));
        for line in REVENUE_LINES {
            row.set(line, Some(10.0));
        }
        let mut panel = Panel::from_raw(vec![row]).unwrap();
        revenue_mix_stage(&mut panel);

        assert_eq!(panel.rows()[0].get("income_fvtpl_pct"), None);
    }

    #[test]
    fn coef_var_is_rolling_mean_over_rolling_std() {
        let rows: Vec<PanelRow> = (0..12)
            .map(|i| {
                PanelRow::new("SEC", 2020 + i / 4, (i % 4) as u8 + 1)
                    .with_field("fvtpl", Some(if i % 2 == 0 { 10.0 } else { 20.0 }))
            })
            .collect();
        let mut panel = Panel::from_raw(rows).unwrap();
        fvtpl_variation_stage(&mut panel, 12);

        let row = &panel.rows()[11];
        let mean = row.get("fvtpl_mean_12q").unwrap();
        let std = row.get("fvtpl_std_12q").unwrap();
        assert!((mean - 15.0).abs() < 1e-12);
        assert!((row.get("coef_var_12q").unwrap() - mean / std).abs() < 1e-12);
        assert_eq!(panel.rows()[10].get("coef_var_12q"), None);
    }
}
