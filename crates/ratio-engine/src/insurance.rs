//! Insurance-sector ratio stages: the TTM combined ratio and the four
//! leverage/reserve health ratios.

use ranking_core::Panel;

use crate::rolling::{ratio, rolling_sum};

/// Adds `incurred_losses_ttm`, `expenses_ttm`, `revenues_ttm`, and
/// `combined_ratio_ttm` to an income-statement panel. A company with fewer
/// than `window` quarters of history gets undefined TTM values.
pub fn combined_ratio_stage(panel: &mut Panel, window: usize) {
    rolling_sum(panel, "incurred_losses", "incurred_losses_ttm", window);
    rolling_sum(panel, "expenses", "expenses_ttm", window);
    rolling_sum(panel, "revenues", "revenues_ttm", window);

    for row in panel.rows_mut() {
        let numerator = match (row.get("incurred_losses_ttm"), row.get("expenses_ttm")) {
            (Some(losses), Some(expenses)) => Some(losses + expenses),
            _ => None,
        };
        let combined = ratio(numerator, row.get("revenues_ttm"));
        row.set("combined_ratio_ttm", combined);
    }
}

/// Adds the four health ratios to a panel carrying `net_premium_written`,
/// `gross_premium_written`, `equity`, `provisions`, and `ceded_reserves`.
pub fn health_ratio_stage(panel: &mut Panel) {
    for row in panel.rows_mut() {
        let equity = row.get("equity");
        let npw = row.get("net_premium_written");

        row.set("npw_to_equity", ratio(npw, equity));

        let net_exposure = match (npw, row.get("provisions"), row.get("ceded_reserves")) {
            (Some(npw), Some(provisions), Some(ceded)) => Some(npw + provisions - ceded),
            _ => None,
        };
        row.set("net_leverage", ratio(net_exposure, equity));
        row.set(
            "gross_reserves_to_equity",
            ratio(row.get("provisions"), equity),
        );
        row.set(
            "npw_gpw",
            ratio(npw, row.get("gross_premium_written")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranking_core::{Panel, PanelRow};

    fn income_rows(quarters: usize) -> Vec<PanelRow> {
        (0..quarters)
            .map(|i| {
                PanelRow::new("INS", 2020 + i as i32 / 4, (i % 4) as u8 + 1)
                    .with_field("incurred_losses", Some(60.0))
                    .with_field("expenses", Some(30.0))
                    .with_field("revenues", Some(100.0))
            })
            .collect()
    }

    #[test]
    fn combined_ratio_is_ttm_sum_over_ttm_sum() {
        let mut panel = Panel::from_raw(income_rows(4)).unwrap();
        combined_ratio_stage(&mut panel, 4);

        let row = &panel.rows()[3];
        assert_eq!(row.get("incurred_losses_ttm"), Some(240.0));
        assert_eq!(row.get("expenses_ttm"), Some(120.0));
        assert_eq!(row.get("revenues_ttm"), Some(400.0));
        assert!((row.get("combined_ratio_ttm").unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn combined_ratio_undefined_below_four_quarters() {
        let mut panel = Panel::from_raw(income_rows(3)).unwrap();
        combined_ratio_stage(&mut panel, 4);

        for row in panel.rows() {
            assert_eq!(row.get("combined_ratio_ttm"), None);
        }
    }

    #[test]
    fn health_ratios_follow_the_sector_formulas() {
        let rows = vec![PanelRow::new("INS", 2023, 1)
            .with_field("net_premium_written", Some(80.0))
            .with_field("gross_premium_written", Some(100.0))
            .with_field("equity", Some(200.0))
            .with_field("provisions", Some(50.0))
            .with_field("ceded_reserves", Some(10.0))];
        let mut panel = Panel::from_raw(rows).unwrap();
        health_ratio_stage(&mut panel);

        let row = &panel.rows()[0];
        assert_eq!(row.get("npw_to_equity"), Some(0.4));
        assert_eq!(row.get("net_leverage"), Some(0.6));
        assert_eq!(row.get("gross_reserves_to_equity"), Some(0.25));
        assert_eq!(row.get("npw_gpw"), Some(0.8));
    }

    #[test]
    fn zero_equity_leaves_ratios_undefined() {
        let rows = vec![PanelRow::new("INS", 2023, 1)
            .with_field("net_premium_written", Some(80.0))
            .with_field("gross_premium_written", Some(100.0))
            .with_field("equity", Some(0.0))
            .with_field("provisions", Some(50.0))
            .with_field("ceded_reserves", Some(10.0))];
        let mut panel = Panel::from_raw(rows).unwrap();
        health_ratio_stage(&mut panel);

        let row = &panel.rows()[0];
        assert_eq!(row.get("npw_to_equity"), None);
        assert_eq!(row.get("net_leverage"), None);
        assert_eq!(row.get("gross_reserves_to_equity"), None);
        assert_eq!(row.get("npw_gpw"), Some(0.8));
    }
}
