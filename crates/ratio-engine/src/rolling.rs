//! Per-company time-series primitives over a sorted panel.
//!
//! All functions walk the panel's contiguous symbol runs, so a window never
//! crosses from one company into the next. The first `window - 1` periods of
//! each company have undefined results; that is expected, not an error.

use ranking_core::Panel;
use statrs::statistics::Statistics;

/// Guarded division: undefined if either operand is undefined or the
/// denominator is zero. Undefined ratios propagate downstream instead of
/// turning into IEEE infinities.
pub fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Trailing sum of `src` over `window` quarters, written to `dst`.
pub fn rolling_sum(panel: &mut Panel, src: &str, dst: &str, window: usize) {
    apply_windowed(panel, src, dst, window, |values| values.iter().sum());
}

/// Trailing mean of `src` over `window` quarters, written to `dst`.
pub fn rolling_mean(panel: &mut Panel, src: &str, dst: &str, window: usize) {
    apply_windowed(panel, src, dst, window, |values| values.mean());
}

/// Trailing sample standard deviation of `src` over `window` quarters.
pub fn rolling_std(panel: &mut Panel, src: &str, dst: &str, window: usize) {
    apply_windowed(panel, src, dst, window, |values| values.std_dev());
}

/// `src` from exactly `periods` rows earlier in the same symbol run (for
/// quarterly panels, `periods = 4` is the same quarter one year earlier).
pub fn shift(panel: &mut Panel, src: &str, dst: &str, periods: usize) {
    let runs = panel.symbol_runs();
    let values = panel.column(src);
    let rows = panel.rows_mut();
    for run in runs {
        for i in run.clone() {
            let shifted = if i >= run.start + periods {
                values[i - periods]
            } else {
                None
            };
            rows[i].set(dst, shifted);
        }
    }
}

/// Row-wise mean of whichever of the two columns is defined, written to
/// `dst`. With only one side defined the mean is that value alone; this is
/// what makes year-ago averaging degrade gracefully in a company's first
/// year of history.
pub fn mean_available(panel: &mut Panel, a: &str, b: &str, dst: &str) {
    for row in panel.rows_mut() {
        let value = match (row.get(a), row.get(b)) {
            (Some(x), Some(y)) => Some((x + y) / 2.0),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        };
        row.set(dst, value);
    }
}

fn apply_windowed<F>(panel: &mut Panel, src: &str, dst: &str, window: usize, f: F)
where
    F: Fn(&[f64]) -> f64,
{
    let runs = panel.symbol_runs();
    let values = panel.column(src);
    let rows = panel.rows_mut();
    for run in runs {
        for i in run.clone() {
            let result = if i + 1 >= run.start + window {
                let slice = &values[i + 1 - window..=i];
                // Any undefined value inside the window poisons the window.
                if slice.iter().all(|v| v.is_some()) {
                    let defined: Vec<f64> = slice.iter().map(|v| v.unwrap()).collect();
                    Some(f(&defined))
                } else {
                    None
                }
            } else {
                None
            };
            rows[i].set(dst, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranking_core::{Panel, PanelRow};

    fn series(symbol: &str, values: &[f64]) -> Vec<PanelRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                PanelRow::new(symbol, 2020 + i as i32 / 4, (i % 4) as u8 + 1)
                    .with_field("x", Some(*v))
            })
            .collect()
    }

    #[test]
    fn rolling_sum_leaves_short_history_undefined() {
        let mut panel =
            Panel::from_raw(series("AAA", &[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        rolling_sum(&mut panel, "x", "x_ttm", 4);

        let col = panel.column("x_ttm");
        assert_eq!(col[0], None);
        assert_eq!(col[2], None);
        assert_eq!(col[3], Some(10.0));
        assert_eq!(col[4], Some(14.0));
    }

    #[test]
    fn rolling_windows_do_not_cross_symbols() {
        let mut rows = series("AAA", &[1.0, 2.0, 3.0, 4.0]);
        rows.extend(series("BBB", &[10.0, 20.0, 30.0, 40.0]));
        let mut panel = Panel::from_raw(rows).unwrap();
        rolling_sum(&mut panel, "x", "x_ttm", 4);

        let col = panel.column("x_ttm");
        assert_eq!(col[3], Some(10.0));
        assert_eq!(col[4], None);
        assert_eq!(col[7], Some(100.0));
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let mut panel = Panel::from_raw(series("AAA", &[1.0, 2.0, 3.0, 4.0])).unwrap();
        rolling_std(&mut panel, "x", "x_std", 4);

        let expected = (5.0f64 / 3.0).sqrt();
        let got = panel.column("x_std")[3].unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn shift_pulls_year_ago_value() {
        let mut panel =
            Panel::from_raw(series("AAA", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])).unwrap();
        shift(&mut panel, "x", "x_lag", 4);

        let col = panel.column("x_lag");
        assert_eq!(col[3], None);
        assert_eq!(col[4], Some(1.0));
        assert_eq!(col[5], Some(2.0));
    }

    #[test]
    fn mean_available_skips_missing_side() {
        let mut panel = Panel::from_raw(series("AAA", &[10.0, 20.0])).unwrap();
        shift(&mut panel, "x", "x_lag", 1);
        mean_available(&mut panel, "x", "x_lag", "x_avg");

        let col = panel.column("x_avg");
        assert_eq!(col[0], Some(10.0));
        assert_eq!(col[1], Some(15.0));
    }

    #[test]
    fn ratio_guards_zero_and_undefined_denominators() {
        assert_eq!(ratio(Some(4.0), Some(2.0)), Some(2.0));
        assert_eq!(ratio(Some(4.0), Some(0.0)), None);
        assert_eq!(ratio(Some(4.0), None), None);
        assert_eq!(ratio(None, Some(2.0)), None);
    }
}
