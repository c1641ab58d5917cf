//! Cross-sectional peer statistics: aggregates over all companies in a
//! sector for a fixed (year, quarter).
//!
//! Undefined values are skipped; a period where no company has a defined
//! value has no aggregate at all, which downstream scoring surfaces as an
//! undefined score rather than a zero.

use std::collections::BTreeMap;

use ranking_core::Panel;

/// Period key: (year, quarter).
pub type Period = (i32, u8);

/// The 25th/50th/75th percentile cut-points of one criterion across a peer
/// set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileCuts {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Sum of the defined values; `None` when nothing is defined.
pub fn sum_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let defined: Vec<f64> = values.into_iter().flatten().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum())
    }
}

/// Quantile with linear interpolation over the defined values.
pub fn quantile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut defined: Vec<f64> = values.iter().copied().flatten().collect();
    if defined.is_empty() {
        return None;
    }
    defined.sort_by(|a, b| a.partial_cmp(b).expect("defined values are comparable"));

    let position = q * (defined.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < defined.len() {
        Some(defined[lower] + fraction * (defined[lower + 1] - defined[lower]))
    } else {
        Some(defined[lower])
    }
}

/// Median over the defined values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Per-period medians of one field.
pub fn group_median(panel: &Panel, field: &str) -> BTreeMap<Period, Option<f64>> {
    group_with(panel, |rows| median(rows), field)
}

/// Per-period quartile cut-points of one field.
pub fn group_quantile_cuts(panel: &Panel, field: &str) -> BTreeMap<Period, Option<QuantileCuts>> {
    let mut out = BTreeMap::new();
    for (period, indices) in panel.peer_groups() {
        let values: Vec<Option<f64>> = indices
            .iter()
            .map(|&i| panel.rows()[i].get(field))
            .collect();
        let cuts = match (
            quantile(&values, 0.25),
            quantile(&values, 0.50),
            quantile(&values, 0.75),
        ) {
            (Some(p25), Some(p50), Some(p75)) => Some(QuantileCuts { p25, p50, p75 }),
            _ => None,
        };
        out.insert(period, cuts);
    }
    out
}

/// Per-period ratio of sums: the sector-wide aggregate used for binary peer
/// comparison (sum of numerators over sum of denominators, not a mean of
/// ratios).
pub fn group_ratio_of_sums(
    panel: &Panel,
    numerator: &str,
    denominator: &str,
) -> BTreeMap<Period, Option<f64>> {
    let mut out = BTreeMap::new();
    for (period, indices) in panel.peer_groups() {
        let num = sum_defined(indices.iter().map(|&i| panel.rows()[i].get(numerator)));
        let den = sum_defined(indices.iter().map(|&i| panel.rows()[i].get(denominator)));
        let value = match (num, den) {
            (Some(n), Some(d)) if d != 0.0 => Some(n / d),
            _ => None,
        };
        out.insert(period, value);
    }
    out
}

fn group_with<F>(panel: &Panel, f: F, field: &str) -> BTreeMap<Period, Option<f64>>
where
    F: Fn(&[Option<f64>]) -> Option<f64>,
{
    let mut out = BTreeMap::new();
    for (period, indices) in panel.peer_groups() {
        let values: Vec<Option<f64>> = indices
            .iter()
            .map(|&i| panel.rows()[i].get(field))
            .collect();
        out.insert(period, f(&values));
    }
    out
}
