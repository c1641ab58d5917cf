//! The three per-criterion scoring strategies: binary peer comparison,
//! quantile buckets, and fixed thresholds.
//!
//! Every function returns `None` when the company's ratio or the peer
//! statistic is undefined; equality with a threshold or median always yields
//! the middle score, never rounds up or down.

/// Whether a larger ratio is better (ROE) or worse (combined ratio).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Binary peer comparison: 1 when the company beats the sector benchmark in
/// the criterion's direction, else 0.
pub fn binary_score(
    value: Option<f64>,
    benchmark: Option<f64>,
    direction: Direction,
) -> Option<f64> {
    let (value, benchmark) = (value?, benchmark?);
    let beats = match direction {
        Direction::HigherIsBetter => value > benchmark,
        Direction::LowerIsBetter => value < benchmark,
    };
    Some(if beats { 1.0 } else { 0.0 })
}

/// Quantile-bucket score for lower-is-better risk measures: 4 below the
/// 25th percentile down to 1 at or above the 75th.
pub fn quantile_bucket_score(value: Option<f64>, cuts: Option<crate::peer::QuantileCuts>) -> Option<f64> {
    let value = value?;
    let cuts = cuts?;
    let score = if value < cuts.p25 {
        4.0
    } else if value < cuts.p50 {
        3.0
    } else if value < cuts.p75 {
        2.0
    } else {
        1.0
    };
    Some(score)
}

/// Loans-to-equity against fixed multiples of its own 8-quarter trailing
/// level: 0 at 1.6x or more, 0.5 at 1.3x, 1 at 0.7x, and 0 again below that
/// (an unusually low ratio reads as an unused or shrinking book).
pub fn loans_to_equity_score(lte: Option<f64>, lte_8q: Option<f64>) -> Option<f64> {
    let (lte, lte_8q) = (lte?, lte_8q?);
    let score = if lte >= lte_8q * 1.6 {
        0.0
    } else if lte >= lte_8q * 1.3 {
        0.5
    } else if lte >= lte_8q * 0.7 {
        1.0
    } else {
        0.0
    };
    Some(score)
}

/// Lower-is-better comparison against the peer median: 0 above, 0.5 equal,
/// 1 below. Used for debt-to-equity and the FVTPL coefficient of variation.
pub fn below_median_score(value: Option<f64>, median: Option<f64>) -> Option<f64> {
    let (value, median) = (value?, median?);
    let score = if value > median {
        0.0
    } else if value == median {
        0.5
    } else {
        1.0
    };
    Some(score)
}

/// Number of revenue lines needed, largest first, for the cumulative share
/// to reach `threshold`. If the total never reaches it, every line counts.
/// `None` when no line has a defined share.
pub fn lines_to_reach(shares: &[Option<f64>], threshold: f64) -> Option<usize> {
    let mut defined: Vec<f64> = shares.iter().copied().flatten().collect();
    if defined.is_empty() {
        return None;
    }
    defined.sort_by(|a, b| b.partial_cmp(a).expect("defined shares are comparable"));

    let mut cumulative = 0.0;
    for (i, share) in defined.iter().enumerate() {
        cumulative += share;
        if cumulative >= threshold {
            return Some(i + 1);
        }
    }
    Some(defined.len())
}

/// Diversification score from the number of lines needed to reach the
/// revenue threshold: concentrated books score low.
pub fn diversification_score(needed: usize) -> f64 {
    if needed >= 3 {
        1.0
    } else if needed == 2 {
        0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::QuantileCuts;

    #[test]
    fn binary_score_respects_direction() {
        assert_eq!(
            binary_score(Some(0.2), Some(0.1), Direction::HigherIsBetter),
            Some(1.0)
        );
        assert_eq!(
            binary_score(Some(0.2), Some(0.1), Direction::LowerIsBetter),
            Some(0.0)
        );
        // Equality is not a win in either direction.
        assert_eq!(
            binary_score(Some(0.1), Some(0.1), Direction::HigherIsBetter),
            Some(0.0)
        );
        assert_eq!(binary_score(None, Some(0.1), Direction::HigherIsBetter), None);
        assert_eq!(binary_score(Some(0.1), None, Direction::HigherIsBetter), None);
    }

    #[test]
    fn quantile_buckets_are_left_exclusive() {
        let cuts = Some(QuantileCuts {
            p25: 1.0,
            p50: 2.0,
            p75: 3.0,
        });
        assert_eq!(quantile_bucket_score(Some(0.5), cuts), Some(4.0));
        // Exactly at the median lands in the 3 bucket's upper bound, not in it.
        assert_eq!(quantile_bucket_score(Some(2.0), cuts), Some(2.0));
        assert_eq!(quantile_bucket_score(Some(1.999), cuts), Some(3.0));
        assert_eq!(quantile_bucket_score(Some(3.0), cuts), Some(1.0));
        assert_eq!(quantile_bucket_score(None, cuts), None);
    }

    #[test]
    fn lte_thresholds_bracket_the_trailing_level() {
        assert_eq!(loans_to_equity_score(Some(1.6), Some(1.0)), Some(0.0));
        assert_eq!(loans_to_equity_score(Some(1.3), Some(1.0)), Some(0.5));
        assert_eq!(loans_to_equity_score(Some(1.0), Some(1.0)), Some(1.0));
        assert_eq!(loans_to_equity_score(Some(0.7), Some(1.0)), Some(1.0));
        assert_eq!(loans_to_equity_score(Some(0.5), Some(1.0)), Some(0.0));
        assert_eq!(loans_to_equity_score(None, Some(1.0)), None);
    }

    #[test]
    fn median_equality_scores_half() {
        assert_eq!(below_median_score(Some(2.0), Some(1.0)), Some(0.0));
        assert_eq!(below_median_score(Some(1.0), Some(1.0)), Some(0.5));
        assert_eq!(below_median_score(Some(0.5), Some(1.0)), Some(1.0));
        assert_eq!(below_median_score(Some(1.0), None), None);
    }

    #[test]
    fn top_share_counts_lines_needed() {
        let shares = vec![Some(0.5), Some(0.3), Some(0.1), Some(0.1)];
        let needed = lines_to_reach(&shares, 0.8).unwrap();
        assert_eq!(needed, 2);
        assert_eq!(diversification_score(needed), 0.5);

        let concentrated = vec![Some(0.9), Some(0.1)];
        assert_eq!(lines_to_reach(&concentrated, 0.8), Some(1));
        assert_eq!(diversification_score(1), 0.0);

        let diversified = vec![Some(0.3), Some(0.3), Some(0.3), Some(0.1)];
        assert_eq!(lines_to_reach(&diversified, 0.8), Some(3));
        assert_eq!(diversification_score(3), 1.0);
    }

    #[test]
    fn top_share_when_threshold_unreachable() {
        // Shares that never sum to the threshold: every line is needed.
        let shares = vec![Some(0.2), Some(0.1)];
        assert_eq!(lines_to_reach(&shares, 0.8), Some(2));
        assert_eq!(lines_to_reach(&[None, None], 0.8), None);
    }
}
