//! Composite rank engine: pillar scores from criterion scores, the final
//! score as the mean of the four pillars, and the fixed-cut-point rank
//! labels.
//!
//! Undefined criterion scores make the affected pillar undefined, and an
//! undefined pillar makes the final score undefined; the rank is then also
//! undefined and surfaced as such.

use ranking_core::{HealthTier, Rank};

/// How a sector aggregates its health criterion scores. Banks pass the
/// upstream health score through instead and never call this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthAggregation {
    /// Mean of the criterion scores, rounded to 2 decimals (insurance).
    RoundedMean,
    /// Raw sum with no normalization (securities, as observed upstream).
    Sum,
}

/// Round to 2 decimal places; applied to every persisted score so the
/// canonical text form is stable across runs.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Profit pillar: the binary criterion scores summed and rescaled from a
/// 0-3 range onto 0-4, rounded to 2 decimals.
pub fn profit_score(criteria: &[Option<f64>]) -> Option<f64> {
    let sum = sum_all(criteria)?;
    Some(round2(sum * 4.0 / 3.0))
}

/// Health pillar under the sector's aggregation rule.
pub fn health_score(criteria: &[Option<f64>], aggregation: HealthAggregation) -> Option<f64> {
    let sum = sum_all(criteria)?;
    match aggregation {
        HealthAggregation::RoundedMean => Some(round2(sum / criteria.len() as f64)),
        HealthAggregation::Sum => Some(sum),
    }
}

/// Final score: mean of the four pillar scores, rounded to 2 decimals.
pub fn final_score(
    profit: Option<f64>,
    health: Option<f64>,
    growth: Option<f64>,
    valuation: Option<f64>,
) -> Option<f64> {
    let pillars = [profit?, health?, growth?, valuation?];
    Some(round2(pillars.iter().sum::<f64>() / 4.0))
}

/// Letter rank for a profit/growth/valuation/final score.
pub fn rank_label(score: Option<f64>) -> Option<String> {
    score.map(|s| Rank::from_score(s).as_str().to_string())
}

/// Tier label for a health score.
pub fn health_tier_label(score: Option<f64>) -> Option<String> {
    score.map(|s| HealthTier::from_score(s).as_str().to_string())
}

fn sum_all(criteria: &[Option<f64>]) -> Option<f64> {
    if criteria.is_empty() {
        return None;
    }
    criteria.iter().copied().sum::<Option<f64>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_score_rescales_three_criteria() {
        // Two wins out of three: round(2 * 4/3, 2) = 2.67.
        let score = profit_score(&[Some(1.0), Some(1.0), Some(0.0)]);
        assert_eq!(score, Some(2.67));
        assert_eq!(rank_label(score).as_deref(), Some("B"));

        assert_eq!(profit_score(&[Some(1.0), None, Some(0.0)]), None);
    }

    #[test]
    fn health_aggregation_differs_by_sector() {
        let criteria = [Some(4.0), Some(3.0), Some(2.0), Some(2.0)];
        assert_eq!(
            health_score(&criteria, HealthAggregation::RoundedMean),
            Some(2.75)
        );
        assert_eq!(health_score(&criteria, HealthAggregation::Sum), Some(11.0));
    }

    #[test]
    fn final_score_is_mean_of_pillars() {
        assert_eq!(
            final_score(Some(2.67), Some(3.0), Some(2.0), Some(1.0)),
            Some(2.17)
        );
        assert_eq!(final_score(Some(2.67), None, Some(2.0), Some(1.0)), None);
    }

    #[test]
    fn rank_labels_respect_cut_points() {
        assert_eq!(rank_label(Some(0.999)).as_deref(), Some("D"));
        assert_eq!(rank_label(Some(1.0)).as_deref(), Some("C"));
        assert_eq!(rank_label(Some(2.999)).as_deref(), Some("B"));
        assert_eq!(rank_label(Some(3.0)).as_deref(), Some("A"));
        assert_eq!(rank_label(None), None);
    }

    #[test]
    fn health_tiers_from_score() {
        assert_eq!(health_tier_label(Some(3.25)).as_deref(), Some("Safe +"));
        assert_eq!(health_tier_label(Some(2.75)).as_deref(), Some("Safe"));
        assert_eq!(health_tier_label(Some(1.5)).as_deref(), Some("Warning"));
        assert_eq!(health_tier_label(Some(1.0)).as_deref(), Some("Danger"));
        assert_eq!(health_tier_label(None), None);
    }

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(8.0 / 3.0), 2.67);
        assert_eq!(round2(2.664), 2.66);
        assert_eq!(round2(-2.664), -2.66);
    }
}
