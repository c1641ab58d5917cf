//! Incremental merge/diff: decides which freshly computed rows are genuinely
//! new by whole-row comparison against the previously persisted set.
//!
//! Comparison is exact on the canonical text form, so re-running the
//! pipeline on unchanged inputs inserts nothing. Persisted rows that no
//! longer appear in the fresh set are reported but never deleted.

use std::collections::HashMap;

/// Canonical text form of a numeric field: fixed 6-decimal rounding, then
/// the shortest decimal rendering; undefined values become the empty string.
/// Every persisted numeric column goes through this on the way in, and rows
/// read back for comparison are already in this form.
pub fn canonical_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = (v * 1e6).round() / 1e6;
            if rounded == 0.0 {
                // Collapses negative zero.
                "0".to_string()
            } else {
                format!("{rounded}")
            }
        }
        _ => String::new(),
    }
}

/// Result of diffing a fresh row set against the persisted snapshot.
#[derive(Debug, Clone, Default)]
pub struct DiffOutcome {
    /// Fresh rows with no identical persisted counterpart, in input order.
    pub to_insert: Vec<Vec<String>>,
    /// Persisted rows absent from the fresh set (reported, never deleted).
    pub stale: usize,
}

/// Symmetric difference by full-row equality. Rows duplicated inside the
/// fresh set are dropped entirely, mirroring the drop-duplicates semantics
/// of the run this replaces.
pub fn incremental_rows(fresh: &[Vec<String>], persisted: &[Vec<String>]) -> DiffOutcome {
    let mut persisted_counts: HashMap<&[String], usize> = HashMap::new();
    for row in persisted {
        *persisted_counts.entry(row.as_slice()).or_insert(0) += 1;
    }

    let mut fresh_counts: HashMap<&[String], usize> = HashMap::new();
    for row in fresh {
        *fresh_counts.entry(row.as_slice()).or_insert(0) += 1;
    }

    let to_insert = fresh
        .iter()
        .filter(|row| {
            !persisted_counts.contains_key(row.as_slice())
                && fresh_counts[row.as_slice()] == 1
        })
        .cloned()
        .collect();

    let stale = persisted
        .iter()
        .filter(|row| !fresh_counts.contains_key(row.as_slice()))
        .count();

    DiffOutcome { to_insert, stale }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_sets_insert_nothing() {
        let rows = vec![row(&["AAA", "2023", "1", "2.67"])];
        let outcome = incremental_rows(&rows, &rows);
        assert!(outcome.to_insert.is_empty());
        assert_eq!(outcome.stale, 0);
    }

    #[test]
    fn fresh_only_rows_are_inserted_in_order() {
        let persisted = vec![row(&["AAA", "2023", "1", "2.67"])];
        let fresh = vec![
            row(&["AAA", "2023", "1", "2.67"]),
            row(&["AAA", "2023", "2", "3.0"]),
            row(&["BBB", "2023", "2", "1.33"]),
        ];
        let outcome = incremental_rows(&fresh, &persisted);
        assert_eq!(outcome.to_insert.len(), 2);
        assert_eq!(outcome.to_insert[0][0], "AAA");
        assert_eq!(outcome.to_insert[1][0], "BBB");
        assert_eq!(outcome.stale, 0);
    }

    #[test]
    fn persisted_only_rows_are_reported_not_deleted() {
        let persisted = vec![
            row(&["AAA", "2023", "1", "2.67"]),
            row(&["ZZZ", "2020", "4", "1.0"]),
        ];
        let fresh = vec![row(&["AAA", "2023", "1", "2.67"])];
        let outcome = incremental_rows(&fresh, &persisted);
        assert!(outcome.to_insert.is_empty());
        assert_eq!(outcome.stale, 1);
    }

    #[test]
    fn duplicated_fresh_rows_are_dropped() {
        let fresh = vec![
            row(&["AAA", "2023", "1", "2.67"]),
            row(&["AAA", "2023", "1", "2.67"]),
        ];
        let outcome = incremental_rows(&fresh, &[]);
        assert!(outcome.to_insert.is_empty());
    }

    #[test]
    fn canonical_number_is_stable_and_compact() {
        assert_eq!(canonical_number(None), "");
        assert_eq!(canonical_number(Some(f64::NAN)), "");
        assert_eq!(canonical_number(Some(2.67)), "2.67");
        assert_eq!(canonical_number(Some(3.0)), "3");
        assert_eq!(canonical_number(Some(-0.0)), "0");
        assert_eq!(canonical_number(Some(0.123456789)), "0.123457");
        // Round-tripping the canonical form reproduces it exactly.
        let text = canonical_number(Some(1.0 / 3.0));
        let reparsed: f64 = text.parse().unwrap();
        assert_eq!(canonical_number(Some(reparsed)), text);
    }
}
