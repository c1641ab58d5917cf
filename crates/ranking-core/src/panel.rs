//! Quarterly panel data: company-quarter rows with named numeric fields.
//!
//! A `Panel` owns the rows for one sector and one statement type, sorted
//! ascending by (symbol, year, quarter). Every time-series operation in the
//! ratio calculators relies on that ordering, so it is established once at
//! construction and preserved by all transforms.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::LineItemRow;
use crate::RankingError;

/// One company-quarter observation: identifying key plus a map of field name
/// to numeric value. `None` marks an undefined value (e.g. a trailing-window
/// aggregate with too little history), which propagates through every
/// downstream ratio and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRow {
    pub symbol: String,
    pub year: i32,
    pub quarter: u8,
    fields: BTreeMap<String, Option<f64>>,
}

impl PanelRow {
    pub fn new(symbol: impl Into<String>, year: i32, quarter: u8) -> Self {
        Self {
            symbol: symbol.into(),
            year,
            quarter,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: Option<f64>) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied().flatten()
    }

    pub fn set(&mut self, name: &str, value: Option<f64>) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn key(&self) -> (&str, i32, u8) {
        (&self.symbol, self.year, self.quarter)
    }

    fn owned_key(&self) -> (String, i32, u8) {
        (self.symbol.clone(), self.year, self.quarter)
    }
}

/// Ordered collection of `PanelRow`s, grouped by symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    /// Builds a panel from raw extracted statement rows: drops annual-only
    /// rows (`quarter == 0`), imputes missing raw values to zero, sorts by
    /// (symbol, year, quarter), and rejects duplicate keys.
    pub fn from_raw(rows: Vec<PanelRow>) -> Result<Self, RankingError> {
        let mut rows: Vec<PanelRow> = rows
            .into_iter()
            .filter(|r| r.quarter != 0)
            .collect();

        for row in &mut rows {
            if row.quarter > 4 {
                return Err(RankingError::InvalidData(format!(
                    "{} {}Q{}: quarter out of range",
                    row.symbol, row.year, row.quarter
                )));
            }
            for value in row.fields.values_mut() {
                if value.is_none() {
                    *value = Some(0.0);
                }
            }
        }

        rows.sort_by(|a, b| a.owned_key().cmp(&b.owned_key()));
        for pair in rows.windows(2) {
            if pair[0].key() == pair[1].key() {
                return Err(RankingError::InvalidData(format!(
                    "duplicate row for {} {}Q{}",
                    pair[0].symbol, pair[0].year, pair[0].quarter
                )));
            }
        }

        Ok(Self { rows })
    }

    /// Wraps rows that are already keyed, sorted, and deduplicated (used by
    /// transforms that preserve those invariants).
    pub(crate) fn from_sorted(rows: Vec<PanelRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [PanelRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct symbols, in panel order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            if out.last().map(|s| s.as_str()) != Some(row.symbol.as_str()) {
                out.push(row.symbol.clone());
            }
        }
        out
    }

    /// Contiguous index ranges per symbol, each one an ascending time series.
    pub fn symbol_runs(&self) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let mut start = 0;
        for i in 1..=self.rows.len() {
            if i == self.rows.len() || self.rows[i].symbol != self.rows[start].symbol {
                runs.push(start..i);
                start = i;
            }
        }
        runs
    }

    /// Row indices grouped by (year, quarter): the cross-sectional peer sets.
    pub fn peer_groups(&self) -> BTreeMap<(i32, u8), Vec<usize>> {
        let mut groups: BTreeMap<(i32, u8), Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry((row.year, row.quarter)).or_default().push(i);
        }
        groups
    }

    /// One column as a vector aligned with `rows()`.
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    /// Inner join on (symbol, year, quarter), keeping the named fields from
    /// each side. Rows without a partner are silently excluded.
    pub fn inner_join(&self, other: &Panel, left: &[&str], right: &[&str]) -> Panel {
        let index: HashMap<(&str, i32, u8), &PanelRow> =
            other.rows.iter().map(|r| (r.key(), r)).collect();

        let mut rows = Vec::new();
        for row in &self.rows {
            let Some(partner) = index.get(&row.key()) else {
                continue;
            };
            let mut joined = PanelRow::new(row.symbol.clone(), row.year, row.quarter);
            for name in left {
                joined.set(name, row.get(name));
            }
            for name in right {
                joined.set(name, partner.get(name));
            }
            rows.push(joined);
        }
        Panel::from_sorted(rows)
    }

    /// Inner join of supplementary line items under a new field name. Rows
    /// with no matching item are dropped, mirroring the statement joins.
    pub fn merge_line_items(&self, items: &[LineItemRow], field: &str) -> Panel {
        let mut index: HashMap<(&str, i32, u8), Option<f64>> = HashMap::new();
        for item in items {
            index
                .entry((item.symbol.as_str(), item.year, item.quarter))
                .or_insert(item.value);
        }

        let mut rows = Vec::new();
        for row in &self.rows {
            let Some(value) = index.get(&row.key()) else {
                continue;
            };
            let mut merged = row.clone();
            merged.set(field, *value);
            rows.push(merged);
        }
        Panel::from_sorted(rows)
    }

    /// New panel keeping only the named fields.
    pub fn select(&self, fields: &[&str]) -> Panel {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = PanelRow::new(row.symbol.clone(), row.year, row.quarter);
                for name in fields {
                    out.set(name, row.get(name));
                }
                out
            })
            .collect();
        Panel::from_sorted(rows)
    }
}
