use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::columns::{cell_text, ID_KEY, SCHOOL_TYPE_KEY, SECTOR_KEY};

/// Locally selected filter values. An empty set places no restriction on its
/// dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFilterState {
    pub ids: BTreeSet<String>,
    pub sectors: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl ClientFilterState {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.sectors.is_empty() && self.types.is_empty()
    }

    pub fn has_category_filter(&self) -> bool {
        !self.sectors.is_empty() || !self.types.is_empty()
    }

    pub fn values_mut(&mut self, dimension: FilterDimension) -> &mut BTreeSet<String> {
        match dimension {
            FilterDimension::Id => &mut self.ids,
            FilterDimension::Sector => &mut self.sectors,
            FilterDimension::SchoolType => &mut self.types,
        }
    }

    pub fn matches(&self, row: &PageRow) -> bool {
        let allowed = |set: &BTreeSet<String>, value: String| set.is_empty() || set.contains(&value);
        allowed(&self.ids, row.id())
            && allowed(&self.sectors, row.sector())
            && allowed(&self.types, row.school_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Id,
    Sector,
    SchoolType,
}

/// One row of a data page exactly as the server sent it, keyed by display
/// column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRow(pub Map<String, Value>);

impl PageRow {
    pub fn cell_text(&self, column: &str) -> String {
        self.0.get(column).map(cell_text).unwrap_or_default()
    }

    pub fn id(&self) -> String {
        self.cell_text(ID_KEY)
    }

    pub fn sector(&self) -> String {
        self.cell_text(SECTOR_KEY)
    }

    pub fn school_type(&self) -> String {
        self.cell_text(SCHOOL_TYPE_KEY)
    }
}

pub fn apply_filters(rows: &[PageRow], state: &ClientFilterState) -> Vec<PageRow> {
    if state.is_empty() {
        return rows.to_vec();
    }
    rows.iter().filter(|row| state.matches(row)).cloned().collect()
}

/// How one column is ordered. Chosen once per column so that every pair of
/// cells is compared the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Every non-empty cell parses as a number. Empty cells sort first.
    Numeric,
    /// Case-insensitive text.
    Text,
}

impl SortMode {
    pub fn for_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let numeric = cells
            .into_iter()
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .all(|cell| cell.parse::<f64>().is_ok());
        if numeric {
            SortMode::Numeric
        } else {
            SortMode::Text
        }
    }

    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let (a, b) = (a.trim(), b.trim());
        match self {
            SortMode::Numeric => match (a.parse::<f64>().ok(), b.parse::<f64>().ok()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
            SortMode::Text => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

pub fn sort_rows(rows: &mut [PageRow], column: &str, descending: bool) {
    let mut keyed: Vec<(String, PageRow)> = rows
        .iter()
        .map(|row| (row.cell_text(column), row.clone()))
        .collect();
    let mode = SortMode::for_cells(keyed.iter().map(|(cell, _)| cell.as_str()));
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = mode.compare(a, b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
}
