use std::collections::BTreeMap;

use crate::constants::{DATA_END_YEAR, DATA_START_YEAR};

/// Yearly enrollment counts keyed by year. A missing year means no data was
/// reported, which is distinct from a count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearlyCounts(BTreeMap<i32, i64>);

impl YearlyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Years outside the fixed data range are ignored.
    pub fn set(&mut self, year: i32, count: Option<i64>) {
        if !(DATA_START_YEAR..=DATA_END_YEAR).contains(&year) {
            return;
        }
        match count {
            Some(count) => {
                self.0.insert(year, count);
            }
            None => {
                self.0.remove(&year);
            }
        }
    }

    pub fn get(&self, year: i32) -> Option<i64> {
        self.0.get(&year).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i64)> + '_ {
        self.0.iter().map(|(year, count)| (*year, *count))
    }

    /// Splits the series into runs of consecutive reported years.
    pub fn segments(&self) -> Vec<Vec<(i32, i64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(i32, i64)> = Vec::new();
        for (year, count) in self.iter() {
            if current.last().is_some_and(|&(prev, _)| prev + 1 != year) {
                segments.push(std::mem::take(&mut current));
            }
            current.push((year, count));
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    pub fn max_count(&self) -> Option<i64> {
        self.0.values().copied().max()
    }
}

impl FromIterator<(i32, i64)> for YearlyCounts {
    fn from_iter<I: IntoIterator<Item = (i32, i64)>>(iter: I) -> Self {
        let mut counts = YearlyCounts::new();
        for (year, count) in iter {
            counts.set(year, Some(count));
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentRecord {
    pub id: String,
    pub name: String,
    pub sector: Option<String>,
    pub school_type: Option<String>,
    pub code: Option<String>,
    pub la_code: Option<String>,
    pub la_name: Option<String>,
    pub yearly_counts: YearlyCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLogEntry {
    pub source_path: String,
    pub row_count: i64,
    pub imported_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total_records: i64,
    pub last_import: Option<ImportLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_break_on_missing_years() {
        let mut counts = YearlyCounts::new();
        counts.set(1996, Some(100));
        counts.set(1997, Some(110));
        counts.set(1999, Some(90));
        counts.set(2000, Some(95));
        counts.set(2018, Some(40));

        let segments = counts.segments();

        assert_eq!(
            segments,
            vec![
                vec![(1996, 100), (1997, 110)],
                vec![(1999, 90), (2000, 95)],
                vec![(2018, 40)],
            ]
        );
    }

    #[test]
    fn zero_is_data_and_none_is_a_gap() {
        let mut counts = YearlyCounts::new();
        counts.set(2001, Some(0));
        counts.set(2002, None);
        counts.set(2003, Some(5));

        assert_eq!(counts.get(2001), Some(0));
        assert_eq!(counts.get(2002), None);
        assert_eq!(counts.segments().len(), 2);
    }

    #[test]
    fn years_outside_range_are_ignored() {
        let counts: YearlyCounts = [(1995, 1), (2019, 2), (2005, 3)].into_iter().collect();

        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(2005, 3)]);
        assert_eq!(counts.max_count(), Some(3));
    }
}
