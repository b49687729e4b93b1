use std::collections::HashSet;

use crate::constants::MAX_SCHOOLS_PER_GRAPH;
use crate::domain::entities::enrollment::EnrollmentRecord;

pub const EMPTY_CHART_TITLE: &str = "School Enrollment Trends";
pub const EMPTY_CHART_MESSAGE: &str = "Select schools to view enrollment trends";
pub const EMPTY_CHART_Y_MAX: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectBy {
    Id,
    Name,
}

/// Which schools to plot. Keys are deduplicated in request order and capped
/// at [`MAX_SCHOOLS_PER_GRAPH`]; `dropped` counts the keys cut by the cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSelection {
    pub by: SelectBy,
    pub keys: Vec<String>,
    pub dropped: usize,
}

impl ChartSelection {
    /// Reads repeated `ids`, falling back to repeated `schools` (names) only
    /// when no ids were given.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let values = |key: &str| {
            pairs
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
        };

        let ids = values("ids");
        if !ids.is_empty() {
            return Self::capped(SelectBy::Id, ids);
        }
        Self::capped(SelectBy::Name, values("schools"))
    }

    fn capped(by: SelectBy, values: Vec<&str>) -> Self {
        let (keys, dropped) = dedupe_capped(values, MAX_SCHOOLS_PER_GRAPH);
        Self { by, keys, dropped }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub fn dedupe_capped<'a, I>(values: I, cap: usize) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let mut dropped = 0;
    for value in values {
        if !seen.insert(value) {
            continue;
        }
        if keys.len() < cap {
            keys.push(value.to_string());
        } else {
            dropped += 1;
        }
    }
    (keys, dropped)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub school_id: String,
    pub label: String,
    pub color_index: usize,
    pub segments: Vec<Vec<(i32, i64)>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartPlan {
    /// Nothing was selected; render the placeholder.
    Empty,
    Trends { series: Vec<ChartSeries>, y_max: i64 },
}

impl ChartPlan {
    /// Builds one series per record with at least one reported year. Colors
    /// are assigned by plotted position and wrap around the palette.
    pub fn from_records(records: &[EnrollmentRecord], palette_len: usize) -> Self {
        let palette_len = palette_len.max(1);
        let plotted: Vec<&EnrollmentRecord> = records
            .iter()
            .filter(|record| !record.yearly_counts.is_empty())
            .take(MAX_SCHOOLS_PER_GRAPH)
            .collect();
        let series: Vec<ChartSeries> = plotted
            .iter()
            .enumerate()
            .map(|(idx, record)| ChartSeries {
                school_id: record.id.clone(),
                label: record.name.clone(),
                color_index: idx % palette_len,
                segments: record.yearly_counts.segments(),
            })
            .collect();

        let max_count = plotted
            .iter()
            .filter_map(|record| record.yearly_counts.max_count())
            .max();
        let y_max = match max_count {
            Some(max) if max > 0 => max.saturating_add((max / 10).max(1)),
            _ => EMPTY_CHART_Y_MAX,
        };

        ChartPlan::Trends { series, y_max }
    }

    pub fn series(&self) -> &[ChartSeries] {
        match self {
            ChartPlan::Empty => &[],
            ChartPlan::Trends { series, .. } => series,
        }
    }

    pub fn title(&self) -> String {
        match self {
            ChartPlan::Empty => EMPTY_CHART_TITLE.to_string(),
            ChartPlan::Trends { series, .. } => {
                let count = series.len();
                let plural = if count == 1 { "" } else { "s" };
                format!("Enrollment Trends for {count} Selected School{plural}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::enrollment::YearlyCounts;

    fn record(id: usize, counts: &[(i32, i64)]) -> EnrollmentRecord {
        EnrollmentRecord {
            id: id.to_string(),
            name: format!("School {id}"),
            yearly_counts: counts.iter().copied().collect::<YearlyCounts>(),
            ..Default::default()
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn selection_dedupes_in_request_order() {
        let selection = ChartSelection::from_pairs(&pairs(&[
            ("ids", "3"),
            ("ids", "1"),
            ("ids", "3"),
            ("ids", "2"),
        ]));

        assert_eq!(selection.by, SelectBy::Id);
        assert_eq!(selection.keys, vec!["3", "1", "2"]);
        assert_eq!(selection.dropped, 0);
    }

    #[test]
    fn selection_caps_sixty_ids_at_fifty() {
        let raw: Vec<(String, String)> = (0..60)
            .map(|i| ("ids".to_string(), i.to_string()))
            .collect();

        let selection = ChartSelection::from_pairs(&raw);

        assert_eq!(selection.keys.len(), MAX_SCHOOLS_PER_GRAPH);
        assert_eq!(selection.dropped, 10);
        assert_eq!(selection.keys.first().map(String::as_str), Some("0"));
        assert_eq!(selection.keys.last().map(String::as_str), Some("49"));
    }

    #[test]
    fn names_are_used_only_without_ids() {
        let by_name = ChartSelection::from_pairs(&pairs(&[("schools", "Hillside")]));
        assert_eq!(by_name.by, SelectBy::Name);
        assert_eq!(by_name.keys, vec!["Hillside"]);

        let by_id = ChartSelection::from_pairs(&pairs(&[("schools", "Hillside"), ("ids", "9")]));
        assert_eq!(by_id.by, SelectBy::Id);
        assert_eq!(by_id.keys, vec!["9"]);
    }

    #[test]
    fn empty_request_selects_nothing() {
        assert!(ChartSelection::from_pairs(&[]).is_empty());
        assert!(ChartSelection::from_pairs(&pairs(&[("ids", "")])).is_empty());
    }

    #[test]
    fn colors_cycle_through_palette() {
        let records: Vec<_> = (0..8).map(|i| record(i, &[(2000, 10)])).collect();

        let plan = ChartPlan::from_records(&records, 6);
        let colors: Vec<_> = plan.series().iter().map(|s| s.color_index).collect();

        assert_eq!(colors, vec![0, 1, 2, 3, 4, 5, 0, 1]);
    }

    #[test]
    fn records_without_data_are_not_plotted() {
        let records = vec![record(1, &[]), record(2, &[(1996, 50), (1998, 70)])];

        let plan = ChartPlan::from_records(&records, 6);

        assert_eq!(plan.series().len(), 1);
        assert_eq!(plan.series()[0].school_id, "2");
        assert_eq!(plan.series()[0].color_index, 0);
        assert_eq!(plan.series()[0].segments, vec![vec![(1996, 50)], vec![(1998, 70)]]);
        assert_eq!(plan.title(), "Enrollment Trends for 1 Selected School");
    }

    #[test]
    fn plan_never_exceeds_fifty_series() {
        let records: Vec<_> = (0..60).map(|i| record(i, &[(2010, 5)])).collect();

        let plan = ChartPlan::from_records(&records, 6);

        assert_eq!(plan.series().len(), MAX_SCHOOLS_PER_GRAPH);
        assert_eq!(plan.title(), "Enrollment Trends for 50 Selected Schools");
    }

    #[test]
    fn y_axis_leaves_headroom_above_the_peak() {
        let plan = ChartPlan::from_records(&[record(1, &[(2000, 500)])], 6);

        assert!(matches!(plan, ChartPlan::Trends { y_max: 550, .. }));
    }

    #[test]
    fn y_axis_headroom_saturates_at_the_largest_count() {
        let plan = ChartPlan::from_records(&[record(1, &[(2000, i64::MAX)])], 6);

        assert!(matches!(plan, ChartPlan::Trends { y_max: i64::MAX, .. }));
    }

    #[test]
    fn empty_plan_uses_placeholder_title() {
        assert_eq!(ChartPlan::Empty.title(), EMPTY_CHART_TITLE);
        assert!(ChartPlan::Empty.series().is_empty());
    }
}
