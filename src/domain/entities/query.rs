use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::domain::columns::{Column, ProjectedRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Normalized parameters of a data page request. Construction never fails:
/// out-of-range or malformed values are clamped or replaced by defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQuery {
    pub page: i64,
    pub page_size: i64,
    pub sort: Column,
    pub order: SortOrder,
    pub sector: Option<String>,
    pub schools: Vec<String>,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Column::Name,
            order: SortOrder::Asc,
            sector: None,
            schools: Vec::new(),
        }
    }
}

impl DataQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = DataQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page = parse_page(value),
                "page_size" => query.page_size = parse_page_size(value),
                "sort" => query.sort = Column::resolve(value).unwrap_or(Column::Name),
                "order" => query.order = SortOrder::parse(value),
                "sector" => {
                    let sector = value.trim();
                    query.sector = (!sector.is_empty()).then(|| sector.to_string());
                }
                "schools" => {
                    let id = value.trim();
                    if !id.is_empty() && !query.schools.iter().any(|s| s == id) {
                        query.schools.push(id.to_string());
                    }
                }
                _ => {}
            }
        }
        query
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("sort".to_string(), self.sort.display_name().into_owned()),
            ("order".to_string(), self.order.as_str().to_string()),
        ];
        if let Some(sector) = &self.sector {
            pairs.push(("sector".to_string(), sector.clone()));
        }
        for id in &self.schools {
            pairs.push(("schools".to_string(), id.clone()));
        }
        pairs
    }

    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.page_size)
    }
}

fn parse_page(value: &str) -> i64 {
    match value.trim().parse::<i64>() {
        Ok(page) if page >= 1 => page,
        Ok(_) => 1,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(err) => {
            tracing::warn!(value, %err, "invalid page parameter");
            1
        }
    }
}

fn parse_page_size(value: &str) -> i64 {
    match value.trim().parse::<i64>() {
        Ok(size) => size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => MAX_PAGE_SIZE,
        Err(err) if *err.kind() == IntErrorKind::NegOverflow => MIN_PAGE_SIZE,
        Err(err) => {
            tracing::warn!(value, %err, "invalid page_size parameter");
            DEFAULT_PAGE_SIZE
        }
    }
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctLists {
    pub names: Vec<NameOption>,
    pub sectors: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub columns: Vec<String>,
    pub data: Vec<ProjectedRow>,
    pub distinct: DistinctLists,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_params_are_missing() {
        let query = DataQuery::from_pairs(&[]);

        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort, Column::Name);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.sector, None);
        assert!(query.schools.is_empty());
    }

    #[test]
    fn page_size_is_clamped_not_rejected() {
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page_size", "5000")])).page_size, MAX_PAGE_SIZE);
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page_size", "0")])).page_size, MIN_PAGE_SIZE);
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page_size", "-3")])).page_size, MIN_PAGE_SIZE);
        assert_eq!(
            DataQuery::from_pairs(&pairs(&[("page_size", "99999999999999999999")])).page_size,
            MAX_PAGE_SIZE
        );
        assert_eq!(
            DataQuery::from_pairs(&pairs(&[("page_size", "-99999999999999999999")])).page_size,
            MIN_PAGE_SIZE
        );
        assert_eq!(
            DataQuery::from_pairs(&pairs(&[("page_size", "lots")])).page_size,
            DEFAULT_PAGE_SIZE
        );
    }

    #[test]
    fn malformed_page_falls_back_to_first() {
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page", "abc")])).page, 1);
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page", "0")])).page, 1);
        assert_eq!(DataQuery::from_pairs(&pairs(&[("page", "7")])).page, 7);
        assert_eq!(
            DataQuery::from_pairs(&pairs(&[("page", "99999999999999999999")])).page,
            i64::MAX
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_name() {
        let query = DataQuery::from_pairs(&pairs(&[("sort", "LA_Code"), ("order", "sideways")]));

        assert_eq!(query.sort, Column::Name);
        assert_eq!(query.order, SortOrder::Asc);
    }

    #[test]
    fn filters_collect_repeated_schools() {
        let query = DataQuery::from_pairs(&pairs(&[
            ("sector", "Primary"),
            ("schools", "10"),
            ("schools", "11"),
            ("schools", "10"),
            ("schools", " "),
            ("sort", "F2001"),
            ("order", "DESC"),
        ]));

        assert_eq!(query.sector.as_deref(), Some("Primary"));
        assert_eq!(query.schools, vec!["10".to_string(), "11".to_string()]);
        assert_eq!(query.sort, Column::Year(2001));
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn to_pairs_round_trips_through_from_pairs() {
        let query = DataQuery {
            page: 3,
            page_size: 50,
            sort: Column::SchoolType,
            order: SortOrder::Desc,
            sector: Some("Secondary".to_string()),
            schools: vec!["4".to_string()],
        };

        assert_eq!(DataQuery::from_pairs(&query.to_pairs()), query);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 200), 0);
        assert_eq!(total_pages(1, 200), 1);
        assert_eq!(total_pages(200, 200), 1);
        assert_eq!(total_pages(201, 200), 2);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        let query = DataQuery {
            page: i64::MAX,
            page_size: MAX_PAGE_SIZE,
            ..DataQuery::default()
        };

        assert_eq!(query.offset(), i64::MAX);
    }
}
