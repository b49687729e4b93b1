use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};

use crate::constants::years;
use crate::domain::columns::Column;
use crate::domain::entities::enrollment::{EnrollmentRecord, YearlyCounts};

/// Maps a header row of the historic school rolls export onto record fields.
/// Header names are matched exactly as the export writes them.
pub struct RowMapper {
    positions: HashMap<String, usize>,
}

impl RowMapper {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_ref().trim().to_string(), idx))
            .collect();

        for required in ["ObjectId", "Name"] {
            if !positions.contains_key(required) {
                anyhow::bail!("missing required column: {required}");
            }
        }

        Ok(Self { positions })
    }

    fn cell<'a>(&self, cells: &'a [String], header: &str) -> Option<&'a str> {
        self.positions
            .get(header)
            .and_then(|idx| cells.get(*idx))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// `line` is the 1-based data row number used in error messages.
    pub fn record(&self, cells: &[String], line: usize) -> Result<EnrollmentRecord> {
        let id = self
            .cell(cells, "ObjectId")
            .ok_or_else(|| anyhow!("row {line}: missing ObjectId"))?;

        let mut yearly_counts = YearlyCounts::new();
        for year in years() {
            let header = Column::Year(year).storage_name();
            let count = self
                .cell(cells, &header)
                .map(parse_count)
                .transpose()
                .with_context(|| format!("row {line}: invalid {header}"))?;
            yearly_counts.set(year, count);
        }

        let text = |header: &str| self.cell(cells, header).map(str::to_string);
        Ok(EnrollmentRecord {
            id: normalize_id(id),
            name: text("Name").unwrap_or_default(),
            sector: text("Sector"),
            school_type: text("School_Type"),
            code: text("Code"),
            la_code: text("LA_Code"),
            la_name: text("LA_Name"),
            yearly_counts,
        })
    }
}

/// Spreadsheet cells sometimes carry integral ids as `12.0`.
fn normalize_id(raw: &str) -> String {
    match raw.strip_suffix(".0") {
        Some(integral) if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) => {
            integral.to_string()
        }
        _ => raw.to_string(),
    }
}

fn parse_count(raw: &str) -> Result<i64> {
    if let Ok(count) = raw.parse::<i64>() {
        return Ok(count);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("not a number: {raw:?}"))?;
    if value.fract() != 0.0 || !value.is_finite() {
        anyhow::bail!("not a whole number: {raw:?}");
    }
    // 2^63 is exact as f64; anything at or beyond it does not fit.
    if value >= 9_223_372_036_854_775_808.0 || value < -9_223_372_036_854_775_808.0 {
        anyhow::bail!("count out of range: {raw:?}");
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_cells_by_header_and_treats_blank_years_as_missing() {
        let mapper =
            RowMapper::from_headers(&["LA_Name", "Name", "Sector", "F1996", "F1997", "ObjectId"])
                .expect("headers should map");

        let record = mapper
            .record(&strings(&["Leeds", "Oak Primary", "Primary", "101", "", "7"]), 1)
            .expect("row should parse");

        assert_eq!(record.id, "7");
        assert_eq!(record.name, "Oak Primary");
        assert_eq!(record.la_name.as_deref(), Some("Leeds"));
        assert_eq!(record.school_type, None);
        assert_eq!(record.yearly_counts.get(1996), Some(101));
        assert_eq!(record.yearly_counts.get(1997), None);
    }

    #[test]
    fn missing_object_id_reports_the_row() {
        let mapper = RowMapper::from_headers(&["Name", "ObjectId"]).expect("headers should map");

        let err = mapper
            .record(&strings(&["Oak Primary", ""]), 4)
            .expect_err("row without id should fail");

        assert!(err.to_string().contains("row 4"));
    }

    #[test]
    fn oversized_count_reports_the_row() {
        let mapper = RowMapper::from_headers(&["ObjectId", "Name", "F2005"]).expect("headers should map");

        let err = mapper
            .record(&strings(&["9", "Oak Primary", "1e30"]), 3)
            .expect_err("oversized count should fail");

        let message = format!("{err:#}");
        assert!(message.contains("row 3: invalid F2005"), "{message}");
        assert!(message.contains("out of range"), "{message}");
    }

    #[test]
    fn headers_without_object_id_are_rejected() {
        assert!(RowMapper::from_headers(&["Name", "Sector"]).is_err());
    }

    #[test]
    fn spreadsheet_floats_are_accepted_when_whole() {
        assert_eq!(parse_count("120").ok(), Some(120));
        assert_eq!(parse_count("120.0").ok(), Some(120));
        assert!(parse_count("120.5").is_err());
        assert!(parse_count("n/a").is_err());
        assert!(parse_count("1e30").is_err());
        assert!(parse_count("-1e30").is_err());
        assert_eq!(parse_count("1e3").ok(), Some(1000));
        assert_eq!(normalize_id("12.0"), "12");
        assert_eq!(normalize_id("A-12"), "A-12");
    }
}
