//! Mapping between the storage schema of `school_rolls` and the column names
//! exposed by the data API.
//!
//! Storage keeps year counts in `F<year>` columns and joins multi-word field
//! names with underscores. The API renames these to bare years and
//! space-separated names. `Code`, `LA_Code` and `LA_Name` stay in storage only.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::constants::{years, DATA_END_YEAR, DATA_START_YEAR};
use crate::domain::entities::enrollment::EnrollmentRecord;

const FIELD_COLUMNS: [(Column, &str, &str); 4] = [
    (Column::ObjectId, "ObjectId", "ObjectId"),
    (Column::Name, "Name", "Name"),
    (Column::Sector, "Sector", "Sector"),
    (Column::SchoolType, "School_Type", "School Type"),
];

const YEAR_STORAGE_PREFIX: &str = "F";

pub const ID_KEY: &str = "ObjectId";
pub const SECTOR_KEY: &str = "Sector";
pub const SCHOOL_TYPE_KEY: &str = "School Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ObjectId,
    Name,
    Sector,
    SchoolType,
    Year(i32),
}

impl Column {
    /// Display columns in API order: the fixed fields, then every year.
    pub fn all() -> impl Iterator<Item = Column> {
        FIELD_COLUMNS
            .iter()
            .map(|(column, _, _)| *column)
            .chain(years().map(Column::Year))
    }

    pub fn storage_name(self) -> Cow<'static, str> {
        match self {
            Column::Year(year) => Cow::Owned(format!("{YEAR_STORAGE_PREFIX}{year}")),
            field => Cow::Borrowed(field_names(field).0),
        }
    }

    pub fn display_name(self) -> Cow<'static, str> {
        match self {
            Column::Year(year) => Cow::Owned(year.to_string()),
            field => Cow::Borrowed(field_names(field).1),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Year(_))
    }

    /// Accepts either naming scheme, case-insensitively.
    pub fn resolve(name: &str) -> Option<Column> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let field = FIELD_COLUMNS.iter().find(|(_, storage, display)| {
            storage.eq_ignore_ascii_case(name) || display.eq_ignore_ascii_case(name)
        });
        if let Some((column, _, _)) = field {
            return Some(*column);
        }

        let digits = name
            .strip_prefix(|c: char| c.to_string().eq_ignore_ascii_case(YEAR_STORAGE_PREFIX))
            .unwrap_or(name);
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = digits.parse().ok()?;
        (DATA_START_YEAR..=DATA_END_YEAR)
            .contains(&year)
            .then_some(Column::Year(year))
    }
}

fn field_names(column: Column) -> (&'static str, &'static str) {
    FIELD_COLUMNS
        .iter()
        .find(|(candidate, _, _)| *candidate == column)
        .map(|(_, storage, display)| (*storage, *display))
        .unwrap_or(("", ""))
}

pub fn display_columns() -> Vec<String> {
    Column::all()
        .map(|column| column.display_name().into_owned())
        .collect()
}

/// A record projected onto the display columns, keeping column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow(Vec<(String, Value)>);

impl ProjectedRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ProjectedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub fn project_record(record: &EnrollmentRecord) -> ProjectedRow {
    let text = |value: Option<&str>| {
        value
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    };
    let cells = Column::all()
        .map(|column| {
            let value = match column {
                Column::ObjectId => Value::String(record.id.clone()),
                Column::Name => Value::String(record.name.clone()),
                Column::Sector => text(record.sector.as_deref()),
                Column::SchoolType => text(record.school_type.as_deref()),
                Column::Year(year) => record
                    .yearly_counts
                    .get(year)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            };
            (column.display_name().into_owned(), value)
        })
        .collect();
    ProjectedRow(cells)
}

/// Plain-text rendering of a cell as shown in tables; null renders empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
