use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::enrollment::ImportLogEntry;
use crate::infra::import::rows::RowMapper;
use crate::infra::sqlite::queries::store_records;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Imports the first worksheet. Its first row must carry the same headers as
/// the CSV export.
pub fn import_xlsx_to_sqlite(db_path: &Path, xlsx_path: &Path) -> Result<ImportLogEntry> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open workbook: {}", xlsx_path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no sheets: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>());
    let headers = rows
        .next()
        .ok_or_else(|| anyhow!("sheet {sheet_name} is empty"))?;
    let mapper = RowMapper::from_headers(&headers)
        .with_context(|| format!("unexpected layout in sheet: {sheet_name}"))?;

    let mut records = Vec::new();
    for (row_idx, cells) in rows.enumerate() {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(mapper.record(&cells, row_idx + 1)?);
    }

    let source_path = format!("{}#{sheet_name}", xlsx_path.to_string_lossy());
    store_records(db_path, &source_path, &records)
}
