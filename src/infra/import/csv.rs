use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::enrollment::ImportLogEntry;
use crate::infra::import::rows::RowMapper;
use crate::infra::sqlite::queries::store_records;

pub fn import_csv_to_sqlite(db_path: &Path, csv_path: &Path) -> Result<ImportLogEntry> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }
    let mapper = RowMapper::from_headers(&headers)
        .with_context(|| format!("unexpected csv layout: {}", csv_path.display()))?;

    let mut records = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.context("failed to parse csv record")?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        records.push(mapper.record(&cells, row_idx + 1)?);
    }

    let source_path = csv_path.to_string_lossy().into_owned();
    store_records(db_path, &source_path, &records)
}
