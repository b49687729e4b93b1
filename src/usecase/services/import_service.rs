use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::entities::enrollment::ImportLogEntry;
use crate::infra::import::csv::import_csv_to_sqlite;
use crate::infra::import::xlsx::import_xlsx_to_sqlite;

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Picks the reader by file extension; anything that is not a workbook is
    /// read as CSV.
    pub fn import(&self, path: &Path) -> Result<ImportLogEntry> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "ods") => import_xlsx_to_sqlite(&self.db_path, path),
            _ => import_csv_to_sqlite(&self.db_path, path),
        }
    }
}
