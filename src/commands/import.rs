use anyhow::Result;
use tracing::info;

use crate::config::{resolve_db_path, ImportArgs};
use crate::usecase::services::import_service::ImportService;

pub fn run(args: ImportArgs) -> Result<()> {
    let db_path = resolve_db_path(args.db)?;
    let entry = ImportService::new(db_path.clone()).import(&args.file)?;

    info!(
        source = %entry.source_path,
        rows = entry.row_count,
        db = %db_path.display(),
        "import finished"
    );
    println!(
        "Imported {} rows from {} at {}",
        entry.row_count, entry.source_path, entry.imported_at
    );
    Ok(())
}
