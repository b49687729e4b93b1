use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, types::Value, OptionalExtension};

use crate::constants::years;
use crate::domain::columns::Column;
use crate::domain::entities::enrollment::{
    DatasetSummary, EnrollmentRecord, ImportLogEntry, YearlyCounts,
};
use crate::domain::entities::query::{DataQuery, DistinctLists, NameOption};
use crate::infra::sqlite::schema::{init_db, open_connection, RECORDS_TABLE};

const FIXED_SELECT: &str = "ObjectId, Name, Sector, School_Type, Code, LA_Code, LA_Name";
const FIXED_SELECT_LEN: usize = 7;

fn record_select_list() -> String {
    let years = years()
        .map(|year| Column::Year(year).storage_name().into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{FIXED_SELECT}, {years}")
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EnrollmentRecord> {
    let mut yearly_counts = YearlyCounts::new();
    for (offset, year) in years().enumerate() {
        let count: Option<i64> = row.get(FIXED_SELECT_LEN + offset)?;
        yearly_counts.set(year, count);
    }

    Ok(EnrollmentRecord {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        sector: row.get(2)?,
        school_type: row.get(3)?,
        code: row.get(4)?,
        la_code: row.get(5)?,
        la_name: row.get(6)?,
        yearly_counts,
    })
}

fn placeholders(count: usize) -> String {
    std::iter::repeat_n("?", count)
        .collect::<Vec<_>>()
        .join(",")
}

fn order_by_clause(query: &DataQuery) -> String {
    let column = query.sort.storage_name();
    let direction = query.order.sql();
    if query.sort.is_numeric() {
        format!("{column} {direction}, ObjectId ASC")
    } else {
        format!("{column} COLLATE NOCASE {direction}, ObjectId ASC")
    }
}

pub fn query_page(db_path: &Path, query: &DataQuery) -> Result<(Vec<EnrollmentRecord>, i64)> {
    if query.page_size <= 0 {
        anyhow::bail!("page_size must be greater than zero")
    }

    let conn = open_connection(db_path)?;

    let mut filter_clauses = Vec::<String>::new();
    let mut filter_params = Vec::<Value>::new();

    if let Some(sector) = query.sector.as_deref() {
        filter_clauses.push("Sector = ?".to_string());
        filter_params.push(Value::Text(sector.to_string()));
    }

    if !query.schools.is_empty() {
        filter_clauses.push(format!(
            "ObjectId IN ({})",
            placeholders(query.schools.len())
        ));
        filter_params.extend(query.schools.iter().cloned().map(Value::Text));
    }

    let where_sql = if filter_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", filter_clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {RECORDS_TABLE} {where_sql}"),
            rusqlite::params_from_iter(filter_params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered row count")?;

    let row_sql = format!(
        "SELECT {select} FROM {RECORDS_TABLE} {where_sql} ORDER BY {order_by} LIMIT ? OFFSET ?",
        select = record_select_list(),
        order_by = order_by_clause(query),
    );
    let mut row_params = filter_params;
    row_params.push(Value::Integer(query.page_size));
    row_params.push(Value::Integer(query.offset()));

    let mut stmt = conn
        .prepare(&row_sql)
        .context("failed to prepare page query")?;
    let records = stmt
        .query_map(rusqlite::params_from_iter(row_params), record_from_row)
        .context("failed to query page rows")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect page rows")?;

    Ok((records, total))
}

pub fn distinct_lists(db_path: &Path) -> Result<DistinctLists> {
    let conn = open_connection(db_path)?;

    let mut names_stmt = conn
        .prepare(&format!(
            "SELECT ObjectId, Name
             FROM {RECORDS_TABLE}
             WHERE Name IS NOT NULL AND Name <> ''
             ORDER BY Name ASC, ObjectId ASC"
        ))
        .context("failed to prepare distinct names query")?;
    let names = names_stmt
        .query_map([], |row| {
            Ok(NameOption {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to query distinct names")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect distinct names")?;
    drop(names_stmt);

    let sectors = distinct_values(&conn, "Sector")?;
    let types = distinct_values(&conn, "School_Type")?;

    Ok(DistinctLists {
        names,
        sectors,
        types,
    })
}

fn distinct_values(conn: &rusqlite::Connection, column: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT {column}
             FROM {RECORDS_TABLE}
             WHERE {column} IS NOT NULL AND {column} <> ''
             ORDER BY {column} ASC"
        ))
        .with_context(|| format!("failed to prepare distinct {column} query"))?;
    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .with_context(|| format!("failed to query distinct {column}"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("failed to collect distinct {column}"))?;
    Ok(values)
}

pub fn records_by_ids(db_path: &Path, ids: &[String]) -> Result<Vec<EnrollmentRecord>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let conn = open_connection(db_path)?;
    let sql = format!(
        "SELECT {select} FROM {RECORDS_TABLE} WHERE ObjectId IN ({placeholders})",
        select = record_select_list(),
        placeholders = placeholders(ids.len()),
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare records-by-id query")?;
    let found = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), record_from_row)
        .context("failed to query records by id")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect records by id")?;

    let row_pos: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let mut ordered = found;
    ordered.sort_by_key(|record| row_pos.get(record.id.as_str()).copied().unwrap_or(usize::MAX));
    Ok(ordered)
}

pub fn records_by_names(db_path: &Path, names: &[String]) -> Result<Vec<EnrollmentRecord>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let conn = open_connection(db_path)?;
    let sql = format!(
        "SELECT {select} FROM {RECORDS_TABLE} WHERE Name IN ({placeholders}) ORDER BY ObjectId ASC",
        select = record_select_list(),
        placeholders = placeholders(names.len()),
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare records-by-name query")?;
    let found = stmt
        .query_map(rusqlite::params_from_iter(names.iter()), record_from_row)
        .context("failed to query records by name")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect records by name")?;

    let name_pos: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let mut ordered = found;
    ordered.sort_by_key(|record| {
        name_pos
            .get(record.name.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });
    Ok(ordered)
}

/// Inserts or replaces records by `ObjectId` and logs the import, all in one
/// transaction.
pub fn store_records(
    db_path: &Path,
    source_path: &str,
    records: &[EnrollmentRecord],
) -> Result<ImportLogEntry> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start import transaction")?;

    let column_count = FIXED_SELECT_LEN + years().count();
    let insert_sql = format!(
        "INSERT OR REPLACE INTO {RECORDS_TABLE} ({select}) VALUES ({placeholders})",
        select = record_select_list(),
        placeholders = placeholders(column_count),
    );

    let mut insert_record = tx
        .prepare(&insert_sql)
        .context("failed to prepare record insert")?;
    for record in records {
        let mut values = vec![
            Value::Text(record.id.clone()),
            Value::Text(record.name.clone()),
            optional_text(&record.sector),
            optional_text(&record.school_type),
            optional_text(&record.code),
            optional_text(&record.la_code),
            optional_text(&record.la_name),
        ];
        values.extend(years().map(|year| {
            record
                .yearly_counts
                .get(year)
                .map(Value::Integer)
                .unwrap_or(Value::Null)
        }));
        insert_record
            .execute(rusqlite::params_from_iter(values))
            .with_context(|| format!("failed to insert record {}", record.id))?;
    }
    drop(insert_record);

    let entry = ImportLogEntry {
        source_path: source_path.to_string(),
        row_count: records.len() as i64,
        imported_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    tx.execute(
        "INSERT INTO import_log(source_path, row_count, imported_at) VALUES (?1, ?2, ?3)",
        params![entry.source_path, entry.row_count, entry.imported_at],
    )
    .context("failed to record import")?;

    tx.commit().context("failed to commit import transaction")?;
    Ok(entry)
}

fn optional_text(value: &Option<String>) -> Value {
    value
        .as_ref()
        .map(|text| Value::Text(text.clone()))
        .unwrap_or(Value::Null)
}

pub fn dataset_summary(db_path: &Path) -> Result<DatasetSummary> {
    let conn = open_connection(db_path)?;
    let total_records: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {RECORDS_TABLE}"), [], |row| {
            row.get(0)
        })
        .context("failed to count records")?;

    let last_import = conn
        .query_row(
            "SELECT source_path, row_count, imported_at
             FROM import_log
             ORDER BY id DESC
             LIMIT 1",
            [],
            |row| {
                Ok(ImportLogEntry {
                    source_path: row.get(0)?,
                    row_count: row.get(1)?,
                    imported_at: row.get(2)?,
                })
            },
        )
        .optional()
        .context("failed to query latest import")?;

    Ok(DatasetSummary {
        total_records,
        last_import,
    })
}
