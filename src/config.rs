use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;

use crate::constants::{DEFAULT_LISTEN_ADDR, DEFAULT_SERVER_URL, DEFAULT_VIEW_PAGE_SIZE};
use crate::domain::entities::query::SortOrder;

const DB_FILE_NAME: &str = "datastore.sqlite";

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse historic school roll data and chart enrollment trends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the data API, the chart endpoint and the HTML pages
    Serve(ServeArgs),
    /// Load a CSV or XLSX export into the datastore
    Import(ImportArgs),
    /// Fetch a data page from a running server and filter it locally
    Browse(BrowseArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// SQLite datastore (defaults to the user data directory)
    #[arg(long, env = "SCHOOL_ROLLS_DB")]
    pub db: Option<PathBuf>,
    /// TCP listener for HTTP clients
    #[arg(long, env = "SCHOOL_ROLLS_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,
    /// TrueType font used for chart text
    #[arg(long, env = "SCHOOL_ROLLS_FONT")]
    pub font: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// .csv, .xlsx or .xls file with an ObjectId column
    pub file: PathBuf,
    #[arg(long, env = "SCHOOL_ROLLS_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[arg(long, env = "SCHOOL_ROLLS_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,
    #[arg(long, default_value_t = 1)]
    pub page: i64,
    #[arg(long)]
    pub page_size: Option<i64>,
    /// Server-side sort column (storage or display name)
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, value_parser = parse_order)]
    pub order: Option<SortOrder>,
    /// Add an id to the persisted selection (repeatable)
    #[arg(long = "select-id")]
    pub select_ids: Vec<String>,
    #[arg(long = "select-sector")]
    pub select_sectors: Vec<String>,
    #[arg(long = "select-type")]
    pub select_types: Vec<String>,
    /// Drop the persisted selection before applying new selections
    #[arg(long)]
    pub clear: bool,
    /// Sort the loaded rows locally by this display column
    #[arg(long)]
    pub local_sort: Option<String>,
    #[arg(long)]
    pub local_desc: bool,
    #[arg(long, default_value_t = 1)]
    pub view_page: usize,
    #[arg(long, default_value_t = DEFAULT_VIEW_PAGE_SIZE)]
    pub view_page_size: usize,
    /// Write the chart for the effective selection to this PNG file
    #[arg(long)]
    pub chart_out: Option<PathBuf>,
    /// Where the filter selection is persisted
    #[arg(long, env = "SCHOOL_ROLLS_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 3)]
    pub retries: u32,
    #[arg(long, default_value_t = 500)]
    pub retry_delay_ms: u64,
}

impl BrowseArgs {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn parse_order(value: &str) -> Result<SortOrder, String> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(format!("expected asc or desc, got {other}")),
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "hellhbbd", "school-rolls")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join(DB_FILE_NAME))
}

pub fn default_state_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("client"))
}

pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_path_uses_app_directory() {
        let db_path = default_db_path().expect("default db path should resolve");

        assert_eq!(
            db_path.file_name().and_then(|name| name.to_str()),
            Some(DB_FILE_NAME)
        );
        assert!(db_path.to_string_lossy().contains("school-rolls"));
    }

    #[test]
    fn serve_defaults_listen_address() {
        let cli = Cli::try_parse_from(["school-rolls", "serve", "--db", "/tmp/rolls.sqlite"])
            .expect("serve args should parse");

        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.db, Some(PathBuf::from("/tmp/rolls.sqlite")));
        assert_eq!(args.listen.port(), 8000);
    }

    #[test]
    fn browse_collects_repeated_selections() {
        let cli = Cli::try_parse_from([
            "school-rolls",
            "browse",
            "--select-id",
            "4",
            "--select-id",
            "9",
            "--order",
            "DESC",
        ])
        .expect("browse args should parse");

        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.select_ids, vec!["4", "9"]);
        assert_eq!(args.order, Some(SortOrder::Desc));
        assert_eq!(args.view_page_size, DEFAULT_VIEW_PAGE_SIZE);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
