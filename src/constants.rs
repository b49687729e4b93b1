pub const DATA_START_YEAR: i32 = 1996;
pub const DATA_END_YEAR: i32 = 2018;

pub const DEFAULT_PAGE_SIZE: i64 = 200;
pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 1000;

pub const MAX_SCHOOLS_PER_GRAPH: usize = 50;

/// Rows shown per client-side view page, independent of the server data page.
pub const DEFAULT_VIEW_PAGE_SIZE: usize = 25;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

pub const DATA_API_PATH: &str = "/api/v1/data/";
pub const GRAPH_API_PATH: &str = "/api/v1/enrollment-graph/";

pub fn years() -> impl DoubleEndedIterator<Item = i32> + Clone {
    DATA_START_YEAR..=DATA_END_YEAR
}
