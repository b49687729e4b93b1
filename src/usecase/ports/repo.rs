use crate::domain::entities::enrollment::{DatasetSummary, EnrollmentRecord};
use crate::domain::entities::query::{DataQuery, DistinctLists};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Message(String),
}

impl RepoError {
    pub(crate) fn from_anyhow(err: anyhow::Error) -> Self {
        RepoError::Message(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    pub records: Vec<EnrollmentRecord>,
    pub total: i64,
}

pub trait EnrollmentRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    /// Filters, sorts and slices the records for one page. `total` counts the
    /// filtered set before slicing.
    fn query_page(&self, query: &DataQuery) -> Result<RecordPage, RepoError>;

    /// Distinct filter options over the whole dataset, ignoring any filter.
    fn distinct_lists(&self) -> Result<DistinctLists, RepoError>;

    /// Records in the order of the requested ids; unknown ids are skipped.
    fn records_by_ids(&self, ids: &[String]) -> Result<Vec<EnrollmentRecord>, RepoError>;
    fn records_by_names(&self, names: &[String]) -> Result<Vec<EnrollmentRecord>, RepoError>;

    fn summary(&self) -> Result<DatasetSummary, RepoError>;
}
