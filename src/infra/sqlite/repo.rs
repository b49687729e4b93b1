use std::path::PathBuf;

use crate::domain::entities::enrollment::{DatasetSummary, EnrollmentRecord};
use crate::domain::entities::query::{DataQuery, DistinctLists};
use crate::infra::sqlite::queries::{
    dataset_summary, distinct_lists, query_page, records_by_ids, records_by_names,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{EnrollmentRepository, RecordPage, RepoError};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl EnrollmentRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(RepoError::from_anyhow)
    }

    fn query_page(&self, query: &DataQuery) -> Result<RecordPage, RepoError> {
        let (records, total) =
            query_page(&self.db_path, query).map_err(RepoError::from_anyhow)?;
        Ok(RecordPage { records, total })
    }

    fn distinct_lists(&self) -> Result<DistinctLists, RepoError> {
        distinct_lists(&self.db_path).map_err(RepoError::from_anyhow)
    }

    fn records_by_ids(&self, ids: &[String]) -> Result<Vec<EnrollmentRecord>, RepoError> {
        records_by_ids(&self.db_path, ids).map_err(RepoError::from_anyhow)
    }

    fn records_by_names(&self, names: &[String]) -> Result<Vec<EnrollmentRecord>, RepoError> {
        records_by_names(&self.db_path, names).map_err(RepoError::from_anyhow)
    }

    fn summary(&self) -> Result<DatasetSummary, RepoError> {
        dataset_summary(&self.db_path).map_err(RepoError::from_anyhow)
    }
}
