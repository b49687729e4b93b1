use std::sync::Arc;

use crate::domain::columns::{display_columns, project_record};
use crate::domain::entities::enrollment::DatasetSummary;
use crate::domain::entities::query::{total_pages, DataQuery, QueryResult};
use crate::usecase::ports::repo::{EnrollmentRepository, RepoError};

pub struct QueryService {
    repo: Arc<dyn EnrollmentRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn EnrollmentRepository>) -> Self {
        Self { repo }
    }

    pub fn query_page(&self, query: &DataQuery) -> Result<QueryResult, RepoError> {
        let page = self.repo.query_page(query)?;
        let distinct = self.repo.distinct_lists()?;

        tracing::debug!(
            page = query.page,
            page_size = query.page_size,
            total = page.total,
            rows = page.records.len(),
            "queried data page"
        );

        Ok(QueryResult {
            page: query.page,
            page_size: query.page_size,
            total: page.total,
            total_pages: total_pages(page.total, query.page_size),
            columns: display_columns(),
            data: page.records.iter().map(project_record).collect(),
            distinct,
        })
    }

    pub fn summary(&self) -> Result<DatasetSummary, RepoError> {
        self.repo.summary()
    }
}
