use std::sync::Arc;

use crate::domain::entities::chart::{ChartPlan, ChartSelection, SelectBy};
use crate::infra::chart::render::ChartRenderer;
use crate::infra::chart::theme::PALETTE;
use crate::usecase::ports::repo::{EnrollmentRepository, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("chart rendering failed: {0}")]
    Render(String),
}

pub struct ChartService {
    repo: Arc<dyn EnrollmentRepository>,
    renderer: ChartRenderer,
}

impl ChartService {
    pub fn new(repo: Arc<dyn EnrollmentRepository>, renderer: ChartRenderer) -> Self {
        Self { repo, renderer }
    }

    pub fn plan(&self, selection: &ChartSelection) -> Result<ChartPlan, ChartError> {
        if selection.is_empty() {
            return Ok(ChartPlan::Empty);
        }
        if selection.dropped > 0 {
            tracing::warn!(
                kept = selection.keys.len(),
                dropped = selection.dropped,
                "chart selection capped"
            );
        }

        let records = match selection.by {
            SelectBy::Id => self.repo.records_by_ids(&selection.keys)?,
            SelectBy::Name => self.repo.records_by_names(&selection.keys)?,
        };
        let plan = ChartPlan::from_records(&records, PALETTE.len());
        tracing::debug!(
            requested = selection.keys.len(),
            plotted = plan.series().len(),
            "planned enrollment chart"
        );
        Ok(plan)
    }

    pub fn render(&self, selection: &ChartSelection) -> Result<Vec<u8>, ChartError> {
        let plan = self.plan(selection)?;
        self.renderer
            .render_png(&plan)
            .map_err(|err| ChartError::Render(format!("{err:#}")))
    }
}
