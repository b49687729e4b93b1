use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{resolve_db_path, ServeArgs};
use crate::http::routes::{router, AppState};
use crate::infra::chart::render::ChartRenderer;
use crate::infra::sqlite::repo::SqliteRepo;
use crate::usecase::ports::repo::EnrollmentRepository;
use crate::usecase::services::chart_service::ChartService;
use crate::usecase::services::query_service::QueryService;

pub fn build_state(repo: Arc<dyn EnrollmentRepository>, renderer: ChartRenderer) -> AppState {
    AppState {
        query: Arc::new(QueryService::new(repo.clone())),
        charts: Arc::new(ChartService::new(repo, renderer)),
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let db_path = resolve_db_path(args.db)?;
    let repo = SqliteRepo::new(db_path.clone());
    repo.init().context("failed to prepare datastore")?;
    info!(db = %db_path.display(), "datastore ready");

    let renderer = ChartRenderer::new(args.font.as_deref());
    info!(text = renderer.draws_text(), "chart renderer ready");
    let app = router(build_state(Arc::new(repo), renderer));

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("school-rolls listening on http://{}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // graceful shutdown on Ctrl+C
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
}
