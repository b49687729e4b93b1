use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::constants::{DATA_API_PATH, GRAPH_API_PATH};
use crate::http::handlers::{data_api, data_page, enrollment_graph, healthz, index_page};
use crate::usecase::services::chart_service::ChartService;
use crate::usecase::services::query_service::QueryService;

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
    pub charts: Arc<ChartService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/data/", get(data_page))
        .route(DATA_API_PATH, get(data_api))
        .route("/api/data/", get(data_api))
        .route(GRAPH_API_PATH, get(enrollment_graph))
        .route("/api/enrollment-graph/", get(enrollment_graph))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
