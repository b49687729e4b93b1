use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde_json::{json, Value};

use crate::domain::entities::chart::ChartSelection;
use crate::domain::entities::query::{DataQuery, QueryResult};
use crate::http::error::ApiError;
use crate::http::routes::AppState;
use crate::platform::blocking::run_blocking;
use crate::ui::pages::{render_data_page, render_index_page};

type Params = Query<Vec<(String, String)>>;

pub async fn data_api(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<QueryResult>, ApiError> {
    let query = DataQuery::from_pairs(&params);
    let service = state.query.clone();
    let result = run_blocking(move || service.query_page(&query)).await??;
    Ok(Json(result))
}

pub async fn enrollment_graph(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<impl IntoResponse, ApiError> {
    let selection = ChartSelection::from_pairs(&params);
    let service = state.charts.clone();
    let png = run_blocking(move || service.render(&selection)).await??;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        png,
    ))
}

pub async fn index_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let service = state.query.clone();
    let summary = run_blocking(move || service.summary()).await??;
    Ok(Html(render_index_page(&summary)))
}

pub async fn data_page(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Html<String>, ApiError> {
    let query = DataQuery::from_pairs(&params);
    let service = state.query.clone();
    let page_query = query.clone();
    let result = run_blocking(move || service.query_page(&page_query)).await??;
    Ok(Html(render_data_page(&query, &result)))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
