//! HTTP endpoints.
//!
//! - `/v1/metrics` : recent records + summary (JSON)
//! - `/dashboard`  : live dashboard page
//! - `/health`     : liveness, in the shape the dashboard's fallback probe reads

use axum::{extract::State, response::Html, Json};
use serde::Serialize;

use cockpit_core::dashboard::DASHBOARD_HTML;
use cockpit_core::metrics::MetricsReport;

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub model: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        model: state.cfg().gateway.model.clone(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.metrics().report())
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
