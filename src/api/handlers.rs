use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::state::AppState;
use crate::backend::BackendMode;
use crate::core::ReportPipeline;
use crate::domain::model::{AnalysisRequest, AnalysisType};
use crate::domain::ports::{AnalysisBackend, AnalysisPipeline, ReportStore};
use crate::pricing;
use crate::utils::error::AnalysisError;

#[derive(Debug, Deserialize)]
pub struct EstimateParams {
    pub analysis_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    pub confirm: Option<bool>,
}

fn error_status(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::ReportNotFound { .. } => StatusCode::NOT_FOUND,
        AnalysisError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        AnalysisError::BackendError { .. } | AnalysisError::ApiError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn health() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "agentflow",
        "timestamp": Utc::now().to_rfc3339()
    })))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    let status = state.connector.status().await;
    Ok(Json(json!(status)))
}

pub async fn templates() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({ "templates": pricing::TEMPLATES })))
}

pub async fn estimate(
    Query(params): Query<EstimateParams>,
) -> Result<Json<Value>, StatusCode> {
    let Some(label) = params.analysis_type else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let analysis_type = AnalysisType::from_label(&label);
    let estimate = pricing::estimate(analysis_type);

    Ok(Json(json!({
        "analysis_type": analysis_type.code(),
        "estimate": estimate,
    })))
}

async fn run_pipeline<B: AnalysisBackend, S: ReportStore>(
    pipeline: &ReportPipeline<B, S>,
) -> crate::utils::error::Result<Value> {
    let outcome = pipeline.acquire().await?;
    let mode = BackendMode::of_outcome(&outcome);

    let document = pipeline.compose(outcome).await?;
    let cost = document.cost;
    let processing_time = document.processing_time;
    let source = document.source.clone();

    let filename = pipeline.publish(document).await?;

    Ok(json!({
        "success": true,
        "report_file": filename,
        "cost": cost,
        "processing_time": processing_time,
        "mode": mode.code(),
        "source": source,
    }))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<Value>, StatusCode> {
    if request.company.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    info!("📊 Análisis solicitado para: {}", request.company.name);
    let pipeline = ReportPipeline::new(state.connector.clone(), state.store.clone(), request)
        .with_ledger(state.ledger.clone());

    match run_pipeline(&pipeline).await {
        Ok(body) => {
            info!("✅ Análisis completado: {}", body["report_file"]);
            Ok(Json(body))
        }
        Err(e) => {
            error!("❌ Error en análisis: {}", e);
            pipeline.record_failure(&e);
            Err(error_status(&e))
        }
    }
}

pub async fn list_reports(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    let reports = state.store.list_reports().await.map_err(|e| {
        error!("❌ Error listando reportes: {}", e);
        error_status(&e)
    })?;
    let stats = state.store.stats().map_err(|e| error_status(&e))?;

    Ok(Json(json!({
        "reports": reports,
        "stats": stats,
    })))
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, StatusCode> {
    let data = state
        .store
        .read_report(&name)
        .await
        .map_err(|e| error_status(&e))?;

    Ok(([(header::CONTENT_TYPE, "application/pdf")], data).into_response())
}

pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ConfirmParams>,
) -> Result<Json<Value>, StatusCode> {
    if params.confirm != Some(true) {
        return Err(StatusCode::BAD_REQUEST);
    }

    state
        .store
        .delete_report(&name)
        .await
        .map_err(|e| error_status(&e))?;

    Ok(Json(json!({ "deleted": name })))
}

pub async fn clear_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConfirmParams>,
) -> Result<Json<Value>, StatusCode> {
    if params.confirm != Some(true) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let count = state
        .store
        .clear_reports()
        .await
        .map_err(|e| error_status(&e))?;

    Ok(Json(json!({ "deleted_count": count })))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    let metrics = state.ledger.metrics().map_err(|e| {
        error!("❌ Error leyendo métricas: {}", e);
        error_status(&e)
    })?;

    let mut body = serde_json::to_value(&metrics).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    body["uptime_seconds"] = json!(state.started.elapsed().as_secs());

    #[cfg(feature = "cli")]
    if let Some(stats) = state.monitor.get_stats() {
        body["process"] = json!({
            "cpu_usage": stats.cpu_usage,
            "memory_usage_mb": stats.memory_usage_mb,
            "peak_memory_mb": stats.peak_memory_mb,
        });
    }

    Ok(Json(body))
}
