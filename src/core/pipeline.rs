use crate::backend::BackendMode;
use crate::compose;
use crate::domain::model::{AnalysisOutcome, AnalysisRequest, ReportDocument};
use crate::domain::ports::{AnalysisBackend, AnalysisPipeline, ReportStore};
use crate::ledger::{RunLedger, RunRecord};
use crate::report;
use crate::utils::error::{AnalysisError, Result};
use chrono::Utc;
use std::sync::Mutex;
use std::time::Instant;

/// Production pipeline: backend in, PDF out, one ledger entry per run.
pub struct ReportPipeline<B: AnalysisBackend, S: ReportStore> {
    backend: B,
    store: S,
    request: AnalysisRequest,
    ledger: Option<RunLedger>,
    run_id: String,
    // 記錄 acquire 觀察到的模式，publish 記帳時使用
    observed_mode: Mutex<Option<BackendMode>>,
}

impl<B: AnalysisBackend, S: ReportStore> ReportPipeline<B, S> {
    pub fn new(backend: B, store: S, request: AnalysisRequest) -> Self {
        Self {
            backend,
            store,
            request,
            ledger: None,
            run_id: RunRecord::new_id(),
            observed_mode: Mutex::new(None),
        }
    }

    pub fn with_ledger(mut self, ledger: RunLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn mode(&self) -> BackendMode {
        self.observed_mode
            .lock()
            .ok()
            .and_then(|slot| *slot)
            .unwrap_or(BackendMode::Simulation)
    }

    /// Account for a run that died before producing a report.
    pub fn record_failure(&self, error: &AnalysisError) {
        let Some(ledger) = &self.ledger else {
            return;
        };
        let record = RunRecord {
            id: self.run_id.clone(),
            timestamp: Utc::now(),
            company: self.request.company.name.clone(),
            analysis_type: self.request.analysis_type,
            language: self.request.language,
            mode: self.mode(),
            cost: 0.0,
            duration_seconds: 0.0,
            success: false,
            report_file: None,
        };
        if let Err(e) = ledger.append(record) {
            tracing::warn!("⚠️ No se pudo registrar el fallo en el libro de registros: {}", e);
        }
        tracing::debug!("Recorded failed run {}: {}", self.run_id, error);
    }
}

#[async_trait::async_trait]
impl<B: AnalysisBackend, S: ReportStore> AnalysisPipeline for ReportPipeline<B, S> {
    async fn acquire(&self) -> Result<AnalysisOutcome> {
        let started = Instant::now();
        let mut outcome = self.backend.run_analysis(&self.request).await?;

        // 模擬結果不自帶耗時，以實際流逝時間補上
        if outcome.processing_time <= 0.0 {
            outcome.processing_time = started.elapsed().as_secs_f64();
        }

        if let Ok(mut slot) = self.observed_mode.lock() {
            *slot = Some(BackendMode::of_outcome(&outcome));
        }

        Ok(outcome)
    }

    async fn compose(&self, outcome: AnalysisOutcome) -> Result<ReportDocument> {
        Ok(compose::build_document_now(&self.request, &outcome))
    }

    async fn publish(&self, document: ReportDocument) -> Result<String> {
        let pdf = report::render_report(&document);
        tracing::debug!("Rendered PDF ({} bytes)", pdf.len());

        let path = self.store.save_report(&pdf).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| path.display().to_string());

        if let Some(ledger) = &self.ledger {
            let record = RunRecord {
                id: self.run_id.clone(),
                timestamp: document.generated_at,
                company: document.company.clone(),
                analysis_type: document.analysis_type,
                language: document.language,
                mode: self.mode(),
                cost: document.cost,
                duration_seconds: document.processing_time,
                success: true,
                report_file: Some(filename.clone()),
            };
            ledger.append(record)?;
        }

        Ok(filename)
    }
}
