use crate::backend::BackendStatus;
use crate::domain::model::{AnalysisOutcome, AnalysisRequest, ReportDocument};
use crate::history::ReportEntry;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Something that can run a business analysis, live or simulated.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome>;
    async fn status(&self) -> BackendStatus;
}

/// Report persistence. The production implementation is
/// `history::FileReportStore`; tests swap in an in-memory store.
pub trait ReportStore: Send + Sync {
    fn save_report(
        &self,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
    fn read_report(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn list_reports(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ReportEntry>>> + Send;
    fn delete_report(&self, name: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear_reports(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}

/// The three phases every analysis run goes through.
#[async_trait]
pub trait AnalysisPipeline: Send + Sync {
    /// Obtain the raw analysis from the backend (or the simulation engine).
    async fn acquire(&self) -> Result<AnalysisOutcome>;
    /// Post-process the outcome into a renderable report document.
    async fn compose(&self, outcome: AnalysisOutcome) -> Result<ReportDocument>;
    /// Render the PDF, persist it and account for the run.
    async fn publish(&self, document: ReportDocument) -> Result<String>;
}
