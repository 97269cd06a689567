pub mod engine;
pub mod pipeline;

pub use crate::domain::ports::{AnalysisBackend, AnalysisPipeline, ReportStore};
pub use crate::utils::error::Result;
pub use engine::AnalysisEngine;
pub use pipeline::ReportPipeline;
