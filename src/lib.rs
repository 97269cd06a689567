pub mod backend;
pub mod compose;
pub mod config;
pub mod core;
pub mod domain;
pub mod history;
pub mod i18n;
pub mod ledger;
pub mod pricing;
pub mod report;
pub mod utils;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use backend::Connector;
pub use config::AppConfig;
pub use core::{AnalysisEngine, ReportPipeline};
pub use domain::model::{AnalysisRequest, AnalysisType, CompanyProfile};
pub use history::FileReportStore;
pub use i18n::Language;
pub use ledger::RunLedger;
pub use report::render_report;
pub use utils::error::{AnalysisError, Result};
