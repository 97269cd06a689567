use crate::domain::model::{AnalysisRequest, AnalysisType, CompanyProfile, Priority};
use crate::i18n::Language;
use crate::utils::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis request loaded from a TOML file: the company profile plus an
/// optional `[analysis]` section. Type and language accept the same loose
/// labels the interactive frontend did ("Análisis de Mercado", "market",
/// "Español", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFile {
    pub company: CompanyProfile,
    pub analysis: Option<AnalysisSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub r#type: Option<String>,
    pub language: Option<String>,
    pub priority: Option<String>,
}

impl RequestFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalysisError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "request_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn to_request(&self) -> Result<AnalysisRequest> {
        if self.company.name.trim().is_empty() {
            return Err(AnalysisError::ValidationError {
                message: "company.name must not be empty".to_string(),
            });
        }

        let analysis = self.analysis.clone().unwrap_or_default();
        let analysis_type = match analysis.r#type.as_deref() {
            Some(label) => AnalysisType::from_label(label),
            None => AnalysisType::Complete,
        };
        let language = analysis
            .language
            .as_deref()
            .map(Language::from_code)
            .unwrap_or_default();

        Ok(AnalysisRequest {
            company: self.company.clone(),
            analysis_type,
            language,
            priority: parse_priority(analysis.priority.as_deref()),
        })
    }
}

fn parse_priority(value: Option<&str>) -> Priority {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "urgent" || v == "urgente" => Priority::Urgent,
        Some(v) if v == "high" || v == "alta" => Priority::High,
        _ => Priority::Standard,
    }
}
