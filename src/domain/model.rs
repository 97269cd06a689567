use crate::i18n::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven canonical analysis types the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Market,
    Financial,
    Expansion,
    Digital,
    Operations,
    Strategic,
    Complete,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 7] = [
        AnalysisType::Market,
        AnalysisType::Financial,
        AnalysisType::Expansion,
        AnalysisType::Digital,
        AnalysisType::Operations,
        AnalysisType::Strategic,
        AnalysisType::Complete,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AnalysisType::Market => "market",
            AnalysisType::Financial => "financial",
            AnalysisType::Expansion => "expansion",
            AnalysisType::Digital => "digital",
            AnalysisType::Operations => "operations",
            AnalysisType::Strategic => "strategic",
            AnalysisType::Complete => "complete",
        }
    }

    pub fn display_name(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (AnalysisType::Market, Language::Es) => "Análisis de Mercado",
            (AnalysisType::Financial, Language::Es) => "Análisis Financiero",
            (AnalysisType::Expansion, Language::Es) => "Estrategia de Expansión",
            (AnalysisType::Digital, Language::Es) => "Transformación Digital",
            (AnalysisType::Operations, Language::Es) => "Optimización Operacional",
            (AnalysisType::Strategic, Language::Es) => "Planificación Estratégica",
            (AnalysisType::Complete, Language::Es) => "Análisis Completo",
            (AnalysisType::Market, Language::En) => "Market Analysis",
            (AnalysisType::Financial, Language::En) => "Financial Analysis",
            (AnalysisType::Expansion, Language::En) => "Expansion Strategy",
            (AnalysisType::Digital, Language::En) => "Digital Transformation",
            (AnalysisType::Operations, Language::En) => "Operations Optimization",
            (AnalysisType::Strategic, Language::En) => "Strategic Planning",
            (AnalysisType::Complete, Language::En) => "Complete Analysis",
        }
    }

    /// Map a free-form label onto a canonical type. Accepts canonical codes,
    /// the Spanish and English display labels (with or without decoration)
    /// and falls back to keyword matching. Unknown input maps to `Market`.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return AnalysisType::Market;
        }

        // 先比對標準代碼
        for analysis_type in AnalysisType::ALL {
            if trimmed.eq_ignore_ascii_case(analysis_type.code()) {
                return analysis_type;
            }
        }

        // 再比對顯示名稱（完整或部分）
        let lower = trimmed.to_lowercase();
        for analysis_type in AnalysisType::ALL {
            for lang in [Language::Es, Language::En] {
                let display = analysis_type.display_name(lang).to_lowercase();
                if lower.contains(&display) || display.contains(&lower) {
                    return analysis_type;
                }
            }
        }

        // 最後用關鍵字
        if lower.contains("financiero") || lower.contains("financial") {
            AnalysisType::Financial
        } else if lower.contains("expansion") || lower.contains("expansión") {
            AnalysisType::Expansion
        } else if lower.contains("digital") {
            AnalysisType::Digital
        } else if lower.contains("operacion") || lower.contains("operation") {
            AnalysisType::Operations
        } else if lower.contains("estrateg") || lower.contains("strategic") {
            AnalysisType::Strategic
        } else if lower.contains("completo") || lower.contains("complete") {
            AnalysisType::Complete
        } else {
            AnalysisType::Market
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Standard,
    High,
    Urgent,
}

impl Priority {
    pub fn code(&self) -> &'static str {
        match self {
            Priority::Standard => "standard",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        if lower.contains("urgent") {
            Priority::Urgent
        } else if lower.contains("alta") || lower.contains("high") {
            Priority::High
        } else {
            Priority::Standard
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub industry: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

impl CompanyProfile {
    pub fn new(name: impl Into<String>, industry: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            location: location.into(),
            products: None,
            competitors: None,
            challenges: None,
            goals: None,
        }
    }

    /// All free-text context fields joined together. The cost model charges
    /// extra once this exceeds 500 characters.
    pub fn supplemental_text(&self) -> String {
        [&self.products, &self.competitors, &self.challenges, &self.goals]
            .iter()
            .filter_map(|field| field.as_deref())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub company: CompanyProfile,
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub priority: Priority,
}

impl AnalysisRequest {
    pub fn new(company: CompanyProfile, analysis_type: AnalysisType) -> Self {
        Self {
            company,
            analysis_type,
            language: Language::default(),
            priority: Priority::default(),
        }
    }
}

/// Structured pieces a backend may hand over alongside the raw text.
/// The simulation engine always fills this in; a live backend usually
/// returns raw text only and the composer derives the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ReportMetrics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot: Option<SwotQuadrants>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub source: String,
    pub simulated: bool,
    pub processing_time: f64,
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub overall_score: u8,
    pub growth_potential: String,
    pub risk_level: String,
    /// Remaining metrics in display order, keyed for `i18n::metric_label`.
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotQuadrants {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

/// Everything the PDF renderer needs, plus the bookkeeping the ledger keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub company: String,
    pub industry: String,
    pub location: String,
    pub analysis_type: AnalysisType,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: String,
    pub raw_analysis: String,
    pub metrics: ReportMetrics,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot: Option<SwotQuadrants>,
    pub cost: f64,
    pub processing_time: f64,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_exact_codes() {
        for analysis_type in AnalysisType::ALL {
            assert_eq!(AnalysisType::from_label(analysis_type.code()), analysis_type);
        }
        assert_eq!(AnalysisType::from_label("COMPLETE"), AnalysisType::Complete);
    }

    #[test]
    fn test_from_label_display_names() {
        assert_eq!(
            AnalysisType::from_label("Análisis Financiero"),
            AnalysisType::Financial
        );
        assert_eq!(
            AnalysisType::from_label("💻 Transformación Digital (10-15 min)"),
            AnalysisType::Digital
        );
        assert_eq!(
            AnalysisType::from_label("Strategic Planning"),
            AnalysisType::Strategic
        );
    }

    #[test]
    fn test_from_label_keywords() {
        assert_eq!(AnalysisType::from_label("algo financiero"), AnalysisType::Financial);
        assert_eq!(AnalysisType::from_label("plan de expansión"), AnalysisType::Expansion);
        assert_eq!(AnalysisType::from_label("mi reporte operacional"), AnalysisType::Operations);
        assert_eq!(AnalysisType::from_label("estrategia global"), AnalysisType::Strategic);
    }

    #[test]
    fn test_from_label_defaults_to_market() {
        assert_eq!(AnalysisType::from_label(""), AnalysisType::Market);
        assert_eq!(AnalysisType::from_label("   "), AnalysisType::Market);
        assert_eq!(AnalysisType::from_label("unknown thing"), AnalysisType::Market);
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::from_label("Estándar"), Priority::Standard);
        assert_eq!(Priority::from_label("Alta"), Priority::High);
        assert_eq!(Priority::from_label("Urgente"), Priority::Urgent);
        assert_eq!(Priority::from_label("high"), Priority::High);
        assert_eq!(Priority::from_label(""), Priority::Standard);
    }

    #[test]
    fn test_supplemental_text_joins_present_fields() {
        let mut profile = CompanyProfile::new("ACME", "Tecnología", "Madrid");
        assert_eq!(profile.supplemental_text(), "");

        profile.products = Some("Software SaaS".to_string());
        profile.goals = Some("Crecimiento 300%".to_string());
        assert_eq!(
            profile.supplemental_text(),
            "Software SaaS. Crecimiento 300%"
        );
    }

    #[test]
    fn test_request_serde_shape() {
        let json = r#"{
            "company": {"name": "ACME", "industry": "Tecnología", "location": "Madrid"},
            "analysis_type": "market",
            "language": "en"
        }"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.analysis_type, AnalysisType::Market);
        assert_eq!(request.language, Language::En);
        assert_eq!(request.priority, Priority::Standard);
    }
}
