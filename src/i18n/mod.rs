use serde::{Deserialize, Serialize};
use std::fmt;

/// Report language. Analysis requests carry the wire codes "es" / "en";
/// everything the renderer and the simulation engine emit is resolved
/// through the catalog below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// Spanish is the default for anything unrecognized.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" | "inglés" | "ingles" => Language::En,
            _ => Language::Es,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed strings of one report language.
pub struct Catalog {
    pub report_title: &'static str,
    pub label_company: &'static str,
    pub label_industry: &'static str,
    pub label_location: &'static str,
    pub label_analysis_type: &'static str,
    pub label_date: &'static str,
    pub label_cost: &'static str,
    pub label_processing_time: &'static str,
    pub generated_by: &'static str,
    pub copyright_line: &'static str,
    pub section_summary: &'static str,
    pub section_metrics: &'static str,
    pub detailed_metrics: &'static str,
    pub section_recommendations: &'static str,
    pub section_swot: &'static str,
    pub section_next_steps: &'static str,
    pub metric_overall_score: &'static str,
    pub metric_growth_potential: &'static str,
    pub metric_risk_level: &'static str,
    pub swot_strengths: &'static str,
    pub swot_weaknesses: &'static str,
    pub swot_opportunities: &'static str,
    pub swot_threats: &'static str,
    pub level_high: &'static str,
    pub level_medium_high: &'static str,
    pub level_medium: &'static str,
    pub level_medium_low: &'static str,
    pub level_moderate: &'static str,
    pub level_low: &'static str,
    pub confidence_high: &'static str,
    pub confidence_medium: &'static str,
    pub quality_good: &'static str,
    pub seconds_suffix: &'static str,
}

static CATALOG_ES: Catalog = Catalog {
    report_title: "REPORTE DE ANÁLISIS EMPRESARIAL",
    label_company: "Empresa:",
    label_industry: "Industria:",
    label_location: "Ubicación:",
    label_analysis_type: "Tipo de Análisis:",
    label_date: "Fecha de Análisis:",
    label_cost: "Costo del Análisis:",
    label_processing_time: "Tiempo de Procesamiento:",
    generated_by: "Generado por AgentFlow Manager",
    copyright_line: "© 2025 AgentFlow Manager - Todos los derechos reservados",
    section_summary: "RESUMEN EJECUTIVO",
    section_metrics: "MÉTRICAS PRINCIPALES",
    detailed_metrics: "Métricas Detalladas:",
    section_recommendations: "RECOMENDACIONES ESTRATÉGICAS",
    section_swot: "ANÁLISIS SWOT",
    section_next_steps: "PRÓXIMOS PASOS",
    metric_overall_score: "Puntuación General",
    metric_growth_potential: "Potencial de Crecimiento",
    metric_risk_level: "Nivel de Riesgo",
    swot_strengths: "FORTALEZAS",
    swot_weaknesses: "DEBILIDADES",
    swot_opportunities: "OPORTUNIDADES",
    swot_threats: "AMENAZAS",
    level_high: "Alto",
    level_medium_high: "Medio-Alto",
    level_medium: "Medio",
    level_medium_low: "Medio-Bajo",
    level_moderate: "Moderado",
    level_low: "Bajo",
    confidence_high: "Alta",
    confidence_medium: "Media",
    quality_good: "Buena",
    seconds_suffix: "segundos",
};

static CATALOG_EN: Catalog = Catalog {
    report_title: "BUSINESS ANALYSIS REPORT",
    label_company: "Company:",
    label_industry: "Industry:",
    label_location: "Location:",
    label_analysis_type: "Analysis Type:",
    label_date: "Analysis Date:",
    label_cost: "Analysis Cost:",
    label_processing_time: "Processing Time:",
    generated_by: "Generated by AgentFlow Manager",
    copyright_line: "© 2025 AgentFlow Manager - All rights reserved",
    section_summary: "EXECUTIVE SUMMARY",
    section_metrics: "KEY METRICS",
    detailed_metrics: "Detailed Metrics:",
    section_recommendations: "STRATEGIC RECOMMENDATIONS",
    section_swot: "SWOT ANALYSIS",
    section_next_steps: "NEXT STEPS",
    metric_overall_score: "Overall Score",
    metric_growth_potential: "Growth Potential",
    metric_risk_level: "Risk Level",
    swot_strengths: "STRENGTHS",
    swot_weaknesses: "WEAKNESSES",
    swot_opportunities: "OPPORTUNITIES",
    swot_threats: "THREATS",
    level_high: "High",
    level_medium_high: "Medium-High",
    level_medium: "Medium",
    level_medium_low: "Medium-Low",
    level_moderate: "Moderate",
    level_low: "Low",
    confidence_high: "High",
    confidence_medium: "Medium",
    quality_good: "Good",
    seconds_suffix: "seconds",
};

pub fn catalog(lang: Language) -> &'static Catalog {
    match lang {
        Language::Es => &CATALOG_ES,
        Language::En => &CATALOG_EN,
    }
}

/// Localized display name for a detailed-metric key. Unknown keys fall back
/// to a title-cased rendering of the key itself.
pub fn metric_label(lang: Language, key: &str) -> String {
    let known = match (lang, key) {
        (Language::Es, "digital_readiness") => Some("Preparación Digital"),
        (Language::Es, "market_position") => Some("Posición de Mercado"),
        (Language::Es, "operational_efficiency") => Some("Eficiencia Operacional"),
        (Language::Es, "financial_health") => Some("Salud Financiera"),
        (Language::Es, "scalability_index") => Some("Índice de Escalabilidad"),
        (Language::Es, "innovation_capacity") => Some("Capacidad de Innovación"),
        (Language::Es, "competitive_advantage") => Some("Ventaja Competitiva"),
        (Language::Es, "confidence") => Some("Confianza"),
        (Language::Es, "data_quality") => Some("Calidad de Datos"),
        (Language::Es, "completion_rate") => Some("Tasa de Completitud"),
        (Language::En, "digital_readiness") => Some("Digital Readiness"),
        (Language::En, "market_position") => Some("Market Position"),
        (Language::En, "operational_efficiency") => Some("Operational Efficiency"),
        (Language::En, "financial_health") => Some("Financial Health"),
        (Language::En, "scalability_index") => Some("Scalability Index"),
        (Language::En, "innovation_capacity") => Some("Innovation Capacity"),
        (Language::En, "competitive_advantage") => Some("Competitive Advantage"),
        (Language::En, "confidence") => Some("Confidence"),
        (Language::En, "data_quality") => Some("Data Quality"),
        (Language::En, "completion_rate") => Some("Completion Rate"),
        _ => None,
    };

    match known {
        Some(label) => label.to_string(),
        None => title_case(key),
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes_round_trip() {
        assert_eq!(Language::from_code("es"), Language::Es);
        assert_eq!(Language::from_code("en"), Language::En);
        assert_eq!(Language::from_code("English"), Language::En);
        assert_eq!(Language::from_code("español"), Language::Es);
        assert_eq!(Language::from_code(""), Language::Es);
        assert_eq!(Language::Es.code(), "es");
        assert_eq!(Language::En.code(), "en");
    }

    #[test]
    fn test_catalog_section_titles() {
        assert_eq!(catalog(Language::Es).section_summary, "RESUMEN EJECUTIVO");
        assert_eq!(catalog(Language::En).section_summary, "EXECUTIVE SUMMARY");
        assert_eq!(
            catalog(Language::Es).report_title,
            "REPORTE DE ANÁLISIS EMPRESARIAL"
        );
    }

    #[test]
    fn test_metric_label_known_keys() {
        assert_eq!(
            metric_label(Language::Es, "digital_readiness"),
            "Preparación Digital"
        );
        assert_eq!(
            metric_label(Language::En, "scalability_index"),
            "Scalability Index"
        );
    }

    #[test]
    fn test_metric_label_falls_back_to_title_case() {
        assert_eq!(
            metric_label(Language::Es, "custom_new_metric"),
            "Custom New Metric"
        );
        assert_eq!(metric_label(Language::En, "single"), "Single");
    }

    #[test]
    fn test_serde_wire_codes() {
        let es: Language = serde_json::from_str("\"es\"").unwrap();
        let en: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(es, Language::Es);
        assert_eq!(en, Language::En);
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
    }
}
