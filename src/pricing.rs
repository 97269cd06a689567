use crate::domain::model::{AnalysisRequest, AnalysisType, CompanyProfile};
use crate::i18n::Language;
use serde::Serialize;

pub const BASE_COST: f64 = 0.10;

/// Expected effort for one analysis type: wall-clock minutes, USD cost and
/// report length in pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub time_min: u32,
    pub time_max: u32,
    pub cost_min: f64,
    pub cost_max: f64,
    pub pages_min: u32,
    pub pages_max: u32,
}

/// 成本估算表
pub fn estimate(analysis_type: AnalysisType) -> CostEstimate {
    match analysis_type {
        AnalysisType::Market => CostEstimate {
            time_min: 5,
            time_max: 8,
            cost_min: 0.10,
            cost_max: 0.25,
            pages_min: 8,
            pages_max: 12,
        },
        AnalysisType::Financial => CostEstimate {
            time_min: 6,
            time_max: 10,
            cost_min: 0.15,
            cost_max: 0.40,
            pages_min: 12,
            pages_max: 18,
        },
        AnalysisType::Expansion => CostEstimate {
            time_min: 8,
            time_max: 12,
            cost_min: 0.20,
            cost_max: 0.50,
            pages_min: 15,
            pages_max: 22,
        },
        AnalysisType::Digital => CostEstimate {
            time_min: 10,
            time_max: 15,
            cost_min: 0.30,
            cost_max: 0.70,
            pages_min: 18,
            pages_max: 25,
        },
        AnalysisType::Operations => CostEstimate {
            time_min: 7,
            time_max: 11,
            cost_min: 0.25,
            cost_max: 0.60,
            pages_min: 14,
            pages_max: 20,
        },
        AnalysisType::Strategic => CostEstimate {
            time_min: 12,
            time_max: 18,
            cost_min: 0.40,
            cost_max: 0.80,
            pages_min: 20,
            pages_max: 30,
        },
        AnalysisType::Complete => CostEstimate {
            time_min: 25,
            time_max: 40,
            cost_min: 1.00,
            cost_max: 2.50,
            pages_min: 35,
            pages_max: 50,
        },
    }
}

/// Actual cost charged for a run: base rate scaled by analysis depth, with
/// a surcharge once the supplemental company context passes 500 characters.
pub fn real_cost(analysis_type: AnalysisType, profile: &CompanyProfile) -> f64 {
    let mut cost = BASE_COST;

    cost *= match analysis_type {
        AnalysisType::Complete => 10.0,
        AnalysisType::Strategic => 5.0,
        AnalysisType::Digital => 3.0,
        _ => 1.0,
    };

    if profile.supplemental_text().chars().count() > 500 {
        cost *= 1.5;
    }

    round_cents(cost)
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One of the canned showcase profiles.
#[derive(Debug, Clone, Serialize)]
pub struct ShowcaseTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub name: &'static str,
    pub industry: &'static str,
    pub location: &'static str,
    pub products: &'static str,
    pub competitors: &'static str,
    pub challenges: &'static str,
    pub goals: &'static str,
    pub analysis_type: AnalysisType,
}

impl ShowcaseTemplate {
    pub fn to_request(&self, language: Language) -> AnalysisRequest {
        let mut profile = CompanyProfile::new(self.name, self.industry, self.location);
        profile.products = Some(self.products.to_string());
        profile.competitors = Some(self.competitors.to_string());
        profile.challenges = Some(self.challenges.to_string());
        profile.goals = Some(self.goals.to_string());

        let mut request = AnalysisRequest::new(profile, self.analysis_type);
        request.language = language;
        request
    }
}

pub const TEMPLATES: [ShowcaseTemplate; 3] = [
    ShowcaseTemplate {
        key: "retail",
        label: "🏪 Retail Hardware",
        name: "Home Value Store",
        industry: "Retail y Comercio",
        location: "Estados Unidos",
        products: "Herramientas, ferretería, jardinería",
        competitors: "Home Depot, Lowe's, Menards",
        challenges: "Competencia online, costos logísticos",
        goals: "Digitalización, expansión regional",
        analysis_type: AnalysisType::Market,
    },
    ShowcaseTemplate {
        key: "tech",
        label: "🚀 Startup Tech",
        name: "TechInnovate",
        industry: "Tecnología",
        location: "Estados Unidos",
        products: "Software SaaS, consultoría IT",
        competitors: "Salesforce, Microsoft, Oracle",
        challenges: "Escalabilidad, captación clientes",
        goals: "Crecimiento 300%, Series A",
        analysis_type: AnalysisType::Digital,
    },
    ShowcaseTemplate {
        key: "finance",
        label: "🏦 Servicios Financieros",
        name: "FinanceFlow",
        industry: "Finanzas y Banca",
        location: "Estados Unidos",
        products: "Gestión patrimonial, inversiones",
        competitors: "JPMorgan Chase, Bank of America, Wells Fargo",
        challenges: "Regulación, digitalización",
        goals: "Automatización procesos, nuevos productos",
        analysis_type: AnalysisType::Financial,
    },
];

pub fn template(key: &str) -> Option<&'static ShowcaseTemplate> {
    TEMPLATES.iter().find(|t| t.key.eq_ignore_ascii_case(key))
}
