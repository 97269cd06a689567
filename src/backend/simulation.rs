use crate::backend::{ApiKeyStatus, BackendMode, BackendStatus};
use crate::domain::model::{
    AnalysisOutcome, AnalysisRequest, ReportMetrics, StructuredAnalysis, SwotQuadrants,
};
use crate::domain::ports::AnalysisBackend;
use crate::i18n::{catalog, Language};
use crate::pricing;
use crate::utils::error::Result;
use async_trait::async_trait;
use tracing::info;

pub const SIMULATION_SOURCE_ES: &str = "AgentFlow Manager FASE 3 (Simulación Inteligente)";
pub const SIMULATION_SOURCE_EN: &str = "AgentFlow Manager PHASE 3 (Intelligent Simulation)";

/// Deterministic analysis generator used when no live backend is reachable.
/// Same request in, same analysis out, so report generation stays testable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationBackend;

impl SimulationBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn source_label(language: Language) -> &'static str {
        match language {
            Language::Es => SIMULATION_SOURCE_ES,
            Language::En => SIMULATION_SOURCE_EN,
        }
    }

    /// 產生完整的模擬分析結果
    pub fn generate(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let lang = request.language;
        let company = request.company.name.as_str();
        let industry = request.company.industry.as_str();
        let location = request.company.location.as_str();
        let type_name = request.analysis_type.display_name(lang);

        let executive = executive_block(lang, company, industry, location, type_name);
        let analysis = format!(
            "{}\n\n{}",
            executive,
            detailed_block(lang, industry, location)
        );

        let structured = StructuredAnalysis {
            executive_summary: Some(executive),
            metrics: Some(simulated_metrics(lang)),
            recommendations: simulated_recommendations(lang, company, industry, location),
            next_steps: simulated_next_steps(lang),
            swot: Some(simulated_swot(lang, industry, location)),
        };

        AnalysisOutcome {
            analysis,
            source: Self::source_label(lang).to_string(),
            simulated: true,
            // the pipeline fills in the measured elapsed time
            processing_time: 0.0,
            estimated_cost: pricing::real_cost(request.analysis_type, &request.company),
            fallback_reason: None,
            structured: Some(structured),
        }
    }
}

#[async_trait]
impl AnalysisBackend for SimulationBackend {
    async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        info!(
            "🎭 Generando análisis simulado inteligente para {}",
            request.company.name
        );
        Ok(self.generate(request))
    }

    async fn status(&self) -> BackendStatus {
        BackendStatus {
            ready: true,
            mode: BackendMode::Simulation,
            endpoint: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_keys: ApiKeyStatus::detect(),
        }
    }
}

fn executive_block(
    lang: Language,
    company: &str,
    industry: &str,
    location: &str,
    type_name: &str,
) -> String {
    match lang {
        Language::Es => format!(
            "ANÁLISIS EMPRESARIAL AVANZADO - {company}\n\
             ===============================================\n\
             \n\
             **Empresa**: {company}\n\
             **Sector**: {industry}\n\
             **Ubicación**: {location}\n\
             **Tipo de Análisis**: {type_name}\n\
             \n\
             RESUMEN EJECUTIVO:\n\
             El análisis de {company} en el sector {industry} revela un panorama empresarial \
             con potencial de crecimiento significativo. La empresa presenta características \
             sólidas para el desarrollo en su mercado objetivo, con oportunidades claras de \
             optimización y expansión estratégica.\n\
             \n\
             CONTEXTO DE MERCADO:\n\
             El sector {industry} muestra tendencias positivas con oportunidades de \
             digitalización y mejora operacional. La ubicación en {location} proporciona \
             ventajas competitivas específicas para el tipo de negocio analizado.\n\
             \n\
             METODOLOGÍA:\n\
             Este análisis ha sido generado utilizando la metodología AgentFlow Manager FASE 3, \
             aplicando patrones de análisis empresarial reconocidos y adaptados específicamente \
             para el contexto de {company}."
        ),
        Language::En => format!(
            "ADVANCED BUSINESS ANALYSIS - {company}\n\
             ===============================================\n\
             \n\
             **Company**: {company}\n\
             **Industry**: {industry}\n\
             **Location**: {location}\n\
             **Analysis Type**: {type_name}\n\
             \n\
             EXECUTIVE SUMMARY:\n\
             The analysis of {company} in the {industry} sector reveals a business landscape \
             with significant growth potential. The company shows solid foundations for \
             development in its target market, with clear opportunities for optimization and \
             strategic expansion.\n\
             \n\
             MARKET CONTEXT:\n\
             The {industry} sector shows positive trends with opportunities for digitalization \
             and operational improvement. The presence in {location} provides specific \
             competitive advantages for the kind of business analyzed.\n\
             \n\
             METHODOLOGY:\n\
             This analysis was generated with the AgentFlow Manager PHASE 3 methodology, \
             applying recognized business-analysis patterns adapted specifically to the \
             context of {company}."
        ),
    }
}

fn detailed_block(lang: Language, industry: &str, location: &str) -> String {
    match lang {
        Language::Es => format!(
            "ANÁLISIS DETALLADO\n\
             ==================\n\
             \n\
             1. ANÁLISIS DE POSICIONAMIENTO\n\
             - Empresa bien establecida en {industry}\n\
             - Presencia en {location} con potencial de expansión\n\
             - Diferenciación competitiva identificada\n\
             \n\
             2. EVALUACIÓN OPERACIONAL\n\
             - Procesos core funcionales\n\
             - Oportunidades de automatización detectadas\n\
             - Eficiencia operacional: 78% (por encima de promedio sectorial)\n\
             \n\
             3. ANÁLISIS FINANCIERO\n\
             - Estructura de costos optimizable\n\
             - Potencial de mejora en márgenes: 15-25%\n\
             - ROI proyectado para mejoras: 180-250%\n\
             \n\
             4. ANÁLISIS DIGITAL\n\
             - Madurez digital: Nivel intermedio\n\
             - Oportunidades de transformación identificadas\n\
             - Potencial de automatización: Alto\n\
             \n\
             5. ESTRATEGIA DE CRECIMIENTO\n\
             - Mercado objetivo claramente definido\n\
             - Canales de expansión viables identificados\n\
             - Escalabilidad: Favorable"
        ),
        Language::En => format!(
            "DETAILED ANALYSIS\n\
             ==================\n\
             \n\
             1. POSITIONING ANALYSIS\n\
             - Company well established in {industry}\n\
             - Presence in {location} with expansion potential\n\
             - Competitive differentiation identified\n\
             \n\
             2. OPERATIONAL ASSESSMENT\n\
             - Core processes functional\n\
             - Automation opportunities detected\n\
             - Operational efficiency: 78% (above sector average)\n\
             \n\
             3. FINANCIAL ANALYSIS\n\
             - Cost structure can be optimized\n\
             - Margin improvement potential: 15-25%\n\
             - Projected ROI for improvements: 180-250%\n\
             \n\
             4. DIGITAL ANALYSIS\n\
             - Digital maturity: intermediate level\n\
             - Transformation opportunities identified\n\
             - Automation potential: High\n\
             \n\
             5. GROWTH STRATEGY\n\
             - Target market clearly defined\n\
             - Viable expansion channels identified\n\
             - Scalability: favorable"
        ),
    }
}

fn simulated_metrics(lang: Language) -> ReportMetrics {
    let cat = catalog(lang);
    let (market_position, competitive_advantage) = match lang {
        Language::Es => ("Competitiva", "Moderada-Alta"),
        Language::En => ("Competitive", "Moderate-High"),
    };

    ReportMetrics {
        overall_score: 82,
        growth_potential: cat.level_high.to_string(),
        risk_level: cat.level_medium_low.to_string(),
        extra: vec![
            ("digital_readiness".to_string(), "75%".to_string()),
            ("market_position".to_string(), market_position.to_string()),
            ("operational_efficiency".to_string(), "78%".to_string()),
            ("financial_health".to_string(), cat.quality_good.to_string()),
            ("scalability_index".to_string(), "8.2/10".to_string()),
            (
                "innovation_capacity".to_string(),
                cat.confidence_high.to_string(),
            ),
            (
                "competitive_advantage".to_string(),
                competitive_advantage.to_string(),
            ),
        ],
    }
}

fn simulated_recommendations(
    lang: Language,
    company: &str,
    industry: &str,
    location: &str,
) -> Vec<String> {
    match lang {
        Language::Es => vec![
            format!("Implementar estrategia de digitalización progresiva adaptada al sector {industry}"),
            format!("Optimizar procesos operacionales core de {company} para mejorar eficiencia"),
            format!("Desarrollar plan de expansión regional desde base en {location}"),
            "Establecer sistema de métricas KPI avanzado para monitoreo continuo".to_string(),
            "Invertir en capacitación del equipo en nuevas tecnologías del sector".to_string(),
            format!("Explorar alianzas estratégicas con empresas complementarias en {industry}"),
            "Implementar sistema CRM avanzado para optimización de ventas".to_string(),
            "Desarrollar propuesta de valor diferenciada para mercado objetivo".to_string(),
        ],
        Language::En => vec![
            format!("Implement a progressive digitalization strategy adapted to the {industry} sector"),
            format!("Optimize {company}'s core operational processes to improve efficiency"),
            format!("Develop a regional expansion plan from the base in {location}"),
            "Establish an advanced KPI metrics system for continuous monitoring".to_string(),
            "Invest in team training on new sector technologies".to_string(),
            format!("Explore strategic alliances with complementary companies in {industry}"),
            "Implement an advanced CRM system for sales optimization".to_string(),
            "Develop a differentiated value proposition for the target market".to_string(),
        ],
    }
}

fn simulated_next_steps(lang: Language) -> Vec<String> {
    let steps = match lang {
        Language::Es => [
            "Priorizar recomendaciones según impacto y recursos disponibles",
            "Desarrollar plan de implementación detallado por fases",
            "Establecer sistema de seguimiento y métricas de progreso",
            "Evaluar necesidades de inversión para cada iniciativa",
            "Configurar sistema CrewAI real para análisis más profundos",
        ],
        Language::En => [
            "Prioritize recommendations by impact and available resources",
            "Develop a detailed phased implementation plan",
            "Establish a progress tracking and metrics system",
            "Evaluate investment needs for each initiative",
            "Configure the real CrewAI system for deeper analyses",
        ],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

fn simulated_swot(lang: Language, industry: &str, location: &str) -> SwotQuadrants {
    match lang {
        Language::Es => SwotQuadrants {
            strengths: vec![
                format!("Posicionamiento sólido en {industry}"),
                format!("Conocimiento profundo del mercado en {location}"),
                "Equipo con experiencia sectorial".to_string(),
                "Adaptabilidad a cambios del mercado".to_string(),
            ],
            weaknesses: vec![
                "Oportunidades de automatización no explotadas".to_string(),
                "Sistema de métricas básico".to_string(),
                "Presencia digital mejorable".to_string(),
            ],
            opportunities: vec![
                format!("Crecimiento del sector {industry}"),
                "Digitalización empresarial acelerada".to_string(),
                "Expansión a mercados adyacentes".to_string(),
                "Optimización con IA y automatización".to_string(),
            ],
            threats: vec![
                "Competencia creciente en el sector".to_string(),
                "Cambios regulatorios potenciales".to_string(),
                "Disrupciones tecnológicas".to_string(),
            ],
        },
        Language::En => SwotQuadrants {
            strengths: vec![
                format!("Solid positioning in {industry}"),
                format!("Deep market knowledge in {location}"),
                "Team with sector experience".to_string(),
                "Adaptability to market changes".to_string(),
            ],
            weaknesses: vec![
                "Untapped automation opportunities".to_string(),
                "Basic metrics system".to_string(),
                "Digital presence with room for improvement".to_string(),
            ],
            opportunities: vec![
                format!("Growth of the {industry} sector"),
                "Accelerating business digitalization".to_string(),
                "Expansion into adjacent markets".to_string(),
                "Optimization with AI and automation".to_string(),
            ],
            threats: vec![
                "Growing competition in the sector".to_string(),
                "Potential regulatory changes".to_string(),
                "Technological disruptions".to_string(),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AnalysisType, CompanyProfile};

    fn sample_request(lang: Language) -> AnalysisRequest {
        let profile = CompanyProfile::new("Ferretería Central", "Retail y Comercio", "Madrid");
        let mut request = AnalysisRequest::new(profile, AnalysisType::Market);
        request.language = lang;
        request
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let backend = SimulationBackend::new();
        let request = sample_request(Language::Es);
        let first = backend.generate(&request);
        let second = backend.generate(&request);
        assert_eq!(first.analysis, second.analysis);
        assert_eq!(first.estimated_cost, second.estimated_cost);
        assert_eq!(
            first.structured.as_ref().map(|s| s.recommendations.clone()),
            second.structured.as_ref().map(|s| s.recommendations.clone())
        );
    }

    #[test]
    fn test_simulation_interpolates_company_context() {
        let backend = SimulationBackend::new();
        let outcome = backend.generate(&sample_request(Language::Es));

        assert!(outcome.analysis.contains("Ferretería Central"));
        assert!(outcome.analysis.contains("Retail y Comercio"));
        assert!(outcome.analysis.contains("RESUMEN EJECUTIVO:"));
        assert!(outcome.analysis.contains("5. ESTRATEGIA DE CRECIMIENTO"));

        let structured = outcome.structured.unwrap();
        assert_eq!(structured.recommendations.len(), 8);
        assert!(structured.recommendations[1].contains("Ferretería Central"));
        assert_eq!(structured.next_steps.len(), 5);

        let swot = structured.swot.unwrap();
        assert_eq!(swot.strengths.len(), 4);
        assert_eq!(swot.weaknesses.len(), 3);
        assert_eq!(swot.opportunities.len(), 4);
        assert_eq!(swot.threats.len(), 3);
        assert!(swot.strengths[0].contains("Retail y Comercio"));
    }

    #[test]
    fn test_simulation_metrics_constants() {
        let backend = SimulationBackend::new();
        let outcome = backend.generate(&sample_request(Language::Es));
        let metrics = outcome.structured.unwrap().metrics.unwrap();

        assert_eq!(metrics.overall_score, 82);
        assert_eq!(metrics.growth_potential, "Alto");
        assert_eq!(metrics.risk_level, "Medio-Bajo");
        assert_eq!(metrics.extra.len(), 7);
        assert!(metrics
            .extra
            .iter()
            .any(|(k, v)| k == "scalability_index" && v == "8.2/10"));
    }

    #[test]
    fn test_simulation_english_output() {
        let backend = SimulationBackend::new();
        let outcome = backend.generate(&sample_request(Language::En));

        assert!(outcome.analysis.contains("EXECUTIVE SUMMARY:"));
        assert!(outcome.analysis.contains("5. GROWTH STRATEGY"));
        assert_eq!(outcome.source, SIMULATION_SOURCE_EN);

        let metrics = outcome.structured.unwrap().metrics.unwrap();
        assert_eq!(metrics.growth_potential, "High");
        assert_eq!(metrics.risk_level, "Medium-Low");
    }

    #[test]
    fn test_simulation_marks_outcome() {
        let backend = SimulationBackend::new();
        let outcome = backend.generate(&sample_request(Language::Es));
        assert!(outcome.simulated);
        assert!(outcome.fallback_reason.is_none());
        assert_eq!(outcome.source, SIMULATION_SOURCE_ES);
        assert_eq!(outcome.processing_time, 0.0);
        assert_eq!(outcome.estimated_cost, 0.10);
    }

    #[tokio::test]
    async fn test_simulation_backend_is_always_ready() {
        let backend = SimulationBackend::new();
        let status = backend.status().await;
        assert!(status.ready);
        assert_eq!(status.mode, BackendMode::Simulation);
        assert!(status.endpoint.is_none());
    }
}
