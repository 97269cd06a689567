use crate::config::AppConfig;
use crate::domain::model::{AnalysisOutcome, AnalysisRequest};
use crate::domain::ports::AnalysisBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

pub mod http;
pub mod retry;
pub mod simulation;

pub use http::HttpBackend;
pub use simulation::SimulationBackend;

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Live,
    Simulation,
    Fallback,
}

impl BackendMode {
    pub fn code(&self) -> &'static str {
        match self {
            BackendMode::Live => "live",
            BackendMode::Simulation => "simulation",
            BackendMode::Fallback => "fallback",
        }
    }

    /// Classify a finished outcome for the run ledger.
    pub fn of_outcome(outcome: &AnalysisOutcome) -> Self {
        if outcome.fallback_reason.is_some() {
            BackendMode::Fallback
        } else if outcome.simulated {
            BackendMode::Simulation
        } else {
            BackendMode::Live
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Presence of the API keys the live system needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyStatus {
    pub openai: bool,
    pub langchain: bool,
}

impl ApiKeyStatus {
    pub fn detect() -> Self {
        Self {
            openai: env_key_present("OPENAI_API_KEY"),
            langchain: env_key_present("LANGCHAIN_API_KEY"),
        }
    }
}

fn env_key_present(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub ready: bool,
    pub mode: BackendMode,
    pub endpoint: Option<String>,
    pub version: String,
    pub api_keys: ApiKeyStatus,
}

/// Backend selector: a live HTTP backend when one is configured, the
/// simulation otherwise. A failed live run degrades to simulation instead
/// of failing the whole pipeline, recording why.
#[derive(Debug, Clone)]
pub struct Connector {
    http: Option<HttpBackend>,
    simulation: SimulationBackend,
    force_simulation: bool,
}

impl Connector {
    pub fn new(http: Option<HttpBackend>, force_simulation: bool) -> Self {
        Self {
            http,
            simulation: SimulationBackend::new(),
            force_simulation,
        }
    }

    pub fn simulation_only() -> Self {
        Self::new(None, true)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let force = config.simulation_enabled();
        let endpoint = config.backend.endpoint.trim();

        let no_headers = HashMap::new();
        let headers = config.backend.headers.as_ref().unwrap_or(&no_headers);

        let http = if endpoint.is_empty() {
            None
        } else {
            Some(HttpBackend::new(
                endpoint,
                config.effective_timeout_seconds(),
                config.effective_retry_attempts(),
                headers,
            )?)
        };

        Ok(Self::new(http, force))
    }

    fn live_backend(&self) -> Option<&HttpBackend> {
        if self.force_simulation {
            None
        } else {
            self.http.as_ref()
        }
    }
}

#[async_trait]
impl AnalysisBackend for Connector {
    async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        match self.live_backend() {
            Some(http) => {
                info!("🚀 Ejecutando análisis real con CrewAI");
                match http.run_analysis(request).await {
                    Ok(outcome) => {
                        info!("✅ Análisis CrewAI real completado exitosamente");
                        Ok(outcome)
                    }
                    Err(err) => {
                        warn!("❌ Error en CrewAI real: {}", err);
                        info!("🔄 Fallback a simulación inteligente");
                        let mut outcome = self.simulation.generate(request);
                        outcome.fallback_reason = Some(err.to_string());
                        Ok(outcome)
                    }
                }
            }
            None => {
                info!("🎭 Ejecutando simulación inteligente (CrewAI no disponible)");
                self.simulation.run_analysis(request).await
            }
        }
    }

    async fn status(&self) -> BackendStatus {
        match self.live_backend() {
            Some(http) => http.status().await,
            None => self.simulation.status().await,
        }
    }
}
