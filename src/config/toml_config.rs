use crate::backend::retry::DEFAULT_RETRY_ATTEMPTS;
use crate::i18n::Language;
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/agentflow.toml";
pub const DEFAULT_FILENAME_PREFIX: &str = "Analisis_Empresarial";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8501;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub reports: ReportsConfig,
    pub runtime: Option<RuntimeConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// CrewAI service base URL. Empty means no live backend is configured
    /// and every run goes through the simulation engine.
    #[serde(default)]
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub headers: Option<HashMap<String, String>>,
    pub simulation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    pub output_dir: String,
    pub filename_prefix: Option<String>,
    pub ledger_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalysisError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Load the given file, or fall back to `config/agentflow.toml`, or the
    /// built-in defaults when neither exists.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    tracing::info!("📋 Cargando configuración desde {}", DEFAULT_CONFIG_PATH);
                    Self::from_file(default_path)
                } else {
                    tracing::info!("📋 Sin archivo de configuración, usando valores por defecto");
                    Ok(Self::default())
                }
            }
        }
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 端點留空表示純模擬，不留空就必須是合法 URL
        if !self.backend.endpoint.trim().is_empty() {
            crate::utils::validation::validate_url("backend.endpoint", &self.backend.endpoint)?;
        }

        crate::utils::validation::validate_path("reports.output_dir", &self.reports.output_dir)?;

        if let Some(prefix) = &self.reports.filename_prefix {
            crate::utils::validation::validate_non_empty_string("reports.filename_prefix", prefix)?;
        }

        if let Some(timeout) = self.backend.timeout_seconds {
            crate::utils::validation::validate_range(
                "backend.timeout_seconds",
                timeout,
                1,
                3600,
            )?;
        }

        if let Some(retries) = self.backend.retry_attempts {
            crate::utils::validation::validate_range("backend.retry_attempts", retries, 1, 10)?;
        }

        if let Some(runtime) = &self.runtime {
            if let Some(language) = &runtime.language {
                let code = language.trim().to_lowercase();
                if code != "es" && code != "en" {
                    return Err(AnalysisError::InvalidConfigValueError {
                        field: "runtime.language".to_string(),
                        value: language.clone(),
                        reason: "Supported languages: es, en".to_string(),
                    });
                }
            }
        }

        if let Some(server) = &self.server {
            if let Some(port) = server.port {
                if port == 0 {
                    return Err(AnalysisError::InvalidConfigValueError {
                        field: "server.port".to_string(),
                        value: "0".to_string(),
                        reason: "Port must be between 1 and 65535".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn effective_timeout_seconds(&self) -> u64 {
        self.backend.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn effective_retry_attempts(&self) -> u32 {
        self.backend.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    pub fn effective_prefix(&self) -> &str {
        self.reports
            .filename_prefix
            .as_deref()
            .unwrap_or(DEFAULT_FILENAME_PREFIX)
    }

    pub fn reports_dir(&self) -> &str {
        &self.reports.output_dir
    }

    pub fn simulation_enabled(&self) -> bool {
        self.backend.simulation.unwrap_or(false)
    }

    pub fn language(&self) -> Language {
        self.runtime
            .as_ref()
            .and_then(|r| r.language.as_deref())
            .map(Language::from_code)
            .unwrap_or_default()
    }

    pub fn ledger_path(&self) -> PathBuf {
        match self
            .reports
            .ledger_file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
        {
            Some(file) => Path::new(&self.reports.output_dir).join(file),
            None => Path::new(&self.reports.output_dir).join(crate::ledger::DEFAULT_LEDGER_FILE),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn server_host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or(DEFAULT_SERVER_HOST)
    }

    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "agentflow".to_string(),
                description: "Sistema de análisis empresarial con IA".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            backend: BackendConfig {
                endpoint: String::new(),
                timeout_seconds: None,
                retry_attempts: None,
                headers: None,
                simulation: None,
            },
            reports: ReportsConfig {
                output_dir: "resultados".to_string(),
                filename_prefix: None,
                ledger_file: None,
            },
            runtime: None,
            monitoring: None,
            server: None,
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
