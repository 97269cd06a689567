use agentflow::api::{self, AppState};
use agentflow::utils::{logger, validation::Validate};
use agentflow::{AnalysisError, AppConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init_server_logger();

    // 唯一的參數是配置檔路徑，省略時走預設
    let config_path = std::env::args().nth(1);
    let config = match AppConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ No se pudo cargar la configuración: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Sugerencia: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    let state = Arc::new(AppState::new(config)?);
    let app = api::router(state);

    info!("🚀 AgentFlow API escuchando en {}", addr);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            // 連接埠被占用視為配置錯誤，退出碼對應 Critical
            let err = AnalysisError::ConfigValidationError {
                field: "server.port".to_string(),
                message: format!("{} no disponible: {}", addr, e),
            };
            eprintln!("❌ {}", err.user_friendly_message());
            eprintln!("💡 Sugerencia: {}", err.recovery_suggestion());
            std::process::exit(3);
        }
    };
    axum::serve(listener, app).await?;

    Ok(())
}
