use agentflow::config::RequestFile;
use agentflow::utils::{logger, validation::Validate};
use agentflow::{
    pricing, AnalysisEngine, AnalysisRequest, AppConfig, CliArgs, Connector, FileReportStore,
    Language, ReportPipeline, RunLedger,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Iniciando AgentFlow Manager");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入 TOML 配置
    let config = match AppConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ No se pudo cargar la configuración: {}", e);
            eprintln!("💡 Verifica que el archivo exista y sea TOML válido");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 建立分析請求：請求檔優先，否則使用內建範本
    let request = match build_request(&args, &config) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Sugerencia: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    display_run_summary(&config, &request, &args);

    if args.dry_run {
        perform_dry_run(&request);
        return Ok(());
    }

    let monitor_enabled = args.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 組裝後端、存儲與管道
    let connector = if args.simulate {
        tracing::info!("🎭 Modo simulación forzado por línea de comandos");
        Connector::simulation_only()
    } else {
        Connector::from_config(&config)?
    };
    let store = FileReportStore::new(config.reports_dir(), config.effective_prefix());
    let ledger = RunLedger::new(config.ledger_path());
    let pipeline = ReportPipeline::new(connector, store, request).with_ledger(ledger);

    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report_file) => {
            tracing::info!("✅ Análisis completado exitosamente!");
            tracing::info!("📁 Reporte guardado como: {}", report_file);
            println!("✅ Análisis completado exitosamente!");
            println!("📁 Reporte guardado como: {}", report_file);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Análisis fallido: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 失敗也要進帳本，歷史頁才算得出成功率
            engine.pipeline().record_failure(&e);

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Sugerencia: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                agentflow::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                agentflow::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                agentflow::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                agentflow::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn build_request(args: &CliArgs, config: &AppConfig) -> agentflow::Result<AnalysisRequest> {
    let language = args
        .language
        .as_deref()
        .map(Language::from_code)
        .unwrap_or_else(|| config.language());

    if let Some(path) = &args.request {
        tracing::info!("📋 Cargando solicitud desde: {}", path);
        let file = RequestFile::from_file(path)?;
        let mut request = file.to_request()?;
        if args.language.is_some() {
            request.language = language;
        }
        return Ok(request);
    }

    let key = args.template.as_deref().unwrap_or("retail");
    let template =
        pricing::template(key).ok_or_else(|| agentflow::AnalysisError::ValidationError {
            message: format!(
                "plantilla desconocida: '{}' (usa retail, tech o finance)",
                key
            ),
        })?;

    if args.template.is_none() {
        tracing::info!("📋 Sin solicitud indicada, usando plantilla de ejemplo: retail");
    }
    Ok(template.to_request(language))
}

fn display_run_summary(config: &AppConfig, request: &AnalysisRequest, args: &CliArgs) {
    println!("📋 Resumen de ejecución:");
    println!(
        "  Servicio: {} v{}",
        config.service.name, config.service.version
    );

    let endpoint = config.backend.endpoint.trim();
    if endpoint.is_empty() || args.simulate {
        println!("  Backend: simulación integrada");
    } else {
        println!("  Backend: {}", endpoint);
    }

    println!("  Empresa: {}", request.company.name);
    println!(
        "  Análisis: {}",
        request.analysis_type.display_name(request.language)
    );
    println!("  Idioma: {}", request.language.code());
    println!("  Reportes: {}", config.reports_dir());

    if args.dry_run {
        println!("  🔍 MODO DRY RUN ACTIVADO");
    }

    println!();
}

fn perform_dry_run(request: &AnalysisRequest) {
    let estimate = pricing::estimate(request.analysis_type);
    let real = pricing::real_cost(request.analysis_type, &request.company);

    println!("🔍 Estimación (sin ejecutar):");
    println!();
    println!(
        "  Tiempo estimado: {}-{} min",
        estimate.time_min, estimate.time_max
    );
    println!(
        "  Costo estimado: ${:.2}-${:.2}",
        estimate.cost_min, estimate.cost_max
    );
    println!(
        "  Páginas esperadas: {}-{}",
        estimate.pages_min, estimate.pages_max
    );
    println!("  Costo real a cobrar: ${:.2}", real);
    println!();
    println!("✅ Estimación completa. Ejecuta sin --dry-run para generar el reporte.");
}
