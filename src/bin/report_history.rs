use agentflow::domain::ports::ReportStore;
use agentflow::utils::{logger, validation::Validate};
use agentflow::{AppConfig, FileReportStore, RunLedger};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "report-history")]
#[command(about = "Historial y métricas de los reportes generados")]
struct Args {
    /// TOML config file (default: config/agentflow.toml)
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lista los reportes guardados con sus estadísticas
    List,
    /// Muestra las métricas acumuladas del libro de registros
    Metrics,
    /// Elimina un reporte por nombre
    Delete {
        name: String,
        /// Confirma la eliminación
        #[arg(long)]
        force: bool,
    },
    /// Elimina todos los reportes
    Clear {
        /// Confirma la eliminación
        #[arg(long)]
        force: bool,
    },
    /// Exporta el historial completo
    Export {
        /// Formato de exportación: zip o csv
        #[arg(long, default_value = "zip")]
        format: String,

        /// Archivo de salida (por defecto según el formato)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let config = match AppConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ No se pudo cargar la configuración: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = FileReportStore::new(config.reports_dir(), config.effective_prefix());
    let ledger = RunLedger::new(config.ledger_path());

    let result = match args.command {
        Command::List => list_reports(&store).await,
        Command::Metrics => show_metrics(&ledger),
        Command::Delete { name, force } => delete_report(&store, &name, force).await,
        Command::Clear { force } => clear_reports(&store, force).await,
        Command::Export { format, output } => export_history(&store, &format, output),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Sugerencia: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    Ok(())
}

async fn list_reports(store: &FileReportStore) -> agentflow::Result<()> {
    let reports = store.list_reports().await?;
    let stats = store.stats()?;

    if reports.is_empty() {
        println!("📭 No hay reportes generados aún");
        println!("💡 Genera tu primer análisis con el binario agentflow");
        return Ok(());
    }

    println!("📊 Estadísticas del historial:");
    println!("  Total reportes: {}", stats.count);
    println!(
        "  Espacio usado: {:.1} MB",
        stats.total_bytes as f64 / 1_048_576.0
    );
    if let Some(newest) = stats.newest {
        println!("  Último reporte: {}", newest.format("%d/%m/%Y %H:%M"));
    }
    println!();

    println!("📄 Reportes disponibles:");
    for entry in &reports {
        println!(
            "  {}  {:>8.1} KB  {}",
            entry.created_at.format("%d/%m/%Y %H:%M"),
            entry.size_bytes as f64 / 1024.0,
            entry.filename
        );
    }

    Ok(())
}

fn show_metrics(ledger: &RunLedger) -> agentflow::Result<()> {
    let metrics = ledger.metrics()?;

    println!("📊 Métricas de la sesión:");
    println!(
        "  Análisis hoy: {} (total: {})",
        metrics.analyses_today, metrics.analyses_total
    );
    println!("  Tasa de éxito: {:.1}%", metrics.success_rate);
    println!(
        "  Tiempo promedio: {:.1}s",
        metrics.average_duration_seconds
    );
    println!(
        "  Costo hoy: ${:.2} (total: ${:.2})",
        metrics.cost_today, metrics.cost_total
    );

    if !metrics.cost_by_type.is_empty() {
        println!();
        println!("💰 Costo por tipo de análisis:");
        for (analysis_type, cost) in &metrics.cost_by_type {
            println!("  {}: ${:.2}", analysis_type, cost);
        }
    }

    Ok(())
}

async fn delete_report(store: &FileReportStore, name: &str, force: bool) -> agentflow::Result<()> {
    if !force {
        eprintln!("⚠️ Esta operación elimina '{}' permanentemente", name);
        eprintln!("💡 Repite el comando con --force para confirmar");
        std::process::exit(1);
    }

    store.delete_report(name).await?;
    println!("🗑️ Reporte eliminado: {}", name);
    Ok(())
}

async fn clear_reports(store: &FileReportStore, force: bool) -> agentflow::Result<()> {
    if !force {
        eprintln!("⚠️ Esta operación elimina TODOS los reportes permanentemente");
        eprintln!("💡 Repite el comando con --force para confirmar");
        std::process::exit(1);
    }

    let count = store.clear_reports().await?;
    println!("🗑️ Historial limpiado: {} reportes eliminados", count);
    Ok(())
}

fn export_history(
    store: &FileReportStore,
    format: &str,
    output: Option<String>,
) -> agentflow::Result<()> {
    match format {
        "zip" => {
            let data = store.export_zip()?;
            let path = output.unwrap_or_else(|| "reportes_export.zip".to_string());
            std::fs::write(&path, &data)?;
            println!("📦 Historial exportado a: {} ({} bytes)", path, data.len());
        }
        "csv" => {
            let index = store.export_csv_index()?;
            let path = output.unwrap_or_else(|| "reportes_index.csv".to_string());
            std::fs::write(&path, index)?;
            println!("📄 Índice CSV exportado a: {}", path);
        }
        other => {
            return Err(agentflow::AnalysisError::ValidationError {
                message: format!("formato desconocido: '{}' (usa zip o csv)", other),
            });
        }
    }

    Ok(())
}
