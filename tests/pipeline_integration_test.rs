use agentflow::backend::{BackendMode, HttpBackend};
use agentflow::{
    pricing, AnalysisEngine, AnalysisRequest, AnalysisType, AppConfig, CompanyProfile, Connector,
    FileReportStore, Language, ReportPipeline, RunLedger,
};
use anyhow::Result;
use httpmock::prelude::*;
use std::collections::HashMap;
use tempfile::TempDir;

fn retail_request() -> AnalysisRequest {
    pricing::template("retail").unwrap().to_request(Language::Es)
}

fn store_in(dir: &TempDir) -> FileReportStore {
    FileReportStore::new(dir.path(), "Analisis_Empresarial")
}

#[tokio::test]
async fn test_end_to_end_simulated_analysis() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = store_in(&temp_dir);
    let ledger = RunLedger::for_reports_dir(temp_dir.path());

    let pipeline = ReportPipeline::new(Connector::simulation_only(), store, retail_request())
        .with_ledger(ledger.clone());
    let engine = AnalysisEngine::new_with_monitoring(pipeline, false);

    // A PDF landed in the reports directory
    let report_file = engine.run().await?;
    assert!(report_file.starts_with("Analisis_Empresarial_"));
    assert!(report_file.ends_with(".pdf"));

    let full_path = temp_dir.path().join(&report_file);
    assert!(full_path.exists());
    let data = std::fs::read(&full_path)?;
    assert!(data.starts_with(b"%PDF-1.4"));
    assert!(data.ends_with(b"%%EOF\n"));

    // The run was accounted for
    let records = ledger.records()?;
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    assert_eq!(records[0].mode, BackendMode::Simulation);
    assert_eq!(records[0].company, "Home Value Store");
    assert_eq!(records[0].cost, 0.10);
    assert_eq!(records[0].report_file.as_deref(), Some(report_file.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_with_live_backend() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = store_in(&temp_dir);
    let ledger = RunLedger::for_reports_dir(temp_dir.path());

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "success": true,
                "analysis": "RESUMEN: La empresa muestra un desempeño sólido.\n\nRECOMENDACIONES ESTRATÉGICAS:\n1. Priorizar la expansión regional\n2. Implementar analítica de clientes",
                "source": "CrewAI Real System",
                "processing_time": 12.5,
                "estimated_cost": 0.35
            }));
    });

    let http = HttpBackend::new(&server.base_url(), 5, 1, &HashMap::new())?;
    let connector = Connector::new(Some(http), false);
    let pipeline =
        ReportPipeline::new(connector, store, retail_request()).with_ledger(ledger.clone());
    let engine = AnalysisEngine::new(pipeline);

    engine.run().await?;
    api_mock.assert();

    let records = ledger.records()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mode, BackendMode::Live);
    assert_eq!(records[0].cost, 0.35);
    // the backend's own measurement wins over the local clock
    assert_eq!(records[0].duration_seconds, 12.5);
    Ok(())
}

#[tokio::test]
async fn test_live_failure_falls_back_to_simulation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = store_in(&temp_dir);
    let ledger = RunLedger::for_reports_dir(temp_dir.path());

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(500);
    });

    let http = HttpBackend::new(&server.base_url(), 5, 1, &HashMap::new())?;
    let connector = Connector::new(Some(http), false);
    let pipeline =
        ReportPipeline::new(connector, store, retail_request()).with_ledger(ledger.clone());
    let engine = AnalysisEngine::new(pipeline);

    // Still succeeds because the connector degrades to simulation
    engine.run().await?;
    api_mock.assert();

    let records = ledger.records()?;
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    assert_eq!(records[0].mode, BackendMode::Fallback);
    Ok(())
}

#[tokio::test]
async fn test_run_wired_from_toml_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let toml_content = format!(
        r#"
[service]
name = "agentflow"
description = "test"
version = "3.1.0"

[backend]
endpoint = ""

[reports]
output_dir = "{}"
filename_prefix = "Informe_Prueba"
"#,
        output_dir.replace('\\', "/")
    );

    let config = AppConfig::from_toml_str(&toml_content)?;
    let connector = Connector::from_config(&config)?;
    let store = FileReportStore::new(config.reports_dir(), config.effective_prefix());
    let ledger = RunLedger::new(config.ledger_path());

    let request = AnalysisRequest::new(
        CompanyProfile::new("Panadería La Espiga", "Alimentación", "Sevilla"),
        AnalysisType::Complete,
    );
    let pipeline = ReportPipeline::new(connector, store, request).with_ledger(ledger.clone());
    let engine = AnalysisEngine::new(pipeline);

    let report_file = engine.run().await?;
    assert!(report_file.starts_with("Informe_Prueba_"));

    // Ledger sits next to the reports
    assert!(temp_dir.path().join("run_ledger.json").exists());
    let metrics = ledger.metrics()?;
    assert_eq!(metrics.analyses_total, 1);
    assert_eq!(metrics.cost_total, 1.0); // Complete analysis at base rate x10
    Ok(())
}

#[tokio::test]
async fn test_failed_run_is_recorded_in_ledger() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = store_in(&temp_dir);
    let ledger = RunLedger::for_reports_dir(temp_dir.path());

    let pipeline = ReportPipeline::new(Connector::simulation_only(), store, retail_request())
        .with_ledger(ledger.clone());

    // Simulate the CLI error path without going through a real failure
    let error = agentflow::AnalysisError::BackendError {
        message: "backend unreachable".to_string(),
    };
    pipeline.record_failure(&error);

    let records = ledger.records()?;
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
    assert_eq!(records[0].cost, 0.0);
    assert!(records[0].report_file.is_none());

    let metrics = ledger.metrics()?;
    assert_eq!(metrics.success_rate, 0.0);
    Ok(())
}
