use crate::backend::Connector;
use crate::config::AppConfig;
use crate::history::FileReportStore;
use crate::ledger::RunLedger;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Shared state of the HTTP service.
pub struct AppState {
    pub config: AppConfig,
    pub store: FileReportStore,
    pub ledger: RunLedger,
    pub connector: Connector,
    pub monitor: SystemMonitor,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = FileReportStore::new(config.reports_dir(), config.effective_prefix());
        let ledger = RunLedger::new(config.ledger_path());
        let connector = Connector::from_config(&config)?;
        let monitor = SystemMonitor::new(config.monitoring_enabled());

        Ok(Self {
            store,
            ledger,
            connector,
            monitor,
            started: Instant::now(),
            config,
        })
    }
}
