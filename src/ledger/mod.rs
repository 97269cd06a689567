//! Run ledger: JSON-file accounting of every analysis run.
//!
//! One entry per run, appended after the report is stored. Metrics are
//! computed from the recorded entries instead of being invented at
//! display time.

use crate::backend::BackendMode;
use crate::domain::model::AnalysisType;
use crate::i18n::Language;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_LEDGER_FILE: &str = "run_ledger.json";

/// One finished (or failed) analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub company: String,
    pub analysis_type: AnalysisType,
    pub language: Language,
    pub mode: BackendMode,
    pub cost: f64,
    pub duration_seconds: f64,
    pub success: bool,
    pub report_file: Option<String>,
}

impl RunRecord {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerState {
    runs: Vec<RunRecord>,
}

/// Metrics derived from the ledger. "Today" is the current UTC date.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerMetrics {
    pub analyses_total: usize,
    pub analyses_today: usize,
    pub success_rate: f64,
    pub average_duration_seconds: f64,
    pub cost_total: f64,
    pub cost_today: f64,
    pub cost_by_type: BTreeMap<String, f64>,
}

/// Append-only accounting file next to the stored reports.
#[derive(Debug, Clone)]
pub struct RunLedger {
    path: PathBuf,
}

impl RunLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_reports_dir(reports_dir: impl AsRef<Path>) -> Self {
        Self::new(reports_dir.as_ref().join(DEFAULT_LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LedgerState> {
        if !self.path.exists() {
            tracing::debug!("No existing run ledger at {}, starting empty", self.path.display());
            return Ok(LedgerState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let state: LedgerState = serde_json::from_str(&content)?;
        Ok(state)
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn append(&self, record: RunRecord) -> Result<()> {
        let mut state = self.load()?;
        state.runs.push(record);
        self.save(&state)?;
        tracing::debug!("Run ledger now holds {} entries", state.runs.len());
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<RunRecord>> {
        Ok(self.load()?.runs)
    }

    pub fn metrics(&self) -> Result<LedgerMetrics> {
        let records = self.records()?;
        Ok(compute_metrics(&records, Utc::now().date_naive()))
    }
}

fn compute_metrics(records: &[RunRecord], today: NaiveDate) -> LedgerMetrics {
    let analyses_total = records.len();
    let todays: Vec<&RunRecord> = records
        .iter()
        .filter(|r| r.timestamp.date_naive() == today)
        .collect();

    let successes = records.iter().filter(|r| r.success).count();
    let success_rate = if analyses_total == 0 {
        0.0
    } else {
        successes as f64 * 100.0 / analyses_total as f64
    };
    let average_duration_seconds = if analyses_total == 0 {
        0.0
    } else {
        records.iter().map(|r| r.duration_seconds).sum::<f64>() / analyses_total as f64
    };

    let mut cost_by_type = BTreeMap::new();
    for record in records {
        *cost_by_type
            .entry(record.analysis_type.code().to_string())
            .or_insert(0.0) += record.cost;
    }

    LedgerMetrics {
        analyses_total,
        analyses_today: todays.len(),
        success_rate,
        average_duration_seconds,
        cost_total: records.iter().map(|r| r.cost).sum(),
        cost_today: todays.iter().map(|r| r.cost).sum(),
        cost_by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(timestamp: DateTime<Utc>, analysis_type: AnalysisType, cost: f64, success: bool) -> RunRecord {
        RunRecord {
            id: RunRecord::new_id(),
            timestamp,
            company: "Ferretería El Tornillo Feliz".to_string(),
            analysis_type,
            language: Language::Es,
            mode: BackendMode::Simulation,
            cost,
            duration_seconds: 6.0,
            success,
            report_file: Some("Analisis_Empresarial_20250315_103000.pdf".to_string()),
        }
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = RunLedger::new(temp.path().join("no_existe.json"));
        assert!(ledger.records().unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_parent_and_accumulates() {
        let temp = TempDir::new().unwrap();
        let ledger = RunLedger::new(temp.path().join("resultados").join("run_ledger.json"));

        let now = Utc::now();
        ledger.append(record(now, AnalysisType::Market, 0.25, true)).unwrap();
        ledger.append(record(now, AnalysisType::Complete, 1.0, true)).unwrap();

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].analysis_type, AnalysisType::Market);
        assert_eq!(records[1].analysis_type, AnalysisType::Complete);
        assert!(ledger.path().is_file());
    }

    #[test]
    fn test_for_reports_dir_uses_default_name() {
        let ledger = RunLedger::for_reports_dir("resultados");
        assert_eq!(
            ledger.path(),
            Path::new("resultados").join(DEFAULT_LEDGER_FILE).as_path()
        );
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run_ledger.json");
        fs::write(&path, "{ esto no es json").unwrap();

        let ledger = RunLedger::new(path);
        assert!(ledger.records().is_err());
    }

    #[test]
    fn test_metrics_empty_ledger() {
        let metrics = compute_metrics(&[], Utc::now().date_naive());
        assert_eq!(metrics.analyses_total, 0);
        assert_eq!(metrics.analyses_today, 0);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.average_duration_seconds, 0.0);
        assert!(metrics.cost_by_type.is_empty());
    }

    #[test]
    fn test_metrics_split_today_from_total() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let records = vec![
            record(
                Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap(),
                AnalysisType::Market,
                0.25,
                true,
            ),
            record(
                Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap(),
                AnalysisType::Financial,
                0.5,
                true,
            ),
        ];

        let metrics = compute_metrics(&records, today);

        assert_eq!(metrics.analyses_total, 2);
        assert_eq!(metrics.analyses_today, 1);
        assert_eq!(metrics.cost_total, 0.75);
        assert_eq!(metrics.cost_today, 0.25);
    }

    #[test]
    fn test_metrics_success_rate_and_average() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
        let mut records = vec![
            record(now, AnalysisType::Market, 0.25, true),
            record(now, AnalysisType::Market, 0.25, true),
            record(now, AnalysisType::Market, 0.25, true),
            record(now, AnalysisType::Market, 0.25, false),
        ];
        records[0].duration_seconds = 4.0;
        records[1].duration_seconds = 8.0;
        records[2].duration_seconds = 6.0;
        records[3].duration_seconds = 6.0;

        let metrics = compute_metrics(&records, now.date_naive());

        assert_eq!(metrics.success_rate, 75.0);
        assert_eq!(metrics.average_duration_seconds, 6.0);
    }

    #[test]
    fn test_metrics_cost_by_type() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
        let records = vec![
            record(now, AnalysisType::Market, 0.25, true),
            record(now, AnalysisType::Market, 0.25, true),
            record(now, AnalysisType::Complete, 1.0, true),
        ];

        let metrics = compute_metrics(&records, now.date_naive());

        assert_eq!(metrics.cost_by_type.get("market"), Some(&0.5));
        assert_eq!(metrics.cost_by_type.get("complete"), Some(&1.0));
        assert_eq!(metrics.cost_by_type.len(), 2);
    }

    #[test]
    fn test_record_round_trip_preserves_mode() {
        let temp = TempDir::new().unwrap();
        let ledger = RunLedger::new(temp.path().join("run_ledger.json"));

        let mut entry = record(Utc::now(), AnalysisType::Digital, 0.9, true);
        entry.mode = BackendMode::Fallback;
        ledger.append(entry).unwrap();

        let records = ledger.records().unwrap();
        assert_eq!(records[0].mode, BackendMode::Fallback);
        assert_eq!(records[0].language, Language::Es);
    }
}
