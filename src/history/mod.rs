//! Report history: the on-disk PDF store plus listing, stats and export.
//!
//! Reports land in a flat directory as `<prefix>_YYYYMMDD_HHMMSS.pdf`.
//! Listing accepts any prefix so externally produced PDFs still show up;
//! when the trailing timestamp is missing or malformed the file mtime is
//! used instead.

use crate::domain::ports::ReportStore;
use crate::utils::error::{AnalysisError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

/// One stored report as shown in the history listing.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Local>,
}

/// Aggregate numbers over the whole history directory.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub count: usize,
    pub total_bytes: u64,
    pub newest: Option<DateTime<Local>>,
}

/// Filesystem-backed report store.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    reports_dir: PathBuf,
    prefix: String,
}

impl FileReportStore {
    pub fn new(reports_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// 檔名不可帶路徑成分，避免逃出報告目錄
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(AnalysisError::ValidationError {
                message: format!("Invalid report name: {}", name),
            });
        }
        Ok(self.reports_dir.join(name))
    }

    fn next_filename(&self) -> String {
        let mut stamp = Local::now();
        loop {
            let name = format!("{}_{}.pdf", self.prefix, stamp.format("%Y%m%d_%H%M%S"));
            if !self.reports_dir.join(&name).exists() {
                return name;
            }
            // 同一秒內的第二份報告往後推一秒
            stamp += chrono::Duration::seconds(1);
        }
    }

    fn scan(&self) -> Result<Vec<ReportEntry>> {
        if !self.reports_dir.exists() {
            return Ok(Vec::new());
        }

        let mut found: Vec<(std::time::SystemTime, ReportEntry)> = Vec::new();
        for entry in fs::read_dir(&self.reports_dir)? {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;
            if !metadata.is_file() || path.extension().and_then(|e| e.to_str()) != Some("pdf") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let modified = metadata.modified()?;
            let created_at = parse_stamp(filename)
                .and_then(|naive| Local.from_local_datetime(&naive).single())
                .unwrap_or_else(|| DateTime::<Local>::from(modified));

            found.push((
                modified,
                ReportEntry {
                    filename: filename.to_string(),
                    size_bytes: metadata.len(),
                    created_at,
                },
            ));
        }

        // 依照修改時間由新到舊排序
        found.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(found.into_iter().map(|(_, entry)| entry).collect())
    }

    pub fn stats(&self) -> Result<HistoryStats> {
        let entries = self.scan()?;
        Ok(HistoryStats {
            count: entries.len(),
            total_bytes: entries.iter().map(|e| e.size_bytes).sum(),
            newest: entries.first().map(|e| e.created_at),
        })
    }

    /// Bundle every stored PDF plus an `index.json` manifest into a ZIP.
    pub fn export_zip(&self) -> Result<Vec<u8>> {
        let entries = self.scan()?;
        tracing::debug!("Creating ZIP export with {} reports", entries.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for entry in &entries {
                zip.start_file::<_, ()>(entry.filename.as_str(), FileOptions::default())?;
                let data = fs::read(self.reports_dir.join(&entry.filename))?;
                zip.write_all(&data)?;
            }

            zip.start_file::<_, ()>("index.json", FileOptions::default())?;
            let index = serde_json::to_string_pretty(&entries)?;
            zip.write_all(index.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        Ok(zip_data)
    }

    /// CSV listing of the history, newest first.
    pub fn export_csv_index(&self) -> Result<String> {
        let entries = self.scan()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["filename", "size_kb", "created_at"])?;
        for entry in &entries {
            writer.write_record([
                entry.filename.clone(),
                format!("{:.1}", entry.size_bytes as f64 / 1024.0),
                entry.created_at.to_rfc3339(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AnalysisError::ProcessingError {
                message: format!("CSV export failed: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| AnalysisError::ProcessingError {
            message: format!("CSV export produced invalid UTF-8: {}", e),
        })
    }
}

impl ReportStore for FileReportStore {
    async fn save_report(&self, data: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.reports_dir)?;
        let filename = self.next_filename();
        let path = self.reports_dir.join(&filename);
        fs::write(&path, data)?;
        tracing::info!("✅ PDF guardado en: {}", path.display());
        Ok(path)
    }

    async fn read_report(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(AnalysisError::ReportNotFound {
                name: name.to_string(),
            });
        }
        Ok(fs::read(path)?)
    }

    async fn list_reports(&self) -> Result<Vec<ReportEntry>> {
        self.scan()
    }

    async fn delete_report(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(AnalysisError::ReportNotFound {
                name: name.to_string(),
            });
        }
        fs::remove_file(path)?;
        tracing::info!("🗑️ Reporte eliminado: {}", name);
        Ok(())
    }

    async fn clear_reports(&self) -> Result<usize> {
        let entries = self.scan()?;
        let mut removed = 0;
        for entry in &entries {
            fs::remove_file(self.reports_dir.join(&entry.filename))?;
            removed += 1;
        }
        tracing::info!("🗑️ Historial limpiado: {} reportes eliminados", removed);
        Ok(removed)
    }
}

/// Parse the trailing `YYYYMMDD_HHMMSS` stamp of a report filename,
/// whatever the prefix in front of it.
fn parse_stamp(filename: &str) -> Option<NaiveDateTime> {
    let stem = filename.strip_suffix(".pdf")?;
    let (rest, time_part) = stem.rsplit_once('_')?;
    let (_, date_part) = rest.rsplit_once('_')?;

    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if time_part.len() != 6 || !time_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    NaiveDateTime::parse_from_str(&format!("{}{}", date_part, time_part), "%Y%m%d%H%M%S").ok()
}
