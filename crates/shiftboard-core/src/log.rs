use crate::error::Result;
use crate::paths;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Column order of the log file. Field order in [`ShiftLogEntry`] must match.
pub const LOG_HEADERS: [&str; 10] = [
    "timestamp",
    "prod_no",
    "shift_start_time",
    "shift_end_time",
    "day_plan_shift",
    "day_actual_shift",
    "day_gap_shift",
    "month_plan_at_shift_end",
    "month_actual_at_shift_end",
    "month_gap_at_shift_end",
];

// ---------------------------------------------------------------------------
// ShiftLogEntry
// ---------------------------------------------------------------------------

/// One completed shift, snapshotted at end-of-shift. Month columns are
/// month-to-date as of shift end, including the just-ended day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftLogEntry {
    pub timestamp: DateTime<Local>,
    pub prod_no: u32,
    pub shift_start_time: DateTime<Local>,
    pub shift_end_time: DateTime<Local>,
    pub day_plan_shift: i64,
    pub day_actual_shift: i64,
    pub day_gap_shift: i64,
    pub month_plan_at_shift_end: i64,
    pub month_actual_at_shift_end: i64,
    pub month_gap_at_shift_end: i64,
}

// ---------------------------------------------------------------------------
// ShiftLog
// ---------------------------------------------------------------------------

/// Append-only record of completed shifts, independent of the live state
/// store. Entries are never edited or individually deleted; the only
/// destructive operation is a bulk clear back to the header row.
#[derive(Debug, Clone)]
pub struct ShiftLog {
    path: PathBuf,
}

impl ShiftLog {
    pub fn new(root: &Path) -> Self {
        Self {
            path: paths::log_path(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }

    /// Create the log with its header row if absent or empty. Idempotent.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.needs_header() {
            self.write_header()?;
        }
        Ok(())
    }

    fn write_header(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(LOG_HEADERS)?;
        writer.flush()?;
        Ok(())
    }

    /// Append one completed shift, writing the header first when the file is
    /// new.
    pub fn append(&self, entry: &ShiftLogEntry) -> Result<()> {
        let write_header = self.needs_header();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;
        tracing::info!(line = entry.prod_no, "shift logged");
        Ok(())
    }

    /// Truncate all entries, leaving only the header row.
    pub fn clear(&self) -> Result<()> {
        self.write_header()
    }

    /// Bulk read of every logged shift, oldest first.
    pub fn read_all(&self) -> Result<Vec<ShiftLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();
        for row in reader.deserialize() {
            entries.push(row?);
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(prod_no: u32, actual: i64) -> ShiftLogEntry {
        let start = Local.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2026, 8, 3, 14, 0, 0).unwrap();
        ShiftLogEntry {
            timestamp: end,
            prod_no,
            shift_start_time: start,
            shift_end_time: end,
            day_plan_shift: 100,
            day_actual_shift: actual,
            day_gap_shift: 100 - actual,
            month_plan_at_shift_end: 100,
            month_actual_at_shift_end: actual,
            month_gap_at_shift_end: 100 - actual,
        }
    }

    #[test]
    fn append_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        log.append(&entry(1, 42)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), LOG_HEADERS.join(","));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        log.append(&entry(1, 42)).unwrap();
        log.append(&entry(2, 90)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("prod_no").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn read_all_roundtrips() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        log.append(&entry(1, 42)).unwrap();
        log.append(&entry(3, 7)).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries, vec![entry(1, 42), entry(3, 7)]);
    }

    #[test]
    fn clear_truncates_to_header_only() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        log.append(&entry(1, 42)).unwrap();
        log.append(&entry(2, 90)).unwrap();

        log.clear().unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.trim_end(), LOG_HEADERS.join(","));
        assert!(log.read_all().unwrap().is_empty());

        // Still appendable afterwards.
        log.append(&entry(2, 5)).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn ensure_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        log.ensure_exists().unwrap();
        log.append(&entry(1, 10)).unwrap();
        log.ensure_exists().unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn read_all_on_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = ShiftLog::new(dir.path());
        assert!(log.read_all().unwrap().is_empty());
    }
}
