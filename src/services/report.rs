//! Run reports: console summary and CSV exports.
//!
//! Export failures are logged and returned in the [`ReportOutcome`]; they
//! never prevent the console summary from being printed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::aggregate::{group, Aggregation, DATE_LABEL_FORMAT};
use crate::error::PollError;
use crate::models::LookupResult;
use crate::utils::plural;

pub const RAW_HEADERS: [&str; 4] = ["Date", "Unix Time", "Type", "Case Number"];
pub const GROUPED_HEADERS: [&str; 4] = ["Date", "Unix Time", "Type", "Applications"];

/// Write the chronological summary: one line per day, then one indented
/// line per status seen that day, then totals per status.
pub fn write_summary<W: Write>(aggregation: &Aggregation<'_>, out: &mut W) -> io::Result<()> {
    for (day, entries) in aggregation.by_day() {
        writeln!(out, "{}", day.format(DATE_LABEL_FORMAT))?;
        for (key, bucket) in entries {
            writeln!(out, "    {}: {}", key.status, bucket.count)?;
        }
    }

    if aggregation.is_empty() {
        writeln!(out, "No results collected.")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Totals")?;
    for (status, count) in aggregation.status_totals() {
        writeln!(out, "    {}: {}", status, count)?;
    }
    writeln!(out, "{}", plural(aggregation.total(), "case"))?;
    Ok(())
}

/// Per-case rows sorted by timestamp ascending.
pub fn write_raw_csv<W: Write>(results: &[LookupResult], out: W) -> Result<(), csv::Error> {
    let mut rows: Vec<&LookupResult> = results.iter().collect();
    rows.sort_by_key(|r| r.occurred_at);

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(RAW_HEADERS)?;
    for r in rows {
        writer.write_record([
            r.occurred_at.format(DATE_LABEL_FORMAT).to_string(),
            r.occurred_at.timestamp().to_string(),
            r.status.to_string(),
            r.id.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Per-bucket rows sorted by timestamp ascending.
pub fn write_grouped_csv<W: Write>(
    aggregation: &Aggregation<'_>,
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(GROUPED_HEADERS)?;
    for (key, bucket) in aggregation.iter() {
        writer.write_record([
            key.date_label(),
            bucket.unix_time().to_string(),
            key.status.to_string(),
            bucket.count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn export_to(
    path: &Path,
    write: impl FnOnce(std::fs::File) -> Result<(), csv::Error>,
) -> Result<(), PollError> {
    let result = std::fs::File::create(path)
        .map_err(csv::Error::from)
        .and_then(write);
    result.map_err(|source| PollError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// What the reporter managed to write.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub raw_written: Option<PathBuf>,
    pub grouped_written: Option<PathBuf>,
    pub failures: Vec<PollError>,
}

/// Renders a run's results to the console and export files.
#[derive(Debug, Clone)]
pub struct Reporter {
    raw_output: PathBuf,
    grouped_output: Option<PathBuf>,
}

impl Reporter {
    pub fn new(raw_output: PathBuf, grouped_output: Option<PathBuf>) -> Self {
        Self {
            raw_output,
            grouped_output,
        }
    }

    /// Aggregate `results`, print the summary to `console`, write exports.
    pub fn report<W: Write>(&self, results: &[LookupResult], console: &mut W) -> ReportOutcome {
        let aggregation = group(results);
        let mut outcome = ReportOutcome::default();

        match export_to(&self.raw_output, |f| write_raw_csv(results, f)) {
            Ok(()) => {
                info!("Wrote {} rows to {}", results.len(), self.raw_output.display());
                outcome.raw_written = Some(self.raw_output.clone());
            }
            Err(e) => {
                error!("{}", e);
                outcome.failures.push(e);
            }
        }

        if let Some(path) = &self.grouped_output {
            match export_to(path, |f| write_grouped_csv(&aggregation, f)) {
                Ok(()) => {
                    info!("Wrote {} groups to {}", aggregation.len(), path.display());
                    outcome.grouped_written = Some(path.clone());
                }
                Err(e) => {
                    error!("{}", e);
                    outcome.failures.push(e);
                }
            }
        }

        if let Err(e) = write_summary(&aggregation, console) {
            error!("Failed to print summary: {}", e);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{CaseStatus, Identifier};

    fn result(id: &str, status: CaseStatus, d: u32, h: u32) -> LookupResult {
        LookupResult {
            id: Identifier::from(id),
            status,
            occurred_at: Utc.with_ymd_and_hms(2023, 2, d, h, 0, 0).unwrap(),
            raw_heading: String::new(),
            raw_text: String::new(),
        }
    }

    fn sample() -> Vec<LookupResult> {
        vec![
            result("IOE3", CaseStatus::CardIssued, 9, 0),
            result("IOE1", CaseStatus::ReceiptNotice, 1, 0),
            result("IOE2", CaseStatus::CardIssued, 9, 0),
            result("IOE4", CaseStatus::BiometricsScheduled, 9, 0),
        ]
    }

    #[test]
    fn test_summary_lines() {
        let results = sample();
        let mut out = Vec::new();
        write_summary(&group(&results), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "February 1, 2023\n\
             \x20   RECEIPT_NOTICE: 1\n\
             February 9, 2023\n\
             \x20   BIOMETRICS_SCHEDULED: 1\n\
             \x20   CARD_ISSUED: 2\n\
             \n\
             Totals\n\
             \x20   BIOMETRICS_SCHEDULED: 1\n\
             \x20   RECEIPT_NOTICE: 1\n\
             \x20   CARD_ISSUED: 2\n\
             4 cases\n"
        );
    }

    #[test]
    fn test_summary_for_empty_run() {
        let mut out = Vec::new();
        write_summary(&group(&[]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No results collected.\n");
    }

    #[test]
    fn test_raw_csv_sorted_by_time() {
        let results = sample();
        let mut out = Vec::new();
        write_raw_csv(&results, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Unix Time,Type,Case Number");
        assert_eq!(lines[1], "\"February 1, 2023\",1675209600,RECEIPT_NOTICE,IOE1");
        assert_eq!(lines.len(), 5);
        assert!(lines[2].ends_with("CARD_ISSUED,IOE3"));
    }

    #[test]
    fn test_grouped_csv() {
        let results = sample();
        let mut out = Vec::new();
        write_grouped_csv(&group(&results), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Unix Time,Type,Applications");
        assert_eq!(lines[1], "\"February 1, 2023\",1675209600,RECEIPT_NOTICE,1");
        assert_eq!(lines[2], "\"February 9, 2023\",1675900800,BIOMETRICS_SCHEDULED,1");
        assert_eq!(lines[3], "\"February 9, 2023\",1675900800,CARD_ISSUED,2");
    }

    #[test]
    fn test_report_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        let grouped = dir.path().join("grouped.csv");
        let reporter = Reporter::new(raw.clone(), Some(grouped.clone()));

        let mut console = Vec::new();
        let outcome = reporter.report(&sample(), &mut console);

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.raw_written, Some(raw.clone()));
        assert_eq!(outcome.grouped_written, Some(grouped.clone()));
        assert_eq!(std::fs::read_to_string(&raw).unwrap().lines().count(), 5);
        assert_eq!(std::fs::read_to_string(&grouped).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_write_failure_still_prints_summary() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("missing-dir").join("raw.csv");
        let reporter = Reporter::new(raw, None);

        let mut console = Vec::new();
        let outcome = reporter.report(&sample(), &mut console);

        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], PollError::OutputWrite { .. }));
        assert!(outcome.raw_written.is_none());
        assert!(String::from_utf8(console).unwrap().contains("4 cases"));
    }
}
