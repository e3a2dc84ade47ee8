//! Text rendering of the last-reading summary and the history list.
//!
//! Absent readings render as `--`. The blood pressure pill is the exception
//! in history rows: it is left out when neither side was recorded.

use std::fmt::Write as _;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::record::VitalRecord;

/// Placeholder shown for a missing reading.
const MISSING: &str = "--";

/// Maximum characters of notes shown in a table cell.
const TABLE_NOTES_WIDTH: usize = 30;

/// Display strings for the most recent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Temperature, e.g. `37.2 °C`.
    pub temperature: String,
    /// Blood pressure, e.g. `120/80 mmHg`.
    pub blood_pressure: String,
    /// Heart rate, e.g. `72 bpm`.
    pub heart_rate: String,
    /// When the record was taken, if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    /// Notes of the record, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Summary {
    /// Build the summary card for `record`, or the empty card for `None`.
    #[must_use]
    pub fn of(record: Option<&VitalRecord>, time_format: &str) -> Self {
        let Some(record) = record else {
            return Self {
                temperature: temperature(None),
                blood_pressure: format!("{MISSING}/{MISSING} mmHg"),
                heart_rate: heart_rate(None),
                recorded_at: None,
                notes: None,
            };
        };

        Self {
            temperature: temperature(record.temperature_c),
            blood_pressure: blood_pressure(record)
                .unwrap_or_else(|| format!("{MISSING}/{MISSING} mmHg")),
            heart_rate: heart_rate(record.heart_rate),
            recorded_at: Some(format_time(record, time_format)),
            notes: record.notes.clone(),
        }
    }

    /// Render the card as plain text.
    #[must_use]
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Last reading");
        let _ = writeln!(out, "------------");
        let _ = writeln!(out, "Temperature:    {}", self.temperature);
        let _ = writeln!(out, "Blood pressure: {}", self.blood_pressure);
        let _ = writeln!(out, "Heart rate:     {}", self.heart_rate);
        match &self.recorded_at {
            Some(at) => {
                let _ = writeln!(out, "Recorded:       {at}");
            }
            None => {
                let _ = writeln!(out, "No readings yet.");
            }
        }
        if let Some(notes) = &self.notes {
            let _ = writeln!(out, "Notes:          {notes}");
        }
        out
    }
}

/// Format a numeric reading, or the missing placeholder.
#[must_use]
pub fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v}"))
}

/// Format a temperature pill, e.g. `37.2 °C` or `-- °C`.
#[must_use]
pub fn temperature(value: Option<f64>) -> String {
    format!("{} °C", reading(value))
}

/// Format a heart rate pill, e.g. `72 bpm` or `-- bpm`.
#[must_use]
pub fn heart_rate(value: Option<f64>) -> String {
    format!("{} bpm", reading(value))
}

/// Format the blood pressure pair of `record`.
///
/// Shown when either side is present, with the absent side as `--`.
/// Returns `None` when both are absent.
#[must_use]
pub fn blood_pressure(record: &VitalRecord) -> Option<String> {
    record.has_blood_pressure().then(|| {
        format!(
            "{}/{} mmHg",
            reading(record.systolic),
            reading(record.diastolic)
        )
    })
}

/// Format a UTC timestamp in local time with a `strftime` format.
///
/// Returns `None` if the format cannot render a timestamp, such as the
/// parse-only `%#z`.
#[must_use]
pub fn try_format_local(timestamp: DateTime<Utc>, time_format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", timestamp.with_timezone(&Local).format(time_format)).ok()?;
    Some(out)
}

/// Format a UTC timestamp in local time, falling back to RFC 3339.
#[must_use]
pub fn format_local(timestamp: DateTime<Utc>, time_format: &str) -> String {
    try_format_local(timestamp, time_format).unwrap_or_else(|| {
        timestamp
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    })
}

/// Format a record timestamp in local time.
#[must_use]
pub fn format_time(record: &VitalRecord, time_format: &str) -> String {
    format_local(record.created_at, time_format)
}

/// The reading pills of a history row.
///
/// Temperature and heart rate are always shown; blood pressure only when
/// at least one side was recorded.
#[must_use]
pub fn pills(record: &VitalRecord) -> Vec<String> {
    let mut pills = Vec::with_capacity(3);
    pills.push(temperature(record.temperature_c));
    if let Some(bp) = blood_pressure(record) {
        pills.push(bp);
    }
    pills.push(heart_rate(record.heart_rate));
    pills
}

/// The slice of `records` a history listing shows.
///
/// An explicit `requested` limit wins over the configured one; a limit of
/// zero from either source means unlimited.
#[must_use]
pub fn limit_records<'a>(
    records: &'a [VitalRecord],
    requested: Option<usize>,
    config: &Config,
) -> &'a [VitalRecord] {
    let limit = match requested {
        Some(0) => None,
        Some(n) => Some(n),
        None => config.list_limit(),
    };
    match limit {
        Some(limit) => &records[..limit.min(records.len())],
        None => records,
    }
}

/// Render the history list in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_records(
    records: &[VitalRecord],
    format: OutputFormat,
    time_format: &str,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => Ok(render_plain(records, time_format)),
        OutputFormat::Table => Ok(render_table(records, time_format)),
    }
}

/// Render the summary card in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_summary(summary: &Summary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Plain | OutputFormat::Table => Ok(summary.to_plain()),
    }
}

fn render_plain(records: &[VitalRecord], time_format: &str) -> String {
    if records.is_empty() {
        return "No readings yet.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "#{}  {}", record.id, format_time(record, time_format));
        let _ = writeln!(out, "    {}", pills(record).join(" · "));
        if let Some(notes) = &record.notes {
            let _ = writeln!(out, "    {notes}");
        }
    }
    out
}

fn render_table(records: &[VitalRecord], time_format: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<20}  {:>8}  {:>14}  {:>8}  NOTES",
        "ID", "WHEN", "TEMP", "BP", "HR"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:>6}  {:<20}  {:>8}  {:>14}  {:>8}  {}",
            record.id,
            format_time(record, time_format),
            reading(record.temperature_c),
            blood_pressure(record)
                .map_or_else(|| MISSING.to_string(), |bp| bp.replace(" mmHg", "")),
            reading(record.heart_rate),
            truncate(record.notes.as_deref().unwrap_or(""), TABLE_NOTES_WIDTH),
        );
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewVitals;
    use chrono::{Datelike, Utc};

    fn record(id: i64, vitals: NewVitals) -> VitalRecord {
        VitalRecord::from_new(id, Utc::now(), vitals)
    }

    fn full() -> VitalRecord {
        record(
            1,
            NewVitals {
                temperature_c: Some(37.2),
                systolic: Some(120.0),
                diastolic: Some(80.0),
                heart_rate: Some(72.0),
                notes: Some("Todo normal".to_string()),
            },
        )
    }

    #[test]
    fn test_reading() {
        assert_eq!(reading(Some(37.2)), "37.2");
        assert_eq!(reading(Some(120.0)), "120");
        assert_eq!(reading(None), "--");
    }

    fn bp(systolic: Option<f64>, diastolic: Option<f64>) -> Option<String> {
        blood_pressure(&record(
            9,
            NewVitals {
                systolic,
                diastolic,
                ..NewVitals::default()
            },
        ))
    }

    #[test]
    fn test_blood_pressure_either_side() {
        assert_eq!(bp(Some(120.0), Some(80.0)).as_deref(), Some("120/80 mmHg"));
        assert_eq!(bp(Some(120.0), None).as_deref(), Some("120/-- mmHg"));
        assert_eq!(bp(None, Some(80.0)).as_deref(), Some("--/80 mmHg"));
        assert_eq!(bp(None, None), None);
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::of(None, "%Y");
        assert_eq!(summary.temperature, "-- °C");
        assert_eq!(summary.blood_pressure, "--/-- mmHg");
        assert_eq!(summary.heart_rate, "-- bpm");
        assert!(summary.recorded_at.is_none());
        assert!(summary.to_plain().contains("No readings yet."));
    }

    #[test]
    fn test_summary_full() {
        let rec = full();
        let summary = Summary::of(Some(&rec), "%Y");
        assert_eq!(summary.temperature, "37.2 °C");
        assert_eq!(summary.blood_pressure, "120/80 mmHg");
        assert_eq!(summary.heart_rate, "72 bpm");
        assert_eq!(
            summary.recorded_at,
            Some(rec.created_at.with_timezone(&Local).year().to_string())
        );
        assert_eq!(summary.notes.as_deref(), Some("Todo normal"));
    }

    #[test]
    fn test_summary_without_blood_pressure() {
        let rec = record(2, NewVitals::default());
        let summary = Summary::of(Some(&rec), "%Y");
        assert_eq!(summary.blood_pressure, "--/-- mmHg");
    }

    #[test]
    fn test_pills_show_missing_temperature_and_heart_rate() {
        assert_eq!(pills(&full()).len(), 3);

        let rec = record(
            3,
            NewVitals {
                heart_rate: Some(64.0),
                ..NewVitals::default()
            },
        );
        assert_eq!(pills(&rec), vec!["-- °C".to_string(), "64 bpm".to_string()]);
    }

    #[test]
    fn test_render_plain_record_without_readings() {
        let out = render_records(&[record(4, NewVitals::default())], OutputFormat::Plain, "%Y")
            .unwrap();
        assert!(out.contains("-- °C · -- bpm"));
        assert!(!out.contains("mmHg"));
    }

    #[test]
    fn test_try_format_local_rejects_parse_only_specifier() {
        let now = Utc::now();
        assert!(try_format_local(now, "%Y-%m-%d").is_some());
        assert!(try_format_local(now, "%#z").is_none());
    }

    #[test]
    fn test_format_time_falls_back_on_unrenderable_format() {
        let rec = full();
        let rendered = format_time(&rec, "%#z");
        let year = rec.created_at.with_timezone(&Local).year().to_string();
        assert!(rendered.starts_with(&year), "{rendered}");
        assert!(rendered.contains('T'));

        let summary = Summary::of(Some(&rec), "%#z");
        assert_eq!(summary.recorded_at, Some(rendered));
    }

    fn numbered(count: i64) -> Vec<VitalRecord> {
        (1..=count).map(|id| record(id, NewVitals::default())).collect()
    }

    #[test]
    fn test_limit_records_requested_wins() {
        let records = numbered(5);
        let config = Config::default();
        assert_eq!(limit_records(&records, Some(2), &config).len(), 2);
        assert_eq!(limit_records(&records, Some(2), &config)[0].id, 1);
    }

    #[test]
    fn test_limit_records_requested_zero_is_unlimited() {
        let records = numbered(5);
        let mut config = Config::default();
        config.display.list_limit = 3;
        assert_eq!(limit_records(&records, Some(0), &config).len(), 5);
    }

    #[test]
    fn test_limit_records_uses_config() {
        let records = numbered(5);
        let mut config = Config::default();
        config.display.list_limit = 3;
        assert_eq!(limit_records(&records, None, &config).len(), 3);

        config.display.list_limit = 0;
        assert_eq!(limit_records(&records, None, &config).len(), 5);
    }

    #[test]
    fn test_limit_records_larger_than_count() {
        let records = numbered(2);
        let config = Config::default();
        assert_eq!(limit_records(&records, Some(10), &config).len(), 2);
        assert_eq!(limit_records(&records, None, &config).len(), 2);
        assert!(limit_records(&[], Some(1), &config).is_empty());
    }

    #[test]
    fn test_render_plain() {
        let out = render_records(&[full()], OutputFormat::Plain, "%Y").unwrap();
        assert!(out.starts_with("#1  "));
        assert!(out.contains("37.2 °C · 120/80 mmHg · 72 bpm"));
        assert!(out.contains("Todo normal"));
    }

    #[test]
    fn test_render_plain_empty() {
        let out = render_records(&[], OutputFormat::Plain, "%Y").unwrap();
        assert_eq!(out, "No readings yet.\n");
    }

    #[test]
    fn test_render_table() {
        let out = render_records(&[full()], OutputFormat::Table, "%Y").unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("NOTES"));
        assert!(lines[1].contains("120/80"));
        assert!(lines[1].contains("Todo normal"));
    }

    #[test]
    fn test_render_json() {
        let out = render_records(&[full()], OutputFormat::Json, "%Y").unwrap();
        let parsed: Vec<VitalRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].systolic, Some(120.0));
    }

    #[test]
    fn test_render_summary_json() {
        let summary = Summary::of(None, "%Y");
        let out = render_summary(&summary, OutputFormat::Json).unwrap();
        assert!(out.contains("\"heart_rate\": \"-- bpm\""));
        assert!(!out.contains("recorded_at"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ñandú ñandú", 4), "ñan…");
    }
}
