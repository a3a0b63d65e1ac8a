// LogDash - core/export.rs
//
// CSV, JSON and plain-text rendering of a result page.
// Core layer: writes to any Write trait object.

use crate::core::model::LogEntry;
use crate::util::constants::{MAX_TABLE_ERROR_CHARS, MAX_TABLE_MESSAGE_CHARS};
use crate::util::error::ExportError;
use std::io::Write;

fn io_err(e: std::io::Error) -> ExportError {
    ExportError::Io { source: e }
}

fn created_label(entry: &LogEntry, format: &str) -> String {
    entry
        .created_on()
        .map(|t| t.format(format).to_string())
        .unwrap_or_default()
}

fn level_label(entry: &LogEntry) -> String {
    entry
        .severity()
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| entry.level.to_string())
}

/// First line of `text`, cut to `max` characters with a trailing "...".
pub fn clip(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        return line.to_string();
    }
    let mut clipped: String = line.chars().take(max).collect();
    clipped.push_str("...");
    clipped
}

/// Render entries as an aligned text table followed by a page footer.
///
/// Messages and errors are reduced to their first line and clipped; use
/// `export_detail` or JSON for the full record.
pub fn export_table<W: Write>(
    entries: &[LogEntry],
    page_index: u32,
    total: u64,
    mut writer: W,
) -> Result<usize, ExportError> {
    writeln!(
        writer,
        "{:<19}  {:<11}  {:<10}  {:<12}  {:<16}  {:<24}  MESSAGE",
        "CREATED", "LEVEL", "ID", "USER", "TRACE", "ERROR"
    )
    .map_err(io_err)?;

    for entry in entries {
        writeln!(
            writer,
            "{:<19}  {:<11}  {:<10}  {:<12}  {:<16}  {:<24}  {}",
            created_label(entry, "%Y-%m-%d %H:%M:%S"),
            level_label(entry),
            entry.id,
            entry.user,
            entry.trace_no,
            clip(&entry.error, MAX_TABLE_ERROR_CHARS),
            clip(&entry.message, MAX_TABLE_MESSAGE_CHARS),
        )
        .map_err(io_err)?;
    }

    writeln!(
        writer,
        "page {page_index} ({} of {total} matching entries)",
        entries.len()
    )
    .map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    Ok(entries.len())
}

/// Render one entry in full, including its error and stack trace.
pub fn export_detail<W: Write>(entry: &LogEntry, mut writer: W) -> Result<(), ExportError> {
    let fields = [
        ("ID", entry.id.clone()),
        ("Created", created_label(entry, "%Y-%m-%d %H:%M:%S %:z")),
        ("Level", level_label(entry)),
        ("User", entry.user.clone()),
        ("Trace", entry.trace_no.clone()),
    ];
    for (label, value) in fields {
        writeln!(writer, "{label:<8} {value}").map_err(io_err)?;
    }

    let blocks = [
        ("Message", &entry.message),
        ("Error", &entry.error),
        ("StackTrace", &entry.stack_trace),
    ];
    for (label, text) in blocks {
        if text.is_empty() {
            continue;
        }
        writeln!(writer, "\n{label}:").map_err(io_err)?;
        for line in text.lines() {
            writeln!(writer, "  {line}").map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)
}

/// Export entries to CSV format.
///
/// Writes: created, level, id, trace_no, user, message, error.
/// Stack traces are left out to keep one record per line readable; use JSON
/// for the full record.
pub fn export_csv<W: Write>(entries: &[LogEntry], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["created", "level", "id", "trace_no", "user", "message", "error"])
        .map_err(|e| ExportError::Csv { source: e })?;

    let mut count = 0;
    for entry in entries {
        let created = entry
            .created_on()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let level = level_label(entry);

        csv_writer
            .write_record([
                &created,
                &level,
                &entry.id,
                &entry.trace_no,
                &entry.user,
                &entry.message,
                &entry.error,
            ])
            .map_err(|e| ExportError::Csv { source: e })?;
        count += 1;
    }

    csv_writer.flush().map_err(io_err)?;

    Ok(count)
}

/// Export entries to JSON format (array of objects, wire field names).
pub fn export_json<W: Write>(entries: &[LogEntry], writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ExportError::Json { source: e })?;
    Ok(entries.len())
}
