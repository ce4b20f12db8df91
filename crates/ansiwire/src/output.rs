use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use ansiwire_report::Report;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    #[serde(flatten)]
    report: Report,
    endpoint: &'a str,
    timestamp: String,
}

pub fn print_report(report: &Report, endpoint: &str, format: OutputFormat) {
    println!("{}", render_report(report, endpoint, format));
}

pub fn render_report(report: &Report, endpoint: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let out = ReportOutput {
                report: *report,
                endpoint,
                timestamp: now_unix_seconds(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let (row, column) = match report.position() {
                Some(pos) => (pos.row.to_string(), pos.column.to_string()),
                None => (String::new(), String::new()),
            };
            let code = report.code().map(|c| c.to_string()).unwrap_or_default();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "ROW", "COLUMN", "CODE", "ENDPOINT"])
                .add_row(vec![
                    report.kind().as_str().to_string(),
                    row,
                    column,
                    code,
                    endpoint.to_string(),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!("{report} ({endpoint})"),
        OutputFormat::Raw => raw_fields(report),
    }
}

/// Bare values for shell pipelines: `row column`, the device code, or `ok`/`failure`.
fn raw_fields(report: &Report) -> String {
    match report {
        Report::CursorPosition(pos) => format!("{} {}", pos.row, pos.column),
        Report::DeviceCode { code } => code.to_string(),
        Report::DeviceOk => "ok".to_string(),
        Report::DeviceFailure => "failure".to_string(),
    }
}

#[derive(Serialize)]
struct EmitOutput<'a> {
    endpoint: &'a str,
    sequences: &'a [String],
    bytes_written: usize,
}

/// Summary of what `emit` sent.
pub fn print_emitted(endpoint: &str, sequences: &[String], bytes_written: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EmitOutput {
                endpoint,
                sequences,
                bytes_written,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQUENCE"]);
            for name in sequences {
                table.add_row(vec![name.clone()]);
            }
            println!("{table}");
            println!("{bytes_written} bytes written to {endpoint}");
        }
        OutputFormat::Pretty => {
            println!(
                "wrote {} ({bytes_written} bytes) to {endpoint}",
                sequences.join(", ")
            );
        }
        OutputFormat::Raw => {}
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
