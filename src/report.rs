//! Rendering of findings for the operator.

use std::fmt::Write;

use serde::Serialize;

use crate::rules::{Finding, RecordTable, Severity};

/// Plain-text report: a heading whenever the rule changes, one
/// `Severity: summary` line per finding, indented details and ASCII tables.
pub fn render_text(findings: &[Finding]) -> String {
    let mut out = String::new();
    let mut current_rule = None;
    for finding in findings {
        if current_rule != Some(finding.rule()) {
            if current_rule.is_some() {
                out.push('\n');
            }
            out.push_str(finding.rule().heading());
            out.push('\n');
            current_rule = Some(finding.rule());
        }
        out.push_str(&severity_line(finding.severity(), finding.summary()));
        out.push('\n');
        for detail in finding.details() {
            out.push_str("  ");
            out.push_str(detail);
            out.push('\n');
        }
        if let Some(table) = finding.table() {
            out.push_str(&render_table(table));
        }
    }
    out
}

pub fn severity_line(severity: Severity, message: &str) -> String {
    format!("{}: {}", severity, message)
}

/// Renders `table` with one column per header, `NULL` for missing values.
pub fn render_table(table: &RecordTable) -> String {
    let cells: Vec<Vec<&str>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.as_deref().unwrap_or("NULL")).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = widths.iter().fold(String::from("+"), |mut acc, w| {
        acc.push_str(&"-".repeat(w + 2));
        acc.push('+');
        acc
    });
    let line = |values: Vec<&str>| {
        let mut line = String::from("|");
        for (value, width) in values.iter().zip(&widths) {
            let _ = write!(line, " {:<width$} |", value, width = width);
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push_str(&line(table.columns.iter().map(String::as_str).collect()));
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for row in cells {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum OutReport<'a> {
    Ok { findings: &'a [Finding] },
    Err { error: String },
}

pub fn render_json(report: &OutReport, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
