use std::io::Write;

use crate::drift::{CategoryOutcome, DriftReport, OutcomeStatus, ReportSink};

fn subject(outcome: &CategoryOutcome) -> String {
    match &outcome.table {
        Some(table) => format!("{} of {table}", outcome.category),
        None => outcome.category.to_string(),
    }
}

/// One line describing a single comparison.
pub fn render_outcome(outcome: &CategoryOutcome) -> String {
    let subject = subject(outcome);
    match &outcome.status {
        OutcomeStatus::NotCompared { reason } => format!("{subject}: not compared ({reason})"),
        OutcomeStatus::Compared(result) if result.equal => format!("{subject}: equal"),
        OutcomeStatus::Compared(result) => {
            let count = result.difference_count();
            let noun = if count == 1 { "difference" } else { "differences" };
            let mut sides = Vec::new();
            if !result.only_in_left.is_empty() {
                sides.push(format!("only in left: [{}]", result.only_in_left.join(", ")));
            }
            if !result.only_in_right.is_empty() {
                sides.push(format!("only in right: [{}]", result.only_in_right.join(", ")));
            }
            format!("{subject}: {count} {noun} ({})", sides.join("; "))
        }
    }
}

pub fn render_summary(report: &DriftReport) -> String {
    let mut lines = Vec::new();
    if report.columns_and_indexes_skipped() {
        lines.push("tables differ, column and index comparison skipped".to_string());
    }
    if report.tables_not_compared() {
        lines.push("tables not compared, column and index comparison skipped".to_string());
    }
    if report.has_drift {
        let mut line = format!(
            "drift detected between {} and {}: {} of {} comparisons differ",
            report.left_schema,
            report.right_schema,
            report.differing(),
            report.outcomes.len()
        );
        let not_compared = report.not_compared();
        if not_compared > 0 {
            line.push_str(&format!(", {not_compared} not compared"));
        }
        lines.push(line);
    } else {
        lines.push(format!(
            "no drift between {} and {}",
            report.left_schema, report.right_schema
        ));
    }
    lines.join("\n")
}

/// Full human-readable report: every outcome followed by the summary.
pub fn render_text(report: &DriftReport) -> String {
    let mut out: Vec<String> = report.outcomes.iter().map(render_outcome).collect();
    out.push(render_summary(report));
    out.join("\n") + "\n"
}

pub fn render_json(report: &DriftReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Writes each outcome line as soon as the comparison finishes.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReportSink for TextSink<W> {
    fn record(&mut self, outcome: &CategoryOutcome) {
        if let Err(e) = writeln!(self.out, "{}", render_outcome(outcome)) {
            tracing::warn!(error = %e, "failed to write report line");
        }
    }
}
