//! Human-readable and JSON reporting of comparison outcomes.
//!
//! Text reports put exactly one line per case at column zero, starting with
//! `[<verdict>]`. Detail lines are indented, so
//! `grep '^\[mismatch\]'` lists every failing case.

use std::fmt::Debug;
use std::io::Write;

use chrono::{DateTime, Utc};
use olympus_common::{Fault, HarnessError, HarnessResult, ReportFormat, Verdict};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use uuid::Uuid;

use crate::verdict::{ComparisonOutcome, RunSummary};

const INDENT: &str = "  ";

/// Writes one block per outcome to `out`
pub struct Reporter<W: Write> {
    out: W,
    format: ReportFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self { out, format }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Report one case
    pub fn report<R: Debug + PartialEq>(
        &mut self,
        run_id: Uuid,
        outcome: &ComparisonOutcome<R>,
    ) -> HarnessResult<()> {
        let block = match self.format {
            ReportFormat::Text => render_text(outcome),
            ReportFormat::Json => {
                let record = OutcomeRecord::from_outcome(run_id, outcome);
                let mut line = serde_json::to_string(&record)
                    .map_err(|e| HarnessError::Report(e.to_string()))?;
                line.push('\n');
                line
            }
        };
        self.out.write_all(block.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Report the end-of-run summary
    pub fn summary(&mut self, summary: &RunSummary) -> HarnessResult<()> {
        let line = match self.format {
            ReportFormat::Text => format!("{}\n", render_summary(summary)),
            ReportFormat::Json => {
                let mut line = serde_json::to_string(&SummaryRecord::from(summary))
                    .map_err(|e| HarnessError::Report(e.to_string()))?;
                line.push('\n');
                line
            }
        };
        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Text block for one outcome, newline-terminated
pub fn render_text<R: Debug + PartialEq>(outcome: &ComparisonOutcome<R>) -> String {
    let mut block = format!("[{}] {}\n", outcome.verdict, outcome.describe());

    match outcome.verdict {
        Verdict::Match => {}
        Verdict::Mismatch => {
            if outcome.reference.output != outcome.candidate.output {
                let expected = transcript(&outcome.reference.output);
                let actual = transcript(&outcome.candidate.output);
                block.push_str(&format!("{INDENT}--- expected\n{INDENT}+++ actual\n"));
                for line in line_diff(&expected, &actual) {
                    block.push_str(INDENT);
                    block.push_str(&line);
                    block.push('\n');
                }
            }
            if let (Some(expected), Some(actual)) =
                (&outcome.reference.value, &outcome.candidate.value)
            {
                if expected != actual {
                    block.push_str(&format!(
                        "{INDENT}return: expected {:?}, got {:?}\n",
                        expected, actual
                    ));
                }
            }
            if let Some(fault) = outcome.reference.fault() {
                block.push_str(&format!("{INDENT}reference fault: {}\n", fault));
            }
        }
        Verdict::CandidateCrashed => {
            if let Some(fault) = outcome.candidate.fault() {
                block.push_str(&format!("{INDENT}fault: {}\n", fault));
            }
        }
    }

    block
}

/// Line diff of expected vs actual text.
///
/// Each line is prefixed with ` ` (both), `-` (expected only) or `+`
/// (actual only). A line lacking its trailing newline is followed by a
/// `\ No newline at end of output` marker.
pub fn line_diff(expected: &str, actual: &str) -> Vec<String> {
    let diff = TextDiff::from_lines(expected, actual);
    let mut lines = Vec::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        let text = change.to_string_lossy();
        lines.push(format!("{}{}", sign, text.trim_end_matches('\n')));
        if change.missing_newline() {
            lines.push("\\ No newline at end of output".to_string());
        }
    }
    lines
}

/// Output as diffable text: valid UTF-8 lines verbatim, any other line
/// with its bytes escaped
pub fn transcript(output: &[u8]) -> String {
    let mut text = String::with_capacity(output.len());
    for line in output.split_inclusive(|&b| b == b'\n') {
        let (body, newline) = match line.strip_suffix(b"\n") {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        match std::str::from_utf8(body) {
            Ok(valid) => text.push_str(valid),
            Err(_) => text.push_str(&body.escape_ascii().to_string()),
        }
        text.push_str(newline);
    }
    text
}

/// Final summary line of a text report
pub fn render_summary(summary: &RunSummary) -> String {
    format!(
        "summary: {}/{} matched, {} mismatched, {} crashed (run {})",
        summary.matched, summary.total, summary.mismatched, summary.crashed, summary.run_id
    )
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    run_id: Uuid,
    case: usize,
    verdict: Verdict,
    label: &'a str,
    args: &'a str,
    expected: String,
    actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_return: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_return: Option<String>,
    fault: Option<&'a Fault>,
    timestamp: DateTime<Utc>,
}

impl<'a> OutcomeRecord<'a> {
    fn from_outcome<R: Debug>(run_id: Uuid, outcome: &'a ComparisonOutcome<R>) -> Self {
        Self {
            run_id,
            case: outcome.case,
            verdict: outcome.verdict,
            label: &outcome.label,
            args: &outcome.args,
            expected: transcript(&outcome.reference.output),
            actual: transcript(&outcome.candidate.output),
            expected_return: outcome.reference.value.as_ref().map(|v| format!("{:?}", v)),
            actual_return: outcome.candidate.value.as_ref().map(|v| format!("{:?}", v)),
            fault: outcome.candidate.fault(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    summary: &'a RunSummary,
    score: f64,
}

impl<'a> From<&'a RunSummary> for SummaryRecord<'a> {
    fn from(summary: &'a RunSummary) -> Self {
        Self {
            summary,
            score: summary.score(),
        }
    }
}
