//! Verdict determination and run aggregation

use chrono::{DateTime, Utc};
use olympus_common::Verdict;
use serde::Serialize;
use uuid::Uuid;

use crate::invocation::InvocationResult;

/// Classify one reference/candidate pair.
///
/// `Match` needs both sides completed with identical bytes and equal return
/// values. A candidate that did not complete against a completed reference
/// is `CandidateCrashed`. Anything else is `Mismatch`.
pub fn judge<R: PartialEq>(reference: &InvocationResult<R>, candidate: &InvocationResult<R>) -> Verdict {
    match (reference.is_completed(), candidate.is_completed()) {
        (true, true) if reference.output == candidate.output && reference.value == candidate.value => {
            Verdict::Match
        }
        (true, false) => Verdict::CandidateCrashed,
        _ => Verdict::Mismatch,
    }
}

/// Result of comparing one test case
#[derive(Debug, Clone)]
pub struct ComparisonOutcome<R> {
    /// Case number within the run (1-indexed)
    pub case: usize,
    pub label: String,
    /// Rendered argument tuple
    pub args: String,
    pub reference: InvocationResult<R>,
    pub candidate: InvocationResult<R>,
    pub verdict: Verdict,
}

impl<R: PartialEq> ComparisonOutcome<R> {
    pub fn new(
        case: usize,
        label: impl Into<String>,
        args: impl Into<String>,
        reference: InvocationResult<R>,
        candidate: InvocationResult<R>,
    ) -> Self {
        let verdict = judge(&reference, &candidate);
        Self {
            case,
            label: label.into(),
            args: args.into(),
            reference,
            candidate,
            verdict,
        }
    }

    /// `label(args)` as shown in the report
    pub fn describe(&self) -> String {
        format!("{}({})", self.label, self.args)
    }
}

/// Aggregated result for one driver run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub exercise: String,
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub crashed: usize,
    /// First failing case, as `label(args)`
    pub first_failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(exercise: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            exercise: exercise.into(),
            total: 0,
            matched: 0,
            mismatched: 0,
            crashed: 0,
            first_failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Count one outcome
    pub fn record<R>(&mut self, outcome: &ComparisonOutcome<R>) {
        self.total += 1;
        match outcome.verdict {
            Verdict::Match => self.matched += 1,
            Verdict::Mismatch => self.mismatched += 1,
            Verdict::CandidateCrashed => self.crashed += 1,
        }
        if outcome.verdict.is_failure() && self.first_failure.is_none() {
            self.first_failure = Some(format!("{}({})", outcome.label, outcome.args));
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn all_matched(&self) -> bool {
        self.matched == self.total
    }

    /// Score (0-100)
    pub fn score(&self) -> f64 {
        if self.total > 0 {
            (self.matched as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}
