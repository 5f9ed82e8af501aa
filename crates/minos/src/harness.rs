//! The harness facade used by exercise drivers.
//!
//! `challenge` and `challenge_main` run one case, report it and count it.
//! Candidate faults become verdicts; a faulting reference or a malformed
//! case aborts the run with a [`HarnessError`].

use std::fmt::Debug;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use olympus_common::{HarnessError, HarnessResult, Side, Verdict};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::invocation::{Callable, InvocationResult, Invoker};
use crate::metrics;
use crate::report::Reporter;
use crate::testcase::{Args, Argv, TestTable};
use crate::verdict::{ComparisonOutcome, RunSummary};

/// Compares reference and candidate implementations of one exercise
pub struct Harness<W: Write = io::Stdout> {
    reference: Invoker,
    candidate: Invoker,
    dispatcher: Dispatcher,
    reporter: Reporter<W>,
    summary: RunSummary,
    cases: usize,
}

impl Harness<io::Stdout> {
    /// Harness reporting to the process stdout
    pub fn new(exercise: impl Into<String>, config: &Config) -> Self {
        Self::with_writer(exercise, config, io::stdout())
    }
}

impl<W: Write> Harness<W> {
    /// Harness reporting to `out`
    pub fn with_writer(exercise: impl Into<String>, config: &Config, out: W) -> Self {
        metrics::init_metrics();
        let summary = RunSummary::new(exercise);
        tracing::info!(
            exercise = %summary.exercise,
            run_id = %summary.run_id,
            candidate_timeout_ms = config.execution.candidate_timeout_ms,
            "starting run"
        );

        let reference = Invoker::from_budget_ms(config.execution.reference_timeout_ms);
        let candidate = Invoker::from_budget_ms(config.execution.candidate_timeout_ms);
        Self {
            reference,
            candidate,
            dispatcher: Dispatcher::default().with_invokers(reference, candidate),
            reporter: Reporter::new(out, config.report.format),
            summary,
            cases: 0,
        }
    }

    /// Programs available to [`challenge_main`](Self::challenge_main)
    pub fn with_programs(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher.with_invokers(self.reference, self.candidate);
        self
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn writer(&self) -> &W {
        self.reporter.writer()
    }

    /// Run reference then candidate on the same arguments and judge them.
    ///
    /// Nothing is reported or counted; see [`challenge`](Self::challenge).
    pub fn compare<A, R, Ref, Cand>(
        &mut self,
        label: &str,
        reference: Ref,
        candidate: Cand,
        args: A,
    ) -> HarnessResult<ComparisonOutcome<R>>
    where
        A: Args,
        R: PartialEq + Send + 'static,
        Ref: Callable<A, Output = R>,
        Cand: Callable<A, Output = R>,
    {
        self.compare_shared(label, &Arc::new(reference), &Arc::new(candidate), args)
    }

    /// Compare, report and count one case
    pub fn challenge<A, R, Ref, Cand>(
        &mut self,
        label: &str,
        reference: Ref,
        candidate: Cand,
        args: A,
    ) -> HarnessResult<Verdict>
    where
        A: Args,
        R: PartialEq + Debug + Send + 'static,
        Ref: Callable<A, Output = R>,
        Cand: Callable<A, Output = R>,
    {
        let outcome = self.compare(label, reference, candidate, args)?;
        self.record(&outcome)
    }

    /// Challenge every case of `table`; a case label overrides `label`
    pub fn challenge_table<A, R, Ref, Cand>(
        &mut self,
        label: &str,
        reference: Ref,
        candidate: Cand,
        table: &TestTable<A>,
    ) -> HarnessResult<Vec<Verdict>>
    where
        A: Args,
        R: PartialEq + Debug + Send + 'static,
        Ref: Callable<A, Output = R>,
        Cand: Callable<A, Output = R>,
    {
        let reference = Arc::new(reference);
        let candidate = Arc::new(candidate);
        let mut verdicts = Vec::with_capacity(table.len());
        for case in table {
            let label = case.label().unwrap_or(label);
            let outcome = self.compare_shared(label, &reference, &candidate, case.args().clone())?;
            verdicts.push(self.record(&outcome)?);
        }
        Ok(verdicts)
    }

    /// Run the reference and candidate `program` with the same argument
    /// vector and compare their transcripts
    pub fn challenge_main<I, S>(&mut self, program: &str, args: I) -> HarnessResult<Verdict>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = Argv::new(args);
        let case = self.next_case();
        let rendered = argv.render();

        let reference = self
            .dispatcher
            .run_main(Side::Reference, program, &argv)
            .map_err(|e| in_case(case, program, &rendered, e))?;
        escalate(case, program, &rendered, &reference)?;
        let candidate = self
            .dispatcher
            .run_main(Side::Candidate, program, &argv)
            .map_err(|e| in_case(case, program, &rendered, e))?;

        let outcome = ComparisonOutcome::new(case, program, rendered, reference, candidate);
        self.record(&outcome)
    }

    /// Compare a candidate `program` run against a fixed transcript
    pub fn challenge_main_transcript<I, S>(
        &mut self,
        program: &str,
        args: I,
        expected: &str,
    ) -> HarnessResult<Verdict>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = Argv::new(args);
        let case = self.next_case();
        let rendered = argv.render();

        let reference = InvocationResult::completed(expected.as_bytes().to_vec(), (), Duration::ZERO);
        let candidate = self
            .dispatcher
            .run_main(Side::Candidate, program, &argv)
            .map_err(|e| in_case(case, program, &rendered, e))?;

        let outcome = ComparisonOutcome::new(case, program, rendered, reference, candidate);
        self.record(&outcome)
    }

    /// Report the summary and close the run
    pub fn finish(mut self) -> HarnessResult<RunSummary> {
        self.summary.finish();
        self.reporter.summary(&self.summary)?;
        tracing::info!(
            exercise = %self.summary.exercise,
            matched = self.summary.matched,
            total = self.summary.total,
            score = self.summary.score(),
            "run finished"
        );
        Ok(self.summary)
    }

    fn next_case(&mut self) -> usize {
        self.cases += 1;
        self.cases
    }

    fn compare_shared<A, R, Ref, Cand>(
        &mut self,
        label: &str,
        reference: &Arc<Ref>,
        candidate: &Arc<Cand>,
        args: A,
    ) -> HarnessResult<ComparisonOutcome<R>>
    where
        A: Args,
        R: PartialEq + Send + 'static,
        Ref: Callable<A, Output = R>,
        Cand: Callable<A, Output = R>,
    {
        let case = self.next_case();
        let rendered = args.render();

        let reference = self.reference.invoke(reference, args.clone());
        metrics::record_invocation(Side::Reference, reference.elapsed.as_secs_f64());
        escalate(case, label, &rendered, &reference)?;

        let candidate = self.candidate.invoke(candidate, args);
        metrics::record_invocation(Side::Candidate, candidate.elapsed.as_secs_f64());

        Ok(ComparisonOutcome::new(case, label, rendered, reference, candidate))
    }

    fn record<R: PartialEq + Debug>(&mut self, outcome: &ComparisonOutcome<R>) -> HarnessResult<Verdict> {
        if let Some(fault) = outcome.candidate.fault() {
            tracing::warn!(case = outcome.case, "Candidate fault in {}: {}", outcome.describe(), fault);
            metrics::record_fault(fault.kind);
        }
        metrics::record_verdict(&self.summary.exercise, outcome.verdict);
        self.summary.record(outcome);
        self.reporter.report(self.summary.run_id, outcome)?;
        Ok(outcome.verdict)
    }
}

/// Turn a reference fault into a hard error naming the case
fn escalate<R>(case: usize, label: &str, args: &str, reference: &InvocationResult<R>) -> HarnessResult<()> {
    match reference.fault() {
        Some(fault) => {
            tracing::error!(case, "Reference fault in {}({}): {}", label, args, fault);
            Err(HarnessError::ReferenceFault {
                case,
                label: label.to_string(),
                args: args.to_string(),
                reason: fault.to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Tag a hard error with the case that raised it
fn in_case(case: usize, label: &str, args: &str, err: HarnessError) -> HarnessError {
    tracing::error!(case, "Case {}({}) aborted: {}", label, args, err);
    HarnessError::InCase {
        case,
        label: label.to_string(),
        args: args.to_string(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::ProgramRegistry;

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.execution.candidate_timeout_ms = 2_000;
        config
    }

    fn sum(a: i64, b: i64) {
        crate::outln!("{}", a + b);
    }

    fn sum_off_by_one(a: i64, b: i64) {
        crate::outln!("{}", a + b + 1);
    }

    fn divide(a: i64, b: i64) {
        crate::outln!("{}", a / b);
    }

    fn divide_panics(_: i64, _: i64) {
        panic!("oops");
    }

    fn report_text<W: Write + AsRef<[u8]>>(harness: &Harness<W>) -> String {
        String::from_utf8_lossy(harness.writer().as_ref()).into_owned()
    }

    #[test]
    fn test_case_numbers_increase() {
        let mut harness = Harness::with_writer("sum", &quiet_config(), Vec::new());
        let first = harness.compare("Sum", sum, sum, (1_i64, 2_i64)).unwrap();
        let second = harness.compare("Sum", sum, sum, (3_i64, 4_i64)).unwrap();
        assert_eq!((first.case, second.case), (1, 2));
        // compare alone reports nothing
        assert!(harness.writer().is_empty());
    }

    #[test]
    fn test_challenge_reports_and_counts() {
        let mut harness = Harness::with_writer("sum", &quiet_config(), Vec::new());
        assert_eq!(harness.challenge("Sum", sum, sum, (2_i64, 3_i64)), Ok(Verdict::Match));
        assert_eq!(
            harness.challenge("Sum", sum, sum_off_by_one, (2_i64, 3_i64)),
            Ok(Verdict::Mismatch)
        );
        assert_eq!(
            harness.challenge("Div", divide, divide_panics, (4_i64, 2_i64)),
            Ok(Verdict::CandidateCrashed)
        );

        let text = report_text(&harness);
        assert!(text.contains("[match] Sum(2, 3)\n"));
        assert!(text.contains("[mismatch] Sum(2, 3)\n"));
        assert!(text.contains("[candidate-crashed] Div(4, 2)\n  fault: panic: oops\n"));
        assert_eq!(harness.summary().total, 3);
    }

    #[test]
    fn test_reference_fault_aborts() {
        let mut harness = Harness::with_writer("div", &quiet_config(), Vec::new());
        let err = harness.challenge("Div", divide, divide, (1_i64, 0_i64)).unwrap_err();
        match err {
            HarnessError::ReferenceFault { case, label, args, .. } => {
                assert_eq!(case, 1);
                assert_eq!(label, "Div");
                assert_eq!(args, "1, 0");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(harness.summary().total, 0);
    }

    #[test]
    fn test_table_uses_case_labels() {
        let table = TestTable::new()
            .case((1_i64, 1_i64))
            .labeled("Edge", (0_i64, 0_i64));
        let mut harness = Harness::with_writer("sum", &quiet_config(), Vec::new());
        let verdicts = harness.challenge_table("Sum", sum, sum, &table).unwrap();
        assert_eq!(verdicts, vec![Verdict::Match, Verdict::Match]);

        let text = report_text(&harness);
        assert!(text.contains("[match] Sum(1, 1)\n"));
        assert!(text.contains("[match] Edge(0, 0)\n"));
    }

    #[test]
    fn test_challenge_main_and_transcript() {
        let echo = |args: &[String]| crate::outln!("{}", args.join(" "));
        let programs = Dispatcher::new(
            ProgramRegistry::new().with("echo", echo),
            ProgramRegistry::new().with("echo", echo),
        );
        let mut harness =
            Harness::with_writer("echo", &quiet_config(), Vec::new()).with_programs(programs);

        assert_eq!(harness.challenge_main("echo", ["a", "b"]), Ok(Verdict::Match));
        assert_eq!(
            harness.challenge_main_transcript("echo", ["a"], "a\n"),
            Ok(Verdict::Match)
        );
        assert_eq!(
            harness.challenge_main_transcript("echo", ["a"], "b\n"),
            Ok(Verdict::Mismatch)
        );

        let summary = harness.finish().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.matched, 2);
    }

    #[test]
    fn test_unknown_program_names_the_case() {
        let echo = |args: &[String]| crate::outln!("{}", args.join(" "));
        let programs = Dispatcher::new(
            ProgramRegistry::new().with("echo", echo),
            ProgramRegistry::new().with("echo", echo),
        );
        let mut harness =
            Harness::with_writer("echo", &quiet_config(), Vec::new()).with_programs(programs);

        assert_eq!(harness.challenge_main("echo", ["a"]), Ok(Verdict::Match));
        let err = harness.challenge_main("cat", ["x", "y"]).unwrap_err();
        assert_eq!(
            err,
            HarnessError::InCase {
                case: 2,
                label: "cat".to_string(),
                args: "\"x\", \"y\"".to_string(),
                source: Box::new(HarnessError::UnknownProgram("cat".to_string())),
            }
        );
        assert_eq!(err.error_code(), "UNKNOWN_PROGRAM");
        assert_eq!(harness.summary().total, 1);
    }

    #[test]
    fn test_unknown_candidate_program_in_transcript_mode() {
        let mut harness = Harness::with_writer("echo", &quiet_config(), Vec::new());
        let err = harness
            .challenge_main_transcript("echo", Vec::<String>::new(), "\n")
            .unwrap_err();
        assert!(matches!(err, HarnessError::InCase { case: 1, ref source, .. }
            if **source == HarnessError::UnknownProgram("echo".to_string())));
    }
}
