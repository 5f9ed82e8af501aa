//! Minos - output-comparison grading harness
//!
//! Drives a student's implementation (the candidate) against a trusted
//! reference on identical inputs, captures what each prints and reports
//! whether the transcripts match.
//!
//! # Architecture
//!
//! - **capture**: process-wide output capture with scoped restoration
//! - **random**: bounded random integers and word lists
//! - **invocation**: runs a callable, containing panics and timeouts
//! - **verdict** / **report**: judging and reporting outcomes
//! - **dispatcher**: named `main`-style entry points
//! - **harness**: the `challenge` / `challenge_main` surface for drivers
//!
//! Code under test prints through [`outln!`] and [`out!`] so its output can
//! be attributed to the invocation that produced it.

pub mod capture;
pub mod config;
pub mod dispatcher;
pub mod harness;
pub mod invocation;
pub mod metrics;
pub mod random;
pub mod report;
pub mod testcase;
pub mod verdict;

// Re-export commonly used types
pub use capture::{Capture, capture, stdout};
pub use config::Config;
pub use dispatcher::{Dispatcher, EntryPoint, ProgramRegistry};
pub use harness::Harness;
pub use invocation::{Callable, InvocationResult, InvocationStatus, Invoker};
pub use olympus_common::{Fault, FaultKind, HarnessError, HarnessResult, ReportFormat, Side, Verdict};
pub use testcase::{Args, Argv, TestCase, TestTable};
pub use verdict::{ComparisonOutcome, RunSummary};
