//! CLI dispatcher: runs registered `main`-style entry points by name.

use std::collections::HashMap;
use std::sync::Arc;

use olympus_common::{HarnessError, HarnessResult, Side};

use crate::invocation::{InvocationResult, Invoker};
use crate::testcase::Argv;

/// A program's `main`, taking its argument vector (without the program name)
pub type EntryPoint = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Programs available to the dispatcher, by name
#[derive(Clone, Default)]
pub struct ProgramRegistry {
    programs: HashMap<String, EntryPoint>,
}

impl ProgramRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an entry point.
    pub fn register<F>(&mut self, name: impl Into<String>, entry: F)
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.programs.insert(name.into(), Arc::new(entry));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, entry: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.register(name, entry);
        self
    }

    /// Check if a program is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    /// List all registered program names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.programs.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Look up a program by name.
    pub fn resolve(&self, name: &str) -> HarnessResult<EntryPoint> {
        self.programs
            .get(name)
            .cloned()
            .ok_or_else(|| HarnessError::UnknownProgram(name.to_string()))
    }
}

impl std::fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramRegistry")
            .field("programs", &self.list())
            .finish()
    }
}

/// Reference and candidate program registries plus the invokers for each side
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    reference: ProgramRegistry,
    candidate: ProgramRegistry,
    reference_invoker: Invoker,
    candidate_invoker: Invoker,
}

impl Dispatcher {
    pub fn new(reference: ProgramRegistry, candidate: ProgramRegistry) -> Self {
        Self {
            reference,
            candidate,
            ..Self::default()
        }
    }

    /// Replace the invokers used for each side
    pub fn with_invokers(mut self, reference: Invoker, candidate: Invoker) -> Self {
        self.reference_invoker = reference;
        self.candidate_invoker = candidate;
        self
    }

    pub fn registry(&self, side: Side) -> &ProgramRegistry {
        match side {
            Side::Reference => &self.reference,
            Side::Candidate => &self.candidate,
        }
    }

    /// Resolve `program` on `side` and run it with `args` as if from a
    /// command line, capturing its transcript.
    pub fn run_main(&self, side: Side, program: &str, args: &Argv) -> HarnessResult<InvocationResult<()>> {
        let entry = self.registry(side).resolve(program)?;
        let invoker = match side {
            Side::Reference => self.reference_invoker,
            Side::Candidate => self.candidate_invoker,
        };
        let argv = args.0.clone();
        tracing::debug!(%side, program, args = argv.len(), "dispatching program");
        Ok(invoker.run(move || entry(argv.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(args: &[String]) {
        crate::outln!("{}", args.join(" "));
    }

    #[test]
    fn test_registry_basic() {
        let registry = ProgramRegistry::new()
            .with("echo", echo)
            .with("usage", |_: &[String]| crate::outln!("usage: usage"));

        assert!(registry.contains("echo"));
        assert!(!registry.contains("cat"));
        assert_eq!(registry.list(), vec!["echo", "usage"]);
    }

    #[test]
    fn test_unknown_program() {
        let registry = ProgramRegistry::new();
        assert_eq!(
            registry.resolve("displaya").err(),
            Some(HarnessError::UnknownProgram("displaya".to_string()))
        );

        let dispatcher = Dispatcher::new(ProgramRegistry::new().with("echo", echo), registry);
        let err = dispatcher
            .run_main(Side::Candidate, "echo", &Argv::default())
            .err();
        assert_eq!(err, Some(HarnessError::UnknownProgram("echo".to_string())));
    }

    #[test]
    fn test_run_main_captures_transcript() {
        let dispatcher = Dispatcher::new(
            ProgramRegistry::new().with("echo", echo),
            ProgramRegistry::new().with("echo", |_: &[String]| panic!("student bug")),
        );

        let reference = dispatcher
            .run_main(Side::Reference, "echo", &Argv::new(["a", "b"]))
            .unwrap();
        assert_eq!(reference.text(), "a b\n");

        let candidate = dispatcher
            .run_main(Side::Candidate, "echo", &Argv::new(["a", "b"]))
            .unwrap();
        assert!(!candidate.is_completed());
    }
}
