//! Invocation adapter: runs one callable inside a capture session and turns
//! panics and timeouts into a result record instead of unwinding.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use olympus_common::Fault;

use crate::capture::{self, CaptureBuffer};

/// A function that can be called with the argument tuple `A`.
///
/// Implemented for every `Fn(T1, .., Tn) -> R` up to six arguments, so an
/// exercise's reference and candidate are plain functions with the same
/// signature.
pub trait Callable<A>: Send + Sync + 'static {
    type Output;

    fn call(&self, args: A) -> Self::Output;
}

macro_rules! impl_callable {
    ($($name:ident),*) => {
        impl<Func, Ret, $($name,)*> Callable<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Ret + Send + Sync + 'static,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn call(&self, ($($name,)*): ($($name,)*)) -> Ret {
                (self)($($name),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(T1);
impl_callable!(T1, T2);
impl_callable!(T1, T2, T3);
impl_callable!(T1, T2, T3, T4);
impl_callable!(T1, T2, T3, T4, T5);
impl_callable!(T1, T2, T3, T4, T5, T6);

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Returned normally
    Completed,
    /// Panicked or exceeded its budget
    Crashed(Fault),
}

/// Everything one invocation produced
#[derive(Debug, Clone)]
pub struct InvocationResult<R> {
    /// Bytes written to the harness output stream
    pub output: Vec<u8>,
    /// Return value, present iff the invocation completed
    pub value: Option<R>,
    pub status: InvocationStatus,
    pub elapsed: Duration,
}

impl<R> InvocationResult<R> {
    pub fn completed(output: Vec<u8>, value: R, elapsed: Duration) -> Self {
        Self {
            output,
            value: Some(value),
            status: InvocationStatus::Completed,
            elapsed,
        }
    }

    pub fn crashed(output: Vec<u8>, fault: Fault, elapsed: Duration) -> Self {
        Self {
            output,
            value: None,
            status: InvocationStatus::Crashed(fault),
            elapsed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, InvocationStatus::Completed)
    }

    pub fn fault(&self) -> Option<&Fault> {
        match &self.status {
            InvocationStatus::Completed => None,
            InvocationStatus::Crashed(fault) => Some(fault),
        }
    }

    /// Output decoded as UTF-8 (lossy)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

/// Runs callables with an optional time budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invoker {
    timeout: Option<Duration>,
}

impl Invoker {
    /// Invoker without a time budget
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Budget in milliseconds, `0` meaning unbounded
    pub fn from_budget_ms(budget_ms: u64) -> Self {
        if budget_ms == 0 {
            Self::new()
        } else {
            Self::with_timeout(Duration::from_millis(budget_ms))
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Call `callable` with `args` inside a capture session
    pub fn invoke<A, C>(&self, callable: &Arc<C>, args: A) -> InvocationResult<C::Output>
    where
        A: Send + 'static,
        C: Callable<A>,
        C::Output: Send + 'static,
    {
        let callable = Arc::clone(callable);
        self.run(move || callable.call(args))
    }

    /// Run `f` inside a capture session.
    ///
    /// With a budget, `f` runs on a worker thread pinned to the session
    /// buffer. A worker that outlives its budget is abandoned; whatever it
    /// prints later stays in its own buffer.
    pub fn run<R, F>(&self, f: F) -> InvocationResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let start = Instant::now();
        let buffer = CaptureBuffer::new();

        let outcome = match self.timeout {
            None => capture::capture_into(&buffer, || catch(f)),
            Some(budget) => {
                let pinned = buffer.clone();
                capture::capture_into(&buffer, move || run_with_budget(f, budget, pinned))
            }
        };

        let elapsed = start.elapsed();
        let output = buffer.contents();
        tracing::debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = output.len(),
            completed = outcome.is_ok(),
            "invocation finished"
        );

        match outcome {
            Ok(value) => InvocationResult::completed(output, value, elapsed),
            Err(fault) => InvocationResult::crashed(output, fault, elapsed),
        }
    }
}

fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Fault> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| Fault::panic(panic_message(payload.as_ref())))
}

fn run_with_budget<R, F>(f: F, budget: Duration, buffer: CaptureBuffer) -> Result<R, Fault>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("minos-invocation".to_string())
        .spawn(move || {
            capture::pin_current_thread(buffer);
            let _ = tx.send(catch(f));
        });

    if let Err(e) = spawned {
        return Err(Fault::panic(format!("failed to spawn invocation thread: {}", e)));
    }

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(Fault::timeout(format!(
            "exceeded {}ms budget",
            budget.as_millis()
        ))),
        Err(RecvTimeoutError::Disconnected) => {
            Err(Fault::panic("invocation thread exited without a result"))
        }
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
