//! Process-wide output capture.
//!
//! Harness-aware code prints through [`stdout()`] or the [`out!`](crate::out)
//! and [`outln!`](crate::outln) macros. Outside a capture session the bytes go
//! to the real process stdout; inside one they land in the session buffer.
//!
//! A session belongs to the thread that opened it. Other threads only write
//! into a session buffer when pinned to it with [`pin_current_thread`]; any
//! other thread printing while a session is active is diverted to stderr, so
//! a thread left behind by one invocation never pollutes the next.
//!
//! At most one session is active at a time. Sessions do not nest: calling
//! [`capture`] from inside a session blocks forever.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Held for the whole lifetime of a capture session
static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Sink of the active session, if any
static ACTIVE_SINK: Mutex<Option<ActiveSink>> = Mutex::new(None);

struct ActiveSink {
    owner: ThreadId,
    buffer: CaptureBuffer,
}

thread_local! {
    /// Buffer a worker thread writes to regardless of the active session
    static PINNED: RefCell<Option<CaptureBuffer>> = const { RefCell::new(None) };
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared in-memory sink for one capture session
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.0).clone()
    }

    fn append(&self, bytes: &[u8]) {
        lock(&self.0).extend_from_slice(bytes);
    }
}

/// Text captured during a session plus the value the closure returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture<T> {
    pub output: Vec<u8>,
    pub value: T,
}

impl<T> Capture<T> {
    /// Captured output decoded as UTF-8 (lossy)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

/// Active capture session. Dropping it restores the real stdout and then
/// releases the session lock, on every exit path including unwinding.
struct Session<'a> {
    _lock: MutexGuard<'a, ()>,
}

impl Session<'static> {
    fn begin(buffer: CaptureBuffer) -> Self {
        let guard = lock(&SESSION_LOCK);
        *lock(&ACTIVE_SINK) = Some(ActiveSink {
            owner: thread::current().id(),
            buffer,
        });
        Self { _lock: guard }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        *lock(&ACTIVE_SINK) = None;
    }
}

/// Run `f` with harness output redirected into a fresh buffer.
///
/// A panic inside `f` is resumed after the session has been torn down.
pub fn capture<T>(f: impl FnOnce() -> T) -> Capture<T> {
    let buffer = CaptureBuffer::new();
    let value = capture_into(&buffer, f);
    Capture {
        output: buffer.contents(),
        value,
    }
}

/// Run `f` with harness output redirected into `buffer`.
pub fn capture_into<T>(buffer: &CaptureBuffer, f: impl FnOnce() -> T) -> T {
    let _session = Session::begin(buffer.clone());
    f()
}

/// Attach `buffer` to the current thread.
///
/// Everything the thread prints afterwards goes to `buffer`, even once the
/// session that owns it has ended.
pub fn pin_current_thread(buffer: CaptureBuffer) {
    PINNED.with(|pinned| *pinned.borrow_mut() = Some(buffer));
}

/// Handle to the harness output stream
#[derive(Debug, Clone, Copy, Default)]
pub struct HarnessStdout;

/// Get a handle to the harness output stream
pub fn stdout() -> HarnessStdout {
    HarnessStdout
}

/// Where a write from the current thread goes
enum Route {
    Buffer(CaptureBuffer),
    Stray,
    Stdout,
}

impl HarnessStdout {
    fn route(&self) -> Route {
        if let Some(buffer) = PINNED.with(|pinned| pinned.borrow().clone()) {
            return Route::Buffer(buffer);
        }
        match lock(&ACTIVE_SINK).as_ref() {
            Some(active) if active.owner == thread::current().id() => {
                Route::Buffer(active.buffer.clone())
            }
            Some(_) => Route::Stray,
            None => Route::Stdout,
        }
    }
}

impl Write for HarnessStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.route() {
            Route::Buffer(buffer) => {
                buffer.append(buf);
                Ok(buf.len())
            }
            Route::Stray => {
                tracing::warn!(
                    thread = ?thread::current().id(),
                    bytes = buf.len(),
                    "Output from a thread outside the active capture session"
                );
                io::stderr().write(buf)
            }
            Route::Stdout => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.route() {
            Route::Buffer(_) => Ok(()),
            Route::Stray => io::stderr().flush(),
            Route::Stdout => io::stdout().flush(),
        }
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    if let Err(e) = stdout().write_fmt(args) {
        panic!("failed printing to stdout: {}", e);
    }
}

/// Like `print!`, but through the harness output stream
#[macro_export]
macro_rules! out {
    ($($arg:tt)*) => {
        $crate::capture::_print(::std::format_args!($($arg)*))
    };
}

/// Like `println!`, but through the harness output stream
#[macro_export]
macro_rules! outln {
    () => {
        $crate::capture::_print(::std::format_args!("\n"))
    };
    ($($arg:tt)*) => {
        $crate::capture::_print(::std::format_args!("{}\n", ::std::format_args!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::sync::mpsc;

    #[test]
    fn test_capture_returns_printed_text() {
        let captured = capture(|| {
            crate::out!("{}", 2 + 3);
            crate::outln!();
            crate::outln!("done");
            42
        });
        assert_eq!(captured.text(), "5\ndone\n");
        assert_eq!(captured.value, 42);
    }

    #[test]
    fn test_empty_capture() {
        let captured = capture(|| ());
        assert!(captured.output.is_empty());
    }

    #[test]
    fn test_session_released_after_panic() {
        let result = panic::catch_unwind(|| {
            capture(|| {
                crate::outln!("before");
                panic!("boom");
            })
        });
        assert!(result.is_err());

        // Lock released and no leftovers from the failed session
        let captured = capture(|| crate::outln!("after"));
        assert_eq!(captured.text(), "after\n");
    }

    #[test]
    fn test_concurrent_captures_never_interleave() {
        let handles: Vec<_> = (0..8)
            .map(|id| {
                thread::spawn(move || {
                    let captured = capture(|| {
                        for _ in 0..50 {
                            crate::outln!("{}", id);
                            thread::yield_now();
                        }
                    });
                    (id, captured.text().into_owned())
                })
            })
            .collect();

        for handle in handles {
            let (id, text) = handle.join().unwrap();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), 50);
            assert!(lines.iter().all(|l| *l == id.to_string()));
        }
    }

    #[test]
    fn test_pinned_thread_writes_to_its_buffer() {
        let buffer = CaptureBuffer::new();
        let pinned = buffer.clone();
        thread::spawn(move || {
            pin_current_thread(pinned);
            crate::out!("pinned");
        })
        .join()
        .unwrap();
        assert_eq!(buffer.contents(), b"pinned");
    }

    #[test]
    fn test_foreign_thread_stays_out_of_session() {
        let captured = capture(|| {
            crate::out!("owner ");
            thread::spawn(|| crate::out!("stranger")).join().unwrap();
            crate::out!("done");
        });
        assert_eq!(captured.text(), "owner done");
    }

    #[test]
    fn test_lingering_thread_does_not_leak_into_next_session() {
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let first = capture(move || {
            crate::out!("1");
            thread::spawn(move || {
                go_rx.recv().ok();
                crate::out!("LEAK");
                done_tx.send(()).ok();
            });
        });
        let second = capture(|| {
            go_tx.send(()).unwrap();
            done_rx.recv().unwrap();
            crate::out!("2");
        });

        assert_eq!(first.text(), "1");
        assert_eq!(second.text(), "2");
    }
}
