//! Common types and errors shared by the Olympus grading harness crates.

pub mod error;
pub mod types;

pub use error::{HarnessError, HarnessResult};
pub use types::*;
