//! Student submissions.
//!
//! Everything here is graded against the references in `olympus-exercises`.
//! Output must go through `minos::outln!` so the harness can capture it.

pub mod displaya;
pub mod raid1b;

pub use raid1b::raid1b;
