//! Pipeline entry points.
//!
//! - `run_batch`: fetch, parse and emit a list of course pages

pub mod batch;

pub use batch::{BatchFailure, BatchOutcome, run_batch};
