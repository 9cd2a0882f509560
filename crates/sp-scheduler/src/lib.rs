//! Process-wide single-flight job scheduler.
//!
//! All jobs run one at a time, in submission order, on one dedicated worker
//! thread. Callers block (or await) until their own job finishes.

pub mod error;
pub mod single_flight;

pub use error::{BoxError, SchedulerError};
pub use single_flight::{Pending, SingleFlight};
