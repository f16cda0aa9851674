//! Controller discovery and command sequencing
//!
//! The run is strictly linear:
//!
//! ```text
//! Discovering -> Initialized -> Running(1) -> ... -> Running(n) -> Completed
//!       |                            |                   |
//!       +-------------> Failed <-----+-------------------+
//! ```
//!
//! The first error ends the run. Nothing here terminates the process; the
//! caller decides what an `Err` means for its exit status.

mod discovery;
mod runner;
mod sequencer;
#[cfg(test)]
pub(crate) mod testing;

pub use discovery::{discover, Discovered, ProbeRange, DEFAULT_PROBE_LIMIT};
pub use runner::{execute, Observer, RunOptions, RunSummary, DEFAULT_BAUD_RATE};
#[cfg(feature = "alloc")]
pub use sequencer::RunReport;
pub use sequencer::{ClockPolicy, RunState, Sequencer, StepOutcome};
