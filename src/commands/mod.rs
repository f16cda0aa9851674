//! CLI command implementations
//!
//! `run` drives a plan through a backend and prints the user-facing lines;
//! `list` prints the backend and plan registries.

mod list;
pub mod run;

pub use list::{list_backends, list_plans};
