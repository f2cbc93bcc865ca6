//! Support library for the strata CLI binary.
//!
//! Exposes the command pipeline and logging set-up so doctests and unit tests
//! can exercise them without forking a subprocess.

pub mod cli;
pub mod logging;
