//! Engine error types.
//!
//! These cover programming-error conditions only. Navigation outcomes
//! (back, cancel) are first-class data, never errors, and failures of the
//! operations a finished wizard goes on to perform are out of scope.

use thiserror::Error;

/// Fatal flow-authoring bugs surfaced by the engine.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("no subcommand registered under '{0}'")]
    UnknownSubcommand(String),

    #[error("flow suspended without yielding a step")]
    SuspendedWithoutStep,

    #[error("flow resumed while no body is running")]
    NotRunning,
}
