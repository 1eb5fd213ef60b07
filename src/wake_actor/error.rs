//! Error types for the wake actor and its host.

use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors surfaced to controllers and to the hosting lifecycle.
///
/// Submitting a command never produces one of these: a command sent to an actor
/// that is gone is silently dropped.
#[derive(Debug, Error, PartialEq)]
pub enum WakerError {
    /// The owner did not answer: it stopped, was never started, or timed out.
    #[error("Wake lock owner unavailable: {0}")]
    OwnerUnavailable(#[from] FrameworkError),

    /// A lifecycle operation needed a running actor and there was none.
    #[error("Waker service is not running")]
    NotRunning,

    /// The configuration could not be read or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
