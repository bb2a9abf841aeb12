//! Error types used by the phasevisor runtime and participants.
//!
//! This module defines four error enums:
//!
//! - [`RuntimeError`]: errors that abort a whole orchestration run.
//! - [`PhaseError`]: errors raised by one participant in one phase.
//! - [`InstantiateError`]: errors raised by a template component factory.
//! - [`WaitError`]: outcomes other than success observed by signal waiters.
//!
//! All of them provide `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` (human-readable details).

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors that abort an orchestration run.
///
/// Anything that escapes the per-template and per-participant containment
/// ends up here. The same value is returned from
/// [`Orchestrator::run`](crate::Orchestrator::run) and injected into the
/// [`InitSignal`](crate::InitSignal), hence `Clone`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// The orchestrator's runtime token was cancelled before the run finished.
    #[error("orchestration cancelled before {stage}")]
    Canceled {
        /// Stage that was about to start (e.g. `"discovery"`, `"bind"`).
        stage: &'static str,
    },

    /// The orchestration machinery itself panicked.
    #[error("orchestration panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: Arc<str>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use phasevisor::RuntimeError;
    ///
    /// let err = RuntimeError::Canceled { stage: "discovery" };
    /// assert_eq!(err.as_label(), "runtime_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Canceled { .. } => "runtime_canceled",
            RuntimeError::Panicked { .. } => "runtime_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Canceled { stage } => format!("cancelled before {stage}"),
            RuntimeError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by a participant phase method.
///
/// A phase error is local to one participant and one phase: siblings keep
/// running and the same participant still runs the following phases.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum PhaseError {
    /// The phase method reported a failure.
    #[error("phase failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The participant did not settle within the configured phase deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The phase method panicked.
    #[error("phase panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The participant observed cancellation and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl PhaseError {
    /// Shorthand for [`PhaseError::Fail`].
    ///
    /// # Example
    /// ```
    /// use phasevisor::PhaseError;
    ///
    /// let err = PhaseError::fail("atlas missing");
    /// assert_eq!(err.as_label(), "phase_failed");
    /// assert_eq!(err.as_message(), "error: atlas missing");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        PhaseError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PhaseError::Fail { .. } => "phase_failed",
            PhaseError::Timeout { .. } => "phase_timeout",
            PhaseError::Panicked { .. } => "phase_panicked",
            PhaseError::Canceled => "phase_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PhaseError::Fail { error } => format!("error: {error}"),
            PhaseError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            PhaseError::Panicked { info } => format!("panic: {info}"),
            PhaseError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Errors produced while instantiating a participant from a template.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum InstantiateError {
    /// The factory reported a failure.
    #[error("instantiation failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The factory panicked.
    #[error("instantiation panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl InstantiateError {
    /// Shorthand for [`InstantiateError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        InstantiateError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            InstantiateError::Fail { .. } => "instantiate_failed",
            InstantiateError::Panicked { .. } => "instantiate_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            InstantiateError::Fail { error } => format!("error: {error}"),
            InstantiateError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Non-success outcomes observed by [`InitSignal::wait`](crate::InitSignal::wait).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum WaitError {
    /// The awaited cycle was cancelled (replaced by a new cycle or cleaned up).
    #[error("initialization cycle cancelled")]
    CycleCancelled,

    /// The awaited cycle failed with the injected error.
    #[error("initialization failed: {0}")]
    Failed(#[source] Arc<dyn StdError + Send + Sync>),

    /// The waiter's own cancellation token fired first; the cycle is untouched.
    #[error("wait interrupted by caller")]
    Interrupted,
}

impl WaitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WaitError::CycleCancelled => "wait_cycle_cancelled",
            WaitError::Failed(_) => "wait_failed",
            WaitError::Interrupted => "wait_interrupted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WaitError::CycleCancelled => "cycle cancelled".to_string(),
            WaitError::Failed(e) => format!("failed: {e}"),
            WaitError::Interrupted => "interrupted".to_string(),
        }
    }

    /// Returns true for the two cancellation flavours.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, WaitError::CycleCancelled | WaitError::Interrupted)
    }
}

/// Renders a panic payload the way the runtime reports it.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            RuntimeError::Panicked { info: "x".into() }.as_label(),
            "runtime_panicked"
        );
        assert_eq!(
            PhaseError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .as_label(),
            "phase_timeout"
        );
        assert_eq!(InstantiateError::fail("x").as_label(), "instantiate_failed");
        assert_eq!(WaitError::Interrupted.as_label(), "wait_interrupted");
    }

    #[test]
    fn wait_failed_keeps_source() {
        let inner = RuntimeError::Canceled { stage: "bind" };
        let err = WaitError::Failed(Arc::new(inner));
        assert_eq!(
            err.to_string(),
            "initialization failed: orchestration cancelled before bind"
        );
        assert!(err.source().is_some());
        assert!(!err.is_cancellation());
        assert!(WaitError::CycleCancelled.is_cancellation());
    }

    #[test]
    fn panic_payloads_render() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_info(s.as_ref()), "boom");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_info(s.as_ref()), "bang");
        let s: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_info(s.as_ref()), "unknown panic");
    }
}
