// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by components under test and the harness.

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a component under test.
///
/// The harness never propagates these to its caller; every probe converts
/// them into an error or warning on the result record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentError {
    /// The component does not implement the requested method.
    #[error("{0} is not supported by this component")]
    Unsupported(String),

    /// The component could not be constructed from the supplied configuration.
    #[error("{0}")]
    Construction(String),

    /// The component rejected its input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upstream provider returned an error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The call did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Unsupported`].
    pub fn unsupported(method: impl Into<String>) -> Self {
        Self::Unsupported(method.into())
    }
}

/// Result type for component calls.
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Faults that escape every per-phase boundary of a test run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Code under test panicked outside a probe boundary.
    #[error("panicked during {phase}: {message}")]
    Panicked {
        /// Pipeline phase that was running.
        phase: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

/// Render a panic payload as text.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
