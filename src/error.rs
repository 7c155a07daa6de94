//! Errors surfaced when a registered callable is invoked.
//!
//! Registration itself never fails. A malformed declaration (wrong arity,
//! mismatched parameter types) is only detected when a runner calls the
//! handle, and is reported through these types.

use thiserror::Error;

/// A single parameter could not be converted to the requested argument type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },
}

/// Invoking a benchmark or setup routine failed before or during the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    #[error("{name}: takes {expected} argument(s) but {found} were bound")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{name}: argument {index}: {source}")]
    Param {
        name: String,
        index: usize,
        #[source]
        source: ParamError,
    },

    #[error("setup for {name} failed: {source}")]
    Setup {
        name: String,
        #[source]
        source: Box<InvokeError>,
    },

    #[error("{name}: {message}")]
    Failed { name: String, message: String },
}

impl InvokeError {
    /// Build a failure for a raw callable that rejected its parameters.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
        }
    }
}
