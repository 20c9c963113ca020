//! Compilation errors

use thiserror::Error;

use crate::config::ConfigError;

pub type CompileResult<T> = Result<T, CompileError>;

/// Fatal errors that abort a compilation unit.
///
/// Recoverable problems (such as a register budget that is too small for one
/// method) are reported through [`crate::report::Report`] instead.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Unresolved symbol: {name}")]
    UnresolvedSymbol { name: String },

    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature { feature: String },

    #[error("Register allocation for method '{method}' exceeded every candidate budget")]
    AllocationExhausted { method: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },

    #[error("Malformed AST: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    /// Shorthand for an internal-consistency fault
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::InternalError {
            message: message.into(),
        }
    }

    /// Shorthand for a name that resolves to nothing
    pub fn unresolved(name: impl Into<String>) -> Self {
        CompileError::UnresolvedSymbol { name: name.into() }
    }

    /// Shorthand for an operator or type shape that no stage handles
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CompileError::UnsupportedFeature {
            feature: feature.into(),
        }
    }
}
