//! Configuration error types.

use thiserror::Error;

use crate::scope::ScopeKind;

/// A specialized `Result` type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while assembling method invocation settings.
///
/// Every variant describes a mistake in the caller's assembly code. None of them
/// are retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The supplied scope is missing or is not of the kind this record can be bound to.
    ///
    /// `found` describes what was supplied, `"null"` when no scope was given.
    #[error("Invalid scope: expected a {expected} scope but got {found}")]
    InvalidScopeKind {
        /// The scope kind that was expected
        expected: ScopeKind,
        /// Description of the supplied scope
        found: String,
    },

    /// The supplied module scope belongs to a destroyed application.
    #[error("Invalid scope: module scope '{module}' has been destroyed")]
    DestroyedScope {
        /// Id of the destroyed module
        module: String,
    },

    /// A setter was given a value that violates the field's invariant.
    #[error("Invalid value {value} for '{field}': {reason}")]
    InvalidFieldValue {
        /// The field being set
        field: &'static str,
        /// The rejected value
        value: i64,
        /// The violated constraint
        reason: &'static str,
    },

    /// The record has no live scope to resolve collaborators through.
    #[error("Settings are not bound to a live module scope")]
    Unbound,
}

impl ConfigError {
    pub(crate) fn null_scope(expected: ScopeKind) -> Self {
        Self::InvalidScopeKind {
            expected,
            found: "null".to_string(),
        }
    }

    /// Returns `true` if this error rejected a scope binding.
    #[must_use]
    pub const fn is_invalid_scope(&self) -> bool {
        matches!(
            self,
            Self::InvalidScopeKind { .. } | Self::DestroyedScope { .. }
        )
    }
}
