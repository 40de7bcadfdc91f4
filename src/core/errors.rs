/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use crate::core::types::Permission;
use crate::object::Value;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Security operation result
///
/// # Must Use
/// A failed check means the operation did not happen
#[must_use = "security checks can fail and must be handled"]
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Errors raised by the wrapped objects themselves
///
/// These pass through a proxy unchanged.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum HostError {
    #[error("Type error: {0}")]
    #[diagnostic(code(host::type_error))]
    Type(String),

    #[error("Attribute error: {type_name} object has no attribute {name:?}")]
    #[diagnostic(code(host::attribute_error))]
    Attribute { type_name: String, name: String },

    #[error("Index error: {0}")]
    #[diagnostic(code(host::index_error))]
    Index(String),

    #[error("Key error: {0}")]
    #[diagnostic(code(host::key_error))]
    Key(String),

    #[error("Value error: {0}")]
    #[diagnostic(code(host::value_error))]
    Value(String),

    #[error("Division by zero: {0}")]
    #[diagnostic(code(host::zero_division))]
    ZeroDivision(String),

    #[error("Overflow: {0}")]
    #[diagnostic(code(host::overflow))]
    Overflow(String),

    #[error("Iteration stopped")]
    #[diagnostic(code(host::stop_iteration))]
    StopIteration,
}

impl HostError {
    pub fn type_error(message: impl Into<String>) -> Self {
        HostError::Type(message.into())
    }

    pub fn attribute(type_name: impl ToString, name: impl Into<String>) -> Self {
        HostError::Attribute {
            type_name: type_name.to_string(),
            name: name.into(),
        }
    }
}

/// Unified security error type with miette diagnostics
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum SecurityError {
    #[error("Unauthorized: access to {name:?} of {object:?} requires permission {permission}")]
    #[diagnostic(
        code(security::unauthorized),
        help("The current interaction does not hold this permission.")
    )]
    Unauthorized {
        object: Value,
        name: String,
        permission: Permission,
    },

    #[error("Forbidden attribute: {name:?} on {object:?}")]
    #[diagnostic(
        code(security::forbidden_attribute),
        help("The checker has no permission entry for this name.")
    )]
    ForbiddenAttribute { name: String, object: Value },

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(security::invalid_argument))]
    InvalidArgument(String),

    #[error("No interaction is active on this thread")]
    #[diagnostic(
        code(security::no_interaction),
        help("Start one with new_interaction() before checking named permissions.")
    )]
    NoInteraction,

    #[error("An interaction is already active on this thread")]
    #[diagnostic(
        code(security::existing_interaction),
        help("End the current interaction before starting a new one.")
    )]
    ExistingInteraction,

    #[error("Duplicate definition: {0}")]
    #[diagnostic(code(security::duplication))]
    Duplication(String),

    #[error("Checker resolution for {type_name} did not produce a checker after {depth} factory calls")]
    #[diagnostic(
        code(security::resolution_depth),
        help("A registry factory keeps returning factories. Check the registry entry for this type.")
    )]
    ResolutionDepthExceeded { type_name: String, depth: usize },

    #[error("Security proxy was cleared")]
    #[diagnostic(code(security::proxy_cleared))]
    ProxyCleared,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Host(#[from] HostError),
}

impl SecurityError {
    pub fn unauthorized(object: &Value, name: &str, permission: &Permission) -> Self {
        SecurityError::Unauthorized {
            object: object.clone(),
            name: name.to_string(),
            permission: permission.clone(),
        }
    }

    pub fn forbidden(name: &str, object: &Value) -> Self {
        SecurityError::ForbiddenAttribute {
            name: name.to_string(),
            object: object.clone(),
        }
    }

    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SecurityError::Unauthorized { .. })
    }

    #[inline]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, SecurityError::ForbiddenAttribute { .. })
    }

    /// Both denial kinds, as opposed to target or runtime failures
    #[inline]
    pub fn is_denial(&self) -> bool {
        self.is_unauthorized() || self.is_forbidden()
    }

    /// The name that was checked, for denials
    pub fn checked_name(&self) -> Option<&str> {
        match self {
            SecurityError::Unauthorized { name, .. }
            | SecurityError::ForbiddenAttribute { name, .. } => Some(name),
            _ => None,
        }
    }
}
