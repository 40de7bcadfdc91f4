/*!
 * Limits and Constants
 *
 * Centralized location for the crate's thresholds and reserved names.
 */

// =============================================================================
// CHECKER RESOLUTION
// =============================================================================

/// Maximum number of factory calls while resolving a checker
/// A registry entry whose factory chain never yields a checker fails
/// with `ResolutionDepthExceeded` after this many calls
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 32;

// =============================================================================
// BUILT-IN VALUES
// =============================================================================

/// Longest string, tuple or list a repetition may produce
pub const MAX_REPEAT_LENGTH: usize = 1 << 24;

// =============================================================================
// AUDIT TRAIL
// =============================================================================

/// Check events kept in the in-memory audit ring buffer
pub const DEFAULT_AUDIT_CAPACITY: usize = 1_000;

/// Hard upper bound for a configured audit capacity
pub const MAX_AUDIT_CAPACITY: usize = 100_000;

// =============================================================================
// RESERVED NAMES
// =============================================================================

/// Operation name checked before iterating; also the one name whose
/// absence on the raw target is reported as a plain attribute error
pub const ITER_NAME: &str = "__iter__";

/// Contained-proxy attributes owned by the proxy instead of the target
pub const PARENT_ATTR: &str = "__parent__";
pub const NAME_ATTR: &str = "__name__";

/// Names that any checker grants when it has no entry for them
pub const AVAILABLE_BY_DEFAULT: &[&str] = &[
    "__lt__",
    "__le__",
    "__eq__",
    "__gt__",
    "__ge__",
    "__ne__",
    "__hash__",
    "__bool__",
    "__class__",
    "__providedBy__",
    "__implements__",
    "__repr__",
    "__conform__",
];

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Checker watch level (0 = off, 1 = denials, >1 = everything)
pub const ENV_WATCH_CHECKERS: &str = "SECURITY_WATCH_CHECKERS";

/// Override for `DEFAULT_MAX_RESOLUTION_DEPTH`
pub const ENV_MAX_RESOLUTION_DEPTH: &str = "SECURITY_MAX_RESOLUTION_DEPTH";

/// Override for `DEFAULT_AUDIT_CAPACITY`
pub const ENV_AUDIT_CAPACITY: &str = "SECURITY_AUDIT_CAPACITY";

/// Enable JSON trace output
pub const ENV_TRACE_JSON: &str = "SECURITY_TRACE_JSON";
