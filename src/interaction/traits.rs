/*!
 * Interaction Traits
 */

use crate::core::types::Permission;
use crate::object::Value;
use std::sync::Arc;

/// The party on whose behalf the current thread is acting
///
/// Checkers consult it for every named permission.
pub trait Interaction: Send + Sync {
    /// Whether this interaction holds `permission` on `object`
    fn check_permission(&self, permission: &Permission, object: &Value) -> bool;
}

/// Shared interaction handle
pub type InteractionRef = Arc<dyn Interaction>;
