/*!
 * Checker Traits
 * The access-control seam consulted by every proxied operation
 */

use super::factory::proxy_value;
use crate::core::errors::SecurityResult;
use crate::core::types::Permission;
use crate::object::Value;
use std::sync::Arc;

/// Access-control policy for a family of objects
///
/// `object` is always the raw target, never the proxy.
pub trait SecurityChecker: Send + Sync {
    /// Permission required to read `name`, if any entry exists
    fn permission_id(&self, name: &str) -> Option<Permission>;

    /// Permission required to write `name`, if any entry exists
    fn setattr_permission_id(&self, name: &str) -> Option<Permission>;

    /// Check an operation or attribute read
    fn check(&self, object: &Value, name: &str) -> SecurityResult<()>;

    /// Check an attribute read
    fn check_getattr(&self, object: &Value, name: &str) -> SecurityResult<()> {
        self.check(object, name)
    }

    /// Check an attribute write or deletion
    fn check_setattr(&self, object: &Value, name: &str) -> SecurityResult<()>;

    /// Wrap a result produced by a checked operation
    fn proxy(&self, value: Value) -> SecurityResult<Value> {
        proxy_value(value)
    }
}

/// Shared checker handle
pub type CheckerRef = Arc<dyn SecurityChecker>;

/// Whether two handles refer to the same checker
#[inline]
pub fn same_checker(a: &CheckerRef, b: &CheckerRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
