/*!
 * Access Queries
 * Ask whether an attribute could be read or written, without doing it
 */

use super::factory::proxy_factory;
use super::traits::CheckerRef;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::object::Value;

/// Proxy `value` and return the proxy's checker and target, or `None` when
/// the value is not proxied at all
fn checked_parts(value: &Value) -> SecurityResult<Option<(CheckerRef, Value)>> {
    match proxy_factory(value.clone(), None)? {
        Value::Proxy(proxy) => Ok(Some((proxy.checker()?, proxy.target()?))),
        _ => Ok(None),
    }
}

/// Whether `name` can be read on `value`
///
/// Values that are never proxied are fully accessible.
///
/// # Errors
/// `ForbiddenAttribute` and other failures propagate; only `Unauthorized`
/// becomes `false`.
pub fn can_access(value: &Value, name: &str) -> SecurityResult<bool> {
    let Some((checker, target)) = checked_parts(value)? else {
        return Ok(true);
    };
    match checker.check_getattr(&target, name) {
        Ok(()) => Ok(true),
        Err(SecurityError::Unauthorized { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Whether `name` can be written on `value`
///
/// A write that is forbidden on a readable name is a read-only attribute
/// and answers `false`; a name that is neither readable nor writable
/// propagates the read `ForbiddenAttribute`.
pub fn can_write(value: &Value, name: &str) -> SecurityResult<bool> {
    let Some((checker, target)) = checked_parts(value)? else {
        return Ok(true);
    };
    match checker.check_setattr(&target, name) {
        Ok(()) => Ok(true),
        Err(SecurityError::Unauthorized { .. }) => Ok(false),
        Err(SecurityError::ForbiddenAttribute { .. }) => {
            match checker.check_getattr(&target, name) {
                Ok(()) | Err(SecurityError::Unauthorized { .. }) => Ok(false),
                Err(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}
