/*!
 * Proxy Construction
 * Wrapping values with their attached or registered checker
 */

use super::traits::{same_checker, CheckerRef};
use crate::core::errors::{SecurityError, SecurityResult};
use crate::object::{CheckerSlot, Value};
use crate::proxy::SecurityProxy;
use crate::registry;

fn attached_checker(value: &Value) -> CheckerSlot {
    match value {
        Value::Object(object) => object.security_checker(),
        _ => CheckerSlot::Unset,
    }
}

/// Checker for `value`: the attached one, else the registry's
fn resolve(value: &Value) -> SecurityResult<Option<CheckerRef>> {
    match attached_checker(value) {
        CheckerSlot::Checker(checker) => Ok(Some(checker)),
        CheckerSlot::Null => Err(SecurityError::InvalidArgument(
            "Invalid value, None, for security checker".to_string(),
        )),
        CheckerSlot::Unset => registry::select_checker(value),
    }
}

/// Default proxy step of every checker
///
/// Proxies pass through unchanged; values without a checker are returned
/// raw; everything else is wrapped.
pub fn proxy_value(value: Value) -> SecurityResult<Value> {
    if value.is_proxy() {
        return Ok(value);
    }
    Ok(match resolve(&value)? {
        Some(checker) => Value::Proxy(SecurityProxy::wrap(value, checker)),
        None => value,
    })
}

/// Proxy `value`, optionally with an explicit checker
///
/// Without an explicit checker, the attached one is used, else the
/// registry's.
///
/// # Errors
/// `InvalidArgument` when `value` is already proxied with a different
/// checker.
pub fn proxy_factory(value: Value, checker: Option<CheckerRef>) -> SecurityResult<Value> {
    if let Value::Proxy(proxy) = &value {
        return match checker {
            None => Ok(value),
            Some(checker) if same_checker(&proxy.checker()?, &checker) => Ok(value),
            Some(_) => Err(SecurityError::InvalidArgument(
                "Can't change proxy checker".to_string(),
            )),
        };
    }

    // An explicit "no checker" slot counts as unattached here
    let checker = match (checker, attached_checker(&value)) {
        (Some(checker), _) => Some(checker),
        (None, CheckerSlot::Checker(attached)) => Some(attached),
        (None, CheckerSlot::Null | CheckerSlot::Unset) => registry::select_checker(&value)?,
    };
    Ok(match checker {
        Some(checker) => Value::Proxy(SecurityProxy::wrap(value, checker)),
        None => value,
    })
}
