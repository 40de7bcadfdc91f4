/*!
 * Proxy Module
 * Security proxies, the operation table and cycle hooks
 */

pub mod contained;
pub mod dispatch;
pub mod gc;
mod security_proxy;

pub use contained::ContainedProxy;
pub use dispatch::{binary_op, ternary_pow, BinaryOutcome, CheckMode, Operation};
pub use gc::{Referent, Traverse};
pub use security_proxy::SecurityProxy;

use crate::checker::CheckerRef;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::object::Value;

/// Checker of a proxy
///
/// # Errors
/// `InvalidArgument` when `value` is not a proxy.
pub fn get_checker(value: &Value) -> SecurityResult<CheckerRef> {
    match value {
        Value::Proxy(proxy) => proxy.checker(),
        _ => Err(SecurityError::InvalidArgument(
            "get_checker requires a security proxy".to_string(),
        )),
    }
}

/// Raw target of a proxy; any other value is returned as is
///
/// A cleared proxy yields `None`.
pub fn get_object(value: &Value) -> Value {
    match value {
        Value::Proxy(proxy) => proxy.target().unwrap_or(Value::None),
        other => other.clone(),
    }
}
