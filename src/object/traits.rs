/*!
 * Host Object Protocol
 * Protocol slots that user-defined objects implement to be proxied
 */

use super::ops::{BinaryOp, CompareOp, UnaryOp};
use super::value::Value;
use crate::checker::CheckerRef;
use crate::core::errors::{HostError, SecurityResult};
use crate::core::types::ObjectType;
use std::any::Any;

/// Downcasting support for trait objects
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Checker slot reserved on an object
///
/// An object may carry its own checker, which then wins over the registry.
#[derive(Clone, Default)]
pub enum CheckerSlot {
    /// No attached checker; resolve through the registry
    #[default]
    Unset,
    /// Explicitly attached "no checker"; proxying such an object is an error
    Null,
    /// Attached checker
    Checker(CheckerRef),
}

impl std::fmt::Debug for CheckerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckerSlot::Unset => f.write_str("Unset"),
            CheckerSlot::Null => f.write_str("Null"),
            CheckerSlot::Checker(_) => f.write_str("Checker(..)"),
        }
    }
}

/// Host object protocol
///
/// Every method has a default that behaves like an object without the
/// corresponding capability. Methods that need the object as a value (to
/// return itself, or to build an iterator over itself) receive it as `this`.
///
/// # Returning `None`
/// The `Option` returning slots (`compare`, `unary`, `binary`, `inplace`,
/// `ternary_pow`, `coerce`) use `None` as the "not implemented" signal so
/// that dispatch can try the other operand or a fallback.
pub trait HostObject: AsAny + Send + Sync + 'static {
    /// Concrete type used for checker lookup
    fn object_type(&self) -> ObjectType {
        ObjectType::of::<Self>()
    }

    /// Whether the object natively provides `name`
    fn has_attr(&self, _name: &str) -> bool {
        false
    }

    fn get_attr(&self, _this: &Value, name: &str) -> SecurityResult<Value> {
        Err(HostError::attribute(self.object_type(), name).into())
    }

    fn set_attr(&self, name: &str, _value: Value) -> SecurityResult<()> {
        Err(HostError::attribute(self.object_type(), name).into())
    }

    fn del_attr(&self, name: &str) -> SecurityResult<()> {
        Err(HostError::attribute(self.object_type(), name).into())
    }

    fn get_item(&self, _key: &Value) -> SecurityResult<Value> {
        Err(unsupported(self.object_type(), "is not subscriptable"))
    }

    fn set_item(&self, _key: &Value, _value: Value) -> SecurityResult<()> {
        Err(unsupported(self.object_type(), "does not support item assignment"))
    }

    fn del_item(&self, _key: &Value) -> SecurityResult<()> {
        Err(unsupported(self.object_type(), "does not support item deletion"))
    }

    fn get_slice(&self, _start: i64, _end: i64) -> SecurityResult<Value> {
        Err(unsupported(self.object_type(), "is not sliceable"))
    }

    fn set_slice(&self, _start: i64, _end: i64, _value: &Value) -> SecurityResult<()> {
        Err(unsupported(self.object_type(), "does not support slice assignment"))
    }

    fn contains(&self, _item: &Value) -> SecurityResult<bool> {
        Err(unsupported(self.object_type(), "is not a container"))
    }

    fn length(&self) -> SecurityResult<usize> {
        Err(unsupported(self.object_type(), "has no len()"))
    }

    /// Produce an iterator over the object
    fn iterate(&self, _this: &Value) -> SecurityResult<Value> {
        Err(unsupported(self.object_type(), "is not iterable"))
    }

    /// Advance an iterator; `None` when exhausted
    fn next_item(&self) -> SecurityResult<Option<Value>> {
        Err(unsupported(self.object_type(), "is not an iterator"))
    }

    fn call(&self, _args: &[Value]) -> SecurityResult<Value> {
        Err(unsupported(self.object_type(), "is not callable"))
    }

    fn repr(&self, this: &Value) -> SecurityResult<String> {
        let ty = self.object_type();
        Ok(format!("<{} object at {:#x}>", ty, this.address()))
    }

    fn to_str(&self, this: &Value) -> SecurityResult<String> {
        self.repr(this)
    }

    fn hash_value(&self, this: &Value) -> SecurityResult<u64> {
        Ok(this.address() as u64)
    }

    fn compare(&self, _this: &Value, _op: CompareOp, _other: &Value) -> SecurityResult<Option<Value>> {
        Ok(None)
    }

    fn truth(&self) -> SecurityResult<bool> {
        Ok(true)
    }

    fn unary(&self, _op: UnaryOp) -> SecurityResult<Option<Value>> {
        Ok(None)
    }

    /// Binary operation with `this` on the left, or on the right if `reflected`
    fn binary(
        &self,
        _this: &Value,
        _op: BinaryOp,
        _other: &Value,
        _reflected: bool,
    ) -> SecurityResult<Option<Value>> {
        Ok(None)
    }

    /// In-place operation; `None` falls back to `binary`
    fn inplace(&self, _this: &Value, _op: BinaryOp, _other: &Value) -> SecurityResult<Option<Value>> {
        Ok(None)
    }

    /// `pow(this, exp, modulus)`
    fn ternary_pow(&self, _this: &Value, _exp: &Value, _modulus: &Value) -> SecurityResult<Option<Value>> {
        Ok(None)
    }

    fn coerce(&self, _this: &Value, _other: &Value) -> SecurityResult<Option<(Value, Value)>> {
        Ok(None)
    }

    /// Checker attached to this object
    fn security_checker(&self) -> CheckerSlot {
        CheckerSlot::Unset
    }

    /// Host exception instances are never proxied by the default checker
    fn is_exception(&self) -> bool {
        false
    }

    /// Visit every value this object owns
    fn traverse(&self, _visit: &mut dyn FnMut(&Value)) {}

    /// Release every value this object owns
    fn clear(&self) {}
}

fn unsupported(ty: ObjectType, what: &str) -> crate::core::errors::SecurityError {
    HostError::type_error(format!("'{}' object {}", ty.name(), what)).into()
}
