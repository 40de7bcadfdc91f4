/*!
 * Operation Dispatch Table
 *
 * Every operation a proxy forwards, with the name it is checked under and
 * the checker entry point used for it. Binary operators are dispatched
 * here as free functions because either operand may be the proxy.
 */

use super::security_proxy::SecurityProxy;
use crate::core::errors::{HostError, SecurityError, SecurityResult};
use crate::object::{BinaryOp, CompareOp, UnaryOp, Value};
use std::fmt;

/// How an operation is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// `checker.check`
    Check,
    /// `checker.check_getattr`
    GetAttr,
    /// `checker.check_setattr`
    SetAttr,
    /// Forwarded without a check
    Unchecked,
}

/// Operation categories forwarded by a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAttr,
    SetAttr,
    DelAttr,
    GetItem,
    SetItem,
    DelItem,
    GetSlice,
    SetSlice,
    Contains,
    Len,
    Iter,
    Next,
    Call,
    Str,
    Repr,
    Hash,
    Compare(CompareOp),
    Truth,
    Coerce,
    Unary(UnaryOp),
    /// Proxy is the left operand
    Binary(BinaryOp),
    /// Proxy is the right operand
    Reflected(BinaryOp),
    InPlace(BinaryOp),
    /// Proxy is the modulus of a three-argument `pow`
    TernaryPow,
}

impl Operation {
    /// Name checked for this operation
    ///
    /// Attribute operations have none; they are checked under the
    /// attribute name itself.
    pub const fn check_name(self) -> Option<&'static str> {
        let name = match self {
            Operation::GetAttr | Operation::SetAttr | Operation::DelAttr => return None,
            Operation::GetItem => "__getitem__",
            Operation::SetItem => "__setitem__",
            Operation::DelItem => "__delitem__",
            Operation::GetSlice => "__getslice__",
            Operation::SetSlice => "__setslice__",
            Operation::Contains => "__contains__",
            Operation::Len => "__len__",
            Operation::Iter => "__iter__",
            Operation::Next => "__next__",
            Operation::Call => "__call__",
            Operation::Str => "__str__",
            Operation::Repr => "__repr__",
            Operation::Hash => "__hash__",
            Operation::Compare(op) => op.name(),
            Operation::Truth => "__bool__",
            Operation::Coerce => "__coerce__",
            Operation::Unary(op) => op.name(),
            Operation::Binary(op) => op.name(),
            Operation::Reflected(op) => op.reflected_name(),
            Operation::InPlace(op) => match op.inplace_name() {
                Some(name) => name,
                None => op.name(),
            },
            Operation::TernaryPow => "__3pow__",
        };
        Some(name)
    }

    /// Checker entry point for this operation
    pub const fn mode(self) -> CheckMode {
        match self {
            Operation::GetAttr | Operation::Next => CheckMode::GetAttr,
            Operation::SetAttr | Operation::DelAttr => CheckMode::SetAttr,
            Operation::Hash | Operation::Compare(_) | Operation::Truth => CheckMode::Unchecked,
            _ => CheckMode::Check,
        }
    }

    /// Every operation, one entry per operator
    pub fn all() -> Vec<Operation> {
        let mut ops = vec![
            Operation::GetAttr,
            Operation::SetAttr,
            Operation::DelAttr,
            Operation::GetItem,
            Operation::SetItem,
            Operation::DelItem,
            Operation::GetSlice,
            Operation::SetSlice,
            Operation::Contains,
            Operation::Len,
            Operation::Iter,
            Operation::Next,
            Operation::Call,
            Operation::Str,
            Operation::Repr,
            Operation::Hash,
            Operation::Truth,
            Operation::Coerce,
            Operation::TernaryPow,
        ];
        ops.extend(CompareOp::ALL.into_iter().map(Operation::Compare));
        ops.extend(UnaryOp::ALL.into_iter().map(Operation::Unary));
        ops.extend(BinaryOp::ALL.into_iter().map(Operation::Binary));
        ops.extend(BinaryOp::ALL.into_iter().map(Operation::Reflected));
        ops.extend(
            BinaryOp::ALL
                .into_iter()
                .filter(|op| op.inplace_name().is_some())
                .map(Operation::InPlace),
        );
        ops
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.check_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:?}", self),
        }
    }
}

/// Result of a binary operation dispatched through a proxy
#[derive(Debug, Clone)]
pub enum BinaryOutcome {
    Done(Value),
    /// Neither operand is a proxy; the host falls back to its own dispatch
    NotImplemented,
}

impl BinaryOutcome {
    pub fn into_option(self) -> Option<Value> {
        match self {
            BinaryOutcome::Done(value) => Some(value),
            BinaryOutcome::NotImplemented => None,
        }
    }

    #[inline]
    pub fn is_implemented(&self) -> bool {
        matches!(self, BinaryOutcome::Done(_))
    }
}

/// Binary operator with a proxy on either side
///
/// A proxied left operand is checked under `__op__`, otherwise a proxied
/// right operand under `__rop__`. The operation itself is then performed on
/// the unwrapped operand with the other one untouched.
pub fn binary_op(op: BinaryOp, lhs: &Value, rhs: &Value) -> SecurityResult<BinaryOutcome> {
    if let Value::Proxy(proxy) = lhs {
        return proxy
            .forward(Operation::Binary(op), op.name(), |target| target.binary(op, rhs))
            .map(BinaryOutcome::Done);
    }
    if let Value::Proxy(proxy) = rhs {
        return proxy
            .forward(Operation::Reflected(op), op.reflected_name(), |target| {
                lhs.binary(op, target)
            })
            .map(BinaryOutcome::Done);
    }
    Ok(BinaryOutcome::NotImplemented)
}

/// Three-argument `pow` with a proxy in any position
pub fn ternary_pow(base: &Value, exp: &Value, modulus: &Value) -> SecurityResult<BinaryOutcome> {
    let pow = BinaryOp::Pow;
    let result = if let Value::Proxy(proxy) = base {
        proxy.forward(Operation::Binary(pow), pow.name(), |target| {
            target.pow(exp, Some(modulus))
        })
    } else if let Value::Proxy(proxy) = exp {
        proxy.forward(Operation::Reflected(pow), pow.reflected_name(), |target| {
            base.pow(target, Some(modulus))
        })
    } else if let Value::Proxy(proxy) = modulus {
        proxy.forward(Operation::TernaryPow, "__3pow__", |target| {
            base.pow(exp, Some(target))
        })
    } else {
        return Ok(BinaryOutcome::NotImplemented);
    };
    result.map(BinaryOutcome::Done)
}

impl SecurityProxy {
    /// Perform `op` on this proxy with positional arguments
    ///
    /// Arguments by operation:
    /// - attribute ops: name, then the value for `SetAttr`
    /// - item ops: key, then the value for `SetItem`
    /// - slice ops: start, end, then the value for `SetSlice`
    /// - `Reflected`: the left operand; `TernaryPow`: base and exponent
    /// - `Call`: the call arguments; other binary forms: the other operand
    pub fn dispatch(&self, op: Operation, args: &[Value]) -> SecurityResult<Value> {
        let arg = |index: usize| -> SecurityResult<&Value> {
            args.get(index).ok_or_else(|| {
                SecurityError::InvalidArgument(format!("{} expects argument {}", op, index))
            })
        };
        let name = |index: usize| -> SecurityResult<&str> {
            arg(index)?.as_str().ok_or_else(|| {
                SecurityError::InvalidArgument(format!("{} expects a string name", op))
            })
        };
        let int = |index: usize| -> SecurityResult<i64> {
            arg(index)?.as_int().ok_or_else(|| {
                SecurityError::InvalidArgument(format!("{} expects an integer bound", op))
            })
        };
        let this = Value::Proxy(self.clone());

        match op {
            Operation::GetAttr => self.get_attr(name(0)?),
            Operation::SetAttr => self.set_attr(name(0)?, arg(1)?.clone()).map(|_| Value::None),
            Operation::DelAttr => self.del_attr(name(0)?).map(|_| Value::None),
            Operation::GetItem => self.get_item(arg(0)?),
            Operation::SetItem => self.set_item(arg(0)?, arg(1)?.clone()).map(|_| Value::None),
            Operation::DelItem => self.del_item(arg(0)?).map(|_| Value::None),
            Operation::GetSlice => self.get_slice(int(0)?, int(1)?),
            Operation::SetSlice => self.set_slice(int(0)?, int(1)?, arg(2)?).map(|_| Value::None),
            Operation::Contains => self.contains(arg(0)?).map(Value::Bool),
            Operation::Len => self.len().map(|len| Value::Int(len as i64)),
            Operation::Iter => self.iter(),
            Operation::Next => self
                .next_item()?
                .ok_or_else(|| HostError::StopIteration.into()),
            Operation::Call => self.call(args),
            Operation::Str => self.to_str().map(Value::from),
            Operation::Repr => self.repr().map(Value::from),
            Operation::Hash => self.hash_value().map(|hash| Value::Int(hash as i64)),
            Operation::Compare(cmp) => self.compare(cmp, arg(0)?),
            Operation::Truth => self.truth().map(Value::Bool),
            Operation::Coerce => Ok(match self.coerce(arg(0)?)? {
                Some((left, right)) => Value::tuple([left, right]),
                None => Value::None,
            }),
            Operation::Unary(unary) => self.unary(unary),
            Operation::Binary(binary) => this.binary(binary, arg(0)?),
            Operation::Reflected(binary) => arg(0)?.binary(binary, &this),
            Operation::InPlace(binary) => self.inplace(binary, arg(0)?),
            Operation::TernaryPow => arg(0)?.pow(arg(1)?, Some(&this)),
        }
    }
}
