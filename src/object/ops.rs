/*!
 * Operators
 * Operator kinds and native arithmetic on built-in values
 */

use super::value::Value;
use crate::core::errors::{HostError, SecurityResult};
use crate::core::limits::MAX_REPEAT_LENGTH;
use std::cmp::Ordering;

/// Unary operators and conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
    Invert,
    Int,
    Float,
    Oct,
    Hex,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 8] = [
        UnaryOp::Neg,
        UnaryOp::Pos,
        UnaryOp::Abs,
        UnaryOp::Invert,
        UnaryOp::Int,
        UnaryOp::Float,
        UnaryOp::Oct,
        UnaryOp::Hex,
    ];

    /// Protocol name used as the check name
    pub const fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "__neg__",
            UnaryOp::Pos => "__pos__",
            UnaryOp::Abs => "__abs__",
            UnaryOp::Invert => "__invert__",
            UnaryOp::Int => "__int__",
            UnaryOp::Float => "__float__",
            UnaryOp::Oct => "__oct__",
            UnaryOp::Hex => "__hex__",
        }
    }
}

/// Binary arithmetic and bitwise operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    TrueDiv,
    FloorDiv,
    Mod,
    DivMod,
    Pow,
    LShift,
    RShift,
    And,
    Xor,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 14] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::TrueDiv,
        BinaryOp::FloorDiv,
        BinaryOp::Mod,
        BinaryOp::DivMod,
        BinaryOp::Pow,
        BinaryOp::LShift,
        BinaryOp::RShift,
        BinaryOp::And,
        BinaryOp::Xor,
        BinaryOp::Or,
    ];

    /// Check name when the proxy is the left operand
    pub const fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "__add__",
            BinaryOp::Sub => "__sub__",
            BinaryOp::Mul => "__mul__",
            BinaryOp::Div => "__div__",
            BinaryOp::TrueDiv => "__truediv__",
            BinaryOp::FloorDiv => "__floordiv__",
            BinaryOp::Mod => "__mod__",
            BinaryOp::DivMod => "__divmod__",
            BinaryOp::Pow => "__pow__",
            BinaryOp::LShift => "__lshift__",
            BinaryOp::RShift => "__rshift__",
            BinaryOp::And => "__and__",
            BinaryOp::Xor => "__xor__",
            BinaryOp::Or => "__or__",
        }
    }

    /// Check name when the proxy is the right operand
    pub const fn reflected_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "__radd__",
            BinaryOp::Sub => "__rsub__",
            BinaryOp::Mul => "__rmul__",
            BinaryOp::Div => "__rdiv__",
            BinaryOp::TrueDiv => "__rtruediv__",
            BinaryOp::FloorDiv => "__rfloordiv__",
            BinaryOp::Mod => "__rmod__",
            BinaryOp::DivMod => "__rdivmod__",
            BinaryOp::Pow => "__rpow__",
            BinaryOp::LShift => "__rlshift__",
            BinaryOp::RShift => "__rrshift__",
            BinaryOp::And => "__rand__",
            BinaryOp::Xor => "__rxor__",
            BinaryOp::Or => "__ror__",
        }
    }

    /// Check name for the in-place form; `divmod` has none
    pub const fn inplace_name(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("__iadd__"),
            BinaryOp::Sub => Some("__isub__"),
            BinaryOp::Mul => Some("__imul__"),
            BinaryOp::Div => Some("__idiv__"),
            BinaryOp::TrueDiv => Some("__itruediv__"),
            BinaryOp::FloorDiv => Some("__ifloordiv__"),
            BinaryOp::Mod => Some("__imod__"),
            BinaryOp::DivMod => None,
            BinaryOp::Pow => Some("__ipow__"),
            BinaryOp::LShift => Some("__ilshift__"),
            BinaryOp::RShift => Some("__irshift__"),
            BinaryOp::And => Some("__iand__"),
            BinaryOp::Xor => Some("__ixor__"),
            BinaryOp::Or => Some("__ior__"),
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::TrueDiv => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::DivMod => "divmod()",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
        }
    }
}

/// Rich comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Gt,
        CompareOp::Ge,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            CompareOp::Lt => "__lt__",
            CompareOp::Le => "__le__",
            CompareOp::Eq => "__eq__",
            CompareOp::Ne => "__ne__",
            CompareOp::Gt => "__gt__",
            CompareOp::Ge => "__ge__",
        }
    }

    /// Operator with the operands swapped
    pub const fn swapped(self) -> CompareOp {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    #[inline]
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Numeric view of a built-in value
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Bool(b) => Some(Number::Int(*b as i64)),
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

fn to_f64(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}

fn overflow(op: BinaryOp) -> HostError {
    HostError::Overflow(format!("integer overflow in {}", op.symbol()))
}

fn zero_division(what: &str) -> HostError {
    HostError::ZeroDivision(format!("integer {} by zero", what))
}

/// `None` only for `i64::MIN / -1`
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

/// Length of `len` items repeated `times` times, bounded by `MAX_REPEAT_LENGTH`
pub(crate) fn repeat_length(len: usize, times: i64) -> SecurityResult<usize> {
    let times = usize::try_from(times.max(0)).unwrap_or(usize::MAX);
    len.checked_mul(times)
        .filter(|total| *total <= MAX_REPEAT_LENGTH)
        .ok_or_else(|| {
            HostError::Overflow(format!("repeated sequence longer than {}", MAX_REPEAT_LENGTH)).into()
        })
}

fn float_mod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> SecurityResult<Value> {
    let value = match op {
        BinaryOp::Add => Value::Int(a.checked_add(b).ok_or_else(|| overflow(op))?),
        BinaryOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(|| overflow(op))?),
        BinaryOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(|| overflow(op))?),
        BinaryOp::Div | BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(zero_division("division").into());
            }
            Value::Int(floor_div(a, b).ok_or_else(|| overflow(op))?)
        }
        BinaryOp::TrueDiv => {
            if b == 0 {
                return Err(zero_division("division").into());
            }
            Value::Float(a as f64 / b as f64)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(zero_division("modulo").into());
            }
            Value::Int(floor_mod(a, b))
        }
        BinaryOp::DivMod => {
            if b == 0 {
                return Err(zero_division("divmod").into());
            }
            let quotient = floor_div(a, b).ok_or_else(|| overflow(op))?;
            Value::tuple([Value::Int(quotient), Value::Int(floor_mod(a, b))])
        }
        BinaryOp::Pow => {
            if b < 0 {
                Value::Float((a as f64).powf(b as f64))
            } else {
                let exp = u32::try_from(b).map_err(|_| overflow(op))?;
                Value::Int(a.checked_pow(exp).ok_or_else(|| overflow(op))?)
            }
        }
        BinaryOp::LShift | BinaryOp::RShift => {
            if b < 0 {
                return Err(HostError::Value("negative shift count".into()).into());
            }
            let shift = u32::try_from(b).unwrap_or(u32::MAX);
            if op == BinaryOp::LShift {
                let shifted = a.checked_shl(shift).ok_or_else(|| overflow(op))?;
                if shifted >> shift != a {
                    return Err(overflow(op).into());
                }
                Value::Int(shifted)
            } else if shift >= 64 {
                Value::Int(if a < 0 { -1 } else { 0 })
            } else {
                Value::Int(a >> shift)
            }
        }
        BinaryOp::And => Value::Int(a & b),
        BinaryOp::Xor => Value::Int(a ^ b),
        BinaryOp::Or => Value::Int(a | b),
    };
    Ok(value)
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> SecurityResult<Option<Value>> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div | BinaryOp::TrueDiv => {
            if b == 0.0 {
                return Err(HostError::ZeroDivision("float division by zero".into()).into());
            }
            Value::Float(a / b)
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(HostError::ZeroDivision("float divmod()".into()).into());
            }
            Value::Float((a / b).floor())
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(HostError::ZeroDivision("float modulo".into()).into());
            }
            Value::Float(float_mod(a, b))
        }
        BinaryOp::DivMod => {
            if b == 0.0 {
                return Err(HostError::ZeroDivision("float divmod()".into()).into());
            }
            Value::tuple([Value::Float((a / b).floor()), Value::Float(float_mod(a, b))])
        }
        BinaryOp::Pow => Value::Float(a.powf(b)),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Native binary operation on built-in values
///
/// Returns `None` when the operand kinds do not support `op`, so that the
/// caller can try the operands' own implementations.
pub(crate) fn builtin_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> SecurityResult<Option<Value>> {
    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        match op {
            BinaryOp::And => return Ok(Some(Value::Bool(a & b))),
            BinaryOp::Or => return Ok(Some(Value::Bool(a | b))),
            BinaryOp::Xor => return Ok(Some(Value::Bool(a ^ b))),
            _ => {}
        }
    }

    if let (Some(a), Some(b)) = (as_number(lhs), as_number(rhs)) {
        return match (a, b) {
            (Number::Int(a), Number::Int(b)) => int_binary(op, a, b).map(Some),
            (a, b) => float_binary(op, to_f64(a), to_f64(b)),
        };
    }

    let value = match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Value::str(format!("{}{}", a, b)),
        (BinaryOp::Mul, Value::Str(s), Value::Int(n)) | (BinaryOp::Mul, Value::Int(n), Value::Str(s)) => {
            let total = repeat_length(s.len(), *n)?;
            Value::str(s.repeat(if s.is_empty() { 0 } else { total / s.len() }))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Value::tuple(a.iter().chain(b.iter()).cloned())
        }
        (BinaryOp::Mul, Value::Tuple(t), Value::Int(n)) | (BinaryOp::Mul, Value::Int(n), Value::Tuple(t)) => {
            let total = repeat_length(t.len(), *n)?;
            Value::tuple(t.iter().cloned().cycle().take(total))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Native modular exponentiation for integers
pub(crate) fn builtin_pow_mod(base: &Value, exp: &Value, modulus: &Value) -> SecurityResult<Option<Value>> {
    let (Some(Number::Int(base)), Some(Number::Int(exp)), Some(Number::Int(modulus))) =
        (as_number(base), as_number(exp), as_number(modulus))
    else {
        return Ok(None);
    };
    if modulus == 0 {
        return Err(HostError::Value("pow() 3rd argument cannot be 0".into()).into());
    }
    if exp < 0 {
        return Err(HostError::Value(
            "pow() 2nd argument cannot be negative when 3rd argument specified".into(),
        )
        .into());
    }

    let m = modulus as i128;
    let mut result: i128 = 1;
    let mut b = (base as i128).rem_euclid(m);
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m);
        }
        b = (b * b).rem_euclid(m);
        e >>= 1;
    }
    // Result takes the sign of the modulus
    let result = if m < 0 && result > 0 { result + m } else { result };
    Ok(Some(Value::Int(result as i64)))
}

/// Native unary operation on built-in values
pub(crate) fn builtin_unary(op: UnaryOp, value: &Value) -> SecurityResult<Option<Value>> {
    let result = match (op, value) {
        (UnaryOp::Neg, Value::Bool(b)) => Value::Int(-(*b as i64)),
        (UnaryOp::Neg, Value::Int(i)) => Value::Int(
            i.checked_neg()
                .ok_or_else(|| HostError::Overflow("integer negation".into()))?,
        ),
        (UnaryOp::Neg, Value::Float(f)) => Value::Float(-f),
        (UnaryOp::Pos, Value::Bool(b)) => Value::Int(*b as i64),
        (UnaryOp::Pos, Value::Int(i)) => Value::Int(*i),
        (UnaryOp::Pos, Value::Float(f)) => Value::Float(*f),
        (UnaryOp::Abs, Value::Bool(b)) => Value::Int(*b as i64),
        (UnaryOp::Abs, Value::Int(i)) => Value::Int(
            i.checked_abs()
                .ok_or_else(|| HostError::Overflow("integer absolute value".into()))?,
        ),
        (UnaryOp::Abs, Value::Float(f)) => Value::Float(f.abs()),
        (UnaryOp::Invert, Value::Bool(b)) => Value::Int(!(*b as i64)),
        (UnaryOp::Invert, Value::Int(i)) => Value::Int(!i),
        (UnaryOp::Int, Value::Bool(b)) => Value::Int(*b as i64),
        (UnaryOp::Int, Value::Int(i)) => Value::Int(*i),
        (UnaryOp::Int, Value::Float(f)) => {
            if !f.is_finite() {
                return Err(HostError::Overflow("cannot convert float to integer".into()).into());
            }
            Value::Int(f.trunc() as i64)
        }
        (UnaryOp::Int, Value::Str(s)) => Value::Int(s.trim().parse::<i64>().map_err(|_| {
            HostError::Value(format!("invalid literal for int(): {:?}", s))
        })?),
        (UnaryOp::Float, Value::Bool(b)) => Value::Float(*b as i64 as f64),
        (UnaryOp::Float, Value::Int(i)) => Value::Float(*i as f64),
        (UnaryOp::Float, Value::Float(f)) => Value::Float(*f),
        (UnaryOp::Float, Value::Str(s)) => Value::Float(s.trim().parse::<f64>().map_err(|_| {
            HostError::Value(format!("could not convert string to float: {:?}", s))
        })?),
        (UnaryOp::Oct, Value::Int(i)) => Value::str(if *i < 0 {
            format!("-0o{:o}", i.unsigned_abs())
        } else {
            format!("0o{:o}", i)
        }),
        (UnaryOp::Hex, Value::Int(i)) => Value::str(if *i < 0 {
            format!("-0x{:x}", i.unsigned_abs())
        } else {
            format!("0x{:x}", i)
        }),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

/// Native ordering of built-in values, `None` if they are not comparable
pub(crate) fn builtin_ordering(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (as_number(lhs)?, as_number(rhs)?) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => to_f64(a).partial_cmp(&to_f64(b)),
        },
    }
}

/// Numeric coercion of two built-in values to a common kind
pub(crate) fn builtin_coerce(lhs: &Value, rhs: &Value) -> Option<(Value, Value)> {
    match (as_number(lhs)?, as_number(rhs)?) {
        (Number::Int(_), Number::Int(_)) | (Number::Float(_), Number::Float(_)) => {
            Some((lhs.clone(), rhs.clone()))
        }
        (a, b) => Some((Value::Float(to_f64(a)), Value::Float(to_f64(b)))),
    }
}
