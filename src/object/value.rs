/*!
 * Host Values
 *
 * `Value` is the dynamic value every proxied operation consumes and
 * produces. Built-in kinds are handled natively; user-defined objects go
 * through the `HostObject` protocol and proxies through `SecurityProxy`,
 * which interposes the checker on every operation.
 */

use super::builtins::{BoolType, FloatType, IntType, NoneType, SequenceIterator, StrType, TupleType};
use super::ops::{
    builtin_binary, builtin_coerce, builtin_ordering, builtin_pow_mod, builtin_unary, BinaryOp,
    CompareOp, UnaryOp,
};
use super::traits::HostObject;
use crate::core::errors::{HostError, SecurityError, SecurityResult};
use crate::core::types::ObjectType;
use crate::proxy::{self, BinaryOutcome, SecurityProxy};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Dynamic host value
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Tuple(Arc<[Value]>),
    Object(Arc<dyn HostObject>),
    Proxy(SecurityProxy),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    /// Wrap a host object
    pub fn object<T: HostObject>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn is_proxy(&self) -> bool {
        matches!(self, Value::Proxy(_))
    }

    pub fn as_proxy(&self) -> Option<&SecurityProxy> {
        match self {
            Value::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the host object as its concrete type; proxies are opaque
    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        match self {
            Value::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Identity comparison
    ///
    /// Shared values compare by allocation, inline primitives by value.
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Proxy(a), Value::Proxy(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Concrete type used for checker lookup
    pub fn object_type(&self) -> ObjectType {
        match self {
            Value::None => NoneType::object_type(),
            Value::Bool(_) => BoolType::object_type(),
            Value::Int(_) => IntType::object_type(),
            Value::Float(_) => FloatType::object_type(),
            Value::Str(_) => StrType::object_type(),
            Value::Tuple(_) => TupleType::object_type(),
            Value::Object(object) => object.object_type(),
            Value::Proxy(_) => ObjectType::of::<SecurityProxy>(),
        }
    }

    /// Address used in generic representations; 0 for inline values
    pub fn address(&self) -> usize {
        match self {
            Value::Str(s) => Arc::as_ptr(s) as *const () as usize,
            Value::Tuple(t) => Arc::as_ptr(t) as *const () as usize,
            Value::Object(object) => Arc::as_ptr(object) as *const () as usize,
            Value::Proxy(proxy) => proxy.address(),
            _ => 0,
        }
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        self.object_type().name()
    }

    /// Whether the value provides `name`
    ///
    /// Proxies answer through their checked attribute access.
    pub fn has_attr(&self, name: &str) -> bool {
        match self {
            Value::Object(object) => object.has_attr(name),
            // Asks the raw target; no check is made
            Value::Proxy(proxy) => proxy.target().is_ok_and(|target| target.has_attr(name)),
            Value::Str(_) | Value::Tuple(_) => SEQUENCE_PROTOCOL.contains(&name) || is_arithmetic_name(name, true),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => is_arithmetic_name(name, false),
            Value::None => false,
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn get_attr(&self, name: &str) -> SecurityResult<Value> {
        match self {
            Value::Object(object) => object.get_attr(self, name),
            Value::Proxy(proxy) => proxy.get_attr(name),
            _ => Err(HostError::attribute(self.object_type(), name).into()),
        }
    }

    pub fn set_attr(&self, name: &str, value: Value) -> SecurityResult<()> {
        match self {
            Value::Object(object) => object.set_attr(name, value),
            Value::Proxy(proxy) => proxy.set_attr(name, value),
            _ => Err(HostError::attribute(self.object_type(), name).into()),
        }
    }

    pub fn del_attr(&self, name: &str) -> SecurityResult<()> {
        match self {
            Value::Object(object) => object.del_attr(name),
            Value::Proxy(proxy) => proxy.del_attr(name),
            _ => Err(HostError::attribute(self.object_type(), name).into()),
        }
    }

    // =========================================================================
    // Sequences and mappings
    // =========================================================================

    pub fn get_item(&self, key: &Value) -> SecurityResult<Value> {
        match self {
            Value::Object(object) => object.get_item(key),
            Value::Proxy(proxy) => proxy.get_item(key),
            Value::Tuple(items) => {
                let index = sequence_index(items.len(), key, "tuple")?;
                Ok(items[index].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let index = sequence_index(chars.len(), key, "string")?;
                Ok(Value::str(chars[index].to_string()))
            }
            _ => Err(type_error(format!("'{}' object is not subscriptable", self.type_name()))),
        }
    }

    pub fn set_item(&self, key: &Value, value: Value) -> SecurityResult<()> {
        match self {
            Value::Object(object) => object.set_item(key, value),
            Value::Proxy(proxy) => proxy.set_item(key, value),
            _ => Err(type_error(format!(
                "'{}' object does not support item assignment",
                self.type_name()
            ))),
        }
    }

    pub fn del_item(&self, key: &Value) -> SecurityResult<()> {
        match self {
            Value::Object(object) => object.del_item(key),
            Value::Proxy(proxy) => proxy.del_item(key),
            _ => Err(type_error(format!(
                "'{}' object does not support item deletion",
                self.type_name()
            ))),
        }
    }

    pub fn get_slice(&self, start: i64, end: i64) -> SecurityResult<Value> {
        match self {
            Value::Object(object) => object.get_slice(start, end),
            Value::Proxy(proxy) => proxy.get_slice(start, end),
            Value::Tuple(items) => {
                let (lo, hi) = slice_bounds(items.len(), start, end);
                Ok(Value::tuple(items[lo..hi].iter().cloned()))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (lo, hi) = slice_bounds(chars.len(), start, end);
                Ok(Value::str(chars[lo..hi].iter().collect::<String>()))
            }
            _ => Err(type_error(format!("'{}' object is not sliceable", self.type_name()))),
        }
    }

    pub fn set_slice(&self, start: i64, end: i64, value: &Value) -> SecurityResult<()> {
        match self {
            Value::Object(object) => object.set_slice(start, end, value),
            Value::Proxy(proxy) => proxy.set_slice(start, end, value),
            _ => Err(type_error(format!(
                "'{}' object does not support slice assignment",
                self.type_name()
            ))),
        }
    }

    pub fn contains(&self, item: &Value) -> SecurityResult<bool> {
        match self {
            Value::Object(object) => object.contains(item),
            Value::Proxy(proxy) => proxy.contains(item),
            Value::Tuple(items) => {
                for candidate in items.iter() {
                    if candidate.equals(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Value::Str(s) => match item {
                Value::Str(needle) => Ok(s.contains(&**needle)),
                other => Err(type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                ))),
            },
            _ => Err(type_error(format!(
                "argument of type '{}' is not iterable",
                self.type_name()
            ))),
        }
    }

    pub fn length(&self) -> SecurityResult<usize> {
        match self {
            Value::Object(object) => object.length(),
            Value::Proxy(proxy) => proxy.len(),
            Value::Tuple(items) => Ok(items.len()),
            Value::Str(s) => Ok(s.chars().count()),
            _ => Err(type_error(format!("object of type '{}' has no len()", self.type_name()))),
        }
    }

    // =========================================================================
    // Iteration and calls
    // =========================================================================

    /// Produce an iterator value
    pub fn iterate(&self) -> SecurityResult<Value> {
        match self {
            Value::Object(object) => object.iterate(self),
            Value::Proxy(proxy) => proxy.iter(),
            Value::Tuple(_) | Value::Str(_) => Ok(Value::object(SequenceIterator::new(self.clone()))),
            _ => Err(type_error(format!("'{}' object is not iterable", self.type_name()))),
        }
    }

    /// Advance an iterator value; `None` when exhausted
    pub fn next_item(&self) -> SecurityResult<Option<Value>> {
        match self {
            Value::Object(object) => object.next_item(),
            Value::Proxy(proxy) => proxy.next_item(),
            _ => Err(type_error(format!("'{}' object is not an iterator", self.type_name()))),
        }
    }

    /// Iterate with a Rust iterator
    pub fn try_iter(&self) -> SecurityResult<ValueIter> {
        Ok(ValueIter {
            iterator: Some(self.iterate()?),
        })
    }

    pub fn call(&self, args: &[Value]) -> SecurityResult<Value> {
        match self {
            Value::Object(object) => object.call(args),
            Value::Proxy(proxy) => proxy.call(args),
            _ => Err(type_error(format!("'{}' object is not callable", self.type_name()))),
        }
    }

    // =========================================================================
    // Representation, hashing, comparison and truth
    // =========================================================================

    pub fn to_str(&self) -> SecurityResult<String> {
        match self {
            Value::Str(s) => Ok(s.to_string()),
            Value::Object(object) => object.to_str(self),
            Value::Proxy(proxy) => proxy.to_str(),
            _ => self.repr(),
        }
    }

    pub fn repr(&self) -> SecurityResult<String> {
        match self {
            Value::None => Ok("None".to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(format!("{:?}", f)),
            Value::Str(s) => Ok(quote(s)),
            Value::Tuple(items) => {
                let parts = items
                    .iter()
                    .map(Value::repr)
                    .collect::<SecurityResult<Vec<_>>>()?;
                Ok(format_tuple(&parts))
            }
            Value::Object(object) => object.repr(self),
            Value::Proxy(proxy) => proxy.repr(),
        }
    }

    pub fn hash_value(&self) -> SecurityResult<u64> {
        let mut hasher = DefaultHasher::new();
        match self {
            Value::None => 0u8.hash(&mut hasher),
            Value::Bool(b) => (*b as i64).hash(&mut hasher),
            Value::Int(i) => i.hash(&mut hasher),
            Value::Float(f) => {
                // Integral floats hash like the equal int
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    (*f as i64).hash(&mut hasher)
                } else {
                    f.to_bits().hash(&mut hasher)
                }
            }
            Value::Str(s) => s.hash(&mut hasher),
            Value::Tuple(items) => {
                for item in items.iter() {
                    item.hash_value()?.hash(&mut hasher);
                }
            }
            Value::Object(object) => return object.hash_value(self),
            Value::Proxy(proxy) => return proxy.hash_value(),
        }
        Ok(hasher.finish())
    }

    /// Rich comparison
    pub fn compare(&self, op: CompareOp, other: &Value) -> SecurityResult<Value> {
        match self {
            Value::Proxy(proxy) => return proxy.compare(op, other),
            Value::Object(object) => {
                if let Some(result) = object.compare(self, op, other)? {
                    return Ok(result);
                }
            }
            _ => {}
        }
        match other {
            Value::Proxy(proxy) => return proxy.compare(op.swapped(), self),
            Value::Object(object) => {
                if let Some(result) = object.compare(other, op.swapped(), self)? {
                    return Ok(result);
                }
            }
            _ => {}
        }

        if let Some(ordering) = builtin_ordering(self, other) {
            return Ok(Value::Bool(op.matches(ordering)));
        }
        if let (Value::Tuple(a), Value::Tuple(b)) = (self, other) {
            if matches!(op, CompareOp::Eq | CompareOp::Ne) {
                let equal = tuples_equal(a, b)?;
                return Ok(Value::Bool(equal == (op == CompareOp::Eq)));
            }
        }
        // Unordered numbers (NaN) are only unequal
        if is_number(self) && is_number(other) {
            return Ok(Value::Bool(op == CompareOp::Ne));
        }
        match op {
            CompareOp::Eq => Ok(Value::Bool(self.is(other))),
            CompareOp::Ne => Ok(Value::Bool(!self.is(other))),
            _ => Err(type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                compare_symbol(op),
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// Equality as a plain boolean
    pub fn equals(&self, other: &Value) -> SecurityResult<bool> {
        self.compare(CompareOp::Eq, other)?.truth()
    }

    pub fn truth(&self) -> SecurityResult<bool> {
        match self {
            Value::None => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) => Ok(*f != 0.0),
            Value::Str(s) => Ok(!s.is_empty()),
            Value::Tuple(items) => Ok(!items.is_empty()),
            Value::Object(object) => object.truth(),
            Value::Proxy(proxy) => proxy.truth(),
        }
    }

    // =========================================================================
    // Numeric protocol
    // =========================================================================

    pub fn unary(&self, op: UnaryOp) -> SecurityResult<Value> {
        let result = match self {
            Value::Proxy(proxy) => return proxy.unary(op),
            Value::Object(object) => object.unary(op)?,
            _ => builtin_unary(op, self)?,
        };
        result.ok_or_else(|| {
            type_error(format!(
                "bad operand type for {}: '{}'",
                op.name(),
                self.type_name()
            ))
        })
    }

    /// Binary operation with full operand dispatch
    pub fn binary(&self, op: BinaryOp, other: &Value) -> SecurityResult<Value> {
        self.try_binary(op, other)?
            .ok_or_else(|| unsupported_operands(op.symbol(), self, other))
    }

    /// Binary operation; `None` when neither operand implements it
    pub fn try_binary(&self, op: BinaryOp, other: &Value) -> SecurityResult<Option<Value>> {
        if self.is_proxy() || other.is_proxy() {
            return proxy::binary_op(op, self, other).map(BinaryOutcome::into_option);
        }
        if let Value::Object(object) = self {
            if let Some(result) = object.binary(self, op, other, false)? {
                return Ok(Some(result));
            }
        }
        if let Value::Object(object) = other {
            if let Some(result) = object.binary(other, op, self, true)? {
                return Ok(Some(result));
            }
        }
        builtin_binary(op, self, other)
    }

    /// In-place operation, falling back to the binary form
    pub fn inplace(&self, op: BinaryOp, other: &Value) -> SecurityResult<Value> {
        match self {
            Value::Proxy(proxy) => proxy.inplace(op, other),
            Value::Object(object) => match object.inplace(self, op, other)? {
                Some(result) => Ok(result),
                None => self.binary(op, other),
            },
            _ => self.binary(op, other),
        }
    }

    /// `pow(self, exp)` or `pow(self, exp, modulus)`
    pub fn pow(&self, exp: &Value, modulus: Option<&Value>) -> SecurityResult<Value> {
        let Some(modulus) = modulus else {
            return self.binary(BinaryOp::Pow, exp);
        };

        let result = if self.is_proxy() || exp.is_proxy() || modulus.is_proxy() {
            proxy::ternary_pow(self, exp, modulus)?.into_option()
        } else if let Value::Object(object) = self {
            object.ternary_pow(self, exp, modulus)?
        } else {
            builtin_pow_mod(self, exp, modulus)?
        };
        result.ok_or_else(|| unsupported_operands("pow()", self, exp))
    }

    /// Coerce two values to a common kind; `None` when not possible
    pub fn coerce(&self, other: &Value) -> SecurityResult<Option<(Value, Value)>> {
        match (self, other) {
            (Value::Proxy(proxy), _) => proxy.coerce(other),
            // The proxy coerces from its own side; swap the pair back
            (_, Value::Proxy(proxy)) => Ok(proxy.coerce(self)?.map(|(right, left)| (left, right))),
            (Value::Object(object), _) => object.coerce(self, other),
            (_, Value::Object(object)) => Ok(object
                .coerce(other, self)?
                .map(|(right, left)| (left, right))),
            _ => Ok(builtin_coerce(self, other)),
        }
    }
}

/// Iterator adaptor over a host iterator value
pub struct ValueIter {
    iterator: Option<Value>,
}

impl Iterator for ValueIter {
    type Item = SecurityResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let iterator = self.iterator.as_ref()?;
        match iterator.next_item() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.iterator = None;
                None
            }
            Err(err) => {
                self.iterator = None;
                Some(Err(err))
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|item| format!("{:?}", item)).collect();
                f.write_str(&format_tuple(&parts))
            }
            Value::Object(object) => {
                write!(f, "<{} object at {:#x}>", object.object_type(), self.address())
            }
            Value::Proxy(proxy) => f.write_str(&proxy.default_repr()),
            // Inline values never fail to render
            other => match other.repr() {
                Ok(repr) => f.write_str(&repr),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

/// Structural equality for built-in kinds, identity for objects and proxies
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => self.is(other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<SecurityProxy> for Value {
    fn from(proxy: SecurityProxy) -> Self {
        Value::Proxy(proxy)
    }
}

impl From<Arc<dyn HostObject>> for Value {
    fn from(object: Arc<dyn HostObject>) -> Self {
        Value::Object(object)
    }
}

// =============================================================================
// Helpers
// =============================================================================

const SEQUENCE_PROTOCOL: &[&str] = &[
    "__iter__",
    "__len__",
    "__getitem__",
    "__getslice__",
    "__contains__",
    "__str__",
    "__repr__",
    "__hash__",
];

fn is_arithmetic_name(name: &str, sequence: bool) -> bool {
    if sequence {
        return matches!(name, "__add__" | "__mul__" | "__rmul__");
    }
    BinaryOp::ALL
        .iter()
        .any(|op| op.name() == name || op.reflected_name() == name)
        || UnaryOp::ALL.iter().any(|op| op.name() == name)
        || name == "__coerce__"
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Int(_) | Value::Float(_))
}

fn type_error(message: String) -> SecurityError {
    HostError::type_error(message).into()
}

fn unsupported_operands(symbol: &str, lhs: &Value, rhs: &Value) -> SecurityError {
    type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        symbol,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn compare_symbol(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

fn tuples_equal(a: &[Value], b: &[Value]) -> SecurityResult<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b.iter()) {
        if !x.equals(y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn format_tuple(parts: &[String]) -> String {
    match parts {
        [single] => format!("({},)", single),
        _ => format!("({})", parts.join(", ")),
    }
}

/// Resolve a possibly negative index against `len`
pub(crate) fn sequence_index(len: usize, key: &Value, kind: &str) -> SecurityResult<usize> {
    let index = key.as_int().ok_or_else(|| {
        type_error(format!("{} indices must be integers, not {}", kind, key.type_name()))
    })?;
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(HostError::Index(format!("{} index out of range", kind)).into());
    }
    Ok(resolved as usize)
}

/// Clamp slice bounds the way sequence slicing does
pub(crate) fn slice_bounds(len: usize, start: i64, end: i64) -> (usize, usize) {
    let len = len as i64;
    let clamp = |i: i64| -> i64 {
        let i = if i < 0 { i + len } else { i };
        i.clamp(0, len)
    };
    let lo = clamp(start);
    let hi = clamp(end).max(lo);
    (lo as usize, hi as usize)
}
