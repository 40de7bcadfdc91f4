/*!
 * Built-in Host Types
 *
 * Type markers for the inline value kinds plus a small set of host objects
 * (list, sequence iterator, function, namespace, error) that cover every
 * protocol category a proxy forwards.
 */

use super::ops::{repeat_length, BinaryOp, CompareOp};
use super::traits::{CheckerSlot, HostObject};
use super::value::{sequence_index, slice_bounds, Value};
use crate::core::errors::{HostError, SecurityError, SecurityResult};
use crate::core::types::ObjectType;
use ahash::HashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

macro_rules! builtin_marker {
    ($($marker:ident => $name:literal),* $(,)?) => {
        $(
            #[doc = concat!("Type marker for built-in `", $name, "` values")]
            pub struct $marker;

            impl $marker {
                pub fn object_type() -> ObjectType {
                    ObjectType::builtin::<$marker>($name)
                }
            }
        )*
    };
}

builtin_marker! {
    NoneType => "NoneType",
    BoolType => "bool",
    IntType => "int",
    FloatType => "float",
    StrType => "str",
    TupleType => "tuple",
}

fn collect(value: &Value) -> SecurityResult<Vec<Value>> {
    value.try_iter()?.collect()
}

fn join_reprs(items: &[Value]) -> SecurityResult<String> {
    Ok(items
        .iter()
        .map(Value::repr)
        .collect::<SecurityResult<Vec<_>>>()?
        .join(", "))
}

// =============================================================================
// List
// =============================================================================

/// Mutable sequence
pub struct List {
    items: RwLock<Vec<Value>>,
}

const LIST_ATTRS: &[&str] = &[
    "__getitem__",
    "__setitem__",
    "__delitem__",
    "__getslice__",
    "__setslice__",
    "__len__",
    "__iter__",
    "__contains__",
    "__add__",
    "__radd__",
    "__iadd__",
    "__mul__",
    "__rmul__",
    "__imul__",
    "__str__",
    "__repr__",
    "append",
    "index",
    "count",
];

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn object_type() -> ObjectType {
        ObjectType::builtin::<List>("list")
    }

    /// Wrap a new list as a value
    pub fn value<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::object(List::new(items.into_iter().collect()))
    }

    /// Copy of the current items
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn position(&self, needle: &Value) -> SecurityResult<Option<usize>> {
        for (index, item) in self.snapshot().iter().enumerate() {
            if item.equals(needle)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn bound_method(this: &Value, name: &'static str) -> Value {
        let this = this.clone();
        Value::object(Function::new(name, move |args| {
            let list = this
                .downcast_ref::<List>()
                .ok_or_else(|| HostError::type_error("descriptor requires a list"))?;
            let arg = args
                .first()
                .ok_or_else(|| HostError::type_error(format!("{}() takes exactly one argument", name)))?;
            match name {
                "append" => {
                    list.push(arg.clone());
                    Ok(Value::None)
                }
                "index" => match list.position(arg)? {
                    Some(index) => Ok(Value::Int(index as i64)),
                    None => Err(HostError::Value("value is not in list".into()).into()),
                },
                _ => {
                    let mut count = 0;
                    for item in list.snapshot() {
                        if item.equals(arg)? {
                            count += 1;
                        }
                    }
                    Ok(Value::Int(count))
                }
            }
        }))
    }

    fn repeated(items: &[Value], times: &Value) -> SecurityResult<Option<Vec<Value>>> {
        let Some(times) = times.as_int() else {
            return Ok(None);
        };
        let total = repeat_length(items.len(), times)?;
        Ok(Some(items.iter().cloned().cycle().take(total).collect()))
    }
}

impl HostObject for List {
    fn object_type(&self) -> ObjectType {
        List::object_type()
    }

    fn has_attr(&self, name: &str) -> bool {
        LIST_ATTRS.contains(&name)
    }

    fn get_attr(&self, this: &Value, name: &str) -> SecurityResult<Value> {
        match name {
            "append" => Ok(List::bound_method(this, "append")),
            "index" => Ok(List::bound_method(this, "index")),
            "count" => Ok(List::bound_method(this, "count")),
            _ => Err(HostError::attribute(List::object_type(), name).into()),
        }
    }

    fn get_item(&self, key: &Value) -> SecurityResult<Value> {
        let items = self.items.read();
        let index = sequence_index(items.len(), key, "list")?;
        Ok(items[index].clone())
    }

    fn set_item(&self, key: &Value, value: Value) -> SecurityResult<()> {
        let mut items = self.items.write();
        let index = sequence_index(items.len(), key, "list assignment")?;
        items[index] = value;
        Ok(())
    }

    fn del_item(&self, key: &Value) -> SecurityResult<()> {
        let removed = {
            let mut items = self.items.write();
            let index = sequence_index(items.len(), key, "list assignment")?;
            items.remove(index)
        };
        drop(removed);
        Ok(())
    }

    fn get_slice(&self, start: i64, end: i64) -> SecurityResult<Value> {
        let items = self.items.read();
        let (lo, hi) = slice_bounds(items.len(), start, end);
        Ok(List::value(items[lo..hi].iter().cloned()))
    }

    fn set_slice(&self, start: i64, end: i64, value: &Value) -> SecurityResult<()> {
        let replacement = collect(value)?;
        let mut items = self.items.write();
        let (lo, hi) = slice_bounds(items.len(), start, end);
        items.splice(lo..hi, replacement);
        Ok(())
    }

    fn contains(&self, item: &Value) -> SecurityResult<bool> {
        Ok(self.position(item)?.is_some())
    }

    fn length(&self) -> SecurityResult<usize> {
        Ok(self.len())
    }

    fn iterate(&self, this: &Value) -> SecurityResult<Value> {
        Ok(Value::object(SequenceIterator::new(this.clone())))
    }

    fn repr(&self, _this: &Value) -> SecurityResult<String> {
        Ok(format!("[{}]", join_reprs(&self.snapshot())?))
    }

    fn compare(&self, _this: &Value, op: CompareOp, other: &Value) -> SecurityResult<Option<Value>> {
        let Some(other) = other.downcast_ref::<List>() else {
            return Ok(None);
        };
        if !matches!(op, CompareOp::Eq | CompareOp::Ne) {
            return Ok(None);
        }
        let (mine, theirs) = (self.snapshot(), other.snapshot());
        let mut equal = mine.len() == theirs.len();
        if equal {
            for (a, b) in mine.iter().zip(theirs.iter()) {
                if !a.equals(b)? {
                    equal = false;
                    break;
                }
            }
        }
        Ok(Some(Value::Bool(equal == (op == CompareOp::Eq))))
    }

    fn truth(&self) -> SecurityResult<bool> {
        Ok(!self.is_empty())
    }

    fn binary(
        &self,
        _this: &Value,
        op: BinaryOp,
        other: &Value,
        reflected: bool,
    ) -> SecurityResult<Option<Value>> {
        let items = self.snapshot();
        match op {
            BinaryOp::Add => {
                let Some(other) = other.downcast_ref::<List>() else {
                    return Ok(None);
                };
                let (left, right) = if reflected {
                    (other.snapshot(), items)
                } else {
                    (items, other.snapshot())
                };
                Ok(Some(List::value(left.into_iter().chain(right))))
            }
            BinaryOp::Mul => Ok(List::repeated(&items, other)?.map(List::value)),
            _ => Ok(None),
        }
    }

    fn inplace(&self, this: &Value, op: BinaryOp, other: &Value) -> SecurityResult<Option<Value>> {
        match op {
            BinaryOp::Add => {
                let extra = collect(other)?;
                self.items.write().extend(extra);
                Ok(Some(this.clone()))
            }
            BinaryOp::Mul => {
                let Some(repeated) = List::repeated(&self.snapshot(), other)? else {
                    return Ok(None);
                };
                *self.items.write() = repeated;
                Ok(Some(this.clone()))
            }
            _ => Ok(None),
        }
    }

    fn traverse(&self, visit: &mut dyn FnMut(&Value)) {
        for item in self.snapshot().iter() {
            visit(item);
        }
    }

    fn clear(&self) {
        let items = std::mem::take(&mut *self.items.write());
        drop(items);
    }
}

// =============================================================================
// Sequence iterator
// =============================================================================

/// Iterator over any value supporting integer indexing
pub struct SequenceIterator {
    sequence: Value,
    index: AtomicUsize,
}

impl SequenceIterator {
    pub fn new(sequence: Value) -> Self {
        Self {
            sequence,
            index: AtomicUsize::new(0),
        }
    }

    pub fn object_type() -> ObjectType {
        ObjectType::builtin::<SequenceIterator>("iterator")
    }
}

impl HostObject for SequenceIterator {
    fn object_type(&self) -> ObjectType {
        SequenceIterator::object_type()
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(name, "__next__" | "__iter__")
    }

    fn iterate(&self, this: &Value) -> SecurityResult<Value> {
        Ok(this.clone())
    }

    fn next_item(&self) -> SecurityResult<Option<Value>> {
        let index = self.index.fetch_add(1, Ordering::Relaxed);
        match self.sequence.get_item(&Value::Int(index as i64)) {
            Ok(item) => Ok(Some(item)),
            Err(SecurityError::Host(HostError::Index(_))) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn traverse(&self, visit: &mut dyn FnMut(&Value)) {
        visit(&self.sequence);
    }
}

// =============================================================================
// Function
// =============================================================================

type NativeFn = dyn Fn(&[Value]) -> SecurityResult<Value> + Send + Sync;

/// Callable host object
pub struct Function {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> SecurityResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap a new function as a value
    pub fn value<F>(name: impl Into<Arc<str>>, func: F) -> Value
    where
        F: Fn(&[Value]) -> SecurityResult<Value> + Send + Sync + 'static,
    {
        Value::object(Function::new(name, func))
    }

    pub fn object_type() -> ObjectType {
        ObjectType::builtin::<Function>("function")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

impl HostObject for Function {
    fn object_type(&self) -> ObjectType {
        Function::object_type()
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(name, "__call__" | "__name__" | "__str__" | "__repr__")
    }

    fn get_attr(&self, _this: &Value, name: &str) -> SecurityResult<Value> {
        match name {
            "__name__" => Ok(Value::Str(self.name.clone())),
            _ => Err(HostError::attribute(Function::object_type(), name).into()),
        }
    }

    fn call(&self, args: &[Value]) -> SecurityResult<Value> {
        (self.func)(args)
    }

    fn repr(&self, this: &Value) -> SecurityResult<String> {
        Ok(format!("<function {} at {:#x}>", self.name, this.address()))
    }
}

// =============================================================================
// Namespace
// =============================================================================

/// Attribute bag with an optional attached checker
#[derive(Default)]
pub struct Namespace {
    attrs: RwLock<HashMap<String, Value>>,
    checker: CheckerSlot,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attrs<I, K>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            attrs: RwLock::new(attrs.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            checker: CheckerSlot::Unset,
        }
    }

    /// Attach a checker slot
    pub fn with_checker(mut self, checker: CheckerSlot) -> Self {
        self.checker = checker;
        self
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }
}

impl HostObject for Namespace {
    fn has_attr(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    fn get_attr(&self, _this: &Value, name: &str) -> SecurityResult<Value> {
        self.get(name)
            .ok_or_else(|| HostError::attribute(self.object_type(), name).into())
    }

    fn set_attr(&self, name: &str, value: Value) -> SecurityResult<()> {
        let previous = self.attrs.write().insert(name.to_string(), value);
        drop(previous);
        Ok(())
    }

    fn del_attr(&self, name: &str) -> SecurityResult<()> {
        let removed = self.attrs.write().remove(name);
        match removed {
            Some(_) => Ok(()),
            None => Err(HostError::attribute(self.object_type(), name).into()),
        }
    }

    fn security_checker(&self) -> CheckerSlot {
        self.checker.clone()
    }

    fn traverse(&self, visit: &mut dyn FnMut(&Value)) {
        let values: Vec<Value> = self.attrs.read().values().cloned().collect();
        for value in &values {
            visit(value);
        }
    }

    fn clear(&self) {
        let attrs = std::mem::take(&mut *self.attrs.write());
        drop(attrs);
    }
}

// =============================================================================
// Error object
// =============================================================================

/// Host exception instance
#[derive(Debug, Clone)]
pub struct ErrorObject {
    kind: String,
    message: String,
}

impl ErrorObject {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn object_type() -> ObjectType {
        ObjectType::builtin::<ErrorObject>("Exception")
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl HostObject for ErrorObject {
    fn object_type(&self) -> ObjectType {
        ErrorObject::object_type()
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(name, "args" | "kind")
    }

    fn get_attr(&self, _this: &Value, name: &str) -> SecurityResult<Value> {
        match name {
            "args" => Ok(Value::tuple([Value::str(self.message.as_str())])),
            "kind" => Ok(Value::str(self.kind.as_str())),
            _ => Err(HostError::attribute(ErrorObject::object_type(), name).into()),
        }
    }

    fn repr(&self, _this: &Value) -> SecurityResult<String> {
        Ok(format!("{}({:?})", self.kind, self.message))
    }

    fn to_str(&self, _this: &Value) -> SecurityResult<String> {
        Ok(self.message.clone())
    }

    fn is_exception(&self) -> bool {
        true
    }
}
