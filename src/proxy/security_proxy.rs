/*!
 * Security Proxy
 *
 * Wraps exactly one target and one checker. Every forwarded operation is
 * checked first, performed on the raw target second, and its result is
 * passed through the checker's proxy step last.
 */

use super::dispatch::{binary_op, CheckMode, Operation};
use super::gc::{Referent, SlotRefs, Slots, Traverse};
use crate::checker::CheckerRef;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::object::{BinaryOp, CompareOp, UnaryOp, Value};
use std::fmt;
use std::sync::Arc;
use tracing::trace_span;

pub(crate) struct ProxySlots {
    target: Value,
    checker: CheckerRef,
}

impl SlotRefs for ProxySlots {
    fn visit(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        visit(Referent::Value(&self.target));
        visit(Referent::Checker(&self.checker));
    }
}

/// Checked handle to a target object
///
/// Cloning shares the proxy; identity is the shared allocation.
#[derive(Clone)]
pub struct SecurityProxy {
    inner: Arc<Slots<ProxySlots>>,
}

impl SecurityProxy {
    /// Proxy `target` with `checker`
    ///
    /// # Errors
    /// `InvalidArgument` when no checker is given.
    pub fn new(target: Value, checker: Option<CheckerRef>) -> SecurityResult<Self> {
        let checker = checker.ok_or_else(|| {
            SecurityError::InvalidArgument("None passed as proxy checker".to_string())
        })?;
        Ok(Self::wrap(target, checker))
    }

    /// Proxy `target` with a known checker
    pub fn wrap(target: Value, checker: CheckerRef) -> Self {
        Self {
            inner: Arc::new(Slots::new(ProxySlots { target, checker })),
        }
    }

    /// The raw target
    pub fn target(&self) -> SecurityResult<Value> {
        Ok(self.inner.load()?.target.clone())
    }

    pub fn checker(&self) -> SecurityResult<CheckerRef> {
        Ok(self.inner.load()?.checker.clone())
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.inner.is_cleared()
    }

    /// Whether both handles are the same proxy
    #[inline]
    pub fn ptr_eq(&self, other: &SecurityProxy) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    fn as_value(&self) -> Value {
        Value::Proxy(self.clone())
    }

    // =========================================================================
    // Check-then-forward core
    // =========================================================================

    fn authorize(&self, mode: CheckMode, name: &str) -> SecurityResult<Arc<ProxySlots>> {
        let slots = self.inner.load()?;
        match mode {
            CheckMode::Check => slots.checker.check(&slots.target, name)?,
            CheckMode::GetAttr => slots.checker.check_getattr(&slots.target, name)?,
            CheckMode::SetAttr => slots.checker.check_setattr(&slots.target, name)?,
            CheckMode::Unchecked => {}
        }
        Ok(slots)
    }

    /// Check, perform on the target, return the result unproxied
    fn forward_raw<R, F>(&self, op: Operation, name: &str, f: F) -> SecurityResult<R>
    where
        F: FnOnce(&Value) -> SecurityResult<R>,
    {
        let span = trace_span!("security_proxy", operation = %op, name = name);
        let _entered = span.enter();
        let slots = self.authorize(op.mode(), name)?;
        f(&slots.target)
    }

    /// Check, perform on the target, proxy the result
    pub(crate) fn forward<F>(&self, op: Operation, name: &str, f: F) -> SecurityResult<Value>
    where
        F: FnOnce(&Value) -> SecurityResult<Value>,
    {
        let span = trace_span!("security_proxy", operation = %op, name = name);
        let _entered = span.enter();
        let slots = self.authorize(op.mode(), name)?;
        let raw = f(&slots.target)?;
        slots.checker.proxy(raw)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn get_attr(&self, name: &str) -> SecurityResult<Value> {
        self.forward(Operation::GetAttr, name, |target| target.get_attr(name))
    }

    pub fn set_attr(&self, name: &str, value: Value) -> SecurityResult<()> {
        self.forward_raw(Operation::SetAttr, name, |target| target.set_attr(name, value))
    }

    pub fn del_attr(&self, name: &str) -> SecurityResult<()> {
        self.forward_raw(Operation::DelAttr, name, |target| target.del_attr(name))
    }

    // =========================================================================
    // Sequences and mappings
    // =========================================================================

    pub fn get_item(&self, key: &Value) -> SecurityResult<Value> {
        self.forward(Operation::GetItem, "__getitem__", |target| target.get_item(key))
    }

    pub fn set_item(&self, key: &Value, value: Value) -> SecurityResult<()> {
        self.forward_raw(Operation::SetItem, "__setitem__", |target| {
            target.set_item(key, value)
        })
    }

    /// Item deletion, checked as its own operation
    pub fn del_item(&self, key: &Value) -> SecurityResult<()> {
        self.forward_raw(Operation::DelItem, "__delitem__", |target| target.del_item(key))
    }

    pub fn get_slice(&self, start: i64, end: i64) -> SecurityResult<Value> {
        self.forward(Operation::GetSlice, "__getslice__", |target| {
            target.get_slice(start, end)
        })
    }

    pub fn set_slice(&self, start: i64, end: i64, value: &Value) -> SecurityResult<()> {
        self.forward_raw(Operation::SetSlice, "__setslice__", |target| {
            target.set_slice(start, end, value)
        })
    }

    pub fn contains(&self, item: &Value) -> SecurityResult<bool> {
        self.forward_raw(Operation::Contains, "__contains__", |target| target.contains(item))
    }

    pub fn len(&self) -> SecurityResult<usize> {
        self.forward_raw(Operation::Len, "__len__", Value::length)
    }

    // =========================================================================
    // Iteration and calls
    // =========================================================================

    pub fn iter(&self) -> SecurityResult<Value> {
        self.forward(Operation::Iter, "__iter__", Value::iterate)
    }

    /// Advance a proxied iterator; checked like an attribute read
    pub fn next_item(&self) -> SecurityResult<Option<Value>> {
        let slots = self.authorize(Operation::Next.mode(), "__next__")?;
        match slots.target.next_item()? {
            Some(item) => slots.checker.proxy(item).map(Some),
            None => Ok(None),
        }
    }

    pub fn call(&self, args: &[Value]) -> SecurityResult<Value> {
        self.forward(Operation::Call, "__call__", |target| target.call(args))
    }

    // =========================================================================
    // Representation
    // =========================================================================

    pub fn to_str(&self) -> SecurityResult<String> {
        self.render(Operation::Str, Value::to_str)
    }

    pub fn repr(&self) -> SecurityResult<String> {
        self.render(Operation::Repr, Value::repr)
    }

    /// A failed check falls back to the generic representation; errors from
    /// the target itself still propagate
    fn render<F>(&self, op: Operation, f: F) -> SecurityResult<String>
    where
        F: FnOnce(&Value) -> SecurityResult<String>,
    {
        let name = op.check_name().unwrap_or("__repr__");
        match self.authorize(op.mode(), name) {
            Ok(slots) => f(&slots.target),
            Err(SecurityError::ProxyCleared) => Err(SecurityError::ProxyCleared),
            Err(_) => Ok(self.default_repr()),
        }
    }

    /// `<security proxied module.Name instance at 0x...>`
    pub fn default_repr(&self) -> String {
        match self.inner.load() {
            Ok(slots) => format!(
                "<security proxied {} instance at {:#x}>",
                slots.target.object_type(),
                self.address()
            ),
            Err(_) => format!("<security proxied (cleared) instance at {:#x}>", self.address()),
        }
    }

    // =========================================================================
    // Unchecked protocol: hashing, comparison, truth
    // =========================================================================

    pub fn hash_value(&self) -> SecurityResult<u64> {
        self.inner.load()?.target.hash_value()
    }

    /// Comparison results other than plain booleans are proxied
    pub fn compare(&self, op: CompareOp, other: &Value) -> SecurityResult<Value> {
        let slots = self.authorize(Operation::Compare(op).mode(), op.name())?;
        match slots.target.compare(op, other)? {
            result @ Value::Bool(_) => Ok(result),
            result => slots.checker.proxy(result),
        }
    }

    pub fn truth(&self) -> SecurityResult<bool> {
        self.inner.load()?.target.truth()
    }

    // =========================================================================
    // Numeric protocol
    // =========================================================================

    pub fn unary(&self, op: UnaryOp) -> SecurityResult<Value> {
        self.forward(Operation::Unary(op), op.name(), |target| target.unary(op))
    }

    /// In-place operation
    ///
    /// When the target mutates itself and returns itself, the result is this
    /// proxy rather than a new one.
    pub fn inplace(&self, op: BinaryOp, other: &Value) -> SecurityResult<Value> {
        let Some(name) = op.inplace_name() else {
            return binary_op(op, &self.as_value(), other)?
                .into_option()
                .ok_or_else(|| SecurityError::InvalidArgument(format!("{} on a proxy", op.name())));
        };
        let operation = Operation::InPlace(op);
        let span = trace_span!("security_proxy", operation = %operation, name = name);
        let _entered = span.enter();

        let slots = self.authorize(CheckMode::Check, name)?;
        let result = slots.target.inplace(op, other)?;
        if result.is(&slots.target) {
            return Ok(self.as_value());
        }
        slots.checker.proxy(result)
    }

    /// Coerce with `other`
    ///
    /// A left result that is still the target keeps this proxy, and a right
    /// result that is still `other` is returned as is; anything new is
    /// proxied.
    pub fn coerce(&self, other: &Value) -> SecurityResult<Option<(Value, Value)>> {
        let slots = self.authorize(CheckMode::Check, "__coerce__")?;
        let Some((left, right)) = slots.target.coerce(other)? else {
            return Ok(None);
        };
        let left = if left.is(&slots.target) {
            self.as_value()
        } else {
            slots.checker.proxy(left)?
        };
        let right = if right.is(other) {
            other.clone()
        } else {
            slots.checker.proxy(right)?
        };
        Ok(Some((left, right)))
    }
}

impl Traverse for SecurityProxy {
    fn traverse(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        self.inner.traverse(visit);
    }

    fn clear(&self) {
        self.inner.clear();
    }
}

impl fmt::Debug for SecurityProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.default_repr())
    }
}
