/*!
 * Contained Proxy
 *
 * Gives an object a location (`__parent__`, `__name__`) without touching
 * the object. The two location attributes live on the proxy; everything
 * else is forwarded to the target without checks. Security still applies
 * when the contained proxy itself is wrapped in a `SecurityProxy`, which
 * resolves the checker from the target's type.
 */

use super::gc::{Referent, SlotRefs, Slots, Traverse};
use crate::core::errors::SecurityResult;
use crate::core::limits::{NAME_ATTR, PARENT_ATTR};
use crate::core::types::ObjectType;
use crate::object::{BinaryOp, CheckerSlot, CompareOp, HostObject, UnaryOp, Value};
use std::sync::Arc;

struct ContainedSlots {
    target: Value,
    parent: Value,
    name: Value,
}

impl SlotRefs for ContainedSlots {
    fn visit(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        visit(Referent::Value(&self.target));
        visit(Referent::Value(&self.parent));
        visit(Referent::Value(&self.name));
    }
}

/// Location-aware transparent wrapper
pub struct ContainedProxy {
    slots: Slots<ContainedSlots>,
}

impl ContainedProxy {
    pub fn new(target: Value, parent: Value, name: Value) -> Self {
        Self {
            slots: Slots::new(ContainedSlots {
                target,
                parent,
                name,
            }),
        }
    }

    /// Wrap a new contained proxy as a value
    pub fn value(target: Value, parent: Value, name: Value) -> Value {
        Value::Object(Arc::new(ContainedProxy::new(target, parent, name)))
    }

    pub fn target(&self) -> SecurityResult<Value> {
        Ok(self.slots.load()?.target.clone())
    }

    pub fn parent(&self) -> SecurityResult<Value> {
        Ok(self.slots.load()?.parent.clone())
    }

    pub fn name(&self) -> SecurityResult<Value> {
        Ok(self.slots.load()?.name.clone())
    }

    fn set_location(&self, attr: &str, value: Value) -> SecurityResult<()> {
        let is_parent = attr == PARENT_ATTR;
        self.slots.update(|slots| ContainedSlots {
            target: slots.target.clone(),
            parent: if is_parent { value.clone() } else { slots.parent.clone() },
            name: if is_parent { slots.name.clone() } else { value.clone() },
        })
    }
}

fn is_location(name: &str) -> bool {
    name == PARENT_ATTR || name == NAME_ATTR
}

impl HostObject for ContainedProxy {
    /// Reports the target's type so checker lookup sees through the wrapper
    fn object_type(&self) -> ObjectType {
        match self.slots.load() {
            Ok(slots) => slots.target.object_type(),
            Err(_) => ObjectType::of::<ContainedProxy>(),
        }
    }

    fn has_attr(&self, name: &str) -> bool {
        is_location(name)
            || self
                .slots
                .load()
                .map(|slots| slots.target.has_attr(name))
                .unwrap_or(false)
    }

    fn get_attr(&self, _this: &Value, name: &str) -> SecurityResult<Value> {
        let slots = self.slots.load()?;
        match name {
            PARENT_ATTR => Ok(slots.parent.clone()),
            NAME_ATTR => Ok(slots.name.clone()),
            _ => slots.target.get_attr(name),
        }
    }

    fn set_attr(&self, name: &str, value: Value) -> SecurityResult<()> {
        if is_location(name) {
            return self.set_location(name, value);
        }
        self.slots.load()?.target.set_attr(name, value)
    }

    fn del_attr(&self, name: &str) -> SecurityResult<()> {
        if is_location(name) {
            return self.set_location(name, Value::None);
        }
        self.slots.load()?.target.del_attr(name)
    }

    fn get_item(&self, key: &Value) -> SecurityResult<Value> {
        self.slots.load()?.target.get_item(key)
    }

    fn set_item(&self, key: &Value, value: Value) -> SecurityResult<()> {
        self.slots.load()?.target.set_item(key, value)
    }

    fn del_item(&self, key: &Value) -> SecurityResult<()> {
        self.slots.load()?.target.del_item(key)
    }

    fn get_slice(&self, start: i64, end: i64) -> SecurityResult<Value> {
        self.slots.load()?.target.get_slice(start, end)
    }

    fn set_slice(&self, start: i64, end: i64, value: &Value) -> SecurityResult<()> {
        self.slots.load()?.target.set_slice(start, end, value)
    }

    fn contains(&self, item: &Value) -> SecurityResult<bool> {
        self.slots.load()?.target.contains(item)
    }

    fn length(&self) -> SecurityResult<usize> {
        self.slots.load()?.target.length()
    }

    fn iterate(&self, _this: &Value) -> SecurityResult<Value> {
        self.slots.load()?.target.iterate()
    }

    fn next_item(&self) -> SecurityResult<Option<Value>> {
        self.slots.load()?.target.next_item()
    }

    fn call(&self, args: &[Value]) -> SecurityResult<Value> {
        self.slots.load()?.target.call(args)
    }

    fn repr(&self, _this: &Value) -> SecurityResult<String> {
        self.slots.load()?.target.repr()
    }

    fn to_str(&self, _this: &Value) -> SecurityResult<String> {
        self.slots.load()?.target.to_str()
    }

    fn hash_value(&self, _this: &Value) -> SecurityResult<u64> {
        self.slots.load()?.target.hash_value()
    }

    fn compare(&self, _this: &Value, op: CompareOp, other: &Value) -> SecurityResult<Option<Value>> {
        self.slots.load()?.target.compare(op, other).map(Some)
    }

    fn truth(&self) -> SecurityResult<bool> {
        self.slots.load()?.target.truth()
    }

    fn unary(&self, op: UnaryOp) -> SecurityResult<Option<Value>> {
        self.slots.load()?.target.unary(op).map(Some)
    }

    fn binary(
        &self,
        _this: &Value,
        op: BinaryOp,
        other: &Value,
        reflected: bool,
    ) -> SecurityResult<Option<Value>> {
        let target = self.slots.load()?.target.clone();
        if reflected {
            other.try_binary(op, &target)
        } else {
            target.try_binary(op, other)
        }
    }

    fn inplace(&self, this: &Value, op: BinaryOp, other: &Value) -> SecurityResult<Option<Value>> {
        let target = self.slots.load()?.target.clone();
        let result = target.inplace(op, other)?;
        if result.is(&target) {
            return Ok(Some(this.clone()));
        }
        Ok(Some(result))
    }

    fn ternary_pow(&self, _this: &Value, exp: &Value, modulus: &Value) -> SecurityResult<Option<Value>> {
        self.slots.load()?.target.pow(exp, Some(modulus)).map(Some)
    }

    fn coerce(&self, _this: &Value, other: &Value) -> SecurityResult<Option<(Value, Value)>> {
        self.slots.load()?.target.coerce(other)
    }

    fn security_checker(&self) -> CheckerSlot {
        match self.slots.load() {
            Ok(slots) => match &slots.target {
                Value::Object(object) => object.security_checker(),
                _ => CheckerSlot::Unset,
            },
            Err(_) => CheckerSlot::Unset,
        }
    }

    fn is_exception(&self) -> bool {
        match self.slots.load() {
            Ok(slots) => match &slots.target {
                Value::Object(object) => object.is_exception(),
                _ => false,
            },
            Err(_) => false,
        }
    }

    fn traverse(&self, visit: &mut dyn FnMut(&Value)) {
        self.slots.traverse(&mut |referent| {
            if let Referent::Value(value) = referent {
                visit(value);
            }
        });
    }

    fn clear(&self) {
        self.slots.clear();
    }
}

impl Traverse for ContainedProxy {
    fn traverse(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        self.slots.traverse(visit);
    }

    fn clear(&self) {
        self.slots.clear();
    }
}
