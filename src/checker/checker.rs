/*!
 * Permission-Map Checker
 *
 * The standard checker: one name-to-permission map for reads and one for
 * writes. Maps may be absent, in which case nothing is granted through
 * them, and are materialized as empty maps the first time they are read.
 */

use super::traits::{CheckerRef, SecurityChecker};
use super::watch;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::core::limits::ITER_NAME;
use crate::core::types::{Permission, PermissionMap};
use crate::interaction;
use crate::monitoring::{CheckDecision, CheckKind};
use crate::object::Value;
use crate::proxy::{Referent, Traverse};
use crate::registry;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

type MapSlot = RwLock<Option<Arc<PermissionMap>>>;

/// Checker backed by read and write permission maps
pub struct Checker {
    read: MapSlot,
    write: MapSlot,
}

impl Checker {
    /// Create a checker; a missing write map grants no writes
    pub fn new(read: PermissionMap, write: Option<PermissionMap>) -> Self {
        Self {
            read: RwLock::new(Some(Arc::new(read))),
            write: RwLock::new(write.map(Arc::new)),
        }
    }

    /// Checker with no maps at all
    pub fn empty() -> Self {
        Self {
            read: RwLock::new(None),
            write: RwLock::new(None),
        }
    }

    /// Share as a checker handle
    pub fn into_ref(self) -> CheckerRef {
        Arc::new(self)
    }

    /// Current read map
    pub fn read_permissions(&self) -> Arc<PermissionMap> {
        materialize(&self.read)
    }

    /// Current write map
    pub fn write_permissions(&self) -> Arc<PermissionMap> {
        materialize(&self.write)
    }

    pub fn set_read_permissions(&self, map: PermissionMap) {
        *self.read.write() = Some(Arc::new(map));
    }

    pub fn set_write_permissions(&self, map: PermissionMap) {
        *self.write.write() = Some(Arc::new(map));
    }

    /// Add or replace one read entry
    pub fn grant_read(&self, name: impl Into<String>, permission: Permission) {
        grant(&self.read, name.into(), permission);
    }

    /// Add or replace one write entry
    pub fn grant_write(&self, name: impl Into<String>, permission: Permission) {
        grant(&self.write, name.into(), permission);
    }
}

fn materialize(slot: &MapSlot) -> Arc<PermissionMap> {
    if let Some(map) = slot.read().as_ref() {
        return map.clone();
    }
    slot.write().get_or_insert_with(Default::default).clone()
}

fn grant(slot: &MapSlot, name: String, permission: Permission) {
    let mut guard = slot.write();
    let map = guard.get_or_insert_with(Default::default);
    Arc::make_mut(map).insert(name, permission);
}

fn lookup(slot: &MapSlot, name: &str) -> Option<Permission> {
    slot.read().as_ref().and_then(|map| map.get(name).cloned())
}

/// Decide a single check against the permission found for `name`
///
/// Public never consults the interaction. A missing entry is granted for
/// reads only when the name is available by default, or when it is
/// `__iter__` and the raw object cannot be iterated anyway.
pub(crate) fn decide(
    permission: Option<Permission>,
    object: &Value,
    name: &str,
    kind: CheckKind,
) -> SecurityResult<CheckDecision> {
    match permission {
        Some(Permission::Public) => Ok(CheckDecision::Public),
        Some(permission) => {
            if interaction::check_permission(&permission, object)? {
                Ok(CheckDecision::Granted)
            } else {
                Err(SecurityError::unauthorized(object, name, &permission))
            }
        }
        None if kind == CheckKind::Read && registry::is_available_by_default(name) => {
            Ok(CheckDecision::AvailableByDefault)
        }
        None if kind == CheckKind::Read && name == ITER_NAME && !object.has_attr(ITER_NAME) => {
            Ok(CheckDecision::NotIterable)
        }
        None => Err(SecurityError::forbidden(name, object)),
    }
}

impl SecurityChecker for Checker {
    fn permission_id(&self, name: &str) -> Option<Permission> {
        lookup(&self.read, name)
    }

    fn setattr_permission_id(&self, name: &str) -> Option<Permission> {
        lookup(&self.write, name)
    }

    fn check(&self, object: &Value, name: &str) -> SecurityResult<()> {
        let outcome = decide(self.permission_id(name), object, name, CheckKind::Read);
        watch::observe(object, name, CheckKind::Read, &outcome);
        outcome.map(|_| ())
    }

    fn check_setattr(&self, object: &Value, name: &str) -> SecurityResult<()> {
        let outcome = decide(
            self.setattr_permission_id(name),
            object,
            name,
            CheckKind::Write,
        );
        watch::observe(object, name, CheckKind::Write, &outcome);
        outcome.map(|_| ())
    }
}

impl Traverse for Checker {
    fn traverse(&self, _visit: &mut dyn FnMut(Referent<'_>)) {}

    fn clear(&self) {
        *self.read.write() = None;
        *self.write.write() = None;
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("read", &*self.read.read())
            .field("write", &*self.write.read())
            .finish()
    }
}
