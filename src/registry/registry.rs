/*!
 * Checker Registry
 *
 * Maps concrete types to a checker, a checker factory or "no proxy".
 * Unregistered types get the default checker, except host exceptions,
 * which are never proxied through it. Lookups are lock-free reads on a
 * sharded map; mutation is expected at setup and teardown.
 */

use super::defaults::install_defaults;
use crate::checker::{same_checker, Checker, CheckerRef, SecurityChecker};
use crate::core::config::config;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::core::limits::AVAILABLE_BY_DEFAULT;
use crate::core::types::{is_special_name, ObjectType};
use crate::object::Value;
use ahash::{HashSet, RandomState};
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Factory producing the next entry for a particular object
pub type CheckerFactory = dyn Fn(&Value) -> SecurityResult<CheckerEntry> + Send + Sync;

/// Registry entry for a type
#[derive(Clone)]
pub enum CheckerEntry {
    Checker(CheckerRef),
    /// Called with the object on every resolution; never cached
    Factory(Arc<CheckerFactory>),
    /// Instances are returned unproxied
    NoProxy,
}

impl CheckerEntry {
    pub fn checker<C: SecurityChecker + 'static>(checker: C) -> Self {
        CheckerEntry::Checker(Arc::new(checker))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Value) -> SecurityResult<CheckerEntry> + Send + Sync + 'static,
    {
        CheckerEntry::Factory(Arc::new(factory))
    }

    /// The checker, if this entry is one
    pub fn as_checker(&self) -> Option<&CheckerRef> {
        match self {
            CheckerEntry::Checker(checker) => Some(checker),
            _ => None,
        }
    }

    #[inline]
    pub fn is_no_proxy(&self) -> bool {
        matches!(self, CheckerEntry::NoProxy)
    }
}

impl From<CheckerRef> for CheckerEntry {
    fn from(checker: CheckerRef) -> Self {
        CheckerEntry::Checker(checker)
    }
}

impl fmt::Debug for CheckerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerEntry::Checker(_) => f.write_str("Checker(..)"),
            CheckerEntry::Factory(_) => f.write_str("Factory(..)"),
            CheckerEntry::NoProxy => f.write_str("NoProxy"),
        }
    }
}

/// Type to checker registry
pub struct CheckerRegistry {
    entries: DashMap<ObjectType, CheckerEntry, RandomState>,
    default_checker: RwLock<CheckerRef>,
    available: RwLock<HashSet<String>>,
}

impl CheckerRegistry {
    /// Registry without any entries
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
            default_checker: RwLock::new(Checker::new(Default::default(), None).into_ref()),
            available: RwLock::new(default_allow_list()),
        }
    }

    /// Registry with the built-in entries installed
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        install_defaults(&registry);
        registry
    }

    /// Resolve the checker for `value`
    ///
    /// Factories are followed until they produce a checker or "no proxy",
    /// at most `max_resolution_depth` calls.
    ///
    /// # Errors
    /// `ResolutionDepthExceeded` for a factory chain that does not end, or
    /// whatever a factory itself returns.
    pub fn select_checker(&self, value: &Value) -> SecurityResult<Option<CheckerRef>> {
        let ty = value.object_type();
        let default_checker = self.default_checker();

        // Clone out of the shard so factories may touch the registry
        let mut entry = match self.entries.get(&ty) {
            Some(entry) => entry.value().clone(),
            None => CheckerEntry::Checker(default_checker.clone()),
        };

        if let CheckerEntry::Checker(checker) = &entry {
            if same_checker(checker, &default_checker) && is_exception(value) {
                return Ok(None);
            }
        }

        let max_depth = config().max_resolution_depth;
        let mut calls = 0;
        loop {
            match entry {
                CheckerEntry::NoProxy => return Ok(None),
                CheckerEntry::Checker(checker) => return Ok(Some(checker)),
                CheckerEntry::Factory(factory) => {
                    if calls >= max_depth {
                        return Err(SecurityError::ResolutionDepthExceeded {
                            type_name: ty.to_string(),
                            depth: calls,
                        });
                    }
                    calls += 1;
                    entry = factory(value)?;
                }
            }
        }
    }

    /// Register `entry` for `ty`
    ///
    /// # Errors
    /// `Duplication` when `ty` already has an entry.
    pub fn define_checker(&self, ty: ObjectType, entry: CheckerEntry) -> SecurityResult<()> {
        use dashmap::mapref::entry::Entry;
        match self.entries.entry(ty) {
            Entry::Occupied(_) => Err(SecurityError::Duplication(ty.to_string())),
            Entry::Vacant(slot) => {
                debug!("Checker defined for {}: {:?}", ty, entry);
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove the entry for `ty`, returning it
    pub fn undefine_checker(&self, ty: ObjectType) -> Option<CheckerEntry> {
        let removed = self.entries.remove(&ty).map(|(_, entry)| entry);
        if removed.is_some() {
            debug!("Checker undefined for {}", ty);
        }
        removed
    }

    /// Entry registered for `ty`, without applying defaults
    pub fn get_checker_for_instances_of(&self, ty: ObjectType) -> Option<CheckerEntry> {
        self.entries.get(&ty).map(|entry| entry.value().clone())
    }

    pub fn default_checker(&self) -> CheckerRef {
        self.default_checker.read().clone()
    }

    /// Replace the default checker, returning the previous one
    pub fn set_default_checker(&self, checker: CheckerRef) -> CheckerRef {
        std::mem::replace(&mut *self.default_checker.write(), checker)
    }

    /// Add `name` to the allow-list
    ///
    /// # Errors
    /// `InvalidArgument` for names that are not of the `__name__` form.
    pub fn make_available_by_default(&self, name: &str) -> SecurityResult<()> {
        if !is_special_name(name) {
            return Err(SecurityError::InvalidArgument(format!(
                "only special names can be available by default, got {:?}",
                name
            )));
        }
        self.available.write().insert(name.to_string());
        Ok(())
    }

    /// Whether `name` is granted by every checker without an entry
    pub fn is_available_by_default(&self, name: &str) -> bool {
        is_special_name(name) && self.available.read().contains(name)
    }

    /// Drop all entries and restore the built-in state
    pub fn reset(&self) {
        self.entries.clear();
        *self.default_checker.write() = Checker::new(Default::default(), None).into_ref();
        *self.available.write() = default_allow_list();
        install_defaults(self);
        info!("Checker registry reset ({} default entries)", self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_allow_list() -> HashSet<String> {
    AVAILABLE_BY_DEFAULT.iter().map(|name| name.to_string()).collect()
}

fn is_exception(value: &Value) -> bool {
    match value {
        Value::Object(object) => object.is_exception(),
        _ => false,
    }
}
