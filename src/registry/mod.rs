/*!
 * Registry Module
 *
 * The process-wide checker registry, default checker and allow-list, with
 * free functions over the global instance.
 */

pub mod defaults;
#[allow(clippy::module_inception)]
pub mod registry;

pub use defaults::default_entries;
pub use registry::{CheckerEntry, CheckerFactory, CheckerRegistry};

use crate::checker::CheckerRef;
use crate::core::errors::SecurityResult;
use crate::core::types::ObjectType;
use crate::object::Value;
use std::sync::LazyLock;

static GLOBAL_REGISTRY: LazyLock<CheckerRegistry> = LazyLock::new(CheckerRegistry::with_defaults);

/// The global registry
#[inline]
pub fn global() -> &'static CheckerRegistry {
    &GLOBAL_REGISTRY
}

/// Resolve the checker for `value` in the global registry
pub fn select_checker(value: &Value) -> SecurityResult<Option<CheckerRef>> {
    GLOBAL_REGISTRY.select_checker(value)
}

pub fn define_checker(ty: ObjectType, entry: CheckerEntry) -> SecurityResult<()> {
    GLOBAL_REGISTRY.define_checker(ty, entry)
}

pub fn undefine_checker(ty: ObjectType) -> Option<CheckerEntry> {
    GLOBAL_REGISTRY.undefine_checker(ty)
}

pub fn get_checker_for_instances_of(ty: ObjectType) -> Option<CheckerEntry> {
    GLOBAL_REGISTRY.get_checker_for_instances_of(ty)
}

pub fn default_checker() -> CheckerRef {
    GLOBAL_REGISTRY.default_checker()
}

pub fn set_default_checker(checker: CheckerRef) -> CheckerRef {
    GLOBAL_REGISTRY.set_default_checker(checker)
}

pub fn make_available_by_default(name: &str) -> SecurityResult<()> {
    GLOBAL_REGISTRY.make_available_by_default(name)
}

pub fn is_available_by_default(name: &str) -> bool {
    GLOBAL_REGISTRY.is_available_by_default(name)
}

/// Restore the global registry to its built-in state
pub fn reset_checkers() {
    GLOBAL_REGISTRY.reset();
}
