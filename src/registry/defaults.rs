/*!
 * Built-in Registry Entries
 *
 * Immutable primitives and proxies are never wrapped; the built-in
 * containers get read-only checkers.
 */

use super::registry::{CheckerEntry, CheckerRegistry};
use crate::checker::names_checker;
use crate::core::types::{ObjectType, Permission};
use crate::object::builtins::{
    BoolType, FloatType, Function, IntType, List, NoneType, SequenceIterator, StrType, TupleType,
};
use crate::proxy::SecurityProxy;

const LIST_NAMES: &[&str] = &[
    "__getitem__",
    "__getslice__",
    "__len__",
    "__iter__",
    "__contains__",
    "index",
    "count",
    "__str__",
    "__add__",
    "__radd__",
];

const TUPLE_NAMES: &[&str] = &[
    "__getitem__",
    "__getslice__",
    "__add__",
    "__radd__",
    "__contains__",
    "__len__",
    "__iter__",
    "__str__",
];

const ITERATOR_NAMES: &[&str] = &["__next__", "__iter__"];

const FUNCTION_NAMES: &[&str] = &["__str__", "__name__", "__call__"];

fn public_names(names: &[&str]) -> CheckerEntry {
    CheckerEntry::checker(names_checker(names.iter().copied(), Permission::Public))
}

/// Entries installed in a fresh or reset registry
pub fn default_entries() -> Vec<(ObjectType, CheckerEntry)> {
    vec![
        (NoneType::object_type(), CheckerEntry::NoProxy),
        (BoolType::object_type(), CheckerEntry::NoProxy),
        (IntType::object_type(), CheckerEntry::NoProxy),
        (FloatType::object_type(), CheckerEntry::NoProxy),
        (StrType::object_type(), CheckerEntry::NoProxy),
        (ObjectType::of::<SecurityProxy>(), CheckerEntry::NoProxy),
        (TupleType::object_type(), public_names(TUPLE_NAMES)),
        (List::object_type(), public_names(LIST_NAMES)),
        (SequenceIterator::object_type(), public_names(ITERATOR_NAMES)),
        (Function::object_type(), public_names(FUNCTION_NAMES)),
    ]
}

pub(crate) fn install_defaults(registry: &CheckerRegistry) {
    for (ty, entry) in default_entries() {
        // Only a fresh or cleared registry is populated
        if registry.define_checker(ty, entry).is_err() {
            log::warn!("Default checker for {} already defined", ty);
        }
    }
}
