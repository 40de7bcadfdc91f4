/*!
 * Core Types
 * Type identity and permission values shared across the crate
 */

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Module name reported for built-in value types
pub const BUILTIN_MODULE: &str = "builtins";

/// Concrete type of a host value
///
/// Identity is the Rust `TypeId`; module and name are only used for
/// diagnostics and the generic proxied representation.
#[derive(Debug, Clone, Copy)]
pub struct ObjectType {
    id: TypeId,
    module: &'static str,
    name: &'static str,
}

impl ObjectType {
    /// Type descriptor derived from a Rust type path
    pub fn of<T: ?Sized + 'static>() -> Self {
        let (module, name) = split_type_path(std::any::type_name::<T>());
        Self {
            id: TypeId::of::<T>(),
            module,
            name,
        }
    }

    /// Type descriptor for a built-in value kind, keyed by a marker type
    pub fn builtin<T: 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            module: BUILTIN_MODULE,
            name,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn module(&self) -> &'static str {
        self.module
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this descriptor names the Rust type `T`
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.module, self.name)
        }
    }
}

/// Split `a::b::Name<generic::Arg>` into (`a::b`, `Name`)
fn split_type_path(path: &'static str) -> (&'static str, &'static str) {
    let base = match path.find('<') {
        Some(idx) => &path[..idx],
        None => path,
    };
    match base.rfind("::") {
        Some(idx) => (&base[..idx], &base[idx + 2..]),
        None => ("", base),
    }
}

/// Permission attached to a name in a checker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Permission {
    /// Always granted; the interaction is never consulted
    Public,
    /// Granted only if the current interaction holds it
    Named(Arc<str>),
}

impl Permission {
    pub fn named(id: impl Into<Arc<str>>) -> Self {
        Permission::Named(id.into())
    }

    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Permission::Public)
    }

    /// Permission identifier as consulted on the interaction
    pub fn id(&self) -> &str {
        match self {
            Permission::Public => "Public",
            Permission::Named(id) => id,
        }
    }
}

impl From<&str> for Permission {
    fn from(id: &str) -> Self {
        Permission::named(id)
    }
}

impl From<String> for Permission {
    fn from(id: String) -> Self {
        Permission::named(id)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Attribute/operation name to permission mapping
pub type PermissionMap = ahash::HashMap<String, Permission>;

/// Build a permission map from `(name, permission)` pairs
pub fn permission_map<I, N, P>(entries: I) -> PermissionMap
where
    I: IntoIterator<Item = (N, P)>,
    N: Into<String>,
    P: Into<Permission>,
{
    entries
        .into_iter()
        .map(|(name, permission)| (name.into(), permission.into()))
        .collect()
}

/// Names of the form `__name__` are protocol names
#[inline]
pub fn is_special_name(name: &str) -> bool {
    name.starts_with("__")
}
