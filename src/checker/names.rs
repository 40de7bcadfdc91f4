/*!
 * Checker Builders
 * Build checkers from name lists and permission specs
 */

use super::checker::Checker;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::core::types::{Permission, PermissionMap};

/// Insert `name`, refusing a conflicting earlier definition
fn define(map: &mut PermissionMap, name: String, permission: Permission) -> SecurityResult<()> {
    match map.get(&name) {
        Some(existing) if *existing != permission => Err(SecurityError::Duplication(name)),
        _ => {
            map.insert(name, permission);
            Ok(())
        }
    }
}

/// Checker granting every name in `names` under one permission
pub fn names_checker<I, S>(names: I, permission: Permission) -> Checker
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let map = names
        .into_iter()
        .map(|name| (name.into(), permission.clone()))
        .collect();
    Checker::new(map, None)
}

/// Builder for a names checker with extra per-name permissions
///
/// # Example
///
/// ```ignore
/// let checker = NamesChecker::new(["title", "body"], Permission::Public)
///     .with("secret", Permission::named("View"))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct NamesChecker {
    names: Vec<String>,
    permission: Permission,
    extra: Vec<(String, Permission)>,
}

impl NamesChecker {
    pub fn new<I, S>(names: I, permission: Permission) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            permission,
            extra: Vec::new(),
        }
    }

    /// Add an explicit `(name, permission)` entry
    pub fn with(mut self, name: impl Into<String>, permission: impl Into<Permission>) -> Self {
        self.extra.push((name.into(), permission.into()));
        self
    }

    /// # Errors
    /// `Duplication` when a name listed under the shared permission was
    /// also given a different explicit permission.
    pub fn build(self) -> SecurityResult<Checker> {
        let mut map = PermissionMap::default();
        for (name, permission) in self.extra {
            define(&mut map, name, permission)?;
        }
        for name in self.names {
            define(&mut map, name, self.permission.clone())?;
        }
        Ok(Checker::new(map, None))
    }
}

/// One part of a `multi_checker` definition
#[derive(Debug, Clone)]
pub enum CheckerSpec {
    /// Every name under one permission
    Names(Vec<String>, Permission),
    /// Explicit entries
    Map(PermissionMap),
}

impl CheckerSpec {
    pub fn names<I, S>(names: I, permission: Permission) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CheckerSpec::Names(names.into_iter().map(Into::into).collect(), permission)
    }
}

/// Checker merged from several specs
///
/// # Errors
/// `Duplication` when two specs give one name different permissions.
pub fn multi_checker<I>(specs: I) -> SecurityResult<Checker>
where
    I: IntoIterator<Item = CheckerSpec>,
{
    let mut map = PermissionMap::default();
    for spec in specs {
        match spec {
            CheckerSpec::Names(names, permission) => {
                for name in names {
                    define(&mut map, name, permission.clone())?;
                }
            }
            CheckerSpec::Map(entries) => {
                for (name, permission) in entries {
                    define(&mut map, name, permission)?;
                }
            }
        }
    }
    Ok(Checker::new(map, None))
}
