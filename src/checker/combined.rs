/*!
 * Combined Checker
 *
 * Grants access when either of two checkers grants it. When both refuse,
 * an `Unauthorized` wins over a `ForbiddenAttribute` (the name is known,
 * just not permitted), and otherwise the first checker's error is kept.
 */

use super::traits::{CheckerRef, SecurityChecker};
use crate::core::errors::SecurityResult;
use crate::core::types::Permission;
use crate::object::Value;
use crate::proxy::{Referent, Traverse};

/// Logical OR of two checkers
pub struct CombinedChecker {
    first: CheckerRef,
    second: CheckerRef,
}

impl CombinedChecker {
    pub fn new(first: CheckerRef, second: CheckerRef) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &CheckerRef {
        &self.first
    }

    pub fn second(&self) -> &CheckerRef {
        &self.second
    }
}

/// Combine two outcomes; the second check only runs if the first refuses
fn either<F>(first: SecurityResult<()>, second: F) -> SecurityResult<()>
where
    F: FnOnce() -> SecurityResult<()>,
{
    let first_err = match first {
        Ok(()) => return Ok(()),
        Err(err) if err.is_denial() => err,
        Err(err) => return Err(err),
    };
    match second() {
        Ok(()) => Ok(()),
        Err(second_err) if first_err.is_forbidden() && second_err.is_unauthorized() => {
            Err(second_err)
        }
        Err(second_err) if second_err.is_denial() => Err(first_err),
        Err(other) => Err(other),
    }
}

impl SecurityChecker for CombinedChecker {
    fn permission_id(&self, name: &str) -> Option<Permission> {
        self.first
            .permission_id(name)
            .or_else(|| self.second.permission_id(name))
    }

    fn setattr_permission_id(&self, name: &str) -> Option<Permission> {
        self.first
            .setattr_permission_id(name)
            .or_else(|| self.second.setattr_permission_id(name))
    }

    fn check(&self, object: &Value, name: &str) -> SecurityResult<()> {
        either(self.first.check(object, name), || self.second.check(object, name))
    }

    fn check_getattr(&self, object: &Value, name: &str) -> SecurityResult<()> {
        either(self.first.check_getattr(object, name), || {
            self.second.check_getattr(object, name)
        })
    }

    fn check_setattr(&self, object: &Value, name: &str) -> SecurityResult<()> {
        either(self.first.check_setattr(object, name), || {
            self.second.check_setattr(object, name)
        })
    }
}

impl Traverse for CombinedChecker {
    fn traverse(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        visit(Referent::Checker(&self.first));
        visit(Referent::Checker(&self.second));
    }

    /// The two halves are shared; nothing is owned exclusively
    fn clear(&self) {}
}
