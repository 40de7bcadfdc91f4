/*!
 * Reference Cycle Hooks
 *
 * Proxies, checkers and contained proxies expose what they own so a host
 * collector can find cycles (a target holding its own proxy, a checker
 * closing over a proxied object) and break them by clearing.
 */

use crate::checker::CheckerRef;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::object::Value;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// A reference owned by a traversable object
pub enum Referent<'a> {
    Value(&'a Value),
    Checker(&'a CheckerRef),
}

/// Visit and release owned references
pub trait Traverse {
    /// Report every owned reference to `visit`
    fn traverse(&self, visit: &mut dyn FnMut(Referent<'_>));

    /// Drop every owned reference; later use fails with `ProxyCleared`
    fn clear(&self);
}

/// Owned references of a slot record
pub(crate) trait SlotRefs {
    fn visit(&self, visit: &mut dyn FnMut(Referent<'_>));
}

/// Clearable slot record
///
/// Reads are a single atomic load; clearing swaps the record out so the
/// references are released even while other handles to the proxy live.
pub(crate) struct Slots<T> {
    cell: ArcSwapOption<T>,
}

impl<T: SlotRefs> Slots<T> {
    pub(crate) fn new(record: T) -> Self {
        Self {
            cell: ArcSwapOption::from_pointee(record),
        }
    }

    #[inline]
    pub(crate) fn load(&self) -> SecurityResult<Arc<T>> {
        self.cell.load_full().ok_or(SecurityError::ProxyCleared)
    }

    #[inline]
    pub(crate) fn is_cleared(&self) -> bool {
        self.cell.load().is_none()
    }

    /// Replace the record through clone-modify-swap
    pub(crate) fn update<F>(&self, f: F) -> SecurityResult<()>
    where
        F: Fn(&T) -> T,
    {
        let previous = self
            .cell
            .rcu(|current| current.as_ref().map(|record| Arc::new(f(&**record))));
        match previous {
            Some(_) => Ok(()),
            None => Err(SecurityError::ProxyCleared),
        }
    }

    pub(crate) fn traverse(&self, visit: &mut dyn FnMut(Referent<'_>)) {
        if let Some(record) = self.cell.load_full() {
            record.visit(visit);
        }
    }

    pub(crate) fn clear(&self) {
        let record = self.cell.swap(None);
        drop(record);
    }
}
