/*!
 * Permission Set
 * Minimal interaction that holds a fixed set of permissions
 */

use super::traits::Interaction;
use crate::core::types::Permission;
use crate::object::Value;
use ahash::HashSet;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Interaction granting a set of permission ids on every object
#[derive(Debug, Default)]
pub struct PermissionSet {
    granted: RwLock<HashSet<String>>,
    consulted: AtomicU64,
}

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: RwLock::new(permissions.into_iter().map(Into::into).collect()),
            consulted: AtomicU64::new(0),
        }
    }

    /// Interaction that denies every named permission
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn grant(&self, permission: impl Into<String>) {
        self.granted.write().insert(permission.into());
    }

    pub fn revoke(&self, permission: &str) -> bool {
        self.granted.write().remove(permission)
    }

    /// How many times a checker asked this interaction
    pub fn consultations(&self) -> u64 {
        self.consulted.load(Ordering::Relaxed)
    }
}

impl Interaction for PermissionSet {
    fn check_permission(&self, permission: &Permission, _object: &Value) -> bool {
        self.consulted.fetch_add(1, Ordering::Relaxed);
        permission.is_public() || self.granted.read().contains(permission.id())
    }
}
