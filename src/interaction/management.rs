/*!
 * Interaction Management
 *
 * The current interaction is strictly thread-local. Checks on a thread
 * without one fail with `NoInteraction` instead of being allowed.
 */

use super::traits::InteractionRef;
use crate::core::errors::{SecurityError, SecurityResult};
use crate::core::types::Permission;
use crate::object::Value;
use log::debug;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static CURRENT: RefCell<Option<InteractionRef>> = const { RefCell::new(None) };
}

/// Start an interaction on this thread
///
/// # Errors
/// `ExistingInteraction` when one is already active.
pub fn new_interaction(interaction: InteractionRef) -> SecurityResult<()> {
    CURRENT.with(|cell| {
        let mut current = cell.borrow_mut();
        if current.is_some() {
            return Err(SecurityError::ExistingInteraction);
        }
        *current = Some(interaction);
        debug!("Interaction started on {:?}", std::thread::current().id());
        Ok(())
    })
}

/// End this thread's interaction, returning it
pub fn end_interaction() -> Option<InteractionRef> {
    let ended = CURRENT.with(|cell| cell.borrow_mut().take());
    if ended.is_some() {
        debug!("Interaction ended on {:?}", std::thread::current().id());
    }
    ended
}

/// This thread's interaction, if any
pub fn query_interaction() -> Option<InteractionRef> {
    CURRENT.with(|cell| cell.borrow().clone())
}

/// Ask the current interaction about `permission` on `object`
///
/// Public is granted without an interaction.
///
/// # Errors
/// `NoInteraction` when a named permission is checked on a thread without
/// an interaction.
pub fn check_permission(permission: &Permission, object: &Value) -> SecurityResult<bool> {
    if permission.is_public() {
        return Ok(true);
    }
    // Release the borrow before calling out; the interaction may re-enter
    let interaction = query_interaction().ok_or(SecurityError::NoInteraction)?;
    Ok(interaction.check_permission(permission, object))
}

/// Scoped interaction; ends the interaction when dropped
///
/// Tied to the thread it was created on.
#[derive(Debug)]
#[must_use = "the interaction ends as soon as the guard is dropped"]
pub struct InteractionGuard {
    _thread_bound: PhantomData<*const ()>,
}

impl InteractionGuard {
    /// # Errors
    /// `ExistingInteraction` when one is already active.
    pub fn enter(interaction: InteractionRef) -> SecurityResult<Self> {
        new_interaction(interaction)?;
        Ok(Self {
            _thread_bound: PhantomData,
        })
    }
}

impl Drop for InteractionGuard {
    fn drop(&mut self) {
        end_interaction();
    }
}
