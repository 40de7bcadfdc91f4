/*!
 * Interaction Module
 * The thread-local party whose permissions checkers consult
 */

pub mod management;
pub mod permission_set;
pub mod traits;

pub use management::{
    check_permission, end_interaction, new_interaction, query_interaction, InteractionGuard,
};
pub use permission_set::PermissionSet;
pub use traits::{Interaction, InteractionRef};
