/*!
 * Security Proxy Library
 * Transparent object proxies that check every operation against a checker
 */

pub mod checker;
pub mod core;
pub mod interaction;
pub mod monitoring;
pub mod object;
pub mod proxy;
pub mod registry;

// Re-exports
pub use checker::{
    can_access, can_write, multi_checker, names_checker, proxy_factory, Checker, CheckerRef,
    CheckerSpec, CombinedChecker, NamesChecker, SecurityChecker,
};
pub use crate::core::{
    config, configure, HostError, ObjectType, Permission, PermissionMap, SecurityConfig,
    SecurityError, SecurityResult, WatchLevel,
};
pub use interaction::{
    check_permission, end_interaction, new_interaction, query_interaction, Interaction,
    InteractionGuard, PermissionSet,
};
pub use monitoring::init_tracing;
pub use object::{BinaryOp, CheckerSlot, CompareOp, HostObject, UnaryOp, Value};
pub use proxy::{get_checker, get_object, ContainedProxy, Operation, Referent, SecurityProxy, Traverse};
pub use registry::{select_checker, CheckerEntry};
