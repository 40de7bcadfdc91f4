/*!
 * Checker Module
 * Access-control policies consulted by security proxies
 */

pub mod access;
#[allow(clippy::module_inception)]
pub mod checker;
pub mod combined;
pub mod factory;
pub mod names;
pub mod traits;
mod watch;

pub use access::{can_access, can_write};
pub use checker::Checker;
pub use combined::CombinedChecker;
pub use factory::{proxy_factory, proxy_value};
pub use names::{multi_checker, names_checker, CheckerSpec, NamesChecker};
pub use traits::{same_checker, CheckerRef, SecurityChecker};
