/*!
 * Host Object Model
 * Dynamic values, the host object protocol and built-in types
 */

pub mod builtins;
pub mod ops;
pub mod traits;
pub mod value;

pub use builtins::{ErrorObject, Function, List, Namespace, SequenceIterator};
pub use ops::{BinaryOp, CompareOp, UnaryOp};
pub use traits::{AsAny, CheckerSlot, HostObject};
pub use value::{Value, ValueIter};
