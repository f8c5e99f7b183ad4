//! jslift_binder: Lexical scope tracking and free-variable analysis.
//!
//! The lifter asks this crate which names a nested function reads from its
//! enclosing scopes. Those names become the trailing parameters of the
//! lifted function.

mod free_vars;
mod scope;

pub use free_vars::{CallAugmentation, FreeVariableCollector};
pub use scope::ScopeStack;
