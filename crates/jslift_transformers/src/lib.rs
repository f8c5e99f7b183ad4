//! jslift_transformers: AST to text transformations.
//!
//! `FunctionLifter` rewrites a program so that no function declaration is
//! nested inside another. Each nested declaration moves to the top level,
//! takes the variables it captured as extra trailing parameters, and every
//! later call to it passes those variables explicitly.

mod lifter;
mod registry;

pub use lifter::{FunctionLifter, LiftError};
pub use registry::{LiftedFunction, Registry};
