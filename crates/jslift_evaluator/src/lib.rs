//! jslift_evaluator: A tree-walking interpreter for the lifted subset.
//!
//! Runs a parsed program and returns what it printed through the `print`
//! builtin. Used to check that a program and its lifted form behave the same.

mod environment;
mod interpreter;
mod value;

pub use interpreter::{EvalError, Interpreter, DEFAULT_CALL_DEPTH_LIMIT};
pub use value::{number_to_string, Value};
