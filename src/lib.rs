//! # dix
//!
//! Compiles and runs a single arithmetic expression over ints, floats and
//! booleans:
//!
//! ```text
//! source -> Lexer -> Parser -> Analyzer -> Compiler -> Vm
//! ```
//!
//! [`interpret`] runs the whole pipeline against stdout and stderr;
//! [`Pipeline`] does the same against any pair of writers.

pub mod bytecode;
pub mod diagnostic;
pub mod error;
pub mod frontend;
pub mod lang;
pub mod pipeline;
pub mod runtime;
pub mod semantic;

pub use diagnostic::Diagnostic;
pub use error::Error;
pub use pipeline::{
    DumpOptions, InterpretResult, Pipeline, compile_source, interpret, interpret_with,
};
