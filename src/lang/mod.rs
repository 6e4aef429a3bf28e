//! # dix expression tree and values
//!
//! The parser builds `Node` trees, the semantic pass annotates them with
//! `ValueType`s, and the compiler lowers them into bytecode whose constants
//! and stack slots hold `Value`s.

pub mod node;
pub mod value;

pub use node::{BinaryOp, Node, NodeKind, UnaryOp};
pub use value::{Value, ValueType};
