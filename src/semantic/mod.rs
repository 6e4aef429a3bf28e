//! Type inference and implicit conversion insertion.

pub mod analyzer;

pub use analyzer::Analyzer;
