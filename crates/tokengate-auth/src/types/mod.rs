//! Shared domain types.

pub mod subject;

pub use subject::Subject;
