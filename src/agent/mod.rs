//! Agents: executor capability descriptors. Read-only in the core.

pub mod schema;

pub use schema::*;
