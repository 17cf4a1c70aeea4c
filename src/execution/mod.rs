//! Execution logs: one record per task run.

pub mod schema;

pub use schema::*;
