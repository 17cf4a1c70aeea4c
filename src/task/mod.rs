//! Tasks: schedulable units of work.

pub mod schema;

pub use schema::*;
