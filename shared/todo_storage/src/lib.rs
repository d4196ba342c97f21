//! Storage services for the todo API
//!
//! This crate owns the todo data model, the typed store operations produced by the
//! resolver layer, and the stores that execute them: `DynamoDB` for deployed
//! environments and an in-memory store for tests and local runs.

pub mod memory;
pub mod table;
pub mod todo;
