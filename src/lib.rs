//! dgs: relational synthetic data generation for PostgreSQL and CockroachDB.
//!
//! The binary wires the member crates together:
//!
//! - `dgs-core` - config model, values, dependency order
//! - `dgs-generator` - random values, tokens, rows, ref cache
//! - `dgs-postgresql` - planner, statements, scheduler, introspection

pub mod commands;
pub mod logging;
