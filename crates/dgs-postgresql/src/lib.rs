//! PostgreSQL (and CockroachDB) loading for the dgs data generator.
//!
//! # Architecture
//!
//! ```text
//! Config ──► plan() per table ──► Populator
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!             worker 0          worker 1   ...    worker N-1
//!          RowGenerator      RowGenerator      RowGenerator
//!                 │                 │                 │
//!                 └──── build_insert ──► Session::exec ┘
//!                                   │
//!                        barrier after every table
//! ```
//!
//! The scheduler only depends on the [`Store`] trait. [`PostgresStore`]
//! implements it over `tokio-postgres`; tests use an in-memory store.
//!
//! [`introspect`] goes the other way: it reads an existing schema and builds
//! a [`dgs_core::Config`] that can be written out as YAML.

pub mod args;
pub mod error;
pub mod insert;
pub mod introspect;
pub mod planner;
pub mod populator;
pub mod store;

// Re-exports for convenience
pub use args::{ConnectionArgs, GenConfigArgs, GenDataArgs};
pub use error::{PopulateError, StatementError};
pub use insert::{build_insert, max_rows_per_statement, InsertMode, Statement, MAX_PARAMETERS};
pub use introspect::{fetch_columns, to_config, ColumnInfo};
pub use planner::{plan, Plan};
pub use populator::{Phase, PopulateOptions, PopulateReport, Populator, TableReport};
pub use store::{PostgresSession, PostgresStore, Session, Store, TextParam};
