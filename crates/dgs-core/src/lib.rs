//! Core types for the dgs data generator.
//!
//! This crate provides the foundational types shared by the generator and
//! the database crates:
//!
//! - [`Config`] - Validated generation config loaded from YAML
//! - [`ColumnMode`] - Closed set of per-column generation modes
//! - [`Value`] - Raw generated values
//! - [`Sequence`] - Atomic counter behind `inc` columns
//!
//! # Architecture
//!
//! ```text
//! dgs-core (this crate)
//!    │
//!    ├─── dgs-generator   (random values, row generation, ref cache)
//!    │
//!    └─── dgs-postgresql  (planner, statements, scheduler, introspection)
//! ```
//!
//! # Example
//!
//! ```rust
//! use dgs_core::Config;
//!
//! let config = Config::from_yaml(r#"
//! tables:
//!   - name: pet
//!     rows: 10
//!     columns:
//!       - name: owner_id
//!         ref: person.id
//!   - name: person
//!     rows: 5
//!     columns:
//!       - name: id
//!         inc: 1
//! "#).unwrap();
//!
//! assert_eq!(config.table_names(), vec!["person", "pet"]);
//! ```

pub mod config;
pub mod duration;
pub mod sequence;
pub mod sort;
pub mod values;

// Re-exports for convenience
pub use config::{
    Column, ColumnMode, Config, ConfigError, FloatProps, IntProps, IntervalProps, LengthProps,
    PointProps, RangeSpec, RefTarget, Table, TimestampProps,
};
pub use sequence::Sequence;
pub use values::{Point, Value};
