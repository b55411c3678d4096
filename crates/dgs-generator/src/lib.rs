//! Value and row generation for the dgs data generator.
//!
//! # Architecture
//!
//! ```text
//! Config (dgs-core)
//!        │
//!        ▼
//! ┌─────────────────┐      ┌────────────┐
//! │  RowGenerator   │◄─────│  RefCache  │◄── written batches
//! │                 │      └────────────┘
//! │  - rng (StdRng) │
//! └────────┬────────┘
//!          │
//!          ▼
//!    Vec<Value> per row, columns in declared order
//! ```
//!
//! # Example
//!
//! ```rust
//! use dgs_core::Config;
//! use dgs_generator::{RefCache, RowGenerator};
//! use std::sync::Arc;
//!
//! let config = Config::from_yaml(r#"
//! tables:
//!   - name: users
//!     rows: 10
//!     columns:
//!       - name: id
//!         value: ${uuid}
//!       - name: email
//!         value: ${email}
//! "#).unwrap();
//!
//! let mut generator = RowGenerator::new(Arc::new(RefCache::new()), 42);
//! let row = generator.next_row(&config.tables()[0]).unwrap();
//! assert_eq!(row.len(), 2);
//! ```

pub mod generator;
pub mod generators;
pub mod refs;

// Re-exports for convenience
pub use generator::{GeneratorError, RowGenerator};
pub use refs::RefCache;
