//! Handlers for the `gen` subcommands.

pub mod gen_config;
pub mod gen_data;
pub mod tokens;

pub use gen_config::run_gen_config;
pub use gen_data::run_gen_data;
pub use tokens::run_tokens;
