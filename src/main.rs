//! Command-line interface for dgs
//!
//! # Usage Examples
//!
//! ## Generate Data
//! ```bash
//! # Populate every table of a config with 4 workers
//! dgs gen data \
//!   --url "postgresql://root@localhost:26257/defaultdb?sslmode=disable" \
//!   --config config.yaml \
//!   --batch 1000 --workers 4
//! ```
//!
//! ## Generate Config
//! ```bash
//! # Build a config from an existing schema
//! dgs gen config \
//!   --url "postgresql://root@localhost:26257/defaultdb?sslmode=disable" \
//!   --schema public \
//!   --rows person=1000 --rows pet=5000 \
//!   --output config.yaml
//! ```
//!
//! ## List Tokens
//! ```bash
//! dgs gen tokens
//! ```

use clap::{Parser, Subcommand};
use dgs::commands::{run_gen_config, run_gen_data, run_tokens};
use dgs::logging;
use dgs_postgresql::{GenConfigArgs, GenDataArgs};

#[derive(Parser)]
#[command(name = "dgs")]
#[command(about = "Generate relational test data for PostgreSQL and CockroachDB")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate data or configs
    Gen {
        #[command(subcommand)]
        command: GenCommand,
    },
}

#[derive(Subcommand)]
enum GenCommand {
    /// Generate rows from a config and write them to the database
    Data {
        #[command(flatten)]
        args: GenDataArgs,
    },

    /// Build a config from an existing database schema
    Config {
        #[command(flatten)]
        args: GenConfigArgs,
    },

    /// List the tokens available in value templates
    Tokens,
}

impl GenCommand {
    fn debug(&self) -> bool {
        match self {
            GenCommand::Data { args } => args.debug,
            GenCommand::Config { args } => args.debug,
            GenCommand::Tokens => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gen { command } => {
            logging::init(command.debug());

            match command {
                GenCommand::Data { args } => {
                    run_gen_data(args).await?;
                }
                GenCommand::Config { args } => run_gen_config(args).await?,
                GenCommand::Tokens => run_tokens(),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_gen_data() {
        let cli = Cli::try_parse_from([
            "dgs", "gen", "data", "--url", "postgresql://x", "--config", "c.yaml", "--debug",
        ])
        .unwrap();

        let Commands::Gen { command } = cli.command;
        assert!(command.debug());
        assert!(matches!(command, GenCommand::Data { .. }));
    }

    #[test]
    fn test_parse_gen_tokens() {
        let cli = Cli::try_parse_from(["dgs", "gen", "tokens"]).unwrap();
        let Commands::Gen { command } = cli.command;
        assert!(matches!(command, GenCommand::Tokens));
        assert!(!command.debug());
    }
}
