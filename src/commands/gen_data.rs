//! `gen data`: generate rows from a config and write them to the database.

use crate::logging::mask_connection_password;
use anyhow::Context;
use dgs_core::Config;
use dgs_postgresql::{GenDataArgs, PopulateReport, Populator, PostgresStore};
use std::sync::Arc;

/// Load the config, then populate every table it declares.
pub async fn run_gen_data(args: GenDataArgs) -> anyhow::Result<PopulateReport> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    tracing::info!(
        "Populating {} tables ({} workers, batch {}, mode {:?})",
        config.tables().len(),
        args.workers,
        args.batch,
        args.mode
    );
    tracing::info!(
        "Connection: {}",
        mask_connection_password(&args.connection.url)
    );

    let store = Arc::new(PostgresStore::new(args.connection.url.clone()));
    let populator = Populator::new(store, Arc::new(config), args.options());

    let report = populator
        .run()
        .await
        .context("Failed to populate database")?;

    for table in &report.tables {
        println!(
            "{}: {} rows in {} batches ({:.2?})",
            table.table, table.rows_written, table.batch_count, table.duration
        );
    }
    println!(
        "Total: {} rows in {:.2?} ({:.0} rows/sec)",
        report.rows_written(),
        report.total_duration,
        report.rows_per_second()
    );

    Ok(report)
}
