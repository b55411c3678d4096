//! `gen config`: build a config from an existing schema.

use crate::logging::mask_connection_password;
use anyhow::Context;
use chrono::Utc;
use dgs_postgresql::{introspect, GenConfigArgs, PostgresStore};
use std::fs;

/// Introspect the schema and write the resulting YAML to the output file or
/// stdout.
pub async fn run_gen_config(args: GenConfigArgs) -> anyhow::Result<()> {
    tracing::info!(
        "Introspecting schema '{}' at {}",
        args.schema,
        mask_connection_password(&args.connection.url)
    );

    let client = PostgresStore::new(args.connection.url.clone())
        .connect()
        .await
        .context("Failed to connect to database")?;

    let columns = introspect::fetch_columns(&client, &args.schema)
        .await
        .with_context(|| format!("Failed to read schema '{}'", args.schema))?;
    if columns.is_empty() {
        anyhow::bail!("Schema '{}' has no tables", args.schema);
    }

    let config = introspect::to_config(
        columns,
        args.default_rows,
        &args.row_overrides(),
        Utc::now(),
    )?;
    let yaml = config.to_yaml()?;

    match &args.output {
        Some(path) => {
            fs::write(path, &yaml).with_context(|| format!("Failed to write {path:?}"))?;
            tracing::info!(
                "Wrote config for {} tables to {:?}",
                config.tables().len(),
                path
            );
        }
        None => print!("{yaml}"),
    }

    Ok(())
}
