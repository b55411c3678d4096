//! Build a generation config from a live PostgreSQL schema.
//!
//! Columns, foreign keys and enum labels are read from the catalog and each
//! column is mapped to a generation mode by its type. Foreign keys become
//! `ref` columns and enums become `set` columns.

use crate::error::PopulateError;
use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use dgs_core::{
    Column, ColumnMode, Config, FloatProps, IntProps, IntervalProps, LengthProps, RangeSpec,
    RefTarget, Table, TimestampProps,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio_postgres::Client;
use tracing::{debug, info};

/// Row count given to tables without an override.
pub const DEFAULT_ROWS: u64 = 100_000;

const COLUMNS_QUERY: &str = r#"
WITH
  columns_info AS (
    SELECT table_name, column_name, ordinal_position, udt_name AS data_type
    FROM information_schema.columns
    WHERE table_schema = $1
  ),
  foreign_keys_info AS (
    SELECT
      tc.table_name AS fk_table,
      kcu.column_name AS fk_column,
      ccu.table_name AS pk_table,
      ccu.column_name AS pk_column
    FROM information_schema.table_constraints AS tc
    JOIN information_schema.key_column_usage AS kcu
      ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage AS ccu
      ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1
  ),
  enum_types AS (
    SELECT t.typname AS type_name, array_agg(e.enumlabel::TEXT ORDER BY e.enumsortorder) AS labels
    FROM pg_type t
    JOIN pg_namespace n ON t.typnamespace = n.oid
    JOIN pg_enum e ON t.oid = e.enumtypid
    WHERE n.nspname = $1
    GROUP BY t.typname
  )
SELECT
  c.table_name::TEXT,
  c.column_name::TEXT,
  c.data_type::TEXT,
  et.labels,
  CASE WHEN fk.pk_table IS NOT NULL THEN (fk.pk_table || '.' || fk.pk_column)::TEXT END
FROM columns_info AS c
LEFT JOIN foreign_keys_info AS fk ON c.table_name = fk.fk_table AND c.column_name = fk.fk_column
LEFT JOIN enum_types AS et ON c.data_type = et.type_name
ORDER BY c.table_name, c.ordinal_position
"#;

/// One column as read from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub table: String,
    pub column: String,
    /// `udt_name`, e.g. `int8`, `varchar`, `timestamptz`
    pub data_type: String,
    /// Labels when the column type is an enum
    pub enum_labels: Option<Vec<String>>,
    /// `table.column` when the column is a foreign key
    pub foreign_key: Option<String>,
}

/// Read column definitions of `schema`.
pub async fn fetch_columns(client: &Client, schema: &str) -> Result<Vec<ColumnInfo>, PopulateError> {
    let rows = client.query(COLUMNS_QUERY, &[&schema]).await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(ColumnInfo {
            table: row.try_get(0)?,
            column: row.try_get(1)?,
            data_type: row.try_get(2)?,
            enum_labels: row.try_get(3)?,
            foreign_key: row.try_get(4)?,
        });
    }

    info!("Read {} columns from schema '{}'", columns.len(), schema);
    Ok(columns)
}

/// Group columns into tables and map each column to a generation mode.
///
/// Tables are taken in name order and get `default_rows` unless `rows`
/// overrides them. `now` anchors timestamp ranges.
pub fn to_config(
    columns: Vec<ColumnInfo>,
    default_rows: u64,
    rows: &HashMap<String, u64>,
    now: DateTime<Utc>,
) -> Result<Config, PopulateError> {
    let mut grouped: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();
    for column in columns {
        grouped.entry(column.table.clone()).or_default().push(column);
    }

    let mut tables = Vec::with_capacity(grouped.len());
    for (name, infos) in grouped {
        let columns = infos
            .iter()
            .map(|info| map_column(info, now))
            .collect::<Result<Vec<_>, _>>()?;
        let count = rows.get(&name).copied().unwrap_or(default_rows);
        debug!("Table '{}': {} columns, {} rows", name, columns.len(), count);
        tables.push(Table::new(name, count, columns));
    }

    Ok(Config::new(tables)?)
}

fn map_column(info: &ColumnInfo, now: DateTime<Utc>) -> Result<Column, PopulateError> {
    let unsupported = || PopulateError::UnsupportedColumnType {
        table: info.table.clone(),
        column: info.column.clone(),
        data_type: info.data_type.clone(),
    };

    if let Some(fk) = &info.foreign_key {
        let target = RefTarget::parse(fk).ok_or_else(unsupported)?;
        return Ok(Column::new(&info.column, ColumnMode::Ref { target }));
    }

    if let Some(labels) = &info.enum_labels {
        if labels.is_empty() {
            return Err(unsupported());
        }
        return Ok(Column::new(
            &info.column,
            ColumnMode::Set {
                pool: labels.clone(),
            },
        ));
    }

    let value = |template: &str| ColumnMode::Value {
        template: template.to_string(),
        format: None,
    };
    let range = |spec: RangeSpec| ColumnMode::Range { spec, format: None };

    let today = now.duration_trunc(ChronoDuration::days(1)).unwrap_or(now);
    let ten_years_ago = today - ChronoDuration::hours(87_600);

    let mode = match info.data_type.as_str() {
        "uuid" => value("${uuid}"),
        "text" | "varchar" | "bpchar" | "name" | "citext" => value("${word}"),
        "bool" => value("${bool}"),
        "int2" => range(RangeSpec::Int(IntProps { min: 1, max: 32_767 })),
        "int4" | "int8" => range(RangeSpec::Int(IntProps {
            min: 1,
            max: 1_000_000,
        })),
        "numeric" | "float4" | "float8" => range(RangeSpec::Float(FloatProps {
            min: 1.0,
            max: 1000.0,
        })),
        "timestamp" | "timestamptz" => range(RangeSpec::Timestamp(TimestampProps {
            min: ten_years_ago,
            max: today,
            format: None,
        })),
        "date" => range(RangeSpec::Timestamp(TimestampProps {
            min: ten_years_ago,
            max: today,
            format: Some("%Y-%m-%d".to_string()),
        })),
        "bytea" => range(RangeSpec::Bytes(LengthProps { min: 8, max: 64 })),
        "interval" => range(RangeSpec::Interval(IntervalProps {
            min: Duration::from_secs(60),
            max: Duration::from_secs(30 * 86_400),
        })),
        _ => return Err(unsupported()),
    };

    Ok(Column::new(&info.column, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn col(table: &str, column: &str, data_type: &str) -> ColumnInfo {
        ColumnInfo {
            table: table.to_string(),
            column: column.to_string(),
            data_type: data_type.to_string(),
            enum_labels: None,
            foreign_key: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 0).unwrap()
    }

    fn sample() -> Vec<ColumnInfo> {
        vec![
            col("pet", "id", "uuid"),
            ColumnInfo {
                foreign_key: Some("person.id".to_string()),
                ..col("pet", "owner_id", "uuid")
            },
            ColumnInfo {
                enum_labels: Some(vec!["cat".to_string(), "dog".to_string()]),
                ..col("pet", "kind", "pet_kind")
            },
            col("person", "id", "uuid"),
            col("person", "name", "varchar"),
            col("person", "age", "int2"),
            col("person", "born", "date"),
            col("person", "created_at", "timestamptz"),
        ]
    }

    #[test]
    fn test_to_config_maps_and_orders_tables() {
        let overrides = HashMap::from([("pet".to_string(), 50)]);
        let config = to_config(sample(), DEFAULT_ROWS, &overrides, now()).unwrap();

        assert_eq!(config.table_names(), vec!["person", "pet"]);
        assert_eq!(config.get_table("person").unwrap().rows, DEFAULT_ROWS);
        assert_eq!(config.get_table("pet").unwrap().rows, 50);

        let pet = config.get_table("pet").unwrap();
        assert_eq!(pet.get_column("owner_id").unwrap().mode.name(), "ref");
        match &pet.get_column("kind").unwrap().mode {
            ColumnMode::Set { pool } => assert_eq!(pool, &vec!["cat".to_string(), "dog".to_string()]),
            other => panic!("unexpected mode {other:?}"),
        }

        let person = config.get_table("person").unwrap();
        assert_eq!(person.referenced_columns(), &["id".to_string()]);
        match &person.get_column("age").unwrap().mode {
            ColumnMode::Range {
                spec: RangeSpec::Int(p),
                ..
            } => assert_eq!(p.max, 32_767),
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_ranges_cover_ten_years() {
        let config = to_config(sample(), 10, &HashMap::new(), now()).unwrap();
        let person = config.get_table("person").unwrap();

        match &person.get_column("born").unwrap().mode {
            ColumnMode::Range {
                spec: RangeSpec::Timestamp(p),
                ..
            } => {
                assert_eq!(p.max, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
                assert_eq!((p.max - p.min).num_hours(), 87_600);
                assert_eq!(p.format.as_deref(), Some("%Y-%m-%d"));
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type() {
        let columns = vec![col("t", "shape", "polygon")];
        match to_config(columns, 10, &HashMap::new(), now()) {
            Err(PopulateError::UnsupportedColumnType { data_type, .. }) => {
                assert_eq!(data_type, "polygon")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
