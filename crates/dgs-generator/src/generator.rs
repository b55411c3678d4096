//! Row generation from column definitions.

use crate::generators::{self, tokens};
use crate::refs::RefCache;
use dgs_core::{Column, ColumnMode, RangeSpec, Table, Value};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No written values are available for a ref target
    #[error("No values available for ref '{0}'")]
    RefPoolEmpty(String),

    /// Range bounds produce no representable value
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Failure while generating a specific column
    #[error("Failed to generate column '{column}': {source}")]
    Column {
        column: String,
        #[source]
        source: Box<GeneratorError>,
    },
}

/// Produces rows for tables of a config.
///
/// Each generator owns its RNG, so one generator is used per worker. Ref
/// columns read from the shared [`RefCache`].
pub struct RowGenerator {
    rng: StdRng,
    refs: Arc<RefCache>,
}

impl RowGenerator {
    /// Create a generator with a seeded RNG.
    pub fn new(refs: Arc<RefCache>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            refs,
        }
    }

    /// Create a generator seeded from the operating system.
    pub fn from_os_rng(refs: Arc<RefCache>) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            refs,
        }
    }

    /// Generate one row with values in declared column order.
    pub fn next_row(&mut self, table: &Table) -> Result<Vec<Value>, GeneratorError> {
        table
            .columns
            .iter()
            .map(|column| {
                self.generate_column(column)
                    .map_err(|e| GeneratorError::Column {
                        column: column.name.clone(),
                        source: Box::new(e),
                    })
            })
            .collect()
    }

    /// Generate `count` rows.
    pub fn rows(&mut self, table: &Table, count: usize) -> Result<Vec<Vec<Value>>, GeneratorError> {
        (0..count).map(|_| self.next_row(table)).collect()
    }

    fn generate_column(&mut self, column: &Column) -> Result<Value, GeneratorError> {
        let rng = &mut self.rng;
        match &column.mode {
            ColumnMode::Value { template, format } => {
                let value = tokens::expand_template(template, rng);
                Ok(apply_format(value, format.as_deref()))
            }

            ColumnMode::Range { spec, format } => generate_range(spec, format.as_deref(), rng),

            ColumnMode::Set { pool } => pool
                .choose(rng)
                .map(|s| Value::String(s.clone()))
                .ok_or_else(|| GeneratorError::InvalidRange("empty set".to_string())),

            ColumnMode::Ref { target } => self.refs.sample(&target.key(), rng),

            ColumnMode::Inc { sequence } => Ok(Value::Int(sequence.next())),

            ColumnMode::Array { item, count } => {
                let (min, max) = if count.min > count.max {
                    (count.max, count.min)
                } else {
                    (count.min, count.max)
                };
                let n = if min == max {
                    min
                } else {
                    rng.random_range(min..max)
                };
                Ok(Value::Array(
                    (0..n).map(|_| tokens::expand_template(item, rng)).collect(),
                ))
            }
        }
    }
}

fn apply_format(value: Value, format: Option<&str>) -> Value {
    match format {
        Some(format) => Value::String(value.format_with(format)),
        None => value,
    }
}

fn generate_range(
    spec: &RangeSpec,
    format: Option<&str>,
    rng: &mut StdRng,
) -> Result<Value, GeneratorError> {
    let value = match spec {
        RangeSpec::Int(p) => generators::numeric::generate_int_range(rng, p.min, p.max),
        RangeSpec::Float(p) => generators::numeric::generate_float_range(rng, p.min, p.max)
            .ok_or_else(|| GeneratorError::InvalidRange(format!("float {} to {}", p.min, p.max)))?,
        RangeSpec::Bytes(p) => Value::Bytes(generators::text::generate_bytes(rng, p.min, p.max)),
        RangeSpec::String(p) => {
            Value::String(generators::text::generate_string(rng, p.min, p.max))
        }
        RangeSpec::BitString(p) => {
            Value::String(generators::text::generate_bit_string(rng, p.min, p.max))
        }
        RangeSpec::Timestamp(p) => {
            let ts = generators::timestamp::generate_timestamp_range(rng, p.min, p.max)
                .ok_or_else(|| {
                    GeneratorError::InvalidRange(format!("timestamp {} to {}", p.min, p.max))
                })?;
            let layout = p.format.as_deref().or(format);
            return Ok(apply_format(Value::Timestamp(ts), layout));
        }
        RangeSpec::Interval(p) => Value::Interval(
            generators::timestamp::generate_interval_range(rng, p.min, p.max),
        ),
        RangeSpec::Point(p) => Value::Point(generators::point::generate_point(
            rng,
            p.lat,
            p.lon,
            p.distance_km,
        )),
    };
    Ok(apply_format(value, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use dgs_core::Config;

    fn config() -> Config {
        Config::from_yaml(
            r#"
tables:
  - name: person
    rows: 10
    columns:
      - name: id
        value: ${uuid}
      - name: code
        value: P-${uint8}
      - name: age
        range: int
        props: { min: 18, max: 80 }
      - name: born
        range: timestamp
        props: { min: 1970-01-01T00:00:00Z, max: 2000-01-01T00:00:00Z, format: "%Y-%m-%d" }
      - name: seen
        range: timestamp
        props: { min: 2020-01-01T00:00:00Z, max: 2021-01-01T00:00:00Z }
      - name: status
        set: [active, inactive]
      - name: seq
        inc: 100
      - name: tags
        array: ${word}
        props: { min: 2, max: 2 }
      - name: label
        range: int
        props: { min: 1, max: 10 }
        format: "L{}"
  - name: pet
    rows: 10
    columns:
      - name: owner_id
        ref: person.id
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_next_row_follows_column_modes() {
        let config = config();
        let person = config.get_table("person").unwrap();
        let mut generator = RowGenerator::new(Arc::new(RefCache::new()), 42);

        let row = generator.next_row(person).unwrap();
        assert_eq!(row.len(), person.columns.len());

        assert!(matches!(row[0], Value::Uuid(_)));
        assert!(row[1].as_str().unwrap().starts_with("P-"));
        assert!((18..80).contains(&row[2].as_i64().unwrap()));

        let born = NaiveDate::parse_from_str(row[3].as_str().unwrap(), "%Y-%m-%d").unwrap();
        assert!((1970..2000).contains(&born.year()));

        assert!(matches!(row[4], Value::Timestamp(_)));
        assert!(["active", "inactive"].contains(&row[5].as_str().unwrap()));
        assert_eq!(row[6], Value::Int(100));
        assert_eq!(row[7].as_array().unwrap().len(), 2);
        assert!(row[8].as_str().unwrap().starts_with('L'));

        let next = generator.next_row(person).unwrap();
        assert_eq!(next[6], Value::Int(101));
    }

    #[test]
    fn test_same_seed_same_rows() {
        let config = config();
        let person = config.get_table("person").unwrap();
        let mut a = RowGenerator::new(Arc::new(RefCache::new()), 7);
        let mut b = RowGenerator::new(Arc::new(RefCache::new()), 7);

        let ra = a.next_row(person).unwrap();
        let rb = b.next_row(person).unwrap();
        // Sequence columns share state across generators of the same config.
        assert_eq!(ra[..6], rb[..6]);
    }

    #[test]
    fn test_ref_samples_from_cache() {
        let config = config();
        let person = config.get_table("person").unwrap();
        let pet = config.get_table("pet").unwrap();
        let refs = Arc::new(RefCache::new());
        let mut generator = RowGenerator::new(Arc::clone(&refs), 42);

        let people = generator.rows(person, 5).unwrap();
        refs.refresh(person, &people);
        let ids: Vec<Value> = people.iter().map(|r| r[0].clone()).collect();

        for row in generator.rows(pet, 20).unwrap() {
            assert!(ids.contains(&row[0]));
        }
    }

    #[test]
    fn test_empty_ref_pool_names_column() {
        let config = config();
        let pet = config.get_table("pet").unwrap();
        let mut generator = RowGenerator::new(Arc::new(RefCache::new()), 42);

        match generator.next_row(pet) {
            Err(GeneratorError::Column { column, source }) => {
                assert_eq!(column, "owner_id");
                assert!(matches!(*source, GeneratorError::RefPoolEmpty(_)));
            }
            other => panic!("expected column error, got {other:?}"),
        }
    }

    #[test]
    fn test_unbounded_float_is_an_error() {
        let table = Table::new(
            "t",
            1,
            vec![Column::new(
                "x",
                ColumnMode::Range {
                    spec: RangeSpec::Float(dgs_core::FloatProps {
                        min: f64::NEG_INFINITY,
                        max: f64::INFINITY,
                    }),
                    format: None,
                },
            )],
        );
        let mut generator = RowGenerator::new(Arc::new(RefCache::new()), 42);

        match generator.next_row(&table) {
            Err(GeneratorError::Column { column, source }) => {
                assert_eq!(column, "x");
                assert!(matches!(*source, GeneratorError::InvalidRange(_)));
            }
            other => panic!("expected column error, got {other:?}"),
        }
    }
}
