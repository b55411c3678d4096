//! Referential integrity cache.
//!
//! Holds, per `table.column` key, the values of the most recently written
//! batch. Every write replaces the previous pool. `ref` columns sample
//! uniformly from the pool of their target.

use crate::generator::GeneratorError;
use dgs_core::{Table, Value};
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared pools of written values keyed by `table.column`.
#[derive(Debug, Default)]
pub struct RefCache {
    pools: Mutex<HashMap<String, Arc<Vec<Value>>>>,
}

impl RefCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pool stored at `key`.
    pub fn store(&self, key: impl Into<String>, values: Vec<Value>) {
        self.pools.lock().insert(key.into(), Arc::new(values));
    }

    /// Current pool at `key`, if any.
    pub fn pool(&self, key: &str) -> Option<Arc<Vec<Value>>> {
        self.pools.lock().get(key).cloned()
    }

    /// Pick a value uniformly from the pool at `key`.
    pub fn sample<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Result<Value, GeneratorError> {
        let pool = self
            .pool(key)
            .ok_or_else(|| GeneratorError::RefPoolEmpty(key.to_string()))?;
        pool.choose(rng)
            .cloned()
            .ok_or_else(|| GeneratorError::RefPoolEmpty(key.to_string()))
    }

    /// Store the referenced columns of a written batch as the new pools for
    /// `table`.
    pub fn refresh(&self, table: &Table, rows: &[Vec<Value>]) {
        for column in table.referenced_columns() {
            let Some(idx) = table.columns.iter().position(|c| &c.name == column) else {
                continue;
            };
            let values: Vec<Value> = rows.iter().filter_map(|row| row.get(idx).cloned()).collect();
            self.store(format!("{}.{}", table.name, column), values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgs_core::Config;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_returns_values_of_latest_batch() {
        let cache = RefCache::new();
        let mut rng = StdRng::seed_from_u64(42);

        cache.store("person.id", vec![Value::Int(1), Value::Int(2)]);
        cache.store("person.id", vec![Value::Int(10), Value::Int(11), Value::Int(12)]);

        for _ in 0..50 {
            let v = cache.sample("person.id", &mut rng).unwrap().as_i64().unwrap();
            assert!((10..=12).contains(&v));
        }
    }

    #[test]
    fn test_missing_or_empty_pool_fails() {
        let cache = RefCache::new();
        let mut rng = StdRng::seed_from_u64(42);

        assert!(matches!(
            cache.sample("nope.id", &mut rng),
            Err(GeneratorError::RefPoolEmpty(key)) if key == "nope.id"
        ));

        cache.store("empty.id", Vec::new());
        assert!(matches!(
            cache.sample("empty.id", &mut rng),
            Err(GeneratorError::RefPoolEmpty(_))
        ));
    }

    #[test]
    fn test_refresh_extracts_referenced_columns() {
        let config = Config::from_yaml(
            r#"
tables:
  - name: person
    rows: 2
    columns:
      - name: name
        value: ${name}
      - name: id
        inc: 1
  - name: pet
    rows: 2
    columns:
      - name: owner
        ref: person.id
"#,
        )
        .unwrap();
        let person = config.get_table("person").unwrap();

        let cache = RefCache::new();
        cache.refresh(
            person,
            &[
                vec![Value::from("a"), Value::Int(1)],
                vec![Value::from("b"), Value::Int(2)],
            ],
        );

        assert!(cache.pool("person.name").is_none());
        assert_eq!(
            cache.pool("person.id").unwrap().as_slice(),
            &[Value::Int(1), Value::Int(2)]
        );
    }
}
