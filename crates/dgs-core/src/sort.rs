//! Dependency ordering of tables.
//!
//! A `ref` column makes its table depend on the referenced table. Tables are
//! ordered with Kahn's algorithm; among tables that are ready at the same
//! time the one declared first wins, so resolving an already-resolved order
//! returns it unchanged.

use crate::config::{ConfigError, Table};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Compute the generation order as indices into `tables`.
///
/// Refs to tables outside `tables` add no edge. A self reference is a cycle.
pub fn resolve(tables: &[Table]) -> Result<Vec<usize>, ConfigError> {
    let index: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(idx, table)| (table.name.as_str(), idx))
        .collect();

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];
    let mut in_degree = vec![0usize; tables.len()];

    for (child, table) in tables.iter().enumerate() {
        for target in table.columns.iter().filter_map(|c| c.ref_target()) {
            if let Some(&parent) = index.get(target.table.as_str()) {
                dependents[parent].push(child);
                in_degree[child] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut order = Vec::with_capacity(tables.len());
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(idx);
        for &child in &dependents[idx] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    if order.len() < tables.len() {
        let unsorted = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0)
            .map(|(idx, _)| tables[idx].name.clone())
            .collect();
        return Err(ConfigError::DependencyCycle { tables: unsorted });
    }

    Ok(order)
}

/// Reorder tables so each follows every table it references.
pub fn sort_tables(tables: Vec<Table>) -> Result<Vec<Table>, ConfigError> {
    let order = resolve(&tables)?;
    let mut slots: Vec<Option<Table>> = tables.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect())
}
