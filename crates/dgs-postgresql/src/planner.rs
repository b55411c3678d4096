//! Per-table iteration planning.

/// How one worker writes its share of a table: `times` batches of up to
/// `batch` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub batch: u64,
    pub times: u64,
}

impl Plan {
    /// Plan for a table with no rows.
    pub const SKIP: Plan = Plan { batch: 0, times: 0 };

    /// Upper bound of rows all workers together may attempt.
    pub fn capacity(&self, workers: u64) -> u64 {
        self.batch.saturating_mul(self.times).saturating_mul(workers)
    }
}

/// Split `rows` over `workers` with batches of at most `batch_size`.
///
/// A plan never has a zero batch for a non-empty table. When the plan's
/// capacity exceeds `rows` the scheduler stops at `rows`; when it falls
/// short the shortfall is below one batch per worker.
pub fn plan(rows: u64, batch_size: u64, workers: u64) -> Plan {
    let batch_size = batch_size.max(1);
    let workers = workers.max(1);

    if rows == 0 {
        return Plan::SKIP;
    }

    if rows < batch_size / workers || rows <= batch_size {
        return Plan {
            batch: (rows / workers).max(1),
            times: 1,
        };
    }

    let times = rows / batch_size / workers;
    if times == 0 {
        return Plan {
            batch: batch_size,
            times: 1,
        };
    }

    Plan {
        batch: batch_size,
        times,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plans(batch: u64, workers: u64) -> Vec<(u64, u64)> {
        [1000, 2000, 4000]
            .iter()
            .map(|&rows| {
                let p = plan(rows, batch, workers);
                (p.batch, p.times)
            })
            .collect()
    }

    #[test]
    fn test_single_worker() {
        assert_eq!(plans(100, 1), vec![(100, 10), (100, 20), (100, 40)]);
    }

    #[test]
    fn test_many_workers_large_batch() {
        assert_eq!(plans(1000, 4), vec![(250, 1), (1000, 1), (1000, 1)]);
    }

    #[test]
    fn test_empty_table_is_skipped() {
        assert_eq!(plan(0, 100, 4), Plan::SKIP);
    }

    #[test]
    fn test_batch_never_zero() {
        let p = plan(3, 1000, 8);
        assert_eq!(p, Plan { batch: 1, times: 1 });
    }

    #[test]
    fn test_shortfall_below_one_batch_per_worker() {
        for rows in [1u64, 7, 99, 100, 101, 999, 1001, 5000, 12345, 100_000] {
            for batch in [1u64, 10, 100, 1000] {
                for workers in [1u64, 2, 3, 4, 8] {
                    let p = plan(rows, batch, workers);
                    let written = p.capacity(workers).min(rows);
                    assert!(
                        written + workers * p.batch > rows,
                        "rows={rows} batch={batch} workers={workers} plan={p:?}"
                    );
                }
            }
        }
    }
}
