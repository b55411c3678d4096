//! Concurrent table population.
//!
//! A fixed pool of workers walks the tables in dependency order. For every
//! table each worker repeats its planned number of batches: claim rows from
//! the table's remaining budget, generate them, write them in one statement,
//! then refresh the ref cache from the written batch. All workers meet at a
//! barrier after each table, so a dependent table only starts once every
//! batch of the tables it references has been written.

use crate::error::{PopulateError, StatementError};
use crate::insert::{build_insert, max_rows_per_statement, InsertMode};
use crate::planner::{plan, Plan};
use crate::store::{Session, Store};
use dgs_core::{Config, Table, Value};
use dgs_generator::{RefCache, RowGenerator};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Barrier;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Default rows per statement.
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default timeout for a single write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime options for a population run.
#[derive(Debug, Clone)]
pub struct PopulateOptions {
    pub workers: usize,
    pub batch_size: u64,
    pub mode: InsertMode,
    pub write_timeout: Duration,
    /// Seed for reproducible values; worker `i` uses `seed + i`
    pub seed: Option<u64>,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            mode: InsertMode::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            seed: None,
        }
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Planning,
    Running,
    Completed,
    Failed,
}

/// Outcome for one table.
#[derive(Debug, Clone)]
pub struct TableReport {
    pub table: String,
    pub plan: Plan,
    pub rows_written: u64,
    pub batch_count: u64,
    pub duration: Duration,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct PopulateReport {
    pub tables: Vec<TableReport>,
    pub total_duration: Duration,
}

impl PopulateReport {
    /// Rows written across all tables.
    pub fn rows_written(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written() as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Report for a table by name.
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }
}

#[derive(Debug, Default)]
struct Progress {
    claimed: u64,
    written: u64,
    batches: u64,
    started: Option<Instant>,
    finished: Option<Instant>,
}

/// State shared by every worker of a run.
struct Shared<S> {
    store: Arc<S>,
    config: Arc<Config>,
    plans: Vec<Plan>,
    options: PopulateOptions,
    refs: Arc<RefCache>,
    progress: Mutex<Vec<Progress>>,
    barrier: Barrier,
}

impl<S> Shared<S> {
    /// Reserve up to `batch` rows of table `idx`; 0 once the budget is spent.
    fn claim(&self, idx: usize, batch: u64, rows: u64) -> u64 {
        let mut progress = self.progress.lock();
        let p = &mut progress[idx];
        let n = batch.min(rows.saturating_sub(p.claimed));
        p.claimed += n;
        n
    }

    fn record_write(&self, idx: usize, rows: u64) {
        let mut progress = self.progress.lock();
        progress[idx].written += rows;
        progress[idx].batches += 1;
    }
}

/// Generates and writes every table of a config.
pub struct Populator<S: Store> {
    store: Arc<S>,
    config: Arc<Config>,
    options: PopulateOptions,
    refs: Arc<RefCache>,
    phase: Mutex<Phase>,
}

impl<S: Store + 'static> Populator<S> {
    pub fn new(store: Arc<S>, config: Arc<Config>, options: PopulateOptions) -> Self {
        Self {
            store,
            config,
            options,
            refs: Arc::new(RefCache::new()),
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: Phase) {
        debug!("Populator phase: {:?}", phase);
        *self.phase.lock() = phase;
    }

    /// Run to completion.
    pub async fn run(&self) -> Result<PopulateReport, PopulateError> {
        let result = self.run_inner().await;
        self.set_phase(if result.is_ok() {
            Phase::Completed
        } else {
            Phase::Failed
        });
        result
    }

    async fn run_inner(&self) -> Result<PopulateReport, PopulateError> {
        let start_time = Instant::now();
        let workers = self.options.workers.max(1);

        self.set_phase(Phase::Planning);
        let mut plans = Vec::with_capacity(self.config.tables().len());
        for table in self.config.tables() {
            let p = self.plan_table(table, workers)?;
            info!(
                "Planned table '{}': {} rows, {} workers x {} batches of {}",
                table.name, table.rows, workers, p.times, p.batch
            );
            plans.push(p);
        }

        self.prefetch_external_refs().await?;

        self.set_phase(Phase::Running);
        let shared = Arc::new(Shared {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            plans,
            options: self.options.clone(),
            refs: Arc::clone(&self.refs),
            progress: Mutex::new(
                (0..self.config.tables().len())
                    .map(|_| Progress::default())
                    .collect(),
            ),
            barrier: Barrier::new(workers),
        });

        let mut set = JoinSet::new();
        for id in 0..workers {
            let shared = Arc::clone(&shared);
            set.spawn(run_worker(shared, id).instrument(info_span!("worker", id)));
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    set.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    set.abort_all();
                    return Err(PopulateError::Join(e));
                }
            }
        }

        let report = {
            let progress = shared.progress.lock();
            PopulateReport {
                tables: self
                    .config
                    .tables()
                    .iter()
                    .zip(progress.iter())
                    .zip(shared.plans.iter())
                    .map(|((table, p), plan)| TableReport {
                        table: table.name.clone(),
                        plan: *plan,
                        rows_written: p.written,
                        batch_count: p.batches,
                        duration: match (p.started, p.finished) {
                            (Some(s), Some(f)) => f.saturating_duration_since(s),
                            _ => Duration::ZERO,
                        },
                    })
                    .collect(),
                total_duration: start_time.elapsed(),
            }
        };

        for t in &report.tables {
            info!(
                "Table '{}': {} rows in {} batches ({:?})",
                t.table, t.rows_written, t.batch_count, t.duration
            );
        }
        info!(
            "Population complete: {} rows in {:?} ({:.2} rows/sec)",
            report.rows_written(),
            report.total_duration,
            report.rows_per_second()
        );

        Ok(report)
    }

    /// Plan one table with its batch capped at the statement parameter limit.
    fn plan_table(&self, table: &Table, workers: usize) -> Result<Plan, PopulateError> {
        if table.rows > 0 && table.columns.is_empty() {
            return Err(StatementError::NoColumns(table.name.clone()).into());
        }

        let limit = max_rows_per_statement(table.columns.len());
        let batch_size = if self.options.batch_size > limit {
            warn!(
                "Table '{}' has {} columns; lowering batch from {} to {} rows",
                table.name,
                table.columns.len(),
                self.options.batch_size,
                limit
            );
            limit
        } else {
            self.options.batch_size
        };

        Ok(plan(table.rows, batch_size, workers as u64))
    }

    /// Fill pools for ref targets outside the config from the database.
    async fn prefetch_external_refs(&self) -> Result<(), PopulateError> {
        let targets = self.config.external_refs();
        if targets.is_empty() {
            return Ok(());
        }

        let mut session = self.store.acquire().await?;
        let limit = Value::Int(self.options.batch_size.max(1) as i64);

        for target in targets {
            let sql = format!(
                "SELECT {}::TEXT FROM {} ORDER BY random() LIMIT $1",
                target.column, target.table
            );
            let rows = session.query(&sql, &[&limit]).await?;
            let values: Vec<Value> = rows.into_iter().filter_map(|r| r.into_iter().next()).collect();

            if values.is_empty() {
                warn!("No existing values for external ref '{}'", target);
            } else {
                info!("Loaded {} values for external ref '{}'", values.len(), target);
            }
            self.refs.store(target.key(), values);
        }

        Ok(())
    }
}

async fn run_worker<S: Store>(shared: Arc<Shared<S>>, id: usize) -> Result<(), PopulateError> {
    let mut generator = match shared.options.seed {
        Some(seed) => RowGenerator::new(Arc::clone(&shared.refs), seed.wrapping_add(id as u64)),
        None => RowGenerator::from_os_rng(Arc::clone(&shared.refs)),
    };
    let mut session: Option<Box<dyn Session>> = None;
    let config = Arc::clone(&shared.config);

    for (idx, table) in config.tables().iter().enumerate() {
        {
            let mut progress = shared.progress.lock();
            progress[idx].started.get_or_insert_with(Instant::now);
        }

        populate_table(&shared, idx, table, &mut generator, &mut session)
            .await
            .map_err(|e| PopulateError::Worker {
                worker: id,
                table: table.name.clone(),
                source: Box::new(e),
            })?;

        if shared.barrier.wait().await.is_leader() {
            let mut progress = shared.progress.lock();
            progress[idx].finished = Some(Instant::now());
        }
    }

    debug!("Worker finished");
    Ok(())
}

async fn populate_table<S: Store>(
    shared: &Shared<S>,
    idx: usize,
    table: &Table,
    generator: &mut RowGenerator,
    session: &mut Option<Box<dyn Session>>,
) -> Result<(), PopulateError> {
    let plan = shared.plans[idx];
    let columns = table.column_names();

    for _ in 0..plan.times {
        let n = shared.claim(idx, plan.batch, table.rows);
        if n == 0 {
            break;
        }

        let rows = generator.rows(table, n as usize)?;
        let statement = build_insert(&table.name, &columns, &rows, shared.options.mode)?;

        let active = match session.take() {
            Some(s) => s,
            None => shared.store.acquire().await?,
        };
        session
            .insert(active)
            .exec(&statement.sql, &statement.args, shared.options.write_timeout)
            .await?;

        shared.refs.refresh(table, &rows);
        shared.record_write(idx, n);
        debug!("Wrote {} rows to '{}'", n, table.name);
    }

    Ok(())
}
