//! Multi-row INSERT statement composition.

use crate::error::StatementError;
use clap::ValueEnum;
use dgs_core::Value;
use std::fmt::Write as _;

/// Most bind parameters a single statement may carry.
pub const MAX_PARAMETERS: usize = 65535;

/// Most rows one statement can carry for a table `columns` wide.
pub fn max_rows_per_statement(columns: usize) -> u64 {
    (MAX_PARAMETERS / columns.max(1)) as u64
}

/// How rows are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InsertMode {
    /// Plain INSERT
    #[default]
    Insert,
    /// INSERT that skips conflicting rows
    Conflict,
    /// UPSERT (CockroachDB)
    Upsert,
}

/// A parameterized statement and its arguments in placeholder order.
#[derive(Debug)]
pub struct Statement<'a> {
    pub sql: String,
    pub args: Vec<&'a Value>,
}

/// Build one multi-row statement for `rows`.
///
/// Placeholders are numbered from `$1` row by row; `args` is the row-major
/// flattening of `rows`.
pub fn build_insert<'a>(
    table: &str,
    columns: &[&str],
    rows: &'a [Vec<Value>],
    mode: InsertMode,
) -> Result<Statement<'a>, StatementError> {
    if columns.is_empty() {
        return Err(StatementError::NoColumns(table.to_string()));
    }
    if rows.is_empty() {
        return Err(StatementError::EmptyBatch(table.to_string()));
    }

    let count = columns.len() * rows.len();
    if count > MAX_PARAMETERS {
        return Err(StatementError::TooManyParameters {
            count,
            max: MAX_PARAMETERS,
        });
    }

    let verb = match mode {
        InsertMode::Insert | InsertMode::Conflict => "INSERT",
        InsertMode::Upsert => "UPSERT",
    };

    let mut sql = format!("{verb} INTO {table} ({}) VALUES ", columns.join(","));
    let mut args = Vec::with_capacity(count);
    let mut param_idx = 1;

    for (i, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(StatementError::RowWidth {
                row: i,
                expected: columns.len(),
                actual: row.len(),
            });
        }
        if i > 0 {
            sql.push(',');
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push(',');
            }
            // Writing to a String cannot fail.
            let _ = write!(sql, "${param_idx}");
            param_idx += 1;
            args.push(value);
        }
        sql.push(')');
    }

    if mode == InsertMode::Conflict {
        sql.push_str(" ON CONFLICT DO NOTHING");
    }

    Ok(Statement { sql, args })
}
