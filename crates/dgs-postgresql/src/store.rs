//! Relational store seam and its PostgreSQL implementation.
//!
//! The scheduler only talks to [`Store`] and [`Session`], so tests can run
//! it against an in-memory store. [`PostgresStore`] opens one
//! `tokio-postgres` connection per session and sends every parameter in text
//! format, which lets generated values bind to any column type.

use crate::error::PopulateError;
use async_trait::async_trait;
use bytes::BytesMut;
use dgs_core::Value;
use postgres_types::{to_sql_checked, Format, IsNull, ToSql, Type};
use std::error::Error;
use std::time::Duration;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

/// Source of sessions. One session is held per worker.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new session.
    async fn acquire(&self) -> Result<Box<dyn Session>, PopulateError>;
}

/// A single connection.
#[async_trait]
pub trait Session: Send {
    /// Run a query and return every row as values.
    async fn query(
        &mut self,
        statement: &str,
        args: &[&Value],
    ) -> Result<Vec<Vec<Value>>, PopulateError>;

    /// Run a statement under `timeout` and return the affected row count.
    async fn exec(
        &mut self,
        statement: &str,
        args: &[&Value],
        timeout: Duration,
    ) -> Result<u64, PopulateError>;
}

/// Bind parameter sent in PostgreSQL text format.
#[derive(Debug)]
pub struct TextParam<'a>(pub &'a Value);

impl ToSql for TextParam<'_> {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if self.0.is_null() {
            return Ok(IsNull::Yes);
        }
        out.extend_from_slice(self.0.to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

/// PostgreSQL (or CockroachDB) store.
pub struct PostgresStore {
    connection_string: String,
}

impl PostgresStore {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    /// Open a raw client, spawning its connection task.
    pub async fn connect(&self) -> Result<Client, PopulateError> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(client)
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn acquire(&self) -> Result<Box<dyn Session>, PopulateError> {
        let client = self.connect().await?;
        debug!("Opened PostgreSQL session");
        Ok(Box::new(PostgresSession { client }))
    }
}

/// Session over one `tokio-postgres` client.
pub struct PostgresSession {
    client: Client,
}

fn text_params<'a>(args: &'a [&'a Value]) -> Vec<TextParam<'a>> {
    args.iter().map(|v| TextParam(v)).collect()
}

#[async_trait]
impl Session for PostgresSession {
    async fn query(
        &mut self,
        statement: &str,
        args: &[&Value],
    ) -> Result<Vec<Vec<Value>>, PopulateError> {
        let params = text_params(args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = self.client.query(statement, &param_refs).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(row.len());
            for i in 0..row.len() {
                let text: Option<String> = row.try_get(i)?;
                values.push(text.map(Value::String).unwrap_or(Value::Null));
            }
            result.push(values);
        }
        Ok(result)
    }

    async fn exec(
        &mut self,
        statement: &str,
        args: &[&Value],
        timeout: Duration,
    ) -> Result<u64, PopulateError> {
        let params = text_params(args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let affected = tokio::time::timeout(timeout, self.client.execute(statement, &param_refs))
            .await
            .map_err(|_| PopulateError::Timeout(timeout))??;

        Ok(affected)
    }
}
