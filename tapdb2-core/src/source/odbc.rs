//! ODBC connector for DB2 for i.
//!
//! Every query opens its own ODBC environment and connection on tokio's
//! blocking pool. Rows are fetched in batches into a text buffer and handed
//! to the async side through a bounded channel, so at most one batch plus the
//! channel capacity is held in memory. The connection closes when the result
//! set is exhausted, a fetch fails, or the receiving stream is dropped.

use super::{ConnectionConfig, Connector, RawRow, RowStream};
use crate::Result;
use crate::error::TapDb2Error;
use crate::security::Credentials;
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use zeroize::Zeroizing;

/// Rows buffered between the fetch thread and the consumer.
const CHANNEL_CAPACITY: usize = 256;

/// Connector running SQL through the IBM i Access ODBC driver.
pub struct OdbcConnector {
    connection_string: Zeroizing<String>,
    login_timeout_sec: u32,
    batch_size: usize,
    max_text_length: usize,
    description: String,
}

impl std::fmt::Debug for OdbcConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdbcConnector")
            .field("description", &self.description)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl OdbcConnector {
    /// Prepares a connector. No connection is opened until the first query.
    pub fn new(config: &ConnectionConfig, credentials: &Credentials) -> Self {
        let login_timeout_sec = u32::try_from(config.connect_timeout.as_secs()).unwrap_or(u32::MAX);
        Self {
            connection_string: config.odbc_connection_string(credentials),
            login_timeout_sec,
            batch_size: config.fetch_batch_size,
            max_text_length: config.max_text_length,
            description: format!("ODBC {} via {}", config, config.driver),
        }
    }
}

#[async_trait]
impl Connector for OdbcConnector {
    async fn query(&self, sql: &str) -> Result<RowStream<'static, RawRow>> {
        let (mut tx, rx) = mpsc::channel::<Result<RawRow>>(CHANNEL_CAPACITY);
        let job = FetchJob {
            connection_string: self.connection_string.clone(),
            login_timeout_sec: self.login_timeout_sec,
            batch_size: self.batch_size,
            max_text_length: self.max_text_length,
            sql: sql.to_string(),
        };

        tracing::trace!("Executing catalog query: {}", sql.trim());
        tokio::task::spawn_blocking(move || {
            if let Err(e) = job.run(&mut tx) {
                // Receiver may already be gone; nothing else to report to.
                let _ = futures::executor::block_on(tx.send(Err(e)));
            }
        });

        Ok(rx.boxed())
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Owned inputs of one blocking fetch.
struct FetchJob {
    connection_string: Zeroizing<String>,
    login_timeout_sec: u32,
    batch_size: usize,
    max_text_length: usize,
    sql: String,
}

impl FetchJob {
    fn run(self, tx: &mut mpsc::Sender<Result<RawRow>>) -> Result<()> {
        let env = Environment::new().map_err(|e| TapDb2Error::Connection {
            context: "Failed to create ODBC environment. Make sure unixODBC and the IBM i Access ODBC Driver are installed".to_string(),
            source: Box::new(e),
        })?;

        let options = ConnectionOptions {
            login_timeout_sec: Some(self.login_timeout_sec),
            ..ConnectionOptions::default()
        };
        let conn = env
            .connect_with_connection_string(&self.connection_string, options)
            .map_err(TapDb2Error::connection_failed)?;

        let Some(mut cursor) = conn
            .execute(&self.sql, ())
            .map_err(|e| TapDb2Error::collection_failed("ODBC query failed", e))?
        else {
            return Ok(());
        };

        let num_cols = usize::try_from(
            cursor
                .num_result_cols()
                .map_err(|e| TapDb2Error::collection_failed("Failed to get column count", e))?,
        )
        .unwrap_or_default();

        let mut buffers =
            TextRowSet::for_cursor(self.batch_size, &mut cursor, Some(self.max_text_length))
                .map_err(|e| TapDb2Error::collection_failed("Failed to create row buffer", e))?;
        let mut row_cursor = cursor
            .bind_buffer(&mut buffers)
            .map_err(|e| TapDb2Error::collection_failed("Failed to bind row buffer", e))?;

        while let Some(batch) = row_cursor
            .fetch()
            .map_err(|e| TapDb2Error::collection_failed("Failed to fetch rows", e))?
        {
            for row_idx in 0..batch.num_rows() {
                let row: RawRow = (0..num_cols)
                    .map(|col_idx| {
                        batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    })
                    .collect();
                if futures::executor::block_on(tx.send(Ok(row))).is_err() {
                    tracing::trace!("Row stream dropped, closing cursor early");
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}
