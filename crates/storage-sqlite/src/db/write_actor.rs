//! Single-writer actor.
//!
//! SQLite allows one writer at a time, so every write job is funneled through
//! one task that owns a dedicated connection. Each job runs inside an
//! immediate transaction: a batch either commits whole or not at all.

use std::any::Any;

use diesel::SqliteConnection;
use log::error;
use tallyfolio_core::errors::{DatabaseError, Error, Result};
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;

const JOB_QUEUE_SIZE: usize = 256;

type AnyBox = Box<dyn Any + Send + 'static>;
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> Result<AnyBox> + Send + 'static>;
type Envelope = (Job, oneshot::Sender<Result<AnyBox>>);

/// Cloneable handle used by repositories to submit write jobs.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WriteHandle {
    /// Runs `job` on the writer connection inside a transaction and returns
    /// its result.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let boxed: Job = Box::new(move |conn| job(conn).map(|value| Box::new(value) as AnyBox));

        self.tx
            .send((boxed, reply_tx))
            .await
            .map_err(|_| writer_gone("writer task is not running"))?;

        let value = reply_rx
            .await
            .map_err(|_| writer_gone("writer task dropped the reply"))??;

        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| writer_gone("unexpected result type from writer task"))
    }
}

fn writer_gone(message: &str) -> Error {
    DatabaseError::Internal(message.to_string()).into()
}

/// Spawns the writer task on the current Tokio runtime.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(JOB_QUEUE_SIZE);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer task could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);
            // The caller may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
