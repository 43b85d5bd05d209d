use sqlx::{Sqlite, SqlitePool, Transaction};

/// A single durable ledger unit of work. Every write inside one operation
/// goes through the same database transaction; dropping the operation
/// without `commit` rolls everything back.
pub struct AtomicOperation {
    tx: Transaction<'static, Sqlite>,
}

impl AtomicOperation {
    pub(crate) async fn init(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub(crate) fn tx(&mut self) -> &mut Transaction<'static, Sqlite> {
        &mut self.tx
    }

    pub(crate) async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}
