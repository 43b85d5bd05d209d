use chrono::NaiveDateTime;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::error::ClockError;

#[derive(Debug, Clone)]
pub(super) struct ParameterRepo {
    pool: SqlitePool,
}

impl ParameterRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, name: &str) -> Result<Option<String>, ClockError> {
        self.find_in_executor(&self.pool, name).await
    }

    pub async fn find_in_executor(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        name: &str,
    ) -> Result<Option<String>, ClockError> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT parameter_value FROM parameter_table WHERE parameter_name = ?",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(value)
    }

    pub async fn upsert(
        &self,
        name: &str,
        value: &str,
        user_id: &str,
        stamp: NaiveDateTime,
    ) -> Result<(), ClockError> {
        self.upsert_in_executor(&self.pool, name, value, user_id, stamp)
            .await
    }

    pub async fn upsert_in_executor(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        name: &str,
        value: &str,
        user_id: &str,
        stamp: NaiveDateTime,
    ) -> Result<(), ClockError> {
        sqlx::query(
            r#"
            INSERT INTO parameter_table (parameter_name, parameter_value, updated_by, last_updated)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (parameter_name)
            DO UPDATE SET parameter_value = excluded.parameter_value,
                          updated_by = excluded.updated_by,
                          last_updated = excluded.last_updated
            "#,
        )
        .bind(name)
        .bind(value)
        .bind(user_id)
        .bind(stamp)
        .execute(executor)
        .await?;
        Ok(())
    }
}
