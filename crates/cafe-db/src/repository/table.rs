//! # Table Repository
//!
//! Dine-in tables and their occupancy status.

use sqlx::SqliteConnection;
use tracing::debug;

use cafe_core::{CafeTable, TableStatus};

use crate::error::{DbError, DbResult};

/// Repository for cafe tables.
pub struct TableRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> TableRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        TableRepository { conn }
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&mut self, id: &str) -> DbResult<Option<CafeTable>> {
        let table = sqlx::query_as::<_, CafeTable>(
            "SELECT id, name, status FROM cafe_tables WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(table)
    }

    /// Lists all tables, by name.
    pub async fn list_all(&mut self) -> DbResult<Vec<CafeTable>> {
        let tables = sqlx::query_as::<_, CafeTable>(
            "SELECT id, name, status FROM cafe_tables ORDER BY name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(tables)
    }

    /// Inserts a table.
    pub async fn insert(&mut self, table: &CafeTable) -> DbResult<()> {
        debug!(id = %table.id, name = %table.name, "Inserting table");

        sqlx::query("INSERT INTO cafe_tables (id, name, status) VALUES (?1, ?2, ?3)")
            .bind(&table.id)
            .bind(&table.name)
            .bind(table.status)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    /// Sets a table's status.
    pub async fn set_status(&mut self, id: &str, status: TableStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating table status");

        let result = sqlx::query("UPDATE cafe_tables SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        Ok(())
    }
}
