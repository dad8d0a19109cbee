//! # Staff Repository

use sqlx::SqliteConnection;
use tracing::debug;

use cafe_core::Staff;

use crate::error::DbResult;

/// Repository for staff members.
pub struct StaffRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> StaffRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        StaffRepository { conn }
    }

    /// Gets a staff member by ID.
    pub async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT id, username, full_name FROM staff WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(staff)
    }

    /// Inserts a staff member.
    pub async fn insert(&mut self, staff: &Staff) -> DbResult<()> {
        debug!(id = %staff.id, username = %staff.username, "Inserting staff");

        sqlx::query("INSERT INTO staff (id, username, full_name) VALUES (?1, ?2, ?3)")
            .bind(&staff.id)
            .bind(&staff.username)
            .bind(&staff.full_name)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::staff;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = StaffRepository::new(&mut conn);

        let s = staff("barista");
        repo.insert(&s).await.unwrap();

        let loaded = repo.get_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(loaded.username, "barista");
        assert!(repo.get_by_id("ghost").await.unwrap().is_none());
    }
}
