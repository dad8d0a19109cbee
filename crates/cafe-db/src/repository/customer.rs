//! # Customer Repository
//!
//! Customer lookup and loyalty balance updates.

use sqlx::SqliteConnection;
use tracing::debug;

use cafe_core::Customer;

use crate::error::{DbError, DbResult};

/// Repository for customers.
pub struct CustomerRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CustomerRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        CustomerRepository { conn }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, phone, full_name, loyalty_points FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(customer)
    }

    /// Inserts a customer.
    pub async fn insert(&mut self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, phone, full_name, loyalty_points) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&customer.id)
        .bind(&customer.phone)
        .bind(&customer.full_name)
        .bind(customer.loyalty_points)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Adds points to a customer's balance (delta update).
    ///
    /// Returns the new balance.
    pub async fn add_loyalty_points(&mut self, id: &str, points: i64) -> DbResult<i64> {
        debug!(id = %id, points = points, "Adding loyalty points");

        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE customers
            SET loyalty_points = loyalty_points + ?1
            WHERE id = ?2
            RETURNING loyalty_points
            "#,
        )
        .bind(points)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        balance.ok_or_else(|| DbError::not_found("Customer", id))
    }
}
