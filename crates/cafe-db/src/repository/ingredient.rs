//! # Ingredient Repository
//!
//! Stock rows and their versioned writes.
//!
//! ## Compare-and-Set Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal A                         Terminal B                          │
//! │  read milk (qty 1.0, v7)            read milk (qty 1.0, v7)             │
//! │  plan: 1.0 − 0.4 = 0.6              plan: 1.0 − 0.8 = 0.2               │
//! │  UPDATE ... WHERE version = 7 ✓     UPDATE ... WHERE version = 7 ✗      │
//! │  → v8, qty 0.6                      → 0 rows → StaleWrite → retry       │
//! │                                        re-read (0.6, v8) → Insufficient │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use cafe_core::inventory::StockChange;
use cafe_core::Ingredient;

use super::{decimal_text, parse_decimal};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct IngredientRow {
    id: String,
    name: String,
    unit: String,
    quantity_on_hand: String,
    reorder_level: String,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = DbError;

    fn try_from(row: IngredientRow) -> DbResult<Self> {
        Ok(Ingredient {
            quantity_on_hand: parse_decimal("ingredients.quantity_on_hand", &row.quantity_on_hand)?,
            reorder_level: parse_decimal("ingredients.reorder_level", &row.reorder_level)?,
            id: row.id,
            name: row.name,
            unit: row.unit,
            version: row.version,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_INGREDIENT: &str =
    "SELECT id, name, unit, quantity_on_hand, reorder_level, version, updated_at FROM ingredients";

/// Repository for ingredient stock.
pub struct IngredientRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> IngredientRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        IngredientRepository { conn }
    }

    /// Gets an ingredient by ID.
    pub async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Ingredient>> {
        let row: Option<IngredientRow> = sqlx::query_as(&format!("{SELECT_INGREDIENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Ingredient::try_from).transpose()
    }

    /// Reads the current stock of several ingredients, ordered by ID.
    ///
    /// Unknown IDs are simply absent from the result.
    pub async fn get_many<S: AsRef<str>>(&mut self, ids: &[S]) -> DbResult<Vec<Ingredient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_INGREDIENT);
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.as_ref());
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<IngredientRow> = qb.build_query_as().fetch_all(&mut *self.conn).await?;
        rows.into_iter().map(Ingredient::try_from).collect()
    }

    /// Lists every ingredient, by name.
    pub async fn list_all(&mut self) -> DbResult<Vec<Ingredient>> {
        let rows: Vec<IngredientRow> = sqlx::query_as(&format!("{SELECT_INGREDIENT} ORDER BY name"))
            .fetch_all(&mut *self.conn)
            .await?;

        rows.into_iter().map(Ingredient::try_from).collect()
    }

    /// Inserts an ingredient.
    pub async fn insert(&mut self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(id = %ingredient.id, name = %ingredient.name, "Inserting ingredient");

        sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, unit, quantity_on_hand, reorder_level, version, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.unit)
        .bind(decimal_text(ingredient.quantity_on_hand))
        .bind(decimal_text(ingredient.reorder_level))
        .bind(ingredient.version)
        .bind(ingredient.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Writes planned stock changes, each guarded by the version it was
    /// planned against.
    ///
    /// ## Returns
    /// * `Ok(())` - every row written, versions bumped
    /// * `Err(DbError::StaleWrite)` - a row changed since it was read; the
    ///   caller must roll back and start over
    pub async fn apply_changes(&mut self, changes: &[StockChange]) -> DbResult<()> {
        let now = Utc::now();

        for change in changes {
            debug!(
                ingredient_id = %change.ingredient_id,
                from = %change.previous_quantity,
                to = %change.new_quantity,
                version = change.expected_version,
                "Writing stock"
            );

            let result = sqlx::query(
                r#"
                UPDATE ingredients
                SET quantity_on_hand = ?1,
                    version = version + 1,
                    updated_at = ?2
                WHERE id = ?3 AND version = ?4
                "#,
            )
            .bind(decimal_text(change.new_quantity))
            .bind(now)
            .bind(&change.ingredient_id)
            .bind(change.expected_version)
            .execute(&mut *self.conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::stale("Ingredient", &change.ingredient_id));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::ingredient;
    use crate::{Database, DbConfig};
    use cafe_core::inventory::plan_consumption;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn apply_changes_bumps_version() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = IngredientRepository::new(&mut conn);

        let milk = ingredient("Milk", dec!(2.5));
        repo.insert(&milk).await.unwrap();

        let stock = repo.get_many(&[milk.id.clone()]).await.unwrap();
        let needs: BTreeMap<String, _> = [(milk.id.clone(), dec!(0.4))].into_iter().collect();
        let changes = plan_consumption(&stock, &needs).unwrap();
        repo.apply_changes(&changes).await.unwrap();

        let reloaded = repo.get_by_id(&milk.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity_on_hand, dec!(2.1));
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = IngredientRepository::new(&mut conn);

        let milk = ingredient("Milk", dec!(1));
        repo.insert(&milk).await.unwrap();
        let stock = repo.get_many(&[milk.id.as_str()]).await.unwrap();
        let needs: BTreeMap<String, _> = [(milk.id.clone(), dec!(0.4))].into_iter().collect();
        let changes = plan_consumption(&stock, &needs).unwrap();

        // Another writer gets in first
        sqlx::query("UPDATE ingredients SET version = version + 1 WHERE id = ?1")
            .bind(&milk.id)
            .execute(&mut *repo.conn)
            .await
            .unwrap();

        let err = repo.apply_changes(&changes).await.unwrap_err();
        assert!(matches!(err, DbError::StaleWrite { .. }));
        assert!(err.is_retryable());

        let unchanged = repo.get_by_id(&milk.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity_on_hand, dec!(1));
    }

    #[tokio::test]
    async fn get_many_orders_by_id_and_skips_unknown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = IngredientRepository::new(&mut conn);

        let a = ingredient("Beans", dec!(1));
        let b = ingredient("Sugar", dec!(1));
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let rows = repo
            .get_many(&[b.id.as_str(), a.id.as_str(), "ghost"])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].id < rows[1].id);
    }
}
