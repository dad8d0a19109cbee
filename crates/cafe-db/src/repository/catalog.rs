//! # Catalog Repository
//!
//! Products and their recipes. Read by the order flow; the write helpers
//! exist for seeding and tests and carry no business rules.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::debug;

use cafe_core::{Product, RecipeItem};

use super::{decimal_text, parse_decimal, parse_money};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: String,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        Ok(Product {
            price: parse_money("products.price", &row.price)?,
            id: row.id,
            name: row.name,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct RecipeRow {
    product_id: String,
    ingredient_id: String,
    quantity_needed: String,
}

/// Repository for products and recipes.
pub struct CatalogRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CatalogRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        CatalogRepository { conn }
    }

    /// Gets a product by ID.
    pub async fn get_product(&mut self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, is_available, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets several products at once, keyed by ID. Missing IDs are absent
    /// from the map.
    pub async fn get_products(&mut self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, price, is_available, created_at, updated_at FROM products WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&mut *self.conn).await?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map(|p| (p.id.clone(), p)))
            .collect()
    }

    /// Loads the recipes of the given products.
    ///
    /// Products without a recipe are absent from the map.
    pub async fn recipes_for(
        &mut self,
        product_ids: &[String],
    ) -> DbResult<HashMap<String, Vec<RecipeItem>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!(products = product_ids.len(), "Loading recipes");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT product_id, ingredient_id, quantity_needed FROM product_ingredients WHERE product_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in product_ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY product_id, position, ingredient_id");

        let rows: Vec<RecipeRow> = qb.build_query_as().fetch_all(&mut *self.conn).await?;

        let mut recipes: HashMap<String, Vec<RecipeItem>> = HashMap::new();
        for row in rows {
            let quantity_needed =
                parse_decimal("product_ingredients.quantity_needed", &row.quantity_needed)?;
            recipes.entry(row.product_id).or_default().push(RecipeItem {
                ingredient_id: row.ingredient_id,
                quantity_needed,
            });
        }

        Ok(recipes)
    }

    /// Inserts a product.
    pub async fn insert_product(&mut self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, is_available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(decimal_text(product.price.amount()))
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Switches a product on or off the menu.
    pub async fn set_available(&mut self, id: &str, available: bool) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_available = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(available)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Replaces a product's recipe.
    pub async fn set_recipe(&mut self, product_id: &str, items: &[RecipeItem]) -> DbResult<()> {
        debug!(product_id = %product_id, items = items.len(), "Setting recipe");

        sqlx::query("DELETE FROM product_ingredients WHERE product_id = ?1")
            .bind(product_id)
            .execute(&mut *self.conn)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_ingredients (product_id, ingredient_id, quantity_needed, position)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(product_id)
            .bind(&item.ingredient_id)
            .bind(decimal_text(item.quantity_needed))
            .bind(position as i64)
            .execute(&mut *self.conn)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ingredient::IngredientRepository;
    use crate::repository::test_support::{ingredient, product};
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn product_round_trip_keeps_decimal_price() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = CatalogRepository::new(&mut conn);

        let mut latte = product("Latte", 25_000);
        latte.price = cafe_core::Money::new(dec!(25000.50));
        repo.insert_product(&latte).await.unwrap();

        let loaded = repo.get_product(&latte.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Latte");
        assert_eq!(loaded.price, latte.price);
        assert!(loaded.is_available);

        assert!(repo.get_product("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_products_skips_unknown_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = CatalogRepository::new(&mut conn);

        let latte = product("Latte", 25_000);
        repo.insert_product(&latte).await.unwrap();

        let found = repo
            .get_products(&[latte.id.clone(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&latte.id));
    }

    #[tokio::test]
    async fn recipes_keep_position_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        let milk = ingredient("Milk", dec!(10));
        let beans = ingredient("Beans", dec!(5));
        {
            let mut ingredients = IngredientRepository::new(&mut conn);
            ingredients.insert(&milk).await.unwrap();
            ingredients.insert(&beans).await.unwrap();
        }

        let mut repo = CatalogRepository::new(&mut conn);
        let latte = product("Latte", 25_000);
        let water = product("Water", 10_000);
        repo.insert_product(&latte).await.unwrap();
        repo.insert_product(&water).await.unwrap();
        repo.set_recipe(
            &latte.id,
            &[
                RecipeItem {
                    ingredient_id: milk.id.clone(),
                    quantity_needed: dec!(0.2),
                },
                RecipeItem {
                    ingredient_id: beans.id.clone(),
                    quantity_needed: dec!(0.018),
                },
            ],
        )
        .await
        .unwrap();

        let recipes = repo
            .recipes_for(&[latte.id.clone(), water.id.clone()])
            .await
            .unwrap();

        assert_eq!(recipes.len(), 1);
        let items = &recipes[&latte.id];
        assert_eq!(items[0].ingredient_id, milk.id);
        assert_eq!(items[0].quantity_needed, dec!(0.2));
        assert_eq!(items[1].quantity_needed, dec!(0.018));
    }

    #[tokio::test]
    async fn set_available_on_missing_product_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = CatalogRepository::new(&mut conn);

        let err = repo.set_available("ghost", false).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
