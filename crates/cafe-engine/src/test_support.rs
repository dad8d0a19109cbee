//! A small cafe used by engine tests.
//!
//! ```text
//! Latte   25000   recipe: milk 0.2, beans 0.018
//! Cookie  10000   no recipe
//! milk    1.0 on hand (reorder at 0.5)
//! beans   1.0 on hand (reorder at 0.1)
//! table   T1 (EMPTY)
//! ```

use chrono::{Duration, Utc};
use std::path::PathBuf;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cafe_core::{
    CafeTable, Customer, Ingredient, Money, Product, RecipeItem, Staff, StaffContext,
    TableStatus, Voucher, VoucherType,
};
use cafe_db::repository::generate_id;
use cafe_db::{
    CatalogRepository, CustomerRepository, Database, DbConfig, IngredientRepository,
    StaffRepository, TableRepository, VoucherRepository,
};

use crate::config::EngineConfig;
use crate::OrderService;

pub(crate) struct Cafe {
    pub service: OrderService,
    pub staff: StaffContext,
    pub latte: Product,
    pub cookie: Product,
    pub milk: Ingredient,
    pub beans: Ingredient,
    pub table: CafeTable,
    pub customer: Customer,
}

pub(crate) async fn cafe() -> Cafe {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    cafe_on(db).await
}

/// A cafe on a temporary database file, for tests that need more than one
/// connection. Remove it with [`remove_file_db`].
pub(crate) async fn file_cafe(label: &str) -> (Cafe, PathBuf) {
    let path = std::env::temp_dir().join(format!("cafe-{}-{}.db", label, uuid::Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    (cafe_on(db).await, path)
}

pub(crate) async fn remove_file_db(cafe: Cafe, path: PathBuf) {
    cafe.service.database().close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

pub(crate) async fn cafe_on(db: Database) -> Cafe {
    let mut conn = db.acquire().await.unwrap();
    let now = Utc::now();

    let staff = Staff {
        id: generate_id(),
        username: "barista".to_string(),
        full_name: "Anna Barista".to_string(),
    };
    StaffRepository::new(&mut conn).insert(&staff).await.unwrap();

    let milk = ingredient("Milk", "l", dec!(1.0), dec!(0.5));
    let beans = ingredient("Beans", "kg", dec!(1.0), dec!(0.1));
    let mut ingredients = IngredientRepository::new(&mut conn);
    ingredients.insert(&milk).await.unwrap();
    ingredients.insert(&beans).await.unwrap();

    let latte = product("Latte", 25_000, now);
    let cookie = product("Cookie", 10_000, now);
    let mut catalog = CatalogRepository::new(&mut conn);
    catalog.insert_product(&latte).await.unwrap();
    catalog.insert_product(&cookie).await.unwrap();
    catalog
        .set_recipe(
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

    let table = CafeTable {
        id: generate_id(),
        name: "T1".to_string(),
        status: TableStatus::Empty,
    };
    TableRepository::new(&mut conn).insert(&table).await.unwrap();

    let customer = Customer {
        id: generate_id(),
        phone: "0900000001".to_string(),
        full_name: "Regular".to_string(),
        loyalty_points: 0,
    };
    CustomerRepository::new(&mut conn)
        .insert(&customer)
        .await
        .unwrap();

    drop(conn);

    Cafe {
        service: OrderService::new(db, EngineConfig::default()),
        staff: StaffContext::from(&staff),
        latte,
        cookie,
        milk,
        beans,
        table,
        customer,
    }
}

fn ingredient(name: &str, unit: &str, on_hand: Decimal, reorder: Decimal) -> Ingredient {
    Ingredient {
        id: generate_id(),
        name: name.to_string(),
        unit: unit.to_string(),
        quantity_on_hand: on_hand,
        reorder_level: reorder,
        version: 0,
        updated_at: Utc::now(),
    }
}

fn product(name: &str, price: i64, now: chrono::DateTime<Utc>) -> Product {
    Product {
        id: generate_id(),
        name: name.to_string(),
        price: Money::from_major(price),
        is_available: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn fixed_voucher(code: &str, value: i64, minimum: Option<i64>) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: generate_id(),
        code: code.to_string(),
        description: None,
        voucher_type: VoucherType::FixedAmount,
        discount_value: Decimal::from(value),
        minimum_order_amount: minimum.map(Money::from_major),
        maximum_discount_amount: None,
        valid_from: now - Duration::days(1),
        valid_to: now + Duration::days(30),
        usage_limit: 100,
        times_used: 0,
        is_active: true,
    }
}

pub(crate) fn percentage_voucher(code: &str, percent: i64, cap: Option<i64>) -> Voucher {
    Voucher {
        voucher_type: VoucherType::Percentage,
        maximum_discount_amount: cap.map(Money::from_major),
        ..fixed_voucher(code, percent, None)
    }
}

impl Cafe {
    pub async fn add_voucher(&self, voucher: &Voucher) {
        let mut conn = self.service.database().acquire().await.unwrap();
        VoucherRepository::new(&mut conn).insert(voucher).await.unwrap();
    }

    pub async fn voucher(&self, code: &str) -> Voucher {
        let mut conn = self.service.database().acquire().await.unwrap();
        VoucherRepository::new(&mut conn)
            .get_by_code(code)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn stock(&self, ingredient_id: &str) -> Decimal {
        let mut conn = self.service.database().acquire().await.unwrap();
        IngredientRepository::new(&mut conn)
            .get_by_id(ingredient_id)
            .await
            .unwrap()
            .unwrap()
            .quantity_on_hand
    }

    pub async fn table_status(&self, table_id: &str) -> TableStatus {
        let mut conn = self.service.database().acquire().await.unwrap();
        TableRepository::new(&mut conn)
            .get_by_id(table_id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    pub async fn loyalty_points(&self) -> i64 {
        let mut conn = self.service.database().acquire().await.unwrap();
        CustomerRepository::new(&mut conn)
            .get_by_id(&self.customer.id)
            .await
            .unwrap()
            .unwrap()
            .loyalty_points
    }

    pub async fn set_table_status(&self, status: TableStatus) {
        let mut conn = self.service.database().acquire().await.unwrap();
        TableRepository::new(&mut conn)
            .set_status(&self.table.id, status)
            .await
            .unwrap();
    }
}
