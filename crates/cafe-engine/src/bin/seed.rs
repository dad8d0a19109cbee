//! # Seed Data Generator
//!
//! Populates a cafe database with a small menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by CAFE_DB_PATH (default ./cafe.db)
//! cargo run -p cafe-engine --bin seed
//!
//! # Specify database path
//! cargo run -p cafe-engine --bin seed -- --db ./data/cafe.db
//! ```
//!
//! ## Generated Data
//! - One staff account (`barista`)
//! - Ingredients with stock and reorder levels
//! - Drinks and pastries, drinks with recipes
//! - Tables T1..T8, all EMPTY
//! - Two customers and two vouchers (`WELCOME10`, `FLAT20K`)

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;

use cafe_core::{
    CafeTable, Customer, Ingredient, Money, Product, RecipeItem, Staff, TableStatus, Voucher,
    VoucherType,
};
use cafe_db::repository::generate_id;
use cafe_db::{
    CatalogRepository, CustomerRepository, Database, DbConfig, IngredientRepository,
    StaffRepository, TableRepository, VoucherRepository,
};
use cafe_engine::{init_tracing, EngineConfig};

/// (name, unit, on hand, reorder level)
const INGREDIENTS: &[(&str, &str, &str, &str)] = &[
    ("Coffee Beans", "kg", "5", "1"),
    ("Fresh Milk", "l", "20", "5"),
    ("Oat Milk", "l", "6", "2"),
    ("Sugar Syrup", "l", "3", "0.5"),
    ("Matcha Powder", "kg", "1", "0.2"),
    ("Cocoa Powder", "kg", "1.5", "0.3"),
];

/// (name, price, recipe as (ingredient, quantity))
const MENU: &[(&str, i64, &[(&str, &str)])] = &[
    ("Espresso", 25_000, &[("Coffee Beans", "0.018")]),
    (
        "Latte",
        35_000,
        &[("Coffee Beans", "0.018"), ("Fresh Milk", "0.2")],
    ),
    (
        "Oat Latte",
        40_000,
        &[("Coffee Beans", "0.018"), ("Oat Milk", "0.2")],
    ),
    (
        "Iced Matcha",
        45_000,
        &[("Matcha Powder", "0.005"), ("Fresh Milk", "0.15"), ("Sugar Syrup", "0.02")],
    ),
    (
        "Hot Chocolate",
        38_000,
        &[("Cocoa Powder", "0.03"), ("Fresh Milk", "0.25")],
    ),
    ("Croissant", 28_000, &[]),
    ("Banana Bread", 30_000, &[]),
];

const TABLE_COUNT: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path = EngineConfig::from_env()?.database_path;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Cafe POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $CAFE_DB_PATH or ./cafe.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Cafe POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut tx = db.begin().await?;

    let existing = TableRepository::new(&mut tx).list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} tables", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    StaffRepository::new(&mut tx)
        .insert(&Staff {
            id: generate_id(),
            username: "barista".to_string(),
            full_name: "Default Barista".to_string(),
        })
        .await?;
    println!("✓ Staff: barista");

    let mut ingredient_ids = HashMap::new();
    let mut ingredients = IngredientRepository::new(&mut tx);
    for (name, unit, on_hand, reorder) in INGREDIENTS {
        let ingredient = Ingredient {
            id: generate_id(),
            name: name.to_string(),
            unit: unit.to_string(),
            quantity_on_hand: on_hand.parse()?,
            reorder_level: reorder.parse()?,
            version: 0,
            updated_at: now,
        };
        ingredients.insert(&ingredient).await?;
        ingredient_ids.insert(*name, ingredient.id);
    }
    println!("✓ Ingredients: {}", INGREDIENTS.len());

    let mut catalog = CatalogRepository::new(&mut tx);
    for (name, price, recipe) in MENU {
        let product = Product {
            id: generate_id(),
            name: name.to_string(),
            price: Money::from_major(*price),
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        catalog.insert_product(&product).await?;

        let mut items = Vec::with_capacity(recipe.len());
        for (ingredient, quantity) in recipe.iter() {
            let ingredient_id = ingredient_ids
                .get(ingredient)
                .ok_or_else(|| format!("Recipe for {} names unknown ingredient {}", name, ingredient))?;
            items.push(RecipeItem {
                ingredient_id: ingredient_id.clone(),
                quantity_needed: quantity.parse::<Decimal>()?,
            });
        }
        if !items.is_empty() {
            catalog.set_recipe(&product.id, &items).await?;
        }
    }
    println!("✓ Products: {}", MENU.len());

    let mut tables = TableRepository::new(&mut tx);
    for n in 1..=TABLE_COUNT {
        tables
            .insert(&CafeTable {
                id: generate_id(),
                name: format!("T{}", n),
                status: TableStatus::Empty,
            })
            .await?;
    }
    println!("✓ Tables: {}", TABLE_COUNT);

    let mut customers = CustomerRepository::new(&mut tx);
    for (phone, full_name) in [("0900000001", "Linh Tran"), ("0900000002", "Minh Pham")] {
        customers
            .insert(&Customer {
                id: generate_id(),
                phone: phone.to_string(),
                full_name: full_name.to_string(),
                loyalty_points: 0,
            })
            .await?;
    }
    println!("✓ Customers: 2");

    let mut vouchers = VoucherRepository::new(&mut tx);
    vouchers
        .insert(&Voucher {
            id: generate_id(),
            code: "WELCOME10".to_string(),
            description: Some("10% off, up to 20,000".to_string()),
            voucher_type: VoucherType::Percentage,
            discount_value: Decimal::from(10),
            minimum_order_amount: None,
            maximum_discount_amount: Some(Money::from_major(20_000)),
            valid_from: now,
            valid_to: now + Duration::days(90),
            usage_limit: 500,
            times_used: 0,
            is_active: true,
        })
        .await?;
    vouchers
        .insert(&Voucher {
            id: generate_id(),
            code: "FLAT20K".to_string(),
            description: Some("20,000 off orders from 100,000".to_string()),
            voucher_type: VoucherType::FixedAmount,
            discount_value: Decimal::from(20_000),
            minimum_order_amount: Some(Money::from_major(100_000)),
            maximum_discount_amount: None,
            valid_from: now,
            valid_to: now + Duration::days(30),
            usage_limit: 100,
            times_used: 0,
            is_active: true,
        })
        .await?;
    println!("✓ Vouchers: WELCOME10, FLAT20K");

    tx.commit().await?;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
