//! Fixture builders shared by repository tests.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use cafe_core::{
    CafeTable, Customer, Ingredient, Money, Product, Staff, TableStatus, Voucher, VoucherType,
};

use super::generate_id;

pub(crate) fn product(name: &str, price: i64) -> Product {
    let now = Utc::now();
    Product {
        id: generate_id(),
        name: name.to_string(),
        price: Money::from_major(price),
        is_available: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn ingredient(name: &str, quantity: Decimal) -> Ingredient {
    Ingredient {
        id: generate_id(),
        name: name.to_string(),
        unit: "kg".to_string(),
        quantity_on_hand: quantity,
        reorder_level: Decimal::ONE,
        version: 0,
        updated_at: Utc::now(),
    }
}

pub(crate) fn voucher(code: &str, value: i64) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: generate_id(),
        code: code.to_string(),
        description: Some("test voucher".to_string()),
        voucher_type: VoucherType::FixedAmount,
        discount_value: Decimal::from(value),
        minimum_order_amount: None,
        maximum_discount_amount: None,
        valid_from: now - Duration::days(1),
        valid_to: now + Duration::days(30),
        usage_limit: 5,
        times_used: 0,
        is_active: true,
    }
}

pub(crate) fn table(name: &str) -> CafeTable {
    CafeTable {
        id: generate_id(),
        name: name.to_string(),
        status: TableStatus::Empty,
    }
}

pub(crate) fn customer(phone: &str) -> Customer {
    Customer {
        id: generate_id(),
        phone: phone.to_string(),
        full_name: "Test Customer".to_string(),
        loyalty_points: 0,
    }
}

pub(crate) fn staff(username: &str) -> Staff {
    Staff {
        id: generate_id(),
        username: username.to_string(),
        full_name: "Test Staff".to_string(),
    }
}
