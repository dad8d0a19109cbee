//! # Inventory Planning
//!
//! Pure stock arithmetic. Given the stock rows a transaction just read,
//! these functions decide the new quantities or refuse. The database layer
//! writes the resulting [`StockChange`]s with a version guard.
//!
//! ```text
//! read rows ──► plan_consumption ──► Vec<StockChange> ──► versioned UPDATEs
//!                     │
//!                     └── InsufficientStock (nothing written)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{CoreError, CoreResult};
use crate::types::Ingredient;
use crate::validation::{validate_receipt_quantity, validate_stock_level};

/// A single planned stock write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,

    /// Version observed when the row was read.
    pub expected_version: i64,
}

impl StockChange {
    fn from_ingredient(ingredient: &Ingredient, new_quantity: Decimal) -> Self {
        StockChange {
            ingredient_id: ingredient.id.clone(),
            ingredient_name: ingredient.name.clone(),
            previous_quantity: ingredient.quantity_on_hand,
            new_quantity,
            expected_version: ingredient.version,
        }
    }

    /// Signed change (negative for consumption).
    pub fn delta(&self) -> Decimal {
        self.new_quantity - self.previous_quantity
    }
}

fn index(stock: &[Ingredient]) -> HashMap<&str, &Ingredient> {
    stock.iter().map(|i| (i.id.as_str(), i)).collect()
}

/// Plans the deduction of `requirements` from `stock`.
///
/// Fails on the first shortfall (in ingredient id order) without planning
/// any write. An ingredient missing from `stock` is `NotFound`.
pub fn plan_consumption(
    stock: &[Ingredient],
    requirements: &BTreeMap<String, Decimal>,
) -> CoreResult<Vec<StockChange>> {
    let by_id = index(stock);
    let mut changes = Vec::with_capacity(requirements.len());

    for (ingredient_id, required) in requirements {
        validate_stock_level(*required)?;

        let ingredient = by_id
            .get(ingredient_id.as_str())
            .ok_or_else(|| CoreError::not_found("Ingredient", ingredient_id.as_str()))?;

        if ingredient.quantity_on_hand < *required {
            return Err(CoreError::InsufficientStock {
                ingredient_id: ingredient.id.clone(),
                ingredient: ingredient.name.clone(),
                required: *required,
                available: ingredient.quantity_on_hand,
            });
        }

        changes.push(StockChange::from_ingredient(
            ingredient,
            ingredient.quantity_on_hand - *required,
        ));
    }

    Ok(changes)
}

/// Plans adding received goods to stock. Quantities must be positive.
pub fn plan_receipt(
    stock: &[Ingredient],
    received: &BTreeMap<String, Decimal>,
) -> CoreResult<Vec<StockChange>> {
    let by_id = index(stock);
    let mut changes = Vec::with_capacity(received.len());

    for (ingredient_id, quantity) in received {
        validate_receipt_quantity(*quantity)?;

        let ingredient = by_id
            .get(ingredient_id.as_str())
            .ok_or_else(|| CoreError::not_found("Ingredient", ingredient_id.as_str()))?;

        changes.push(StockChange::from_ingredient(
            ingredient,
            ingredient.quantity_on_hand + *quantity,
        ));
    }

    Ok(changes)
}

/// Plans a stock-take correction to an absolute quantity.
pub fn plan_adjustment(ingredient: &Ingredient, new_quantity: Decimal) -> CoreResult<StockChange> {
    validate_stock_level(new_quantity)?;
    Ok(StockChange::from_ingredient(ingredient, new_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn ingredient(id: &str, qty: Decimal) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            name: id.to_uppercase(),
            unit: "kg".to_string(),
            quantity_on_hand: qty,
            reorder_level: dec!(1),
            version: 3,
            updated_at: Utc::now(),
        }
    }

    fn needs(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn consumption_plans_every_ingredient() {
        let stock = vec![ingredient("beans", dec!(5)), ingredient("milk", dec!(2))];

        let changes =
            plan_consumption(&stock, &needs(&[("beans", dec!(0.5)), ("milk", dec!(2))])).unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_quantity, dec!(4.5));
        assert_eq!(changes[0].expected_version, 3);
        assert_eq!(changes[1].new_quantity, dec!(0));
        assert_eq!(changes[1].delta(), dec!(-2));
    }

    #[test]
    fn consumption_reports_first_shortfall() {
        let stock = vec![ingredient("beans", dec!(0.1)), ingredient("milk", dec!(0.1))];

        let err =
            plan_consumption(&stock, &needs(&[("milk", dec!(1)), ("beans", dec!(1))])).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                ingredient_id,
                required,
                available,
                ..
            } => {
                assert_eq!(ingredient_id, "beans");
                assert_eq!(required, dec!(1));
                assert_eq!(available, dec!(0.1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn consumption_of_unknown_ingredient_is_not_found() {
        let err = plan_consumption(&[], &needs(&[("ghost", dec!(1))])).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn receipt_adds_and_rejects_non_positive() {
        let stock = vec![ingredient("milk", dec!(1.5))];

        let changes = plan_receipt(&stock, &needs(&[("milk", dec!(10))])).unwrap();
        assert_eq!(changes[0].new_quantity, dec!(11.5));

        assert!(plan_receipt(&stock, &needs(&[("milk", dec!(0))])).is_err());
    }

    #[test]
    fn adjustment_rejects_negative() {
        let milk = ingredient("milk", dec!(4));

        let change = plan_adjustment(&milk, dec!(3.25)).unwrap();
        assert_eq!(change.previous_quantity, dec!(4));
        assert_eq!(change.new_quantity, dec!(3.25));

        assert!(plan_adjustment(&milk, dec!(-1)).is_err());
    }
}
