//! # Recipe Expansion
//!
//! Turns order lines into total ingredient requirements.
//!
//! ```text
//! 2 × Latte     (espresso 0.018 kg, milk 0.2 l)
//! 1 × Cappuccino (espresso 0.018 kg, milk 0.15 l)
//!         │
//!         ▼
//! espresso → 0.054 kg
//! milk     → 0.55 l
//! ```
//!
//! Requirements are keyed by ingredient id in a `BTreeMap`, so stock writes
//! always happen in the same order.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::order::OrderLine;
use crate::types::RecipeItem;

/// Aggregated ingredient needs for a set of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Ingredient id → total quantity needed.
    pub requirements: BTreeMap<String, Decimal>,

    /// Products on the order with no recipe at all. They consume nothing.
    pub products_without_recipe: Vec<String>,
}

impl Expansion {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Expands `lines` through `recipes` (product id → recipe items).
pub fn expand(lines: &[OrderLine], recipes: &HashMap<String, Vec<RecipeItem>>) -> Expansion {
    let mut expansion = Expansion::default();

    for line in lines.iter().filter(|l| l.quantity > 0) {
        let items = match recipes.get(&line.product_id) {
            Some(items) if !items.is_empty() => items,
            _ => {
                if !expansion.products_without_recipe.contains(&line.product_id) {
                    expansion.products_without_recipe.push(line.product_id.clone());
                }
                continue;
            }
        };

        let line_qty = Decimal::from(line.quantity);
        for item in items {
            *expansion
                .requirements
                .entry(item.ingredient_id.clone())
                .or_insert(Decimal::ZERO) += item.quantity_needed * line_qty;
        }
    }

    expansion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn line(product_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            id: format!("line-{product_id}"),
            product_id: product_id.to_string(),
            product_name: product_id.to_string(),
            quantity,
            unit_price: Money::from_major(10_000),
            note: None,
            created_at: Utc::now(),
        }
    }

    fn item(ingredient_id: &str, qty: Decimal) -> RecipeItem {
        RecipeItem {
            ingredient_id: ingredient_id.to_string(),
            quantity_needed: qty,
        }
    }

    #[test]
    fn merges_shared_ingredients_across_lines() {
        let mut recipes = HashMap::new();
        recipes.insert(
            "latte".to_string(),
            vec![item("espresso", dec!(0.018)), item("milk", dec!(0.2))],
        );
        recipes.insert(
            "cappuccino".to_string(),
            vec![item("espresso", dec!(0.018)), item("milk", dec!(0.15))],
        );

        let expansion = expand(&[line("latte", 2), line("cappuccino", 1)], &recipes);

        assert_eq!(expansion.requirements["espresso"], dec!(0.054));
        assert_eq!(expansion.requirements["milk"], dec!(0.55));
        assert!(expansion.products_without_recipe.is_empty());
    }

    #[test]
    fn products_without_recipe_contribute_nothing() {
        let mut recipes = HashMap::new();
        recipes.insert("latte".to_string(), vec![item("milk", dec!(0.2))]);

        let expansion = expand(
            &[line("latte", 1), line("bottled-water", 3), line("bottled-water", 1)],
            &recipes,
        );

        assert_eq!(expansion.requirements.len(), 1);
        assert_eq!(expansion.products_without_recipe, vec!["bottled-water"]);
    }

    #[test]
    fn requirements_are_ordered_by_ingredient_id() {
        let mut recipes = HashMap::new();
        recipes.insert(
            "p".to_string(),
            vec![item("zeta", dec!(1)), item("alpha", dec!(1)), item("mid", dec!(1))],
        );

        let expansion = expand(&[line("p", 1)], &recipes);
        let keys: Vec<_> = expansion.requirements.keys().cloned().collect();

        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn empty_order_expands_to_nothing() {
        let expansion = expand(&[], &HashMap::new());
        assert!(expansion.is_empty());
    }
}
