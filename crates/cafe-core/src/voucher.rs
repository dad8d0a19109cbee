//! # Voucher Evaluation
//!
//! Decides whether a voucher qualifies for an order amount and how much it
//! takes off.
//!
//! ## Check Order
//! ```text
//! evaluate(voucher, order_amount, now)
//!      │
//!      ├── is_active?                    no → "Voucher is not active"
//!      ├── times_used < usage_limit?     no → "Voucher usage limit reached"
//!      ├── now ≥ valid_from?             no → "Voucher is not valid yet"
//!      ├── now < valid_to?               no → "Voucher has expired"
//!      ├── amount ≥ minimum_order?       no → "Order amount ... below minimum"
//!      │
//!      ▼
//! FIXED_AMOUNT → value
//! PERCENTAGE   → amount × value / 100, capped at maximum_discount_amount
//!      │
//!      ▼
//! min(discount, order_amount)
//! ```
//!
//! Evaluation never fails: a voucher that does not qualify yields an
//! invalid [`VoucherCheck`] with a reason and zero discount. Whether that
//! becomes an error is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Voucher, VoucherType};

/// Outcome of evaluating a voucher against an order amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherCheck {
    pub code: String,
    pub is_valid: bool,
    /// Human-readable result, shown to the cashier.
    pub message: String,
    pub discount: Money,
    pub voucher_type: VoucherType,
}

impl VoucherCheck {
    fn rejected(voucher: &Voucher, message: impl Into<String>) -> Self {
        VoucherCheck {
            code: voucher.code.clone(),
            is_valid: false,
            message: message.into(),
            discount: Money::zero(),
            voucher_type: voucher.voucher_type,
        }
    }
}

/// Evaluates `voucher` for an order worth `order_amount` at instant `now`.
pub fn evaluate(voucher: &Voucher, order_amount: Money, now: DateTime<Utc>) -> VoucherCheck {
    if !voucher.is_active {
        return VoucherCheck::rejected(voucher, "Voucher is not active");
    }

    if voucher.times_used >= voucher.usage_limit {
        return VoucherCheck::rejected(voucher, "Voucher usage limit reached");
    }

    if now < voucher.valid_from {
        return VoucherCheck::rejected(voucher, "Voucher is not valid yet");
    }

    if now >= voucher.valid_to {
        return VoucherCheck::rejected(voucher, "Voucher has expired");
    }

    if let Some(minimum) = voucher.minimum_order_amount {
        if order_amount < minimum {
            return VoucherCheck::rejected(
                voucher,
                format!("Order amount {order_amount} is below the voucher minimum of {minimum}"),
            );
        }
    }

    let discount = calculate_discount(voucher, order_amount);

    VoucherCheck {
        code: voucher.code.clone(),
        is_valid: true,
        message: "Voucher applied".to_string(),
        discount,
        voucher_type: voucher.voucher_type,
    }
}

/// Raw discount for a qualifying voucher, capped at the order amount.
pub fn calculate_discount(voucher: &Voucher, order_amount: Money) -> Money {
    let discount = match voucher.voucher_type {
        VoucherType::FixedAmount => Money::new(voucher.discount_value),
        VoucherType::Percentage => {
            let pct = order_amount.percentage(voucher.discount_value);
            match voucher.maximum_discount_amount {
                Some(cap) => pct.min(cap),
                None => pct,
            }
        }
    };

    discount.min(order_amount).non_negative()
}
