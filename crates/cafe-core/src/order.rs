//! # Order Aggregate
//!
//! An order and its lines, with every rule that keeps its money balanced.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Lifecycle                                 │
//! │                                                                         │
//! │  create ──► PENDING ──┬── add_item / update_item / remove_item          │
//! │                │      ├── apply_voucher / remove_voucher               │
//! │                │      └── (every change re-runs recalculate_totals)    │
//! │                │                                                        │
//! │                ├── mark_paid ──────► PAID       (terminal)              │
//! │                └── mark_cancelled ─► CANCELLED  (terminal)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Invariants
//! - `subtotal = Σ unit_price × quantity`
//! - `discount ≤ subtotal`
//! - `total = max(0, subtotal − discount)`
//!
//! The aggregate never does I/O. Callers pass the attached voucher (if they
//! could find it) and the current time in a [`Pricing`] context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderStatus, OrderType, PaymentMethod, Product, Voucher};
use crate::validation::validate_quantity;
use crate::voucher;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

// =============================================================================
// Order Line
// =============================================================================

/// One product on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub product_id: String,

    /// Product name when the line was created.
    pub product_name: String,

    pub quantity: i64,

    /// Price when the line was created. Later menu price changes do not
    /// affect open orders.
    pub unit_price: Money,

    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Creates a line for `product`, freezing its current name and price.
    pub fn new(product: &Product, quantity: i64, note: Option<String>, now: DateTime<Utc>) -> Self {
        OrderLine {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            note,
            created_at: now,
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Pricing Context & Totals
// =============================================================================

/// What the aggregate needs to price itself.
#[derive(Debug, Clone, Copy)]
pub struct Pricing<'a> {
    /// The voucher record matching the attached code, if it still exists.
    pub voucher: Option<&'a Voucher>,
    pub now: DateTime<Utc>,
}

impl<'a> Pricing<'a> {
    pub fn new(voucher: Option<&'a Voucher>, now: DateTime<Utc>) -> Self {
        Self { voucher, now }
    }

    /// Pricing with no voucher record available.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { voucher: None, now }
    }
}

/// A voucher that was silently removed during recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedVoucher {
    pub code: String,
    pub reason: String,
}

/// Totals after a recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub voucher_code: Option<String>,

    /// Set when a previously attached voucher no longer qualified.
    pub detached_voucher: Option<DetachedVoucher>,
}

// =============================================================================
// Order
// =============================================================================

/// A customer transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_id: Option<String>,
    pub staff_id: String,
    pub customer_id: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub voucher_code: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates an empty PENDING order.
    pub fn new(
        order_type: OrderType,
        table_id: Option<String>,
        staff_id: impl Into<String>,
        customer_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            table_id,
            staff_id: staff_id.into(),
            customer_id,
            order_type,
            status: OrderStatus::Pending,
            subtotal: Money::zero(),
            discount_amount: Money::zero(),
            total_amount: Money::zero(),
            voucher_code: None,
            payment_method: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            lines: Vec::new(),
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, line_id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Current totals, without recalculating.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            discount: self.discount_amount,
            total: self.total_amount,
            voucher_code: self.voucher_code.clone(),
            detached_voucher: None,
        }
    }

    fn ensure_pending(&self) -> CoreResult<()> {
        if !self.is_pending() {
            return Err(CoreError::InvalidOrderStatus {
                order_id: self.id.clone(),
                current_status: self.status,
            });
        }
        Ok(())
    }

    fn line_index(&self, line_id: &str) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::not_found("OrderLine", line_id))
    }

    // -------------------------------------------------------------------------
    // Line operations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of `product`.
    ///
    /// ## Behavior
    /// - Product already on the order: quantities merge, and the note is
    ///   replaced only if a new one is given
    /// - New product: a line is created at the product's current price
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        note: Option<String>,
        pricing: Pricing<'_>,
    ) -> CoreResult<OrderTotals> {
        self.ensure_pending()?;
        validate_quantity(quantity)?;

        if !product.is_available {
            return Err(CoreError::ProductNotAvailable {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            if note.is_some() {
                line.note = note;
            }
        } else {
            if self.lines.len() >= MAX_ORDER_LINES {
                return Err(CoreError::TooManyLines {
                    max: MAX_ORDER_LINES,
                });
            }
            self.lines
                .push(OrderLine::new(product, quantity, note, pricing.now));
        }

        Ok(self.recalculate_totals(pricing))
    }

    /// Replaces the quantity and note of a line.
    pub fn update_item(
        &mut self,
        line_id: &str,
        quantity: i64,
        note: Option<String>,
        pricing: Pricing<'_>,
    ) -> CoreResult<OrderTotals> {
        self.ensure_pending()?;
        validate_quantity(quantity)?;

        let idx = self.line_index(line_id)?;
        let line = &mut self.lines[idx];
        line.quantity = quantity;
        line.note = note;

        Ok(self.recalculate_totals(pricing))
    }

    /// Removes a line. An order left empty is reset to zero totals and
    /// loses its voucher.
    pub fn remove_item(&mut self, line_id: &str, pricing: Pricing<'_>) -> CoreResult<OrderTotals> {
        self.ensure_pending()?;

        let idx = self.line_index(line_id)?;
        self.lines.remove(idx);

        if self.lines.is_empty() {
            let detached = self.voucher_code.take().map(|code| DetachedVoucher {
                code,
                reason: "Order has no items".to_string(),
            });
            self.subtotal = Money::zero();
            self.discount_amount = Money::zero();
            self.total_amount = Money::zero();
            self.updated_at = pricing.now;

            let mut totals = self.totals();
            totals.detached_voucher = detached;
            return Ok(totals);
        }

        Ok(self.recalculate_totals(pricing))
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    /// Recomputes subtotal, discount and total.
    ///
    /// An attached voucher that no longer qualifies (or whose record is
    /// missing from `pricing`) is detached and reported in
    /// [`OrderTotals::detached_voucher`].
    pub fn recalculate_totals(&mut self, pricing: Pricing<'_>) -> OrderTotals {
        let subtotal: Money = self
            .lines
            .iter()
            .filter(|l| l.quantity > 0)
            .map(OrderLine::line_total)
            .sum();

        let mut discount = Money::zero();
        let mut detached = None;

        if let Some(code) = self.voucher_code.clone() {
            match pricing.voucher.filter(|v| v.code == code) {
                Some(v) => {
                    let check = voucher::evaluate(v, subtotal, pricing.now);
                    if check.is_valid {
                        discount = check.discount;
                    } else {
                        self.voucher_code = None;
                        detached = Some(DetachedVoucher {
                            code,
                            reason: check.message,
                        });
                    }
                }
                None => {
                    self.voucher_code = None;
                    detached = Some(DetachedVoucher {
                        code,
                        reason: "Voucher no longer exists".to_string(),
                    });
                }
            }
        }

        let discount = discount.min(subtotal).non_negative();
        self.subtotal = subtotal;
        self.discount_amount = discount;
        self.total_amount = (subtotal - discount).non_negative();
        self.updated_at = pricing.now;

        let mut totals = self.totals();
        totals.detached_voucher = detached;
        totals
    }

    /// Attaches a voucher after checking it qualifies for the current
    /// subtotal.
    pub fn apply_voucher(&mut self, voucher: &Voucher, now: DateTime<Utc>) -> CoreResult<OrderTotals> {
        self.ensure_pending()?;

        let subtotal: Money = self.lines.iter().map(OrderLine::line_total).sum();
        let check = voucher::evaluate(voucher, subtotal, now);
        if !check.is_valid {
            return Err(CoreError::VoucherRejected {
                code: voucher.code.clone(),
                reason: check.message,
            });
        }

        self.voucher_code = Some(voucher.code.clone());
        Ok(self.recalculate_totals(Pricing::new(Some(voucher), now)))
    }

    /// Detaches the current voucher.
    pub fn remove_voucher(&mut self, now: DateTime<Utc>) -> CoreResult<OrderTotals> {
        self.ensure_pending()?;

        if self.voucher_code.take().is_none() {
            return Err(CoreError::NoVoucherApplied {
                order_id: self.id.clone(),
            });
        }

        Ok(self.recalculate_totals(Pricing::at(now)))
    }

    // -------------------------------------------------------------------------
    // Terminal transitions
    // -------------------------------------------------------------------------

    /// PENDING → PAID.
    pub fn mark_paid(&mut self, method: PaymentMethod, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending()?;
        self.status = OrderStatus::Paid;
        self.payment_method = Some(method);
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// PENDING → CANCELLED.
    pub fn mark_cancelled(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending()?;
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
