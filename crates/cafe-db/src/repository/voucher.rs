//! # Voucher Repository
//!
//! Lookup by code and the usage counter. Codes are stored upper-case;
//! callers normalize before looking up.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::debug;

use cafe_core::{Voucher, VoucherType};

use super::{decimal_text, parse_decimal, parse_optional_money};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct VoucherRow {
    id: String,
    code: String,
    description: Option<String>,
    voucher_type: VoucherType,
    discount_value: String,
    minimum_order_amount: Option<String>,
    maximum_discount_amount: Option<String>,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    usage_limit: i64,
    times_used: i64,
    is_active: bool,
}

impl TryFrom<VoucherRow> for Voucher {
    type Error = DbError;

    fn try_from(row: VoucherRow) -> DbResult<Self> {
        Ok(Voucher {
            discount_value: parse_decimal("vouchers.discount_value", &row.discount_value)?,
            minimum_order_amount: parse_optional_money(
                "vouchers.minimum_order_amount",
                row.minimum_order_amount.as_deref(),
            )?,
            maximum_discount_amount: parse_optional_money(
                "vouchers.maximum_discount_amount",
                row.maximum_discount_amount.as_deref(),
            )?,
            id: row.id,
            code: row.code,
            description: row.description,
            voucher_type: row.voucher_type,
            valid_from: row.valid_from,
            valid_to: row.valid_to,
            usage_limit: row.usage_limit,
            times_used: row.times_used,
            is_active: row.is_active,
        })
    }
}

/// Repository for vouchers.
pub struct VoucherRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> VoucherRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        VoucherRepository { conn }
    }

    /// Gets a voucher by its (already normalized) code.
    pub async fn get_by_code(&mut self, code: &str) -> DbResult<Option<Voucher>> {
        let row: Option<VoucherRow> = sqlx::query_as(
            r#"
            SELECT
                id, code, description, voucher_type, discount_value,
                minimum_order_amount, maximum_discount_amount,
                valid_from, valid_to, usage_limit, times_used, is_active
            FROM vouchers
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Voucher::try_from).transpose()
    }

    /// Inserts a voucher.
    pub async fn insert(&mut self, voucher: &Voucher) -> DbResult<()> {
        debug!(code = %voucher.code, "Inserting voucher");

        sqlx::query(
            r#"
            INSERT INTO vouchers (
                id, code, description, voucher_type, discount_value,
                minimum_order_amount, maximum_discount_amount,
                valid_from, valid_to, usage_limit, times_used, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&voucher.id)
        .bind(&voucher.code)
        .bind(&voucher.description)
        .bind(voucher.voucher_type)
        .bind(decimal_text(voucher.discount_value))
        .bind(voucher.minimum_order_amount.map(|m| decimal_text(m.amount())))
        .bind(voucher.maximum_discount_amount.map(|m| decimal_text(m.amount())))
        .bind(voucher.valid_from)
        .bind(voucher.valid_to)
        .bind(voucher.usage_limit)
        .bind(voucher.times_used)
        .bind(voucher.is_active)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Records one more use of the voucher.
    pub async fn increment_usage(&mut self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Incrementing voucher usage");

        let result = sqlx::query("UPDATE vouchers SET times_used = times_used + 1 WHERE code = ?1")
            .bind(code)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Voucher", code));
        }

        Ok(())
    }
}
