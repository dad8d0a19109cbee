//! # Validation Module
//!
//! Input validation for engine requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request structs (serde)                                      │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, notes, codes, stock amounts                           │
//! │  └── Runs before any database work                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / UNIQUE constraints                                        │
//! │  └── One PENDING order per table (partial unique index)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_NOTE_LENGTH, MAX_VOUCHER_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_quantity;
///
/// assert!(validate_quantity(2).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an absolute stock level (stock-take).
///
/// Zero is allowed; negative stock is not.
pub fn validate_stock_level(quantity: Decimal) -> ValidationResult<()> {
    if quantity < Decimal::ZERO {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a received stock quantity (goods receipt).
pub fn validate_receipt_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "received_quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes an optional line note.
///
/// Blank notes become `None`; long notes are rejected.
pub fn normalize_note(note: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(Some(note.to_string()))
}

/// Normalizes a voucher code: trimmed and upper-cased.
///
/// ## Example
/// ```rust
/// use cafe_core::validation::normalize_voucher_code;
///
/// assert_eq!(normalize_voucher_code("  summer10 ").unwrap(), "SUMMER10");
/// assert!(normalize_voucher_code("   ").is_err());
/// ```
pub fn normalize_voucher_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "voucher_code".to_string(),
        });
    }

    if code.len() > MAX_VOUCHER_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "voucher_code".to_string(),
            max: MAX_VOUCHER_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "voucher_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a free-text reason for a stock adjustment.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.chars().count() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(reason.to_string())
}

// =============================================================================
// ID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str, field: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-3).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { max: 999, .. })
        ));
    }

    #[test]
    fn test_stock_amounts() {
        assert!(validate_stock_level(dec!(0)).is_ok());
        assert!(validate_stock_level(dec!(12.5)).is_ok());
        assert!(validate_stock_level(dec!(-0.1)).is_err());

        assert!(validate_receipt_quantity(dec!(0.5)).is_ok());
        assert!(validate_receipt_quantity(dec!(0)).is_err());
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note(None).unwrap(), None);
        assert_eq!(normalize_note(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_note(Some(" less ice ")).unwrap(),
            Some("less ice".to_string())
        );
        assert!(normalize_note(Some(&"x".repeat(MAX_NOTE_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_normalize_voucher_code() {
        assert_eq!(normalize_voucher_code("welcome-10").unwrap(), "WELCOME-10");
        assert!(normalize_voucher_code("").is_err());
        assert!(normalize_voucher_code("NO SPACES").is_err());
        assert!(normalize_voucher_code(&"A".repeat(MAX_VOUCHER_CODE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert_eq!(validate_reason(" spoiled milk ").unwrap(), "spoiled milk");
        assert!(validate_reason("").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert!(validate_uuid("not-a-uuid", "id").is_err());
    }
}
