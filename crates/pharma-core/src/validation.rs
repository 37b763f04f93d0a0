//! # Validation Module
//!
//! Field validators for medicines, customers and sales.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer                                           │
//! │  └── Collects raw strings from the user                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (via the forms in `input`)                       │
//! │  ├── Parses numbers, prices, dates, ids                                │
//! │  └── First failing rule aborts; nothing is written                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE barcode                                                    │
//! │  └── Foreign keys (restrict / set-null)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharma_core::validation::{validate_phone, validate_stock_quantity};
//!
//! assert_eq!(validate_stock_quantity("10").unwrap(), 10);
//! assert!(validate_phone("abc").is_err());
//! assert!(validate_phone("+123456").is_ok());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MIN_INSURANCE_NUMBER_LEN, MIN_PHONE_DIGITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Calendar format accepted for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ```rust
/// use pharma_core::validation::validate_required;
///
/// assert_eq!(validate_required("name", "  Doliprane ").unwrap(), "Doliprane");
/// assert!(validate_required("name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field; blank input counts as absent.
pub fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validates a phone number.
///
/// ## Rules
/// - Only digits, optionally preceded by a single `+`
/// - At least 6 digits once the `+` is stripped
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, optionally prefixed by '+'".to_string(),
        });
    }

    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: format!("must contain at least {} digits", MIN_PHONE_DIGITS),
        });
    }

    Ok(phone.to_string())
}

/// Validates an insurance number (at least 4 characters once trimmed).
pub fn validate_insurance_number(number: &str) -> ValidationResult<String> {
    let number = number.trim();

    if number.chars().count() < MIN_INSURANCE_NUMBER_LEN {
        return Err(ValidationError::TooShort {
            field: "insurance number".to_string(),
            min: MIN_INSURANCE_NUMBER_LEN,
        });
    }

    Ok(number.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn parse_integer(field: &str, value: &str) -> ValidationResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        })
}

/// Validates a stock quantity (zero or more).
pub fn validate_stock_quantity(value: &str) -> ValidationResult<i64> {
    let qty = parse_integer("quantity", value)?;

    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(qty)
}

/// Validates the quantity of a sale (strictly positive).
///
/// ## User Workflow
/// ```text
/// Pharmacist enters quantity: "3"
///      │
///      ▼
/// validate_sale_quantity("3") ← THIS FUNCTION
///      │
///      ├── not a number?  → "quantity has invalid format"
///      ├── qty <= 0?      → "quantity must be positive"
///      └── OK → stock lookup
/// ```
pub fn validate_sale_quantity(value: &str) -> ValidationResult<i64> {
    let qty = parse_integer("quantity", value)?;

    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(qty)
}

/// Validates a record id typed by the user (strictly positive integer).
pub fn validate_id(field: &str, value: &str) -> ValidationResult<i64> {
    let id = parse_integer(field, value)?;

    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(id)
}

/// Parses a decimal price into [`Money`].
///
/// ## Rules
/// - Digits with an optional `.` and at most two significant decimals
///   (`"5"`, `"5.0"`, `"12.99"`, `".5"`)
/// - Must not be negative (zero is allowed)
///
/// ```rust
/// use pharma_core::validation::validate_price;
///
/// assert_eq!(validate_price("5.0").unwrap().cents(), 500);
/// assert_eq!(validate_price("12.99").unwrap().cents(), 1299);
/// assert!(validate_price("abc").is_err());
/// assert!(validate_price("-1").is_err());
/// ```
pub fn validate_price(value: &str) -> ValidationResult<Money> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: reason.to_string(),
    };

    let value = value.trim();
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid("must be a decimal number"));
    }

    // Trailing zeros past the cents are harmless ("5.500")
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > 2 {
        return Err(invalid("must have at most 2 decimal places"));
    }

    let overflow = || ValidationError::Overflow {
        field: "price".to_string(),
    };
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let minor: i64 = format!("{:0<2}", fraction).parse().map_err(|_| overflow())?;
    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(overflow)?;

    if negative && cents != 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(Money::from_cents(cents))
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a strict `YYYY-MM-DD` calendar date.
///
/// Zero padding is mandatory: `2030-1-5` is rejected, as is `2030-02-30`.
pub fn validate_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid date in YYYY-MM-DD format".to_string(),
    };

    let shaped = value.len() == 10
        && value.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Validates an expiration date, which must fall strictly after `today`.
pub fn validate_expiration_date(value: &str, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let date = validate_date("expiration date", value)?;

    if date <= today {
        return Err(ValidationError::NotInFuture {
            field: "expiration date".to_string(),
            today: today.format(DATE_FORMAT).to_string(),
        });
    }

    Ok(date)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("name", "Aspirine").unwrap(), "Aspirine");
        assert_eq!(validate_required("name", "  Aspirine\t").unwrap(), "Aspirine");
        assert!(matches!(
            validate_required("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_required("name", " \n ").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" 42 ")), Some("42"));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("0612345678").unwrap(), "0612345678");
        assert_eq!(validate_phone(" +123456 ").unwrap(), "+123456");

        assert!(validate_phone("abc").is_err());
        assert!(validate_phone("+").is_err());
        assert!(validate_phone("++123456").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+12345").is_err());
        assert!(validate_phone("06 12 34 56").is_err());
    }

    #[test]
    fn test_validate_insurance_number() {
        assert_eq!(validate_insurance_number(" AB12 ").unwrap(), "AB12");
        assert!(matches!(
            validate_insurance_number(" A1  "),
            Err(ValidationError::TooShort { min: 4, .. })
        ));
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert_eq!(validate_stock_quantity("0").unwrap(), 0);
        assert_eq!(validate_stock_quantity(" 10 ").unwrap(), 10);

        assert!(matches!(
            validate_stock_quantity("-1"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_stock_quantity("ten"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_stock_quantity("2.5").is_err());
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert_eq!(validate_sale_quantity("3").unwrap(), 3);
        assert!(matches!(
            validate_sale_quantity("0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_sale_quantity("-2").is_err());
        assert!(validate_sale_quantity("").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("medicine id", "12").unwrap(), 12);
        assert!(validate_id("medicine id", "0").is_err());
        assert!(validate_id("medicine id", "x1").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price("5").unwrap().cents(), 500);
        assert_eq!(validate_price("5.0").unwrap().cents(), 500);
        assert_eq!(validate_price("5.5").unwrap().cents(), 550);
        assert_eq!(validate_price("0.05").unwrap().cents(), 5);
        assert_eq!(validate_price(".5").unwrap().cents(), 50);
        assert_eq!(validate_price("3.500").unwrap().cents(), 350);
        assert_eq!(validate_price("0").unwrap().cents(), 0);
        assert_eq!(validate_price("-0").unwrap().cents(), 0);

        assert!(matches!(
            validate_price("-1.50"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_price("1.999"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_price("").is_err());
        assert!(validate_price(".").is_err());
        assert!(validate_price("1,50").is_err());
        assert!(validate_price("1e3").is_err());
        assert!(matches!(
            validate_price("99999999999999999999"),
            Err(ValidationError::Overflow { .. })
        ));
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("birth date", "1990-05-17").unwrap(),
            day("1990-05-17")
        );
        assert!(validate_date("birth date", "1990-5-17").is_err());
        assert!(validate_date("birth date", "17/05/1990").is_err());
        assert!(validate_date("birth date", "2023-02-29").is_err());
        assert!(validate_date("birth date", "2024-02-29").is_ok());
        assert!(validate_date("birth date", "").is_err());
    }

    #[test]
    fn test_validate_expiration_date() {
        let today = day("2026-10-18");

        assert!(validate_expiration_date("2026-10-19", today).is_ok());
        assert!(matches!(
            validate_expiration_date("2026-10-18", today),
            Err(ValidationError::NotInFuture { .. })
        ));
        assert!(validate_expiration_date("2020-01-01", today).is_err());
        assert!(matches!(
            validate_expiration_date("soon", today),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
