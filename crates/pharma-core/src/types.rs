//! # Domain Types
//!
//! Core domain types used throughout Pharmacie.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Model                                   │
//! │                                                                         │
//! │   ┌──────────────┐        ┌──────────────┐        ┌──────────────┐     │
//! │   │   Medicine   │ 1    * │     Sale     │ *    1 │   Customer   │     │
//! │   │ (stock,price)│◄───────│ (immutable)  │───────►│              │     │
//! │   └──────────────┘restrict└──────────────┘set-null└──────────────┘     │
//! │                                                                         │
//! │   Read models (reports): MedicineSummary, CustomerSummary,             │
//! │                          SaleHistoryRow                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows carry their money as `*_cents` columns; accessors wrap them in
//! [`Money`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Medicine
// =============================================================================

/// A medicine held in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Medicine {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Barcode, unique across medicines when present.
    pub barcode: Option<String>,

    pub description: String,

    /// Stock on hand.
    pub quantity: i64,

    /// Current unit price in cents.
    pub price_cents: i64,

    pub expiration_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units are in stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// Prices a sale of `quantity` units at the current unit price.
    ///
    /// ## Rules
    /// ```text
    /// quantity <= 0        → Validation(MustBePositive)
    /// stock < quantity     → InsufficientStock
    /// price == 0           → Unpriced (a sale total must be positive)
    /// price × qty overflow → Validation(Overflow)
    /// ```
    pub fn quote_sale(&self, quantity: i64) -> CoreResult<SaleQuote> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if !self.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                medicine_id: self.id,
                available: self.quantity,
                requested: quantity,
            });
        }

        let unit_price = self.price();
        if !unit_price.is_positive() {
            return Err(CoreError::Unpriced {
                medicine_id: self.id,
            });
        }

        let total = unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| ValidationError::Overflow {
                field: "total".to_string(),
            })?;

        Ok(SaleQuote {
            medicine_id: self.id,
            quantity,
            unit_price,
            total,
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A pharmacy customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub insurance_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Display name, first name then last name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable sale record.
/// Prices are frozen at the time of sale (snapshot pattern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub medicine_id: i64,
    /// `None` once the customer has been deleted.
    pub customer_id: Option<i64>,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity at time of sale (frozen).
    pub total_cents: i64,
    pub pharmacist: String,
    pub sold_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// The priced outcome of [`Medicine::quote_sale`], ready to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleQuote {
    pub medicine_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

// =============================================================================
// Report Rows
// =============================================================================

/// Medicine list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MedicineSummary {
    pub id: i64,
    pub name: String,
    pub barcode: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
    pub expiration_date: Option<NaiveDate>,
}

/// Customer list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerSummary {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub insurance_number: Option<String>,
}

/// Sale history row, denormalized with medicine and customer names.
///
/// Names are optional because the history is a left join: a sale whose
/// customer was deleted keeps its row with no customer name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleHistoryRow {
    pub id: i64,
    pub medicine_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_first_name: Option<String>,
    pub quantity: i64,
    pub total_cents: i64,
    pub sold_at: DateTime<Utc>,
}

impl SaleHistoryRow {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
