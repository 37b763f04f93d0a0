//! # Operation Inputs
//!
//! Raw forms as collected by the presentation layer, and the typed inputs
//! they validate into.
//!
//! ## Form → Input
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MedicineForm        { quantity: "10", price: "5.0", ... }  (strings)  │
//! │       │                                                                 │
//! │       │  .validate(today)  ← first failing rule wins                   │
//! │       ▼                                                                 │
//! │  NewMedicine         { quantity: 10, price: Money(500), ... } (typed)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Patches
//! Patch forms carry one `Option` per updatable column; `None` leaves the
//! column untouched. A blank value for a column that is required at creation
//! (names, quantity, price, birth date) is rejected. A blank value for an
//! optional column clears it:
//!
//! ```text
//! form field        patch field            effect
//! ───────────────   ────────────────────   ─────────────────
//! None              None                   unchanged
//! Some("  ")        Some(None)             cleared (NULL, or '' for description)
//! Some("5678")      Some(Some("5678"))     set
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::validation::{
    optional_text, validate_date, validate_expiration_date, validate_id,
    validate_insurance_number, validate_phone, validate_price, validate_required,
    validate_sale_quantity, validate_stock_quantity, ValidationResult,
};
use crate::UNKNOWN_PHARMACIST;

/// Runs `validate` on a supplied value; `None` stays `None`.
fn supplied<T>(
    value: Option<&str>,
    validate: impl FnOnce(&str) -> ValidationResult<T>,
) -> ValidationResult<Option<T>> {
    value.map(validate).transpose()
}

/// Patch value for a nullable column: absent, cleared (blank) or set.
fn clearable<T>(
    value: Option<&str>,
    validate: impl FnOnce(&str) -> ValidationResult<T>,
) -> ValidationResult<Option<Option<T>>> {
    value
        .map(|v| supplied(optional_text(Some(v)), validate))
        .transpose()
}

// =============================================================================
// Medicine
// =============================================================================

/// Raw medicine fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicineForm {
    pub name: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub quantity: String,
    pub price: String,
    pub expiration_date: Option<String>,
}

/// A validated medicine, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub barcode: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub price: Money,
    pub expiration_date: Option<NaiveDate>,
}

impl MedicineForm {
    /// Validates every field; `today` bounds the expiration date.
    pub fn validate(&self, today: NaiveDate) -> ValidationResult<NewMedicine> {
        let name = validate_required("name", &self.name)?;
        let quantity = validate_stock_quantity(&self.quantity)?;
        let price = validate_price(&self.price)?;
        let expiration_date = supplied(optional_text(self.expiration_date.as_deref()), |d| {
            validate_expiration_date(d, today)
        })?;

        Ok(NewMedicine {
            name,
            barcode: optional_text(self.barcode.as_deref()).map(str::to_string),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            quantity,
            price,
            expiration_date,
        })
    }
}

/// Raw sparse medicine update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicinePatchForm {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub expiration_date: Option<String>,
}

/// Validated sparse medicine update over a closed set of columns.
///
/// `Some(None)` clears a nullable column. A cleared description is stored
/// as the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicinePatch {
    pub name: Option<String>,
    pub barcode: Option<Option<String>>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
    pub expiration_date: Option<Option<NaiveDate>>,
}

impl MedicinePatchForm {
    pub fn validate(&self, today: NaiveDate) -> ValidationResult<MedicinePatch> {
        Ok(MedicinePatch {
            name: supplied(self.name.as_deref(), |v| validate_required("name", v))?,
            barcode: clearable(self.barcode.as_deref(), |b| Ok(b.to_string()))?,
            description: self.description.as_deref().map(|d| d.trim().to_string()),
            quantity: supplied(self.quantity.as_deref(), validate_stock_quantity)?,
            price: supplied(self.price.as_deref(), validate_price)?,
            expiration_date: clearable(self.expiration_date.as_deref(), |d| {
                validate_expiration_date(d, today)
            })?,
        })
    }
}

impl MedicinePatch {
    /// True when no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.barcode.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.expiration_date.is_none()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Raw customer fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: String,
    pub phone: Option<String>,
    pub insurance_number: Option<String>,
}

/// A validated customer, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub insurance_number: Option<String>,
}

impl CustomerForm {
    pub fn validate(&self) -> ValidationResult<NewCustomer> {
        let last_name = validate_required("last name", &self.last_name)?;
        let first_name = validate_required("first name", &self.first_name)?;
        validate_required("birth date", &self.birth_date)?;
        let birth_date = validate_date("birth date", &self.birth_date)?;
        let phone = supplied(optional_text(self.phone.as_deref()), validate_phone)?;
        let insurance_number = supplied(
            optional_text(self.insurance_number.as_deref()),
            validate_insurance_number,
        )?;

        Ok(NewCustomer {
            last_name,
            first_name,
            birth_date,
            phone,
            insurance_number,
        })
    }
}

/// Raw sparse customer update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerPatchForm {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub insurance_number: Option<String>,
}

/// Validated sparse customer update; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<Option<String>>,
    pub insurance_number: Option<Option<String>>,
}

impl CustomerPatchForm {
    pub fn validate(&self) -> ValidationResult<CustomerPatch> {
        Ok(CustomerPatch {
            last_name: supplied(self.last_name.as_deref(), |v| {
                validate_required("last name", v)
            })?,
            first_name: supplied(self.first_name.as_deref(), |v| {
                validate_required("first name", v)
            })?,
            birth_date: supplied(self.birth_date.as_deref(), |v| {
                validate_required("birth date", v)?;
                validate_date("birth date", v)
            })?,
            phone: clearable(self.phone.as_deref(), validate_phone)?,
            insurance_number: clearable(
                self.insurance_number.as_deref(),
                validate_insurance_number,
            )?,
        })
    }
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.last_name.is_none()
            && self.first_name.is_none()
            && self.birth_date.is_none()
            && self.phone.is_none()
            && self.insurance_number.is_none()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Raw sale request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleForm {
    pub medicine_id: String,
    pub customer_id: String,
    pub quantity: String,
    pub pharmacist: Option<String>,
}

/// A validated sale request. Stock and price are checked against storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub medicine_id: i64,
    pub customer_id: i64,
    pub quantity: i64,
    pub pharmacist: String,
}

impl SaleForm {
    pub fn validate(&self) -> ValidationResult<NewSale> {
        let medicine_id = validate_id("medicine id", &self.medicine_id)?;
        let customer_id = validate_id("customer id", &self.customer_id)?;
        let quantity = validate_sale_quantity(&self.quantity)?;

        Ok(NewSale {
            medicine_id,
            customer_id,
            quantity,
            pharmacist: optional_text(self.pharmacist.as_deref())
                .unwrap_or(UNKNOWN_PHARMACIST)
                .to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
