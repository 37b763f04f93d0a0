//! # pharma-core: Pure Business Logic for Pharmacie
//!
//! Validation rules, money arithmetic and domain types for the pharmacy
//! inventory / customer / sales core. Nothing here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pharmacie Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Presentation layer (external collaborator)           │   │
//! │  │        collects strings, renders rows and error reports         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ MedicineForm, SaleForm, ...            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pharma-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   input   │  │ validation│  │   │
//! │  │   │ Medicine  │  │   Money   │  │   forms   │  │   rules   │  │   │
//! │  │   │ Customer  │  │  (cents)  │  │  patches  │  │           │  │   │
//! │  │   │   Sale    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pharma-db (Database Layer)                      │   │
//! │  │        SQLite queries, migrations, repositories, reports        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain rows (Medicine, Customer, Sale, report rows)
//! - [`money`] - Money type with integer arithmetic
//! - [`input`] - Raw forms and the typed inputs they validate into
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharma_core::input::MedicineForm;
//!
//! let form = MedicineForm {
//!     name: "Paracetamol".to_string(),
//!     barcode: Some("1234".to_string()),
//!     quantity: "10".to_string(),
//!     price: "5.0".to_string(),
//!     ..Default::default()
//! };
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//! let medicine = form.validate(today).unwrap();
//! assert_eq!(medicine.price.cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use input::*;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Pharmacist recorded on a sale when none is given.
pub const UNKNOWN_PHARMACIST: &str = "unknown";

/// Minimum number of digits in a phone number (ignoring a leading `+`).
pub const MIN_PHONE_DIGITS: usize = 6;

/// Minimum length of an insurance number, after trimming.
pub const MIN_INSURANCE_NUMBER_LEN: usize = 4;
