//! # Repository Module
//!
//! Database repository implementations for Pharmacie.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Operation Shape                                      │
//! │                                                                         │
//! │  Presentation layer                                                    │
//! │       │                                                                 │
//! │       │  db.medicines().add(&MedicineForm { .. })                      │
//! │       ▼                                                                 │
//! │  form.validate(today)   ← ValidationError, no connection acquired      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin() / pool    ← existence, uniqueness, reference checks      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fixed parameterized SQL, commit                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MedicineRepository`](medicine::MedicineRepository) - Medicine CRUD and lookups
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD and lookups
//! - [`SaleRepository`](sale::SaleRepository) - The record-sale transaction
//! - [`ReportRepository`](report::ReportRepository) - Read-only list queries

use chrono::NaiveDate;

use crate::error::DbError;

pub mod customer;
pub mod medicine;
pub mod report;
pub mod sale;

/// Local calendar date, the bound for expiration dates.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Maps a failed `begin`/`commit` onto a transaction error.
pub(crate) fn transaction_failed(err: sqlx::Error) -> DbError {
    DbError::TransactionFailed(err.to_string())
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use pharma_core::{CustomerForm, MedicineForm, SaleForm};

    use crate::pool::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn paracetamol() -> MedicineForm {
        MedicineForm {
            name: "Paracetamol".to_string(),
            barcode: Some("1234".to_string()),
            description: Some("Antalgique 500 mg".to_string()),
            quantity: "10".to_string(),
            price: "5.0".to_string(),
            expiration_date: None,
        }
    }

    pub fn claire() -> CustomerForm {
        CustomerForm {
            last_name: "Martin".to_string(),
            first_name: "Claire".to_string(),
            birth_date: "1985-04-02".to_string(),
            phone: Some("+123456".to_string()),
            insurance_number: Some("1850475123456".to_string()),
        }
    }

    pub fn sale(medicine_id: i64, customer_id: i64, quantity: &str) -> SaleForm {
        SaleForm {
            medicine_id: medicine_id.to_string(),
            customer_id: customer_id.to_string(),
            quantity: quantity.to_string(),
            pharmacist: Some("Dr. Lambert".to_string()),
        }
    }
}
