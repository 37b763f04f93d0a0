//! # pharma-db: Database Layer for Pharmacie
//!
//! Storage for medicines, customers and sales. SQLite via sqlx, with the
//! schema embedded as migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pharmacie Data Flow                              │
//! │                                                                         │
//! │  Presentation layer (forms, tables, message boxes)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pharma-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MedicineRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │    │ 001_init.sql │  │   │
//! │  │   │ DbConfig      │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (pharmacie.db) or in-memory database for tests            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Medicine, customer, sale and report repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharma_db::{Database, DbConfig};
//! use pharma_core::SaleForm;
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//!
//! let sale = db
//!     .sales()
//!     .record(&SaleForm {
//!         medicine_id: "1".into(),
//!         customer_id: "1".into(),
//!         quantity: "3".into(),
//!         pharmacist: None,
//!     })
//!     .await?;
//!
//! for row in db.reports().sales().await? {
//!     println!("{} {:?} {}", row.id, row.medicine_name, row.total());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorKind, ErrorReport};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::medicine::MedicineRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
