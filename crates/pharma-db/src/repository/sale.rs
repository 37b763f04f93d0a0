//! # Sale Repository
//!
//! Recording sales. Sales are immutable: there is no update or delete.
//!
//! ## Record Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record(&SaleForm)                                    │
//! │                                                                         │
//! │  form.validate()            ids and quantity well-formed, qty > 0      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ───────────────────────────────────────────────────────────┐    │
//! │  │ SELECT medicine          → NotFound                            │    │
//! │  │ stock < quantity         → InsufficientStock                   │    │
//! │  │ SELECT customer          → NotFound                            │    │
//! │  │ quote: price × quantity  → Unpriced / Overflow                 │    │
//! │  │ INSERT INTO sales                                              │    │
//! │  │ UPDATE medicines SET quantity = quantity - ?                   │    │
//! │  │        WHERE id = ? AND quantity >= ?   (0 rows → rejected)    │    │
//! │  COMMIT ◄─────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  Any early return drops the transaction, which rolls it back:          │
//! │  the sale row and the stock decrement land together or not at all.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement inside the transaction runs on the transaction's own
//! connection, so a single-connection pool cannot deadlock.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use pharma_core::{NewSale, Sale, SaleForm};

use crate::error::{DbError, DbResult};
use crate::repository::customer::find_customer;
use crate::repository::medicine::find_medicine;
use crate::repository::transaction_failed;

async fn find_sale<'e, E>(executor: E, id: i64) -> DbResult<Option<Sale>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, medicine_id, customer_id, quantity, unit_price_cents,
               total_cents, pharmacist, sold_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(sale)
}

/// Repository for sale database operations.
///
/// ## Usage
/// ```rust,ignore
/// let sale = db.sales().record(&SaleForm {
///     medicine_id: "1".into(),
///     customer_id: "3".into(),
///     quantity: "2".into(),
///     pharmacist: Some("Dr. Lambert".into()),
/// }).await?;
/// println!("Total: {}", sale.total());
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Validates and records a sale, decrementing stock.
    ///
    /// ## Errors
    /// * `Validation` - malformed id or non-positive quantity
    /// * `NotFound` - unknown medicine or customer
    /// * `InsufficientStock` - stock is below the requested quantity
    /// * `Unpriced` - the medicine's price is zero
    pub async fn record(&self, form: &SaleForm) -> DbResult<Sale> {
        let input = form.validate()?;
        self.insert(&input).await
    }

    /// Records an already validated sale.
    pub async fn insert(&self, input: &NewSale) -> DbResult<Sale> {
        debug!(
            medicine_id = input.medicine_id,
            customer_id = input.customer_id,
            quantity = input.quantity,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await.map_err(transaction_failed)?;

        let medicine = match find_medicine(&mut *tx, input.medicine_id).await? {
            Some(medicine) => medicine,
            None => {
                warn!(medicine_id = input.medicine_id, "Rejected sale: unknown medicine");
                return Err(DbError::not_found("Medicine", input.medicine_id));
            }
        };

        if !medicine.can_sell(input.quantity) {
            warn!(
                medicine_id = medicine.id,
                available = medicine.quantity,
                requested = input.quantity,
                "Rejected sale: insufficient stock"
            );
            return Err(DbError::InsufficientStock {
                medicine_id: medicine.id,
                available: medicine.quantity,
                requested: input.quantity,
            });
        }

        if find_customer(&mut *tx, input.customer_id).await?.is_none() {
            warn!(customer_id = input.customer_id, "Rejected sale: unknown customer");
            return Err(DbError::not_found("Customer", input.customer_id));
        }

        let quote = medicine.quote_sale(input.quantity).map_err(|e| {
            warn!(medicine_id = medicine.id, error = %e, "Rejected sale");
            DbError::from(e)
        })?;

        let id = sqlx::query(
            r#"
            INSERT INTO sales (
                medicine_id, customer_id, quantity, unit_price_cents,
                total_cents, pharmacist, sold_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(quote.medicine_id)
        .bind(input.customer_id)
        .bind(quote.quantity)
        .bind(quote.unit_price.cents())
        .bind(quote.total.cents())
        .bind(&input.pharmacist)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        // Guarded decrement: stock can never go negative
        let decremented = sqlx::query(
            r#"
            UPDATE medicines
            SET quantity = quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(quote.medicine_id)
        .bind(quote.quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            warn!(medicine_id = quote.medicine_id, "Rejected sale: stock changed underneath");
            return Err(DbError::InsufficientStock {
                medicine_id: quote.medicine_id,
                available: medicine.quantity,
                requested: quote.quantity,
            });
        }

        let sale = find_sale(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("sale {id} vanished after insert")))?;

        tx.commit().await.map_err(transaction_failed)?;

        info!(
            id,
            medicine_id = sale.medicine_id,
            quantity = sale.quantity,
            total = %sale.total(),
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        find_sale(&self.pool, id).await
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use pharma_core::{MedicineForm, MedicinePatchForm, Money, UNKNOWN_PHARMACIST};

    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::Database;
    use crate::repository::fixtures::{claire, database, paracetamol, sale};

    /// Paracetamol (10 in stock at 5.00) and one customer.
    async fn stocked() -> (Database, i64, i64) {
        let db = database().await;
        let medicine = db.medicines().add(&paracetamol()).await.unwrap();
        let customer = db.customers().add(&claire()).await.unwrap();
        (db, medicine.id, customer.id)
    }

    async fn stock(db: &Database, medicine_id: i64) -> i64 {
        db.medicines()
            .get_by_id(medicine_id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock() {
        let (db, medicine_id, customer_id) = stocked().await;

        let recorded = db
            .sales()
            .record(&sale(medicine_id, customer_id, "3"))
            .await
            .unwrap();

        assert_eq!(stock(&db, medicine_id).await, 7);
        assert_eq!(recorded.quantity, 3);
        assert_eq!(recorded.unit_price(), Money::from_cents(500));
        assert_eq!(recorded.total(), Money::from_cents(1500));
        assert_eq!(recorded.total().to_string(), "15.00");
        assert_eq!(recorded.customer_id, Some(customer_id));
        assert_eq!(recorded.pharmacist, "Dr. Lambert");

        let stored = db.sales().get_by_id(recorded.id).await.unwrap().unwrap();
        assert_eq!(stored, recorded);
    }

    #[tokio::test]
    async fn test_consecutive_sales() {
        let (db, medicine_id, customer_id) = stocked().await;
        let repo = db.sales();

        repo.record(&sale(medicine_id, customer_id, "4")).await.unwrap();
        repo.record(&sale(medicine_id, customer_id, "6")).await.unwrap();

        assert_eq!(stock(&db, medicine_id).await, 0);
        assert_eq!(repo.count().await.unwrap(), 2);

        let err = repo
            .record(&sale(medicine_id, customer_id, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let (db, medicine_id, customer_id) = stocked().await;

        let err = db
            .sales()
            .record(&sale(medicine_id, customer_id, "11"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            DbError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            }
        ));
        assert_eq!(stock(&db, medicine_id).await, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let (db, medicine_id, customer_id) = stocked().await;

        let err = db
            .sales()
            .record(&sale(99, customer_id, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = db
            .sales()
            .record(&sale(medicine_id, 99, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Customer not found: 99");

        assert_eq!(stock(&db, medicine_id).await, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_sale_form() {
        let (db, medicine_id, customer_id) = stocked().await;

        for form in [
            sale(medicine_id, customer_id, "0"),
            sale(medicine_id, customer_id, "-2"),
            sale(medicine_id, customer_id, "two"),
            SaleForm {
                medicine_id: "abc".to_string(),
                ..sale(medicine_id, customer_id, "1")
            },
            SaleForm {
                customer_id: String::new(),
                ..sale(medicine_id, customer_id, "1")
            },
        ] {
            let err = db.sales().record(&form).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_free_medicine_cannot_be_sold() {
        let db = database().await;
        let medicine = db
            .medicines()
            .add(&MedicineForm {
                price: "0".to_string(),
                ..paracetamol()
            })
            .await
            .unwrap();
        let customer = db.customers().add(&claire()).await.unwrap();

        let err = db
            .sales()
            .record(&sale(medicine.id, customer.id, "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Unpriced { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(stock(&db, medicine.id).await, 10);
    }

    #[tokio::test]
    async fn test_pharmacist_defaults_to_unknown() {
        let (db, medicine_id, customer_id) = stocked().await;

        let recorded = db
            .sales()
            .record(&SaleForm {
                pharmacist: None,
                ..sale(medicine_id, customer_id, "1")
            })
            .await
            .unwrap();

        assert_eq!(recorded.pharmacist, UNKNOWN_PHARMACIST);
    }

    #[tokio::test]
    async fn test_sale_keeps_price_at_time_of_sale() {
        let (db, medicine_id, customer_id) = stocked().await;
        let recorded = db
            .sales()
            .record(&sale(medicine_id, customer_id, "2"))
            .await
            .unwrap();

        db.medicines()
            .update(
                medicine_id,
                &MedicinePatchForm {
                    price: Some("9.99".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = db.sales().get_by_id(recorded.id).await.unwrap().unwrap();
        assert_eq!(stored.unit_price_cents, 500);
        assert_eq!(stored.total_cents, 1000);
    }

    #[tokio::test]
    async fn test_referenced_medicine_cannot_be_deleted() {
        let (db, medicine_id, customer_id) = stocked().await;
        db.sales()
            .record(&sale(medicine_id, customer_id, "1"))
            .await
            .unwrap();

        let err = db.medicines().delete(medicine_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(db.medicines().get_by_id(medicine_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_customer_keeps_sales() {
        let (db, medicine_id, customer_id) = stocked().await;
        let recorded = db
            .sales()
            .record(&sale(medicine_id, customer_id, "1"))
            .await
            .unwrap();

        db.customers().delete(customer_id).await.unwrap();

        let stored = db.sales().get_by_id(recorded.id).await.unwrap().unwrap();
        assert_eq!(stored.customer_id, None);
        assert_eq!(stored.total_cents, recorded.total_cents);
    }

    #[tokio::test]
    async fn test_failed_decrement_rolls_back_sale() {
        let (db, medicine_id, customer_id) = stocked().await;

        // Make the stock decrement fail after the sale row is inserted
        sqlx::query(
            "CREATE TRIGGER stock_locked BEFORE UPDATE OF quantity ON medicines
             BEGIN SELECT RAISE(ABORT, 'stock locked'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .sales()
            .record(&sale(medicine_id, customer_id, "3"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("stock locked"));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db.reports().sales().await.unwrap().is_empty());
        assert_eq!(stock(&db, medicine_id).await, 10);
    }

    #[tokio::test]
    async fn test_storage_rejects_negative_stock() {
        let (db, medicine_id, _) = stocked().await;

        let err = sqlx::query("UPDATE medicines SET quantity = -1 WHERE id = ?1")
            .bind(medicine_id)
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(stock(&db, medicine_id).await, 10);
    }
}
