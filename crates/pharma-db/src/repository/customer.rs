//! # Customer Repository
//!
//! Database operations for customers. No uniqueness constraint applies, and
//! deleting a customer is never blocked: their sales keep a null customer
//! reference (`ON DELETE SET NULL`).

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use pharma_core::{Customer, CustomerForm, CustomerPatch, CustomerPatchForm, NewCustomer};

use crate::error::{DbError, DbResult};
use crate::repository::transaction_failed;

/// Fetches one customer on any executor (pool or open transaction).
pub(crate) async fn find_customer<'e, E>(executor: E, id: i64) -> DbResult<Option<Customer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, last_name, first_name, birth_date, phone, insurance_number,
               created_at, updated_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Validates and adds a customer.
    pub async fn add(&self, form: &CustomerForm) -> DbResult<Customer> {
        let input = form.validate()?;
        self.insert(&input).await
    }

    /// Inserts an already validated customer.
    pub async fn insert(&self, input: &NewCustomer) -> DbResult<Customer> {
        debug!(last_name = %input.last_name, "Inserting customer");

        let mut tx = self.pool.begin().await.map_err(transaction_failed)?;

        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO customers (
                last_name, first_name, birth_date, phone, insurance_number,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(input.birth_date)
        .bind(&input.phone)
        .bind(&input.insurance_number)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let customer = find_customer(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("customer {id} vanished after insert")))?;

        tx.commit().await.map_err(transaction_failed)?;

        info!(id, "Customer added");
        Ok(customer)
    }

    /// Applies a sparse update; absent fields are left unchanged.
    ///
    /// A form with nothing to change succeeds without touching storage.
    ///
    /// ## Errors
    /// * `Validation` - a supplied field failed its rule
    /// * `NotFound` - no customer with this id
    pub async fn update(&self, id: i64, form: &CustomerPatchForm) -> DbResult<()> {
        let patch = form.validate()?;
        self.apply(id, &patch).await
    }

    /// Applies an already validated patch.
    pub async fn apply(&self, id: i64, patch: &CustomerPatch) -> DbResult<()> {
        if patch.is_empty() {
            debug!(id, "Empty customer patch, nothing to update");
            return Ok(());
        }

        debug!(id, ?patch, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                last_name        = COALESCE(?1, last_name),
                first_name       = COALESCE(?2, first_name),
                birth_date       = COALESCE(?3, birth_date),
                phone            = CASE WHEN ?4 THEN ?5 ELSE phone END,
                insurance_number = CASE WHEN ?6 THEN ?7 ELSE insurance_number END,
                updated_at       = ?8
            WHERE id = ?9
            "#,
        )
        .bind(&patch.last_name)
        .bind(&patch.first_name)
        .bind(patch.birth_date)
        .bind(patch.phone.is_some())
        .bind(patch.phone.clone().flatten())
        .bind(patch.insurance_number.is_some())
        .bind(patch.insurance_number.clone().flatten())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(id, "Rejected customer update: not found");
            return Err(DbError::not_found("Customer", id));
        }

        info!(id, "Customer updated");
        Ok(())
    }

    /// Deletes a customer; their sales stay, with no customer.
    ///
    /// ## Errors
    /// * `NotFound` - no customer with this id
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(id, "Rejected customer delete: not found");
            return Err(DbError::not_found("Customer", id));
        }

        info!(id, "Customer deleted");
        Ok(())
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        find_customer(&self.pool, id).await
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
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
    use chrono::NaiveDate;

    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::fixtures::{claire, database};

    #[tokio::test]
    async fn test_add_and_get() {
        let db = database().await;
        let repo = db.customers();

        let customer = repo.add(&claire()).await.unwrap();
        assert_eq!(customer.full_name(), "Claire Martin");
        assert_eq!(
            customer.birth_date,
            NaiveDate::from_ymd_opt(1985, 4, 2).unwrap()
        );
        assert_eq!(customer.phone.as_deref(), Some("+123456"));

        let fetched = repo.get_by_id(customer.id).await.unwrap().unwrap();
        assert_eq!(fetched, customer);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_phone_rules() {
        let db = database().await;
        let repo = db.customers();

        let err = repo
            .add(&CustomerForm {
                phone: Some("abc".to_string()),
                ..claire()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.add(&CustomerForm {
            phone: Some("+123456".to_string()),
            ..claire()
        })
        .await
        .unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_homonyms_allowed() {
        let db = database().await;
        let repo = db.customers();

        repo.add(&claire()).await.unwrap();
        repo.add(&claire()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_is_sparse() {
        let db = database().await;
        let repo = db.customers();
        let before = repo.add(&claire()).await.unwrap();

        repo.update(
            before.id,
            &CustomerPatchForm {
                phone: Some("0612345678".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = repo.get_by_id(before.id).await.unwrap().unwrap();
        assert_eq!(after.phone.as_deref(), Some("0612345678"));
        assert_eq!(after.last_name, before.last_name);
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.birth_date, before.birth_date);
        assert_eq!(after.insurance_number, before.insurance_number);
    }

    #[tokio::test]
    async fn test_update_clears_phone() {
        let db = database().await;
        let repo = db.customers();
        let before = repo.add(&claire()).await.unwrap();

        repo.update(
            before.id,
            &CustomerPatchForm {
                phone: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = repo.get_by_id(before.id).await.unwrap().unwrap();
        assert_eq!(after.phone, None);
        assert_eq!(after.insurance_number, before.insurance_number);
    }

    #[tokio::test]
    async fn test_empty_update_leaves_customer_unchanged() {
        let db = database().await;
        let repo = db.customers();
        let before = repo.add(&claire()).await.unwrap();

        repo.update(before.id, &CustomerPatchForm::default())
            .await
            .unwrap();

        let after = repo.get_by_id(before.id).await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let db = database().await;
        let repo = db.customers();
        let before = repo.add(&claire()).await.unwrap();

        let err = repo
            .update(
                before.id,
                &CustomerPatchForm {
                    last_name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_customer() {
        let db = database().await;
        let repo = db.customers();

        let err = repo
            .update(
                7,
                &CustomerPatchForm {
                    first_name: Some("Lucie".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = repo.delete(7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = database().await;
        let repo = db.customers();
        let customer = repo.add(&claire()).await.unwrap();

        repo.delete(customer.id).await.unwrap();
        assert!(repo.get_by_id(customer.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
