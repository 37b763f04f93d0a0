//! # Medicine Repository
//!
//! Database operations for medicines.
//!
//! ## Key Operations
//! - Add with barcode uniqueness check
//! - Sparse update over a closed set of columns
//! - Delete, blocked while sales reference the medicine
//! - Lookups by id and barcode
//!
//! ## Sparse Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MedicinePatch { quantity: Some(7), barcode: Some(None), .. }          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE medicines SET                                                  │
//! │      barcode     = CASE WHEN ?2 THEN ?3 ELSE barcode END, ← NULL       │
//! │      quantity    = COALESCE(?5, quantity),    ← 7                      │
//! │      price_cents = COALESCE(?6, price_cents), ← NULL → unchanged       │
//! │      ...                                                               │
//! │  WHERE id = ?10                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nullable columns take a "supplied" flag next to their value so a patch
//! can set them to NULL.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use pharma_core::{Medicine, MedicineForm, MedicinePatch, MedicinePatchForm, NewMedicine};

use crate::error::{DbError, DbResult};
use crate::repository::{today, transaction_failed};

/// Fetches one medicine on any executor (pool or open transaction).
pub(crate) async fn find_medicine<'e, E>(executor: E, id: i64) -> DbResult<Option<Medicine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let medicine = sqlx::query_as::<_, Medicine>(
        r#"
        SELECT id, name, barcode, description, quantity, price_cents,
               expiration_date, created_at, updated_at
        FROM medicines
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(medicine)
}

/// Id of the medicine holding `barcode`, other than `except_id`.
async fn barcode_owner<'e, E>(executor: E, barcode: &str, except_id: i64) -> DbResult<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let owner = sqlx::query_scalar("SELECT id FROM medicines WHERE barcode = ?1 AND id != ?2")
        .bind(barcode)
        .bind(except_id)
        .fetch_optional(executor)
        .await?;

    Ok(owner)
}

/// Repository for medicine database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.medicines();
///
/// let medicine = repo.add(&form).await?;
/// repo.update(medicine.id, &MedicinePatchForm { quantity: Some("7".into()), ..Default::default() }).await?;
/// repo.delete(medicine.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    /// Creates a new MedicineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// Validates and adds a medicine.
    ///
    /// ## Errors
    /// * `Validation` - a field rule failed (nothing is written)
    /// * `UniqueViolation` - the barcode belongs to another medicine
    pub async fn add(&self, form: &MedicineForm) -> DbResult<Medicine> {
        let input = form.validate(today())?;
        self.insert(&input).await
    }

    /// Inserts an already validated medicine.
    pub async fn insert(&self, input: &NewMedicine) -> DbResult<Medicine> {
        debug!(name = %input.name, barcode = ?input.barcode, "Inserting medicine");

        let mut tx = self.pool.begin().await.map_err(transaction_failed)?;

        if let Some(barcode) = &input.barcode {
            if barcode_owner(&mut *tx, barcode, 0).await?.is_some() {
                warn!(barcode = %barcode, "Rejected medicine: duplicate barcode");
                return Err(DbError::duplicate("barcode", barcode.clone()));
            }
        }

        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO medicines (
                name, barcode, description, quantity, price_cents,
                expiration_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&input.name)
        .bind(&input.barcode)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.price.cents())
        .bind(input.expiration_date)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let medicine = find_medicine(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("medicine {id} vanished after insert")))?;

        tx.commit().await.map_err(transaction_failed)?;

        info!(id, name = %medicine.name, "Medicine added");
        Ok(medicine)
    }

    /// Applies a sparse update; absent fields are left unchanged.
    ///
    /// A form with nothing to change succeeds without touching storage.
    ///
    /// ## Errors
    /// * `Validation` - a supplied field failed its rule
    /// * `NotFound` - no medicine with this id
    /// * `UniqueViolation` - the new barcode belongs to another medicine
    pub async fn update(&self, id: i64, form: &MedicinePatchForm) -> DbResult<()> {
        let patch = form.validate(today())?;
        self.apply(id, &patch).await
    }

    /// Applies an already validated patch.
    pub async fn apply(&self, id: i64, patch: &MedicinePatch) -> DbResult<()> {
        if patch.is_empty() {
            debug!(id, "Empty medicine patch, nothing to update");
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(transaction_failed)?;

        if find_medicine(&mut *tx, id).await?.is_none() {
            warn!(id, "Rejected medicine update: not found");
            return Err(DbError::not_found("Medicine", id));
        }

        if let Some(Some(barcode)) = &patch.barcode {
            if barcode_owner(&mut *tx, barcode, id).await?.is_some() {
                warn!(id, barcode = %barcode, "Rejected medicine update: duplicate barcode");
                return Err(DbError::duplicate("barcode", barcode.clone()));
            }
        }

        debug!(id, ?patch, "Updating medicine");

        sqlx::query(
            r#"
            UPDATE medicines SET
                name            = COALESCE(?1, name),
                barcode         = CASE WHEN ?2 THEN ?3 ELSE barcode END,
                description     = COALESCE(?4, description),
                quantity        = COALESCE(?5, quantity),
                price_cents     = COALESCE(?6, price_cents),
                expiration_date = CASE WHEN ?7 THEN ?8 ELSE expiration_date END,
                updated_at      = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&patch.name)
        .bind(patch.barcode.is_some())
        .bind(patch.barcode.clone().flatten())
        .bind(&patch.description)
        .bind(patch.quantity)
        .bind(patch.price.map(|p| p.cents()))
        .bind(patch.expiration_date.is_some())
        .bind(patch.expiration_date.flatten())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(transaction_failed)?;

        info!(id, "Medicine updated");
        Ok(())
    }

    /// Deletes a medicine.
    ///
    /// ## Errors
    /// * `NotFound` - no medicine with this id
    /// * `StillReferenced` - sales reference the medicine (restrict policy)
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await.map_err(transaction_failed)?;

        if find_medicine(&mut *tx, id).await?.is_none() {
            warn!(id, "Rejected medicine delete: not found");
            return Err(DbError::not_found("Medicine", id));
        }

        let references: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE medicine_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if references > 0 {
            warn!(id, references, "Rejected medicine delete: referenced by sales");
            return Err(DbError::StillReferenced {
                entity: "Medicine".to_string(),
                id,
                references,
            });
        }

        sqlx::query("DELETE FROM medicines WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(transaction_failed)?;

        info!(id, "Medicine deleted");
        Ok(())
    }

    /// Gets a medicine by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Medicine))` - Medicine found
    /// * `Ok(None)` - Medicine not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Medicine>> {
        find_medicine(&self.pool, id).await
    }

    /// Gets a medicine by barcode (scanner lookup).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Medicine>> {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT id, name, barcode, description, quantity, price_cents,
                   expiration_date, created_at, updated_at
            FROM medicines
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(medicine)
    }

    /// Counts all medicines.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
