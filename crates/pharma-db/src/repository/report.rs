//! # Report Repository
//!
//! Read-only list queries feeding the presentation layer's tables.
//!
//! The sale history is a LEFT JOIN: a sale whose customer was deleted
//! (`customer_id` set to NULL) is still listed, with no customer name.

use sqlx::SqlitePool;
use tracing::debug;

use pharma_core::{CustomerSummary, MedicineSummary, SaleHistoryRow};

use crate::error::DbResult;

/// Repository for the three list views.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// All medicines, ordered by id.
    pub async fn medicines(&self) -> DbResult<Vec<MedicineSummary>> {
        let rows = sqlx::query_as::<_, MedicineSummary>(
            r#"
            SELECT id, name, barcode, quantity, price_cents, expiration_date
            FROM medicines
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed medicines");
        Ok(rows)
    }

    /// All customers, ordered by id.
    pub async fn customers(&self) -> DbResult<Vec<CustomerSummary>> {
        let rows = sqlx::query_as::<_, CustomerSummary>(
            r#"
            SELECT id, last_name, first_name, birth_date, phone, insurance_number
            FROM customers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed customers");
        Ok(rows)
    }

    /// Sale history with medicine and customer names, ordered by id.
    pub async fn sales(&self) -> DbResult<Vec<SaleHistoryRow>> {
        let rows = sqlx::query_as::<_, SaleHistoryRow>(
            r#"
            SELECT
                s.id,
                m.name       AS medicine_name,
                c.last_name  AS customer_last_name,
                c.first_name AS customer_first_name,
                s.quantity,
                s.total_cents,
                s.sold_at
            FROM sales s
            LEFT JOIN medicines m ON m.id = s.medicine_id
            LEFT JOIN customers c ON c.id = s.customer_id
            ORDER BY s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sales");
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
