//! # Barcode Repository
//!
//! The barcode side index: one row per distinct barcode holding the last
//! model/name written for it.
//!
//! ```text
//! upsert("123", "M1", "N1")  ──►  barcode_records: 123 | M1 | N1
//! upsert("123", "M2", "N2")  ──►  barcode_records: 123 | M2 | N2   (in place)
//! ```
//!
//! Item creation calls [`upsert_with`] on its own transaction so the item
//! row and the index row commit together.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use shoebox_core::validation::normalize_text;
use shoebox_core::BarcodeRecord;

use crate::error::DbResult;

/// Inserts or overwrites a barcode record on an existing connection.
///
/// Blank barcodes are ignored.
pub(crate) async fn upsert_with(
    conn: &mut SqliteConnection,
    barcode: &str,
    model_name: &str,
    name: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let Some(barcode) = normalize_text(Some(barcode)) else {
        return Ok(());
    };

    debug!(barcode = %barcode, "Upserting barcode record");

    sqlx::query(
        r#"
        INSERT INTO barcode_records (barcode, model_name, name, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        ON CONFLICT(barcode) DO UPDATE SET
            model_name = excluded.model_name,
            name = excluded.name,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&barcode)
    .bind(model_name)
    .bind(name)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for the barcode side index.
#[derive(Debug, Clone)]
pub struct BarcodeRepository {
    pool: SqlitePool,
}

impl BarcodeRepository {
    /// Creates a new BarcodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BarcodeRepository { pool }
    }

    /// Inserts a record, or overwrites model/name of an existing one.
    ///
    /// Last write wins; no history is kept.
    pub async fn upsert(&self, barcode: &str, model_name: &str, name: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert_with(&mut *tx, barcode, model_name, name, Utc::now()).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Gets the record for a barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(BarcodeRecord))` - Barcode known
    /// * `Ok(None)` - Never seen
    pub async fn get(&self, barcode: &str) -> DbResult<Option<BarcodeRecord>> {
        let record = sqlx::query_as::<_, BarcodeRecord>(
            r#"
            SELECT barcode, model_name, name, created_at, updated_at
            FROM barcode_records
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Number of distinct barcodes seen.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM barcode_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_overwrites_in_place() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let barcodes = db.barcodes();

        barcodes.upsert("123", "M1", "N1").await.unwrap();
        let first = barcodes.get("123").await.unwrap().unwrap();

        barcodes.upsert("123", "M2", "N2").await.unwrap();
        let second = barcodes.get("123").await.unwrap().unwrap();

        assert_eq!(second.model_name, "M2");
        assert_eq!(second.name, "N2");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(barcodes.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_blank_barcodes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let barcodes = db.barcodes();

        assert!(barcodes.get("nope").await.unwrap().is_none());

        barcodes.upsert("   ", "M1", "N1").await.unwrap();
        assert_eq!(barcodes.count().await.unwrap(), 0);
    }
}
