//! # Item Repository
//!
//! Database operations for inventory items.
//!
//! ## Key Operations
//! - CRUD and bulk create/delete
//! - Filtered, sorted, paginated search
//! - Whole-store statistics and distinct vendor/location lists
//! - Barcode lookups and selling
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Search Runs                                    │
//! │                                                                         │
//! │  SearchQuery { keyword: "dunk", vendor: "kream", sort_by: price, .. }  │
//! │       │                                                                 │
//! │       ▼  validate() ← limits, ranges (before any SQL)                  │
//! │       │                                                                 │
//! │       ▼  push_filters() ← same WHERE for both statements               │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │ WHERE 1 = 1                                                 │       │
//! │  │   AND (name LIKE ?  OR model_name LIKE ? OR vendor LIKE ?   │       │
//! │  │        OR notes LIKE ? OR barcode LIKE ?)                   │       │
//! │  │   AND vendor LIKE ?                                         │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │       │                                                                 │
//! │       ├──► SELECT COUNT(*) ...                     → total_count        │
//! │       └──► SELECT ... ORDER BY price_cents ASC, rowid ASC               │
//! │                     LIMIT ? OFFSET ?               → items              │
//! │                                                                         │
//! │  Both statements run in one read transaction.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sort columns come from the `SortField` whitelist, never from user text;
//! every user value is a bound parameter.

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use shoebox_core::validation::{apply_patch, normalize_text, validate_date_order};
use shoebox_core::{
    InventoryItem, InventoryStats, ItemPatch, Money, NewItem, SearchQuery, SearchResult,
    SellOutcome,
};

use crate::error::DbResult;
use crate::repository::barcode::upsert_with;

/// Column list shared by every item SELECT.
const ITEM_COLUMNS: &str = "id, location, purchase_date, sale_date, model_name, name, size, \
                            vendor, price_cents, notes, barcode, created_at, updated_at";

/// Columns searched by the free-text keyword.
const KEYWORD_COLUMNS: [&str; 5] = ["name", "model_name", "vendor", "notes", "barcode"];

/// Rows per DELETE statement in `bulk_delete`.
const DELETE_CHUNK: usize = 500;

/// Repository for inventory item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.create(new_item).await?;
/// let page = repo.search(&SearchQuery::new().keyword("dunk")).await?;
/// let outcome = repo.sell(&item.id, today).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a validated item.
    ///
    /// A non-empty barcode is upserted into the barcode index in the same
    /// transaction.
    pub async fn create(&self, new: NewItem) -> DbResult<InventoryItem> {
        let item = InventoryItem::from_new(generate_item_id(), new, Utc::now());

        debug!(id = %item.id, model_name = %item.model_name, "Creating item");

        let mut tx = self.pool.begin().await?;
        insert_item(&mut *tx, &item).await?;
        tx.commit().await?;

        Ok(item)
    }

    /// Inserts a batch of validated items in one transaction.
    ///
    /// Either every item is stored or none is.
    pub async fn bulk_create(&self, items: Vec<NewItem>) -> DbResult<Vec<InventoryItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = items.len(), "Bulk creating items");

        let now = Utc::now();
        let items: Vec<InventoryItem> = items
            .into_iter()
            .map(|new| InventoryItem::from_new(generate_item_id(), new, now))
            .collect();

        let mut tx = self.pool.begin().await?;
        for item in &items {
            insert_item(&mut *tx, item).await?;
        }
        tx.commit().await?;

        Ok(items)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Some(item))` - Updated item
    /// * `Ok(None)` - No item with this id
    /// * `Err(DbError::Validation)` - Merged record breaks an invariant
    pub async fn update(&self, id: &str, patch: &ItemPatch) -> DbResult<Option<InventoryItem>> {
        debug!(id = %id, "Updating item");

        let mut tx = self.pool.begin().await?;

        let Some(existing) = fetch_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };

        let mut updated = apply_patch(&existing, patch)?;
        updated.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE inventory_items SET
                location = ?2,
                purchase_date = ?3,
                sale_date = ?4,
                model_name = ?5,
                name = ?6,
                size = ?7,
                vendor = ?8,
                price_cents = ?9,
                notes = ?10,
                barcode = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.location)
        .bind(updated.purchase_date)
        .bind(updated.sale_date)
        .bind(&updated.model_name)
        .bind(&updated.name)
        .bind(&updated.size)
        .bind(&updated.vendor)
        .bind(updated.price_cents)
        .bind(&updated.notes)
        .bind(&updated.barcode)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    /// Deletes an item. Returns `false` when the id did not exist.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes many items in one transaction, returning how many existed.
    pub async fn bulk_delete(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        debug!(count = ids.len(), "Bulk deleting items");

        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;

        for chunk in ids.chunks(DELETE_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM inventory_items WHERE id IN (");
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            deleted += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        Ok(deleted)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(InventoryItem))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut *conn, id).await
    }

    /// Lists items, newest first.
    pub async fn get_all(&self, limit: u32, offset: u32) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Runs a filtered, sorted, paginated search.
    ///
    /// The query is validated first; an invalid query never reaches SQL.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = repo
    ///     .search(&SearchQuery::new().keyword("dunk").sort(SortField::Price, SortOrder::Asc))
    ///     .await?;
    /// println!("{} of {}", page.items.len(), page.total_count);
    /// ```
    pub async fn search(&self, query: &SearchQuery) -> DbResult<SearchResult> {
        query.validate()?;

        debug!(
            keyword = ?query.keyword,
            sort_by = %query.sort_by,
            limit = query.limit,
            offset = query.offset,
            "Searching items"
        );

        let mut tx = self.pool.begin().await?;

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM inventory_items");
        push_filters(&mut count_qb, query);
        let total_count: i64 = count_qb.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM inventory_items"));
        push_filters(&mut qb, query);
        let direction = query.sort_order.as_sql();
        qb.push(format!(
            " ORDER BY {} {direction}, rowid {direction}",
            query.sort_by.column()
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset));

        let items = qb.build_query_as::<InventoryItem>().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        debug!(count = items.len(), total_count, "Search returned items");
        Ok(SearchResult::new(items, total_count, query.limit, query.offset))
    }

    /// Computes whole-store statistics. An empty store yields all zeros.
    pub async fn statistics(&self) -> DbResult<InventoryStats> {
        let (total, sold, in_stock_value, average, min, max): (i64, i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN sale_date IS NOT NULL THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN sale_date IS NULL THEN price_cents ELSE 0 END), 0),
                    COALESCE(CAST(ROUND(AVG(price_cents)) AS INTEGER), 0),
                    COALESCE(MIN(price_cents), 0),
                    COALESCE(MAX(price_cents), 0)
                FROM inventory_items
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(InventoryStats {
            total_items: total,
            sold_items: sold,
            in_stock_items: total - sold,
            in_stock_value: Money::from_cents(in_stock_value),
            average_price: Money::from_cents(average),
            min_price: Money::from_cents(min),
            max_price: Money::from_cents(max),
        })
    }

    /// Distinct non-blank vendors, sorted.
    pub async fn vendors(&self) -> DbResult<Vec<String>> {
        self.distinct("vendor").await
    }

    /// Distinct non-blank locations, sorted.
    pub async fn locations(&self) -> DbResult<Vec<String>> {
        self.distinct("location").await
    }

    async fn distinct(&self, column: &'static str) -> DbResult<Vec<String>> {
        let values = sqlx::query_scalar::<_, String>(&format!(
            "SELECT DISTINCT {column} FROM inventory_items \
             WHERE TRIM({column}) != '' ORDER BY {column}"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    /// Counts all items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Barcodes
    // =========================================================================

    /// Most recently created item with this barcode, sold or not.
    ///
    /// Used to pre-fill a new item when a known barcode is scanned again.
    pub async fn latest_by_barcode(&self, barcode: &str) -> DbResult<Option<InventoryItem>> {
        let Some(barcode) = normalize_text(Some(barcode)) else {
            return Ok(None);
        };

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE barcode = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Unsold items with this barcode, newest first.
    pub async fn unsold_by_barcode(&self, barcode: &str) -> DbResult<Vec<InventoryItem>> {
        let Some(barcode) = normalize_text(Some(barcode)) else {
            return Ok(Vec::new());
        };

        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE barcode = ?1 AND sale_date IS NULL \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(barcode)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Selling
    // =========================================================================

    /// Marks an item as sold.
    ///
    /// ## Outcomes
    /// ```text
    /// no such id            → SellOutcome::NotFound
    /// sale_date already set → SellOutcome::AlreadySold(item)   (date unchanged)
    /// otherwise             → SellOutcome::Sold(item)
    /// ```
    /// A sale date before the purchase date is a validation error.
    pub async fn sell(&self, id: &str, sale_date: NaiveDate) -> DbResult<SellOutcome> {
        debug!(id = %id, %sale_date, "Selling item");

        let mut tx = self.pool.begin().await?;

        let outcome = match fetch_by_id(&mut *tx, id).await? {
            None => SellOutcome::NotFound,
            Some(item) => sell_item(&mut *tx, item, sale_date).await?,
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Sells the newest unsold unit carrying `barcode`.
    pub async fn sell_by_barcode(&self, barcode: &str, sale_date: NaiveDate) -> DbResult<SellOutcome> {
        let Some(barcode) = normalize_text(Some(barcode)) else {
            return Ok(SellOutcome::NotFound);
        };

        debug!(barcode = %barcode, %sale_date, "Selling item by barcode");

        let mut tx = self.pool.begin().await?;

        let candidate = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE barcode = ?1 AND sale_date IS NULL \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(&barcode)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match candidate {
            None => SellOutcome::NotFound,
            Some(item) => sell_item(&mut *tx, item, sale_date).await?,
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<InventoryItem>> {
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

async fn insert_item(conn: &mut SqliteConnection, item: &InventoryItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_items (
            id, location, purchase_date, sale_date,
            model_name, name, size, vendor,
            price_cents, notes, barcode,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8,
            ?9, ?10, ?11,
            ?12, ?13
        )
        "#,
    )
    .bind(&item.id)
    .bind(&item.location)
    .bind(item.purchase_date)
    .bind(item.sale_date)
    .bind(&item.model_name)
    .bind(&item.name)
    .bind(&item.size)
    .bind(&item.vendor)
    .bind(item.price_cents)
    .bind(&item.notes)
    .bind(&item.barcode)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    if let Some(barcode) = &item.barcode {
        upsert_with(conn, barcode, &item.model_name, &item.name, item.created_at).await?;
    }

    Ok(())
}

async fn sell_item(
    conn: &mut SqliteConnection,
    mut item: InventoryItem,
    sale_date: NaiveDate,
) -> DbResult<SellOutcome> {
    if item.is_sold() {
        return Ok(SellOutcome::AlreadySold(item));
    }

    validate_date_order(item.purchase_date, Some(sale_date))?;

    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE inventory_items SET sale_date = ?2, updated_at = ?3 \
         WHERE id = ?1 AND sale_date IS NULL",
    )
    .bind(&item.id)
    .bind(sale_date)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(match fetch_by_id(conn, &item.id).await? {
            Some(current) => SellOutcome::AlreadySold(current),
            None => SellOutcome::NotFound,
        });
    }

    item.sale_date = Some(sale_date);
    item.updated_at = now;
    Ok(SellOutcome::Sold(item))
}

/// Appends the WHERE clause for a search.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &SearchQuery) {
    qb.push(" WHERE 1 = 1");

    if let Some(pattern) = like_pattern(query.keyword.as_deref()) {
        qb.push(" AND (");
        for (i, column) in KEYWORD_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        qb.push(")");
    }

    for (column, value) in [
        ("location", &query.location),
        ("model_name", &query.model_name),
        ("name", &query.name),
        ("vendor", &query.vendor),
        ("size", &query.size),
        ("barcode", &query.barcode),
    ] {
        if let Some(pattern) = like_pattern(value.as_deref()) {
            qb.push(" AND ")
                .push(column)
                .push(" LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }
    }

    for (clause, date) in [
        (" AND purchase_date >= ", query.purchase_date_from),
        (" AND purchase_date <= ", query.purchase_date_to),
        (" AND sale_date >= ", query.sale_date_from),
        (" AND sale_date <= ", query.sale_date_to),
    ] {
        if let Some(date) = date {
            qb.push(clause).push_bind(date);
        }
    }

    if let Some(min) = query.price_min {
        qb.push(" AND price_cents >= ").push_bind(min.cents());
    }
    if let Some(max) = query.price_max {
        qb.push(" AND price_cents <= ").push_bind(max.cents());
    }
}

/// `%term%` with LIKE wildcards in the term escaped. Blank terms filter nothing.
fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = normalize_text(term)?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Helper to generate a new item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
