//! # Export Service
//!
//! Runs searches and writes CSV / HTML reports to disk. The rendering itself
//! is pure (`shoebox_core::report`); this module adds the store reads and
//! the file writes.

use std::path::Path;

use chrono::Local;
use tracing::info;

use shoebox_core::report::{self, render_stats_html};
use shoebox_core::query::MAX_LIMIT;
use shoebox_core::{InventoryStats, ReportFormat, ReportOptions, SearchQuery, SearchResult};

use crate::error::DbResult;
use crate::repository::item::ItemRepository;

/// Writes inventory reports.
#[derive(Debug, Clone)]
pub struct ExportService {
    items: ItemRepository,
}

impl ExportService {
    pub fn new(items: ItemRepository) -> Self {
        ExportService { items }
    }

    /// Renders a report in memory.
    ///
    /// `None` exports every item; `Some(query)` exports exactly that page.
    /// The HTML statistics cards always describe the whole store.
    pub async fn render(
        &self,
        query: Option<SearchQuery>,
        format: ReportFormat,
        options: &ReportOptions,
    ) -> DbResult<Vec<u8>> {
        let result = self.collect(query).await?;
        let stats = self.items.statistics().await?;
        Ok(report::render(&result, &stats, format, options)?)
    }

    /// Writes matching items as CSV. Returns the number of rows written.
    pub async fn export_csv(
        &self,
        path: impl AsRef<Path>,
        query: Option<SearchQuery>,
        include_headers: bool,
    ) -> DbResult<usize> {
        let path = path.as_ref();
        let result = self.collect(query).await?;
        let bytes = report::render_csv(&result.items, include_headers)?;

        write_file(path, &bytes).await?;

        info!(path = %path.display(), count = result.items.len(), "Exported CSV");
        Ok(result.items.len())
    }

    /// Writes matching items as an HTML report. Returns the number of rows.
    pub async fn export_html(
        &self,
        path: impl AsRef<Path>,
        query: Option<SearchQuery>,
        title: Option<&str>,
    ) -> DbResult<usize> {
        let path = path.as_ref();
        let mut options = ReportOptions::new(Local::now().naive_local());
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            options = options.title(title);
        }

        let result = self.collect(query).await?;
        let stats = self.items.statistics().await?;
        let html = report::render_html(&result, &stats, &options);

        write_file(path, html.as_bytes()).await?;

        info!(path = %path.display(), count = result.items.len(), "Exported HTML report");
        Ok(result.items.len())
    }

    /// Writes the statistics report (totals plus vendor and location lists).
    pub async fn export_stats(&self, path: impl AsRef<Path>) -> DbResult<InventoryStats> {
        let path = path.as_ref();
        let stats = self.items.statistics().await?;
        let vendors = self.items.vendors().await?;
        let locations = self.items.locations().await?;

        let html = render_stats_html(&stats, &vendors, &locations, Local::now().naive_local());
        write_file(path, html.as_bytes()).await?;

        info!(path = %path.display(), "Exported statistics report");
        Ok(stats)
    }

    /// Runs the given page, or walks every page of the unfiltered search.
    async fn collect(&self, query: Option<SearchQuery>) -> DbResult<SearchResult> {
        if let Some(query) = query {
            return self.items.search(&query).await;
        }

        let mut query = SearchQuery::all();
        let mut items = Vec::new();
        loop {
            let page = self.items.search(&query).await?;
            let has_more = page.has_more;
            items.extend(page.items);
            if !has_more {
                break;
            }
            query.offset += MAX_LIMIT;
        }

        let total = items.len() as i64;
        Ok(SearchResult::new(items, total, MAX_LIMIT, 0))
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> DbResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportOptions;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use shoebox_core::{InventorySettings, Money, NewItem};

    fn new_item(model_name: &str, price: i64, barcode: Option<&str>) -> NewItem {
        NewItem {
            location: "A-01".into(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            sale_date: None,
            model_name: model_name.into(),
            name: format!("{model_name} <Special>"),
            size: Some("270".into()),
            vendor: "KREAM".into(),
            price: Money::from_units(price),
            notes: Some("memo, with comma".into()),
            barcode: barcode.map(str::to_string),
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items()
            .bulk_create(vec![
                new_item("M1", 100_000, Some("8801")),
                new_item("M2", 50_000, None),
                new_item("M3", 75_000, None),
            ])
            .await
            .unwrap();
        let sold = db.items().latest_by_barcode("8801").await.unwrap().unwrap();
        db.items()
            .sell(&sold.id, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_export_csv_round_trip() {
        let source = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("inventory.csv");

        let written = source.exporter().export_csv(&path, None, true).await.unwrap();
        assert_eq!(written, 3);

        let target = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = target
            .importer(InventorySettings::default())
            .import_file(&path, &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(result.success_count, 3);
        assert_eq!(result.error_count, 0);

        let key = |item: &shoebox_core::InventoryItem| {
            (
                item.location.clone(),
                item.purchase_date,
                item.sale_date,
                item.model_name.clone(),
                item.name.clone(),
                item.size.clone(),
                item.vendor.clone(),
                item.price_cents,
                item.notes.clone(),
                item.barcode.clone(),
            )
        };
        let mut before: Vec<_> = source.items().get_all(100, 0).await.unwrap().iter().map(key).collect();
        let mut after: Vec<_> = target.items().get_all(100, 0).await.unwrap().iter().map(key).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_export_csv_with_query_and_no_headers() {
        let db = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kream.csv");

        let query = SearchQuery::new().keyword("M2");
        let written = db.exporter().export_csv(&path, Some(query), false).await.unwrap();
        assert_eq!(written, 1);

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.starts_with("ID,"));
    }

    #[tokio::test]
    async fn test_export_html_escapes_and_counts() {
        let db = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        let written = db
            .exporter()
            .export_html(&path, None, Some("월간 <재고>"))
            .await
            .unwrap();
        assert_eq!(written, 3);

        let html = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(html.contains("월간 &lt;재고&gt;"));
        assert!(html.contains("M1 &lt;Special&gt;"));
        assert!(!html.contains("<Special>"));
        assert!(html.contains("판매됨"));
    }

    #[tokio::test]
    async fn test_export_stats() {
        let db = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.html");

        let stats = db.exporter().export_stats(&path).await.unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.sold_items, 1);

        let html = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(html.contains("KREAM"));
        assert!(html.contains("A-01"));
    }

    #[tokio::test]
    async fn test_render_in_memory() {
        let db = seeded().await;
        let options = ReportOptions::new(Local::now().naive_local());

        let csv = db.exporter().render(None, ReportFormat::Csv, &options).await.unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert!(text.starts_with("ID,위치,구매일"));
        assert_eq!(text.lines().count(), 4);
    }
}
