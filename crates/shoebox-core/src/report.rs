//! # Report Rendering
//!
//! The Export/Report Renderer: turns search results and statistics into
//! CSV or HTML bytes. Writing files is the caller's job.
//!
//! ## Outputs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SearchResult ──┬── Csv  ──► ID,위치,구매일,...,수정일시,바코드          │
//! │                 │            (re-importable: labels are import aliases) │
//! │                 │                                                       │
//! │  InventoryStats ┴── Html ──► title, stat cards, item table, footer     │
//! │                                                                         │
//! │  InventoryStats + vendors + locations ──► statistics report (HTML)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::query::SearchResult;
use crate::types::{InventoryItem, InventoryStats, ItemField};

/// Title used when the caller does not pass one.
pub const DEFAULT_REPORT_TITLE: &str = "재고 관리 보고서";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Format & Options
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Html,
}

impl ReportFormat {
    pub const fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv; charset=utf-8",
            ReportFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            _ => Err(ValidationError::NotAllowed {
                field: "format".to_string(),
                allowed: vec!["csv".to_string(), "html".to_string()],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub title: String,
    /// CSV only.
    pub include_headers: bool,
    /// Shown in the HTML footer (local wall-clock time).
    pub generated_at: NaiveDateTime,
}

impl ReportOptions {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        ReportOptions {
            title: DEFAULT_REPORT_TITLE.to_string(),
            include_headers: true,
            generated_at,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn include_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }
}

/// Renders a search result in the requested format.
pub fn render(
    result: &SearchResult,
    stats: &InventoryStats,
    format: ReportFormat,
    options: &ReportOptions,
) -> CoreResult<Vec<u8>> {
    match format {
        ReportFormat::Csv => render_csv(&result.items, options.include_headers),
        ReportFormat::Html => Ok(render_html(result, stats, options).into_bytes()),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// CSV header row.
pub fn csv_headers() -> Vec<&'static str> {
    let mut headers = vec!["ID"];
    headers.extend(
        ItemField::ALL
            .into_iter()
            .filter(|f| *f != ItemField::Barcode)
            .map(ItemField::label),
    );
    headers.extend(["생성일시", "수정일시", ItemField::Barcode.label()]);
    headers
}

fn csv_record(item: &InventoryItem) -> [String; 13] {
    [
        item.id.clone(),
        item.location.clone(),
        item.purchase_date.format(DATE_FORMAT).to_string(),
        item.sale_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        item.model_name.clone(),
        item.name.clone(),
        item.size.clone().unwrap_or_default(),
        item.vendor.clone(),
        item.price().to_string(),
        item.notes.clone().unwrap_or_default(),
        format_timestamp(&item.created_at),
        format_timestamp(&item.updated_at),
        item.barcode.clone().unwrap_or_default(),
    ]
}

/// Renders items as UTF-8 CSV.
pub fn render_csv(items: &[InventoryItem], include_headers: bool) -> CoreResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if include_headers {
        writer
            .write_record(csv_headers())
            .map_err(|e| CoreError::Render(e.to_string()))?;
    }
    for item in items {
        writer
            .write_record(csv_record(item))
            .map_err(|e| CoreError::Render(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::Render(e.to_string()))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

// =============================================================================
// HTML
// =============================================================================

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = r#"
        body { font-family: 'Malgun Gothic', 'Apple SD Gothic Neo', sans-serif; margin: 20px; background-color: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background-color: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1 { color: #333; text-align: center; margin-bottom: 30px; }
        h2 { color: #555; border-bottom: 2px solid #007bff; padding-bottom: 6px; }
        .stats { display: flex; flex-wrap: wrap; gap: 16px; margin-bottom: 30px; }
        .stat-card { flex: 1; min-width: 160px; background-color: #f8f9fa; padding: 15px; border-radius: 5px; text-align: center; }
        .stat-card h3 { margin: 0 0 10px 0; color: #666; font-size: 14px; }
        .stat-card .value { font-size: 22px; font-weight: bold; color: #007bff; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #007bff; color: white; }
        tr:nth-child(even) { background-color: #f2f2f2; }
        .status-sold { color: #dc3545; font-weight: bold; }
        .status-stock { color: #28a745; font-weight: bold; }
        .list-item { display: inline-block; background-color: #e9ecef; padding: 4px 10px; margin: 3px; border-radius: 12px; }
        .footer { margin-top: 30px; text-align: center; color: #666; font-size: 12px; }
"#;

fn push_head(html: &mut String, title: &str) {
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{}</title>\n    <style>{}    </style>\n</head>\n<body>\n<div class=\"container\">\n    <h1>{}</h1>\n",
        escape_html(title),
        STYLE,
        escape_html(title)
    );
}

fn push_stat_card(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "        <div class=\"stat-card\"><h3>{}</h3><div class=\"value\">{}</div></div>",
        label,
        escape_html(value)
    );
}

/// Formats a count with thousands separators.
fn format_count(count: i64) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut out = String::new();
    if count < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders the inventory report.
///
/// Stat cards show whole-store numbers; the table shows the result page.
pub fn render_html(result: &SearchResult, stats: &InventoryStats, options: &ReportOptions) -> String {
    let mut html = String::with_capacity(4096 + result.items.len() * 512);
    push_head(&mut html, &options.title);

    html.push_str("    <div class=\"stats\">\n");
    push_stat_card(&mut html, "전체 항목", &format_count(stats.total_items));
    push_stat_card(&mut html, "재고 항목", &format_count(stats.in_stock_items));
    push_stat_card(&mut html, "판매된 항목", &format_count(stats.sold_items));
    push_stat_card(&mut html, "총 재고 가치", &stats.in_stock_value.format_won());
    push_stat_card(&mut html, "평균 가격", &stats.average_price.format_won());
    html.push_str("    </div>\n");

    html.push_str("    <table>\n        <thead><tr>");
    for header in [
        "ID", "위치", "구매일", "판매일", "모델명", "이름", "사이즈", "구매처", "가격", "상태", "메모",
    ] {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr></thead>\n        <tbody>\n");

    for item in &result.items {
        let (status, class) = if item.is_sold() {
            ("판매됨", "status-sold")
        } else {
            ("재고", "status-stock")
        };
        let cells = [
            escape_html(&item.id),
            escape_html(&item.location),
            item.purchase_date.format(DATE_FORMAT).to_string(),
            item.sale_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            escape_html(&item.model_name),
            escape_html(&item.name),
            escape_html(item.size.as_deref().unwrap_or("")),
            escape_html(&item.vendor),
            item.price().format_won(),
        ];
        html.push_str("            <tr>");
        for cell in cells {
            let _ = write!(html, "<td>{}</td>", cell);
        }
        let _ = write!(
            html,
            "<td class=\"{}\">{}</td><td>{}</td></tr>\n",
            class,
            status,
            escape_html(item.notes.as_deref().unwrap_or(""))
        );
    }
    html.push_str("        </tbody>\n    </table>\n");

    let _ = write!(
        html,
        "    <div class=\"footer\">\n        <p>보고서 생성일시: {}</p>\n        <p>총 {}개 항목 (전체 {}개 중)</p>\n    </div>\n</div>\n</body>\n</html>\n",
        options.generated_at.format(DATETIME_FORMAT),
        format_count(result.items.len() as i64),
        format_count(result.total_count)
    );

    html
}

/// Renders the statistics report with vendor and location lists.
pub fn render_stats_html(
    stats: &InventoryStats,
    vendors: &[String],
    locations: &[String],
    generated_at: NaiveDateTime,
) -> String {
    let mut html = String::with_capacity(4096);
    push_head(&mut html, "재고 통계 보고서");

    html.push_str("    <h2>기본 통계</h2>\n    <div class=\"stats\">\n");
    push_stat_card(&mut html, "전체 항목", &format_count(stats.total_items));
    push_stat_card(&mut html, "재고 항목", &format_count(stats.in_stock_items));
    push_stat_card(&mut html, "판매된 항목", &format_count(stats.sold_items));
    push_stat_card(&mut html, "총 재고 가치", &stats.in_stock_value.format_won());
    push_stat_card(&mut html, "평균 가격", &stats.average_price.format_won());
    push_stat_card(&mut html, "최고 가격", &stats.max_price.format_won());
    push_stat_card(&mut html, "최저 가격", &stats.min_price.format_won());
    html.push_str("    </div>\n");

    for (heading, values) in [("구매처 목록", vendors), ("위치 목록", locations)] {
        let _ = writeln!(html, "    <h2>{}</h2>\n    <div class=\"list\">", heading);
        for value in values {
            let _ = writeln!(
                html,
                "        <span class=\"list-item\">{}</span>",
                escape_html(value)
            );
        }
        html.push_str("    </div>\n");
    }

    let _ = write!(
        html,
        "    <div class=\"footer\">\n        <p>보고서 생성일시: {}</p>\n    </div>\n</div>\n</body>\n</html>\n",
        generated_at.format(DATETIME_FORMAT)
    );

    html
}

// =============================================================================
// Unit Tests
// =============================================================================
