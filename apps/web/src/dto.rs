//! # Request / Response DTOs
//!
//! Wire shapes for the JSON API. Domain types stay in `shoebox-core`; these
//! add presentation fields (formatted price, status) and query-string
//! parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use shoebox_core::{
    BarcodeAutofill, InventoryItem, Money, SearchQuery, SearchResult, SortField, SortOrder,
    ValidationError,
};

/// Page size when the client sends none.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Item as returned by the API.
///
/// Carries both `price_cents` (exact) and `price` (`"139000.00"`), plus the
/// `₩` display form used by the reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDto {
    pub id: String,
    pub location: String,
    pub purchase_date: String,
    pub sale_date: Option<String>,
    pub model_name: String,
    pub name: String,
    pub size: Option<String>,
    pub vendor: String,
    pub price_cents: i64,
    pub price: String,
    pub price_display: String,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    pub is_sold: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<InventoryItem> for ItemDto {
    fn from(item: InventoryItem) -> Self {
        let price = item.price();
        let is_sold = item.is_sold();
        ItemDto {
            id: item.id,
            location: item.location,
            purchase_date: item.purchase_date.to_string(),
            sale_date: item.sale_date.map(|d| d.to_string()),
            model_name: item.model_name,
            name: item.name,
            size: item.size,
            vendor: item.vendor,
            price_cents: item.price_cents,
            price: price.to_string(),
            price_display: price.format_won(),
            notes: item.notes,
            barcode: item.barcode,
            is_sold,
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResponse {
    pub items: Vec<ItemDto>,
    pub total_count: i64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
    pub page: u32,
    pub page_size: u32,
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        let page_size = result.limit.max(1);
        SearchResponse {
            page: result.offset / page_size + 1,
            page_size,
            total_count: result.total_count,
            limit: result.limit,
            offset: result.offset,
            has_more: result.has_more,
            items: result.items.into_iter().map(ItemDto::from).collect(),
        }
    }
}

/// Query string of `GET /api/items` and the report endpoints.
///
/// Dates are `YYYY-MM-DD`; prices accept the same text as CSV import.
/// Blank values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub model_name: Option<String>,
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub size: Option<String>,
    pub barcode: Option<String>,
    pub purchase_date_from: Option<String>,
    pub purchase_date_to: Option<String>,
    pub sale_date_from: Option<String>,
    pub sale_date_to: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort_by: Option<String>,
    /// `asc` / `desc`; overrides `sort_desc`.
    pub sort_order: Option<String>,
    pub sort_desc: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl SearchParams {
    /// True when no filter is set (sort and page are ignored).
    pub fn has_filters(&self) -> bool {
        [
            &self.keyword,
            &self.location,
            &self.model_name,
            &self.name,
            &self.vendor,
            &self.size,
            &self.barcode,
            &self.purchase_date_from,
            &self.purchase_date_to,
            &self.sale_date_from,
            &self.sale_date_to,
            &self.price_min,
            &self.price_max,
        ]
        .into_iter()
        .any(|value| non_blank(value).is_some())
    }

    /// Builds the search; `page` / `page_size` become offset / limit.
    pub fn to_query(&self) -> Result<SearchQuery, ValidationError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: i64::from(u32::MAX),
            });
        }
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ValidationError::invalid_format("page", "page * page_size overflows"))?;

        let sort_by = match non_blank(&self.sort_by) {
            Some(key) => key.parse::<SortField>()?,
            None => SortField::default(),
        };
        let sort_order = match non_blank(&self.sort_order) {
            Some(order) => order.parse::<SortOrder>()?,
            None if self.sort_desc == Some(false) => SortOrder::Asc,
            None => SortOrder::Desc,
        };

        Ok(SearchQuery {
            keyword: non_blank(&self.keyword),
            location: non_blank(&self.location),
            model_name: non_blank(&self.model_name),
            name: non_blank(&self.name),
            vendor: non_blank(&self.vendor),
            size: non_blank(&self.size),
            barcode: non_blank(&self.barcode),
            purchase_date_from: parse_date("purchase_date_from", &self.purchase_date_from)?,
            purchase_date_to: parse_date("purchase_date_to", &self.purchase_date_to)?,
            sale_date_from: parse_date("sale_date_from", &self.sale_date_from)?,
            sale_date_to: parse_date("sale_date_to", &self.sale_date_to)?,
            price_min: parse_money(&self.price_min)?,
            price_max: parse_money(&self.price_max)?,
            sort_by,
            sort_order,
            limit: page_size,
            offset,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>, ValidationError> {
    non_blank(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| ValidationError::invalid_format(field, format!("'{v}' is not YYYY-MM-DD")))
        })
        .transpose()
}

fn parse_money(value: &Option<String>) -> Result<Option<Money>, ValidationError> {
    non_blank(value).map(|v| Money::parse(&v)).transpose()
}

/// `POST /api/items/{id}/sell` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellParams {
    pub sale_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct BulkDeleteResponse {
    pub requested: usize,
    pub deleted: u64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Unsold units carrying one barcode.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct BarcodeItemsResponse {
    pub items: Vec<ItemDto>,
    pub count: usize,
}

/// Autofill lookup: `found: false` with every other field absent when the
/// barcode was never used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BarcodeInfoResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl From<Option<BarcodeAutofill>> for BarcodeInfoResponse {
    fn from(fill: Option<BarcodeAutofill>) -> Self {
        match fill {
            None => BarcodeInfoResponse::default(),
            Some(fill) => BarcodeInfoResponse {
                found: true,
                model_name: Some(fill.model_name),
                name: Some(fill.name),
                size: fill.size,
                price: Some(fill.price.to_string()),
                vendor: Some(fill.vendor),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct FiltersResponse {
    pub locations: Vec<String>,
    pub vendors: Vec<String>,
}

/// Query string of the import endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportParams {
    pub has_header: bool,
    pub encoding: Option<String>,
}

impl Default for ImportParams {
    fn default() -> Self {
        ImportParams {
            has_header: true,
            encoding: None,
        }
    }
}

/// Report options of `GET /api/reports/items`; the filters come from the
/// same query string as [`SearchParams`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportParams {
    pub format: Option<String>,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_translation() {
        let params = SearchParams {
            page: Some(3),
            page_size: Some(20),
            sort_by: Some("price".into()),
            sort_desc: Some(false),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(query.offset, 40);
        assert_eq!(query.limit, 20);
        assert_eq!(query.sort_by, SortField::Price);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_defaults_and_blanks() {
        let params = SearchParams {
            keyword: Some("  ".into()),
            price_min: Some(String::new()),
            ..Default::default()
        };
        assert!(!params.has_filters());

        let query = params.to_query().unwrap();
        assert_eq!(query.keyword, None);
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_bad_values_rejected() {
        let bad_date = SearchParams {
            purchase_date_from: Some("2024/01/01".into()),
            ..Default::default()
        };
        assert!(bad_date.to_query().is_err());

        let bad_sort = SearchParams {
            sort_by: Some("colour".into()),
            ..Default::default()
        };
        assert!(bad_sort.to_query().is_err());

        let page_zero = SearchParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(page_zero.to_query().is_err());
    }

    #[test]
    fn test_won_price_filter() {
        let params = SearchParams {
            price_min: Some("₩100,000".into()),
            ..Default::default()
        };
        assert!(params.has_filters());
        assert_eq!(params.to_query().unwrap().price_min, Some(Money::from_units(100_000)));
    }

    #[test]
    fn test_barcode_info_not_found_shape() {
        let json = serde_json::to_value(BarcodeInfoResponse::from(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "found": false }));
    }
}
