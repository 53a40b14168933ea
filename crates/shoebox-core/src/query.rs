//! # Search Queries
//!
//! Typed search requests and paged results shared by every front-end.
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SearchQuery                                                            │
//! │  ├── keyword      ─► name | model_name | vendor | notes | barcode      │
//! │  ├── location, model_name, name, vendor, size, barcode  (substring)    │
//! │  ├── purchase_date_from/to, sale_date_from/to          (inclusive)     │
//! │  ├── price_min/max                                     (inclusive)     │
//! │  ├── sort_by (whitelist) + sort_order                                  │
//! │  └── limit (1..=10000), offset                                         │
//! │                                                                         │
//! │  All filters are optional and ANDed together.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::InventoryItem;
use crate::validation::ValidationResult;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest page a single search may return.
pub const MAX_LIMIT: u32 = 10_000;

// =============================================================================
// Sorting
// =============================================================================

/// Columns a search may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortField {
    Id,
    Location,
    PurchaseDate,
    SaleDate,
    ModelName,
    Name,
    Size,
    Vendor,
    Price,
    #[default]
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 10] = [
        SortField::Id,
        SortField::Location,
        SortField::PurchaseDate,
        SortField::SaleDate,
        SortField::ModelName,
        SortField::Name,
        SortField::Size,
        SortField::Vendor,
        SortField::Price,
        SortField::CreatedAt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Location => "location",
            SortField::PurchaseDate => "purchase_date",
            SortField::SaleDate => "sale_date",
            SortField::ModelName => "model_name",
            SortField::Name => "name",
            SortField::Size => "size",
            SortField::Vendor => "vendor",
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
        }
    }

    /// Storage column backing this sort key.
    pub const fn column(self) -> &'static str {
        match self {
            SortField::Price => "price_cents",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown keys are rejected instead of silently falling back.
impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sort_by".to_string(),
                allowed: SortField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sort_order".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

// =============================================================================
// Search Query
// =============================================================================

/// A filtered, sorted, paginated search over inventory items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Substring matched against name, model_name, vendor, notes, barcode.
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub model_name: Option<String>,
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub size: Option<String>,
    pub barcode: Option<String>,
    pub purchase_date_from: Option<NaiveDate>,
    pub purchase_date_to: Option<NaiveDate>,
    pub sale_date_from: Option<NaiveDate>,
    pub sale_date_to: Option<NaiveDate>,
    pub price_min: Option<Money>,
    pub price_max: Option<Money>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            keyword: None,
            location: None,
            model_name: None,
            name: None,
            vendor: None,
            size: None,
            barcode: None,
            purchase_date_from: None,
            purchase_date_to: None,
            sale_date_from: None,
            sale_date_to: None,
            price_min: None,
            price_max: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SearchQuery {
    /// Unfiltered query with default sort and page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unfiltered query sized for exports.
    pub fn all() -> Self {
        SearchQuery {
            limit: MAX_LIMIT,
            ..Self::default()
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Checks the query before any store access.
    ///
    /// ## Rules
    /// - `limit` in 1..=10000
    /// - price bounds not negative, `price_min <= price_max`
    /// - every date range has `from <= to`
    pub fn validate(&self) -> ValidationResult<()> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: MAX_LIMIT as i64,
            });
        }

        for (field, bound) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if bound.is_some_and(|b| b.is_negative()) {
                return Err(ValidationError::Negative {
                    field: field.to_string(),
                });
            }
        }
        check_range("price", self.price_min, self.price_max)?;
        check_range("purchase_date", self.purchase_date_from, self.purchase_date_to)?;
        check_range("sale_date", self.sale_date_from, self.sale_date_to)?;

        Ok(())
    }
}

fn check_range<T: PartialOrd + fmt::Display>(
    field: &str,
    from: Option<T>,
    to: Option<T>,
) -> ValidationResult<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::InvalidRange {
            field: field.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Search Result
// =============================================================================

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResult {
    pub items: Vec<InventoryItem>,
    /// Rows matching the filters, before pagination.
    pub total_count: i64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl SearchResult {
    pub fn new(items: Vec<InventoryItem>, total_count: i64, limit: u32, offset: u32) -> Self {
        let has_more = (offset as i64 + items.len() as i64) < total_count;
        SearchResult {
            items,
            total_count,
            limit,
            offset,
            has_more,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = SearchQuery::new();
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(SearchQuery::new().page(0, 0).validate().is_err());
        assert!(SearchQuery::new().page(10_001, 0).validate().is_err());
        assert!(SearchQuery::new().page(10_000, 0).validate().is_ok());
    }

    #[test]
    fn test_inverted_price_range() {
        let query = SearchQuery::new().price_range(
            Some(Money::from_units(100_000)),
            Some(Money::from_units(50_000)),
        );
        let err = query.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRange { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_negative_price_bound() {
        let query = SearchQuery::new().price_range(Some(Money::from_cents(-1)), None);
        assert!(matches!(
            query.validate(),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_inverted_date_range() {
        let query = SearchQuery {
            sale_date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            sale_date_to: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!("price".parse::<SortField>().unwrap(), SortField::Price);
        assert_eq!(SortField::Price.column(), "price_cents");
        let err = "price; DROP TABLE".parse::<SortField>().unwrap_err();
        assert_eq!(err.field(), "sort_by");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_has_more() {
        assert!(SearchResult::new(vec![], 5, 2, 0).has_more);
        assert!(!SearchResult::new(vec![], 0, 2, 0).has_more);
        assert!(!SearchResult::new(vec![], 5, 10, 5).has_more);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"keyword": "dunk", "sort_by": "price"}"#).unwrap();
        assert_eq!(query.keyword.as_deref(), Some("dunk"));
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.sort_by, SortField::Price);
    }
}
