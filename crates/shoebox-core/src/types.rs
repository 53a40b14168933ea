//! # Domain Types
//!
//! Core types for the Shoebox inventory.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Inventory Domain Model                              │
//! │                                                                         │
//! │  ┌──────────────────────┐            ┌──────────────────────┐          │
//! │  │    InventoryItem     │  barcode   │    BarcodeRecord     │          │
//! │  │──────────────────────│ ─────────► │──────────────────────│          │
//! │  │ id (UUID v4)         │  N : 1     │ barcode (unique)     │          │
//! │  │ location             │  (upsert   │ model_name           │          │
//! │  │ purchase_date        │   on       │ name                 │          │
//! │  │ sale_date?           │   create)  │ created_at           │          │
//! │  │ model_name, name     │            │ updated_at           │          │
//! │  │ size?, vendor        │            └──────────────────────┘          │
//! │  │ price_cents          │                                              │
//! │  │ notes?, barcode?     │   sale_date = None  → in stock              │
//! │  │ created_at           │   sale_date = Some  → sold                  │
//! │  │ updated_at           │                                              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ItemDraft;

// =============================================================================
// Item Fields
// =============================================================================

/// The user-editable fields of an inventory item, in canonical order.
///
/// The canonical order is also the positional column order of header-less
/// CSV imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ItemField {
    Location,
    PurchaseDate,
    SaleDate,
    ModelName,
    Name,
    Size,
    Vendor,
    Price,
    Notes,
    Barcode,
}

impl ItemField {
    /// All fields in canonical order.
    pub const ALL: [ItemField; 10] = [
        ItemField::Location,
        ItemField::PurchaseDate,
        ItemField::SaleDate,
        ItemField::ModelName,
        ItemField::Name,
        ItemField::Size,
        ItemField::Vendor,
        ItemField::Price,
        ItemField::Notes,
        ItemField::Barcode,
    ];

    /// Fields that can never be defaulted.
    pub const ALWAYS_REQUIRED: [ItemField; 2] = [ItemField::ModelName, ItemField::Name];

    /// Position in [`ItemField::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ItemField::Location => "location",
            ItemField::PurchaseDate => "purchase_date",
            ItemField::SaleDate => "sale_date",
            ItemField::ModelName => "model_name",
            ItemField::Name => "name",
            ItemField::Size => "size",
            ItemField::Vendor => "vendor",
            ItemField::Price => "price",
            ItemField::Notes => "notes",
            ItemField::Barcode => "barcode",
        }
    }

    /// Korean column label used in exports.
    pub const fn label(self) -> &'static str {
        match self {
            ItemField::Location => "위치",
            ItemField::PurchaseDate => "구매일",
            ItemField::SaleDate => "판매일",
            ItemField::ModelName => "모델명",
            ItemField::Name => "이름",
            ItemField::Size => "사이즈",
            ItemField::Vendor => "구매처",
            ItemField::Price => "가격",
            ItemField::Notes => "메모",
            ItemField::Barcode => "바코드",
        }
    }

    /// Lower-case header aliases accepted by CSV import.
    ///
    /// Every export label is included so an export can be imported back.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            ItemField::Location => &["location", "위치", "보관위치"],
            ItemField::PurchaseDate => &["purchase_date", "purchase date", "구매일", "구매날짜"],
            ItemField::SaleDate => &["sale_date", "sale date", "판매일", "판매날짜"],
            ItemField::ModelName => &["model_name", "model name", "model", "모델명", "모델"],
            ItemField::Name => &["name", "product_name", "product name", "제품명", "이름", "상품명"],
            ItemField::Size => &["size", "사이즈", "크기"],
            ItemField::Vendor => &["vendor", "supplier", "구매처", "공급업체"],
            ItemField::Price => &["price", "가격", "단가"],
            ItemField::Notes => &["notes", "memo", "메모", "비고", "설명"],
            ItemField::Barcode => &["barcode", "바코드"],
        }
    }

    /// True when `header` (any case, surrounding whitespace ignored) names this field.
    pub fn matches_header(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.aliases().iter().any(|alias| *alias == header)
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ItemField::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "field".to_string(),
                allowed: ItemField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// One physical unit of stock.
///
/// ## Lifecycle
/// ```text
/// add / bulk import ──► [in stock] ──sell──► [sold] ──► (delete)
///                           │                   │
///                           └── update ◄────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    /// UUID v4, assigned at creation, never reused.
    pub id: String,
    pub location: String,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    /// `None` means the item is still in stock.
    #[ts(as = "Option<String>")]
    pub sale_date: Option<NaiveDate>,
    pub model_name: String,
    pub name: String,
    pub size: Option<String>,
    pub vendor: String,
    /// Price in minor units (use `price()` for a `Money`).
    pub price_cents: i64,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Builds a stored item from a validated [`NewItem`].
    pub fn from_new(id: String, new: NewItem, now: DateTime<Utc>) -> Self {
        InventoryItem {
            id,
            location: new.location,
            purchase_date: new.purchase_date,
            sale_date: new.sale_date,
            model_name: new.model_name,
            name: new.name,
            size: new.size,
            vendor: new.vendor,
            price_cents: new.price.cents(),
            notes: new.notes,
            barcode: new.barcode,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn is_sold(&self) -> bool {
        self.sale_date.is_some()
    }
}

/// A validated item ready to be inserted.
///
/// Only produced by [`crate::validation::validate_draft`] (or by tests), so
/// every `NewItem` already satisfies the storage invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub location: String,
    pub purchase_date: NaiveDate,
    pub sale_date: Option<NaiveDate>,
    pub model_name: String,
    pub name: String,
    pub size: Option<String>,
    pub vendor: String,
    pub price: Money,
    pub notes: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Barcode Records
// =============================================================================

/// Side index mapping a barcode to the last model/name written for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BarcodeRecord {
    pub barcode: String,
    pub model_name: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Values suggested for a new item when its barcode is scanned.
///
/// Taken from the most recently created item with the same barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BarcodeAutofill {
    pub barcode: String,
    pub model_name: String,
    pub name: String,
    pub size: Option<String>,
    pub vendor: String,
    pub price: Money,
}

impl From<&InventoryItem> for BarcodeAutofill {
    fn from(item: &InventoryItem) -> Self {
        BarcodeAutofill {
            barcode: item.barcode.clone().unwrap_or_default(),
            model_name: item.model_name.clone(),
            name: item.name.clone(),
            size: item.size.clone(),
            vendor: item.vendor.clone(),
            price: item.price(),
        }
    }
}

impl BarcodeAutofill {
    /// Copies the remembered values into the blank fields of `draft`.
    ///
    /// Fields the user already typed are left alone.
    pub fn fill_blanks(&self, draft: &mut ItemDraft) {
        fn fill(slot: &mut Option<String>, value: Option<&str>) {
            let blank = slot.as_deref().map_or(true, |s| s.trim().is_empty());
            if blank {
                if let Some(value) = value {
                    *slot = Some(value.to_string());
                }
            }
        }

        fill(&mut draft.model_name, Some(&self.model_name));
        fill(&mut draft.name, Some(&self.name));
        fill(&mut draft.size, self.size.as_deref());
        fill(&mut draft.vendor, Some(&self.vendor));
        if draft.price.is_none() {
            draft.price = Some(self.price.to_decimal());
        }
        fill(&mut draft.barcode, Some(&self.barcode));
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Whole-store summary numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStats {
    pub total_items: i64,
    pub sold_items: i64,
    pub in_stock_items: i64,
    /// Sum of prices of unsold items.
    pub in_stock_value: Money,
    pub average_price: Money,
    pub min_price: Money,
    pub max_price: Money,
}

// =============================================================================
// Sell Outcome
// =============================================================================

/// Result of marking an item as sold.
///
/// "Not found" and "already sold" are ordinary outcomes, not errors; the
/// front-ends decide how to present them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum SellOutcome {
    /// The item now carries the sale date.
    Sold(InventoryItem),
    /// The item was sold before; its sale date is unchanged.
    AlreadySold(InventoryItem),
    NotFound,
}

impl SellOutcome {
    /// The sold item, if the call changed anything.
    pub fn sold(&self) -> Option<&InventoryItem> {
        match self {
            SellOutcome::Sold(item) => Some(item),
            _ => None,
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
    fn test_field_order_matches_index() {
        for (i, field) in ItemField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("price".parse::<ItemField>().unwrap(), ItemField::Price);
        assert_eq!(" Model_Name ".parse::<ItemField>().unwrap(), ItemField::ModelName);
        assert!("colour".parse::<ItemField>().is_err());
    }

    #[test]
    fn test_header_aliases() {
        assert!(ItemField::Location.matches_header("위치"));
        assert!(ItemField::PurchaseDate.matches_header(" Purchase Date "));
        assert!(ItemField::Vendor.matches_header("SUPPLIER"));
        assert!(!ItemField::Vendor.matches_header("가격"));
    }

    #[test]
    fn test_export_labels_are_import_aliases() {
        for field in ItemField::ALL {
            assert!(field.matches_header(field.label()), "{field}");
        }
    }

    #[test]
    fn test_field_serde_names() {
        let json = serde_json::to_string(&ItemField::PurchaseDate).unwrap();
        assert_eq!(json, "\"purchase_date\"");
    }

    #[test]
    fn test_autofill_keeps_typed_values() {
        let autofill = BarcodeAutofill {
            barcode: "8801".into(),
            model_name: "DD1391-100".into(),
            name: "Dunk Low Panda".into(),
            size: Some("270".into()),
            vendor: "KREAM".into(),
            price: Money::from_units(139_000),
        };
        let mut draft = ItemDraft {
            name: Some("My own name".into()),
            vendor: Some("  ".into()),
            ..Default::default()
        };

        autofill.fill_blanks(&mut draft);

        assert_eq!(draft.name.as_deref(), Some("My own name"));
        assert_eq!(draft.model_name.as_deref(), Some("DD1391-100"));
        assert_eq!(draft.vendor.as_deref(), Some("KREAM"));
        assert_eq!(draft.size.as_deref(), Some("270"));
        assert_eq!(draft.barcode.as_deref(), Some("8801"));
        assert_eq!(
            draft.price.and_then(Money::from_decimal),
            Some(Money::from_units(139_000))
        );
    }

    #[test]
    fn test_sell_outcome_serialization() {
        let json = serde_json::to_value(SellOutcome::NotFound).unwrap();
        assert_eq!(json["outcome"], "not_found");
    }
}
