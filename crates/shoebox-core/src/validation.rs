//! # Validation Module
//!
//! The Validation Layer: turns raw input into records that satisfy the
//! storage invariants.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end (CLI args / JSON body / CSV row)                   │
//! │  └── Type parsing into ItemDraft / ItemPatch                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── trim text, blank → absent                                         │
//! │  ├── required set + configured defaults                                │
//! │  ├── price >= 0                                                        │
//! │  └── sale_date >= purchase_date                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (price_cents >= 0)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use shoebox_core::settings::InventorySettings;
//! use shoebox_core::validation::{validate_draft, ItemDraft};
//!
//! let draft = ItemDraft {
//!     model_name: Some("DD1391-100".into()),
//!     name: Some("Dunk Low Panda".into()),
//!     price: Some("139000".parse().unwrap()),
//!     ..Default::default()
//! };
//! let settings = InventorySettings {
//!     required_fields: vec![],
//!     ..Default::default()
//! };
//! let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//!
//! let item = validate_draft(draft, &settings, today).unwrap();
//! assert_eq!(item.location, "A-01");
//! assert_eq!(item.purchase_date, today);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::settings::InventorySettings;
use crate::types::{InventoryItem, ItemField, NewItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Input Types
// =============================================================================

/// Raw input for a new item. Every field is optional at this stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDraft {
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub sale_date: Option<NaiveDate>,
    pub model_name: Option<String>,
    pub name: Option<String>,
    pub size: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub barcode: Option<String>,
}

/// Partial update of an existing item.
///
/// `None` leaves a field unchanged. For the optional text fields (`size`,
/// `notes`, `barcode`) a blank string clears the value; `clear_sale_date`
/// puts a sold item back in stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub sale_date: Option<NaiveDate>,
    pub clear_sale_date: bool,
    pub model_name: Option<String>,
    pub name: Option<String>,
    pub size: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub barcode: Option<String>,
}

impl ItemPatch {
    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Trims text; blank becomes `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a required text field, returning the trimmed value.
pub fn validate_required_text(field: ItemField, value: Option<&str>) -> ValidationResult<String> {
    normalize_text(value).ok_or_else(|| ValidationError::required(field.as_str()))
}

/// Converts and checks a price amount.
///
/// ## Rules
/// - Must not be negative
/// - Rounded to two fractional digits
pub fn validate_price(amount: Decimal) -> ValidationResult<Money> {
    let price = Money::from_decimal(amount)
        .ok_or_else(|| ValidationError::invalid_format("price", "amount is too large"))?;
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: ItemField::Price.as_str().to_string(),
        });
    }
    Ok(price)
}

/// Checks that an item was not sold before it was bought.
pub fn validate_date_order(
    purchase_date: NaiveDate,
    sale_date: Option<NaiveDate>,
) -> ValidationResult<()> {
    match sale_date {
        Some(sale_date) if sale_date < purchase_date => Err(ValidationError::DateOrder {
            purchase_date,
            sale_date,
        }),
        _ => Ok(()),
    }
}

/// Required text with a configured fallback for when the field is optional.
fn text_or_default(
    field: ItemField,
    value: Option<&str>,
    settings: &InventorySettings,
    default: &str,
) -> ValidationResult<String> {
    match normalize_text(value) {
        Some(v) => Ok(v),
        None if settings.is_required(field) => Err(ValidationError::required(field.as_str())),
        None => Ok(default.to_string()),
    }
}

// =============================================================================
// Draft Validation
// =============================================================================

/// Validates a draft into a [`NewItem`].
///
/// Fields are checked in canonical order and the first violation is
/// returned. `today` is used as the purchase date when that field is not
/// required and absent.
pub fn validate_draft(
    draft: ItemDraft,
    settings: &InventorySettings,
    today: NaiveDate,
) -> ValidationResult<NewItem> {
    let location = text_or_default(
        ItemField::Location,
        draft.location.as_deref(),
        settings,
        &settings.default_location,
    )?;

    let purchase_date = match draft.purchase_date {
        Some(date) => date,
        None if settings.is_required(ItemField::PurchaseDate) => {
            return Err(ValidationError::required(ItemField::PurchaseDate.as_str()))
        }
        None => today,
    };

    let model_name = validate_required_text(ItemField::ModelName, draft.model_name.as_deref())?;
    let name = validate_required_text(ItemField::Name, draft.name.as_deref())?;

    let vendor = text_or_default(
        ItemField::Vendor,
        draft.vendor.as_deref(),
        settings,
        &settings.default_vendor,
    )?;

    let price = match draft.price {
        Some(amount) => validate_price(amount)?,
        None if settings.is_required(ItemField::Price) => {
            return Err(ValidationError::required(ItemField::Price.as_str()))
        }
        None => Money::zero(),
    };

    validate_date_order(purchase_date, draft.sale_date)?;

    // Optional fields can still be marked required by configuration.
    for (field, value) in [
        (ItemField::SaleDate, draft.sale_date.map(|_| ())),
        (ItemField::Size, normalize_text(draft.size.as_deref()).map(|_| ())),
        (ItemField::Notes, normalize_text(draft.notes.as_deref()).map(|_| ())),
        (ItemField::Barcode, normalize_text(draft.barcode.as_deref()).map(|_| ())),
    ] {
        if value.is_none() && settings.is_required(field) {
            return Err(ValidationError::required(field.as_str()));
        }
    }

    Ok(NewItem {
        location,
        purchase_date,
        sale_date: draft.sale_date,
        model_name,
        name,
        size: normalize_text(draft.size.as_deref()),
        vendor,
        price,
        notes: normalize_text(draft.notes.as_deref()),
        barcode: normalize_text(draft.barcode.as_deref()),
    })
}

// =============================================================================
// Patch Validation
// =============================================================================

/// Applies a patch to a copy of `item`, validating the merged record.
///
/// Timestamps are left for the store to refresh.
pub fn apply_patch(item: &InventoryItem, patch: &ItemPatch) -> ValidationResult<InventoryItem> {
    let mut updated = item.clone();

    if let Some(location) = &patch.location {
        updated.location = validate_required_text(ItemField::Location, Some(location))?;
    }
    if let Some(date) = patch.purchase_date {
        updated.purchase_date = date;
    }
    if patch.clear_sale_date {
        updated.sale_date = None;
    } else if let Some(date) = patch.sale_date {
        updated.sale_date = Some(date);
    }
    if let Some(model_name) = &patch.model_name {
        updated.model_name = validate_required_text(ItemField::ModelName, Some(model_name))?;
    }
    if let Some(name) = &patch.name {
        updated.name = validate_required_text(ItemField::Name, Some(name))?;
    }
    if let Some(size) = &patch.size {
        updated.size = normalize_text(Some(size));
    }
    if let Some(vendor) = &patch.vendor {
        updated.vendor = validate_required_text(ItemField::Vendor, Some(vendor))?;
    }
    if let Some(amount) = patch.price {
        updated.price_cents = validate_price(amount)?.cents();
    }
    if let Some(notes) = &patch.notes {
        updated.notes = normalize_text(Some(notes));
    }
    if let Some(barcode) = &patch.barcode {
        updated.barcode = normalize_text(Some(barcode));
    }

    validate_date_order(updated.purchase_date, updated.sale_date)?;

    Ok(updated)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_draft() -> ItemDraft {
        ItemDraft {
            location: Some(" B-02 ".into()),
            purchase_date: Some(date(2024, 1, 10)),
            sale_date: None,
            model_name: Some("DD1391-100".into()),
            name: Some("Dunk Low Panda".into()),
            size: Some("270".into()),
            vendor: Some("KREAM".into()),
            price: Some(Decimal::new(139000, 0)),
            notes: Some("   ".into()),
            barcode: Some("8801234567890".into()),
        }
    }

    #[test]
    fn test_full_draft_is_trimmed() {
        let item = validate_draft(full_draft(), &InventorySettings::default(), date(2024, 5, 1))
            .unwrap();
        assert_eq!(item.location, "B-02");
        assert_eq!(item.notes, None);
        assert_eq!(item.price, Money::from_units(139_000));
    }

    #[test]
    fn test_missing_required_field() {
        let draft = ItemDraft {
            vendor: None,
            ..full_draft()
        };
        let err = validate_draft(draft, &InventorySettings::default(), date(2024, 5, 1))
            .unwrap_err();
        assert_eq!(err, ValidationError::required("vendor"));
    }

    #[test]
    fn test_blank_name_rejected_even_when_not_configured() {
        let settings = InventorySettings {
            required_fields: vec![],
            ..Default::default()
        };
        let draft = ItemDraft {
            name: Some("  ".into()),
            ..full_draft()
        };
        let err = validate_draft(draft, &settings, date(2024, 5, 1)).unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_defaults_apply_when_optional() {
        let settings = InventorySettings {
            required_fields: vec![],
            ..Default::default()
        };
        let draft = ItemDraft {
            model_name: Some("M1".into()),
            name: Some("N1".into()),
            ..Default::default()
        };
        let item = validate_draft(draft, &settings, date(2024, 5, 1)).unwrap();
        assert_eq!(item.location, "A-01");
        assert_eq!(item.vendor, "기본구매처");
        assert_eq!(item.purchase_date, date(2024, 5, 1));
        assert!(item.price.is_zero());
    }

    #[test]
    fn test_negative_price_rejected() {
        let draft = ItemDraft {
            price: Some(Decimal::new(-1, 0)),
            ..full_draft()
        };
        let err = validate_draft(draft, &InventorySettings::default(), date(2024, 5, 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Negative { .. }));
    }

    #[test]
    fn test_sale_before_purchase_rejected() {
        let draft = ItemDraft {
            sale_date: Some(date(2024, 1, 9)),
            ..full_draft()
        };
        let err = validate_draft(draft, &InventorySettings::default(), date(2024, 5, 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::DateOrder { .. }));
    }

    #[test]
    fn test_same_day_sale_allowed() {
        let draft = ItemDraft {
            sale_date: Some(date(2024, 1, 10)),
            ..full_draft()
        };
        assert!(validate_draft(draft, &InventorySettings::default(), date(2024, 5, 1)).is_ok());
    }

    #[test]
    fn test_configured_optional_field_required() {
        let mut settings = InventorySettings::default();
        settings.required_fields.push(ItemField::Size);
        let draft = ItemDraft {
            size: None,
            ..full_draft()
        };
        let err = validate_draft(draft, &settings, date(2024, 5, 1)).unwrap_err();
        assert_eq!(err, ValidationError::required("size"));
    }

    fn stored_item() -> InventoryItem {
        let new = validate_draft(full_draft(), &InventorySettings::default(), date(2024, 5, 1))
            .unwrap();
        InventoryItem::from_new("item-1".into(), new, Utc::now())
    }

    #[test]
    fn test_patch_updates_and_clears() {
        let item = stored_item();
        let patch = ItemPatch {
            price: Some(Decimal::new(120000, 0)),
            size: Some("".into()),
            location: Some(" C-03".into()),
            ..Default::default()
        };
        let updated = apply_patch(&item, &patch).unwrap();
        assert_eq!(updated.price(), Money::from_units(120_000));
        assert_eq!(updated.size, None);
        assert_eq!(updated.location, "C-03");
        assert_eq!(updated.model_name, item.model_name);
    }

    #[test]
    fn test_patch_rejects_blank_required() {
        let patch = ItemPatch {
            vendor: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(
            apply_patch(&stored_item(), &patch).unwrap_err(),
            ValidationError::required("vendor")
        );
    }

    #[test]
    fn test_patch_checks_merged_dates() {
        let patch = ItemPatch {
            purchase_date: Some(date(2024, 6, 1)),
            sale_date: Some(date(2024, 5, 1)),
            ..Default::default()
        };
        assert!(apply_patch(&stored_item(), &patch).is_err());
    }

    #[test]
    fn test_patch_clear_sale_date() {
        let mut item = stored_item();
        item.sale_date = Some(date(2024, 2, 1));
        let patch = ItemPatch {
            clear_sale_date: true,
            ..Default::default()
        };
        assert!(!apply_patch(&item, &patch).unwrap().is_sold());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().is_empty());
        assert!(!ItemPatch {
            clear_sale_date: true,
            ..Default::default()
        }
        .is_empty());
    }
}
