//! # Inventory Settings
//!
//! Business settings injected into validation and import.
//!
//! These are loaded once at startup (see `shoebox_db::config`) and passed
//! explicitly; nothing in this crate reads global state.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::ItemField;

/// Default storage location for new items.
pub const DEFAULT_LOCATION: &str = "A-01";

/// Default vendor for new items.
pub const DEFAULT_VENDOR: &str = "기본구매처";

// =============================================================================
// Inventory Settings
// =============================================================================

/// Required fields and defaults used by the Validation Layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Fields that must be supplied. Fields outside this set fall back to
    /// their default when absent.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<ItemField>,

    #[serde(default = "default_location")]
    pub default_location: String,

    #[serde(default = "default_vendor")]
    pub default_vendor: String,

    #[serde(default)]
    pub import: ImportSettings,
}

fn default_required_fields() -> Vec<ItemField> {
    vec![
        ItemField::Location,
        ItemField::PurchaseDate,
        ItemField::ModelName,
        ItemField::Name,
        ItemField::Vendor,
        ItemField::Price,
    ]
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            required_fields: default_required_fields(),
            default_location: default_location(),
            default_vendor: default_vendor(),
            import: ImportSettings::default(),
        }
    }
}

impl InventorySettings {
    /// True when the field must be supplied by the caller.
    ///
    /// `model_name` and `name` are always required, whatever the
    /// configured set says.
    pub fn is_required(&self, field: ItemField) -> bool {
        ItemField::ALWAYS_REQUIRED.contains(&field) || self.required_fields.contains(&field)
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_location.trim().is_empty() {
            return Err(ValidationError::required("default_location"));
        }
        if self.default_vendor.trim().is_empty() {
            return Err(ValidationError::required("default_vendor"));
        }
        if self.import.encoding.trim().is_empty() {
            return Err(ValidationError::required("import.encoding"));
        }
        Ok(())
    }
}

// =============================================================================
// Import Settings
// =============================================================================

/// Text encodings tried when reading CSV input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Encoding tried first unless the caller names one.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Tried in order when the first encoding fails to decode.
    /// Default covers Korean spreadsheet exports (CP949 / EUC-KR) and Latin-1.
    #[serde(default = "default_fallback_encodings")]
    pub fallback_encodings: Vec<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_fallback_encodings() -> Vec<String> {
    vec![
        "windows-949".to_string(),
        "euc-kr".to_string(),
        "windows-1252".to_string(),
    ]
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            encoding: default_encoding(),
            fallback_encodings: default_fallback_encodings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = InventorySettings::default();
        assert_eq!(settings.default_location, "A-01");
        assert!(settings.is_required(ItemField::Price));
        assert!(!settings.is_required(ItemField::Size));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_name_always_required() {
        let settings = InventorySettings {
            required_fields: vec![],
            ..Default::default()
        };
        assert!(settings.is_required(ItemField::Name));
        assert!(settings.is_required(ItemField::ModelName));
        assert!(!settings.is_required(ItemField::Location));
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let settings: InventorySettings =
            serde_json::from_str(r#"{"required_fields": ["model_name", "name"]}"#).unwrap();
        assert_eq!(settings.default_vendor, DEFAULT_VENDOR);
        assert_eq!(settings.import.encoding, "utf-8");
        assert!(!settings.is_required(ItemField::Vendor));
    }

    #[test]
    fn test_unknown_required_field_rejected() {
        let result: Result<InventorySettings, _> =
            serde_json::from_str(r#"{"required_fields": ["colour"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_default_rejected() {
        let settings = InventorySettings {
            default_location: "  ".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
