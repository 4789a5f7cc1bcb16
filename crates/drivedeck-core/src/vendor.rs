//! Vendor classification from model strings
//!
//! Inventory sources often leave the vendor field blank and encode the
//! manufacturer in the model string prefix (`ST...` for Seagate, `WDC ...`
//! for Western Digital). A rules table maps known prefixes to vendor
//! names; built-in defaults cover the common manufacturers and can be
//! replaced from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::drive::InventoryRecord;

#[derive(Error, Debug)]
pub enum VendorRulesError {
    #[error("Failed to read vendor rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse vendor rules: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One prefix-to-vendor mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRule {
    /// Model string prefix to match, e.g. `ST`.
    pub prefix: String,
    /// Vendor name to assign, e.g. `Seagate`.
    pub vendor: String,
}

/// Ordered rules table; the first matching prefix wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRules {
    #[serde(default, rename = "rule")]
    rules: Vec<VendorRule>,
}

impl Default for VendorRules {
    fn default() -> Self {
        let builtin = [
            ("WDC", "Western Digital"),
            ("WD", "Western Digital"),
            ("ST", "Seagate"),
            ("SAMSUNG", "Samsung"),
            ("TOSHIBA", "Toshiba"),
            ("HGST", "HGST"),
            ("Hitachi", "Hitachi"),
            ("INTEL", "Intel"),
            ("KINGSTON", "Kingston"),
            ("Crucial", "Crucial"),
            ("CT", "Crucial"),
            ("SanDisk", "SanDisk"),
        ];
        Self {
            rules: builtin
                .iter()
                .map(|(prefix, vendor)| VendorRule {
                    prefix: prefix.to_string(),
                    vendor: vendor.to_string(),
                })
                .collect(),
        }
    }
}

impl VendorRules {
    /// Load rules from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, VendorRulesError> {
        let content = std::fs::read_to_string(path)?;
        let rules: Self = toml::from_str(&content)?;
        Ok(rules)
    }

    /// Load rules from a file, falling back to the built-in table when the
    /// file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::from_file(path) {
                Ok(rules) => {
                    info!(path = %path.display(), count = rules.rules.len(), "Loaded vendor rules");
                    return rules;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load vendor rules, using built-ins");
                }
            }
        }
        Self::default()
    }

    /// Look up the vendor for a model string. First matching prefix wins.
    pub fn vendor_for_model(&self, model: &str) -> Option<&str> {
        let model = model.trim_start();
        self.rules
            .iter()
            .find(|rule| model.starts_with(&rule.prefix))
            .map(|rule| rule.vendor.as_str())
    }

    /// Fill in a record's empty vendor and model-family fields from its
    /// model string. Fields the source populated are left untouched.
    pub fn enrich(&self, record: &mut InventoryRecord) {
        let model = record.model.trim();
        if model.is_empty() {
            return;
        }
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| model.starts_with(&rule.prefix))
        else {
            return;
        };

        if record.vendor.is_empty() {
            record.vendor = rule.vendor.clone();
        }
        if record.model_family.is_empty() {
            let remainder = model[rule.prefix.len()..].trim_start_matches(['-', '_', ' ']);
            record.model_family = if remainder.is_empty() {
                model.to_string()
            } else {
                remainder.to_string()
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(model: &str, vendor: &str) -> InventoryRecord {
        InventoryRecord {
            name: "sda".to_string(),
            capacity: String::new(),
            model: model.to_string(),
            vendor: vendor.to_string(),
            model_family: String::new(),
            serial: String::new(),
        }
    }

    #[test]
    fn test_builtin_prefixes() {
        let rules = VendorRules::default();
        assert_eq!(rules.vendor_for_model("ST500DM002-1BD142"), Some("Seagate"));
        assert_eq!(
            rules.vendor_for_model("WDC WD10EZEX-08WN4A0"),
            Some("Western Digital")
        );
        assert_eq!(rules.vendor_for_model("NoSuchVendor123"), None);
    }

    #[test]
    fn test_enrich_fills_empty_fields_only() {
        let rules = VendorRules::default();

        let mut blank = record("ST500DM002-1BD142", "");
        rules.enrich(&mut blank);
        assert_eq!(blank.vendor, "Seagate");
        assert_eq!(blank.model_family, "500DM002-1BD142");

        let mut populated = record("ST500DM002", "Custom Corp");
        rules.enrich(&mut populated);
        assert_eq!(populated.vendor, "Custom Corp");
    }

    #[test]
    fn test_from_file_overrides_builtins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[rule]]\nprefix = \"ZZ\"\nvendor = \"Zeta Drives\"\n"
        )
        .unwrap();

        let rules = VendorRules::from_file(file.path()).unwrap();
        assert_eq!(rules.vendor_for_model("ZZ9000"), Some("Zeta Drives"));
        assert_eq!(rules.vendor_for_model("ST500"), None);
    }

    #[test]
    fn test_load_or_default_when_missing() {
        let rules = VendorRules::load_or_default(Path::new("/nonexistent/vendor_rules.toml"));
        assert_eq!(rules.vendor_for_model("TOSHIBA DT01ACA100"), Some("Toshiba"));
    }
}
