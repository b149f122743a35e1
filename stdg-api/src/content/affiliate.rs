//! Category → affiliate link resolution
//!
//! The catalog is a versioned TOML resource. A copy is compiled into the binary
//! and can be replaced at startup by a file named in configuration. Lookup is
//! total: unmapped (or empty) categories resolve to the `[default]` entry.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use stdg_common::db::AffiliateLink;
use stdg_common::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("../../resources/affiliate_links.toml");

/// Partner links and call-to-action copy for one category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AffiliateEntry {
    pub primary_name: String,
    pub primary_url: String,
    pub secondary_name: Option<String>,
    pub secondary_url: Option<String>,
    pub cta: String,
}

impl AffiliateEntry {
    /// Primary link followed by the secondary one when present
    pub fn links(&self) -> Vec<AffiliateLink> {
        let mut links = vec![AffiliateLink {
            name: self.primary_name.clone(),
            url: self.primary_url.clone(),
        }];
        if let (Some(name), Some(url)) = (&self.secondary_name, &self.secondary_url) {
            links.push(AffiliateLink {
                name: name.clone(),
                url: url.clone(),
            });
        }
        links
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.primary_url.trim().is_empty() || self.primary_name.trim().is_empty() {
            return Err(Error::Config(format!(
                "Affiliate entry '{}' needs primary_name and primary_url",
                label
            )));
        }
        if self.secondary_name.is_some() != self.secondary_url.is_some() {
            return Err(Error::Config(format!(
                "Affiliate entry '{}' must set both secondary_name and secondary_url or neither",
                label
            )));
        }
        if self.cta.trim().is_empty() {
            return Err(Error::Config(format!(
                "Affiliate entry '{}' has an empty cta",
                label
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    default: AffiliateEntry,
    #[serde(default)]
    categories: BTreeMap<String, AffiliateEntry>,
}

/// Immutable category → affiliate lookup table
#[derive(Debug, Clone)]
pub struct AffiliateCatalog {
    version: u32,
    default: AffiliateEntry,
    by_category: HashMap<String, AffiliateEntry>,
}

impl AffiliateCatalog {
    /// Catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load a replacement catalog from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read affiliate catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse affiliate catalog: {}", e)))?;

        file.default.validate("default")?;

        let mut by_category = HashMap::with_capacity(file.categories.len());
        for (label, entry) in file.categories {
            entry.validate(&label)?;
            let key = normalize(&label);
            if by_category.insert(key, entry).is_some() {
                return Err(Error::Config(format!(
                    "Affiliate category '{}' is listed twice (labels are case-insensitive)",
                    label
                )));
            }
        }

        Ok(Self {
            version: file.version,
            default: file.default,
            by_category,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }

    /// Resolve a category label; never fails
    pub fn resolve(&self, category: &str) -> &AffiliateEntry {
        self.by_category
            .get(&normalize(category))
            .unwrap_or(&self.default)
    }

    /// Whether the label has its own entry (as opposed to the default)
    pub fn is_mapped(&self, category: &str) -> bool {
        self.by_category.contains_key(&normalize(category))
    }

    pub fn default_entry(&self) -> &AffiliateEntry {
        &self.default
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AffiliateCatalog {
        AffiliateCatalog::builtin().expect("builtin catalog parses")
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = catalog();
        assert!(catalog.version() >= 1);
        assert_eq!(catalog.len(), 20);
    }

    #[test]
    fn test_crm_resolves_to_crm_entry() {
        let catalog = catalog();
        let entry = catalog.resolve("CRM Software");
        assert!(catalog.is_mapped("CRM Software"));
        assert_ne!(entry, catalog.default_entry());
        assert!(entry.primary_url.contains("hubspot"));
    }

    #[test]
    fn test_lookup_ignores_case_and_padding() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("  crm software "), catalog.resolve("CRM Software"));
    }

    #[test]
    fn test_resolver_is_total() {
        let catalog = catalog();
        for label in ["", "   ", "Underwater Basket Weaving", "ÜNICODE ✓", "crm"] {
            let entry = catalog.resolve(label);
            assert!(!entry.cta.is_empty());
            assert!(!entry.links().is_empty());
        }
        assert_eq!(catalog.resolve(""), catalog.default_entry());
    }

    #[test]
    fn test_links_include_secondary_when_present() {
        let catalog = catalog();
        let links = catalog.resolve("SEO Tools").links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "Semrush");
    }

    #[test]
    fn test_primary_only_entry() {
        let catalog = AffiliateCatalog::from_toml_str(
            r#"
version = 1
[default]
primary_name = "Default"
primary_url = "https://example.com"
cta = "Go"
"#,
        )
        .unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.resolve("anything").links().len(), 1);
    }

    #[test]
    fn test_half_secondary_rejected() {
        let result = AffiliateCatalog::from_toml_str(
            r#"
version = 1
[default]
primary_name = "Default"
primary_url = "https://example.com"
secondary_name = "Orphan"
cta = "Go"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result = AffiliateCatalog::from_toml_str(
            r#"
version = 1
[default]
primary_name = "Default"
primary_url = "https://example.com"
cta = "Go"

[categories."CRM"]
primary_name = "A"
primary_url = "https://a.example.com"
cta = "A"

[categories."crm"]
primary_name = "B"
primary_url = "https://b.example.com"
cta = "B"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_default_rejected() {
        assert!(AffiliateCatalog::from_toml_str("version = 1").is_err());
    }
}
