use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::product::Product;
use crate::domain::tag::TagGroups;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file `{0}` was not found")]
    Missing(PathBuf),
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    product_tags: BTreeMap<String, ProductEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductEntry {
    #[serde(default)]
    tags: TagGroups,
}

/// Recommendable products, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog from `products`. When two products share a name the
    /// first one is kept.
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by(|left, right| left.name.cmp(&right.name));
        products.dedup_by(|later, earlier| later.name == earlier.name);
        Self { products }
    }

    /// Loads the catalog file, degrading to an empty catalog when the file is
    /// absent or malformed.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(catalog) => {
                info!(
                    event_name = "catalog.loaded",
                    path = %path.display(),
                    product_count = catalog.len(),
                    "product catalog loaded"
                );
                catalog
            }
            Err(error) => {
                warn!(
                    event_name = "catalog.unavailable",
                    path = %path.display(),
                    error = %error,
                    "product catalog unavailable; recommendations are disabled"
                );
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::Missing(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        let products = document
            .product_tags
            .into_iter()
            .map(|(name, entry)| {
                let unknown: Vec<&str> = entry.tags.other_keys().collect();
                if !unknown.is_empty() {
                    warn!(
                        event_name = "catalog.unknown_tag_group",
                        product = %name,
                        groups = ?unknown,
                        "product has tag groups outside the known categories"
                    );
                }
                Product::new(name, entry.tags)
            })
            .collect();
        Ok(Self::new(products))
    }

    pub fn find(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.name == name)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{Catalog, CatalogError};
    use crate::domain::tag::TagCategory;

    const DOCUMENT: &str = r##"{
        "product_tags": {
            "주택화재보험": {"tags": {"누구": ["#주택소유자"], "위험": ["#화재", "#누수_화재"]}},
            "운전자보험": {"tags": {"누구": ["#운전자"], "위험": ["#교통사고"], "변화": []}}
        },
        "all_tags": {"누구": ["#주택소유자", "#운전자"]}
    }"##;

    #[test]
    fn parses_product_tags_and_orders_by_name() {
        let catalog = Catalog::from_json_str(DOCUMENT).expect("catalog parses");

        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["운전자보험", "주택화재보험"]);
        let home = catalog.find("주택화재보험").expect("home product");
        assert_eq!(home.tags.tags(TagCategory::Risk).len(), 2);
    }

    #[test]
    fn unknown_tag_group_keeps_the_rest_of_the_catalog() {
        let raw = r##"{
            "product_tags": {
                "주택화재보험": {"tags": {"위험": ["#화재"], "특징": ["#가성비"]}},
                "운전자보험": {"tags": {"누구": ["#운전자"]}}
            }
        }"##;

        let catalog = Catalog::from_json_str(raw).expect("catalog parses");

        assert_eq!(catalog.len(), 2);
        let home = catalog.find("주택화재보험").expect("home product");
        assert!(home.tags.flatten().contains("#가성비"));
        assert_eq!(home.tags.category_set(TagCategory::Risk).len(), 1);
    }

    #[test]
    fn missing_file_degrades_to_empty_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog_tags.json");

        assert!(matches!(Catalog::try_load(&path), Err(CatalogError::Missing(_))));
        assert!(Catalog::load(&path).is_empty());
    }

    #[test]
    fn malformed_file_degrades_to_empty_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog_tags.json");
        fs::write(&path, "{ not json").expect("write catalog");

        assert!(matches!(Catalog::try_load(&path), Err(CatalogError::Parse(_))));
        assert!(Catalog::load(&path).is_empty());
    }

    #[test]
    fn document_without_products_is_empty() {
        let catalog = Catalog::from_json_str(r#"{"all_tags": {}}"#).expect("catalog parses");
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_names_keep_first_definition() {
        use crate::domain::product::Product;
        use crate::domain::tag::TagGroups;

        let catalog = Catalog::new(vec![
            Product::new("A", TagGroups::new().with(TagCategory::Risk, &["#화재"])),
            Product::new("A", TagGroups::new()),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.products()[0].tags.tags(TagCategory::Risk).len(), 1);
    }
}
