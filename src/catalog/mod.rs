//! Brand catalog: brand name → image record, backed by a JSON file.

pub mod commands;
pub mod store;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use store::CatalogStore;

pub type Catalog = BTreeMap<String, BrandImage>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrandImage {
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl BrandImage {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            ..Self::default()
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Brand {0} not found in database")]
    UnknownBrand(String),
    #[error("catalog storage failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl CatalogError {
    /// HTTP-equivalent status for the command boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::MissingField(_) => 400,
            CatalogError::UnknownBrand(_) => 404,
            CatalogError::Storage(_) => 500,
        }
    }
}

/// Parses catalog JSON. `null` entries are dropped rather than failing the
/// whole document.
pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    let raw: BTreeMap<String, Option<BrandImage>> =
        serde_json::from_str(contents).context("Failed to parse brand catalog")?;
    Ok(raw
        .into_iter()
        .filter_map(|(brand, record)| record.map(|record| (brand, record)))
        .collect())
}

/// Small built-in catalog used when the catalog file is missing or corrupt.
pub fn default_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert(
        "Ferrari".into(),
        BrandImage::new(
            "https://images.unsplash.com/photo-1583121274602-3e2820c69888?w=800&h=600&fit=crop",
        ),
    );
    catalog.insert(
        "BMW".into(),
        BrandImage::new(
            "https://images.unsplash.com/photo-1555215858-9dc80cd5b8df?w=800&h=600&fit=crop",
        ),
    );
    catalog
}
