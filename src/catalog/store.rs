use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use super::{default_catalog, parse_catalog, Catalog, CatalogError};
use crate::utils::fs::write_atomic;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Request body for the administrative image update.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdate {
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdated {
    pub success: bool,
    pub message: String,
    pub brand: String,
    pub image_url: String,
    pub description: Option<String>,
}

/// Owns the catalog file and the in-memory copy of it.
///
/// The first successful read is cached for the lifetime of the store. The
/// built-in defaults served on a failed read are not cached, so a later read
/// can still pick up the real file.
pub struct CatalogStore {
    path: PathBuf,
    cache: RwLock<Option<Arc<Catalog>>>,
    write_lock: Mutex<()>,
}

impl CatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached catalog, reading the file on first use.
    pub fn load(&self) -> Arc<Catalog> {
        if let Some(cached) = self.cached() {
            return cached;
        }

        match self.read_file() {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                *self.cache.write().unwrap_or_else(|p| p.into_inner()) = Some(catalog.clone());
                log_info!(
                    "Loaded {} brands from {}",
                    catalog.len(),
                    self.path.display()
                );
                catalog
            }
            Err(err) => {
                log_warn!("Brand catalog unavailable ({err:#}); using built-in defaults");
                Arc::new(default_catalog())
            }
        }
    }

    /// Reads the catalog file, bypassing the cache.
    pub fn read_file(&self) -> Result<Catalog> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog from {}", self.path.display()))?;
        parse_catalog(&contents)
    }

    /// Replaces a known brand's image. The file is the source of truth: it is
    /// re-read under the write lock, mutated, and written back in one piece.
    pub fn update_image(&self, update: ImageUpdate) -> Result<ImageUpdated, CatalogError> {
        let brand = required(update.brand, "Brand")?;
        let image_url = required(update.image_url, "imageUrl")?;

        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut catalog = self.read_file()?;

        let record = catalog
            .get_mut(&brand)
            .ok_or_else(|| CatalogError::UnknownBrand(brand.clone()))?;

        log_info!("Updating {brand} with image: {image_url}");

        record.image_url = image_url.clone();
        if let Some(description) = update.description.filter(|d| !d.trim().is_empty()) {
            record.description = Some(description);
        }
        record.verified = Some(true);
        record.last_updated = Some(Utc::now().to_rfc3339());
        let description = record.description.clone();

        let serialized =
            serde_json::to_string_pretty(&catalog).context("Failed to serialize catalog")?;
        write_atomic(&self.path, &serialized)?;

        *self.cache.write().unwrap_or_else(|p| p.into_inner()) = Some(Arc::new(catalog));

        Ok(ImageUpdated {
            success: true,
            message: format!("Updated {brand} image successfully"),
            brand,
            image_url,
            description,
        })
    }

    fn cached(&self) -> Option<Arc<Catalog>> {
        self.cache
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CatalogError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CatalogError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "Audi": {"imageUrl": "https://img/audi.jpg", "description": "A4"},
        "Tesla": {"imageUrl": "https://img/tesla.jpg"}
    }"#;

    fn store_with(contents: Option<&str>) -> (tempfile::TempDir, CatalogStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brand-images.json");
        if let Some(contents) = contents {
            fs::write(&path, contents).unwrap();
        }
        let store = CatalogStore::new(path);
        (dir, store)
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (_dir, store) = store_with(None);
        assert_eq!(*store.load(), default_catalog());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let (_dir, store) = store_with(Some("{ broken"));
        assert_eq!(*store.load(), default_catalog());
    }

    #[test]
    fn defaults_are_not_cached() {
        let (_dir, store) = store_with(None);
        let _ = store.load();

        fs::write(store.path(), SAMPLE).unwrap();
        assert!(store.load().contains_key("Tesla"));
    }

    #[test]
    fn successful_read_is_cached() {
        let (_dir, store) = store_with(Some(SAMPLE));
        assert_eq!(store.load().len(), 2);

        fs::write(store.path(), "{}").unwrap();
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn update_requires_brand_and_image() {
        let (_dir, store) = store_with(Some(SAMPLE));

        let err = store
            .update_image(ImageUpdate {
                brand: None,
                image_url: Some("https://img/x.jpg".into()),
                description: None,
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = store
            .update_image(ImageUpdate {
                brand: Some("Audi".into()),
                image_url: Some("   ".into()),
                description: None,
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn update_rejects_unknown_brand_without_writing() {
        let (_dir, store) = store_with(Some(SAMPLE));

        let err = store
            .update_image(ImageUpdate {
                brand: Some("Yugo".into()),
                image_url: Some("https://img/yugo.jpg".into()),
                description: None,
            })
            .unwrap_err();

        assert!(matches!(err, CatalogError::UnknownBrand(ref b) if b == "Yugo"));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), SAMPLE);
    }

    #[test]
    fn update_persists_and_refreshes_cache() {
        let (_dir, store) = store_with(Some(SAMPLE));
        let _ = store.load();

        let updated = store
            .update_image(ImageUpdate {
                brand: Some("Audi".into()),
                image_url: Some("https://img/audi-2.jpg".into()),
                description: None,
            })
            .unwrap();

        assert!(updated.success);
        assert_eq!(updated.description.as_deref(), Some("A4"));

        let on_disk = store.read_file().unwrap();
        assert_eq!(on_disk["Audi"].image_url, "https://img/audi-2.jpg");
        assert_eq!(on_disk["Audi"].verified, Some(true));
        assert!(on_disk["Audi"].last_updated.is_some());
        assert_eq!(on_disk["Tesla"].image_url, "https://img/tesla.jpg");

        assert_eq!(store.load()["Audi"].image_url, "https://img/audi-2.jpg");
    }
}
