//! Directory-backed key/value asset store
//!
//! The bundle directory is indexed once at startup into a manifest; lookups
//! outside the manifest never touch the filesystem. File bytes are read on
//! first use and copied into an in-memory edge cache by deferred work.

use async_trait::async_trait;
use hyper::body::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{Asset, AssetError, AssetStore};
use crate::background::BackgroundTasks;
use crate::http::{cache, mime};
use crate::logger;

type EdgeCache = Arc<RwLock<HashMap<String, Asset>>>;

pub struct KvAssetStore {
    manifest: HashMap<String, PathBuf>,
    edge_cache: EdgeCache,
}

impl KvAssetStore {
    /// Index every regular file below `root`
    pub fn load(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref();
        let mut manifest = HashMap::new();
        index_directory(root, root, &mut manifest)?;
        Ok(Self {
            manifest,
            edge_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.manifest.contains_key(key)
    }

    fn cached(&self, key: &str) -> Option<Asset> {
        self.edge_cache
            .read()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.edge_cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

fn index_directory(
    root: &Path,
    dir: &Path,
    manifest: &mut HashMap<String, PathBuf>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            index_directory(root, &path, manifest)?;
        } else if file_type.is_file() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let Some(key) = manifest_key(relative) else {
                logger::log_warning(&format!(
                    "Skipping asset with non UTF-8 name: {}",
                    path.display()
                ));
                continue;
            };
            manifest.insert(key, path);
        }
    }
    Ok(())
}

/// `assets/app.js` regardless of the platform separator
fn manifest_key(relative: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    parts.map(|parts| parts.join("/"))
}

#[async_trait]
impl AssetStore for KvAssetStore {
    async fn get(&self, key: &str, wait_until: &BackgroundTasks) -> Result<Asset, AssetError> {
        let Some(path) = self.manifest.get(key) else {
            return Err(AssetError::NotFound(key.to_string()));
        };

        if let Some(asset) = self.cached(key) {
            return Ok(asset);
        }

        let data = tokio::fs::read(path).await.map_err(|source| AssetError::Io {
            key: key.to_string(),
            source,
        })?;

        let asset = Asset {
            etag: cache::generate_etag(&data),
            content_type: mime::content_type_for(key),
            body: Bytes::from(data),
        };

        let edge_cache = Arc::clone(&self.edge_cache);
        let cache_key = key.to_string();
        let cached = asset.clone();
        wait_until.wait_until(async move {
            if let Ok(mut cache) = edge_cache.write() {
                cache.insert(cache_key, cached);
            }
        });

        Ok(asset)
    }

    fn len(&self) -> usize {
        self.manifest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<!doctype html><div id=root>").unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app-3f2a.js"), "console.log(1)").unwrap();
        dir
    }

    #[test]
    fn test_manifest_keys() {
        let dir = bundle();
        let store = KvAssetStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("index.html"));
        assert!(store.contains("assets/app-3f2a.js"));
        assert!(!store.contains("/index.html"));
    }

    #[test]
    fn test_missing_directory() {
        assert!(KvAssetStore::load("/definitely/not/a/bundle").is_err());
    }

    #[tokio::test]
    async fn test_get_reads_asset() {
        let dir = bundle();
        let store = KvAssetStore::load(dir.path()).unwrap();
        let background = BackgroundTasks::new();

        let asset = store.get("assets/app-3f2a.js", &background).await.unwrap();
        assert_eq!(asset.body, Bytes::from("console.log(1)"));
        assert_eq!(asset.content_type, "application/javascript");
        assert!(asset.etag.starts_with('"'));
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let dir = bundle();
        let store = KvAssetStore::load(dir.path()).unwrap();
        let background = BackgroundTasks::new();

        let err = store.get("../secret.txt", &background).await.unwrap_err();
        assert!(matches!(err, AssetError::NotFound(key) if key == "../secret.txt"));
        assert_eq!(background.pending(), 0);
    }

    #[tokio::test]
    async fn test_edge_cache_populated_in_background() {
        let dir = bundle();
        let store = KvAssetStore::load(dir.path()).unwrap();
        let background = BackgroundTasks::new();

        store.get("index.html", &background).await.unwrap();
        background.drain(Duration::from_secs(5)).await;
        assert_eq!(store.cached_len(), 1);

        // Served from the cache even after the file is gone
        std::fs::remove_file(dir.path().join("index.html")).unwrap();
        let asset = store.get("index.html", &background).await.unwrap();
        assert_eq!(asset.content_type, "text/html; charset=utf-8");
    }
}
