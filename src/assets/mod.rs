//! Read-only asset store
//!
//! Holds the pre-built single-page application. Keys are request paths
//! without the leading slash (`index.html`, `assets/app-3f2a.js`).

mod kv;

pub use kv::KvAssetStore;

use async_trait::async_trait;
use hyper::body::Bytes;
use thiserror::Error;

use crate::background::BackgroundTasks;

/// A stored file ready to be sent
#[derive(Debug, Clone)]
pub struct Asset {
    pub body: Bytes,
    pub content_type: &'static str,
    pub etag: String,
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset '{0}' not found")]
    NotFound(String),

    #[error("Method {0} not allowed for static assets")]
    MethodNotAllowed(String),

    #[error("Failed to read asset '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Look up `key`; follow-up work such as cache population goes to `wait_until`.
    async fn get(&self, key: &str, wait_until: &BackgroundTasks) -> Result<Asset, AssetError>;

    /// Number of keys in the store
    fn len(&self) -> usize;
}
