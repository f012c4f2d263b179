//! # Document Loaders
//!
//! Resolve a URI to a JSON document. The suite consults a loader only when
//! a proof references its message schema by URI instead of embedding it.
//!
//! - [`StaticDocumentLoader`]: in-memory URI → document map.
//! - [`FileDocumentLoader`]: reads `file://` URIs from disk.
//!
//! Unrecognized URIs fail with [`LoaderError::NotFound`]. No loader
//! retries or caches.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::LoaderError;

/// A loaded document together with the URL it was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub document: Value,
    pub document_url: String,
}

/// Resolves URIs to documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError>;
}

// ─── StaticDocumentLoader ────────────────────────────────────────────────

/// Serves a fixed set of documents.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentLoader {
    documents: BTreeMap<String, Value>,
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under `uri`, replacing any previous entry.
    pub fn insert(&mut self, uri: impl Into<String>, document: Value) {
        self.documents.insert(uri.into(), document);
    }

    pub fn with_document(mut self, uri: impl Into<String>, document: Value) -> Self {
        self.insert(uri, document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentLoader for StaticDocumentLoader {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError> {
        let document = self
            .documents
            .get(uri)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(uri.to_string()))?;
        tracing::debug!(uri, "loaded static document");
        Ok(RemoteDocument {
            document,
            document_url: uri.to_string(),
        })
    }
}

// ─── FileDocumentLoader ──────────────────────────────────────────────────

/// Loads JSON documents named by `file://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentLoader;

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError> {
        let url = Url::parse(uri).map_err(|e| LoaderError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "file" {
            return Err(LoaderError::NotFound(uri.to_string()));
        }
        let path = url.to_file_path().map_err(|()| LoaderError::InvalidUri {
            uri: uri.to_string(),
            reason: "not a local file path".into(),
        })?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoaderError::NotFound(uri.to_string())
            } else {
                LoaderError::Io {
                    uri: uri.to_string(),
                    source,
                }
            }
        })?;
        let document = serde_json::from_str(&content).map_err(|source| {
            LoaderError::InvalidDocument {
                uri: uri.to_string(),
                source,
            }
        })?;

        tracing::debug!(uri, path = %path.display(), "loaded file document");
        Ok(RemoteDocument {
            document,
            document_url: url.to_string(),
        })
    }
}
