use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use crag_core::{CragError, Embeddings};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Document, Retriever};

/// Storage of embedded documents searchable by similarity.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and store `docs`, returning their ids. A document whose id is
    /// already present replaces the stored one.
    async fn add_documents(
        &self,
        docs: Vec<Document>,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<String>, CragError>;

    /// Up to `k` documents with their similarity score, best first.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<(Document, f32)>, CragError>;

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, CragError> {
        let scored = self.similarity_search_with_score(query, k, embeddings).await?;
        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct StoredEntry {
    document: Document,
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    collection: String,
    entries: Vec<StoredEntry>,
}

/// In-memory vector store ranked by cosine similarity.
///
/// A store can be written to and read back from a JSON snapshot, which is how
/// `crag index` persists a collection between runs.
pub struct InMemoryVectorStore {
    collection: String,
    entries: RwLock<BTreeMap<String, StoredEntry>>,
}

impl InMemoryVectorStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot file for `collection` under `persist_dir`.
    pub fn snapshot_path(persist_dir: &Path, collection: &str) -> std::path::PathBuf {
        persist_dir.join(format!("{collection}.json"))
    }

    /// Write the store to `{persist_dir}/{collection}.json`, creating the
    /// directory if needed.
    pub async fn save(&self, persist_dir: &Path) -> Result<(), CragError> {
        let snapshot = Snapshot {
            collection: self.collection.clone(),
            entries: self.entries.read().await.values().cloned().collect(),
        };
        let json = serde_json::to_vec(&snapshot)
            .map_err(|e| CragError::VectorStore(format!("serialize snapshot: {e}")))?;
        tokio::fs::create_dir_all(persist_dir).await.map_err(|e| {
            CragError::VectorStore(format!("create {}: {e}", persist_dir.display()))
        })?;
        let path = Self::snapshot_path(persist_dir, &self.collection);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CragError::VectorStore(format!("write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), entries = snapshot.entries.len(), "vector store saved");
        Ok(())
    }

    /// Load a snapshot written by [`save`](Self::save). Returns `Ok(None)`
    /// when no snapshot exists for the collection.
    pub async fn load(persist_dir: &Path, collection: &str) -> Result<Option<Self>, CragError> {
        let path = Self::snapshot_path(persist_dir, collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CragError::VectorStore(format!("read {}: {e}", path.display())))
            }
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| CragError::VectorStore(format!("parse {}: {e}", path.display())))?;
        if snapshot.collection != collection {
            return Err(CragError::VectorStore(format!(
                "{} holds collection '{}', expected '{collection}'",
                path.display(),
                snapshot.collection
            )));
        }
        let entries = snapshot
            .entries
            .into_iter()
            .map(|e| (e.document.id.clone(), e))
            .collect();
        Ok(Some(Self {
            collection: snapshot.collection,
            entries: RwLock::new(entries),
        }))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(
        &self,
        docs: Vec<Document>,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<String>, CragError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
        let vectors = embeddings.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(CragError::VectorStore(format!(
                "got {} embeddings for {} documents",
                vectors.len(),
                docs.len()
            )));
        }

        let mut entries = self.entries.write().await;
        let mut ids = Vec::with_capacity(docs.len());
        for (document, embedding) in docs.into_iter().zip(vectors) {
            ids.push(document.id.clone());
            entries.insert(document.id.clone(), StoredEntry { document, embedding });
        }
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<(Document, f32)>, CragError> {
        let query_vec = embeddings.embed_query(query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(Document, f32)> = entries
            .values()
            .map(|entry| {
                (
                    entry.document.clone(),
                    cosine_similarity(&query_vec, &entry.embedding),
                )
            })
            .collect();
        // Stable sort keeps id order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Adapts a [`VectorStore`] to the [`Retriever`] trait.
pub struct VectorStoreRetriever<S: VectorStore> {
    store: Arc<S>,
    embeddings: Arc<dyn Embeddings>,
    k: usize,
}

impl<S: VectorStore + 'static> VectorStoreRetriever<S> {
    pub const DEFAULT_K: usize = 4;

    pub fn new(store: Arc<S>, embeddings: Arc<dyn Embeddings>) -> Self {
        Self {
            store,
            embeddings,
            k: Self::DEFAULT_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

#[async_trait]
impl<S: VectorStore + 'static> Retriever for VectorStoreRetriever<S> {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, CragError> {
        self.store
            .similarity_search(query, self.k, self.embeddings.as_ref())
            .await
            .map_err(|e| match e {
                CragError::Embedding(_) | CragError::VectorStore(_) => {
                    CragError::Retriever(e.to_string())
                }
                other => other,
            })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
