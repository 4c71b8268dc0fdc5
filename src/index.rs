//! Building and opening the persisted vector store.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use crag_config::CragConfig;
use crag_core::{CragError, Embeddings};
use crag_retrieval::{
    Document, InMemoryVectorStore, Loader, RecursiveCharacterTextSplitter, TextSplitter,
    VectorStore, WebLoader,
};

/// Split `documents` and add the chunks to `store`. Returns the number of
/// chunks written; chunk ids are content hashes, so re-adding is idempotent.
pub async fn index_documents(
    documents: &[Document],
    splitter: &dyn TextSplitter,
    store: &InMemoryVectorStore,
    embeddings: &dyn Embeddings,
) -> Result<usize, CragError> {
    let chunks = splitter.split_documents(documents);
    tracing::info!(documents = documents.len(), chunks = chunks.len(), "split documents");
    let ids = store.add_documents(chunks, embeddings).await?;
    Ok(ids.len())
}

fn splitter(config: &CragConfig) -> RecursiveCharacterTextSplitter {
    RecursiveCharacterTextSplitter::new(config.rag.chunk_size)
        .with_chunk_overlap(config.rag.chunk_overlap)
}

fn loader(config: &CragConfig, urls: Vec<String>) -> WebLoader {
    let loader = WebLoader::new(urls);
    match config.user_agent() {
        Some(agent) => loader.with_user_agent(agent),
        None => loader,
    }
}

/// Fetch `urls`, index them into a fresh collection and save it.
pub async fn build(
    config: &CragConfig,
    urls: Vec<String>,
    embeddings: &dyn Embeddings,
) -> Result<InMemoryVectorStore, CragError> {
    if urls.is_empty() {
        return Err(CragError::Config("no urls to index (set rag.urls or pass --url)".to_string()));
    }
    let documents = loader(config, urls).load().await?;
    let store = InMemoryVectorStore::new(&config.rag.collection);
    index_documents(&documents, &splitter(config), &store, embeddings).await?;
    store.save(Path::new(&config.rag.persist_dir)).await?;
    Ok(store)
}

/// Load the saved collection, building it from `rag.urls` on first use.
pub async fn open_or_build(
    config: &CragConfig,
    embeddings: &dyn Embeddings,
) -> Result<Arc<InMemoryVectorStore>, CragError> {
    let dir = Path::new(&config.rag.persist_dir);
    if let Some(store) = InMemoryVectorStore::load(dir, &config.rag.collection).await? {
        tracing::info!(collection = store.collection(), entries = store.len().await, "vector store loaded");
        return Ok(Arc::new(store));
    }
    tracing::info!(collection = %config.rag.collection, "no saved collection, indexing sources");
    Ok(Arc::new(build(config, config.rag.urls.clone(), embeddings).await?))
}

/// `crag index`.
pub async fn run(config: &CragConfig, urls: Vec<String>, force: bool) -> Result<(), CragError> {
    let dir = Path::new(&config.rag.persist_dir);
    if !force {
        if let Some(store) = InMemoryVectorStore::load(dir, &config.rag.collection).await? {
            println!(
                "{} collection '{}' already holds {} chunks (use --force to rebuild)",
                "skip".yellow(),
                store.collection(),
                store.len().await
            );
            return Ok(());
        }
    }

    let urls = if urls.is_empty() { config.rag.urls.clone() } else { urls };
    let embeddings = crate::providers::embeddings(config)?;
    let store = build(config, urls, embeddings.as_ref()).await?;
    println!(
        "{} {} chunks into '{}' at {}",
        "indexed".green().bold(),
        store.len().await,
        store.collection(),
        InMemoryVectorStore::snapshot_path(dir, store.collection()).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crag_retrieval::FakeEmbeddings;

    fn page(text: &str) -> Document {
        Document::from_content(text).with_metadata("source", "https://example.com")
    }

    #[tokio::test]
    async fn indexing_twice_is_idempotent() {
        let store = InMemoryVectorStore::new("test");
        let embeddings = FakeEmbeddings::default();
        let splitter = RecursiveCharacterTextSplitter::new(20);
        let docs = vec![page("agents plan tasks.\n\nagents keep memory.")];

        let first = index_documents(&docs, &splitter, &store, &embeddings).await.unwrap();
        let count = store.len().await;
        index_documents(&docs, &splitter, &store, &embeddings).await.unwrap();

        assert!(first >= 2);
        assert_eq!(store.len().await, count);
    }

    #[tokio::test]
    async fn open_loads_saved_collection_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let embeddings = FakeEmbeddings::default();
        let store = InMemoryVectorStore::new("rag-test");
        let splitter = RecursiveCharacterTextSplitter::new(50);
        index_documents(&[page("prompt engineering basics")], &splitter, &store, &embeddings)
            .await
            .unwrap();
        store.save(dir.path()).await.unwrap();

        let mut config = CragConfig::default();
        config.rag.persist_dir = dir.path().display().to_string();
        config.rag.collection = "rag-test".to_string();
        // Unreachable sources prove nothing is fetched.
        config.rag.urls = vec!["http://127.0.0.1:9/unreachable".to_string()];

        let opened = open_or_build(&config, &embeddings).await.unwrap();
        assert_eq!(opened.len().await, 1);
    }

    #[tokio::test]
    async fn build_without_urls_is_config_error() {
        let config = CragConfig::default();
        let err = build(&config, Vec::new(), &FakeEmbeddings::default()).await.err().unwrap();
        assert!(matches!(err, CragError::Config(_)));
    }
}
