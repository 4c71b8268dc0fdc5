use std::sync::Arc;

use crag_retrieval::{
    Document, FakeEmbeddings, InMemoryVectorStore, Retriever, VectorStore, VectorStoreRetriever,
};

fn corpus() -> Vec<Document> {
    vec![
        Document::new("1", "The cat sat on the mat"),
        Document::new("2", "The dog played in the park"),
        Document::new("3", "A fish swam in the ocean"),
    ]
}

#[tokio::test]
async fn add_and_search() {
    let store = InMemoryVectorStore::new("test");
    let embeddings = FakeEmbeddings::default();

    let ids = store.add_documents(corpus(), &embeddings).await.unwrap();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let results = store.similarity_search("cat on mat", 2, &embeddings).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "1");
}

#[tokio::test]
async fn exact_match_scores_near_one() {
    let store = InMemoryVectorStore::new("test");
    let embeddings = FakeEmbeddings::default();
    store
        .add_documents(
            vec![Document::new("a", "hello world"), Document::new("b", "goodbye moon")],
            &embeddings,
        )
        .await
        .unwrap();

    let results = store
        .similarity_search_with_score("hello world", 2, &embeddings)
        .await
        .unwrap();
    assert_eq!(results[0].0.id, "a");
    assert!(results[0].1 > 0.99, "exact match score: {}", results[0].1);
    assert!(results[0].1 >= results[1].1);
}

#[tokio::test]
async fn same_id_replaces_entry() {
    let store = InMemoryVectorStore::new("test");
    let embeddings = FakeEmbeddings::default();
    store.add_documents(vec![Document::new("1", "old")], &embeddings).await.unwrap();
    store.add_documents(vec![Document::new("1", "new")], &embeddings).await.unwrap();

    assert_eq!(store.len().await, 1);
    let results = store.similarity_search("new", 1, &embeddings).await.unwrap();
    assert_eq!(results[0].content, "new");
}

#[tokio::test]
async fn retriever_returns_top_k() {
    let store = Arc::new(InMemoryVectorStore::new("test"));
    let embeddings = Arc::new(FakeEmbeddings::default());
    store.add_documents(corpus(), embeddings.as_ref()).await.unwrap();

    let retriever = VectorStoreRetriever::new(store.clone(), embeddings.clone());
    assert_eq!(retriever.retrieve("fish ocean").await.unwrap().len(), 3);

    let retriever = VectorStoreRetriever::new(store, embeddings).with_k(1);
    let docs = retriever.retrieve("fish ocean").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "3");
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let embeddings = FakeEmbeddings::default();

    let store = InMemoryVectorStore::new("rag-chroma");
    store.add_documents(corpus(), &embeddings).await.unwrap();
    store.save(dir.path()).await.unwrap();
    assert!(dir.path().join("rag-chroma.json").exists());

    let loaded = InMemoryVectorStore::load(dir.path(), "rag-chroma")
        .await
        .unwrap()
        .expect("snapshot should exist");
    assert_eq!(loaded.collection(), "rag-chroma");
    assert_eq!(loaded.len().await, 3);
    let results = loaded.similarity_search("dog park", 1, &embeddings).await.unwrap();
    assert_eq!(results[0].id, "2");
}

#[tokio::test]
async fn load_missing_snapshot_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = InMemoryVectorStore::load(dir.path(), "nothing").await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn save_creates_persist_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("chroma_db");
    let store = InMemoryVectorStore::new("c");
    store.save(&nested).await.unwrap();
    assert!(nested.join("c.json").exists());
}
