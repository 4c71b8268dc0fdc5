use crag_retrieval::{Document, RecursiveCharacterTextSplitter, TextSplitter};

#[test]
fn recursive_falls_back_to_spaces() {
    let splitter = RecursiveCharacterTextSplitter::new(10);
    let chunks = splitter.split_text("hello world foo bar");
    assert_eq!(chunks, vec!["hello", "world foo", "bar"]);
}

#[test]
fn recursive_keeps_short_text_whole() {
    let splitter = RecursiveCharacterTextSplitter::new(250);
    assert_eq!(splitter.split_text("short"), vec!["short"]);
}

#[test]
fn recursive_prefers_paragraph_breaks() {
    let splitter = RecursiveCharacterTextSplitter::new(12);
    let chunks = splitter.split_text("first para\n\nsecond one");
    assert_eq!(chunks, vec!["first para", "second one"]);
}

#[test]
fn recursive_force_splits_long_words() {
    let splitter = RecursiveCharacterTextSplitter::new(4);
    let chunks = splitter.split_text("abcdefghij");
    assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
}

#[test]
fn chunks_never_exceed_size() {
    let text = "Agents plan tasks. ".repeat(60);
    let splitter = RecursiveCharacterTextSplitter::new(50);
    for chunk in splitter.split_text(&text) {
        assert!(chunk.chars().count() <= 50, "chunk too long: {chunk:?}");
    }
}

#[test]
fn sizes_count_characters_not_bytes() {
    let splitter = RecursiveCharacterTextSplitter::new(3);
    assert_eq!(splitter.split_text("한국어"), vec!["한국어"]);
}

#[test]
fn overlap_repeats_trailing_words() {
    let splitter = RecursiveCharacterTextSplitter::new(10).with_chunk_overlap(5);
    let chunks = splitter.split_text("aa bb cc dd ee");
    assert_eq!(chunks, vec!["aa bb cc", "bb cc dd", "cc dd ee"]);
}

#[test]
fn split_documents_copies_metadata() {
    let splitter = RecursiveCharacterTextSplitter::new(10);
    let doc = Document::new("page", "hello world foo bar").with_metadata("source", "https://a.test");
    let chunks = splitter.split_documents(&[doc]);

    assert_eq!(chunks.len(), 3);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata["source"], "https://a.test");
        assert_eq!(chunk.metadata["chunk"], i);
    }
    assert_ne!(chunks[0].id, chunks[1].id);
}

#[test]
fn split_documents_drops_blank_chunks() {
    let splitter = RecursiveCharacterTextSplitter::new(5);
    let chunks = splitter.split_documents(&[Document::new("d", "abc\n\n   \n\ndef")]);
    let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["abc", "def"]);
}
