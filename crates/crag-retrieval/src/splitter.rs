use serde_json::json;

use crate::Document;

/// Splits text into chunks.
pub trait TextSplitter: Send + Sync {
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split each document's content, copying its metadata onto every chunk
    /// and recording the chunk position under `chunk`. Chunk ids are derived
    /// from their content.
    fn split_documents(&self, docs: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();
        for doc in docs {
            for (index, chunk) in self
                .split_text(&doc.content)
                .into_iter()
                .filter(|c| !c.trim().is_empty())
                .enumerate()
            {
                let mut piece = Document::from_content(chunk);
                piece.metadata = doc.metadata.clone();
                piece.metadata.insert("chunk".to_string(), json!(index));
                out.push(piece);
            }
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Joins consecutive splits with `separator` while the result stays within
/// `chunk_size` characters. With a non-zero `overlap`, trailing splits of the
/// previous chunk totalling at most `overlap` characters start the next one.
fn merge_splits(splits: &[&str], chunk_size: usize, overlap: usize, separator: &str) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for &split in splits {
        let split_len = char_len(split);
        let joined_len = if current.is_empty() { 0 } else { sep_len };

        if !current.is_empty() && current_len + joined_len + split_len > chunk_size {
            chunks.push(current.join(separator));
            if overlap == 0 {
                current.clear();
                current_len = 0;
            } else {
                while !current.is_empty()
                    && (current_len > overlap
                        || current_len + sep_len + split_len > chunk_size)
                {
                    let removed = current.remove(0);
                    current_len = current_len.saturating_sub(char_len(removed) + sep_len);
                }
                if current.is_empty() {
                    current_len = 0;
                }
            }
        }

        current_len += if current.is_empty() { split_len } else { sep_len + split_len };
        current.push(split);
    }

    if !current.is_empty() {
        chunks.push(current.join(separator));
    }
    chunks
}

/// Splits text with a hierarchy of separators, falling back to the next
/// separator for any piece still longer than `chunk_size` characters.
///
/// Default separators are `["\n\n", "\n", " ", ""]`, where the empty separator
/// cuts at character boundaries.
pub struct RecursiveCharacterTextSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
            chunk_size: chunk_size.max(1),
            chunk_overlap: 0,
        }
    }

    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    fn force_split(&self, text: &str) -> Vec<String> {
        text.chars()
            .collect::<Vec<char>>()
            .chunks(self.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn split_recursive(&self, text: &str, depth: usize) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        let Some(separator) = self.separators.get(depth) else {
            return self.force_split(text);
        };
        if separator.is_empty() {
            return self.force_split(text);
        }

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for split in text.split(separator.as_str()) {
            if char_len(split) <= self.chunk_size {
                pending.push(split);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(merge_splits(&pending, self.chunk_size, self.chunk_overlap, separator));
                pending.clear();
            }
            chunks.extend(self.split_recursive(split, depth + 1));
        }
        if !pending.is_empty() {
            chunks.extend(merge_splits(&pending, self.chunk_size, self.chunk_overlap, separator));
        }
        chunks
    }
}

impl TextSplitter for RecursiveCharacterTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, 0)
    }
}
