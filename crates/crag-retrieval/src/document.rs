use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A chunk of text with an identifier and free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Create a document whose id is derived from its content, so the same
    /// text always maps to the same id.
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let id = content_id(&content);
        Self::new(id, content)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

fn content_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
