use async_trait::async_trait;
use crag_core::{CragError, Embeddings};
use sha2::{Digest, Sha256};

/// Deterministic bag-of-words embeddings for tests and offline runs.
///
/// Each lowercase word is hashed into one of `dimensions` buckets and the
/// resulting counts are L2-normalised, so texts sharing words score higher.
#[derive(Debug, Clone)]
pub struct FakeEmbeddings {
    dimensions: usize,
}

impl FakeEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % self.dimensions;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for FakeEmbeddings {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embeddings for FakeEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CragError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, CragError> {
        Ok(self.embed(text))
    }
}
