//! Bounded per-track embedding galleries.

use super::cosine_similarity;

/// Embeddings at least this similar to a stored one are considered
/// redundant and not appended.
pub const DEFAULT_NOVELTY_THRESHOLD: f32 = 0.85;

/// Similarity of a probe embedding against a gallery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityStats {
    /// Best similarity against any stored embedding
    pub max: f32,
    /// Mean similarity across all stored embeddings
    pub mean: f32,
}

/// A bounded, append-only set of embeddings describing one identity.
///
/// The first stored embedding is the track's representative: it never
/// changes, so callers can re-identify the same person across independent
/// tracking sessions.
#[derive(Debug, Clone)]
pub struct EmbeddingGallery {
    embeddings: Vec<Vec<f32>>,
    capacity: usize,
    novelty_threshold: f32,
}

impl EmbeddingGallery {
    pub fn new(capacity: usize, novelty_threshold: f32) -> Self {
        Self {
            embeddings: Vec::new(),
            capacity,
            novelty_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Append an embedding if the gallery is under capacity and the
    /// embedding is novel: similarity to every stored embedding must be
    /// below the novelty threshold. Returns whether it was stored.
    pub fn try_add(&mut self, embedding: &[f32]) -> bool {
        if self.embeddings.len() >= self.capacity {
            return false;
        }
        let redundant = self
            .embeddings
            .iter()
            .any(|stored| cosine_similarity(stored, embedding) >= self.novelty_threshold);
        if redundant {
            return false;
        }
        self.embeddings.push(embedding.to_vec());
        true
    }

    /// The first stored embedding, stable for the life of the track.
    pub fn representative(&self) -> Option<&[f32]> {
        self.embeddings.first().map(Vec::as_slice)
    }

    /// Max and mean similarity of `probe` against the stored embeddings.
    pub fn similarity_stats(&self, probe: &[f32]) -> Option<SimilarityStats> {
        if self.embeddings.is_empty() {
            return None;
        }
        let mut max = f32::MIN;
        let mut sum = 0.0f32;
        for stored in &self.embeddings {
            let sim = cosine_similarity(stored, probe);
            max = max.max(sim);
            sum += sim;
        }
        Some(SimilarityStats {
            max,
            mean: sum / self.embeddings.len() as f32,
        })
    }
}
