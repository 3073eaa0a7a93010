// Embeddings module
// Text chunking plus the embedding backend used for documents and queries

pub mod chunking;
pub mod ollama;

use anyhow::Result;

pub use chunking::{ChunkingConfig, DocumentChunk, chunk_documents, split_text};
pub use ollama::OllamaClient;

/// A text-embedding backend.
///
/// The same instance must be used for document and query embedding: vectors
/// produced by different models are not comparable. The backend is passed
/// explicitly wherever embeddings are needed so tests can substitute a
/// deterministic implementation.
pub trait Embedder {
    /// Embed each text, returning one vector per input in input order.
    /// Embedding a text is independent of its batch neighbors. An empty
    /// input yields an empty result without contacting the backend.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding backend returned no vector"))
    }
}
