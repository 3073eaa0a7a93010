
pub mod flat_index;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::embeddings::{DocumentChunk, Embedder};

pub use flat_index::FlatIndex;

/// File name of the serialized flat index.
pub const INDEX_FILE: &str = "index.bin";
/// File name of the serialized metadata list.
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store is not initialized; build or load it first")]
    Uninitialized,
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Embedder returned {vectors} vectors for {chunks} chunks")]
    EmbedderCountMismatch { vectors: usize, chunks: usize },
    #[error("Index and metadata are out of step: {vectors} vectors vs {records} records")]
    OutOfStep { vectors: usize, records: usize },
    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Index serialization error: {0}")]
    IndexCodec(#[from] bincode::Error),
    #[error("Metadata serialization error: {0}")]
    MetadataCodec(#[from] serde_json::Error),
}

/// Per-chunk sidecar record, stored in the same order as the index vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub text: String,
    pub source: String,
    pub created_at: String,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Position of the matched vector (and metadata record) in the store
    pub position: usize,
    /// Squared L2 distance to the query; lower is more similar
    pub distance: f32,
    pub metadata: ChunkMetadata,
}

/// Owns the flat similarity index and its parallel metadata list, and
/// persists both as two files under the configured directory.
///
/// Invariant: vector `i` in the index corresponds to metadata record `i`;
/// both collections always have equal length.
#[derive(Debug)]
pub struct VectorStore {
    persist_dir: PathBuf,
    index: Option<FlatIndex>,
    metadata: Vec<ChunkMetadata>,
}

impl VectorStore {
    pub fn new(persist_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let persist_dir = persist_dir.into();
        fs::create_dir_all(&persist_dir)?;

        Ok(Self {
            persist_dir,
            index: None,
            metadata: Vec::new(),
        })
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.persist_dir.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.persist_dir.join(METADATA_FILE)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(0, FlatIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed all chunks and append their vectors and metadata records.
    ///
    /// The index is created lazily with the dimensionality of the first
    /// embedding, since that depends on the model. An empty chunk list (or
    /// an embedder returning nothing) leaves the store untouched and returns
    /// `Ok(0)`; callers report that as a warning, not an error.
    pub fn build(
        &mut self,
        chunks: &[DocumentChunk],
        embedder: &dyn Embedder,
    ) -> Result<usize, StoreError> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
        let embeddings = embedder.embed(&texts).map_err(StoreError::Embedding)?;

        if embeddings.is_empty() {
            warn!("No embeddings to add; store left untouched");
            return Ok(0);
        }

        if embeddings.len() != chunks.len() {
            return Err(StoreError::EmbedderCountMismatch {
                vectors: embeddings.len(),
                chunks: chunks.len(),
            });
        }

        let dimension = embeddings[0].len();
        let index = self
            .index
            .get_or_insert_with(|| FlatIndex::new(dimension));
        index.add_batch(&embeddings)?;

        let created_at = chrono::Utc::now().to_rfc3339();
        self.metadata
            .extend(chunks.iter().map(|chunk| ChunkMetadata {
                text: chunk.content.clone(),
                source: chunk.source.clone(),
                created_at: created_at.clone(),
            }));

        let vectors = self.len();
        if vectors != self.metadata.len() {
            return Err(StoreError::OutOfStep {
                vectors,
                records: self.metadata.len(),
            });
        }

        info!("Built index with {} vectors", vectors);
        Ok(embeddings.len())
    }

    /// Serialize the index and metadata to their two files. No-op when no
    /// index exists yet.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(index) = &self.index else {
            debug!("No index to save");
            return Ok(());
        };

        fs::create_dir_all(&self.persist_dir)?;

        let index_bytes = bincode::serialize(index)?;
        fs::write(self.index_path(), index_bytes)?;

        let metadata_bytes = serde_json::to_vec(&self.metadata)?;
        fs::write(self.metadata_path(), metadata_bytes)?;

        info!(
            "Saved index -> {}, metadata -> {}",
            self.index_path().display(),
            self.metadata_path().display()
        );
        Ok(())
    }

    /// Restore the index and metadata from disk.
    ///
    /// Returns `true` only when both artifacts exist, deserialize correctly,
    /// and agree in length. Missing or unreadable files mean "no existing
    /// store": they are logged and reported as `false`, never raised.
    pub fn load(&mut self) -> bool {
        let index_path = self.index_path();
        let metadata_path = self.metadata_path();

        if !index_path.exists() || !metadata_path.exists() {
            debug!("No saved store found in {}", self.persist_dir.display());
            return false;
        }

        match read_artifacts(&index_path, &metadata_path) {
            Ok((index, metadata)) => {
                if index.len() != metadata.len() {
                    warn!(
                        "Persisted store is inconsistent: {} vectors vs {} metadata records",
                        index.len(),
                        metadata.len()
                    );
                    return false;
                }

                info!("Loaded index with {} vectors", index.len());
                self.index = Some(index);
                self.metadata = metadata;
                true
            }
            Err(e) => {
                warn!("Failed to load persisted store: {}", e);
                false
            }
        }
    }

    /// Return up to `top_k` stored records ranked by ascending distance to
    /// the query vector.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, StoreError> {
        let index = self.index.as_ref().ok_or(StoreError::Uninitialized)?;

        let hits = index.search(query, top_k)?;
        Ok(hits
            .into_iter()
            .map(|(position, distance)| SearchHit {
                position,
                distance,
                metadata: self.metadata[position].clone(),
            })
            .collect())
    }
}

fn read_artifacts(
    index_path: &Path,
    metadata_path: &Path,
) -> Result<(FlatIndex, Vec<ChunkMetadata>), StoreError> {
    let index_bytes = fs::read(index_path)?;
    let index: FlatIndex = bincode::deserialize(&index_bytes)?;

    let metadata_bytes = fs::read(metadata_path)?;
    let metadata: Vec<ChunkMetadata> = serde_json::from_slice(&metadata_bytes)?;

    Ok((index, metadata))
}
