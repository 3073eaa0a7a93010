#[cfg(test)]
mod tests;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::loader::Document;

/// Separator preference order: paragraph break, line break, word boundary,
/// then individual characters as the last resort.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// A bounded-length piece of a document, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// The chunk text
    pub content: String,
    /// Source file path of the originating document
    pub source: String,
    /// Position of this chunk within its document
    pub chunk_index: usize,
}

/// Split every document into retrieval-ready chunks, in document order.
///
/// Documents with empty or whitespace-only text yield no chunks.
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();

    for document in documents {
        if document.text.trim().is_empty() {
            debug!("Skipping document with no text: {}", document.source);
            continue;
        }

        for (chunk_index, content) in split_text(&document.text, config).into_iter().enumerate() {
            chunks.push(DocumentChunk {
                content,
                source: document.source.clone(),
                chunk_index,
            });
        }
    }

    debug!(
        "Split {} documents into {} chunks",
        documents.len(),
        chunks.len()
    );
    chunks
}

/// Split text into chunks of at most `chunk_size` characters.
///
/// The text is split on the largest separator that still appears in it;
/// pieces that remain too long are split again with the smaller separators.
/// Adjacent short pieces are merged back together, and each merged chunk
/// keeps up to `chunk_overlap` trailing characters of its predecessor.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    split_recursive(text, &SEPARATORS, config)
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkingConfig) -> Vec<String> {
    let (separator, remaining) = select_separator(text, separators);

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|piece| !piece.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in pieces {
        if char_len(&piece) <= config.chunk_size {
            pending.push(piece);
        } else {
            if !pending.is_empty() {
                merge_pieces(&pending, separator, config, &mut chunks);
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(split_recursive(&piece, remaining, config));
            }
        }
    }

    if !pending.is_empty() {
        merge_pieces(&pending, separator, config, &mut chunks);
    }

    chunks
}

/// Pick the first separator that occurs in the text. The empty separator
/// always matches, so the fallback is character-level splitting.
fn select_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Merge pieces (each already at most `chunk_size` long) into chunks,
/// re-joining them with the separator they were split on. When a chunk is
/// emitted, pieces are dropped from the front of the window until at most
/// `chunk_overlap` characters remain to seed the next chunk.
fn merge_pieces(
    pieces: &[String],
    separator: &str,
    config: &ChunkingConfig,
    chunks: &mut Vec<String>,
) {
    let separator_len = char_len(separator);
    let mut window: VecDeque<&String> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let piece_len = char_len(piece);

        if !window.is_empty() && total + piece_len + separator_len > config.chunk_size {
            push_joined(&window, separator, chunks);

            while total > config.chunk_overlap
                || (total + piece_len + separator_len > config.chunk_size && total > 0)
            {
                match window.pop_front() {
                    Some(removed) => {
                        total -= char_len(removed)
                            + if window.is_empty() { 0 } else { separator_len };
                    }
                    None => break,
                }
            }
        }

        if !window.is_empty() {
            total += separator_len;
        }
        total += piece_len;
        window.push_back(piece);
    }

    push_joined(&window, separator, chunks);
}

fn push_joined(window: &VecDeque<&String>, separator: &str, chunks: &mut Vec<String>) {
    let joined = window.iter().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
