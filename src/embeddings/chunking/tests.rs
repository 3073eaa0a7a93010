use super::*;
use crate::loader::Document;

fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        chunk_size,
        chunk_overlap,
    }
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_text("Just a short sentence.", &ChunkingConfig::default());

    assert_eq!(chunks, vec!["Just a short sentence.".to_string()]);
}

#[test]
fn alpha_beta_gamma_scenario() {
    let chunks = split_text("Alpha. Beta. Gamma.", &config(10, 2));

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 10, "chunk too long: {:?}", chunk);
    }
    assert!(chunks.iter().any(|c| c.contains("Alpha")));
    assert!(chunks.iter().any(|c| c.contains("Gamma")));
}

#[test]
fn word_merge_keeps_overlap() {
    let chunks = split_text("aaa bbb ccc ddd", &config(8, 4));

    assert_eq!(
        chunks,
        vec![
            "aaa bbb".to_string(),
            "bbb ccc".to_string(),
            "ccc ddd".to_string(),
        ]
    );
}

#[test]
fn prefers_paragraph_boundaries() {
    let text = "First paragraph here.\n\nSecond paragraph here.";
    let chunks = split_text(text, &config(25, 0));

    assert_eq!(
        chunks,
        vec![
            "First paragraph here.".to_string(),
            "Second paragraph here.".to_string(),
        ]
    );
}

#[test]
fn falls_back_to_character_splitting() {
    let chunks = split_text("abcdefgh", &config(4, 1));

    assert_eq!(
        chunks,
        vec!["abcd".to_string(), "defg".to_string(), "gh".to_string()]
    );
}

#[test]
fn chunk_lengths_never_exceed_limit() {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\
                Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.\n\n\
                Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris \
                nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
                reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla."
        .repeat(5);

    for (chunk_size, chunk_overlap) in [(10, 2), (40, 10), (100, 20)] {
        let chunks = split_text(&text, &config(chunk_size, chunk_overlap));
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= chunk_size,
                "chunk of {} chars exceeds limit {}",
                chunk.chars().count(),
                chunk_size
            );
        }
    }
}

#[test]
fn counts_characters_not_bytes() {
    // Four 2-byte characters; must still fit a 4-char chunk.
    let chunks = split_text("éééé", &config(4, 0));

    assert_eq!(chunks, vec!["éééé".to_string()]);
}

#[test]
fn deterministic_for_identical_input() {
    let text = "Alpha. Beta. Gamma. Delta. Epsilon.";
    let cfg = config(12, 3);

    assert_eq!(split_text(text, &cfg), split_text(text, &cfg));
}

#[test]
fn empty_documents_yield_no_chunks() {
    let documents = vec![
        Document {
            text: String::new(),
            source: "empty.txt".to_string(),
        },
        Document {
            text: "   \n\n  ".to_string(),
            source: "blank.txt".to_string(),
        },
    ];

    let chunks = chunk_documents(&documents, &ChunkingConfig::default());

    assert!(chunks.is_empty());
}

#[test]
fn chunks_carry_source_and_index() {
    let documents = vec![
        Document {
            text: "aaa bbb ccc ddd".to_string(),
            source: "one.txt".to_string(),
        },
        Document {
            text: "short".to_string(),
            source: "two.txt".to_string(),
        },
    ];

    let chunks = chunk_documents(&documents, &config(8, 4));

    assert_eq!(chunks.len(), 4);
    assert!(chunks[..3].iter().all(|c| c.source == "one.txt"));
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[1].chunk_index, 1);
    assert_eq!(chunks[2].chunk_index, 2);
    assert_eq!(chunks[3].source, "two.txt");
    assert_eq!(chunks[3].chunk_index, 0);
}
