use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use itertools::Itertools;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::embeddings::{Embedder, OllamaClient, chunk_documents};
use crate::llm::{API_KEY_ENV, LlmClient};
use crate::loader;
use crate::store::VectorStore;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Load documents from `data_dir`, chunk and embed them, and persist the
/// resulting store.
pub fn build_knowledge_base(config: &Config, data_dir: &Path) -> Result<()> {
    let embedder = create_embedder(config)?;

    let documents = loader::load_all(data_dir)?;
    if documents.is_empty() {
        println!(
            "{} No documents found in {} to index.",
            style("⚠").yellow(),
            data_dir.display()
        );
        return Ok(());
    }

    let chunks = chunk_documents(&documents, &config.chunking);
    println!(
        "Loaded {} document(s), {} chunk(s).",
        documents.len(),
        chunks.len()
    );

    let mut store = VectorStore::new(config.persist_dir())?;

    let spinner = spinner("Embedding and building index...");
    let added = store.build(&chunks, &embedder);
    spinner.finish_and_clear();
    let added = added?;

    if added == 0 {
        println!(
            "{} No content to embed; nothing was persisted.",
            style("⚠").yellow()
        );
        return Ok(());
    }

    store.save()?;
    info!("Knowledge base built with {} vectors", added);
    println!(
        "{} Knowledge base built and saved: {} vectors in {}",
        style("✓").green(),
        added,
        store.persist_dir().display()
    );

    Ok(())
}

/// Retrieval-only search: print the top chunks for a query.
pub fn search_chunks(config: &Config, query: &str, top_k: usize) -> Result<()> {
    let Some(store) = open_store(config)? else {
        return Ok(());
    };

    let embedder = create_embedder(config)?;
    let query_vector = embedder
        .embed_one(query)
        .context("Failed to embed the query")?;
    let hits = store.search(&query_vector, top_k)?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for hit in &hits {
        println!(
            "{} {}",
            style(format!("#{}", hit.position)).bold(),
            style(format!("(distance {:.4})", hit.distance)).dim()
        );
        println!("   Source: {}", hit.metadata.source);
        println!("   {}", preview(&hit.metadata.text, 200));
        println!();
    }

    Ok(())
}

/// Answer a question: retrieve context from the store and pass it to the
/// answer-generation model.
pub fn ask_question(config: &Config, question: &str, top_k: usize) -> Result<()> {
    let Some(store) = open_store(config)? else {
        return Ok(());
    };

    let embedder = create_embedder(config)?;
    let Some(context) = retrieve_context(&store, &embedder, question, top_k)? else {
        println!("No relevant content found for this question.");
        return Ok(());
    };

    let llm = LlmClient::new(&config.llm).context("Answer generation is not configured")?;
    let prompt = build_prompt(question, &context);

    let spinner = spinner("Generating answer...");
    let answer = llm.generate(&prompt);
    spinner.finish_and_clear();
    let answer = answer.context("Failed to generate an answer")?;

    println!("{}", style("Answer").bold().cyan());
    println!("{}", answer);

    Ok(())
}

/// Show the state of the pipeline: configuration, embedding backend health,
/// and the persisted store.
pub fn show_status(config: &Config) -> Result<()> {
    println!("📊 DocQA Status");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Embedding (Ollama):");
    match OllamaClient::new(config.ollama.clone()) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("   📋 Model: {}", config.ollama.model);
                println!("   🔢 Batch Size: {}", config.ollama.batch_size);
            }
            Err(e) => {
                println!("   ⚠️  Reachable but unhealthy - {}", e);
            }
        },
        Err(e) => {
            println!("   ❌ Failed to create client - {}", e);
        }
    }

    println!();
    println!("🔍 Vector Store:");
    let mut store = VectorStore::new(config.persist_dir())?;
    if store.load() {
        println!(
            "   ✅ {} vectors in {}",
            store.len(),
            store.persist_dir().display()
        );
    } else {
        println!(
            "   📭 No knowledge base at {}",
            store.persist_dir().display()
        );
    }

    println!();
    println!("💬 Answer Generation:");
    println!("   📋 Model: {}", config.llm.model);
    println!("   🌐 Endpoint: {}", config.llm.base_url);
    let key_set = std::env::var(API_KEY_ENV).is_ok_and(|key| !key.trim().is_empty());
    if key_set {
        println!("   🔑 {}: set", API_KEY_ENV);
    } else {
        println!("   ⚠️  {}: not set", API_KEY_ENV);
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'docqa build <dir>' to index a directory of documents");
    println!("   • Use 'docqa search <query>' to inspect retrieved chunks");
    println!("   • Use 'docqa ask <question>' to get an answer");

    Ok(())
}

/// Embed the query, search the store, and join the retrieved chunk texts
/// into one context block. `None` means nothing relevant was stored; the
/// caller reports that instead of invoking the LLM.
pub fn retrieve_context(
    store: &VectorStore,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> Result<Option<String>> {
    let query_vector = embedder
        .embed_one(query)
        .context("Failed to embed the query")?;
    let hits = store.search(&query_vector, top_k)?;

    let context = hits
        .iter()
        .map(|hit| hit.metadata.text.trim())
        .filter(|text| !text.is_empty())
        .join("\n\n");

    Ok((!context.is_empty()).then_some(context))
}

/// Format the answer-generation prompt from the query and retrieved context.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Use the following context to answer the query: \"{query}\"\n\n\
         Context:\n{context}\n\n\
         Answer concisely:"
    )
}

/// Construct the embedding client and fail fast when the server or model is
/// unavailable; the pipeline cannot operate without it.
fn create_embedder(config: &Config) -> Result<OllamaClient> {
    let client = OllamaClient::new(config.ollama.clone())
        .context("Failed to create embedding client")?;
    client
        .health_check()
        .context("Embedding model is unavailable")?;
    Ok(client)
}

/// Open and load the persisted store, printing guidance when none exists.
fn open_store(config: &Config) -> Result<Option<VectorStore>> {
    let mut store = VectorStore::new(config.persist_dir())?;
    if store.load() {
        Ok(Some(store))
    } else {
        println!(
            "{} No knowledge base found. Run 'docqa build <dir>' first.",
            style("⚠").yellow()
        );
        Ok(None)
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        preview.push('…');
    }
    preview.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_query_and_context() {
        let prompt = build_prompt("What is Rust?", "Rust is a language.");

        assert!(prompt.contains("\"What is Rust?\""));
        assert!(prompt.contains("Context:\nRust is a language."));
        assert!(prompt.ends_with("Answer concisely:"));
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 3), "ééé…");
        assert_eq!(preview("line\nbreak", 20), "line break");
    }
}
