
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions read as plain text. PDF/DOCX/XLSX extraction is out of scope;
/// files with other extensions are skipped with a warning.
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

/// Raw extracted text plus its source file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// Load all supported documents under `data_dir`, recursively.
///
/// Files are visited in sorted order so repeated loads of the same tree are
/// deterministic. A file that cannot be read is logged and skipped; it never
/// aborts the overall load.
pub fn load_all(data_dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(data_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
    {
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !is_supported(path) {
            debug!("Skipping unsupported file: {}", path.display());
            continue;
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                documents.push(Document {
                    text,
                    source: path.display().to_string(),
                });
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
            }
        }
    }

    info!("Loaded {} documents from {}", documents.len(), data_dir.display());
    Ok(documents)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            TEXT_EXTENSIONS.contains(&ext.as_str())
        })
}
