use clap::{Parser, Subcommand};
use docqa::Result;
use docqa::commands::{
    DEFAULT_TOP_K, ask_question, build_knowledge_base, search_chunks, show_status,
};
use docqa::config::{Config, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Document question answering over a local vector index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure embedding, answer generation, and chunking settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build (or rebuild) the knowledge base from a directory of documents
    Build {
        /// Directory containing the documents to index
        dir: PathBuf,
    },
    /// Show the chunks retrieved for a query, without calling the LLM
    Search {
        /// Search query
        query: String,
        /// Number of chunks to retrieve
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Ask a question about the indexed documents
    Ask {
        /// The question to answer
        question: String,
        /// Number of context chunks to retrieve
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Show detailed status of the pipeline
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Build { dir } => {
            build_knowledge_base(&Config::load()?, &dir)?;
        }
        Commands::Search { query, top_k } => {
            search_chunks(&Config::load()?, &query, top_k)?;
        }
        Commands::Ask { question, top_k } => {
            ask_question(&Config::load()?, &question, top_k)?;
        }
        Commands::Status => {
            show_status(&Config::load()?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["docqa", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn build_command_with_dir() {
        let cli = Cli::try_parse_from(["docqa", "build", "./docs"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Build { dir } = parsed.command {
                assert_eq!(dir, PathBuf::from("./docs"));
            }
        }
    }

    #[test]
    fn ask_command_with_top_k() {
        let cli = Cli::try_parse_from(["docqa", "ask", "What is this?", "--top-k", "3"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { question, top_k } = parsed.command {
                assert_eq!(question, "What is this?");
                assert_eq!(top_k, 3);
            }
        }
    }

    #[test]
    fn ask_command_default_top_k() {
        let cli = Cli::try_parse_from(["docqa", "ask", "question"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { top_k, .. } = parsed.command {
                assert_eq!(top_k, DEFAULT_TOP_K);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["docqa", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["docqa", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["docqa", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
