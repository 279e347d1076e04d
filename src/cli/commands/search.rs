use std::time::Instant;

use clap::Args;

use crate::cli::output::get_formatter;
use crate::error::{AppError, QueryError};
use crate::models::{Config, OutputFormat};
use crate::services::Retriever;

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Query text")]
    pub query: String,

    #[arg(long, short = 'k', help = "Maximum number of chunks to return")]
    pub top_k: Option<u32>,
}

pub async fn handle_search(
    args: SearchArgs,
    format: OutputFormat,
    verbose: bool,
) -> Result<(), AppError> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(AppError::Other("query cannot be empty".to_string()));
    }

    let config = Config::load()?;
    let formatter = get_formatter(format);
    let k = args.top_k.unwrap_or(config.retrieval.default_top_k) as usize;

    let embedder = super::load_embedder(&config)?;
    let store = super::open_store(&config)?;
    let retriever = Retriever::new(&embedder, &store);

    let start = Instant::now();
    let retrieval = match retriever.retrieve(query, k) {
        Ok(result) => result,
        Err(QueryError::EmptyStore) => {
            println!(
                "{}",
                formatter.format_message(
                    "The knowledge base is empty. Add documents with `kbask ingest` first."
                )
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if verbose {
        eprintln!("Search took {}ms", start.elapsed().as_millis());
    }

    print!("{}", formatter.format_retrieval(&retrieval));

    Ok(())
}
