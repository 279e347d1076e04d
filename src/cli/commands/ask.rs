use std::time::Instant;

use clap::Args;

use crate::cli::output::get_formatter;
use crate::error::{AppError, QueryError};
use crate::models::{AnswerOutcome, Config, OutputFormat};
use crate::services::{AnswerComposer, Retriever};

#[derive(Debug, Args)]
pub struct AskArgs {
    #[arg(required = true, help = "Question to answer from the knowledge base")]
    pub query: String,

    #[arg(long, short = 'k', help = "Number of chunks to ground the answer on")]
    pub top_k: Option<u32>,

    #[arg(long, short = 'm', help = "Completion model to use")]
    pub model: Option<String>,
}

pub async fn handle_ask(args: AskArgs, format: OutputFormat, verbose: bool) -> Result<(), AppError> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(AppError::Other("question cannot be empty".to_string()));
    }

    let config = Config::load()?;
    let formatter = get_formatter(format);
    let k = args.top_k.unwrap_or(config.retrieval.default_top_k) as usize;

    let embedder = super::load_embedder(&config)?;
    let store = super::open_store(&config)?;
    let retriever = Retriever::new(&embedder, &store);

    let retrieve_start = Instant::now();
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
        eprintln!(
            "Retrieved {} chunks in {}ms",
            retrieval.len(),
            retrieve_start.elapsed().as_millis()
        );
        for ranked in &retrieval.ranked {
            eprintln!("  [{}] score {:.3}", ranked.citation, ranked.score);
        }
    }

    let composer = AnswerComposer::new(&config.answer)?;
    let answer = composer
        .compose(&retrieval, args.model.as_deref())
        .await?;

    let outcome = AnswerOutcome { answer, retrieval };
    print!("{}", formatter.format_answer(&outcome));

    Ok(())
}
