use clap::Args;

use crate::cli::output::get_formatter;
use crate::error::AppError;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub force: bool,
}

pub async fn handle_clear(
    args: ClearArgs,
    format: OutputFormat,
    verbose: bool,
) -> Result<(), AppError> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    if verbose {
        eprintln!("Clearing the knowledge base...");
    }

    if !args.force {
        println!("This will delete ALL stored documents and chunks. Continue? [y/N]");
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::Other(e.to_string()))?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.format_message("Cancelled."));
            return Ok(());
        }
    }

    let mut store = super::open_store(&config)?;
    store.clear()?;

    println!("{}", formatter.format_message("Knowledge base cleared."));

    Ok(())
}
