use clap::Args;

use crate::cli::output::get_formatter;
use crate::error::AppError;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, short = 'n', default_value_t = 200, help = "Maximum chunks to show")]
    pub limit: u32,
}

pub async fn handle_list(
    args: ListArgs,
    format: OutputFormat,
    _verbose: bool,
) -> Result<(), AppError> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let store = super::open_store(&config)?;
    let listings = store.list_chunks(args.limit)?;

    print!("{}", formatter.format_chunk_list(&listings));

    Ok(())
}
