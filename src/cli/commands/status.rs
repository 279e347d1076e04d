use crate::cli::output::{StatusInfo, get_formatter};
use crate::error::AppError;
use crate::models::{Config, OutputFormat};

pub async fn handle_status(format: OutputFormat, verbose: bool) -> Result<(), AppError> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let db_path = config.storage.resolved_db_path()?;
    let store = super::open_store(&config)?;

    let model_dir = config.embedding.resolved_model_dir()?;
    let model_present = model_dir.join("model.onnx").exists();

    let status = StatusInfo {
        db_path: db_path.display().to_string(),
        document_count: store.document_count()?,
        chunk_count: store.chunk_count()?,
        model_dir: model_dir.display().to_string(),
        model_present,
        dimension: config.embedding.dimension,
    };

    print!("{}", formatter.format_status(&status));

    if verbose {
        for doc in store.documents()? {
            eprintln!(
                "  {} ({} pages, added {})",
                doc.filename, doc.page_count, doc.created_at
            );
        }
    }

    if !model_present {
        eprintln!();
        eprintln!(
            "Hint: place model.onnx and tokenizer.json under {}",
            model_dir.display()
        );
    }

    Ok(())
}
