//! Ingest command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::cli::output::{IngestStats, get_formatter};
use crate::error::AppError;
use crate::extract::extract_pages;
use crate::models::{Config, OutputFormat};
use crate::services::{TextChunker, ingest_document};
use crate::utils::is_text_file;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Files or directories to add to the knowledge base
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub async fn handle_ingest(
    args: IngestArgs,
    format: OutputFormat,
    verbose: bool,
) -> Result<(), AppError> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let files = collect_files(&args.paths)?;
    if files.is_empty() {
        println!("{}", formatter.format_message("No documents found to ingest."));
        return Ok(());
    }

    if verbose {
        eprintln!("Found {} files to process", files.len());
    }

    let embedder = super::load_embedder(&config)?;
    let mut store = super::open_store(&config)?;
    let chunker = TextChunker::new(&config.chunking);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut stats = IngestStats {
        files_scanned: files.len() as u64,
        ..Default::default()
    };

    for path in &files {
        pb.inc(1);

        let (name, pages) = match extract_pages(path, config.storage.max_file_size) {
            Ok(extracted) => extracted,
            Err(e) => {
                if verbose {
                    pb.println(format!("Skipping {}: {}", path.display(), e));
                }
                stats.files_skipped += 1;
                continue;
            }
        };

        match ingest_document(&embedder, &mut store, &chunker, &name, &pages) {
            Ok(report) => {
                stats.files_ingested += 1;
                stats.chunks_indexed += report.chunks_indexed as u64;
                if verbose {
                    pb.println(format!(
                        "{}: {} pages -> {} chunks",
                        report.filename, report.pages, report.chunks_indexed
                    ));
                }
            }
            Err(crate::error::IngestionError::NoExtractableText(name)) => {
                if verbose {
                    pb.println(format!("Skipping {}: no extractable text", name));
                }
                stats.files_skipped += 1;
            }
            // Embedding and storage failures abort the run: continuing would
            // hide a broken pipeline behind "skipped" counts
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.into());
            }
        }
    }

    pb.finish_and_clear();
    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    print!("{}", formatter.format_ingest_stats(&stats));

    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.map_err(|e| AppError::Other(format!("walk error: {}", e)))?;
            let entry_path = entry.path();
            if entry_path.is_file() && is_text_file(entry_path) {
                files.push(entry_path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}
