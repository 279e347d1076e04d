//! Command handlers.

mod ask;
mod clear;
mod config;
mod ingest;
mod list;
mod search;
mod status;

pub use ask::{AskArgs, handle_ask};
pub use clear::{ClearArgs, handle_clear};
pub use config::{ConfigCommand, handle_config};
pub use ingest::{IngestArgs, handle_ingest};
pub use list::{ListArgs, handle_list};
pub use search::{SearchArgs, handle_search};
pub use status::handle_status;

use crate::error::AppError;
use crate::models::Config;
use crate::services::{Embedder, VectorStore};

/// Open the knowledge base named by the configuration.
fn open_store(config: &Config) -> Result<VectorStore, AppError> {
    let path = config.storage.resolved_db_path()?;
    Ok(VectorStore::open(
        &path,
        config.embedding.dimension as usize,
    )?)
}

/// Load the embedding model once; callers share the returned instance.
fn load_embedder(config: &Config) -> Result<Embedder, AppError> {
    let model_dir = config.embedding.resolved_model_dir()?;
    Ok(Embedder::load(&config.embedding, &model_dir)?)
}
