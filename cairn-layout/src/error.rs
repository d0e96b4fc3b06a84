//! Layout error types.

use cairn_api::EntryId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no block template named `{0}`")]
    MissingTemplate(String),

    #[error("template error: {0}")]
    Template(#[from] mustache::Error),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("no container entry {0}")]
    UnknownEntry(EntryId),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
