//! Crate-level error taxonomy.
//!
//! Every variant aborts the whole operation; nothing here is retried.
use std::path::PathBuf;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::fetch::FetchError;
use crate::inference::InferError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode JSON: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Infer(#[from] InferError),

    #[error("failed to render schema: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("JSON pointer `{pointer}` matched nothing")]
    PointerNotFound { pointer: String },

    #[error("jq pre-filter failed: {0}")]
    Jq(anyhow::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
