use std::path::PathBuf;

use thiserror::Error;

use crate::{bridge::HostError, transcript::TranscriptError};

#[derive(Error, Debug)]
pub enum WordjumpError {
    #[error("Host bridge error: {0}")]
    Host(#[from] HostError),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("Invalid config file {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WordjumpError>;
