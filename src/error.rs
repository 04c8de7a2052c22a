use std::path::PathBuf;
use thiserror::Error;

use crate::external::CredentialsError;
use crate::forge::ForgeError;

#[derive(Error, Debug)]
pub enum PhorgeError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("No Forge API key configured (set forge.api_key in {path} or PHORGE_API_KEY)")]
    MissingApiKey { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

pub type Result<T> = std::result::Result<T, PhorgeError>;
