use miette::Diagnostic;
use thiserror::Error;

use crate::text::FitError;

/// Main error type for cardpress operations
#[derive(Error, Diagnostic, Debug)]
pub enum CardError {
    #[error("IO error: {0}")]
    #[diagnostic(code(cardpress::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(cardpress::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(cardpress::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Font error: {message}")]
    #[diagnostic(code(cardpress::font))]
    Font { message: String },

    #[error("Asset error: {message}")]
    #[diagnostic(code(cardpress::asset))]
    Asset {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(cardpress::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Text in region '{region}' does not fit its box")]
    #[diagnostic(
        code(cardpress::overflow),
        help("Shorten the text; it cannot fit even at the smallest font size")
    )]
    ContentOverflow {
        region: String,
        #[source]
        source: FitError,
    },
}

impl CardError {
    /// Whether this error means the card's text can never fit as authored.
    pub fn is_overflow(&self) -> bool {
        matches!(self, CardError::ContentOverflow { .. })
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
