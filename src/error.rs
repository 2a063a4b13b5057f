use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PlotError> = core::result::Result<T, E>;

/// Failures of a plotting run. Every variant is fatal for the whole run.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("got {jitters} jitter value(s) for {files} file(s); pass one --jitters entry per file or use --nobox")]
    ConfigMismatch { files: usize, jitters: usize },

    #[error("invalid jitter value {value:?}: expected an integer")]
    InvalidJitter { value: String },

    #[error("no percentile rows found for {label:?}")]
    EmptyTable { label: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlotError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
