use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised by the exporter.
///
/// These travel inside [`anyhow::Error`]; use `err.downcast_ref::<ExportError>()`
/// to branch on a specific kind.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory was not supplied.
    #[error("output directory must be provided")]
    MissingOutputDir,

    /// An export option is outside its accepted range.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// The output directory could not be created.
    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pixel buffer with a channel count the codecs cannot take.
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    /// Encoding or writing one image of the batch failed.
    #[error("failed to save image {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
