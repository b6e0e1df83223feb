//! Error types for the fetch and render pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a fetch or a render.
///
/// None of these are retried; each one aborts the operation that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote source could not be retrieved
    #[error("Failed to retrieve {url}: {reason}")]
    Retrieval { url: String, reason: String },

    /// A path the pipeline depends on is missing or could not be written
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two chapter files map to the same destination under the reject policy
    #[error("Chapter {} would overwrite an earlier chapter with the same name", path.display())]
    ChapterCollision { path: PathBuf },

    /// The layout generator failed
    #[error("Failed to generate HTML for {}: {reason}", location.display())]
    Generation { location: PathBuf, reason: String },

    /// The layout generator reported success but the HTML is not there
    #[error("HTML rendition {} does not exist after generation", path.display())]
    MissingHtml { path: PathBuf },

    /// A required stylesheet is absent
    #[error("Missing stylesheet {}", path.display())]
    MissingAsset { path: PathBuf },

    /// The PDF renderer failed or produced nothing
    #[error("Failed to render PDF: {reason}")]
    Render { reason: String },
}

impl Error {
    pub(crate) fn filesystem<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Error {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}
