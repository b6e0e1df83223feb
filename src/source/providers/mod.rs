mod git_repository;
pub use git_repository::*;

use crate::error::Result;
use std::path::Path;

/// Something that can materialise a remote tree on local disk
pub trait SourceRetriever {
    /// Retrieve the full tree at `url` into `into`, which must not already exist.
    ///
    /// Failures are reported as [`crate::error::Error::Retrieval`].
    fn retrieve(&self, url: &str, into: &Path) -> Result<()>;
}
