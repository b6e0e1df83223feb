use super::SourceRetriever;
use crate::error::{Error, Result};
use log::debug;
use std::path::Path;

/// Retrieves sources by cloning a git repository
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRetriever;

impl SourceRetriever for GitRetriever {
    fn retrieve(&self, url: &str, into: &Path) -> Result<()> {
        debug!("Cloning {url} into {}", into.display());
        let repo = git2::Repository::clone(url, into).map_err(|e| Error::Retrieval {
            url: url.to_string(),
            reason: e.message().to_string(),
        })?;

        if let Ok(head) = repo.head() {
            if let Some(oid) = head.target() {
                debug!("Cloned {url} at {oid}");
            }
        }
        Ok(())
    }
}
