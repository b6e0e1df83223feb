mod fetcher;
pub use fetcher::*;

mod providers;
pub use providers::*;

use derive_builder::Builder;
use std::path::PathBuf;

/// Where to get a book from, and where to put its chapters
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct BookSource {
    /// The remote tree to retrieve (anything the retriever understands)
    pub url: String,
    /// Extension identifying chapter files, e.g. `md` or `textile`
    pub document_type: String,
    /// Directory the book directory lives in
    pub destination_root: PathBuf,
    /// The book directory, relative to `destination_root`; chapters land in its
    /// `layout/chapters/`
    #[builder(default = "PathBuf::from(\"book\")")]
    pub book_dir: PathBuf,
}

impl BookSourceBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.url {
            Some(url) if url.trim().is_empty() => return Err("url must not be empty".into()),
            Some(url) if basename_of(url).is_empty() => {
                return Err(format!("can't derive a clone name from url `{url}`"))
            }
            _ => {}
        }
        if let Some(document_type) = &self.document_type {
            if document_type.trim().is_empty() {
                return Err("document type must not be empty".into());
            }
        }
        Ok(())
    }
}

impl BookSource {
    /// Name of the temporary clone directory: the final url segment up to its first `.`
    pub fn basename(&self) -> String {
        basename_of(&self.url)
    }

    pub fn book_root(&self) -> PathBuf {
        self.destination_root.join(&self.book_dir)
    }

    pub fn chapters_dir(&self) -> PathBuf {
        self.book_root().join("layout").join("chapters")
    }
}

fn basename_of(url: &str) -> String {
    let last = url
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or_default();
    last.split('.').next().unwrap_or_default().to_string()
}
