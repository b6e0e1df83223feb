use crate::error::Result;
use crate::project::BookProject;
use std::path::{Path, PathBuf};

mod pandoc;
pub use pandoc::*;

mod prince;
pub use prince::*;

/// Turns a layout's chapters into `output/<name>.html`
pub trait LayoutGenerator {
    /// Create the `layout/...` and `output/` skeleton of the book rooted at `book_root`
    fn scaffold(&self, book_root: &Path) -> Result<()> {
        crate::layout::scaffold(book_root).map(|_| ())
    }

    /// Write `project.html_path()`, or fail with [`crate::error::Error::Generation`]
    fn generate_html(&self, project: &BookProject) -> Result<()>;
}

/// Turns an HTML document into PDF bytes
pub trait PdfRenderer {
    /// Register the stylesheets, in cascade order, for subsequent renders. Replaces any
    /// previously registered set.
    fn add_stylesheets(&mut self, stylesheets: &[PathBuf]);

    /// Render `html` with the registered stylesheets
    fn render_to_pdf(&mut self, html: &str) -> Result<Vec<u8>>;
}
