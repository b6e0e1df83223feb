//! Scaffolding of the on-disk book layout.
//!
//! A fresh layout gets the chapter, stylesheet and output directories plus the bundled
//! stylesheets. Existing files are never overwritten, so scaffolding an already populated
//! book is harmless.

use crate::error::{Error, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Stylesheets copied into `layout/stylesheets/`, in cascade order
const BASE_STYLESHEETS: &[(&str, &str)] = &[
    (
        "001_reset.css",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/stylesheets/001_reset.css"
        )),
    ),
    (
        "002_base.css",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/stylesheets/002_base.css"
        )),
    ),
];

/// Code styles copied into `layout/stylesheets/highlight/`
const HIGHLIGHT_STYLESHEETS: &[(&str, &str)] = &[
    (
        "lazy",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/stylesheets/highlight/lazy.css"
        )),
    ),
    (
        "solarized",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/stylesheets/highlight/solarized.css"
        )),
    ),
    (
        "monochrome",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/stylesheets/highlight/monochrome.css"
        )),
    ),
];

/// Names of the code styles that ship with a scaffolded layout
pub fn bundled_code_styles() -> Vec<&'static str> {
    HIGHLIGHT_STYLESHEETS.iter().map(|(name, _)| *name).collect()
}

/// Create the layout skeleton under `root` (the book root) and return it.
pub fn scaffold(root: &Path) -> Result<PathBuf> {
    let root = root.to_path_buf();
    let stylesheets = root.join("layout").join("stylesheets");
    let highlight = stylesheets.join("highlight");

    for dir in [
        root.join("layout").join("chapters"),
        highlight.clone(),
        root.join("output"),
    ] {
        std::fs::create_dir_all(&dir).map_err(|e| Error::filesystem(&dir, e))?;
    }

    for (name, contents) in BASE_STYLESHEETS {
        write_if_absent(&stylesheets.join(name), contents)?;
    }
    for (name, contents) in HIGHLIGHT_STYLESHEETS {
        write_if_absent(&highlight.join(format!("{name}.css")), contents)?;
    }

    Ok(root)
}

fn write_if_absent(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        debug!("Keeping existing {}", path.display());
        return Ok(());
    }
    std::fs::write(path, contents).map_err(|e| Error::filesystem(path, e))
}
