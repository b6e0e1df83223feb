use derive_builder::Builder;
use std::path::PathBuf;

/// A book on disk, laid out as:
///
/// ```text
/// <location>/
///   layout/
///     chapters/
///     stylesheets/
///       NNN_name.css
///       highlight/<style>.css
///   output/
///     <name>.html
///     <name>.pdf
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct BookProject {
    /// Root directory of the book (the one containing `layout/` and `output/`)
    pub location: PathBuf,
    /// Logical name of the book, used to name the output files
    #[builder(default = "\"MyBook\".to_string()")]
    pub name: String,
    /// Which highlight stylesheet variant to apply to code blocks
    #[builder(default = "\"lazy\".to_string()")]
    pub code_style: String,
}

impl BookProject {
    pub fn layout_dir(&self) -> PathBuf {
        self.location.join("layout")
    }

    pub fn chapters_dir(&self) -> PathBuf {
        self.layout_dir().join("chapters")
    }

    pub fn stylesheets_dir(&self) -> PathBuf {
        self.layout_dir().join("stylesheets")
    }

    pub fn highlight_dir(&self) -> PathBuf {
        self.stylesheets_dir().join("highlight")
    }

    /// The highlight stylesheet selected by `code_style`
    pub fn highlight_path(&self) -> PathBuf {
        let file_name = if self.code_style.ends_with(".css") {
            self.code_style.clone()
        } else {
            format!("{}.css", self.code_style)
        };
        self.highlight_dir().join(file_name)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.location.join("output")
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.html", self.name))
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.pdf", self.name))
    }
}
