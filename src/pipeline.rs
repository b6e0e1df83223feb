//! The render pipeline: ensure HTML, collect stylesheets, render the PDF.
//!
//! Every stage either completes or aborts the run; nothing is retried. The only
//! incrementality is in [`RenderPipeline::ensure_html`]: if `output/<name>.html` exists
//! it is reused as is, however stale it may be.
//!
//! Renders of the same project must not overlap, the output paths are shared.

use crate::error::{Error, Result};
use crate::project::BookProject;
use crate::sinks::{LayoutGenerator, PdfRenderer};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

pub struct RenderPipeline<G: LayoutGenerator, R: PdfRenderer> {
    generator: G,
    renderer: R,
}

impl<G: LayoutGenerator, R: PdfRenderer> RenderPipeline<G, R> {
    pub fn new(generator: G, renderer: R) -> RenderPipeline<G, R> {
        RenderPipeline {
            generator,
            renderer,
        }
    }

    /// Generate `output/<name>.html` unless it already exists.
    ///
    /// Returns `true` if the generator was invoked.
    pub fn ensure_html(&self, project: &BookProject) -> Result<bool> {
        let html = project.html_path();
        if html.exists() {
            debug!("Reusing existing {}", html.display());
            return Ok(false);
        }

        info!("Generating HTML for {}", project.name);
        self.generator.generate_html(project)?;

        if !html.is_file() {
            return Err(Error::MissingHtml { path: html });
        }
        Ok(true)
    }

    /// Render `output/<name>.pdf`, returning its path.
    pub fn render(&mut self, project: &BookProject) -> Result<PathBuf> {
        self.ensure_html(project)?;
        let stylesheets = collect_stylesheets(project)?;

        let html_path = project.html_path();
        let html = std::fs::read_to_string(&html_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MissingHtml {
                path: html_path.clone(),
            },
            _ => Error::filesystem(&html_path, e),
        })?;

        info!(
            "Rendering {} with {} stylesheet(s)",
            project.pdf_path().display(),
            stylesheets.len()
        );
        self.renderer.add_stylesheets(&stylesheets);
        let pdf = self.renderer.render_to_pdf(&html)?;
        if pdf.is_empty() {
            return Err(Error::Render {
                reason: "renderer returned no bytes".to_string(),
            });
        }

        let pdf_path = project.pdf_path();
        write_atomically(&pdf_path, &pdf)?;
        Ok(pdf_path)
    }
}

/// The stylesheets for a project, in cascade order.
///
/// Every `*.css` file directly under `layout/stylesheets/` sorted by file name, followed
/// by the highlight stylesheet for the project's code style. The highlight stylesheet is
/// always last so its rules win; it must exist.
pub fn collect_stylesheets(project: &BookProject) -> Result<Vec<PathBuf>> {
    let highlight = project.highlight_path();
    if !highlight.is_file() {
        return Err(Error::MissingAsset { path: highlight });
    }

    let dir = project.stylesheets_dir();
    let mut stylesheets = Vec::default();
    for entry in std::fs::read_dir(&dir).map_err(|e| Error::filesystem(&dir, e))? {
        let entry = entry.map_err(|e| Error::filesystem(&dir, e))?;
        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let is_css = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("css"))
            .unwrap_or(false);
        if is_file && is_css {
            stylesheets.push(path);
        }
    }
    stylesheets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    stylesheets.push(highlight);
    Ok(stylesheets)
}

/// Replace `path` with `contents` without ever leaving a truncated file behind
fn write_atomically(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    std::fs::create_dir_all(&dir).map_err(|e| Error::filesystem(&dir, e))?;

    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::filesystem(&dir, e))?;
    file.write_all(contents)
        .map_err(|e| Error::filesystem(path, e))?;
    file.persist(path)
        .map_err(|e| Error::filesystem(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::project::BookProjectBuilder;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    struct FakeGenerator {
        events: Events,
        writes_html: bool,
    }

    impl LayoutGenerator for FakeGenerator {
        fn generate_html(&self, project: &BookProject) -> Result<()> {
            self.events.borrow_mut().push("generate".to_string());
            if self.writes_html {
                std::fs::create_dir_all(project.output_dir()).expect("can create output dir");
                std::fs::write(project.html_path(), "<html><body>generated</body></html>")
                    .expect("can write html");
            }
            Ok(())
        }
    }

    struct FakeRenderer {
        events: Events,
        stylesheets: Vec<PathBuf>,
        fail: bool,
    }

    impl PdfRenderer for FakeRenderer {
        fn add_stylesheets(&mut self, stylesheets: &[PathBuf]) {
            self.stylesheets = stylesheets.to_vec();
        }

        fn render_to_pdf(&mut self, html: &str) -> Result<Vec<u8>> {
            self.events.borrow_mut().push("render".to_string());
            if self.fail {
                return Err(Error::Render {
                    reason: "malformed html".to_string(),
                });
            }
            Ok(format!("%PDF {} {}", self.stylesheets.len(), html).into_bytes())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        project: BookProject,
        events: Events,
    }

    impl Fixture {
        fn new() -> Fixture {
            let dir = tempfile::tempdir().expect("can create temp dir");
            let project = BookProjectBuilder::default()
                .location(dir.path().join("book"))
                .build()
                .expect("can build project");
            std::fs::create_dir_all(project.highlight_dir()).expect("can create highlight dir");
            std::fs::create_dir_all(project.output_dir()).expect("can create output dir");
            std::fs::write(project.highlight_path(), "code {}").expect("can write highlight");
            Fixture {
                _dir: dir,
                project,
                events: Events::default(),
            }
        }

        fn stylesheet(&self, name: &str) -> PathBuf {
            let path = self.project.stylesheets_dir().join(name);
            std::fs::write(&path, "body {}").expect("can write stylesheet");
            path
        }

        fn existing_html(&self) {
            std::fs::write(self.project.html_path(), "<html><body>old</body></html>")
                .expect("can write html");
        }

        fn pipeline(&self, writes_html: bool, fail: bool) -> RenderPipeline<FakeGenerator, FakeRenderer> {
            RenderPipeline::new(
                FakeGenerator {
                    events: self.events.clone(),
                    writes_html,
                },
                FakeRenderer {
                    events: self.events.clone(),
                    stylesheets: Vec::default(),
                    fail,
                },
            )
        }

        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    #[test]
    fn stylesheets_are_sorted_with_highlight_last() {
        let fixture = Fixture::new();
        let base = fixture.stylesheet("002_base.css");
        let reset = fixture.stylesheet("001_reset.css");

        let sheets = collect_stylesheets(&fixture.project).expect("can collect stylesheets");

        assert_eq!(sheets, vec![reset, base, fixture.project.highlight_path()]);
    }

    #[test]
    fn highlight_is_last_regardless_of_name() {
        let mut fixture = Fixture::new();
        fixture.project.code_style = "000_first".to_string();
        std::fs::write(fixture.project.highlight_path(), "code {}").expect("can write highlight");
        fixture.stylesheet("zzz_last.css");

        let sheets = collect_stylesheets(&fixture.project).expect("can collect stylesheets");

        assert_eq!(sheets.last(), Some(&fixture.project.highlight_path()));
        assert_eq!(sheets.len(), 2);
    }

    #[test]
    fn collecting_is_idempotent() {
        let fixture = Fixture::new();
        fixture.stylesheet("010_print.css");
        fixture.stylesheet("001_reset.css");

        let first = collect_stylesheets(&fixture.project).expect("can collect stylesheets");
        let second = collect_stylesheets(&fixture.project).expect("can collect stylesheets");

        assert_eq!(first, second);
    }

    #[test]
    fn only_css_files_are_collected() {
        let fixture = Fixture::new();
        let reset = fixture.stylesheet("001_reset.css");
        fixture.stylesheet("README.txt");
        std::fs::create_dir_all(fixture.project.stylesheets_dir().join("fonts.css"))
            .expect("can create directory");

        let sheets = collect_stylesheets(&fixture.project).expect("can collect stylesheets");

        assert_eq!(sheets, vec![reset, fixture.project.highlight_path()]);
    }

    #[test]
    fn empty_stylesheet_dir_yields_highlight_only() {
        let fixture = Fixture::new();
        let sheets = collect_stylesheets(&fixture.project).expect("can collect stylesheets");
        assert_eq!(sheets, vec![fixture.project.highlight_path()]);
    }

    #[test]
    fn missing_highlight_is_fatal_before_rendering() {
        let mut fixture = Fixture::new();
        fixture.project.code_style = "nonexistent".to_string();
        fixture.existing_html();

        let err = fixture
            .pipeline(true, false)
            .render(&fixture.project)
            .expect_err("render should fail");

        assert!(matches!(err, Error::MissingAsset { .. }));
        assert!(fixture.events().is_empty());
        assert!(!fixture.project.pdf_path().exists());
    }

    #[test]
    fn existing_html_is_never_regenerated() {
        let fixture = Fixture::new();
        fixture.existing_html();
        let mut pipeline = fixture.pipeline(true, false);

        pipeline.render(&fixture.project).expect("can render");
        pipeline.render(&fixture.project).expect("can render again");

        assert_eq!(fixture.events(), vec!["render", "render"]);
        let pdf = std::fs::read_to_string(fixture.project.pdf_path()).expect("pdf was written");
        assert!(pdf.contains("old"));
    }

    #[test]
    fn generates_html_then_renders_pdf() {
        let fixture = Fixture::new();
        fixture.stylesheet("001_reset.css");

        let pdf_path = fixture
            .pipeline(true, false)
            .render(&fixture.project)
            .expect("can render");

        assert_eq!(fixture.events(), vec!["generate", "render"]);
        assert!(fixture.project.html_path().is_file());
        assert_eq!(pdf_path, fixture.project.pdf_path());
        let pdf = std::fs::read_to_string(&pdf_path).expect("pdf was written");
        assert_eq!(pdf, "%PDF 2 <html><body>generated</body></html>");
    }

    #[test]
    fn generator_without_output_is_fatal() {
        let fixture = Fixture::new();

        let err = fixture
            .pipeline(false, false)
            .render(&fixture.project)
            .expect_err("render should fail");

        assert!(matches!(err, Error::MissingHtml { .. }));
        assert_eq!(fixture.events(), vec!["generate"]);
    }

    #[test]
    fn ensure_html_reports_whether_it_generated() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(true, false);

        assert!(pipeline.ensure_html(&fixture.project).expect("can ensure html"));
        assert!(!pipeline.ensure_html(&fixture.project).expect("can ensure html"));
        assert_eq!(fixture.events(), vec!["generate"]);
    }

    #[test]
    fn renderer_failure_keeps_previous_pdf() {
        let fixture = Fixture::new();
        fixture.existing_html();
        std::fs::write(fixture.project.pdf_path(), "previous").expect("can write pdf");

        let err = fixture
            .pipeline(true, true)
            .render(&fixture.project)
            .expect_err("render should fail");

        assert!(matches!(err, Error::Render { .. }));
        let pdf = std::fs::read_to_string(fixture.project.pdf_path()).expect("pdf still exists");
        assert_eq!(pdf, "previous");
    }

    #[test]
    fn render_overwrites_existing_pdf() {
        let fixture = Fixture::new();
        fixture.existing_html();
        std::fs::write(fixture.project.pdf_path(), "previous").expect("can write pdf");

        fixture
            .pipeline(true, false)
            .render(&fixture.project)
            .expect("can render");

        let pdf = std::fs::read_to_string(fixture.project.pdf_path()).expect("pdf was written");
        assert_eq!(pdf, "%PDF 1 <html><body>old</body></html>");
    }
}
