use super::PdfRenderer;
use crate::error::{Error, Result};
use log::debug;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders PDFs with Prince (or a compatible command line renderer)
#[derive(Debug, Clone)]
pub struct PrinceRenderer {
    pub command: String,
    /// Extra arguments placed before the ones the renderer adds
    pub args: Vec<String>,
    /// Where relative links in the HTML (images, fonts) are resolved from
    pub base_url: Option<PathBuf>,
    stylesheets: Vec<PathBuf>,
}

impl Default for PrinceRenderer {
    fn default() -> Self {
        PrinceRenderer::new("prince", Vec::default())
    }
}

impl PrinceRenderer {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> PrinceRenderer {
        PrinceRenderer {
            command: command.into(),
            args,
            base_url: None,
            stylesheets: Vec::default(),
        }
    }

    pub fn with_base_url<P: Into<PathBuf>>(mut self, base_url: P) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn command_args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        for stylesheet in self.stylesheets.iter() {
            let mut arg = OsString::from("--style=");
            arg.push(stylesheet);
            args.push(arg);
        }
        if let Some(base_url) = &self.base_url {
            let mut arg = OsString::from("--baseurl=");
            arg.push(base_url);
            args.push(arg);
        }
        args.push(input.into());
        args.push("-o".into());
        args.push("-".into());
        args
    }
}

impl PdfRenderer for PrinceRenderer {
    fn add_stylesheets(&mut self, stylesheets: &[PathBuf]) {
        self.stylesheets = stylesheets.to_vec();
    }

    fn render_to_pdf(&mut self, html: &str) -> Result<Vec<u8>> {
        let mut input = tempfile::Builder::new()
            .prefix("chapbook-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| Error::filesystem(std::env::temp_dir(), e))?;
        let written = input.write_all(html.as_bytes()).and_then(|_| input.flush());
        if let Err(e) = written {
            return Err(Error::filesystem(input.path(), e));
        }

        let args = self.command_args(input.path());
        debug!("Running {} {:?}", self.command, args);

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .map_err(|e| Error::Render {
                reason: format!("failed to start `{}`: {e}", self.command),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Render {
                reason: format!("`{}` exited with {}: {}", self.command, output.status, stderr.trim()),
            });
        }
        if output.stdout.is_empty() {
            return Err(Error::Render {
                reason: format!("`{}` produced no output", self.command),
            });
        }

        Ok(output.stdout)
    }
}
