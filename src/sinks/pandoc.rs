use super::LayoutGenerator;
use crate::error::{Error, Result};
use crate::project::BookProject;
use log::{debug, info};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Generates the HTML rendition by running pandoc (or a compatible command) over the
/// chapter files
#[derive(Debug, Clone)]
pub struct PandocGenerator {
    pub command: String,
    /// Extra arguments placed before the ones the generator adds
    pub args: Vec<String>,
}

impl Default for PandocGenerator {
    fn default() -> Self {
        PandocGenerator {
            command: "pandoc".to_string(),
            args: Vec::default(),
        }
    }
}

impl PandocGenerator {
    fn command_args(&self, project: &BookProject, chapters: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push("--standalone".into());
        args.push("--metadata".into());
        args.push(format!("title={}", project.name).into());
        args.push("--metadata".into());
        args.push(format!("code-style={}", project.code_style).into());
        args.push("--output".into());
        args.push(project.html_path().into());
        args.extend(chapters.iter().map(|c| c.clone().into_os_string()));
        args
    }
}

/// Chapter files directly under the chapters directory, sorted by file name
fn chapter_files(project: &BookProject) -> Result<Vec<PathBuf>> {
    let dir = project.chapters_dir();
    let entries = std::fs::read_dir(&dir).map_err(|e| Error::Generation {
        location: project.location.clone(),
        reason: format!("can't read {}: {e}", dir.display()),
    })?;

    let mut chapters = Vec::default();
    for entry in entries {
        let entry = entry.map_err(|e| Error::filesystem(&dir, e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            chapters.push(entry.path());
        }
    }
    chapters.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(chapters)
}

impl LayoutGenerator for PandocGenerator {
    fn generate_html(&self, project: &BookProject) -> Result<()> {
        let chapters = chapter_files(project)?;
        if chapters.is_empty() {
            return Err(Error::Generation {
                location: project.location.clone(),
                reason: format!("no chapter files in {}", project.chapters_dir().display()),
            });
        }

        let output_dir = project.output_dir();
        std::fs::create_dir_all(&output_dir).map_err(|e| Error::filesystem(&output_dir, e))?;

        info!(
            "Generating {} from {} chapter(s)",
            project.html_path().display(),
            chapters.len()
        );
        let args = self.command_args(project, &chapters);
        debug!("Running {} {:?}", self.command, args);

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .map_err(|e| Error::Generation {
                location: project.location.clone(),
                reason: format!("failed to start `{}`: {e}", self.command),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Generation {
                location: project.location.clone(),
                reason: format!("`{}` exited with {}: {}", self.command, output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}
