//! Settings loaded from `chapbook.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine. Command line
//! flags are applied on top by the caller.

use crate::project::{BookProject, BookProjectBuilder};
use crate::sinks::{PandocGenerator, PrinceRenderer};
use crate::source::CollisionPolicy;
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "chapbook.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub book: BookConfig,
    pub fetch: FetchConfig,
    pub generator: CommandConfig,
    pub renderer: CommandConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Root of the book, relative to the working directory
    pub location: PathBuf,
    pub name: String,
    /// Highlight stylesheet variant, see `layout/stylesheets/highlight/`
    pub code_style: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        BookConfig {
            location: PathBuf::from("book"),
            name: "MyBook".to_string(),
            code_style: "lazy".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub document_type: String,
    pub on_collision: CollisionPolicy,
    /// Globs (relative to the clone) of chapter files to leave behind
    pub exclude: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            document_type: "md".to_string(),
            on_collision: CollisionPolicy::default(),
            exclude: Vec::default(),
        }
    }
}

/// An external command and the extra arguments to give it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Empty means the tool's default command
    pub command: String,
    pub args: Vec<String>,
}

impl Configuration {
    /// Load `chapbook.toml` from `work_dir`, falling back to defaults if there isn't one
    pub fn load(work_dir: &Path) -> Result<Configuration> {
        let path = work_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Configuration::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, work_dir: &Path) -> Result<PathBuf> {
        let path = work_dir.join(CONFIG_FILE);
        let contents = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialise configuration to TOML")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// The book described by this configuration, with its location resolved
    pub fn project(&self, work_dir: &Path) -> Result<BookProject> {
        BookProjectBuilder::default()
            .location(work_dir.join(&self.book.location))
            .name(self.book.name.clone())
            .code_style(self.book.code_style.clone())
            .build()
            .with_context(|| "Failed to build book project")
    }

    pub fn exclude_globs(&self) -> Result<Vec<GlobMatcher>> {
        self.fetch
            .exclude
            .iter()
            .map(|pattern| {
                Glob::new(pattern)
                    .with_context(|| format!("Invalid glob pattern: {}", pattern))
                    .map(|g| g.compile_matcher())
            })
            .collect()
    }

    pub fn generator(&self) -> PandocGenerator {
        let mut generator = PandocGenerator::default();
        if !self.generator.command.is_empty() {
            generator.command = self.generator.command.clone();
        }
        generator.args = self.generator.args.clone();
        generator
    }

    pub fn renderer(&self, project: &BookProject) -> PrinceRenderer {
        let command = match self.renderer.command.as_str() {
            "" => "prince",
            command => command,
        };
        PrinceRenderer::new(command, self.renderer.args.clone()).with_base_url(project.output_dir())
    }
}
