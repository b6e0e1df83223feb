//! Fetching a remote book into a local layout.
//!
//! The remote tree is cloned into a temporary directory named after the url's basename
//! (`.chapbook-<basename>`, so it can't clash with the book directory itself), every
//! chapter file in it is moved into `book/layout/chapters/`, and the clone is then
//! removed. Removal happens on every exit path once the clone directory has been claimed,
//! including when the retrieval itself fails half way.
//!
//! Two fetches into the same working directory or the same destination must not run at
//! the same time: neither the clone directory nor the chapter names are namespaced per run.

use super::{BookSource, SourceRetriever};
use crate::error::{Error, Result};
use crate::sinks::LayoutGenerator;
use globset::GlobMatcher;
use ignore::WalkBuilder;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// What to do when two chapter files in a clone share a file name
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The file visited last wins
    #[default]
    Overwrite,
    /// Fail before moving anything
    Reject,
    /// Prefix each file with its directory inside the clone, e.g. `part1_intro.md`
    Namespace,
}

impl CollisionPolicy {
    pub fn all() -> &'static [CollisionPolicy] {
        &[
            CollisionPolicy::Overwrite,
            CollisionPolicy::Reject,
            CollisionPolicy::Namespace,
        ]
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Reject => write!(f, "reject"),
            CollisionPolicy::Namespace => write!(f, "namespace"),
        }
    }
}

pub struct SourceFetcher<R: SourceRetriever> {
    /// Directory the temporary clone is created in
    work_dir: PathBuf,
    retriever: R,
    on_collision: CollisionPolicy,
    /// Chapters whose path inside the clone matches any of these are left behind
    exclude: Vec<GlobMatcher>,
}

impl<R: SourceRetriever> SourceFetcher<R> {
    pub fn new<P: Into<PathBuf>>(work_dir: P, retriever: R) -> SourceFetcher<R> {
        SourceFetcher {
            work_dir: work_dir.into(),
            retriever,
            on_collision: CollisionPolicy::default(),
            exclude: Vec::default(),
        }
    }

    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }

    pub fn exclude(mut self, globs: Vec<GlobMatcher>) -> Self {
        self.exclude = globs;
        self
    }

    /// Retrieve `source` and move its chapter files into the destination layout.
    ///
    /// Returns the number of chapter files moved.
    pub fn fetch(&self, source: &BookSource) -> Result<usize> {
        let chapters_dir = source.chapters_dir();
        if !chapters_dir.is_dir() {
            return Err(Error::filesystem(
                &chapters_dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "chapter directory does not exist",
                ),
            ));
        }

        let clone_dir = self.clone_dir(source);
        if clone_dir.exists() {
            return Err(Error::filesystem(
                &clone_dir,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "refusing to clone over an existing directory",
                ),
            ));
        }

        let clone = TemporaryClone { path: clone_dir };
        info!("Retrieving {}", source.url);
        self.retriever.retrieve(&source.url, &clone.path)?;

        let found = find_chapters(&clone.path, &source.document_type, &self.exclude)?;
        debug!("Found {} chapter file(s) in {}", found.len(), source.url);

        let plan = self.plan_moves(&found, &chapters_dir)?;
        for (from, to) in plan.iter() {
            move_file(&clone.path.join(from), to)?;
            debug!("Moved {} to {}", from.display(), to.display());
        }

        info!(
            "Moved {} chapter file(s) into {}",
            plan.len(),
            chapters_dir.display()
        );
        Ok(plan.len())
    }

    /// Scaffold the destination layout, then fetch into it.
    pub fn fetch_and_return<G: LayoutGenerator>(
        &self,
        source: &BookSource,
        generator: &G,
    ) -> Result<usize> {
        generator.scaffold(&source.book_root())?;
        self.fetch(source)
    }

    /// Where `source` is cloned to while its chapters are extracted
    pub fn clone_dir(&self, source: &BookSource) -> PathBuf {
        self.work_dir.join(format!(".chapbook-{}", source.basename()))
    }

    /// Pair every chapter (relative to the clone) with its destination path
    fn plan_moves(&self, found: &[PathBuf], chapters_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
        let mut seen: HashSet<PathBuf> = HashSet::default();
        let mut plan = Vec::with_capacity(found.len());

        for relative in found {
            let name = match self.on_collision {
                CollisionPolicy::Overwrite | CollisionPolicy::Reject => match relative.file_name() {
                    Some(name) => PathBuf::from(name),
                    None => continue,
                },
                CollisionPolicy::Namespace => PathBuf::from(namespaced_name(relative)),
            };
            let mut destination = chapters_dir.join(&name);

            if seen.contains(&destination) {
                match self.on_collision {
                    CollisionPolicy::Reject => {
                        return Err(Error::ChapterCollision {
                            path: relative.clone(),
                        })
                    }
                    CollisionPolicy::Overwrite => {
                        debug!("{} replaces an earlier {}", relative.display(), name.display())
                    }
                    CollisionPolicy::Namespace => {
                        let mut n = 2;
                        while seen.contains(&destination) {
                            destination = chapters_dir.join(numbered_name(&name, n));
                            n += 1;
                        }
                        debug!("{} renamed to {}", relative.display(), destination.display());
                    }
                }
            }
            seen.insert(destination.clone());
            plan.push((relative.clone(), destination));
        }

        Ok(plan)
    }
}

/// Owns the clone directory and removes it when dropped
struct TemporaryClone {
    path: PathBuf,
}

impl Drop for TemporaryClone {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed temporary clone {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove temporary clone {}: {e}",
                self.path.display()
            ),
        }
    }
}

/// Every file under `root` whose name ends with `document_type`, relative to `root`,
/// in file-name-sorted traversal order
fn find_chapters(
    root: &Path,
    document_type: &str,
    exclude: &[GlobMatcher],
) -> Result<Vec<PathBuf>> {
    let mut chapters = Vec::default();

    let walk = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    for entry in walk {
        let entry = entry.map_err(|e| Error::filesystem(root, std::io::Error::other(e)))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(document_type) {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        if exclude.iter().any(|glob| glob.is_match(&relative)) {
            debug!("Skipping excluded chapter {}", relative.display());
            continue;
        }
        chapters.push(relative);
    }

    Ok(chapters)
}

fn namespaced_name(relative: &Path) -> String {
    relative
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}

/// `intro.md` becomes `intro-2.md`
fn numbered_name(name: &Path, n: usize) -> PathBuf {
    let stem = name.file_stem().unwrap_or_default().to_string_lossy();
    match name.extension() {
        Some(ext) => PathBuf::from(format!("{stem}-{n}.{}", ext.to_string_lossy())),
        None => PathBuf::from(format!("{stem}-{n}")),
    }
}

/// Rename, falling back to copy and delete when the two paths are on different devices
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| Error::filesystem(to, e))?;
    std::fs::remove_file(from).map_err(|e| Error::filesystem(from, e))
}
