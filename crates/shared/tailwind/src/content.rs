//! Which files a document's `content` globs select.

use crate::document::TailwindConfig;
use crate::error::{TailwindError, TailwindErrorExt};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const NODE_MODULES: &str = "node_modules";

pub(crate) fn compile_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(split_negation(pattern).1)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
}

/// Trims the pattern, then splits off a leading `!` and any `./` prefixes.
fn split_negation(pattern: &str) -> (bool, &str) {
    let pattern = pattern.trim();
    let (negated, mut pattern) = match pattern.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, pattern),
    };
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    (negated, pattern)
}

/// Compiled `content` globs of one document.
#[derive(Debug, Clone)]
pub struct ContentSet {
    base_dir: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    walk_node_modules: bool,
}

impl ContentSet {
    /// Compiles the globs relative to the document's base directory.
    ///
    /// A leading `./` is dropped; `!pattern` excludes what it matches.
    ///
    /// # Errors
    /// [`TailwindError::Glob`] for the first pattern that does not compile.
    pub fn compile(config: &TailwindConfig) -> Result<Self, TailwindError> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut walk_node_modules = false;

        for pattern in &config.content {
            let glob = compile_glob(pattern).context(format!("content pattern {pattern:?}"))?;
            if split_negation(pattern).0 {
                exclude.add(glob);
            } else {
                walk_node_modules |= pattern.contains(NODE_MODULES);
                include.add(glob);
            }
        }

        Ok(Self {
            base_dir: config.base_dir().to_path_buf(),
            include: include.build().context("building include set")?,
            exclude: exclude.build().context("building exclude set")?,
            walk_node_modules,
        })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Whether the build tool would scan `path`, given relative to the base directory.
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let path = path.strip_prefix(".").unwrap_or(path);
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    /// Walks `root` and returns every matching file relative to it, sorted.
    ///
    /// `node_modules` is only entered when an include pattern names it.
    ///
    /// # Errors
    /// [`TailwindError::Io`] when `root` cannot be read.
    pub fn resolve(&self, root: impl AsRef<Path>) -> Result<Vec<PathBuf>, TailwindError> {
        let root = root.as_ref();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| self.should_descend(entry, root));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(TailwindError::Io {
                        source: err.into(),
                        context: Some(format!("Walking {}", root.display()).into()),
                    });
                },
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable entry");
                    continue;
                },
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root)
                && self.matches(relative)
            {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        debug!(root = %root.display(), matched = files.len(), "Content resolved");
        Ok(files)
    }

    fn should_descend(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.path() == root || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if name == ".git" {
            return false;
        }
        name != NODE_MODULES || self.walk_node_modules
    }
}
