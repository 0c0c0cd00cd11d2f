use crate::document::TailwindConfig;
use crate::error::{TailwindError, TailwindErrorExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk formats a document can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.js`, `.cjs`, `.mjs`
    JavaScript,
    Json,
}

impl Format {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    /// [`TailwindError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, TailwindError> {
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("js" | "cjs" | "mjs") => Ok(Self::JavaScript),
            Some("json") => Ok(Self::Json),
            _ => Err(TailwindError::UnsupportedFormat {
                message: format!("{} (expected .js, .cjs, .mjs or .json)", path.display()).into(),
                context: None,
            }),
        }
    }
}

impl TailwindConfig {
    /// Reads a document and remembers its directory as the base for `content` globs.
    ///
    /// # Errors
    /// Unsupported extensions, I/O failures and parse errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TailwindError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let source = fs::read_to_string(path).context(format!("Reading {}", path.display()))?;

        let config = match format {
            Format::JavaScript => Self::from_js(&source),
            Format::Json => Self::from_json(&source),
        }
        .context(path.display().to_string())?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debug!(path = %path.display(), content = config.content.len(), plugins = config.plugins.len(), "Loaded Tailwind configuration");
        Ok(config.with_base_dir(base_dir))
    }
}

/// A document as read from one path, kept even when loading failed.
#[derive(Debug)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub result: Result<TailwindConfig, TailwindError>,
}

/// Loads each path independently; one broken document does not affect the others.
pub fn load_all<I, P>(paths: I) -> Vec<LoadedDocument>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref().to_path_buf();
            let result = TailwindConfig::load(&path);
            if let Err(err) = &result {
                warn!(path = %path.display(), error = %err, "Failed to load Tailwind configuration");
            }
            LoadedDocument { path, result }
        })
        .collect()
}
