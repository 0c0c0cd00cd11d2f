//! # Logger
//!
//! Installs the process-wide `tracing` subscriber used by the server and the CLI.
//!
//! Output goes to a compact ANSI console layer, a daily-rolling log file written
//! through a non-blocking worker, or both. Filtering starts from a default level,
//! accepts explicit directives (`"tally=debug,tower_http=info"`) and otherwise
//! honours `RUST_LOG`.
//!
//! ```rust
//! use tally_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("tally-docs")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use sealed::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tally_domain::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 14;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct Settings {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    directives: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            directives: None,
        }
    }
}

/// Builder state: no name yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: named.
#[derive(Debug)]
pub struct Named(String);
/// Builder state: console only.
#[derive(Debug)]
pub struct NoFile;
/// Builder state: file output configured.
#[derive(Debug)]
pub struct WithFile;

mod sealed {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Typestate builder for the global subscriber.
///
/// A name is required before [`LoggerBuilder::init`] becomes available; file-only
/// knobs (`rotation`, `max_files`, `json`) appear once [`LoggerBuilder::path`] is set.
#[derive(Debug)]
#[must_use = "call .init() to install the subscriber"]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = NoFile> {
    settings: Settings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the application; also the prefix of rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), file: PhantomData }
    }
}

impl LoggerBuilder<Named, WithFile> {
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes JSON lines to the log file instead of plain text.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Parses a level name such as `"debug"`; unknown names are rejected by `init`.
    pub fn level_name(mut self, level: &str) -> Self {
        match LevelFilter::from_str(level.trim()) {
            Ok(parsed) => self.settings.level = parsed,
            Err(_) => {
                self.settings.directives = Some(format!("{}={level}", self.name.0.replace('-', "_")));
            },
        }
        self
    }

    /// Explicit filter directives; `RUST_LOG` is ignored when these are set.
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Enables rolling file output into `directory`.
    pub fn path(self, directory: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFile> {
        let mut settings = self.settings;
        settings.directory = Some(directory.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Applies the `[logging]` section and installs the subscriber.
    ///
    /// `filter` wins over `level`; `path` turns on rolling files, written as JSON
    /// lines when `json` is set.
    ///
    /// # Errors
    /// See [`LoggerBuilder::init`].
    pub fn init_from_config(self, config: &LoggingConfig) -> Result<Logger, LoggerError> {
        let mut builder = self.level_name(&config.level);
        if let Some(filter) = config.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            builder = builder.directives(filter);
        }
        match &config.path {
            Some(path) => builder.path(path).json(config.json).init(),
            None => builder.init(),
        }
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the lifetime of the program; dropping it
    /// stops the background file writer.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] when a subscriber is already installed,
    /// [`LoggerError::InvalidConfiguration`] for rejected settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: Named(name), .. } = self;
        validate(&settings, &name)?;

        let filter = env_filter(&settings)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if settings.console {
            layers.push(layer().compact().with_ansi(true).with_target(true).boxed());
        }

        let guard = match &settings.directory {
            Some(directory) => {
                fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Creating {}", directory.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(directory)
                    .context("Building rolling file appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "console and file output are both disabled".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system.
#[must_use = "dropping the handle stops the background log writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: Unnamed, file: PhantomData }
    }

    /// Whether a file writer is attached.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be at least 1".into(),
            context: Some(name.to_owned().into()),
        });
    }
    Ok(())
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.directives {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("invalid filter '{directives}': {e}").into(),
            context: None,
        }),
    }
}
