//! # Database Infrastructure
//!
//! An embedded document store for the Tally backend. Each collection is an ordered list of
//! typed records held in memory and mirrored to a pretty-printed JSON snapshot
//! (`<data_dir>/<collection>.json`) after every mutation.
//!
//! ## Key Features
//! - **Typed collections**: any [`Document`] that is `Serialize + DeserializeOwned + Clone`.
//! - **Atomic snapshots**: unique temp file, `fsync`, `rename`; leftovers are purged at init.
//! - **Lazy loading**: a snapshot is read the first time its collection is requested.
//! - **Builder Pattern**: fluent configuration with an in-memory mode for tests.
//!
//! ## Example
//!
//! ```rust
//! use tally_database::{Database, DatabaseError};
//! use tally_domain::records::TodoRecord;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder().persist(false).init().await?;
//!     let todos = db.collection::<TodoRecord>().await?;
//!
//!     todos
//!         .insert(TodoRecord {
//!             id: "t1".into(),
//!             owner_id: "u1".into(),
//!             name: "Write docs".into(),
//!             description: String::new(),
//!             task_complete: false,
//!         })
//!         .await?;
//!     assert_eq!(todos.len(), 1);
//!     Ok(())
//! }
//! ```

mod collection;
mod error;
mod snapshot;

pub use crate::collection::{Collection, Record};
pub use crate::error::{DatabaseError, DatabaseErrorExt};
pub use tally_domain::records::Document;

use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing::{debug, info, instrument};

type ErasedCollection = Arc<dyn Any + Send + Sync>;

/// Inner state of the [`Database`] handle.
#[derive(Debug)]
pub struct DatabaseInner {
    root: Option<PathBuf>,
    collections: Mutex<FxHashMap<&'static str, ErasedCollection>>,
    tmp_counter: Arc<AtomicU64>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        debug!(root = ?self.root, "Document store handle dropped");
    }
}

/// Cheaply clonable handle to the document store.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Snapshot directory; `None` when running in memory.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.inner.root.as_deref()
    }

    /// Returns the typed collection for `T`, loading its snapshot on first use.
    ///
    /// # Errors
    /// * [`DatabaseError::Io`] / [`DatabaseError::Serde`] when the snapshot cannot be read.
    /// * [`DatabaseError::Internal`] when the collection name is already bound to another type.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn collection<T: Record>(&self) -> Result<Collection<T>, DatabaseError> {
        if let Some(existing) = self.cached::<T>()? {
            return Ok(existing);
        }

        let path = self.inner.root.as_deref().map(|root| snapshot::snapshot_path(root, T::COLLECTION));
        let docs: Vec<T> = match &path {
            Some(path) => match snapshot::read(path).await? {
                Some(bytes) => serde_json::from_slice(&bytes)
                    .context(format!("Parsing snapshot {}", path.display()))?,
                None => Vec::new(),
            },
            None => Vec::new(),
        };
        debug!(documents = docs.len(), "Collection loaded");

        let fresh = Collection::new(docs, path, Arc::clone(&self.inner.tmp_counter));
        let stored = Arc::clone(
            self.inner
                .collections
                .lock()
                .entry(T::COLLECTION)
                .or_insert_with(|| Arc::new(fresh) as ErasedCollection),
        );
        downcast::<T>(&stored)
    }

    fn cached<T: Record>(&self) -> Result<Option<Collection<T>>, DatabaseError> {
        let guard = self.inner.collections.lock();
        guard.get(T::COLLECTION).map(downcast::<T>).transpose()
    }
}

fn downcast<T: Record>(erased: &ErasedCollection) -> Result<Collection<T>, DatabaseError> {
    erased.downcast_ref::<Collection<T>>().cloned().ok_or_else(|| DatabaseError::Internal {
        message: format!("collection '{}' is bound to a different type", T::COLLECTION).into(),
        context: Some(std::any::type_name::<T>().into()),
    })
}

/// A fluent builder for opening the document store.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug)]
pub struct DatabaseBuilder {
    path: Option<PathBuf>,
    persist: bool,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self { path: None, persist: true }
    }
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that holds the JSON snapshots.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `false` keeps every collection in memory only.
    pub const fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Consumes the builder and opens the store.
    ///
    /// # Process
    /// 1. **Validation**: a path is required when persisting.
    /// 2. **Layout**: creates the snapshot directory.
    /// 3. **Recovery**: removes temp files left by an interrupted write.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if persistence is on and no path was given.
    /// * [`DatabaseError::Io`] if the directory cannot be created.
    #[instrument(skip(self), fields(path = ?self.path, persist = self.persist))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let root = if self.persist {
            let root = self.path.ok_or(DatabaseError::Validation {
                message: "a data directory is required when persisting".into(),
                context: None,
            })?;
            tokio::fs::create_dir_all(&root)
                .await
                .context(format!("Creating data directory {}", root.display()))?;
            snapshot::purge_tmp(&root).await;
            info!(root = %root.display(), "Document store opened");
            Some(root)
        } else {
            info!("Document store running in memory");
            None
        };

        Ok(Database {
            inner: Arc::new(DatabaseInner {
                root,
                collections: Mutex::new(FxHashMap::default()),
                tmp_counter: Arc::new(AtomicU64::new(0)),
            }),
        })
    }
}
