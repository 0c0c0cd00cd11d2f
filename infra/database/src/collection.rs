use crate::error::{DatabaseError, DatabaseErrorExt};
use crate::snapshot;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tally_domain::records::Document;
use tokio::sync::Mutex;
use tracing::trace;

/// Bound shared by every storable record.
pub trait Record: Document + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Document + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

pub(crate) struct CollectionInner<T> {
    docs: RwLock<Vec<T>>,
    /// Serializes mutations so snapshots hit the disk in mutation order.
    writer: Mutex<()>,
    path: Option<PathBuf>,
    counter: Arc<AtomicU64>,
}

/// Typed handle to one named collection. Clones share the same data.
pub struct Collection<T> {
    inner: Arc<CollectionInner<T>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Record> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &T::COLLECTION)
            .field("len", &self.len())
            .field("path", &self.inner.path)
            .finish()
    }
}

impl<T: Record> Collection<T> {
    pub(crate) fn new(docs: Vec<T>, path: Option<PathBuf>, counter: Arc<AtomicU64>) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                docs: RwLock::new(docs),
                writer: Mutex::new(()),
                path,
                counter,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.docs.read().len()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<T> {
        self.inner.docs.read().iter().find(|doc| doc.id() == id).cloned()
    }

    #[must_use]
    pub fn find_one(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.docs.read().iter().find(|doc| predicate(doc)).cloned()
    }

    /// Every matching document, in insertion order.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner.docs.read().iter().filter(|doc| predicate(doc)).cloned().collect()
    }

    /// Appends a document.
    ///
    /// # Errors
    /// [`DatabaseError::Duplicate`] when the id is taken.
    pub async fn insert(&self, doc: T) -> Result<T, DatabaseError> {
        self.insert_checked(doc, |_, _| false).await
    }

    /// Appends a document unless the id or `key(doc)` already exists.
    ///
    /// The uniqueness check and the insert happen under one lock.
    ///
    /// # Errors
    /// [`DatabaseError::Duplicate`] on a clash with an existing document.
    pub async fn insert_unique_by<K, F>(&self, doc: T, key: F) -> Result<T, DatabaseError>
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        self.insert_checked(doc, |existing, new| key(existing) == key(new)).await
    }

    async fn insert_checked<F>(&self, doc: T, clashes: F) -> Result<T, DatabaseError>
    where
        F: Fn(&T, &T) -> bool,
    {
        if doc.id().trim().is_empty() {
            return Err(DatabaseError::Validation {
                message: "document id cannot be blank".into(),
                context: Some(T::COLLECTION.into()),
            });
        }

        self.mutate(|docs| {
            if let Some(existing) =
                docs.iter().find(|existing| existing.id() == doc.id() || clashes(existing, &doc))
            {
                return Err(DatabaseError::Duplicate {
                    message: format!("conflicts with '{}'", existing.id()).into(),
                    context: Some(T::COLLECTION.into()),
                });
            }
            docs.push(doc.clone());
            Ok(doc)
        })
        .await
    }

    /// Applies `change` to the document with `id` and returns the updated copy.
    ///
    /// Returns `Ok(None)` when no such document exists. The closure may not change the id.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] if the id was changed; persistence failures.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<Option<T>, DatabaseError>
    where
        F: FnOnce(&mut T),
    {
        self.mutate(|docs| {
            let Some(slot) = docs.iter_mut().find(|doc| doc.id() == id) else {
                return Ok(None);
            };
            let mut updated = slot.clone();
            change(&mut updated);
            if updated.id() != id {
                return Err(DatabaseError::Validation {
                    message: "document id is immutable".into(),
                    context: Some(format!("{}:{id}", T::COLLECTION).into()),
                });
            }
            *slot = updated.clone();
            Ok(Some(updated))
        })
        .await
    }

    /// Swaps in `doc` for the stored document with the same id, returning the previous one.
    ///
    /// # Errors
    /// Persistence failures.
    pub async fn replace(&self, doc: T) -> Result<Option<T>, DatabaseError> {
        self.mutate(|docs| {
            Ok(docs
                .iter_mut()
                .find(|existing| existing.id() == doc.id())
                .map(|slot| std::mem::replace(slot, doc)))
        })
        .await
    }

    /// Removes and returns the document with `id`.
    ///
    /// # Errors
    /// Persistence failures.
    pub async fn remove(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.mutate(|docs| Ok(docs.iter().position(|doc| doc.id() == id).map(|at| docs.remove(at))))
            .await
    }

    /// Runs `op` under the write lock, then persists the snapshot.
    ///
    /// `op` must leave the documents untouched when it fails. A failed disk write leaves
    /// the in-memory change in place and reports the error.
    async fn mutate<R, F>(&self, op: F) -> Result<R, DatabaseError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, DatabaseError>,
    {
        let _writer = self.inner.writer.lock().await;

        let (result, bytes) = {
            let mut docs = self.inner.docs.write();
            let result = op(&mut docs)?;
            let bytes = match &self.inner.path {
                Some(_) => Some(
                    serde_json::to_vec_pretty(&*docs)
                        .context(format!("Serializing {}", T::COLLECTION))?,
                ),
                None => None,
            };
            (result, bytes)
        };

        if let (Some(path), Some(bytes)) = (&self.inner.path, bytes) {
            snapshot::write_atomic(path, &bytes, &self.inner.counter).await?;
        }

        trace!(collection = T::COLLECTION, "Collection mutated");
        Ok(result)
    }
}
