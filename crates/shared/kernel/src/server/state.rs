use axum::extract::FromRef;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tally_database::Database;
use tally_domain::config::ApiConfig;
use tally_domain::registry::{FeatureSlice, InitializedSlice};

#[tally_derive::tally_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    slices: FxHashMap<TypeId, InitializedSlice>,
    /// Slice names in registration order.
    order: Vec<&'static str>,
}

/// Shared application state handed to every router: configuration, the document store and
/// the feature slices, looked up by type.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        let slice = self.inner.slices.get(&TypeId::of::<T>())?;
        slice.state.as_any().downcast_ref::<T>()
    }

    /// # Errors
    /// [`ApiStateError::MissingSlice`] naming `T` when no such slice was registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Registered slice names, in registration order.
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.order.iter().copied()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.config.clone()
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.database.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }

    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        self.slices.extend(slices);
        self
    }

    /// # Errors
    /// [`ApiStateError::Validation`] when the configuration or the database is missing, or
    /// when the same slice type was registered twice.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let invalid = |message: String| ApiStateError::Validation {
            message: message.into(),
            context: None,
        };
        let config = self.config.ok_or_else(|| invalid("ApiConfig not provided".to_owned()))?;
        let database = self.database.ok_or_else(|| invalid("Database not provided".to_owned()))?;

        let mut order = Vec::with_capacity(self.slices.len());
        let mut slices = FxHashMap::default();
        for slice in self.slices {
            let name = slice.name;
            if slices.insert(slice.id, slice).is_some() {
                return Err(invalid(format!("Feature slice registered twice: {name}")));
            }
            order.push(name);
        }

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, database, slices, order }) })
    }
}
