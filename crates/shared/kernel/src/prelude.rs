//! Everything a feature slice usually needs.

pub use crate::safe_nanoid;
pub use crate::security::resource::ResourceGuard;
pub use crate::server::{ApiError, ApiResult, ApiState, ErrorBody};
pub use tally_database::Database;
pub use tally_domain::config::ApiConfig;
pub use tally_domain::constants::*;
pub use tally_domain::registry::{FeatureSlice, InitializedSlice};
