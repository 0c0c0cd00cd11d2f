mod error;
mod health;
pub mod logging;
pub mod router;
mod state;

pub use error::{ApiError, ApiErrorExt, ApiResult, ErrorBody};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
