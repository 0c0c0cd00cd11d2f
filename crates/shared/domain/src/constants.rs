//! Names shared between routes, storage and documentation.

pub const API_VERSION: u8 = 1;
pub const API_PREFIX: &str = "/api/v1";

/// Detail returned with every 401 response.
pub const ERROR_CONNECTION_VALIDATION: &str = "Could not validate connection.";

/// Cookie carrying `Bearer <access token>` for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const TOKEN_TYPE: &str = "Bearer";

// OpenAPI tags
pub const SYSTEM_TAG: &str = "system";
pub const AUTH_TAG: &str = "auth";
pub const USERS_TAG: &str = "users";
pub const TODOS_TAG: &str = "todos";
pub const FRONTEND_TAG: &str = "frontend";

// Document store collections
pub const USERS_COLLECTION: &str = "users";
pub const TODOS_COLLECTION: &str = "todos";
