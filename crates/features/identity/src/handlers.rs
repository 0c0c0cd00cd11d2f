use crate::credentials::{access_cookie, expired_cookie};
use crate::extractor::AuthUser;
use crate::Identity;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tally_derive::{api_handler, api_model};
use tally_domain::constants::{AUTH_TAG, TOKEN_TYPE, USERS_TAG};
use tally_domain::records::{UserProfile, UserRecord};
use tally_kernel::server::{ApiError, ApiResult, ApiState, ErrorBody};
use tracing::info;
use utoipa::IntoParams;

/// OAuth2 password-grant form. Extra grant fields are accepted and ignored.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[api_model(rename_all = "snake_case")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: TOKEN_TYPE.to_owned() }
    }
}

#[api_model(rename_all = "snake_case")]
pub struct ProfileBody {
    pub name: String,
    /// Avatar URL.
    pub pfp: String,
}

#[api_model(rename_all = "snake_case")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile: Option<ProfileBody>,
}

/// What an account looks like from the outside.
#[api_model(rename_all = "snake_case")]
pub struct UserView {
    pub user_id: String,
    pub email: String,
    pub profile: Option<ProfileBody>,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            profile: user.profile.map(|p| ProfileBody { name: p.name, pfp: p.pfp }),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct RefreshQuery {
    refresh_token: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CodeQuery {
    code: String,
}

fn github_disabled() -> ApiError {
    ApiError::not_found("GitHub login is not configured.")
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

fn session_response(access_token: String, json: bool) -> Response {
    let cookie = access_cookie(&access_token);
    if json {
        ([(header::SET_COOKIE, cookie)], Json(TokenResponse::bearer(access_token))).into_response()
    } else {
        (
            StatusCode::FOUND,
            [(header::LOCATION, HeaderValue::from_static("/")), (header::SET_COOKIE, cookie)],
        )
            .into_response()
    }
}

#[api_handler(
    post,
    path = "/api/v1/auth/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = FOUND, description = "Logged in; cookie set, redirect to `/`"),
        (status = OK, description = "Logged in (`Accept: application/json`)", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Bad credentials", body = ErrorBody),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn token_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let identity = Identity::from_state(&state)?;
    let user = identity.authenticate(&form.username, &form.password).await?;
    let pair = identity.start_session(&user).await?;
    Ok(session_response(pair.access_token, wants_json(&headers)))
}

#[api_handler(
    post,
    path = "/api/v1/auth/refresh",
    params(RefreshQuery),
    responses(
        (status = OK, description = "New access token", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Refresh token rejected", body = ErrorBody),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn refresh_handler(
    State(state): State<ApiState>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<TokenResponse>> {
    let identity = Identity::from_state(&state)?;
    let access_token = identity.refresh(&query.refresh_token)?;
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[api_handler(
    post,
    path = "/api/v1/auth/logout",
    responses((status = NO_CONTENT, description = "Cookie cleared and refresh token revoked")),
    tag = AUTH_TAG,
)]
pub(crate) async fn logout_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let identity = Identity::from_state(&state)?;
    if let Ok(user) = identity.resolve(&headers) {
        identity.end_session(&user.id).await?;
    }
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, expired_cookie())]).into_response())
}

#[api_handler(
    get,
    path = "/api/v1/auth/github-login",
    responses(
        (status = FOUND, description = "Redirect to GitHub"),
        (status = NOT_FOUND, description = "GitHub login is not configured", body = ErrorBody),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn github_login_handler(State(state): State<ApiState>) -> ApiResult<Response> {
    let identity = Identity::from_state(&state)?;
    let github = identity.github.as_ref().ok_or_else(github_disabled)?;
    let url = github.authorize_url();
    info!(%url, "Redirecting to GitHub");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

#[api_handler(
    get,
    path = "/api/v1/auth/github-code",
    params(CodeQuery),
    responses(
        (status = OK, description = "Logged in through GitHub", body = TokenResponse),
        (status = NOT_FOUND, description = "GitHub login is not configured", body = ErrorBody),
        (status = BAD_GATEWAY, description = "GitHub failed", body = ErrorBody),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn github_code_handler(
    State(state): State<ApiState>,
    Query(query): Query<CodeQuery>,
) -> ApiResult<Response> {
    let identity = Identity::from_state(&state)?;
    let github = identity.github.as_ref().ok_or_else(github_disabled)?;

    let github_token = github.exchange_code(&query.code).await?;
    let github_user = github.fetch_user(&github_token).await?;
    let user = identity.upsert_github_user(&github_user).await?;
    let pair = identity.start_session(&user).await?;
    Ok(session_response(pair.access_token, true))
}

#[api_handler(
    post,
    path = "/api/v1/user/",
    request_body = CreateUserRequest,
    responses(
        (status = CREATED, description = "Account created", body = UserView),
        (status = CONFLICT, description = "Email already registered", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Blank email or password", body = ErrorBody),
    ),
    tag = USERS_TAG,
)]
pub(crate) async fn create_user_handler(
    State(state): State<ApiState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let identity = Identity::from_state(&state)?;
    let profile = request.profile.map(|p| UserProfile { name: p.name, pfp: p.pfp });
    let user = identity.register(&request.email, &request.password, profile).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[api_handler(
    get,
    path = "/api/v1/user/me/",
    responses(
        (status = OK, description = "The authenticated account", body = UserView),
        (status = UNAUTHORIZED, description = "Missing or bad credentials", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = USERS_TAG,
)]
pub(crate) async fn me_handler(AuthUser(user): AuthUser) -> Json<UserView> {
    Json(user.into())
}
