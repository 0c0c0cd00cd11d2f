use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tally_database::Database;
use tally_domain::config::ApiConfig;
use tally_identity::{Identity, TokenKind};
use tally_kernel::server::ApiState;
use tally_todos::Todos;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: ApiState,
}

impl TestApp {
    async fn new() -> Self {
        let config = ApiConfig::default();
        let database = Database::builder().persist(false).init().await.unwrap();
        let identity = tally_identity::init(&config, &database).await.unwrap();
        let todos = tally_todos::init(&database).await.unwrap();
        let state = ApiState::builder()
            .config(config)
            .db(database)
            .register_slices([identity, todos])
            .build()
            .unwrap();
        let (router, _) = tally_todos::router().split_for_parts();
        Self { router: router.with_state(state.clone()), state }
    }

    /// Registers `email` and returns an `Authorization` header value for it.
    async fn user(&self, email: &str) -> String {
        let identity = self.state.get_slice::<Identity>().unwrap();
        let user = identity.register(email, "pw", None).await.unwrap();
        let token = identity.tokens.issue(TokenKind::Access, &user.email, &user.id).unwrap();
        format!("Bearer {token}")
    }

    async fn call(&self, method: &str, uri: &str, auth: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }
}

fn todo(name: &str) -> Value {
    json!({ "name": name, "description": format!("{name} details"), "task_complete": false })
}

#[tokio::test]
async fn create_then_list_in_insertion_order() {
    let app = TestApp::new().await;
    let auth = app.user("ada@example.com").await;

    let (status, first) = app.call("POST", "/api/v1/todo/", &auth, Some(todo("milk"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["name"], "milk");
    assert_eq!(first["task_complete"], false);
    assert_eq!(first["id"].as_str().unwrap().len(), 12);

    app.call("POST", "/api/v1/todo/", &auth, Some(todo("eggs"))).await;

    let (status, list) = app.call("GET", "/api/v1/todo/", &auth, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list.as_array().unwrap().iter().map(|t| t["name"].clone()).collect();
    assert_eq!(names, [json!("milk"), json!("eggs")]);
    assert_eq!(list[0], first);
}

#[tokio::test]
async fn update_and_delete_own_todos() {
    let app = TestApp::new().await;
    let auth = app.user("ada@example.com").await;
    let (_, created) = app.call("POST", "/api/v1/todo/", &auth, Some(todo("milk"))).await;
    let uri = format!("/api/v1/todo/{}", created["id"].as_str().unwrap());

    let change = json!({ "name": "oat milk", "description": "2 litres", "task_complete": true });
    let (status, updated) = app.call("PUT", &uri, &auth, Some(change)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["name"], "oat milk");
    assert_eq!(updated["task_complete"], true);

    let (status, deleted) = app.call("DELETE", &uri, &auth, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "deleted": created["id"] }));

    let (status, _) = app.call("DELETE", &uri, &auth, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.state.get_slice::<Todos>().unwrap().store.len(), 0);
}

#[tokio::test]
async fn other_users_todos_are_invisible() {
    let app = TestApp::new().await;
    let ada = app.user("ada@example.com").await;
    let bob = app.user("bob@example.com").await;

    let (_, created) = app.call("POST", "/api/v1/todo/", &ada, Some(todo("secret"))).await;
    let uri = format!("/api/v1/todo/{}", created["id"].as_str().unwrap());

    let (_, list) = app.call("GET", "/api/v1/todo/", &bob, None).await;
    assert_eq!(list, json!([]));

    let (status, body) = app.call("PUT", &uri, &bob, Some(todo("mine now"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().starts_with("Todo not found"));

    let (status, _) = app.call("DELETE", &uri, &bob, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.call("GET", "/api/v1/todo/", &ada, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = TestApp::new().await;
    let auth = app.user("ada@example.com").await;
    for id in ["short", "000000000000", "abcdefghijk%21"] {
        let (status, _) = app.call("DELETE", &format!("/api/v1/todo/{id}"), &auth, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{id}");
    }
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = TestApp::new().await;
    let auth = app.user("ada@example.com").await;
    let (status, _) = app.call("POST", "/api/v1/todo/", &auth, Some(todo(" "))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn every_route_requires_credentials() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/api/v1/todo/", "Bearer nope", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate connection.");

    let (status, _) = app.call("POST", "/api/v1/todo/", "", Some(todo("x"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
