use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::fs;
use tally::domain::config::ApiConfig;
use tally_server::Server;
use tempfile::TempDir;
use tower::ServiceExt;

struct Site {
    _dir: TempDir,
    router: Router,
}

async fn site() -> Site {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("assets")).unwrap();
    fs::create_dir_all(root.join("templates")).unwrap();
    fs::write(root.join("assets/app.css"), "body { margin: 0; }\n").unwrap();
    fs::write(root.join("templates/home.html"), "<h1>Hello {{ name }}</h1>").unwrap();

    let mut config = ApiConfig::default();
    config.database.data_dir = root.join("data");
    config.storage.static_dir = root.join("assets");
    config.storage.templates_dir = root.join("templates");
    config.frontend.tailwind_configs = Vec::new();

    let server = Server::builder().config(config).build().await.unwrap();
    Site { router: server.router(), _dir: dir }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    request.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn system_routes_answer() {
    let site = site().await;

    let (status, body) = send(&site.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "hello": "world" }));

    let (status, _) = send(&site.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn static_assets_and_reference_ui_are_served() {
    let site = site().await;

    let (status, css) = send(&site.router, get("/assets/app.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(css.contains("margin"));

    let (status, _) = send(&site.router, get("/assets/missing.css")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, page) = send(&site.router, get("/api")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Tally API"));
}

#[tokio::test]
async fn register_login_and_manage_todos() {
    let site = site().await;

    let (status, _) = send(
        &site.router,
        post_json("/api/v1/user/", None, &json!({ "email": "grace@example.com", "password": "cobol" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let login = Request::post("/api/v1/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/json")
        .body(Body::from("username=grace%40example.com&password=cobol"))
        .unwrap();
    let (status, body) = send(&site.router, login).await;
    assert_eq!(status, StatusCode::OK);
    let token = serde_json::from_str::<Value>(&body).unwrap()["access_token"]
        .as_str()
        .unwrap()
        .to_owned();

    let todo = json!({ "name": "Ship it", "description": "", "task_complete": false });
    let (status, _) = send(&site.router, post_json("/api/v1/todo/", Some(&token), &todo)).await;
    assert_eq!(status, StatusCode::CREATED);

    let list = Request::get("/api/v1/todo/")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&site.router, list).await;
    assert_eq!(status, StatusCode::OK);
    let todos: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(todos.as_array().unwrap().len(), 1);
    assert_eq!(todos[0]["name"], "Ship it");

    let (status, _) = send(&site.router, get("/api/v1/todo/")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn frontend_routes_are_mounted() {
    let site = site().await;

    let (status, html) = send(&site.router, get("/jinja/?name=Lin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<h1>Hello Lin</h1>");

    let (status, body) = send(&site.router, get("/api/v1/frontend/tailwind")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn missing_certificates_stop_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ApiConfig::default();
    config.database.data_dir = dir.path().join("data");
    config.server.ssl = Some(tally::domain::config::SslConfig {
        cert: dir.path().join("cert.pem"),
        key: dir.path().join("key.pem"),
    });

    let err = Server::builder().config(config).build().await.unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}

#[tokio::test]
async fn builder_overrides_the_listen_address() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ApiConfig::default();
    config.database.data_dir = dir.path().join("data");
    config.storage.templates_dir = dir.path().to_path_buf();
    config.frontend.tailwind_configs = Vec::new();

    let server = Server::builder()
        .config(config)
        .address("127.0.0.1".parse().unwrap())
        .port(9099)
        .build()
        .await
        .unwrap();
    assert_eq!(server.address().to_string(), "127.0.0.1:9099");
    assert_eq!(server.state().slice_names().collect::<Vec<_>>(), ["Identity", "Todos", "Frontend"]);
}
