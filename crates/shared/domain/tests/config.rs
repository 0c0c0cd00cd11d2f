use serde_json::json;
use std::net::IpAddr;
use std::path::PathBuf;
use tally_domain::config::{
    ApiConfig, DatabaseConfig, FrontendConfig, GithubConfig, JwtConfig, ServerConfig, StorageConfig,
};

#[test]
fn defaults_match_the_shipped_layout() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8181);
    assert!(server.ssl.is_none());

    let jwt = JwtConfig::default();
    assert_eq!(jwt.algorithm, "HS256");
    assert_eq!(jwt.access_ttl_minutes, 30);
    assert_eq!(jwt.refresh_ttl_days, 7);

    let db = DatabaseConfig::default();
    assert_eq!(db.data_dir, PathBuf::from("data"));
    assert!(db.persist);

    let storage = StorageConfig::default();
    assert_eq!(storage.static_dir, PathBuf::from("assets"));
    assert_eq!(storage.templates_dir, PathBuf::from("frontend/templates"));

    let frontend = FrontendConfig::default();
    assert_eq!(frontend.tailwind_configs, vec![PathBuf::from("tailwind.config.js")]);
    assert!(!frontend.strict);
}

#[test]
fn github_is_disabled_without_client_id() {
    let mut github = GithubConfig::default();
    assert!(!github.is_enabled());

    github.client_id = "abc123".to_owned();
    assert!(github.is_enabled());
}

#[test]
fn partial_documents_fill_in_defaults() {
    let raw = json!({
        "server": { "address": "127.0.0.1", "port": 9000 },
        "security": { "jwt": { "secret": "s3cret", "access_ttl_minutes": 5 } },
        "database": { "persist": false },
        "frontend": { "tailwind_configs": ["a.js", "b.js"], "strict": true }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.address, "127.0.0.1".parse::<IpAddr>().unwrap());
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.security.jwt.secret, "s3cret");
    assert_eq!(cfg.security.jwt.access_ttl_minutes, 5);
    assert_eq!(cfg.security.jwt.refresh_ttl_days, 7);
    assert!(!cfg.database.persist);
    assert_eq!(cfg.database.data_dir, PathBuf::from("data"));
    assert_eq!(cfg.frontend.tailwind_configs.len(), 2);
    assert!(cfg.frontend.strict);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn mutation_does_not_leak_into_clones() {
    let original = ApiConfig::default();
    let mut changed = original.clone();
    changed.server.port = 1;

    assert_eq!(original.server.port, 8181);
    assert_eq!(changed.server.port, 1);
}
