use tally_database::Database;
use tally_domain::config::ApiConfig;
use tally_identity::{Identity, IdentityError, init};

async fn memory_db() -> Database {
    Database::builder().persist(false).init().await.unwrap()
}

#[tokio::test]
async fn init_creates_slice() {
    let slice = init(&ApiConfig::default(), &memory_db().await).await.expect("init should succeed");
    assert_eq!(slice.id, std::any::TypeId::of::<Identity>());
    assert_eq!(slice.name, "Identity");

    let identity = slice.state.as_any().downcast_ref::<Identity>().unwrap();
    assert!(identity.github.is_none());
    assert_eq!(identity.users.len(), 0);
}

#[tokio::test]
async fn github_client_follows_configuration() {
    let mut config = ApiConfig::default();
    config.security.github.client_id = "client".to_owned();

    let slice = init(&config, &memory_db().await).await.unwrap();
    let identity = slice.state.as_any().downcast_ref::<Identity>().unwrap();
    assert!(identity.github.is_some());
}

#[tokio::test]
async fn unusable_jwt_settings_fail_init() {
    let mut config = ApiConfig::default();
    config.security.jwt.algorithm = "RS256".to_owned();

    let err = init(&config, &memory_db().await).await.unwrap_err();
    assert!(matches!(err, IdentityError::Config { .. }));
}
