use serde::{Deserialize, Serialize};
use tally_database::*;
use tally_domain::records::{TodoRecord, UserRecord};

fn todo(id: &str, owner: &str, name: &str) -> TodoRecord {
    TodoRecord {
        id: id.to_owned(),
        owner_id: owner.to_owned(),
        name: name.to_owned(),
        description: String::new(),
        task_complete: false,
    }
}

fn user(id: &str, email: &str) -> UserRecord {
    UserRecord {
        id: id.to_owned(),
        email: email.to_owned(),
        password_hash: None,
        profile: None,
        refresh_token: None,
        github_login: None,
    }
}

#[tokio::test]
async fn persisting_without_path_fails_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn crud_in_memory() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();

    todos.insert(todo("a", "u1", "first")).await.unwrap();
    todos.insert(todo("b", "u2", "second")).await.unwrap();
    todos.insert(todo("c", "u1", "third")).await.unwrap();
    assert_eq!(todos.len(), 3);

    let mine: Vec<_> = todos.find(|t| t.owner_id == "u1").into_iter().map(|t| t.name).collect();
    assert_eq!(mine, ["first", "third"]);

    let updated = todos.update("a", |t| t.task_complete = true).await.unwrap().unwrap();
    assert!(updated.task_complete);
    assert!(todos.get("a").unwrap().task_complete);

    assert!(todos.update("missing", |t| t.task_complete = true).await.unwrap().is_none());

    let removed = todos.remove("b").await.unwrap().unwrap();
    assert_eq!(removed.name, "second");
    assert!(todos.remove("b").await.unwrap().is_none());
    assert_eq!(todos.len(), 2);
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();

    todos.insert(todo("a", "u1", "first")).await.unwrap();
    let err = todos.insert(todo("a", "u1", "again")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Duplicate { .. }));
    assert_eq!(todos.len(), 1);
}

#[tokio::test]
async fn unique_keys_are_enforced() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let users = db.collection::<UserRecord>().await.unwrap();

    users.insert_unique_by(user("u1", "ann@example.com"), |u| u.email.clone()).await.unwrap();
    let err = users
        .insert_unique_by(user("u2", "ann@example.com"), |u| u.email.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Duplicate { .. }));

    users.insert_unique_by(user("u3", "bob@example.com"), |u| u.email.clone()).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn ids_cannot_change_through_update() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();
    todos.insert(todo("a", "u1", "first")).await.unwrap();

    let err = todos.update("a", |t| t.id = "z".to_owned()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
    assert!(todos.get("a").is_some());
}

#[tokio::test]
async fn replace_only_touches_existing_documents() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();
    todos.insert(todo("a", "u1", "first")).await.unwrap();

    let previous = todos.replace(todo("a", "u1", "renamed")).await.unwrap().unwrap();
    assert_eq!(previous.name, "first");
    assert_eq!(todos.get("a").unwrap().name, "renamed");

    assert!(todos.replace(todo("nope", "u1", "ghost")).await.unwrap().is_none());
    assert_eq!(todos.len(), 1);
}

#[tokio::test]
async fn handles_share_state() {
    let db = Database::builder().persist(false).init().await.unwrap();
    let first = db.collection::<TodoRecord>().await.unwrap();
    let second = db.clone().collection::<TodoRecord>().await.unwrap();

    first.insert(todo("a", "u1", "first")).await.unwrap();
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn snapshots_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let db = Database::builder().path(dir.path()).init().await.unwrap();
        let todos = db.collection::<TodoRecord>().await.unwrap();
        todos.insert(todo("a", "u1", "first")).await.unwrap();
        todos.insert(todo("b", "u1", "second")).await.unwrap();
        todos.remove("a").await.unwrap();
    }

    assert!(dir.path().join("todos.json").exists());

    let db = Database::builder().path(dir.path()).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos.get("b").unwrap().name, "second");
}

#[tokio::test]
async fn corrupt_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todos.json"), "{not json").unwrap();

    let db = Database::builder().path(dir.path()).init().await.unwrap();
    let err = db.collection::<TodoRecord>().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Serde { .. }));
}

#[tokio::test]
async fn init_removes_orphaned_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let orphan = dir.path().join("todos.json.tallytmp.42.0");
    std::fs::write(&orphan, "[").unwrap();

    let _db = Database::builder().path(dir.path()).init().await.unwrap();
    assert!(!orphan.exists());
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Impostor {
    id: String,
}

impl Document for Impostor {
    const COLLECTION: &'static str = "todos";

    fn id(&self) -> &str {
        &self.id
    }
}

#[tokio::test]
async fn collection_names_are_bound_to_one_type() {
    let db = Database::builder().persist(false).init().await.unwrap();
    db.collection::<TodoRecord>().await.unwrap();

    let err = db.collection::<Impostor>().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Internal { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::builder().path(dir.path()).init().await.unwrap();
    let todos = db.collection::<TodoRecord>().await.unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let todos = todos.clone();
            tokio::spawn(async move { todos.insert(todo(&format!("t{i}"), "u1", "n")).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reopened = Database::builder().path(dir.path()).init().await.unwrap();
    assert_eq!(reopened.collection::<TodoRecord>().await.unwrap().len(), 32);
}
