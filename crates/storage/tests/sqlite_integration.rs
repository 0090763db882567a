use lwh_core::model::LessonId;
use storage::keys;
use storage::kv::{read_json, write_json};
use storage::sqlite::SqliteRepository;
use storage::{KeyValueStore, Storage};

#[tokio::test]
async fn sqlite_set_get_overwrite_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get(keys::CART).await.unwrap(), None);

    repo.set(keys::CART, "[]").await.unwrap();
    repo.set(keys::CART, r#"[{"courseId":1}]"#).await.unwrap();
    assert_eq!(
        repo.get(keys::CART).await.unwrap().as_deref(),
        Some(r#"[{"courseId":1}]"#)
    );

    repo.remove(keys::CART).await.unwrap();
    assert_eq!(repo.get(keys::CART).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_storage_persists_json_across_handles() {
    let url = "sqlite:file:memdb_kv_handles?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.expect("open first");
    write_json(first.local.as_ref(), keys::BOOKMARKS, &[LessonId::new(10), LessonId::new(20)])
        .await
        .unwrap();

    let second = Storage::sqlite(url).await.expect("open second");
    let ids: Option<Vec<LessonId>> = read_json(second.local.as_ref(), keys::BOOKMARKS)
        .await
        .unwrap();
    assert_eq!(ids, Some(vec![LessonId::new(10), LessonId::new(20)]));

    // session scope is never shared between handles
    second.session.set("only-here", "1").await.unwrap();
    assert_eq!(first.session.get("only-here").await.unwrap(), None);
}
