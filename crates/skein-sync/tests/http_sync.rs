//! End-to-end sync tests against a real HTTP server on an ephemeral port.

use std::path::Path;
use std::sync::Arc;

use skein_proto::AuthMethod;
use skein_server::router::build_router;
use skein_server::{AllowAllAuth, AuthProvider, ServerConfig, ServerState, StaticTokenAuth};
use skein_store::InMemoryContentStore;
use skein_sync::{HttpRemote, ProjectSync, SyncError, SyncManager, SyncPhase};

async fn spawn_server(auth: Arc<dyn AuthProvider>) -> (String, ServerState) {
    let state = ServerState::new(ServerConfig::default(), auth);
    let router = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

fn client(base_url: &str, auth: AuthMethod) -> ProjectSync {
    let remote = Arc::new(HttpRemote::new(base_url, auth).unwrap());
    ProjectSync::new(Arc::new(InMemoryContentStore::new()), remote)
}

fn write(dir: &Path, rel: &str, bytes: &[u8]) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[tokio::test]
async fn push_then_pull_roundtrip() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "readme.md", b"# skein\n");
    write(src.path(), "nested/dir/data.bin", &[0u8, 159, 146, 150]);
    write(src.path(), "unicode.txt", "Hello, 世界! 🚀".as_bytes());

    let pusher = client(&url, AuthMethod::Anonymous);
    pusher.push_all("p", src.path()).await.unwrap();

    // Server now holds the tree and all blobs.
    let entry = state.project("p").unwrap();
    assert_eq!(entry.tree.len(), 3);
    assert_eq!(entry.store.len(), 3);

    let out = tempfile::tempdir().unwrap();
    let puller = client(&url, AuthMethod::Anonymous);
    puller.pull_all("p", out.path()).await.unwrap();

    assert_eq!(
        std::fs::read(out.path().join("readme.md")).unwrap(),
        b"# skein\n"
    );
    assert_eq!(
        std::fs::read(out.path().join("nested/dir/data.bin")).unwrap(),
        vec![0u8, 159, 146, 150]
    );
    assert_eq!(
        std::fs::read(out.path().join("unicode.txt")).unwrap(),
        "Hello, 世界! 🚀".as_bytes()
    );
}

#[tokio::test]
async fn identical_content_uploads_one_blob() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "a.txt", b"same bytes");
    write(src.path(), "b.txt", b"same bytes");

    client(&url, AuthMethod::Anonymous)
        .push_all("p", src.path())
        .await
        .unwrap();

    let entry = state.project("p").unwrap();
    assert_eq!(entry.tree.len(), 2);
    assert_eq!(entry.store.len(), 1);
}

#[tokio::test]
async fn second_push_without_changes_is_a_noop() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "f.txt", b"v1");

    let sync = client(&url, AuthMethod::Anonymous);
    sync.push_all("p", src.path()).await.unwrap();
    sync.push_all("p", src.path()).await.unwrap();

    assert_eq!(state.project("p").unwrap().tree.len(), 1);
}

#[tokio::test]
async fn incremental_push_is_picked_up_by_another_replica() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "one.txt", b"1");
    let writer = client(&url, AuthMethod::Anonymous);
    writer.push_all("p", src.path()).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    let reader = client(&url, AuthMethod::Anonymous);
    reader.pull_all("p", out.path()).await.unwrap();
    assert!(out.path().join("one.txt").exists());

    write(src.path(), "two.txt", b"2");
    writer.push_all("p", src.path()).await.unwrap();

    reader.pull_all("p", out.path()).await.unwrap();
    assert_eq!(std::fs::read(out.path().join("two.txt")).unwrap(), b"2");
}

#[tokio::test]
async fn pull_file_fetches_exactly_one_file() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "wanted.txt", b"the one");
    write(src.path(), "other.txt", b"not this");
    client(&url, AuthMethod::Anonymous)
        .push_all("p", src.path())
        .await
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("wanted-copy.txt");
    client(&url, AuthMethod::Anonymous)
        .pull_file("p", "/wanted.txt", &target)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"the one");
}

#[tokio::test]
async fn pull_file_missing_path_is_file_not_found() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let out = tempfile::tempdir().unwrap();
    let err = client(&url, AuthMethod::Anonymous)
        .pull_file("p", "/ghost.txt", &out.path().join("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::FileNotFound { .. }));
}

#[tokio::test]
async fn missing_project_surfaces_not_found_in_fetch_phase() {
    let (url, _state) = spawn_server(Arc::new(AllowAllAuth)).await;

    let out = tempfile::tempdir().unwrap();
    let err = client(&url, AuthMethod::Anonymous)
        .pull_all("ghost", out.path())
        .await
        .unwrap_err();
    assert_eq!(err.phase(), Some(SyncPhase::Fetch));
    assert!(matches!(
        &err,
        SyncError::Phase { source, .. } if matches!(&**source, SyncError::ProjectNotFound(_))
    ));
}

#[tokio::test]
async fn bad_token_surfaces_auth_error() {
    let (url, state) = spawn_server(Arc::new(StaticTokenAuth::single("secret", "alice"))).await;
    state.create_project("p").unwrap();

    let out = tempfile::tempdir().unwrap();
    let err = client(&url, AuthMethod::Bearer("wrong".into()))
        .pull_all("p", out.path())
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        SyncError::Phase { source, .. } if matches!(&**source, SyncError::Auth(_))
    ));

    // The right token works.
    client(&url, AuthMethod::Bearer("secret".into()))
        .pull_all("p", out.path())
        .await
        .unwrap();
}

#[tokio::test]
async fn cancelled_sync_reports_cancelled_and_leaves_tree_consistent() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let out = tempfile::tempdir().unwrap();
    let sync = client(&url, AuthMethod::Anonymous);
    sync.cancellation_token().cancel();

    let err = sync.pull_all("p", out.path()).await.unwrap_err();
    assert!(matches!(err, SyncError::Cancelled));
    assert!(sync.tree().is_empty());
}

#[tokio::test]
async fn staged_changes_survive_a_failed_push_and_an_intervening_pull() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "late.txt", b"almost lost");

    // First push fails after the directory has been folded into the tree.
    let sync = client(&url, AuthMethod::Anonymous);
    assert!(sync.push_all("p", src.path()).await.is_err());
    assert!(sync.tree().contains_file("/late.txt"));

    // A pull completes and moves the sync baseline past the staged write.
    state.create_project("p").unwrap();
    sync.pull_all("p", src.path()).await.unwrap();

    // The next push must still deliver the file.
    sync.push_all("p", src.path()).await.unwrap();
    assert!(state.project("p").unwrap().tree.contains_file("/late.txt"));
    assert_eq!(
        state.project("p").unwrap().store.len(),
        1,
        "blob bytes must arrive with the entry"
    );
}

#[tokio::test]
async fn periodic_manager_syncs_and_stops_on_cancel() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "beat.txt", b"tick");

    let manager = Arc::new(SyncManager::new(
        Arc::new(client(&url, AuthMethod::Anonymous)),
        "p",
        dir.path(),
        std::time::Duration::from_millis(50),
    ));
    let cancel = manager.cancellation_token();
    let runner = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.run().await })
    };

    // Wait for at least one cycle to land on the server.
    for _ in 0..50 {
        if state.project("p").unwrap().tree.contains_file("/beat.txt") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(state.project("p").unwrap().tree.contains_file("/beat.txt"));

    cancel.cancel();
    runner.await.unwrap();
}

#[tokio::test]
async fn deleted_local_file_is_removed_remotely_on_push() {
    let (url, state) = spawn_server(Arc::new(AllowAllAuth)).await;
    state.create_project("p").unwrap();

    let src = tempfile::tempdir().unwrap();
    write(src.path(), "keep.txt", b"keep");
    write(src.path(), "drop.txt", b"drop");

    let sync = client(&url, AuthMethod::Anonymous);
    sync.push_all("p", src.path()).await.unwrap();
    assert_eq!(state.project("p").unwrap().tree.len(), 2);

    std::fs::remove_file(src.path().join("drop.txt")).unwrap();
    sync.push_all("p", src.path()).await.unwrap();

    let entry = state.project("p").unwrap();
    assert!(entry.tree.contains_file("/keep.txt"));
    assert!(!entry.tree.contains_file("/drop.txt"));
}
