//! Integration tests for void_asset_server

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use void_asset::{AssetKind, AssetPath, DiskFileSystem};
use void_asset_server::*;

fn path(s: &str) -> AssetPath {
    AssetPath::new(s).unwrap()
}

#[test]
fn test_loader_kinds_match_table() {
    assert_eq!(SceneLoader::KIND, AssetKind::Scene);
    assert_eq!(AtlasLoader::KIND, AssetKind::Atlas);
    assert!(SceneLoader::KIND.is_openable());
    assert!(AtlasLoader::KIND.is_openable());
}

#[test]
fn test_load_scene_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("scene")).unwrap();
    fs::write(
        dir.path().join("scene").join("menu.scene"),
        r#"{ "name": "menu", "entities": [
            { "name": "Logo", "components": [ { "type": "Sprite", "texture": "gfx\\logo.png" } ] }
        ] }"#,
    )
    .unwrap();

    let data = fs::read(dir.path().join("scene").join("menu.scene")).unwrap();
    let scene = SceneLoader::load(&data, &path("scene/menu.scene")).unwrap();

    // backslashes in scene files normalize like any other asset path
    let refs = scene.references_to(&path("gfx/logo.png"));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].field, "texture");
}

#[test]
fn test_normalizer_reports_removal_after_delete_completes() {
    let dir = tempfile::tempdir().unwrap();
    let mut normalizer = ChangeNormalizer::new(dir.path(), Arc::new(DiskFileSystem));
    fs::create_dir(dir.path().join("gfx")).unwrap();
    let file = dir.path().join("gfx").join("a.png");
    fs::write(&file, b"png").unwrap();

    let now = Instant::now();
    let early = normalizer.normalize(
        vec![FileChange { path: file.clone(), kind: FileChangeKind::Deleted }],
        now,
    );
    assert!(early.is_empty());

    fs::remove_file(&file).unwrap();
    let late = normalizer.normalize(Vec::new(), now + Duration::from_millis(5));
    assert_eq!(late, vec![WatchEvent::Removed(path("gfx/a.png"))]);
}

#[test]
fn test_watcher_delivers_to_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    let mut watcher = FileWatcher::new(dir.path()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = watcher.subscribe(move |event| sink.lock().push(event.clone()));

    fs::write(dir.path().join("a.png"), b"png").unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline && seen.lock().is_empty() {
        watcher.poll();
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(seen
        .lock()
        .iter()
        .any(|e| e.path() == &path("a.png")));

    drop(subscription);
    seen.lock().clear();

    fs::remove_file(dir.path().join("a.png")).unwrap();
    let deadline = Instant::now() + Duration::from_millis(500);
    let mut delivered = Vec::new();
    while Instant::now() < deadline {
        delivered.extend(watcher.poll());
        std::thread::sleep(Duration::from_millis(20));
    }

    assert!(seen.lock().is_empty());
    assert!(delivered.iter().all(|e| !e.is_removal() || e.path() == &path("a.png")));
}
