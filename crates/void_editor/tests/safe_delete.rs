//! End-to-end tests of the browser core against a project on disk

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use void_asset::{
    AssetError, AssetPath, DirEntryInfo, DirectoryNode, DiskFileSystem, ErrorKind, FileEntry,
    FileIndex, FileMeta, FileSystem, IndexConfig,
};
use void_asset_server::WatchEvent;
use void_editor::{AssetBrowser, AssetsUsages, AssetsView, DeleteDecision, DeleteOutcome};

#[derive(Default)]
struct TestView {
    trees: Vec<Vec<AssetPath>>,
    usages: Vec<AssetsUsages>,
    errors: Vec<(ErrorKind, String)>,
}

impl AssetsView for TestView {
    fn on_tree_changed(&mut self, tree: &DirectoryNode) {
        self.trees.push(tree.iter().map(|node| node.path.clone()).collect());
    }

    fn on_file_list_changed(&mut self, _dir: &AssetPath, _entries: &[FileEntry]) {}

    fn on_usages_found(&mut self, usages: &AssetsUsages) {
        self.usages.push(usages.clone());
    }

    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        self.errors.push((kind, message.to_string()));
    }
}

fn path(s: &str) -> AssetPath {
    AssetPath::new(s).unwrap()
}

fn sprite_scene(name: &str, textures: &[&str]) -> String {
    let components: Vec<String> = textures
        .iter()
        .map(|t| format!(r#"{{ "type": "Sprite", "texture": "{}" }}"#, t))
        .collect();
    format!(
        r#"{{ "name": "{}", "entities": [ {{ "name": "Sprite", "components": [{}] }} ] }}"#,
        name,
        components.join(",")
    )
}

/// gfx/a.png used once by scene1 and once by scene2, scene3 corrupt,
/// gfx/unused.png used nowhere, empty gfx/ui and tmp/ folders.
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("gfx").join("ui")).unwrap();
    fs::create_dir_all(root.join("scene")).unwrap();
    fs::create_dir_all(root.join("tmp")).unwrap();
    fs::write(root.join("gfx").join("a.png"), b"png").unwrap();
    fs::write(root.join("gfx").join("unused.png"), b"png").unwrap();
    fs::write(root.join("scene").join("scene1.scene"), sprite_scene("scene1", &["gfx/a.png"])).unwrap();
    fs::write(root.join("scene").join("scene2.scene"), sprite_scene("scene2", &["gfx/a.png"])).unwrap();
    fs::write(root.join("scene").join("scene3.scene"), "{ \"name\": ").unwrap();
    dir
}

fn browser_with(root: &Path, fs: Arc<dyn FileSystem>) -> AssetBrowser<TestView> {
    let index = FileIndex::with_file_system(root, IndexConfig::default(), fs);
    let mut browser = AssetBrowser::new(Arc::new(index), TestView::default());
    browser.refresh_tree().unwrap();
    browser
}

fn browser(root: &Path) -> AssetBrowser<TestView> {
    browser_with(root, Arc::new(DiskFileSystem))
}

#[test]
fn test_empty_whitelisted_folder_shown() {
    let dir = project();
    let browser = browser(dir.path());
    let tree = browser.tree().unwrap();

    assert!(tree.contains(&path("gfx")));
    assert!(tree.contains(&path("gfx/ui")));
    assert!(!tree.contains(&path("tmp")));
}

#[test]
fn test_safe_delete_of_used_asset_keeps_file() {
    let dir = project();
    let mut browser = browser(dir.path());

    let prompt = browser.request_delete(&path("gfx/a.png")).unwrap();
    assert!(prompt.can_safe_delete());
    let outcome = browser
        .resolve_delete(prompt, DeleteDecision::SafeDeleteChecked)
        .unwrap();

    let DeleteOutcome::UsagesFound(usages) = outcome else {
        panic!("expected usages, got {:?}", outcome);
    };
    assert_eq!(usages.count(), 2);
    assert_eq!(
        usages.scenes(),
        vec![&path("scene/scene1.scene"), &path("scene/scene2.scene")]
    );
    assert_ne!(usages.usages[0], usages.usages[1]);
    assert!(dir.path().join("gfx").join("a.png").exists());
    assert_eq!(browser.view().usages.len(), 1);
}

#[test]
fn test_corrupt_scene_reported_as_warning() {
    let dir = project();
    let mut browser = browser(dir.path());

    let usages = browser.find_usages(&path("gfx/a.png")).unwrap();
    assert_eq!(usages.count(), 2);
    assert_eq!(usages.warnings.len(), 1);
    assert_eq!(usages.warnings[0].scene, path("scene/scene3.scene"));
    assert_eq!(usages.warnings[0].kind, ErrorKind::CorruptFormat);
}

#[test]
fn test_safe_delete_of_unused_asset_removes_and_releases() {
    let dir = project();
    fs::write(dir.path().join("gfx").join("unused.atlas"), "unused.png\nr\n  size: 1, 1\n").unwrap();
    let mut browser = browser(dir.path());

    let atlas = path("gfx/unused.atlas");
    let handle = browser.request_open(&atlas).unwrap();

    let prompt = browser.request_delete(&atlas).unwrap();
    let outcome = browser
        .resolve_delete(prompt, DeleteDecision::SafeDeleteChecked)
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted(atlas.clone()));
    assert!(!dir.path().join("gfx").join("unused.atlas").exists());
    assert!(handle.is_released());
    assert!(!browser.documents().is_open(&atlas));
}

#[test]
fn test_delete_folder_releases_documents_below() {
    let dir = project();
    let mut browser = browser(dir.path());
    let scene = browser.request_open(&path("scene/scene1.scene")).unwrap();

    let prompt = browser.request_delete(&path("scene")).unwrap();
    assert!(!prompt.can_safe_delete());
    browser
        .resolve_delete(prompt, DeleteDecision::DeleteDirectly)
        .unwrap();

    assert!(scene.is_released());
    let last_tree = browser.view().trees.last().unwrap();
    assert!(!last_tree.contains(&path("scene")));
}

#[test]
fn test_watcher_removal_invalidates_open_document() {
    let dir = project();
    let mut browser = browser(dir.path());
    let scene = path("scene/scene2.scene");
    let handle = browser.request_open(&scene).unwrap();

    fs::remove_file(dir.path().join("scene").join("scene2.scene")).unwrap();
    browser.handle_watch_event(&WatchEvent::Removed(scene.clone()));

    assert!(handle.is_released());
    assert!(!browser.documents().is_open(&scene));
}

#[test]
fn test_removal_emptying_folder_rebuilds_tree() {
    let dir = project();
    fs::create_dir_all(dir.path().join("sounds")).unwrap();
    fs::write(dir.path().join("sounds").join("a.ogg"), b"ogg").unwrap();
    let mut browser = browser(dir.path());
    assert!(browser.tree().unwrap().contains(&path("sounds")));

    fs::remove_file(dir.path().join("sounds").join("a.ogg")).unwrap();
    browser.handle_watch_event(&WatchEvent::Removed(path("sounds/a.ogg")));

    assert!(!browser.tree().unwrap().contains(&path("sounds")));
}

/// Disk access that refuses every removal
struct ReadOnlyFileSystem;

impl FileSystem for ReadOnlyFileSystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        DiskFileSystem.list(dir)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        DiskFileSystem.read(path)
    }

    fn remove(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::PermissionDenied))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        DiskFileSystem.metadata(path)
    }
}

#[test]
fn test_failed_removal_leaves_file_and_reports() {
    let dir = project();
    let mut browser = browser_with(dir.path(), Arc::new(ReadOnlyFileSystem));

    let prompt = browser.request_delete(&path("gfx/unused.png")).unwrap();
    let result = browser.resolve_delete(prompt, DeleteDecision::SafeDeleteChecked);

    assert!(matches!(result, Err(AssetError::PermissionDenied { .. })));
    assert!(dir.path().join("gfx").join("unused.png").exists());
    assert_eq!(browser.view().errors[0].0, ErrorKind::Permission);

    // the guard was released with the prompt
    assert!(browser.request_delete(&path("gfx/unused.png")).is_ok());
}

#[test]
fn test_analysis_is_repeatable_and_limited_to_analyzable_kinds() {
    let dir = project();
    let browser = browser(dir.path());
    let analyzer = browser.analyzer();

    let first = analyzer.analyze(&path("gfx/a.png")).unwrap();
    let second = analyzer.analyze(&path("gfx/a.png")).unwrap();
    assert_eq!(first, second);

    assert!(!analyzer.can_analyze(&path("scene/scene1.scene")));
    assert!(matches!(
        analyzer.analyze(&path("scene/scene1.scene")),
        Err(AssetError::NotAnalyzable(_))
    ));
}
