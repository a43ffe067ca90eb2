//! Headless asset browser
//!
//! Drives the asset browser core from the command line and prints what a
//! UI would display.
//!
//! ```text
//! void_assets <asset-root> tree
//! void_assets <asset-root> ls <dir> [search]
//! void_assets <asset-root> open <path>
//! void_assets <asset-root> usages <path> [--json]
//! void_assets <asset-root> delete <path> [--safe]
//! void_assets <asset-root> watch
//! ```
//!
//! The asset root may be omitted when the preferences file names one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use void_asset::{AssetPath, DirectoryNode, ErrorKind, FileEntry, FileIndex};
use void_asset_server::FileWatcher;
use void_editor::{
    AssetBrowser, AssetsUsages, AssetsView, BrowserPreferences, Console, ConsoleLogger,
    DeleteDecision, DeleteOutcome, OpenDocument,
};

const COMMANDS: [&str; 6] = ["tree", "ls", "open", "usages", "delete", "watch"];

/// Prints every callback to stdout.
struct PrintView;

impl AssetsView for PrintView {
    fn on_tree_changed(&mut self, tree: &DirectoryNode) {
        for node in tree.iter() {
            let depth = node.path.segments().count();
            let name = if node.is_root() { "." } else { node.name() };
            println!("{}{}/", "  ".repeat(depth), name);
        }
    }

    fn on_file_list_changed(&mut self, dir: &AssetPath, entries: &[FileEntry]) {
        println!("-- {} ({} files)", if dir.is_root() { "." } else { dir.as_str() }, entries.len());
        for entry in entries {
            let size = entry.size.map(|s| format!("{} B", s)).unwrap_or_default();
            println!("{:<40} {:<16} {:>10}", entry.name(), entry.kind.name(), size);
        }
    }

    fn on_usages_found(&mut self, usages: &AssetsUsages) {
        println!("{}", usages);
        for usage in &usages.usages {
            println!("  {}: {}", usage.scene, usage.location);
        }
        for warning in &usages.warnings {
            println!("  skipped {} ({}): {}", warning.scene, warning.kind, warning.message);
        }
    }

    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        eprintln!("error [{}]: {}", kind, message);
    }
}

fn main() {
    let console = Arc::new(Mutex::new(Console::new()));
    if let Err(e) = ConsoleLogger::new(Arc::clone(&console)).init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&args);

    let warnings = console.lock().warning_count();
    if warnings > 0 {
        eprintln!("{} warning(s) logged", warnings);
    }

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn usage() -> String {
    format!("usage: void_assets <asset-root> <{}> [args]", COMMANDS.join("|"))
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let prefs_path = BrowserPreferences::default_path();
    let prefs = match &prefs_path {
        Some(path) => BrowserPreferences::load_or_default(path)?,
        None => BrowserPreferences::default(),
    };

    // Root from the first argument unless it is already a command
    let (root, rest) = match args.split_first() {
        Some((first, rest)) if !COMMANDS.contains(&first.as_str()) => (PathBuf::from(first), rest),
        _ => match &prefs.asset_root {
            Some(root) => (root.clone(), args),
            None => return Err(usage().into()),
        },
    };

    let (command, params) = rest.split_first().ok_or_else(usage)?;
    let flag = |name: &str| params.iter().any(|p| p == name);
    let positional: Vec<&String> = params.iter().filter(|p| !p.starts_with("--")).collect();
    let path_arg = |i: usize| -> Result<AssetPath, Box<dyn std::error::Error>> {
        let raw = positional.get(i).ok_or_else(usage)?;
        Ok(AssetPath::new(raw.as_str())?)
    };

    log::debug!("Asset root: {:?}", root);
    let index = Arc::new(FileIndex::new(&root, prefs.index.clone()));
    let mut browser = AssetBrowser::new(index, PrintView);

    match command.as_str() {
        "tree" => browser.refresh_tree()?,
        "ls" => {
            let dir = match positional.first() {
                Some(_) => path_arg(0)?,
                None => AssetPath::root(),
            };
            browser.change_directory(&dir)?;
            if let Some(search) = positional.get(1) {
                if !browser.set_search(search.as_str()) {
                    println!("no file matches '{}'", search);
                }
            }
        }
        "open" => {
            let handle = browser.request_open(&path_arg(0)?)?;
            match handle.document() {
                OpenDocument::Scene(scene) => println!(
                    "scene '{}': {} entities, {} asset references",
                    scene.name,
                    scene.entity_count(),
                    scene.references().len()
                ),
                OpenDocument::Atlas(atlas) => {
                    println!("atlas with {} page(s)", atlas.pages.len());
                    for source in browser.drag_sources() {
                        println!("  {}", source.label);
                    }
                }
            }
        }
        "usages" => {
            let path = path_arg(0)?;
            if flag("--json") {
                let usages = browser.analyzer().analyze(&path)?;
                println!("{}", serde_json::to_string_pretty(&usages)?);
            } else {
                browser.find_usages(&path)?;
            }
        }
        "delete" => {
            let path = path_arg(0)?;
            let prompt = browser.request_delete(&path)?;
            let decision = if flag("--safe") && prompt.can_safe_delete() {
                DeleteDecision::SafeDeleteChecked
            } else {
                if flag("--safe") {
                    println!("'{}' cannot be checked for usages, deleting directly", path);
                }
                DeleteDecision::DeleteDirectly
            };

            match browser.resolve_delete(prompt, decision)? {
                DeleteOutcome::Deleted(path) => println!("deleted '{}'", path),
                DeleteOutcome::UsagesFound(usages) => {
                    println!("kept '{}': {} usage(s)", usages.target, usages.count())
                }
                DeleteOutcome::Cancelled(_) => {}
            }
        }
        "watch" => {
            if !prefs.watcher.enabled {
                return Err("file watching is disabled in preferences".into());
            }
            let mut watcher = FileWatcher::new(&root)?;
            watcher.set_debounce(prefs.watcher.debounce());

            browser.refresh_tree()?;
            let start = prefs.last_directory.clone().unwrap_or_else(AssetPath::root);
            if browser.change_directory(&start).is_err() {
                browser.change_directory(&AssetPath::root())?;
            }

            log::info!("Watching {:?}, press Ctrl-C to stop", root);
            loop {
                browser.pump(&mut watcher);
                std::thread::sleep(Duration::from_millis(50));
            }
        }
        other => return Err(format!("unknown command '{}'\n{}", other, usage()).into()),
    }

    Ok(())
}
