//! Asset usage analysis.
//!
//! Finds every place a scene references an asset. There is no reference
//! index: each call parses every scene below the asset root, so results
//! always reflect the files on disk at the time of the call.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use void_asset::{AssetError, AssetKind, AssetPath, AssetResult, ErrorKind, FileIndex};
use void_asset_server::{SceneLoader, SceneReference};

/// Where inside a scene a reference lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UsageLocation {
    /// Entity names from the top level down, joined by `/`
    pub entity: String,
    /// Sibling position at each level, distinguishes same-named entities
    pub entity_index: Vec<usize>,
    pub component: String,
    pub component_index: usize,
    pub field: String,
}

impl From<SceneReference> for UsageLocation {
    fn from(reference: SceneReference) -> Self {
        Self {
            entity: reference.entity_path,
            entity_index: reference.entity_index,
            component: reference.component.to_string(),
            component_index: reference.component_index,
            field: reference.field.to_string(),
        }
    }
}

impl fmt::Display for UsageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position: Vec<String> = self.entity_index.iter().map(|i| i.to_string()).collect();
        write!(
            f,
            "{}[{}] > {}#{}.{}",
            self.entity,
            position.join("/"),
            self.component,
            self.component_index,
            self.field
        )
    }
}

/// One reference to the analysed asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetUsage {
    pub scene: AssetPath,
    pub location: UsageLocation,
}

/// A scene that was skipped during the scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub scene: AssetPath,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: ErrorKind,
    pub message: String,
}

fn serialize_kind<S: serde::Serializer>(kind: &ErrorKind, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(kind)
}

/// Result of one analysis. Never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetsUsages {
    pub target: AssetPath,
    /// Sorted by scene path, then document order within a scene
    pub usages: Vec<AssetUsage>,
    pub warnings: Vec<ScanWarning>,
}

impl AssetsUsages {
    pub fn count(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Distinct referencing scenes, in order
    pub fn scenes(&self) -> Vec<&AssetPath> {
        let mut scenes: Vec<&AssetPath> = self.usages.iter().map(|u| &u.scene).collect();
        scenes.dedup();
        scenes
    }
}

impl fmt::Display for AssetsUsages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is used {} time(s) in {} scene(s)",
            self.target,
            self.count(),
            self.scenes().len()
        )
    }
}

/// Computes references to an asset across all scenes.
#[derive(Clone, Debug)]
pub struct UsageAnalyzer {
    index: Arc<FileIndex>,
}

impl UsageAnalyzer {
    pub fn new(index: Arc<FileIndex>) -> Self {
        Self { index }
    }

    /// Whether scenes can reference this kind of asset.
    pub fn can_analyze(&self, path: &AssetPath) -> bool {
        !path.is_root() && AssetKind::of(path).is_analyzable()
    }

    /// Collect every reference to `path` from every scene.
    ///
    /// Unreadable or corrupt scenes are skipped and reported in
    /// [`AssetsUsages::warnings`]. Only an unreadable asset root fails.
    pub fn analyze(&self, path: &AssetPath) -> AssetResult<AssetsUsages> {
        if !self.can_analyze(path) {
            return Err(AssetError::NotAnalyzable(path.clone()));
        }

        let mut scenes = self
            .index
            .walk_files(|p| AssetKind::of(p) == AssetKind::Scene)?;
        scenes.sort();

        let mut usages = Vec::new();
        let mut warnings = Vec::new();

        for scene in scenes {
            let document = match self
                .index
                .read(&scene)
                .and_then(|data| SceneLoader::load(&data, &scene))
            {
                Ok(document) => document,
                Err(e) => {
                    log::warn!("Skipping scene '{}' during usage scan: {}", scene, e);
                    warnings.push(ScanWarning {
                        scene,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            usages.extend(
                document
                    .references_to(path)
                    .into_iter()
                    .map(|reference| AssetUsage {
                        scene: scene.clone(),
                        location: reference.into(),
                    }),
            );
        }

        log::debug!(
            "Usage scan of '{}': {} reference(s), {} warning(s)",
            path,
            usages.len(),
            warnings.len()
        );

        Ok(AssetsUsages {
            target: path.clone(),
            usages,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use void_asset::IndexConfig;

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    fn sprite_scene(textures: &[&str]) -> String {
        let components: Vec<String> = textures
            .iter()
            .map(|t| format!(r#"{{ "type": "Sprite", "texture": "{}" }}"#, t))
            .collect();
        format!(
            r#"{{ "name": "s", "entities": [ {{ "name": "E", "components": [{}] }} ] }}"#,
            components.join(",")
        )
    }

    fn analyzer(root: &std::path::Path) -> UsageAnalyzer {
        UsageAnalyzer::new(Arc::new(FileIndex::new(root, IndexConfig::default())))
    }

    #[test]
    fn test_can_analyze_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer(dir.path());

        assert!(analyzer.can_analyze(&path("gfx/a.png")));
        assert!(analyzer.can_analyze(&path("fonts/a.ttf")));
        assert!(analyzer.can_analyze(&path("atlas/ui.atlas")));
        assert!(!analyzer.can_analyze(&path("scene/a.scene")));
        assert!(!analyzer.can_analyze(&path("notes.txt")));
        assert!(!analyzer.can_analyze(&path("gfx")));
        assert!(matches!(
            analyzer.analyze(&path("scene/a.scene")),
            Err(AssetError::NotAnalyzable(_))
        ));
    }

    #[test]
    fn test_counts_every_reference() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("scene")).unwrap();
        fs::write(
            dir.path().join("scene").join("b.scene"),
            sprite_scene(&["gfx/a.png", "gfx/other.png", "gfx/a.png"]),
        )
        .unwrap();
        fs::write(dir.path().join("scene").join("a.scene"), sprite_scene(&["gfx/a.png"])).unwrap();

        let usages = analyzer(dir.path()).analyze(&path("gfx/a.png")).unwrap();

        assert_eq!(usages.count(), 3);
        assert_eq!(usages.scenes(), vec![&path("scene/a.scene"), &path("scene/b.scene")]);
        assert_eq!(usages.usages[1].location.component_index, 0);
        assert_eq!(usages.usages[2].location.component_index, 2);
        assert!(usages.warnings.is_empty());
    }

    #[test]
    fn test_same_named_entities_are_separate_usages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("arena.scene"),
            r#"{ "name": "arena", "entities": [
                { "name": "Enemy", "components": [{ "type": "Sprite", "texture": "a.png" }] },
                { "name": "Enemy", "components": [{ "type": "Sprite", "texture": "a.png" }] }
            ] }"#,
        )
        .unwrap();

        let usages = analyzer(dir.path()).analyze(&path("a.png")).unwrap();

        assert_eq!(usages.count(), 2);
        assert_ne!(usages.usages[0], usages.usages[1]);
        assert_eq!(usages.usages[0].location.to_string(), "Enemy[0] > Sprite#0.texture");
        assert_eq!(usages.usages[1].location.to_string(), "Enemy[1] > Sprite#0.texture");
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("level.scene"), sprite_scene(&["a.png"])).unwrap();

        let analyzer = analyzer(dir.path());
        let first = analyzer.analyze(&path("a.png")).unwrap();
        let second = analyzer.analyze(&path("a.png")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "'a.png' is used 1 time(s) in 1 scene(s)");
    }

    #[test]
    fn test_corrupt_scene_becomes_warning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.scene"), sprite_scene(&["a.png"])).unwrap();
        fs::write(dir.path().join("bad.scene"), "{ not json").unwrap();

        let usages = analyzer(dir.path()).analyze(&path("a.png")).unwrap();
        assert_eq!(usages.count(), 1);
        assert_eq!(usages.warnings.len(), 1);
        assert_eq!(usages.warnings[0].scene, path("bad.scene"));
        assert_eq!(usages.warnings[0].kind, ErrorKind::CorruptFormat);
    }
}
