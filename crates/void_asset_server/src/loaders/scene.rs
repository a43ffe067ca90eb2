//! Scene loader for JSON scene definitions

use serde::{Deserialize, Serialize};

use void_asset::{AssetError, AssetKind, AssetPath, AssetResult};

/// Scene definition with entities and their components
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene name
    #[serde(default)]
    pub name: String,
    /// Entities in the scene
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// Entity definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name
    pub name: String,
    /// Transform
    #[serde(default)]
    pub transform: TransformDef,
    /// Components
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    /// Child entities
    #[serde(default)]
    pub children: Vec<EntityDef>,
}

/// 2D transform definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformDef {
    /// Position
    #[serde(default)]
    pub position: [f32; 2],
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f32,
    /// Scale
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            rotation: 0.0,
            scale: default_scale(),
        }
    }
}

/// Component definitions (tagged enum for polymorphism)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentDef {
    /// Sprite drawn from a standalone texture
    Sprite {
        /// Texture asset path (e.g., "gfx/hero.png")
        texture: String,
    },
    /// Sprite drawn from a region of a texture atlas
    AtlasRegion {
        /// Atlas asset path
        atlas: String,
        /// Region name inside the atlas
        region: String,
    },
    /// Text rendered with a TrueType font
    Text {
        /// Font asset path
        font: String,
        /// Font size in pixels
        #[serde(default = "default_font_size")]
        size: u32,
        #[serde(default)]
        text: String,
    },
    /// Text rendered with a bitmap font
    BitmapText {
        /// Font asset path
        font: String,
        #[serde(default)]
        text: String,
    },
    /// Particle emitter
    Particle {
        /// Particle effect asset path
        effect: String,
    },
    /// Custom component (catch-all)
    Custom {
        /// Component type name
        name: String,
        /// Arbitrary JSON data
        #[serde(default)]
        data: serde_json::Value,
    },
}

fn default_font_size() -> u32 {
    16
}

impl ComponentDef {
    /// Component type name as written in the scene file
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentDef::Sprite { .. } => "Sprite",
            ComponentDef::AtlasRegion { .. } => "AtlasRegion",
            ComponentDef::Text { .. } => "Text",
            ComponentDef::BitmapText { .. } => "BitmapText",
            ComponentDef::Particle { .. } => "Particle",
            ComponentDef::Custom { .. } => "Custom",
        }
    }

    /// Asset references held by this component as (field, path string)
    pub fn asset_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            ComponentDef::Sprite { texture } => vec![("texture", texture.as_str())],
            ComponentDef::AtlasRegion { atlas, .. } => vec![("atlas", atlas.as_str())],
            ComponentDef::Text { font, .. } => vec![("font", font.as_str())],
            ComponentDef::BitmapText { font, .. } => vec![("font", font.as_str())],
            ComponentDef::Particle { effect } => vec![("effect", effect.as_str())],
            ComponentDef::Custom { .. } => Vec::new(),
        }
    }
}

/// One asset reference found in a scene
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneReference {
    /// Entity names from the top level down, joined by `/`
    pub entity_path: String,
    /// Position of the entity among its siblings at each level, from the
    /// top down. Tells apart entities sharing a name.
    pub entity_index: Vec<usize>,
    /// Component type name
    pub component: &'static str,
    /// Index of the component within its entity
    pub component_index: usize,
    /// Field holding the reference
    pub field: &'static str,
    /// Referenced asset, `None` when the string is not a valid asset path
    pub target: Option<AssetPath>,
}

impl SceneDocument {
    /// Every asset reference, depth-first by entity, then component order
    pub fn references(&self) -> Vec<SceneReference> {
        let mut out = Vec::new();
        let mut position = Vec::new();
        for (index, entity) in self.entities.iter().enumerate() {
            position.push(index);
            collect_references(entity, "", &mut position, &mut out);
            position.pop();
        }
        out
    }

    /// References that resolve to `target`
    pub fn references_to(&self, target: &AssetPath) -> Vec<SceneReference> {
        self.references()
            .into_iter()
            .filter(|r| r.target.as_ref() == Some(target))
            .collect()
    }

    /// Number of entities including children
    pub fn entity_count(&self) -> usize {
        fn count(entity: &EntityDef) -> usize {
            1 + entity.children.iter().map(count).sum::<usize>()
        }
        self.entities.iter().map(count).sum()
    }
}

fn collect_references(
    entity: &EntityDef,
    prefix: &str,
    position: &mut Vec<usize>,
    out: &mut Vec<SceneReference>,
) {
    let entity_path = if prefix.is_empty() {
        entity.name.clone()
    } else {
        format!("{}/{}", prefix, entity.name)
    };

    for (index, component) in entity.components.iter().enumerate() {
        for (field, raw) in component.asset_fields() {
            out.push(SceneReference {
                entity_path: entity_path.clone(),
                entity_index: position.clone(),
                component: component.type_name(),
                component_index: index,
                field,
                target: AssetPath::new(raw).ok(),
            });
        }
    }

    for (index, child) in entity.children.iter().enumerate() {
        position.push(index);
        collect_references(child, &entity_path, position, out);
        position.pop();
    }
}

/// Loader for scene files
pub struct SceneLoader;

impl SceneLoader {
    pub const KIND: AssetKind = AssetKind::Scene;

    /// Load a scene from JSON bytes
    pub fn load(data: &[u8], path: &AssetPath) -> AssetResult<SceneDocument> {
        let text = std::str::from_utf8(data)
            .map_err(|e| AssetError::corrupt(path, format!("invalid UTF-8: {}", e)))?;

        serde_json::from_str(text)
            .map_err(|e| AssetError::corrupt(path, format!("invalid scene JSON: {}", e)))
    }

    /// Serialize a scene back to pretty JSON
    pub fn save(scene: &SceneDocument) -> AssetResult<String> {
        serde_json::to_string_pretty(scene)
            .map_err(|e| AssetError::StateInvariant(format!("scene serialization failed: {}", e)))
    }

    /// Create an empty scene
    pub fn empty(name: &str) -> SceneDocument {
        SceneDocument {
            name: name.to_string(),
            entities: Vec::new(),
        }
    }
}
