//! Drag payloads for dropping assets onto scene views.

use void_asset::{AssetKind, AssetPath};
use void_asset_server::{AtlasDocument, ComponentDef};

/// What a scene view receives when an asset is dropped on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragPayload {
    Sprite { texture: AssetPath },
    Text { font: AssetPath },
    BitmapText { font: AssetPath },
    Particle { effect: AssetPath },
    AtlasRegion { atlas: AssetPath, region: String },
}

impl DragPayload {
    /// Payload for a single file, `None` for kinds that cannot be dropped.
    pub fn for_file(path: &AssetPath) -> Option<Self> {
        let path = path.clone();
        match AssetKind::of(&path) {
            AssetKind::Texture => Some(DragPayload::Sprite { texture: path }),
            AssetKind::TrueTypeFont => Some(DragPayload::Text { font: path }),
            AssetKind::BitmapFont => Some(DragPayload::BitmapText { font: path }),
            AssetKind::Particle => Some(DragPayload::Particle { effect: path }),
            AssetKind::Scene | AssetKind::Atlas | AssetKind::Other => None,
        }
    }

    /// Component to add to the entity created by the drop.
    pub fn to_component(&self) -> ComponentDef {
        match self {
            DragPayload::Sprite { texture } => ComponentDef::Sprite {
                texture: texture.to_string(),
            },
            DragPayload::Text { font } => ComponentDef::Text {
                font: font.to_string(),
                size: 16,
                text: String::new(),
            },
            DragPayload::BitmapText { font } => ComponentDef::BitmapText {
                font: font.to_string(),
                text: String::new(),
            },
            DragPayload::Particle { effect } => ComponentDef::Particle {
                effect: effect.to_string(),
            },
            DragPayload::AtlasRegion { atlas, region } => ComponentDef::AtlasRegion {
                atlas: atlas.to_string(),
                region: region.clone(),
            },
        }
    }
}

/// A draggable item shown by the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSource {
    pub label: String,
    pub payload: DragPayload,
}

impl DragSource {
    pub fn for_file(path: &AssetPath) -> Option<Self> {
        DragPayload::for_file(path).map(|payload| Self {
            label: path.file_name().to_string(),
            payload,
        })
    }

    /// One source per region of an open atlas
    pub fn for_atlas(path: &AssetPath, atlas: &AtlasDocument) -> Vec<Self> {
        atlas
            .regions()
            .map(|region| Self {
                label: format!("{} ({})", region.name, path.file_name()),
                payload: DragPayload::AtlasRegion {
                    atlas: path.clone(),
                    region: region.name.clone(),
                },
            })
            .collect()
    }
}
