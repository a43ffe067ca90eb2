//! Document loaders for the asset kinds the editor can open

mod atlas;
mod scene;

pub use atlas::{AtlasDocument, AtlasLoader, AtlasPage, AtlasRegion};
pub use scene::{ComponentDef, EntityDef, SceneDocument, SceneLoader, SceneReference, TransformDef};
