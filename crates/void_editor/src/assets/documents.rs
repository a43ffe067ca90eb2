//! Documents the editor can open in a tab.

use void_asset::{AssetError, AssetKind, AssetPath, AssetResult, DocumentHandle, FileIndex};
use void_asset_server::{AtlasDocument, AtlasLoader, SceneDocument, SceneLoader};

/// An opened scene or texture atlas.
#[derive(Clone, Debug, PartialEq)]
pub enum OpenDocument {
    Scene(SceneDocument),
    Atlas(AtlasDocument),
}

/// Handle to an open document, as stored in the browser's cache.
pub type OpenDocumentHandle = DocumentHandle<OpenDocument>;

/// Parses file contents into an [`OpenDocument`].
pub type Opener = fn(&[u8], &AssetPath) -> AssetResult<OpenDocument>;

fn open_scene(data: &[u8], path: &AssetPath) -> AssetResult<OpenDocument> {
    SceneLoader::load(data, path).map(OpenDocument::Scene)
}

fn open_atlas(data: &[u8], path: &AssetPath) -> AssetResult<OpenDocument> {
    AtlasLoader::load(data, path).map(OpenDocument::Atlas)
}

/// Opener for a kind. Agrees with [`AssetKind::is_openable`].
pub fn opener_for(kind: AssetKind) -> Option<Opener> {
    match kind {
        AssetKind::Scene => Some(open_scene),
        AssetKind::Atlas => Some(open_atlas),
        AssetKind::Texture
        | AssetKind::TrueTypeFont
        | AssetKind::BitmapFont
        | AssetKind::Particle
        | AssetKind::Other => None,
    }
}

/// Read and parse a document through the index.
pub fn load_document(index: &FileIndex, path: &AssetPath) -> AssetResult<OpenDocument> {
    let opener = opener_for(AssetKind::of(path)).ok_or_else(|| AssetError::NotOpenable(path.clone()))?;
    let data = index.read(path)?;
    opener(&data, path)
}

impl OpenDocument {
    pub fn kind(&self) -> AssetKind {
        match self {
            OpenDocument::Scene(_) => AssetKind::Scene,
            OpenDocument::Atlas(_) => AssetKind::Atlas,
        }
    }

    pub fn as_scene(&self) -> Option<&SceneDocument> {
        match self {
            OpenDocument::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn as_atlas(&self) -> Option<&AtlasDocument> {
        match self {
            OpenDocument::Atlas(atlas) => Some(atlas),
            _ => None,
        }
    }
}
