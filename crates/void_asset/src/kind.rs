//! Asset kinds and the per-kind capability table

use crate::path::AssetPath;

/// Type of asset based on file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Scene,
    Atlas,
    Texture,
    TrueTypeFont,
    BitmapFont,
    Particle,
    Other,
}

/// What the editor may do with an asset kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindTraits {
    /// Has a document loader and can be opened in a tab
    pub openable: bool,
    /// Can be referenced by scenes, so usage analysis applies
    pub analyzable: bool,
    /// Display name
    pub name: &'static str,
}

impl AssetKind {
    pub const ALL: [AssetKind; 7] = [
        AssetKind::Scene,
        AssetKind::Atlas,
        AssetKind::Texture,
        AssetKind::TrueTypeFont,
        AssetKind::BitmapFont,
        AssetKind::Particle,
        AssetKind::Other,
    ];

    /// Determine asset kind from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "scene" => AssetKind::Scene,
            "atlas" => AssetKind::Atlas,
            "png" | "jpg" | "jpeg" => AssetKind::Texture,
            "ttf" => AssetKind::TrueTypeFont,
            "fnt" => AssetKind::BitmapFont,
            "p" => AssetKind::Particle,
            _ => AssetKind::Other,
        }
    }

    /// Determine asset kind of a path
    pub fn of(path: &AssetPath) -> Self {
        path.extension()
            .map(Self::from_extension)
            .unwrap_or(AssetKind::Other)
    }

    pub const fn traits(self) -> KindTraits {
        match self {
            AssetKind::Scene => KindTraits { openable: true, analyzable: false, name: "Scene" },
            AssetKind::Atlas => KindTraits { openable: true, analyzable: true, name: "Texture Atlas" },
            AssetKind::Texture => KindTraits { openable: false, analyzable: true, name: "Texture" },
            AssetKind::TrueTypeFont => KindTraits { openable: false, analyzable: true, name: "TrueType Font" },
            AssetKind::BitmapFont => KindTraits { openable: false, analyzable: true, name: "Bitmap Font" },
            AssetKind::Particle => KindTraits { openable: false, analyzable: true, name: "Particle Effect" },
            AssetKind::Other => KindTraits { openable: false, analyzable: false, name: "File" },
        }
    }

    pub fn is_openable(self) -> bool {
        self.traits().openable
    }

    pub fn is_analyzable(self) -> bool {
        self.traits().analyzable
    }

    pub fn name(self) -> &'static str {
        self.traits().name
    }
}
