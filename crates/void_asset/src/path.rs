//! Asset paths - project-relative, normalized file identifiers

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};

/// Path of a file or folder relative to the asset root.
///
/// Segments are separated by `/` on every platform, never contain `.` or
/// `..`, and comparison is case-sensitive. The empty path is the root.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Parse and normalize a path string.
    ///
    /// `\` is accepted as a separator, empty and `.` segments are dropped.
    /// Absolute paths, drive prefixes and `..` are rejected.
    pub fn new(raw: impl AsRef<str>) -> AssetResult<Self> {
        let raw = raw.as_ref();
        let invalid = |reason| AssetError::InvalidPath {
            path: raw.to_string(),
            reason,
        };

        if raw.starts_with('/') || raw.starts_with('\\') {
            return Err(invalid("absolute paths are not asset paths"));
        }

        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => return Err(invalid("'..' escapes the asset root")),
                s if segments.is_empty() && is_drive(s) => {
                    return Err(invalid("drive prefixes are not asset paths"));
                }
                s => segments.push(s),
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// The asset root itself
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Relativize a filesystem path against the asset root
    pub fn from_fs_path(root: &Path, path: &Path) -> AssetResult<Self> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| AssetError::OutsideRoot(path.to_path_buf()))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => match name.to_str() {
                    Some(name) => segments.push(name),
                    None => {
                        return Err(AssetError::InvalidPath {
                            path: relative.to_string_lossy().into_owned(),
                            reason: "file name is not valid UTF-8",
                        })
                    }
                },
                Component::CurDir => {}
                _ => return Err(AssetError::OutsideRoot(path.to_path_buf())),
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// Location of this asset below `root`
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment (empty for the root)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Extension of the last segment, without the dot.
    ///
    /// A leading dot (`.hidden`) is not an extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Containing folder (`None` for the root)
    pub fn parent(&self) -> Option<AssetPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Append a single file or folder name
    pub fn join(&self, name: &str) -> AssetResult<AssetPath> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(AssetError::InvalidPath {
                path: name.to_string(),
                reason: "not a single path segment",
            });
        }
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Whether `self` equals `ancestor` or lies below it (segment-wise)
    pub fn starts_with(&self, ancestor: &AssetPath) -> bool {
        if ancestor.is_root() {
            return true;
        }
        self.0 == ancestor.0
            || (self.0.starts_with(&ancestor.0) && self.0[ancestor.0.len()..].starts_with('/'))
    }

    /// First segment, e.g. `atlas` for `atlas/ui.png`
    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetPath({:?})", self.0)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = AssetError;

    fn try_from(value: String) -> AssetResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = AssetError;

    fn try_from(value: &str) -> AssetResult<Self> {
        Self::new(value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `C:` style Windows drive
fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let path = AssetPath::new("gfx//./player\\idle.png").unwrap();
        assert_eq!(path.as_str(), "gfx/player/idle.png");
        assert_eq!(path.file_name(), "idle.png");
        assert_eq!(path.extension(), Some("png"));
    }

    #[test]
    fn test_rejects_escapes() {
        assert!(AssetPath::new("gfx/../../etc/passwd").is_err());
        assert!(AssetPath::new("/abs/path.png").is_err());
        assert!(AssetPath::new("C:/textures/a.png").is_err());
    }

    #[test]
    fn test_colon_in_name_is_not_a_drive() {
        assert_eq!(AssetPath::new("a:b.png").unwrap().as_str(), "a:b.png");
        assert_eq!(AssetPath::new("gfx/c:d.png").unwrap().as_str(), "gfx/c:d.png");
        assert!(AssetPath::new("d:/a.png").is_err());
        assert!(AssetPath::new("C:").is_err());
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(AssetPath::new("gfx/A.png").unwrap(), AssetPath::new("gfx/a.png").unwrap());
    }

    #[test]
    fn test_parent_chain() {
        let path = AssetPath::new("scene/levels/one.scene").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "scene/levels");
        assert_eq!(parent.parent().unwrap().as_str(), "scene");
        assert!(parent.parent().unwrap().parent().unwrap().is_root());
        assert!(AssetPath::root().parent().is_none());
    }

    #[test]
    fn test_starts_with_is_segment_wise() {
        let atlas = AssetPath::new("atlas").unwrap();
        assert!(AssetPath::new("atlas/ui.png").unwrap().starts_with(&atlas));
        assert!(!AssetPath::new("atlases/ui.png").unwrap().starts_with(&atlas));
        assert!(atlas.starts_with(&AssetPath::root()));
    }

    #[test]
    fn test_fs_round_trip() {
        let root = Path::new("/project/assets");
        let fs_path = root.join("gfx").join("a.png");
        let path = AssetPath::from_fs_path(root, &fs_path).unwrap();
        assert_eq!(path.as_str(), "gfx/a.png");
        assert_eq!(path.to_fs_path(root), fs_path);

        assert!(matches!(
            AssetPath::from_fs_path(root, Path::new("/elsewhere/a.png")),
            Err(AssetError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_hidden_file_has_no_extension() {
        assert_eq!(AssetPath::new(".gitkeep").unwrap().extension(), None);
        assert_eq!(AssetPath::new("gfx/noext").unwrap().extension(), None);
    }

    #[test]
    fn test_join_single_segment() {
        let root = AssetPath::root();
        assert_eq!(root.join("gfx").unwrap().as_str(), "gfx");
        assert!(root.join("a/b").is_err());
        assert!(root.join("..").is_err());
    }
}
