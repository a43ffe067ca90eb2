//! Texture atlas loader for the libGDX text atlas format
//!
//! ```text
//! ui.png
//! size: 256, 256
//! format: RGBA8888
//! filter: Linear, Linear
//! repeat: none
//! button
//!   rotate: false
//!   xy: 2, 2
//!   size: 50, 30
//!   orig: 50, 30
//!   offset: 0, 0
//!   index: -1
//! ```
//!
//! Pages are separated by blank lines. `key: value` lines before the first
//! region belong to the page, after it to the current region.

use void_asset::{AssetError, AssetKind, AssetPath, AssetResult};

/// A parsed texture atlas
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasDocument {
    pub pages: Vec<AtlasPage>,
}

/// One page image and the regions packed into it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtlasPage {
    /// Image file name, relative to the atlas file
    pub image: String,
    pub size: Option<(u32, u32)>,
    pub format: Option<String>,
    pub filter: Option<(String, String)>,
    pub repeat: Option<String>,
    pub regions: Vec<AtlasRegion>,
}

/// A named rectangle on a page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasRegion {
    pub name: String,
    pub rotate: bool,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub orig: (u32, u32),
    pub offset: (i32, i32),
    /// Frame index for animations, -1 when unused
    pub index: i32,
}

impl AtlasDocument {
    /// All regions of all pages, in file order
    pub fn regions(&self) -> impl Iterator<Item = &AtlasRegion> {
        self.pages.iter().flat_map(|page| page.regions.iter())
    }

    pub fn find_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions().find(|region| region.name == name)
    }

    /// Asset path of a page image for an atlas stored at `atlas`
    pub fn page_path(atlas: &AssetPath, page: &AtlasPage) -> AssetResult<AssetPath> {
        match atlas.parent() {
            Some(dir) if !dir.is_root() => AssetPath::new(format!("{}/{}", dir, page.image)),
            _ => AssetPath::new(&page.image),
        }
    }
}

/// Region under construction, `size` is mandatory
struct PendingRegion {
    line: usize,
    name: String,
    rotate: bool,
    xy: (u32, u32),
    size: Option<(u32, u32)>,
    orig: Option<(u32, u32)>,
    offset: (i32, i32),
    index: i32,
}

impl PendingRegion {
    fn new(name: &str, line: usize) -> Self {
        Self {
            line,
            name: name.to_string(),
            rotate: false,
            xy: (0, 0),
            size: None,
            orig: None,
            offset: (0, 0),
            index: -1,
        }
    }

    fn finish(self, path: &AssetPath) -> AssetResult<AtlasRegion> {
        let (width, height) = self.size.ok_or_else(|| {
            AssetError::corrupt(
                path,
                format!("line {}: region '{}' has no size", self.line, self.name),
            )
        })?;

        Ok(AtlasRegion {
            name: self.name,
            rotate: self.rotate,
            x: self.xy.0,
            y: self.xy.1,
            width,
            height,
            orig: self.orig.unwrap_or((width, height)),
            offset: self.offset,
            index: self.index,
        })
    }
}

/// Loader for `.atlas` files
pub struct AtlasLoader;

impl AtlasLoader {
    pub const KIND: AssetKind = AssetKind::Atlas;

    /// Parse an atlas from its text form
    pub fn load(data: &[u8], path: &AssetPath) -> AssetResult<AtlasDocument> {
        let text = std::str::from_utf8(data)
            .map_err(|e| AssetError::corrupt(path, format!("invalid UTF-8: {}", e)))?;

        let mut pages: Vec<AtlasPage> = Vec::new();
        let mut page: Option<AtlasPage> = None;
        let mut region: Option<PendingRegion> = None;
        let mut line_count = 0;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            line_count = line_no;
            let line = raw.trim();

            if line.is_empty() {
                if let Some(done) = region.take() {
                    push_region(&mut page, done.finish(path)?);
                }
                if let Some(done) = page.take() {
                    pages.push(done);
                }
                continue;
            }

            let Some(current) = page.as_mut() else {
                page = Some(AtlasPage {
                    image: line.to_string(),
                    ..AtlasPage::default()
                });
                continue;
            };

            match line.split_once(':') {
                Some((key, value)) => {
                    let key = key.trim();
                    let value = value.trim();
                    let bad = |what: &str| {
                        AssetError::corrupt(path, format!("line {}: malformed {} '{}'", line_no, what, value))
                    };

                    match region.as_mut() {
                        Some(r) => match key {
                            "rotate" => {
                                r.rotate = match value {
                                    "true" => true,
                                    "false" => false,
                                    degrees => degrees.parse::<i32>().map_err(|_| bad("rotate"))? != 0,
                                }
                            }
                            "xy" => r.xy = parse_pair(value).ok_or_else(|| bad("xy"))?,
                            "size" => r.size = Some(parse_pair(value).ok_or_else(|| bad("size"))?),
                            "orig" => r.orig = Some(parse_pair(value).ok_or_else(|| bad("orig"))?),
                            "offset" => r.offset = parse_pair(value).ok_or_else(|| bad("offset"))?,
                            "index" => r.index = value.parse().map_err(|_| bad("index"))?,
                            other => log::debug!("Ignoring region property '{}' in '{}'", other, path),
                        },
                        None => match key {
                            "size" => current.size = Some(parse_pair(value).ok_or_else(|| bad("size"))?),
                            "format" => current.format = Some(value.to_string()),
                            "filter" => {
                                let (min, mag) = value.split_once(',').ok_or_else(|| bad("filter"))?;
                                current.filter = Some((min.trim().to_string(), mag.trim().to_string()));
                            }
                            "repeat" => current.repeat = Some(value.to_string()),
                            other => log::debug!("Ignoring page property '{}' in '{}'", other, path),
                        },
                    }
                }
                None => {
                    if let Some(done) = region.take() {
                        current.regions.push(done.finish(path)?);
                    }
                    region = Some(PendingRegion::new(line, line_no));
                }
            }
        }

        if let Some(done) = region.take() {
            push_region(&mut page, done.finish(path)?);
        }
        if let Some(done) = page.take() {
            pages.push(done);
        }

        if pages.is_empty() {
            return Err(AssetError::corrupt(
                path,
                format!("line {}: atlas has no pages", line_count.max(1)),
            ));
        }

        Ok(AtlasDocument { pages })
    }
}

fn push_region(page: &mut Option<AtlasPage>, region: AtlasRegion) {
    if let Some(page) = page.as_mut() {
        page.regions.push(region);
    }
}

fn parse_pair<T: std::str::FromStr>(value: &str) -> Option<(T, T)> {
    let (a, b) = value.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
