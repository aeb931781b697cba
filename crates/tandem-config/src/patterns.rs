//! Asset classes and the configurable extension patterns that select them.
//!
//! Classification itself lives in `tandem-pipeline`; this module only owns
//! the data: which file extensions map to which class. Patterns are part of
//! the base template so they can be adjusted per project instead of being
//! hard-wired into the pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The transform-chain family an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    /// Compiled sources (`.js` / `.jsx`).
    Script,
    /// Extracted and class-rewritten stylesheets (`.css` / `.scss`).
    Stylesheet,
    /// Fonts, audio and video, passed through and renamed only.
    FontOrMedia,
    /// Bitmap images, recompressed in production builds.
    RasterImage,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Script => f.write_str("script"),
            AssetClass::Stylesheet => f.write_str("stylesheet"),
            AssetClass::FontOrMedia => f.write_str("font-or-media"),
            AssetClass::RasterImage => f.write_str("raster-image"),
        }
    }
}

/// Extension tables mapping file suffixes to asset classes.
///
/// The defaults mirror a conventional web application source tree: jsx
/// scripts, sass stylesheets, the usual font/media container formats and
/// the common bitmap formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassPatterns {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub fonts_and_media: Vec<String>,
    pub raster_images: Vec<String>,
}

impl Default for ClassPatterns {
    fn default() -> Self {
        let exts = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        ClassPatterns {
            scripts: exts(&["js", "jsx"]),
            stylesheets: exts(&["css", "scss"]),
            fonts_and_media: exts(&[
                "svg", "mp4", "webm", "woff", "woff2", "eot", "ttf", "otf", "wav",
            ]),
            raster_images: exts(&["png", "jpg", "jpeg", "gif"]),
        }
    }
}

impl ClassPatterns {
    /// Classify a path by its extension, case-insensitively.
    ///
    /// Returns `None` when no table matches; the caller decides whether
    /// that is a pass-through (outside the source root) or a hard error
    /// (inside it).
    pub fn class_of(&self, path: &Path) -> Option<AssetClass> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let matches = |table: &[String]| table.iter().any(|e| *e == ext);
        if matches(&self.scripts) {
            Some(AssetClass::Script)
        } else if matches(&self.stylesheets) {
            Some(AssetClass::Stylesheet)
        } else if matches(&self.fonts_and_media) {
            Some(AssetClass::FontOrMedia)
        } else if matches(&self.raster_images) {
            Some(AssetClass::RasterImage)
        } else {
            None
        }
    }
}
