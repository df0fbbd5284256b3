//! Shared read-only assets: fonts, symbols and frame images.
//!
//! An [`AssetLibrary`] is built once per run from the manifest and borrowed
//! by every card render, including renders on other threads.

mod manifest;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use walkdir::WalkDir;

use crate::card::{Dispatcher, DEFAULT_DISTRIBUTE_ALPHA};
use crate::error::{CardError, Result};
use crate::text::fit::DEFAULT_GAP_RATIO;
use crate::text::symbols::is_png;
use crate::text::{Face, FontSet, FontdueFace, SymbolRegistry, Typesetter};

pub use manifest::{resolve, FontPaths, Manifest, MANIFEST_FILENAME};

/// Fonts, symbols and frames for a deck.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    pub fonts: FontSet,
    pub symbols: SymbolRegistry,
    frames: HashMap<String, RgbaImage>,
    pub gap_ratio: f32,
    pub distribute_alpha: f32,
}

impl AssetLibrary {
    /// Block fonts, builtin symbols and no frames.
    pub fn builtin() -> Self {
        Self {
            fonts: FontSet::blocks(),
            symbols: SymbolRegistry::builtin(),
            frames: HashMap::new(),
            gap_ratio: DEFAULT_GAP_RATIO,
            distribute_alpha: DEFAULT_DISTRIBUTE_ALPHA,
        }
    }

    /// Load everything the manifest names. Relative paths resolve against
    /// `root`, the manifest's directory.
    pub fn load(manifest: &Manifest, root: &Path) -> Result<Self> {
        let mut library = Self::builtin();
        library.gap_ratio = manifest.gap_ratio;
        library.distribute_alpha = manifest.distribute_alpha;
        library.fonts = load_fonts(&manifest.fonts, root)?;
        if let Some(colour) = manifest.text_colour {
            library.fonts.colour = colour;
        }
        if let Some(colour) = manifest.fallback_colour {
            library.fonts.fallback_colour = colour;
        }

        if let Some(dir) = &manifest.symbols {
            let loaded = library
                .symbols
                .load_dir(&resolve(root, dir), &manifest.symbol_ratios)?;
            tracing::info!(count = loaded, "loaded symbols");
        }
        if let Some(dir) = &manifest.frames {
            let loaded = library.load_frames(&resolve(root, dir))?;
            tracing::info!(count = loaded, "loaded frames");
        }

        Ok(library)
    }

    /// Load every PNG under `dir` as a frame named by its lowercase stem.
    pub fn load_frames(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(CardError::Asset {
                message: format!("Frame directory not found: {}", dir.display()),
                help: Some("Set 'frames' in cardpress.yaml to a directory of PNG images".to_string()),
            });
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !is_png(path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let image = image::open(path)
                .map_err(|e| CardError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to read frame: {}", e),
                })?
                .to_rgba8();
            tracing::debug!(frame = %stem, width = image.width(), height = image.height(), "loaded frame");
            self.insert_frame(stem, image);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn insert_frame(&mut self, name: &str, image: RgbaImage) {
        self.frames.insert(name.to_lowercase(), image);
    }

    /// Case-insensitive frame lookup.
    pub fn frame(&self, name: &str) -> Option<&RgbaImage> {
        self.frames.get(&name.trim().to_lowercase())
    }

    pub fn has_frame(&self, name: &str) -> bool {
        self.frame(name).is_some()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn typesetter(&self) -> Typesetter<'_> {
        Typesetter::new(&self.fonts, &self.symbols).with_gap_ratio(self.gap_ratio)
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(self.typesetter()).with_alpha(self.distribute_alpha)
    }
}

fn load_fonts(paths: &FontPaths, root: &Path) -> Result<FontSet> {
    let mut fonts = FontSet::blocks();
    let load = |path: &Path| -> Result<Arc<dyn Face>> {
        let face = FontdueFace::load(&resolve(root, path))?;
        tracing::debug!(font = ?face, "loaded font");
        Ok(Arc::new(face))
    };

    if let Some(path) = &paths.rules {
        fonts.regular = load(path)?;
        fonts.italic = fonts.regular.clone();
        fonts.title = fonts.regular.clone();
        fonts.info = fonts.regular.clone();
    }
    if let Some(path) = &paths.italic {
        fonts.italic = load(path)?;
    }
    if let Some(path) = &paths.title {
        fonts.title = load(path)?;
    }
    if let Some(path) = &paths.info {
        fonts.info = load(path)?;
    }
    Ok(fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_library() {
        let library = AssetLibrary::builtin();
        assert!(library.symbols.contains("w"));
        assert_eq!(library.frame_count(), 0);
        assert_eq!(library.gap_ratio, DEFAULT_GAP_RATIO);
    }

    #[test]
    fn test_load_frames_by_stem() {
        let dir = tempdir().unwrap();
        RgbaImage::new(4, 4).save(dir.path().join("Red.png")).unwrap();
        std::fs::create_dir(dir.path().join("borders")).unwrap();
        RgbaImage::new(4, 4).save(dir.path().join("borders/black.png")).unwrap();

        let mut library = AssetLibrary::builtin();
        assert_eq!(library.load_frames(dir.path()).unwrap(), 2);
        assert!(library.has_frame("red"));
        assert!(library.has_frame("Black"));
        assert!(!library.has_frame("blue"));
    }

    #[test]
    fn test_load_from_manifest() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("frames")).unwrap();
        RgbaImage::new(4, 4).save(dir.path().join("frames/green.png")).unwrap();

        let manifest = Manifest::parse("frames: frames\ngap_ratio: 2\ntext_colour: '#ffffff'").unwrap();
        let library = AssetLibrary::load(&manifest, dir.path()).unwrap();
        assert!(library.has_frame("green"));
        assert_eq!(library.gap_ratio, 2.0);
        assert_eq!(library.fonts.colour, crate::types::Colour::WHITE);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::parse("fonts:\n  rules: missing.ttf").unwrap();
        let err = AssetLibrary::load(&manifest, dir.path()).unwrap_err();
        assert!(matches!(err, CardError::Io { .. }));
    }

    #[test]
    fn test_missing_frame_dir_is_an_error() {
        let mut library = AssetLibrary::builtin();
        assert!(library.load_frames(Path::new("/nonexistent/frames")).is_err());
    }
}
