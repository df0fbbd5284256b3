//! Font faces used by the layout engine.
//!
//! Layout only needs three things from a face: per-character advance widths,
//! the ascent (to place the baseline) and coverage bitmaps for drawing.
//! `FontdueFace` provides them for real TrueType/OpenType files; `BlockFace`
//! is a deterministic stand-in that draws every glyph as a solid block.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CardError, Result};
use crate::types::Colour;

/// Coverage bitmap for one rasterized character.
#[derive(Debug, Clone, Default)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub xmin: i32,
    /// Offset from the baseline to the bitmap's bottom edge (positive is up).
    pub ymin: i32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// A font face at arbitrary pixel sizes.
pub trait Face: Send + Sync + fmt::Debug {
    /// Horizontal advance of `ch` at `size` pixels.
    fn advance(&self, ch: char, size: f32) -> f32;

    /// Distance from the top of the line box to the baseline.
    fn ascent(&self, size: f32) -> f32;

    /// Rasterize `ch` at `size` pixels.
    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap;

    /// Width of a run of text. No kerning is applied.
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, size)).sum()
    }
}

/// A face backed by a `fontdue` font.
pub struct FontdueFace {
    name: String,
    font: fontdue::Font,
}

impl FontdueFace {
    /// Parse a font from raw TTF/OTF bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| CardError::Font {
                message: format!("Failed to parse font '{}': {}", name, e),
            })?;
        Ok(Self { name, font })
    }

    /// Load a font file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| CardError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read font: {}", e),
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("font")
            .to_string();
        Self::from_bytes(name, &bytes)
    }
}

impl fmt::Debug for FontdueFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontdueFace").field("name", &self.name).finish()
    }
}

impl Face for FontdueFace {
    fn advance(&self, ch: char, size: f32) -> f32 {
        self.font.metrics(ch, size).advance_width
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size * 0.8)
    }

    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, size);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

/// A monospaced face that draws solid blocks.
///
/// Every character advances `advance_ratio * size` pixels. Used when no font
/// file is configured, and wherever exact metrics are needed.
#[derive(Debug, Clone, Copy)]
pub struct BlockFace {
    pub advance_ratio: f32,
}

impl Default for BlockFace {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl Face for BlockFace {
    fn advance(&self, ch: char, size: f32) -> f32 {
        if ch.is_control() {
            0.0
        } else {
            size * self.advance_ratio
        }
    }

    fn ascent(&self, size: f32) -> f32 {
        size * 0.8
    }

    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap {
        if ch.is_whitespace() || ch.is_control() {
            return GlyphBitmap::default();
        }
        let advance = self.advance(ch, size);
        let width = (advance * 0.8).round().max(1.0) as usize;
        let height = (size * 0.7).round().max(1.0) as usize;
        GlyphBitmap {
            width,
            height,
            xmin: (advance * 0.1).round() as i32,
            ymin: 0,
            coverage: vec![255; width * height],
        }
    }
}

/// Style of a run of rules text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Italic,
}

impl FontStyle {
    pub fn toggled(self) -> Self {
        match self {
            FontStyle::Regular => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Regular,
        }
    }
}

/// The faces and colours used to draw one card.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Arc<dyn Face>,
    pub italic: Arc<dyn Face>,
    /// Title, type line, power/toughness.
    pub title: Arc<dyn Face>,
    /// Collector footer.
    pub info: Arc<dyn Face>,
    pub colour: Colour,
    /// Colour of unresolved `[token]` placeholders.
    pub fallback_colour: Colour,
}

impl FontSet {
    /// Block faces everywhere, black text, red fallback.
    pub fn blocks() -> Self {
        let face: Arc<dyn Face> = Arc::new(BlockFace::default());
        Self {
            regular: face.clone(),
            italic: face.clone(),
            title: face.clone(),
            info: face,
            colour: Colour::BLACK,
            fallback_colour: Colour::ERROR,
        }
    }

    /// The rules-text face for a style.
    pub fn face(&self, style: FontStyle) -> &dyn Face {
        match style {
            FontStyle::Regular => self.regular.as_ref(),
            FontStyle::Italic => self.italic.as_ref(),
        }
    }
}
