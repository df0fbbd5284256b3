//! Symbol registry: placeholder tokens to glyph images.
//!
//! Tokens are the lowercase contents of a `{...}` placeholder (`w`, `2`,
//! `w/u`, `flavor`). Each symbol carries a size ratio relative to the font
//! size it is drawn next to; hybrid symbols render larger than plain ones.
//!
//! The registry is built once and shared read-only between card renders.

use std::collections::HashMap;
use std::path::Path;

use image::{Rgba, RgbaImage};
use walkdir::WalkDir;

use crate::error::{CardError, Result};
use crate::types::Colour;

/// Token of the glyph drawn between rules text and flavor text.
pub const DIVIDER_TOKEN: &str = "flavor";

/// Size ratio for hybrid (`x/y`) symbols.
pub const HYBRID_RATIO: f32 = 1.2;

/// Height of the divider bar as a fraction of the font size.
pub const DIVIDER_RATIO: f32 = 0.12;

const MANA_COLOURS: [(&str, Colour); 5] = [
    ("w", Colour::rgb(0xFF, 0xFB, 0xD5)),
    ("u", Colour::rgb(0xAA, 0xE0, 0xFA)),
    ("b", Colour::rgb(0xCB, 0xC2, 0xBF)),
    ("r", Colour::rgb(0xF9, 0xAA, 0x8F)),
    ("g", Colour::rgb(0x9B, 0xD3, 0xAE)),
];

const GENERIC_COLOUR: Colour = Colour::rgb(0xCA, 0xC5, 0xC0);

const GENERIC_TOKENS: [&str; 9] = ["c", "s", "x", "y", "z", "t", "q", "e", "p"];

const HYBRID_PAIRS: [(&str, &str); 10] = [
    ("w", "u"),
    ("u", "b"),
    ("b", "r"),
    ("r", "g"),
    ("g", "w"),
    ("w", "b"),
    ("u", "r"),
    ("b", "g"),
    ("r", "w"),
    ("g", "u"),
];

/// Resolution of the procedurally drawn builtin glyphs.
const BUILTIN_SIZE: u32 = 128;

/// A glyph image plus its size relative to the surrounding text.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub glyph: RgbaImage,
    pub size_ratio: f32,
}

impl Symbol {
    pub fn new(glyph: RgbaImage, size_ratio: f32) -> Self {
        Self { glyph, size_ratio }
    }

    /// Pixel size of this symbol next to text of `font_size` pixels.
    ///
    /// Height is `size_ratio * font_size`; width keeps the glyph's aspect.
    pub fn extent(&self, font_size: f32) -> (u32, u32) {
        let height = (self.size_ratio * font_size).round().max(1.0);
        let aspect = if self.glyph.height() == 0 {
            1.0
        } else {
            self.glyph.width() as f32 / self.glyph.height() as f32
        };
        let width = (height * aspect).round().max(1.0);
        (width as u32, height as u32)
    }
}

/// Lookup table from token to symbol.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: HashMap<String, Symbol>,
}

impl SymbolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SymbolRegistryBuilder {
        SymbolRegistryBuilder::default()
    }

    /// Registry with placeholder glyphs for the standard mana symbols, hybrid
    /// pairs, generic costs `0`-`20` and the flavor divider.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        for (token, colour) in MANA_COLOURS {
            registry.insert(token, Symbol::new(disc(colour, colour), 1.0));
        }
        for token in GENERIC_TOKENS {
            registry.insert(token, Symbol::new(disc(GENERIC_COLOUR, GENERIC_COLOUR), 1.0));
        }
        for n in 0..=20 {
            registry.insert(
                &n.to_string(),
                Symbol::new(disc(GENERIC_COLOUR, GENERIC_COLOUR), 1.0),
            );
        }
        for (a, b) in HYBRID_PAIRS {
            registry.insert(
                &format!("{}/{}", a, b),
                Symbol::new(disc(mana_colour(a), mana_colour(b)), HYBRID_RATIO),
            );
        }
        for (token, colour) in MANA_COLOURS {
            registry.insert(
                &format!("2/{}", token),
                Symbol::new(disc(GENERIC_COLOUR, colour), HYBRID_RATIO),
            );
            registry.insert(
                &format!("{}/p", token),
                Symbol::new(disc(colour, GENERIC_COLOUR), HYBRID_RATIO),
            );
        }
        registry.insert(DIVIDER_TOKEN, Symbol::new(divider_bar(), DIVIDER_RATIO));

        registry
    }

    /// Add or replace a symbol. The token is stored lowercase.
    pub fn insert(&mut self, token: &str, symbol: Symbol) {
        self.symbols.insert(token.to_lowercase(), symbol);
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, token: &str) -> Option<&Symbol> {
        if let Some(symbol) = self.symbols.get(token) {
            return Some(symbol);
        }
        self.symbols.get(&token.to_lowercase())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Default size ratio for a token when none is configured.
    pub fn default_ratio(token: &str) -> f32 {
        if token == DIVIDER_TOKEN {
            DIVIDER_RATIO
        } else if token.contains('/') {
            HYBRID_RATIO
        } else {
            1.0
        }
    }

    /// Load every PNG under `dir`, overriding existing entries.
    ///
    /// The token is the lowercase file stem with `-` standing in for `/`
    /// (`w-u.png` is `{w/u}`). Ratios come from `ratios`, falling back to
    /// [`SymbolRegistry::default_ratio`]. Returns the number of glyphs loaded.
    pub fn load_dir(&mut self, dir: &Path, ratios: &HashMap<String, f32>) -> Result<usize> {
        if !dir.is_dir() {
            return Err(CardError::Asset {
                message: format!("Symbol directory not found: {}", dir.display()),
                help: Some("Set 'symbols' in cardpress.yaml to a directory of PNG glyphs".to_string()),
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
            let token = stem.to_lowercase().replace('-', "/");
            let glyph = image::open(path)
                .map_err(|e| CardError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to read symbol: {}", e),
                })?
                .to_rgba8();
            let ratio = ratios
                .get(&token)
                .copied()
                .unwrap_or_else(|| Self::default_ratio(&token));
            tracing::debug!(token = %token, ratio, "loaded symbol");
            self.insert(&token, Symbol::new(glyph, ratio));
            loaded += 1;
        }

        Ok(loaded)
    }
}

pub(crate) fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn mana_colour(token: &str) -> Colour {
    MANA_COLOURS
        .iter()
        .find(|(t, _)| *t == token)
        .map_or(GENERIC_COLOUR, |(_, c)| *c)
}

/// An anti-aliased disc with a darker rim. The upper-left half uses `first`,
/// the lower-right half `second`.
fn disc(first: Colour, second: Colour) -> RgbaImage {
    let size = BUILTIN_SIZE as f32;
    let radius = size / 2.0;
    let rim = radius * 0.1;

    RgbaImage::from_fn(BUILTIN_SIZE, BUILTIN_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let dist = (dx * dx + dy * dy).sqrt();
        let coverage = (radius - dist).clamp(0.0, 1.0);
        if coverage <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let fill = if x + y < BUILTIN_SIZE { first } else { second };
        let colour = if dist > radius - rim {
            fill.darken(45.0)
        } else {
            fill
        };
        Rgba([colour.r, colour.g, colour.b, (coverage * 255.0).round() as u8])
    })
}

/// A horizontal bar that fades out towards both ends.
fn divider_bar() -> RgbaImage {
    let width = BUILTIN_SIZE * 8;
    let height = 16;
    RgbaImage::from_fn(width, height, |x, _| {
        let t = x as f32 / (width - 1) as f32;
        let fade = (1.0 - (2.0 * t - 1.0).abs()).min(0.25) * 4.0;
        Rgba([0, 0, 0, (fade * 255.0).round() as u8])
    })
}

/// Builder for a registry assembled symbol by symbol.
#[derive(Debug, Default)]
pub struct SymbolRegistryBuilder {
    registry: SymbolRegistry,
}

impl SymbolRegistryBuilder {
    /// Start from the builtin glyphs instead of an empty registry.
    pub fn with_builtins(mut self) -> Self {
        let custom = std::mem::take(&mut self.registry.symbols);
        self.registry = SymbolRegistry::builtin();
        self.registry.symbols.extend(custom);
        self
    }

    pub fn symbol(mut self, token: &str, symbol: Symbol) -> Self {
        self.registry.insert(token, symbol);
        self
    }

    pub fn build(self) -> SymbolRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_covers_standard_tokens() {
        let registry = SymbolRegistry::builtin();
        for token in ["w", "u", "b", "r", "g", "c", "x", "t", "0", "20", "w/u", "2/g", "r/p"] {
            assert!(registry.contains(token), "missing {}", token);
        }
        assert!(registry.contains(DIVIDER_TOKEN));
        assert!(!registry.contains("xyz"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = SymbolRegistry::builtin();
        assert!(registry.lookup("W").is_some());
        assert!(registry.lookup("W/U").is_some());
    }

    #[test]
    fn test_hybrid_ratio() {
        let registry = SymbolRegistry::builtin();
        assert_eq!(registry.lookup("w/u").unwrap().size_ratio, HYBRID_RATIO);
        assert_eq!(registry.lookup("w").unwrap().size_ratio, 1.0);
        assert_eq!(SymbolRegistry::default_ratio("b/g"), HYBRID_RATIO);
    }

    #[test]
    fn test_extent_keeps_aspect() {
        let symbol = Symbol::new(RgbaImage::new(200, 100), 1.0);
        assert_eq!(symbol.extent(40.0), (80, 40));

        let registry = SymbolRegistry::builtin();
        assert_eq!(registry.lookup("r").unwrap().extent(40.0), (40, 40));
        assert_eq!(registry.lookup("w/u").unwrap().extent(40.0), (48, 48));
    }

    #[test]
    fn test_builtin_disc_is_transparent_outside() {
        let registry = SymbolRegistry::builtin();
        let glyph = &registry.lookup("g").unwrap().glyph;
        assert_eq!(glyph.get_pixel(0, 0).0[3], 0);
        assert_eq!(glyph.get_pixel(64, 64).0[3], 255);
    }

    #[test]
    fn test_load_dir_maps_dashes_and_overrides() {
        let dir = tempdir().unwrap();
        RgbaImage::new(10, 20).save(dir.path().join("W-U.png")).unwrap();
        RgbaImage::new(30, 30).save(dir.path().join("tap.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut ratios = HashMap::new();
        ratios.insert("tap".to_string(), 0.9);

        let mut registry = SymbolRegistry::builtin();
        let loaded = registry.load_dir(dir.path(), &ratios).unwrap();
        assert_eq!(loaded, 2);

        let hybrid = registry.lookup("w/u").unwrap();
        assert_eq!(hybrid.glyph.width(), 10);
        assert_eq!(hybrid.size_ratio, HYBRID_RATIO);
        assert_eq!(registry.lookup("tap").unwrap().size_ratio, 0.9);
    }

    #[test]
    fn test_load_dir_missing() {
        let mut registry = SymbolRegistry::new();
        let result = registry.load_dir(Path::new("/nonexistent/symbols"), &HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let glyph = RgbaImage::new(10, 10);
        let registry = SymbolRegistry::builder()
            .symbol("Chaos", Symbol::new(glyph.clone(), 1.0))
            .build();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("chaos"));

        let registry = SymbolRegistry::builder()
            .symbol("w", Symbol::new(glyph, 0.5))
            .with_builtins()
            .build();
        assert!(registry.contains("u"));
        assert_eq!(registry.lookup("w").map(|s| s.size_ratio), Some(0.5));
    }
}
