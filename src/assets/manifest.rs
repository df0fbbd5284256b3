//! Project manifest (cardpress.yaml) parsing.
//!
//! The manifest says where fonts, symbol glyphs and frame images live and
//! holds the few layout tunables that are not per-layout geometry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::card::DEFAULT_DISTRIBUTE_ALPHA;
use crate::error::{CardError, Result};
use crate::text::fit::DEFAULT_GAP_RATIO;
use crate::types::Colour;

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "cardpress.yaml";

/// Font files for each text role. Unset roles fall back to `rules`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontPaths {
    pub rules: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub title: Option<PathBuf>,
    pub info: Option<PathBuf>,
}

/// Project manifest loaded from cardpress.yaml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Output directory for rendered cards.
    pub output: PathBuf,

    pub fonts: FontPaths,

    /// Directory of symbol PNGs, overriding the builtin glyphs.
    pub symbols: Option<PathBuf>,

    /// Directory of frame and overlay PNGs, named by file stem.
    pub frames: Option<PathBuf>,

    /// Blank lines are this many times shorter than text lines.
    pub gap_ratio: f32,

    /// Weight of measured need when sharing height between stacked regions.
    pub distribute_alpha: f32,

    /// Per-token symbol size ratios.
    pub symbol_ratios: HashMap<String, f32>,

    pub text_colour: Option<Colour>,

    /// Colour of unresolved `[token]` placeholders.
    pub fallback_colour: Option<Colour>,
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            output: default_output(),
            fonts: FontPaths::default(),
            symbols: None,
            frames: None,
            gap_ratio: DEFAULT_GAP_RATIO,
            distribute_alpha: DEFAULT_DISTRIBUTE_ALPHA,
            symbol_ratios: HashMap::new(),
            text_colour: None,
            fallback_colour: None,
        }
    }
}

impl Manifest {
    /// Load manifest from a cardpress.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CardError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let manifest: Self = serde_yaml::from_str(content).map_err(|e| CardError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILENAME)),
        })?;

        if manifest.gap_ratio < 1.0 {
            return Err(CardError::Parse {
                message: format!("gap_ratio must be at least 1, got {}", manifest.gap_ratio),
                help: Some("Blank lines cannot be taller than text lines".to_string()),
            });
        }
        if !(0.0..=1.0).contains(&manifest.distribute_alpha) {
            return Err(CardError::Parse {
                message: format!(
                    "distribute_alpha must be between 0 and 1, got {}",
                    manifest.distribute_alpha
                ),
                help: None,
            });
        }
        Ok(manifest)
    }

    /// Load `cardpress.yaml` from `dir` if present, else the defaults.
    /// Returns the manifest and whether a file was found.
    pub fn find(dir: &Path) -> Result<(Self, bool)> {
        let path = dir.join(MANIFEST_FILENAME);
        if path.is_file() {
            Ok((Self::load(&path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }
}

/// Resolve a manifest path relative to the manifest's directory.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
