//! Deck files: YAML or JSON lists of card records.
//!
//! A deck is either a bare list of cards or a mapping with a `cards` list.
//! Output file names are derived from card titles.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CardError, Result};
use crate::types::CardMetadata;

/// Deck syntax, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    Yaml,
    Json,
}

impl DeckFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(DeckFormat::Yaml),
            "json" => Some(DeckFormat::Json),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    List(Vec<CardMetadata>),
    Wrapped { cards: Vec<CardMetadata> },
}

/// Read and parse a deck file.
pub fn load_deck(path: &Path) -> Result<Vec<CardMetadata>> {
    let format = DeckFormat::from_path(path).ok_or_else(|| CardError::Parse {
        message: format!("Unsupported deck file: {}", path.display()),
        help: Some("Decks must be .yaml, .yml or .json files".to_string()),
    })?;
    let content = fs::read_to_string(path).map_err(|e| CardError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read deck: {}", e),
    })?;
    let cards = parse_deck(&content, format)?;
    tracing::info!(deck = %path.display(), cards = cards.len(), "loaded deck");
    Ok(cards)
}

/// Parse deck content.
pub fn parse_deck(content: &str, format: DeckFormat) -> Result<Vec<CardMetadata>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed = match format {
        DeckFormat::Yaml => serde_yaml::from_str::<DeckFile>(content).map_err(|e| e.to_string()),
        DeckFormat::Json => serde_json::from_str::<DeckFile>(content).map_err(|e| e.to_string()),
    };
    match parsed {
        Ok(DeckFile::List(cards)) | Ok(DeckFile::Wrapped { cards }) => Ok(cards),
        Err(message) => Err(CardError::Parse {
            message: format!("Invalid deck: {}", message),
            help: Some("A deck is a list of card records, each a mapping of field names to values".to_string()),
        }),
    }
}

/// File-name-safe form of a title: lowercase ASCII alphanumerics joined by
/// single dashes.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("card");
    }
    out
}

/// Unique output stems for a deck, in deck order. Repeated titles get a
/// numeric suffix: `opt`, `opt-2`, `opt-3`.
pub fn output_stems(cards: &[CardMetadata]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cards
        .iter()
        .map(|card| {
            let base = slug(card.title());
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}-{}", base, count)
            }
        })
        .collect()
}
