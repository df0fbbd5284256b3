//! Validation checks for a single card record.
//!
//! Each check takes the card and the shared assets and returns a
//! `ValidationResult`. Checks never write files.

use std::collections::BTreeSet;

use crate::assets::AssetLibrary;
use crate::card::{layout_config, CardLayoutConfig, KNOWN_FIELDS};
use crate::error::CardError;
use crate::text::{tokenize, Fragment};
use crate::types::CardMetadata;

use super::warning::{Diagnostic, ValidationResult};

/// Fields whose text may contain `{symbol}` placeholders.
const SYMBOL_FIELDS: [&str; 3] = ["rules_text", "mana_cost", "mana_cost_2"];

/// Check that the card's layout is one we can render.
pub fn check_layout(card: &CardMetadata) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Err(CardError::Asset { message, help }) = layout_config(card) {
        let mut diagnostic = Diagnostic::error("cardpress::validate::unknown-layout", message);
        if let Some(help) = help {
            diagnostic = diagnostic.with_help(help);
        }
        result.push(diagnostic);
    }

    result
}

/// Check for a missing or blank title.
pub fn check_title(card: &CardMetadata) -> ValidationResult {
    let mut result = ValidationResult::new();

    if card.text("title").is_none() {
        result.push(
            Diagnostic::warning("cardpress::validate::missing-title", "Card has no title")
                .with_help("Add a 'title' field; output files are named after it"),
        );
    }

    result
}

/// Check for field names the renderer ignores.
pub fn check_unknown_fields(card: &CardMetadata) -> ValidationResult {
    let mut result = ValidationResult::new();

    for key in card.keys() {
        if !KNOWN_FIELDS.contains(&key) {
            result.push(
                Diagnostic::warning(
                    "cardpress::validate::unknown-field",
                    format!("Unknown field '{}' is ignored", key),
                )
                .with_help(format!("Known fields: {}", KNOWN_FIELDS.join(", "))),
            );
        }
    }

    result
}

/// Check that every `{symbol}` placeholder resolves to a glyph.
///
/// Unresolved symbols still render, as red `[token]` placeholders.
pub fn check_symbols(card: &CardMetadata, assets: &AssetLibrary) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut missing = BTreeSet::new();

    for field in SYMBOL_FIELDS {
        let Some(text) = card.text(field) else {
            continue;
        };
        for fragment in tokenize(text, card.text("title")) {
            if let Fragment::Symbol { token, .. } = fragment {
                if !assets.symbols.contains(&token) {
                    missing.insert(token);
                }
            }
        }
    }

    for token in missing {
        result.push(
            Diagnostic::warning(
                "cardpress::validate::unknown-symbol",
                format!("Unknown symbol '{{{}}}' will render as '[{}]'", token, token),
            )
            .with_help("Add a PNG named after the token to the symbols directory"),
        );
    }

    result
}

/// Check that frames, overlays and the watermark exist in the library.
pub fn check_images(card: &CardMetadata, assets: &AssetLibrary) -> ValidationResult {
    let mut result = ValidationResult::new();

    let names = card
        .list("frames")
        .into_iter()
        .chain(card.list("overlays"))
        .chain(card.text("watermark").map(str::to_string));

    for name in names {
        if !assets.has_frame(&name) {
            result.push(
                Diagnostic::warning(
                    "cardpress::validate::missing-frame",
                    format!("Image '{}' not found; it will be skipped", name),
                )
                .with_help("Add a PNG with this name to the frames directory"),
            );
        }
    }

    result
}

/// Check for a back face on a layout that has none.
pub fn check_back_face(card: &CardMetadata, config: &CardLayoutConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !card.cards("back").is_empty() && !config.capabilities.back_face {
        result.push(
            Diagnostic::warning(
                "cardpress::validate::ignored-back",
                format!("Layout '{}' has no back face; 'back' is ignored", config.name),
            )
            .with_help("Use layout 'transform' for double-faced cards"),
        );
    }

    result
}

/// Check that every text region fits its box at some allowed size.
pub fn check_fit(card: &CardMetadata, config: &CardLayoutConfig, assets: &AssetLibrary) -> ValidationResult {
    let mut result = ValidationResult::new();

    match assets.dispatcher().layout(config, card) {
        Ok(_) => {}
        Err(CardError::ContentOverflow { region, source }) => {
            result.push(
                Diagnostic::error(
                    "cardpress::validate::overflow",
                    format!("Text in region '{}' does not fit: {}", region, source),
                )
                .with_help("Shorten the text or split it across more sections"),
            );
        }
        Err(e) => result.error("cardpress::validate::layout", e.to_string()),
    }

    result
}
