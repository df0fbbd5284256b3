//! cardpress - Trading card image generator
//!
//! Renders card images from metadata records: frames and overlays are
//! stacked, and every text region is typeset with the largest font size
//! that fits its box, with inline mana symbols and flavor dividers.

pub mod assets;
pub mod card;
pub mod cli;
pub mod deck;
pub mod error;
pub mod output;
pub mod text;
pub mod types;
pub mod validation;

pub use assets::{AssetLibrary, Manifest};
pub use card::{render, Card, CardLayoutConfig, Dispatcher, Layer, LayerGroup, LayerStack};
pub use deck::{load_deck, parse_deck, slug, DeckFormat};
pub use error::{CardError, Result};
pub use text::{
    tokenize, Align, FitError, FitOptions, FontRange, FontSet, Fragment, Layout, SymbolRegistry,
    Typesetter,
};
pub use types::{CardMetadata, Colour, FieldValue, Rect};
pub use validation::{validate_deck, Diagnostic, Severity, ValidationResult};
