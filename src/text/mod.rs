//! Rules-text layout engine.
//!
//! The pipeline runs in order: [`tokenizer`] turns raw text with `{...}`
//! placeholders into fragments, [`wrap`] packs fragments into lines at a
//! given font size, [`fit`] searches for the largest size that fits a box,
//! and [`render`] draws the result. [`symbols`] and [`font`] supply the
//! glyphs and metrics all stages share.

pub mod fit;
pub mod font;
pub mod render;
pub mod symbols;
pub mod tokenizer;
pub mod wrap;

pub use fit::{Align, Block, FitError, FitOptions, FontRange, Layout, LineFit, Typesetter};
pub use font::{BlockFace, Face, FontSet, FontStyle, FontdueFace};
pub use render::{draw_squeezed, draw_text};
pub use symbols::{Symbol, SymbolRegistry, SymbolRegistryBuilder};
pub use tokenizer::{parse_blocks, tokenize, BlockKind, Fragment, RawBlock};
pub use wrap::{wrap, Line, LineKind, TextMetrics};
