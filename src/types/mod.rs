//! Core value types shared across the pipeline:
//! - `Colour` - RGBA colour values with HSL shading
//! - `Rect` - card-space pixel rectangles
//! - `CardMetadata` - the per-card field mapping

mod colour;
mod geometry;
mod metadata;

pub use colour::Colour;
pub use geometry::Rect;
pub use metadata::{CardMetadata, FieldValue};
