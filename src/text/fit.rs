//! Box-fit solver.
//!
//! Picks the largest font size at which a set of blocks fits a rectangle.
//! Wrapping depends on the font size, so every candidate size re-wraps the
//! text from scratch rather than rescaling a previous result.

use thiserror::Error;

use crate::types::Rect;

use super::font::{Face, FontSet};
use super::symbols::{SymbolRegistry, DIVIDER_RATIO, DIVIDER_TOKEN};
use super::tokenizer::{BlockKind, RawBlock};
use super::wrap::{wrap, Line, LineKind, TextMetrics};

/// Blank lines are this many times shorter than a text line.
pub const DEFAULT_GAP_RATIO: f32 = 4.0;

/// Inner margin as a fraction of the font size.
pub const MARGIN_RATIO: f32 = 0.25;

/// Inclusive range of candidate font sizes, tried from `max` down to `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontRange {
    pub max: u32,
    pub min: u32,
}

impl FontRange {
    pub const fn new(max: u32, min: u32) -> Self {
        Self { max, min }
    }

    /// A range holding a single size.
    pub const fn fixed(size: u32) -> Self {
        Self {
            max: size,
            min: size,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min > 0 && self.max >= self.min
    }

    /// Candidate sizes, largest first.
    pub fn sizes(&self) -> impl Iterator<Item = u32> {
        (self.min..=self.max).rev()
    }
}

/// Horizontal alignment of lines inside the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Per-call options for [`Typesetter::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitOptions {
    pub align: Align,
    /// A fixed element the last line must not run into, in card coordinates.
    pub neighbour: Option<Rect>,
}

/// Why no size in the range worked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error(
        "content needs {content_height}px but only {usable_height}px are usable at the minimum font size {min_font_size}"
    )]
    Overflow {
        min_font_size: u32,
        content_height: u32,
        usable_height: u32,
    },

    #[error("the last line runs into a neighbouring element even at the minimum font size {min_font_size}")]
    Collision { min_font_size: u32 },

    #[error(
        "a line is {line_width}px wide but only {max_line_width}px fit at the minimum font size {min_font_size}"
    )]
    TooWide {
        min_font_size: u32,
        line_width: u32,
        max_line_width: u32,
    },

    #[error("invalid font size range {max}..{min}")]
    EmptyRange { max: u32, min: u32 },
}

/// Wrapped lines of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<Line>,
    pub kind: BlockKind,
    pub divider_before: bool,
}

/// A fitted text box, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub blocks: Vec<Block>,
    pub font_size: u32,
    pub margin: u32,
    pub content_height: u32,
    pub usable_height: u32,
    pub width: u32,
    pub height: u32,
    pub divider_height: u32,
    pub align: Align,
}

impl Layout {
    pub fn max_line_width(&self) -> f32 {
        self.width.saturating_sub(2 * self.margin) as f32
    }

    /// Top of the first line; the whole stack is centred once.
    pub fn start_y(&self) -> f32 {
        self.margin as f32 + (self.usable_height as f32 - self.content_height as f32) / 2.0
    }

    /// Left edge of a line of the given width.
    pub fn line_x(&self, line_width: f32) -> f32 {
        match self.align {
            Align::Left => self.margin as f32,
            Align::Center => self.margin as f32 + (self.max_line_width() - line_width) / 2.0,
        }
    }

    pub fn fits(&self) -> bool {
        self.content_height <= self.usable_height
    }

    /// Width of the widest line. Only exceeds `max_line_width` when an
    /// atom, or the first character of a split word, is wider than a line.
    pub fn widest_line(&self) -> f32 {
        self.blocks
            .iter()
            .flat_map(|b| &b.lines)
            .map(|l| l.width)
            .fold(0.0, f32::max)
    }

    /// The last line carrying text, if any.
    pub fn last_line(&self) -> Option<&Line> {
        self.blocks
            .iter()
            .rev()
            .flat_map(|b| b.lines.iter().rev())
            .find(|l| l.kind == LineKind::Normal)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.lines.is_empty())
    }
}

/// Result of fitting a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub font_size: u32,
    /// Width of the text at `font_size`; may exceed the limit when even the
    /// minimum size is too wide.
    pub width: f32,
}

/// Lays out and renders rules text with shared fonts and symbols.
#[derive(Debug, Clone, Copy)]
pub struct Typesetter<'a> {
    pub fonts: &'a FontSet,
    pub symbols: &'a SymbolRegistry,
    pub gap_ratio: f32,
}

impl<'a> Typesetter<'a> {
    pub fn new(fonts: &'a FontSet, symbols: &'a SymbolRegistry) -> Self {
        Self {
            fonts,
            symbols,
            gap_ratio: DEFAULT_GAP_RATIO,
        }
    }

    pub fn with_gap_ratio(mut self, gap_ratio: f32) -> Self {
        self.gap_ratio = gap_ratio.max(1.0);
        self
    }

    pub fn metrics(&self, font_size: u32) -> TextMetrics<'a> {
        TextMetrics::new(self.fonts, self.symbols, font_size as f32)
    }

    /// Height of the divider glyph at a font size.
    pub fn divider_height(&self, font_size: u32) -> u32 {
        let ratio = self
            .symbols
            .lookup(DIVIDER_TOKEN)
            .map_or(DIVIDER_RATIO, |s| s.size_ratio);
        (ratio * font_size as f32).round().max(1.0) as u32
    }

    /// Wrap and measure at one font size without checking the height.
    pub fn layout_at(
        &self,
        blocks: &[RawBlock],
        width: u32,
        height: u32,
        font_size: u32,
        align: Align,
    ) -> Layout {
        let margin = (MARGIN_RATIO * font_size as f32).round() as u32;
        let max_line_width = width.saturating_sub(2 * margin) as f32;
        let metrics = self.metrics(font_size);
        let line_height = font_size as f32;
        let divider_height = self.divider_height(font_size);

        let mut content = 0.0;
        let wrapped: Vec<Block> = blocks
            .iter()
            .map(|raw| {
                let lines = wrap(&raw.fragments, max_line_width, metrics, raw.kind.base_style());
                if raw.divider_before {
                    content += divider_height as f32 + line_height;
                }
                for line in &lines {
                    content += match line.kind {
                        LineKind::Normal => line_height,
                        LineKind::Blank => line_height / self.gap_ratio,
                    };
                }
                Block {
                    lines,
                    kind: raw.kind,
                    divider_before: raw.divider_before,
                }
            })
            .collect();

        Layout {
            blocks: wrapped,
            font_size,
            margin,
            content_height: content.ceil() as u32,
            usable_height: height.saturating_sub(2 * margin),
            width,
            height,
            divider_height,
            align,
        }
    }

    /// Box height the blocks need at `font_size` with no height limit,
    /// margins included.
    pub fn measure(&self, blocks: &[RawBlock], width: u32, font_size: u32) -> u32 {
        let layout = self.layout_at(blocks, width, u32::MAX, font_size, Align::Left);
        layout.content_height + 2 * layout.margin
    }

    /// Largest font size in `range` whose layout fits `region`.
    pub fn fit(
        &self,
        blocks: &[RawBlock],
        region: Rect,
        range: FontRange,
        options: FitOptions,
    ) -> Result<Layout, FitError> {
        if !range.is_valid() {
            return Err(FitError::EmptyRange {
                max: range.max,
                min: range.min,
            });
        }

        let mut last_failure = None;
        for size in range.sizes() {
            let layout = self.layout_at(blocks, region.width, region.height, size, options.align);

            if !layout.fits() {
                tracing::trace!(
                    font_size = size,
                    content_height = layout.content_height,
                    usable_height = layout.usable_height,
                    "text too tall"
                );
                last_failure = Some(FitError::Overflow {
                    min_font_size: size,
                    content_height: layout.content_height,
                    usable_height: layout.usable_height,
                });
                continue;
            }

            let widest = layout.widest_line();
            if widest > layout.max_line_width() {
                tracing::trace!(font_size = size, widest, "line wider than the box");
                last_failure = Some(FitError::TooWide {
                    min_font_size: size,
                    line_width: widest.ceil() as u32,
                    max_line_width: layout.max_line_width() as u32,
                });
                continue;
            }

            if let Some(neighbour) = options.neighbour {
                if collides(&layout, region, neighbour) {
                    tracing::trace!(font_size = size, "last line collides with neighbour");
                    last_failure = Some(FitError::Collision { min_font_size: size });
                    continue;
                }
            }

            tracing::debug!(
                font_size = size,
                content_height = layout.content_height,
                usable_height = layout.usable_height,
                "text fitted"
            );
            return Ok(layout);
        }

        Err(last_failure.unwrap_or(FitError::EmptyRange {
            max: range.max,
            min: range.min,
        }))
    }

    /// Largest size in `range` at which `text` fits on one line of
    /// `max_width` pixels, or the minimum when nothing fits.
    pub fn fit_line(&self, text: &str, face: &dyn Face, max_width: f32, range: FontRange) -> LineFit {
        for size in range.sizes() {
            let width = face.text_width(text, size as f32);
            if width <= max_width {
                return LineFit {
                    font_size: size,
                    width,
                };
            }
        }
        let font_size = range.min.max(1);
        LineFit {
            font_size,
            width: face.text_width(text, font_size as f32),
        }
    }
}

/// Whether the layout's last line runs into `neighbour`.
///
/// Only applies when the region reaches down to the neighbour's top edge and
/// the two overlap horizontally.
fn collides(layout: &Layout, region: Rect, neighbour: Rect) -> bool {
    if !region.overlaps_horizontally(&neighbour) || region.bottom() < neighbour.y {
        return false;
    }
    let Some(last) = layout.last_line() else {
        return false;
    };

    let content_bottom = region.y as f32 + layout.start_y() + layout.content_height as f32;
    if content_bottom <= neighbour.y as f32 {
        return false;
    }

    let left = region.x as f32 + layout.line_x(last.width);
    let right = left + last.width;
    right > neighbour.x as f32 && left < neighbour.right() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font::BlockFace;
    use crate::text::tokenizer::parse_blocks;

    fn fit_text(
        text: &str,
        region: Rect,
        range: FontRange,
        options: FitOptions,
    ) -> Result<Layout, FitError> {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        Typesetter::new(&fonts, &symbols).fit(&parse_blocks(text, None), region, range, options)
    }

    #[test]
    fn test_fits_at_max_when_room() {
        let layout = fit_text("Flying", Rect::new(0, 0, 400, 200), FontRange::new(40, 10), FitOptions::default())
            .unwrap();
        assert_eq!(layout.font_size, 40);
        assert_eq!(layout.margin, 10);
        assert_eq!(layout.content_height, 40);
        assert_eq!(layout.usable_height, 180);
        assert_eq!(layout.start_y(), 80.0);
    }

    #[test]
    fn test_shrinks_to_largest_fitting_size() {
        // At 25+ the text needs two lines that do not fit; 24 fits two lines
        // exactly (2 * 24 = 60 - 2 * 6).
        let layout = fit_text(
            "aaaa bbbb cccc dddd",
            Rect::new(0, 0, 220, 60),
            FontRange::new(40, 10),
            FitOptions::default(),
        )
        .unwrap();
        assert_eq!(layout.font_size, 24);
        assert_eq!(layout.content_height, 48);
        assert_eq!(layout.usable_height, 48);
        assert_eq!(layout.blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_never_returns_overflowing_layout() {
        let text = "Whenever a creature you control dies, put a +1/+1 counter on each \
                    creature you control.{flavor}Nothing is wasted.";
        for height in [80, 120, 160, 240, 400] {
            match fit_text(text, Rect::new(0, 0, 300, height), FontRange::new(48, 8), FitOptions::default()) {
                Ok(layout) => assert!(layout.content_height <= layout.usable_height),
                Err(e) => assert!(matches!(e, FitError::Overflow { .. }), "{e}"),
            }
        }
    }

    #[test]
    fn test_overflow_at_minimum_size() {
        let result = fit_text(
            "This text is far too long to fit into such a tiny box at any size.",
            Rect::new(0, 0, 100, 40),
            FontRange::new(40, 30),
            FitOptions::default(),
        );
        match result {
            Err(FitError::Overflow { min_font_size, content_height, usable_height }) => {
                assert_eq!(min_font_size, 30);
                assert!(content_height > usable_height);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_wide_symbol_shrinks_until_it_fits() {
        // A hybrid symbol is 1.2 * size across. At 30 it is 36px against
        // 50 - 2 * 8 = 34px; at 29 it is 35px against 36px.
        let layout = fit_text("{w/u}", Rect::new(0, 0, 50, 200), FontRange::new(40, 10), FitOptions::default())
            .unwrap();
        assert_eq!(layout.font_size, 29);
        assert!(layout.widest_line() <= layout.max_line_width());
    }

    #[test]
    fn test_wide_placeholder_at_minimum_is_an_error() {
        // "[xyzzy]" is 7 * 5 = 35px at size 10, the box leaves 30 - 2 * 3 = 24px
        let result = fit_text("{xyzzy}", Rect::new(0, 0, 30, 200), FontRange::new(12, 10), FitOptions::default());
        assert_eq!(
            result,
            Err(FitError::TooWide {
                min_font_size: 10,
                line_width: 35,
                max_line_width: 24,
            })
        );
    }

    #[test]
    fn test_fitted_lines_never_exceed_box_width() {
        let text = "{bullet}Antidisestablishmentarianism {2/w}{w/u}{lns}{xyz} Draw a card.";
        for width in [40, 60, 90, 150, 300] {
            if let Ok(layout) = fit_text(text, Rect::new(0, 0, width, 2000), FontRange::new(60, 4), FitOptions::default()) {
                assert!(
                    layout.widest_line() <= layout.max_line_width(),
                    "{} > {} at size {}",
                    layout.widest_line(),
                    layout.max_line_width(),
                    layout.font_size
                );
            }
        }
    }

    #[test]
    fn test_invalid_range() {
        let result = fit_text("a", Rect::new(0, 0, 100, 100), FontRange::new(10, 20), FitOptions::default());
        assert_eq!(result, Err(FitError::EmptyRange { max: 10, min: 20 }));
        assert!(!FontRange::new(10, 0).is_valid());
    }

    #[test]
    fn test_flavor_block_height_includes_divider() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let typesetter = Typesetter::new(&fonts, &symbols);
        let layout = typesetter.layout_at(
            &parse_blocks("{flavor}Flavor text here", None),
            800,
            400,
            40,
            Align::Left,
        );

        assert_eq!(layout.blocks.len(), 2);
        assert!(layout.blocks[0].lines.is_empty());
        assert_eq!(layout.blocks[1].kind, BlockKind::Flavor);
        assert!(layout.blocks[1].divider_before);
        // divider 0.12 * 40 = 5 (rounded), plus one line height, plus one line
        assert_eq!(layout.divider_height, 5);
        assert_eq!(layout.content_height, 5 + 40 + 40);
    }

    #[test]
    fn test_blank_lines_use_gap_ratio() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let blocks = parse_blocks("a{lns}{lns}b", None);

        let layout = Typesetter::new(&fonts, &symbols).layout_at(&blocks, 400, 400, 40, Align::Left);
        assert_eq!(layout.content_height, 40 + 10 + 40);

        let layout = Typesetter::new(&fonts, &symbols)
            .with_gap_ratio(2.0)
            .layout_at(&blocks, 400, 400, 40, Align::Left);
        assert_eq!(layout.content_height, 40 + 20 + 40);
    }

    #[test]
    fn test_collision_with_neighbour_shrinks_text() {
        let region = Rect::new(0, 0, 220, 40);
        let text = "aaaaaaaaaaaaaaaa";

        let free = fit_text(text, region, FontRange::new(20, 10), FitOptions::default()).unwrap();
        assert_eq!(free.font_size, 20);

        let options = FitOptions {
            align: Align::Left,
            neighbour: Some(Rect::new(150, 25, 100, 60)),
        };
        let avoided = fit_text(text, region, FontRange::new(20, 10), options).unwrap();
        // 16 chars * 9px + 5px margin = 149 stays left of x = 150
        assert_eq!(avoided.font_size, 18);
    }

    #[test]
    fn test_neighbour_below_region_is_ignored() {
        let options = FitOptions {
            align: Align::Left,
            neighbour: Some(Rect::new(150, 500, 100, 60)),
        };
        let layout = fit_text("aaaaaaaaaaaaaaaa", Rect::new(0, 0, 220, 40), FontRange::new(20, 10), options)
            .unwrap();
        assert_eq!(layout.font_size, 20);
    }

    #[test]
    fn test_collision_at_minimum_is_an_error() {
        let options = FitOptions {
            align: Align::Left,
            neighbour: Some(Rect::new(50, 0, 100, 60)),
        };
        let result = fit_text("aaaaaaaaaaaaaaaa", Rect::new(0, 0, 220, 40), FontRange::new(20, 18), options);
        assert_eq!(result, Err(FitError::Collision { min_font_size: 18 }));
    }

    #[test]
    fn test_measure_includes_margins() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let blocks = parse_blocks("a{lns}b{lns}c", None);
        let height = Typesetter::new(&fonts, &symbols).measure(&blocks, 400, 40);
        assert_eq!(height, 3 * 40 + 2 * 10);
    }

    #[test]
    fn test_fit_line() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let typesetter = Typesetter::new(&fonts, &symbols);
        let face = BlockFace::default();

        let fit = typesetter.fit_line("Lightning Bolt", &face, 280.0, FontRange::new(60, 20));
        assert_eq!(fit.font_size, 40);
        assert_eq!(fit.width, 280.0);

        let squeezed = typesetter.fit_line("Lightning Bolt", &face, 100.0, FontRange::new(60, 20));
        assert_eq!(squeezed.font_size, 20);
        assert!(squeezed.width > 100.0);
    }
}
