//! Line renderer.
//!
//! Draws a fitted [`Layout`] into a transparent image the size of its box.
//! Text is alpha-blended glyph by glyph; symbols are resized to their ratio
//! of the font size and composited with a small downward nudge so they sit
//! on the text's optical centre.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::types::Colour;

use super::fit::{Layout, Typesetter};
use super::font::Face;
use super::symbols::DIVIDER_TOKEN;
use super::tokenizer::{Fragment, BULLET};
use super::wrap::{placeholder, Line, LineKind};

/// Downward shift applied to symbols, as a fraction of the font size.
pub const SYMBOL_NUDGE_RATIO: f32 = 0.05;

/// Height of a standalone line image relative to its font size.
pub const LINE_STRIP_RATIO: f32 = 1.3;

impl Typesetter<'_> {
    /// Render a layout into a new image of `layout.width` x `layout.height`.
    pub fn render(&self, layout: &Layout) -> RgbaImage {
        let mut canvas = RgbaImage::new(layout.width, layout.height);
        self.render_onto(&mut canvas, layout, 0, 0);
        canvas
    }

    /// Render a layout onto an existing image with its box at `(x, y)`.
    pub fn render_onto(&self, canvas: &mut RgbaImage, layout: &Layout, x: i64, y: i64) {
        let line_height = layout.font_size as f32;
        let mut pen_y = y as f32 + layout.start_y();

        for block in &layout.blocks {
            if block.divider_before {
                pen_y += line_height / 2.0;
                self.draw_divider(
                    canvas,
                    x as f32 + layout.margin as f32,
                    pen_y,
                    layout.max_line_width(),
                    layout.divider_height,
                );
                pen_y += layout.divider_height as f32 + line_height / 2.0;
            }

            for line in &block.lines {
                match line.kind {
                    LineKind::Blank => pen_y += line_height / self.gap_ratio,
                    LineKind::Normal => {
                        let pen_x = x as f32 + layout.line_x(line.width);
                        self.draw_line(canvas, line, pen_x, pen_y, layout.font_size as f32);
                        pen_y += line_height;
                    }
                }
            }
        }
    }

    /// Render one wrapped line into a tight image `LINE_STRIP_RATIO * size`
    /// pixels tall, leaving headroom for enlarged symbols.
    pub fn render_line(&self, line: &Line, font_size: u32) -> RgbaImage {
        let size = font_size as f32;
        let width = line.width.ceil().max(1.0) as u32 + 1;
        let height = (size * LINE_STRIP_RATIO).ceil() as u32;
        let mut canvas = RgbaImage::new(width, height);
        let top = (height as f32 - size) / 2.0;
        self.draw_line(&mut canvas, line, 0.0, top, size);
        canvas
    }

    fn draw_line(&self, canvas: &mut RgbaImage, line: &Line, x: f32, top: f32, size: f32) {
        let metrics = self.metrics(size as u32);
        let baseline = top + self.fonts.regular.ascent(size).min(size);
        let gap = metrics.symbol_gap();
        let mut pen = x;

        for fragment in &line.fragments {
            match fragment {
                Fragment::Text { value, style } => {
                    let face = self.fonts.face(*style);
                    pen = draw_text(canvas, face, value, pen, baseline, size, self.fonts.colour);
                }
                Fragment::Symbol { token, style } => match self.symbols.lookup(token) {
                    Some(symbol) => {
                        let (w, h) = symbol.extent(size);
                        let glyph = imageops::resize(&symbol.glyph, w, h, FilterType::Triangle);
                        let nudge = (size * SYMBOL_NUDGE_RATIO).round();
                        let sy = top + (size - h as f32) / 2.0 + nudge;
                        imageops::overlay(canvas, &glyph, pen.round() as i64, sy.round() as i64);
                        pen += w as f32 + gap;
                    }
                    None => {
                        tracing::warn!(token = %token, "unknown symbol, drawing placeholder");
                        let face = self.fonts.face(*style);
                        let text = placeholder(token);
                        pen = draw_text(canvas, face, &text, pen, baseline, size, self.fonts.fallback_colour);
                        pen += gap;
                    }
                },
                Fragment::Bullet { style } => {
                    let face = self.fonts.face(*style);
                    pen = draw_text(canvas, face, BULLET, pen, baseline, size, self.fonts.colour);
                }
                Fragment::Indent(width) => pen += width,
                _ => {}
            }
        }
    }

    /// The divider glyph stretched across the line width, or a plain bar
    /// when the registry has none.
    fn draw_divider(&self, canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: u32) {
        let width = width.round().max(1.0) as u32;
        match self.symbols.lookup(DIVIDER_TOKEN) {
            Some(symbol) => {
                let bar = imageops::resize(&symbol.glyph, width, height, FilterType::Triangle);
                imageops::overlay(canvas, &bar, x.round() as i64, y.round() as i64);
            }
            None => {
                let bar = RgbaImage::from_pixel(width, height, self.fonts.colour.to_rgba());
                imageops::overlay(canvas, &bar, x.round() as i64, y.round() as i64);
            }
        }
    }
}

/// Draw a run of text with its baseline at `baseline`. Returns the pen
/// position after the last character.
pub fn draw_text(
    canvas: &mut RgbaImage,
    face: &dyn Face,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    colour: Colour,
) -> f32 {
    let mut pen = x;
    for ch in text.chars() {
        let glyph = face.rasterize(ch, size);
        let left = pen.round() as i64 + glyph.xmin as i64;
        let top = baseline.round() as i64 - glyph.ymin as i64 - glyph.height as i64;

        for row in 0..glyph.height {
            for col in 0..glyph.width {
                let coverage = glyph.coverage[row * glyph.width + col];
                if coverage > 0 {
                    blend(canvas, left + col as i64, top + row as i64, colour, coverage);
                }
            }
        }
        pen += face.advance(ch, size);
    }
    pen
}

/// Source-over blend of `colour` at `coverage` onto one pixel. Pixels
/// outside the canvas are ignored.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, colour: Colour, coverage: u8) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let sa = (colour.a as f32 / 255.0) * (coverage as f32 / 255.0);
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    let channel = |src: u8, dst: u8| -> u8 {
        let value = (src as f32 * sa + dst as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        channel(colour.r, dst.0[0]),
        channel(colour.g, dst.0[1]),
        channel(colour.b, dst.0[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Draw a single line of text horizontally squeezed to `max_width` when it
/// is wider. Used for titles and type lines that must stay on one line.
pub fn draw_squeezed(
    canvas: &mut RgbaImage,
    face: &dyn Face,
    text: &str,
    (x, top): (i64, i64),
    size: f32,
    max_width: f32,
    colour: Colour,
) {
    let natural = face.text_width(text, size).ceil().max(1.0);
    let line_height = (size * LINE_STRIP_RATIO).ceil() as u32;
    let baseline = (line_height as f32 - size) / 2.0 + face.ascent(size).min(size);
    let mut strip = RgbaImage::new(natural as u32, line_height);
    draw_text(&mut strip, face, text, 0.0, baseline, size, colour);

    if natural > max_width && max_width >= 1.0 {
        let squeezed = imageops::resize(&strip, max_width as u32, line_height, FilterType::Triangle);
        imageops::overlay(canvas, &squeezed, x, top);
    } else {
        imageops::overlay(canvas, &strip, x, top);
    }
}
