//! Card elements outside the rules box.
//!
//! Each function builds at most one positioned [`Layer`]; empty fields
//! produce no layer.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::assets::AssetLibrary;
use crate::text::render::LINE_STRIP_RATIO;
use crate::text::{draw_squeezed, draw_text, tokenize, wrap, Align, FontRange, FontStyle, Fragment};
use crate::types::{CardMetadata, Colour, Rect};

use super::config::{TextBox, CARD_HEIGHT, CARD_WIDTH};
use super::layer::Layer;

/// Footer text colour; the footer sits on the black border.
pub const FOOTER_COLOUR: Colour = Colour::WHITE;

/// How far watermark pixels are lightened, in percent.
const WATERMARK_LIGHTEN: f32 = 60.0;

/// Watermark opacity, out of 255.
const WATERMARK_ALPHA: f32 = 90.0;

/// Side labels (chapter numerals, ability costs) are fitted in this range.
const SIDE_LABEL_RANGE: FontRange = FontRange::new(72, 24);

/// A single line of text fitted to a box: the largest size in the box's
/// range that fits its width, squeezed horizontally when none does.
pub fn line_layer(assets: &AssetLibrary, label: &str, text: &str, text_box: &TextBox) -> Option<Layer> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let rect = text_box.rect;
    let face = assets.fonts.title.as_ref();
    let max_width = rect.width as f32;
    // glyphs need `LINE_STRIP_RATIO * size` pixels of height
    let tallest = (rect.height as f32 / LINE_STRIP_RATIO).floor() as u32;
    let range = FontRange::new(
        text_box.range.max.min(tallest).max(text_box.range.min),
        text_box.range.min,
    );
    let fit = assets.typesetter().fit_line(text, face, max_width, range);
    let drawn_width = fit.width.min(max_width);

    let mut image = RgbaImage::new(rect.width, rect.height);
    let x = match text_box.align {
        Align::Left => 0,
        Align::Center => ((max_width - drawn_width) / 2.0).round() as i64,
    };
    let strip_height = fit.font_size as f32 * LINE_STRIP_RATIO;
    let top = ((rect.height as f32 - strip_height) / 2.0).round() as i64;
    draw_squeezed(
        &mut image,
        face,
        text,
        (x, top),
        fit.font_size as f32,
        max_width,
        assets.fonts.colour,
    );
    tracing::debug!(label, font_size = fit.font_size, squeezed = fit.width > max_width, "placed line");

    Some(Layer::new(label, image, rect.x as i64, rect.y as i64))
}

/// Mana cost symbols, right-aligned in `rect`.
pub fn mana_cost_layer(assets: &AssetLibrary, label: &str, cost: &str, rect: Rect) -> Option<Layer> {
    let fragments: Vec<Fragment> = tokenize(cost.trim(), None)
        .into_iter()
        .filter(|f| matches!(f, Fragment::Symbol { .. } | Fragment::Text { .. }))
        .collect();
    if fragments.is_empty() {
        return None;
    }

    let font_size = ((rect.height as f32 / LINE_STRIP_RATIO).floor() as u32).max(1);
    let typesetter = assets.typesetter();
    let lines = wrap(&fragments, f32::MAX, typesetter.metrics(font_size), FontStyle::Regular);
    let line = lines.first()?;
    let strip = typesetter.render_line(line, font_size);

    let x = rect.right() as i64 - strip.width() as i64;
    let y = rect.y as i64 + (rect.height as i64 - strip.height() as i64) / 2;
    Some(Layer::new(label, strip, x, y))
}

/// A label centred in `column` at the vertical middle of `region`.
pub fn side_label_layer(
    assets: &AssetLibrary,
    label: &str,
    text: &str,
    column: Rect,
    region: Rect,
) -> Option<Layer> {
    let height = region.height.min(SIDE_LABEL_RANGE.max * 2);
    let y = region.y + (region.height as i32 - height as i32) / 2;
    let text_box = TextBox::new(
        Rect::new(column.x, y, column.width, height),
        SIDE_LABEL_RANGE,
        Align::Center,
    );
    line_layer(assets, label, text, &text_box)
}

/// The named watermark image, lightened, faded and centred in `rect`.
///
/// Returns `None` and logs a warning when the image is not in the library.
pub fn watermark_layer(assets: &AssetLibrary, name: &str, rect: Rect) -> Option<Layer> {
    let Some(source) = assets.frame(name) else {
        tracing::warn!(watermark = %name, "watermark image not found");
        return None;
    };
    if source.width() == 0 || source.height() == 0 {
        return None;
    }

    let scale = (rect.width as f32 / source.width() as f32).min(rect.height as f32 / source.height() as f32);
    let width = ((source.width() as f32 * scale).round() as u32).max(1);
    let height = ((source.height() as f32 * scale).round() as u32).max(1);
    let mut image = imageops::resize(source, width, height, FilterType::Triangle);

    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let light = Colour::rgb(r, g, b).lighten(WATERMARK_LIGHTEN);
        let alpha = (a as f32 * WATERMARK_ALPHA / 255.0).round() as u8;
        *pixel = Rgba([light.r, light.g, light.b, alpha]);
    }

    let x = rect.x as i64 + (rect.width as i64 - width as i64) / 2;
    let y = rect.y as i64 + (rect.height as i64 - height as i64) / 2;
    Some(Layer::new(format!("watermark {}", name), image, x, y))
}

/// The two footer rows: collector number and rarity, then set, language
/// and artist.
pub fn footer_lines(card: &CardMetadata) -> (String, String) {
    let first = [card.text("collector_number"), card.text("rarity")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut second = [card.text("set"), card.text("language")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" \u{2022} ");
    if let Some(artist) = card.text("artist") {
        if !second.is_empty() {
            second.push_str("  ");
        }
        second.push_str("Illus. ");
        second.push_str(artist);
    }
    (first, second)
}

/// Collector footer in the info face.
pub fn footer_layer(assets: &AssetLibrary, card: &CardMetadata, rect: Rect) -> Option<Layer> {
    let (first, second) = footer_lines(card);
    if first.is_empty() && second.is_empty() {
        return None;
    }

    let face = assets.fonts.info.as_ref();
    let row = rect.height as f32 / 2.0;
    let size = (row / LINE_STRIP_RATIO).floor().max(1.0);
    let mut image = RgbaImage::new(rect.width, rect.height);
    for (i, text) in [first, second].iter().enumerate() {
        let baseline = row * i as f32 + (row - size) / 2.0 + face.ascent(size).min(size);
        draw_text(&mut image, face, text, 0.0, baseline, size, FOOTER_COLOUR);
    }
    Some(Layer::new("footer", image, rect.x as i64, rect.y as i64))
}

/// A frame or overlay image, stretched to the card size if it differs.
pub fn frame_layer(assets: &AssetLibrary, name: &str) -> Option<Layer> {
    let Some(image) = assets.frame(name) else {
        tracing::warn!(frame = %name, "frame image not found");
        return None;
    };
    let image = if image.dimensions() == (CARD_WIDTH, CARD_HEIGHT) {
        image.clone()
    } else {
        imageops::resize(image, CARD_WIDTH, CARD_HEIGHT, FilterType::Triangle)
    };
    Some(Layer::new(format!("frame {}", name), image, 0, 0))
}
