//! Positioned image layers and the card compositor.

use image::{imageops, RgbaImage};

/// Compositing groups, painted in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerGroup {
    Frame,
    Collector,
    Text,
    Overlay,
}

impl LayerGroup {
    pub const ALL: [LayerGroup; 4] = [
        LayerGroup::Frame,
        LayerGroup::Collector,
        LayerGroup::Text,
        LayerGroup::Overlay,
    ];
}

/// An image placed on the card at `(x, y)`.
#[derive(Debug, Clone)]
pub struct Layer {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
    /// What the layer shows, for logs.
    pub label: String,
}

impl Layer {
    pub fn new(label: impl Into<String>, image: RgbaImage, x: i64, y: i64) -> Self {
        Self {
            image,
            x,
            y,
            label: label.into(),
        }
    }
}

/// Append-only layers of one card, grouped for compositing.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    frame: Vec<Layer>,
    collector: Vec<Layer>,
    text: Vec<Layer>,
    overlay: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: LayerGroup, layer: Layer) {
        tracing::trace!(?group, label = %layer.label, x = layer.x, y = layer.y, "layer added");
        self.group_mut(group).push(layer);
    }

    pub fn group(&self, group: LayerGroup) -> &[Layer] {
        match group {
            LayerGroup::Frame => &self.frame,
            LayerGroup::Collector => &self.collector,
            LayerGroup::Text => &self.text,
            LayerGroup::Overlay => &self.overlay,
        }
    }

    fn group_mut(&mut self, group: LayerGroup) -> &mut Vec<Layer> {
        match group {
            LayerGroup::Frame => &mut self.frame,
            LayerGroup::Collector => &mut self.collector,
            LayerGroup::Text => &mut self.text,
            LayerGroup::Overlay => &mut self.overlay,
        }
    }

    pub fn len(&self) -> usize {
        LayerGroup::ALL.iter().map(|g| self.group(*g).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All layers in painting order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerGroup, &Layer)> {
        LayerGroup::ALL
            .into_iter()
            .flat_map(move |g| self.group(g).iter().map(move |l| (g, l)))
    }

    /// Alpha-composite every layer onto a transparent canvas.
    pub fn composite(&self, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        for (_, layer) in self.iter() {
            imageops::overlay(&mut canvas, &layer.image, layer.x, layer.y);
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    #[test]
    fn test_groups_paint_in_order() {
        let mut stack = LayerStack::new();
        // pushed out of order; text must still end up above the frame
        stack.push(LayerGroup::Text, Layer::new("text", solid(2, 2, [255, 0, 0, 255]), 0, 0));
        stack.push(LayerGroup::Frame, Layer::new("frame", solid(4, 4, [0, 0, 255, 255]), 0, 0));

        let image = stack.composite(4, 4);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_layers_within_group_keep_insertion_order() {
        let mut stack = LayerStack::new();
        stack.push(LayerGroup::Frame, Layer::new("a", solid(1, 1, [1, 1, 1, 255]), 0, 0));
        stack.push(LayerGroup::Frame, Layer::new("b", solid(1, 1, [2, 2, 2, 255]), 0, 0));
        let labels: Vec<_> = stack.iter().map(|(_, l)| l.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(stack.composite(1, 1).get_pixel(0, 0).0, [2, 2, 2, 255]);
    }

    #[test]
    fn test_offset_and_clipping() {
        let mut stack = LayerStack::new();
        stack.push(LayerGroup::Overlay, Layer::new("corner", solid(4, 4, [9, 9, 9, 255]), 2, -2));
        let image = stack.composite(4, 4);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(3, 0).0, [9, 9, 9, 255]);
        assert_eq!(image.get_pixel(3, 2).0[3], 0);
        assert_eq!(stack.len(), 1);
    }
}
