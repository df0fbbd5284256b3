//! Pixel rectangles used for card geometry.

/// An axis-aligned rectangle in card pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Whether the two rectangles share any horizontal span.
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Same position, different height.
    pub fn with_height(self, height: u32) -> Self {
        Self { height, ..self }
    }

    /// Split horizontally into `count` equal columns separated by `gutter` pixels.
    ///
    /// The last column absorbs any rounding remainder.
    pub fn columns(&self, count: usize, gutter: u32) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let gutters = gutter * (count as u32 - 1);
        let available = self.width.saturating_sub(gutters);
        let base = available / count as u32;

        (0..count)
            .map(|i| {
                let x = self.x + (i as u32 * (base + gutter)) as i32;
                let width = if i == count - 1 {
                    (self.right() - x).max(0) as u32
                } else {
                    base
                };
                Rect::new(x, self.y, width, self.height)
            })
            .collect()
    }

    /// Split vertically into consecutive slices of the given heights.
    pub fn stack(&self, heights: &[u32]) -> Vec<Rect> {
        let mut y = self.y;
        heights
            .iter()
            .map(|&h| {
                let rect = Rect::new(self.x, y, self.width, h);
                y += h as i32;
                rect
            })
            .collect()
    }
}
