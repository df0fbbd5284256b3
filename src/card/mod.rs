//! Card composition.
//!
//! A [`Card`] pairs one metadata record with its layout config and the shared
//! assets. `create_layers` builds every frame, text and overlay layer;
//! `render_card` flattens them into the final image.

pub mod config;
pub mod elements;
pub mod layer;
pub mod regions;

use image::RgbaImage;

use crate::assets::AssetLibrary;
use crate::error::{CardError, Result};
use crate::types::CardMetadata;

pub use config::{
    Capabilities, CardLayoutConfig, RegionPattern, SecondFace, TextBox, CARD_HEIGHT, CARD_WIDTH,
    COLUMN_GUTTER, DEFAULT_LAYOUT,
};
pub use layer::{Layer, LayerGroup, LayerStack};
pub use regions::{
    distribute, roman, split_segments, Dispatcher, PlacedText, Region, DEFAULT_DISTRIBUTE_ALPHA,
};

/// Field names a card may carry.
pub const KNOWN_FIELDS: [&str; 22] = [
    "title",
    "mana_cost",
    "type_line",
    "rules_text",
    "power",
    "toughness",
    "loyalty",
    "ability_costs",
    "chapter_count",
    "layout",
    "frames",
    "overlays",
    "watermark",
    "collector_number",
    "rarity",
    "set",
    "language",
    "artist",
    "title_2",
    "mana_cost_2",
    "type_line_2",
    "back",
];

/// Resolve the layout config a card asks for.
pub fn layout_config(card: &CardMetadata) -> Result<&'static CardLayoutConfig> {
    let name = card.text("layout").unwrap_or(DEFAULT_LAYOUT);
    CardLayoutConfig::for_layout(name).ok_or_else(|| CardError::Asset {
        message: format!("Unknown layout '{}'", name),
        help: Some(format!(
            "Supported layouts: {}",
            CardLayoutConfig::names().collect::<Vec<_>>().join(", ")
        )),
    })
}

/// One card being rendered.
#[derive(Debug)]
pub struct Card<'a> {
    metadata: &'a CardMetadata,
    config: &'static CardLayoutConfig,
    assets: &'a AssetLibrary,
    layers: LayerStack,
    built: bool,
}

impl<'a> Card<'a> {
    pub fn new(metadata: &'a CardMetadata, assets: &'a AssetLibrary) -> Result<Self> {
        Ok(Self {
            metadata,
            config: layout_config(metadata)?,
            assets,
            layers: LayerStack::new(),
            built: false,
        })
    }

    pub fn config(&self) -> &'static CardLayoutConfig {
        self.config
    }

    pub fn metadata(&self) -> &'a CardMetadata {
        self.metadata
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// The back face record, when the layout has one.
    pub fn back(&self) -> Option<&'a CardMetadata> {
        if self.config.capabilities.back_face {
            self.metadata.cards("back").first()
        } else {
            None
        }
    }

    /// Build every layer. Fails only when rules text overflows its box.
    pub fn create_layers(&mut self) -> Result<()> {
        let span = tracing::info_span!("card", card = %self.metadata.title(), layout = self.config.name);
        let _enter = span.enter();

        self.add_frames();
        self.add_footer();
        self.add_headings();
        self.add_rules()?;
        self.add_badges();
        self.add_overlays();

        self.built = true;
        tracing::info!(layers = self.layers.len(), "card laid out");
        Ok(())
    }

    /// Composite all layers into the final image, building them first if
    /// `create_layers` has not run.
    pub fn render_card(mut self) -> Result<RgbaImage> {
        if !self.built {
            self.create_layers()?;
        }
        Ok(self.layers.composite(CARD_WIDTH, CARD_HEIGHT))
    }

    fn push(&mut self, group: LayerGroup, layer: Option<Layer>) {
        if let Some(layer) = layer {
            self.layers.push(group, layer);
        }
    }

    fn add_frames(&mut self) {
        for name in self.metadata.list("frames") {
            let layer = elements::frame_layer(self.assets, &name);
            self.push(LayerGroup::Frame, layer);
        }
        let card = self.metadata;
        if let Some(name) = card.text("watermark") {
            let layer = elements::watermark_layer(self.assets, name, self.config.watermark);
            self.push(LayerGroup::Frame, layer);
        }
    }

    fn add_footer(&mut self) {
        let layer = elements::footer_layer(self.assets, self.metadata, self.config.footer);
        self.push(LayerGroup::Collector, layer);
    }

    /// Titles, mana costs and type lines of every face on the card.
    fn add_headings(&mut self) {
        let card = self.metadata;
        let config = self.config;
        let text = |key: &str| card.text(key).unwrap_or("");

        if let RegionPattern::Columns { count } = config.pattern {
            let titles = config.title.rect.columns(count, COLUMN_GUTTER);
            let costs = config.mana_cost.columns(count, COLUMN_GUTTER);
            let types = config.type_line.rect.columns(count, COLUMN_GUTTER);
            for i in 0..count {
                let suffix = if i == 0 { String::new() } else { format!("_{}", i + 1) };
                let title_box = TextBox { rect: titles[i], ..config.title };
                let type_box = TextBox { rect: types[i], ..config.type_line };
                let title = text(&format!("title{}", suffix));
                let layer = elements::line_layer(self.assets, "title", title, &title_box);
                self.push(LayerGroup::Text, layer);
                let cost = text(&format!("mana_cost{}", suffix));
                let layer = elements::mana_cost_layer(self.assets, "mana cost", cost, costs[i]);
                self.push(LayerGroup::Text, layer);
                let type_line = text(&format!("type_line{}", suffix));
                let layer = elements::line_layer(self.assets, "type line", type_line, &type_box);
                self.push(LayerGroup::Text, layer);
            }
            return;
        }

        let layer = elements::line_layer(self.assets, "title", text("title"), &config.title);
        self.push(LayerGroup::Text, layer);
        let layer = elements::mana_cost_layer(self.assets, "mana cost", text("mana_cost"), config.mana_cost);
        self.push(LayerGroup::Text, layer);
        let layer = elements::line_layer(self.assets, "type line", text("type_line"), &config.type_line);
        self.push(LayerGroup::Text, layer);

        if let Some(page) = config.adventure {
            let layer = elements::line_layer(self.assets, "adventure title", text("title_2"), &page.title);
            self.push(LayerGroup::Text, layer);
            let layer = elements::mana_cost_layer(self.assets, "adventure mana cost", text("mana_cost_2"), page.mana_cost);
            self.push(LayerGroup::Text, layer);
            let layer = elements::line_layer(self.assets, "adventure type line", text("type_line_2"), &page.type_line);
            self.push(LayerGroup::Text, layer);
        }
    }

    fn add_rules(&mut self) -> Result<()> {
        let assets = self.assets;
        let dispatcher = assets.dispatcher();
        let typesetter = dispatcher.typesetter;
        let placed = dispatcher.layout(self.config, self.metadata)?;

        let side_labels = self.side_labels(placed.len());
        for (i, region) in placed.iter().enumerate() {
            if let Some(layout) = &region.layout {
                let image = typesetter.render(layout);
                let layer = Layer::new(&region.label, image, region.rect.x as i64, region.rect.y as i64);
                self.layers.push(LayerGroup::Text, layer);
            }
            if let (Some(column), Some(label)) = (self.config.side_column, side_labels.get(i)) {
                let layer = elements::side_label_layer(assets, &region.label, label, column, region.rect);
                self.push(LayerGroup::Text, layer);
            }
        }
        Ok(())
    }

    /// Chapter numerals or ability costs drawn beside stacked regions.
    fn side_labels(&self, count: usize) -> Vec<String> {
        let caps = self.config.capabilities;
        if caps.ability_costs {
            self.metadata
                .list("ability_costs")
                .into_iter()
                .map(|cost| cost.replace('-', "\u{2212}"))
                .collect()
        } else if caps.chapters {
            (1..=count as u32).map(roman).collect()
        } else {
            Vec::new()
        }
    }

    /// Power/toughness and loyalty boxes.
    fn add_badges(&mut self) {
        let card = self.metadata;
        if let Some(pt_box) = self.config.power_toughness {
            let power = card.text("power");
            let toughness = card.text("toughness");
            if power.is_some() || toughness.is_some() {
                let text = format!("{}/{}", power.unwrap_or(""), toughness.unwrap_or(""));
                let layer = elements::line_layer(self.assets, "power/toughness", &text, &pt_box);
                self.push(LayerGroup::Text, layer);
            }
        }
        if let (Some(loyalty_box), Some(loyalty)) = (self.config.loyalty, card.text("loyalty")) {
            let layer = elements::line_layer(self.assets, "loyalty", loyalty, &loyalty_box);
            self.push(LayerGroup::Text, layer);
        }
    }

    fn add_overlays(&mut self) {
        for name in self.metadata.list("overlays") {
            let layer = elements::frame_layer(self.assets, &name);
            self.push(LayerGroup::Overlay, layer);
        }
    }
}

/// Render one card record to an image.
pub fn render(metadata: &CardMetadata, assets: &AssetLibrary) -> Result<RgbaImage> {
    Card::new(metadata, assets)?.render_card()
}
