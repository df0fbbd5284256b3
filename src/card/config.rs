//! Per-layout card geometry.
//!
//! Every supported layout is one immutable [`CardLayoutConfig`] in a static
//! table, selected by the card's `layout` field. Coordinates are pixels on
//! a 1500 x 2100 canvas (63 x 88 mm at roughly 600 dpi).

use crate::text::{Align, FontRange};
use crate::types::Rect;

pub const CARD_WIDTH: u32 = 1500;
pub const CARD_HEIGHT: u32 = 2100;

/// Space between side-by-side columns.
pub const COLUMN_GUTTER: u32 = 40;

/// Layout used when a card has no `layout` field.
pub const DEFAULT_LAYOUT: &str = "regular";

/// A text box: where it sits, which sizes to try and how lines align.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub rect: Rect,
    pub range: FontRange,
    pub align: Align,
}

impl TextBox {
    pub const fn new(rect: Rect, range: FontRange, align: Align) -> Self {
        Self { rect, range, align }
    }
}

/// How the rules box is carved into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPattern {
    /// One region covering the whole box.
    Single,
    /// Regions stacked top to bottom, one per `{end}` segment.
    Stacked { expected: usize, distribute: bool },
    /// Equal side-by-side columns.
    Columns { count: usize },
    /// Main rules on the right, adventure text on the left page.
    Adventure,
}

/// Optional behaviours of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Second title, mana cost and type line (split, room, adventure).
    pub second_face: bool,
    /// Region count comes from `chapter_count`; numerals drawn beside each.
    pub chapters: bool,
    /// Region count comes from `ability_costs`; costs drawn beside each.
    pub ability_costs: bool,
    /// Level regions of a class card.
    pub levels: bool,
    /// Has a `loyalty` box.
    pub loyalty: bool,
    /// Renders a back face from the `back` field.
    pub back_face: bool,
    /// Stacked or column regions share the smallest fitted font size.
    pub uniform_font_size: bool,
}

/// Title, cost, type line and rules box of the adventure page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondFace {
    pub title: TextBox,
    pub mana_cost: Rect,
    pub type_line: TextBox,
    pub rules: TextBox,
}

/// Immutable geometry and behaviour of one card layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayoutConfig {
    pub name: &'static str,
    pub title: TextBox,
    /// Cost symbols are right-aligned in this box, one symbol per box height.
    pub mana_cost: Rect,
    pub type_line: TextBox,
    pub rules: TextBox,
    pub pattern: RegionPattern,
    pub power_toughness: Option<TextBox>,
    pub loyalty: Option<TextBox>,
    /// Column beside stacked regions holding chapter numerals or ability costs.
    pub side_column: Option<Rect>,
    pub adventure: Option<SecondFace>,
    pub watermark: Rect,
    pub footer: Rect,
    pub capabilities: Capabilities,
}

const TITLE_RANGE: FontRange = FontRange::new(80, 48);
const TYPE_RANGE: FontRange = FontRange::new(68, 40);
const RULES_RANGE: FontRange = FontRange::new(72, 28);
const BADGE_RANGE: FontRange = FontRange::new(84, 48);

const TITLE: TextBox = TextBox::new(Rect::new(125, 108, 1000, 96), TITLE_RANGE, Align::Left);
const MANA_COST: Rect = Rect::new(860, 118, 520, 76);
const TYPE_LINE: TextBox = TextBox::new(Rect::new(125, 1188, 1150, 84), TYPE_RANGE, Align::Left);
const RULES: TextBox = TextBox::new(Rect::new(125, 1300, 1250, 560), RULES_RANGE, Align::Left);
const POWER_TOUGHNESS: TextBox =
    TextBox::new(Rect::new(1140, 1790, 240, 110), BADGE_RANGE, Align::Center);
const WATERMARK: Rect = Rect::new(500, 1330, 500, 500);
const FOOTER: Rect = Rect::new(90, 1935, 1320, 100);

const BASE: CardLayoutConfig = CardLayoutConfig {
    name: "regular",
    title: TITLE,
    mana_cost: MANA_COST,
    type_line: TYPE_LINE,
    rules: RULES,
    pattern: RegionPattern::Single,
    power_toughness: Some(POWER_TOUGHNESS),
    loyalty: None,
    side_column: None,
    adventure: None,
    watermark: WATERMARK,
    footer: FOOTER,
    capabilities: Capabilities {
        second_face: false,
        chapters: false,
        ability_costs: false,
        levels: false,
        loyalty: false,
        back_face: false,
        uniform_font_size: false,
    },
};

static LAYOUTS: [CardLayoutConfig; 9] = [
    BASE,
    CardLayoutConfig {
        name: "token",
        type_line: TextBox::new(Rect::new(125, 1370, 1150, 84), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(125, 1470, 1250, 390), RULES_RANGE, Align::Center),
        watermark: Rect::new(550, 1470, 400, 390),
        ..BASE
    },
    CardLayoutConfig {
        name: "transform",
        capabilities: Capabilities {
            back_face: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "saga",
        type_line: TextBox::new(Rect::new(125, 1845, 1150, 80), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(190, 430, 600, 1390), RULES_RANGE, Align::Left),
        pattern: RegionPattern::Stacked {
            expected: 3,
            distribute: true,
        },
        power_toughness: None,
        side_column: Some(Rect::new(80, 430, 100, 1390)),
        watermark: Rect::new(240, 800, 500, 500),
        capabilities: Capabilities {
            chapters: true,
            uniform_font_size: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "planeswalker",
        type_line: TextBox::new(Rect::new(125, 1060, 1150, 80), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(250, 1165, 1130, 700), RULES_RANGE, Align::Left),
        pattern: RegionPattern::Stacked {
            expected: 3,
            distribute: true,
        },
        power_toughness: None,
        loyalty: Some(TextBox::new(
            Rect::new(1210, 1860, 200, 120),
            BADGE_RANGE,
            Align::Center,
        )),
        side_column: Some(Rect::new(60, 1165, 180, 700)),
        capabilities: Capabilities {
            ability_costs: true,
            loyalty: true,
            uniform_font_size: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "class",
        type_line: TextBox::new(Rect::new(125, 1845, 1150, 80), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(770, 420, 620, 1400), RULES_RANGE, Align::Left),
        pattern: RegionPattern::Stacked {
            expected: 3,
            distribute: true,
        },
        power_toughness: None,
        watermark: Rect::new(830, 870, 500, 500),
        capabilities: Capabilities {
            levels: true,
            uniform_font_size: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "split",
        title: TextBox::new(Rect::new(100, 108, 1300, 96), TITLE_RANGE, Align::Left),
        mana_cost: Rect::new(100, 118, 1300, 76),
        type_line: TextBox::new(Rect::new(100, 1188, 1300, 84), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(100, 1300, 1300, 560), RULES_RANGE, Align::Left),
        pattern: RegionPattern::Columns { count: 2 },
        power_toughness: None,
        capabilities: Capabilities {
            second_face: true,
            uniform_font_size: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "room",
        title: TextBox::new(Rect::new(100, 108, 1300, 96), TITLE_RANGE, Align::Center),
        mana_cost: Rect::new(100, 118, 1300, 76),
        type_line: TextBox::new(Rect::new(100, 1188, 1300, 84), TYPE_RANGE, Align::Left),
        rules: TextBox::new(Rect::new(100, 1300, 1300, 560), RULES_RANGE, Align::Center),
        pattern: RegionPattern::Columns { count: 2 },
        power_toughness: None,
        capabilities: Capabilities {
            second_face: true,
            ..BASE.capabilities
        },
        ..BASE
    },
    CardLayoutConfig {
        name: "adventure",
        rules: TextBox::new(Rect::new(770, 1300, 610, 560), RULES_RANGE, Align::Left),
        pattern: RegionPattern::Adventure,
        adventure: Some(SecondFace {
            title: TextBox::new(Rect::new(120, 1300, 620, 70), FontRange::new(56, 32), Align::Left),
            mana_cost: Rect::new(440, 1306, 300, 56),
            type_line: TextBox::new(Rect::new(120, 1375, 620, 60), FontRange::new(48, 28), Align::Left),
            rules: TextBox::new(Rect::new(120, 1440, 620, 420), RULES_RANGE, Align::Left),
        }),
        watermark: Rect::new(845, 1350, 460, 460),
        capabilities: Capabilities {
            second_face: true,
            ..BASE.capabilities
        },
        ..BASE
    },
];

/// Alternative names accepted in the `layout` field.
const ALIASES: [(&str, &str); 4] = [
    ("normal", "regular"),
    ("modal_dfc", "transform"),
    ("leveler", "class"),
    ("aftermath", "split"),
];

impl CardLayoutConfig {
    /// Look up a layout by name, case-insensitively.
    pub fn for_layout(name: &str) -> Option<&'static CardLayoutConfig> {
        let name = name.trim().to_lowercase();
        let name = ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name.as_str(), |(_, target)| *target);
        LAYOUTS.iter().find(|c| c.name == name)
    }

    /// Names of every supported layout.
    pub fn names() -> impl Iterator<Item = &'static str> {
        LAYOUTS.iter().map(|c| c.name)
    }

    /// The neighbour the last rules line must avoid, if the card shows one.
    pub fn neighbour(&self, has_power_toughness: bool, has_loyalty: bool) -> Option<Rect> {
        if has_power_toughness {
            if let Some(pt) = self.power_toughness {
                return Some(pt.rect);
            }
        }
        if has_loyalty {
            return self.loyalty.map(|l| l.rect);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_alias() {
        assert_eq!(CardLayoutConfig::for_layout("Saga").unwrap().name, "saga");
        assert_eq!(CardLayoutConfig::for_layout("normal").unwrap().name, "regular");
        assert_eq!(CardLayoutConfig::for_layout(" modal_dfc ").unwrap().name, "transform");
        assert!(CardLayoutConfig::for_layout("meld").is_none());
    }

    #[test]
    fn test_all_names_resolve() {
        let names: Vec<_> = CardLayoutConfig::names().collect();
        assert_eq!(names.len(), 9);
        for name in names {
            assert!(CardLayoutConfig::for_layout(name).is_some(), "{}", name);
        }
    }

    #[test]
    fn test_boxes_inside_canvas() {
        for config in LAYOUTS.iter() {
            let mut boxes = vec![
                config.title.rect,
                config.mana_cost,
                config.type_line.rect,
                config.rules.rect,
                config.watermark,
                config.footer,
            ];
            boxes.extend(config.power_toughness.map(|b| b.rect));
            boxes.extend(config.loyalty.map(|b| b.rect));
            boxes.extend(config.side_column);
            for rect in boxes {
                assert!(rect.x >= 0 && rect.y >= 0, "{} {:?}", config.name, rect);
                assert!(rect.right() <= CARD_WIDTH as i32, "{} {:?}", config.name, rect);
                assert!(rect.bottom() <= CARD_HEIGHT as i32, "{} {:?}", config.name, rect);
            }
            assert!(config.rules.range.is_valid());
        }
    }

    #[test]
    fn test_capabilities() {
        let saga = CardLayoutConfig::for_layout("saga").unwrap();
        assert!(saga.capabilities.chapters);
        assert!(saga.side_column.is_some());

        let walker = CardLayoutConfig::for_layout("planeswalker").unwrap();
        assert!(walker.capabilities.ability_costs);
        assert!(walker.loyalty.is_some());

        assert!(CardLayoutConfig::for_layout("transform").unwrap().capabilities.back_face);
        assert!(!CardLayoutConfig::for_layout("regular").unwrap().capabilities.back_face);
    }

    #[test]
    fn test_neighbour_prefers_power_toughness() {
        let regular = CardLayoutConfig::for_layout("regular").unwrap();
        assert_eq!(regular.neighbour(true, false), Some(POWER_TOUGHNESS.rect));
        assert_eq!(regular.neighbour(false, false), None);

        let walker = CardLayoutConfig::for_layout("planeswalker").unwrap();
        assert_eq!(walker.neighbour(false, true), walker.loyalty.map(|l| l.rect));
    }
}
