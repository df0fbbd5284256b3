//! Layout variant dispatcher.
//!
//! Carves a card's rules text into regions according to its layout's
//! [`RegionPattern`], assigns each region a box, and fits each one
//! independently. Stacked layouts measure every region first and share the
//! box height between them in proportion to their need.

use crate::error::{CardError, Result};
use crate::text::{parse_blocks, FitOptions, FontRange, Layout, RawBlock, Typesetter};
use crate::types::{CardMetadata, Rect};

use super::config::{CardLayoutConfig, RegionPattern, COLUMN_GUTTER};

/// Separator between per-region segments of rules text.
pub const SEGMENT_DELIMITER: &str = "{end}";

/// Default weight of measured need against an equal split.
pub const DEFAULT_DISTRIBUTE_ALPHA: f32 = 0.5;

/// One text region awaiting layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub label: String,
    pub rect: Rect,
    pub range: FontRange,
    pub options: FitOptions,
    pub text: String,
}

/// A fitted region. `layout` is `None` when the region has no text.
#[derive(Debug, Clone)]
pub struct PlacedText {
    pub label: String,
    pub rect: Rect,
    pub layout: Option<Layout>,
}

/// Split rules text at `{end}` (case-insensitive) into exactly `expected`
/// segments.
///
/// Missing segments are empty; surplus segments are joined onto the last
/// one with a line break. `expected == 0` keeps every segment.
pub fn split_segments(text: &str, expected: usize) -> Vec<String> {
    let lowered = text.to_ascii_lowercase();
    let mut segments = Vec::new();
    let mut start = 0;
    for (pos, _) in lowered.match_indices(SEGMENT_DELIMITER) {
        segments.push(text[start..pos].trim().to_string());
        start = pos + SEGMENT_DELIMITER.len();
    }
    segments.push(text[start..].trim().to_string());

    if expected == 0 {
        return segments;
    }
    if segments.len() > expected {
        let surplus = segments.split_off(expected);
        if let Some(last) = segments.last_mut() {
            for extra in surplus.into_iter().filter(|s| !s.is_empty()) {
                if !last.is_empty() {
                    last.push_str("{lns}");
                }
                last.push_str(&extra);
            }
        }
    }
    segments.resize(expected, String::new());
    segments
}

/// Number of `{end}`-separated segments in `text`; at least one.
pub fn segment_count(text: &str) -> usize {
    text.to_ascii_lowercase().matches(SEGMENT_DELIMITER).count() + 1
}

/// Share `total` pixels between regions.
///
/// Each region gets `alpha * need_i / sum(need) * total` plus
/// `(1 - alpha) * total / n`. The last region absorbs rounding so the
/// shares always add up to `total`.
pub fn distribute(needs: &[u32], total: u32, alpha: f32) -> Vec<u32> {
    let count = needs.len();
    if count == 0 {
        return Vec::new();
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let sum: u64 = needs.iter().map(|&n| n as u64).sum();
    let equal = total as f32 / count as f32;

    let mut shares: Vec<u32> = needs
        .iter()
        .map(|&need| {
            let proportional = if sum == 0 {
                equal
            } else {
                need as f32 / sum as f32 * total as f32
            };
            (alpha * proportional + (1.0 - alpha) * equal).floor() as u32
        })
        .collect();

    let assigned: u32 = shares[..count - 1].iter().sum();
    shares[count - 1] = total.saturating_sub(assigned);
    shares
}

/// Roman numeral for a chapter number.
pub fn roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 9] = [
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Plans and fits the rules-text regions of a card.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    pub typesetter: Typesetter<'a>,
    pub distribute_alpha: f32,
}

impl<'a> Dispatcher<'a> {
    pub fn new(typesetter: Typesetter<'a>) -> Self {
        Self {
            typesetter,
            distribute_alpha: DEFAULT_DISTRIBUTE_ALPHA,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.distribute_alpha = alpha;
        self
    }

    /// Number of stacked regions for a card.
    ///
    /// A `chapter_count` is capped at the number of segments the rules text
    /// actually has, or the layout's expected count if that is larger.
    pub fn stacked_count(config: &CardLayoutConfig, card: &CardMetadata, expected: usize) -> usize {
        let caps = config.capabilities;
        let counted = if caps.ability_costs {
            card.list("ability_costs").len()
        } else if caps.chapters {
            let limit = expected.max(segment_count(card.text("rules_text").unwrap_or("")));
            card.text("chapter_count")
                .and_then(|c| c.parse::<usize>().ok())
                .map_or(0, |n| n.min(limit))
        } else {
            0
        };
        if counted > 0 {
            counted
        } else {
            expected
        }
    }

    /// The regions of a card, with boxes assigned but not yet fitted.
    pub fn regions(&self, config: &CardLayoutConfig, card: &CardMetadata) -> Vec<Region> {
        let rules = card.text("rules_text").unwrap_or("");
        let has_pt = card.text("power").is_some() || card.text("toughness").is_some();
        let has_loyalty = config.capabilities.loyalty && card.text("loyalty").is_some();
        let neighbour = config.neighbour(has_pt, has_loyalty);
        let base = &config.rules;

        match config.pattern {
            RegionPattern::Single => vec![Region {
                label: "rules".to_string(),
                rect: base.rect,
                range: base.range,
                options: FitOptions {
                    align: base.align,
                    neighbour,
                },
                text: rules.to_string(),
            }],

            RegionPattern::Stacked {
                expected,
                distribute: proportional,
            } => {
                let count = Self::stacked_count(config, card, expected);
                let segments = split_segments(rules, count);
                let label = if config.capabilities.ability_costs {
                    "ability"
                } else if config.capabilities.levels {
                    "level"
                } else {
                    "chapter"
                };

                let heights = if proportional {
                    let title = Some(card.title());
                    let needs: Vec<u32> = segments
                        .iter()
                        .map(|s| {
                            if s.is_empty() {
                                0
                            } else {
                                self.typesetter.measure(
                                    &parse_blocks(s, title),
                                    base.rect.width,
                                    base.range.max,
                                )
                            }
                        })
                        .collect();
                    tracing::debug!(?needs, "measured stacked regions");
                    distribute(&needs, base.rect.height, self.distribute_alpha)
                } else {
                    distribute(&vec![0; count], base.rect.height, 0.0)
                };

                let rects = base.rect.stack(&heights);
                let last = count.saturating_sub(1);
                segments
                    .into_iter()
                    .zip(rects)
                    .enumerate()
                    .map(|(i, (text, rect))| Region {
                        label: format!("{} {}", label, i + 1),
                        rect,
                        range: base.range,
                        options: FitOptions {
                            align: base.align,
                            neighbour: if i == last { neighbour } else { None },
                        },
                        text,
                    })
                    .collect()
            }

            RegionPattern::Columns { count } => {
                let segments = split_segments(rules, count);
                base.rect
                    .columns(count, COLUMN_GUTTER)
                    .into_iter()
                    .zip(segments)
                    .enumerate()
                    .map(|(i, (rect, text))| Region {
                        label: format!("column {}", i + 1),
                        rect,
                        range: base.range,
                        options: FitOptions {
                            align: base.align,
                            neighbour: None,
                        },
                        text,
                    })
                    .collect()
            }

            RegionPattern::Adventure => {
                let mut segments = split_segments(rules, 2).into_iter();
                let main = segments.next().unwrap_or_default();
                let adventure = segments.next().unwrap_or_default();

                let mut regions = vec![Region {
                    label: "rules".to_string(),
                    rect: base.rect,
                    range: base.range,
                    options: FitOptions {
                        align: base.align,
                        neighbour,
                    },
                    text: main,
                }];
                if let Some(page) = config.adventure {
                    regions.push(Region {
                        label: "adventure".to_string(),
                        rect: page.rules.rect,
                        range: page.rules.range,
                        options: FitOptions {
                            align: page.rules.align,
                            neighbour: None,
                        },
                        text: adventure,
                    });
                }
                regions
            }
        }
    }

    /// Fit one region. Empty regions produce no layout.
    pub fn fit_region(&self, region: &Region, title: Option<&str>) -> Result<PlacedText> {
        let _span = tracing::debug_span!("region", region = %region.label).entered();
        if region.text.trim().is_empty() {
            return Ok(PlacedText {
                label: region.label.clone(),
                rect: region.rect,
                layout: None,
            });
        }
        let blocks: Vec<RawBlock> = parse_blocks(&region.text, title);

        let layout = self
            .typesetter
            .fit(&blocks, region.rect, region.range, region.options)
            .map_err(|source| CardError::ContentOverflow {
                region: region.label.clone(),
                source,
            })?;
        Ok(PlacedText {
            label: region.label.clone(),
            rect: region.rect,
            layout: Some(layout),
        })
    }

    /// Plan and fit every region of a card.
    ///
    /// With `uniform_font_size`, regions are re-fitted with their range capped
    /// at the smallest size any of them chose, until they all match. A capped
    /// region can land below the cap (a neighbour collision, say), so this
    /// repeats; the smallest size strictly drops each pass.
    pub fn layout(&self, config: &CardLayoutConfig, card: &CardMetadata) -> Result<Vec<PlacedText>> {
        let title = Some(card.title());
        let regions = self.regions(config, card);
        let mut placed = regions
            .iter()
            .map(|r| self.fit_region(r, title))
            .collect::<Result<Vec<_>>>()?;

        if !config.capabilities.uniform_font_size || placed.len() < 2 {
            return Ok(placed);
        }

        while let Some(size) = uneven_smallest(&placed) {
            tracing::debug!(font_size = size, "re-fitting regions at a uniform size");
            placed = regions
                .iter()
                .map(|r| {
                    let capped = Region {
                        range: FontRange::new(size, r.range.min.min(size)),
                        ..r.clone()
                    };
                    self.fit_region(&capped, title)
                })
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(placed)
    }
}

/// Smallest chosen font size, if the fitted regions disagree.
fn uneven_smallest(placed: &[PlacedText]) -> Option<u32> {
    let mut sizes = placed.iter().filter_map(|p| p.layout.as_ref()).map(|l| l.font_size);
    let first = sizes.next()?;
    let (min, max) = sizes.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    (min != max).then_some(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Align, FontSet, SymbolRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_segments_exact() {
        assert_eq!(
            split_segments("One.{end}Two.{END} Three.", 3),
            vec!["One.", "Two.", "Three."]
        );
    }

    #[test]
    fn test_split_segments_missing_are_empty() {
        assert_eq!(split_segments("Only one.", 3), vec!["Only one.", "", ""]);
    }

    #[test]
    fn test_split_segments_surplus_joined() {
        assert_eq!(
            split_segments("a{end}b{end}c{end}d", 2),
            vec!["a", "b{lns}c{lns}d"]
        );
        assert_eq!(split_segments("a{end}b{end}c", 0).len(), 3);
    }

    #[test]
    fn test_distribute_blends_need_with_equal_split() {
        // need 300 vs 100 of 800px: 0.5 * 600 + 200 = 500, 0.5 * 200 + 200 = 300
        assert_eq!(distribute(&[300, 100], 800, 0.5), vec![500, 300]);
        assert_eq!(distribute(&[300, 100], 800, 0.0), vec![400, 400]);
        assert_eq!(distribute(&[300, 100], 800, 1.0), vec![600, 200]);
    }

    #[test]
    fn test_distribute_sums_to_total() {
        let shares = distribute(&[7, 13, 29], 1000, 0.5);
        assert_eq!(shares.iter().sum::<u32>(), 1000);
        assert_eq!(distribute(&[0, 0, 0], 900, 0.5), vec![300, 300, 300]);
        assert!(distribute(&[], 900, 0.5).is_empty());
    }

    #[test]
    fn test_roman() {
        assert_eq!(roman(1), "I");
        assert_eq!(roman(4), "IV");
        assert_eq!(roman(9), "IX");
        assert_eq!(roman(14), "XIV");
    }

    fn dispatch(card: &CardMetadata, layout: &str) -> Result<Vec<PlacedText>> {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let config = CardLayoutConfig::for_layout(layout).unwrap();
        Dispatcher::new(Typesetter::new(&fonts, &symbols)).layout(config, card)
    }

    #[test]
    fn test_single_region_uses_power_toughness_neighbour() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let dispatcher = Dispatcher::new(Typesetter::new(&fonts, &symbols));
        let config = CardLayoutConfig::for_layout("regular").unwrap();

        let creature = CardMetadata::new().with("rules_text", "Flying").with("power", "2");
        let regions = dispatcher.regions(config, &creature);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].options.neighbour, config.power_toughness.map(|b| b.rect));

        let spell = CardMetadata::new().with("rules_text", "Draw a card.");
        assert_eq!(dispatcher.regions(config, &spell)[0].options.neighbour, None);
    }

    #[test]
    fn test_saga_missing_chapters_render_empty() {
        let card = CardMetadata::new()
            .with("title", "The Eldest Reborn")
            .with("rules_text", "Each opponent sacrifices a creature.{end}Each opponent discards a card.");
        let placed = dispatch(&card, "saga").unwrap();
        assert_eq!(placed.len(), 3);
        assert!(placed[0].layout.is_some());
        assert!(placed[1].layout.is_some());
        assert!(placed[2].layout.is_none());
        assert_eq!(placed[2].label, "chapter 3");
    }

    #[test]
    fn test_saga_chapter_count_field() {
        let card = CardMetadata::new()
            .with("chapter_count", "4")
            .with("rules_text", "a{end}b{end}c{end}d");
        let placed = dispatch(&card, "saga").unwrap();
        assert_eq!(placed.len(), 4);
    }

    #[test]
    fn test_stacked_regions_fill_box_and_favour_long_text() {
        let fonts = FontSet::blocks();
        let symbols = SymbolRegistry::builtin();
        let dispatcher = Dispatcher::new(Typesetter::new(&fonts, &symbols));
        let config = CardLayoutConfig::for_layout("saga").unwrap();
        let card = CardMetadata::new().with(
            "rules_text",
            "Short.{end}This chapter has quite a lot more text than the others, so it \
             should receive a larger share of the box.{end}Short.",
        );

        let regions = dispatcher.regions(config, &card);
        let total: u32 = regions.iter().map(|r| r.rect.height).sum();
        assert_eq!(total, config.rules.rect.height);
        assert!(regions[1].rect.height > regions[0].rect.height);
        assert_eq!(regions[1].rect.y, regions[0].rect.bottom());
    }

    #[test]
    fn test_uniform_font_size() {
        let card = CardMetadata::new().with(
            "rules_text",
            "Short.{end}Much longer chapter text that wraps onto several lines and \
             therefore needs a smaller font size than the first chapter does, \
             especially once it keeps going for a while.{end}Mid-length chapter text.",
        );
        let placed = dispatch(&card, "saga").unwrap();
        let sizes: Vec<u32> = placed.iter().filter_map(|p| p.layout.as_ref()).map(|l| l.font_size).collect();
        assert_eq!(sizes.len(), 3);
        assert!(sizes.iter().all(|s| *s == sizes[0]), "{:?}", sizes);
    }

    #[test]
    fn test_saga_chapter_count_bounded_by_segments() {
        let card = CardMetadata::new()
            .with("chapter_count", "4000000000")
            .with("rules_text", "a{end}b{end}c{end}d{end}e");
        let placed = dispatch(&card, "saga").unwrap();
        assert_eq!(placed.len(), 5);

        let short = CardMetadata::new()
            .with("chapter_count", "18446744073709551615")
            .with("rules_text", "a");
        assert_eq!(dispatch(&short, "saga").unwrap().len(), 3);
    }

    #[test]
    fn test_stacked_count_caps_chapters() {
        let config = CardLayoutConfig::for_layout("saga").unwrap();
        let card = CardMetadata::new()
            .with("chapter_count", "99")
            .with("rules_text", "a{END}b");
        assert_eq!(Dispatcher::stacked_count(config, &card, 3), 3);
        assert_eq!(segment_count("a{END}b{end}c"), 3);
        assert_eq!(segment_count(""), 1);
    }

    #[test]
    fn test_uneven_smallest() {
        let at = |size: u32| PlacedText {
            label: String::new(),
            rect: Rect::new(0, 0, 10, 10),
            layout: Some(Layout {
                blocks: Vec::new(),
                font_size: size,
                margin: 0,
                content_height: 0,
                usable_height: 10,
                width: 10,
                height: 10,
                divider_height: 0,
                align: Align::Left,
            }),
        };
        let empty = PlacedText { layout: None, ..at(0) };
        assert_eq!(uneven_smallest(&[at(40), at(32), empty]), Some(32));
        assert_eq!(uneven_smallest(&[at(32), at(32)]), None);
        assert_eq!(uneven_smallest(&[]), None);
    }

    #[test]
    fn test_planeswalker_uniform_size_with_loyalty() {
        let texts = [
            "Draw a card.{end}Target player mills two cards.{end}You get an emblem with \"Whenever you cast a spell, \
             target opponent mills five cards and you gain life equal to their total mana value.\"",
            "Scry 1.{end}{T}: Add {G}{G}.{end}Creatures you control get +3/+3 and gain trample, vigilance, \
             reach and hexproof until end of turn. Untap them. They fight up to one target creature each.",
            "Gain 2 life.{end}Deal 4 damage to target creature or planeswalker. If it would die, exile it instead.",
        ];
        for text in texts {
            let card = CardMetadata::new()
                .with("loyalty", "5")
                .with("rules_text", text);
            let placed = dispatch(&card, "planeswalker").unwrap();
            assert_eq!(uneven_smallest(&placed), None, "{}", text);
            let sizes: Vec<u32> = placed.iter().filter_map(|p| p.layout.as_ref()).map(|l| l.font_size).collect();
            assert!(sizes.iter().all(|s| *s == sizes[0]), "{:?}", sizes);
        }
    }

    #[test]
    fn test_planeswalker_counts_abilities() {
        let card = CardMetadata::new()
            .with("ability_costs", vec!["+1".to_string(), "-3".to_string()])
            .with("rules_text", "Scry 1.{end}Deal 3 damage to any target.");
        let placed = dispatch(&card, "planeswalker").unwrap();
        let labels: Vec<_> = placed.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["ability 1", "ability 2"]);
    }

    #[test]
    fn test_split_columns() {
        let card = CardMetadata::new().with("rules_text", "Deal 3 damage.{end}Gain 3 life.");
        let placed = dispatch(&card, "split").unwrap();
        assert_eq!(placed.len(), 2);
        assert!(placed[1].rect.x > placed[0].rect.right());
        assert_eq!(placed[0].rect.y, placed[1].rect.y);
    }

    #[test]
    fn test_adventure_regions() {
        let card = CardMetadata::new().with("rules_text", "Flying{end}Destroy target artifact.");
        let placed = dispatch(&card, "adventure").unwrap();
        let labels: Vec<_> = placed.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["rules", "adventure"]);
        assert!(placed[1].rect.x < placed[0].rect.x);
    }

    #[test]
    fn test_overflow_names_region() {
        let long = "word ".repeat(2000);
        let card = CardMetadata::new().with("rules_text", long.as_str());
        let err = dispatch(&card, "regular").unwrap_err();
        assert!(err.is_overflow());
        match err {
            CardError::ContentOverflow { region, .. } => assert_eq!(region, "rules"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
