//! Placeholder tokenizer.
//!
//! Rules text uses `{...}` for everything that is not literal text:
//!
//! - `{i}`, `{/i}` (or `{\i}`) toggle italics
//! - `{bullet}` starts a bulleted paragraph with a hanging indent
//! - `{lns}` (or a literal newline) forces a line break
//! - `{flavor}` starts flavor text, `{divider}` a new rules section
//! - `{cardname}` and `{-}` are substituted before anything else
//! - anything else is a symbol, resolved at render time
//!
//! Substitution runs once as a pre-pass and never produces new placeholders,
//! so tokenizing is a single pass over the raw string.

use super::font::FontStyle;

/// Em dash inserted for `{-}`.
pub const EM_DASH: char = '\u{2014}';

/// Glyph drawn for `{bullet}`, followed by a space.
pub const BULLET: &str = "\u{2022} ";

/// Italic switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    ItalicOn,
    ItalicOff,
}

/// What starts a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Flavor text: italic, preceded by the divider glyph.
    Flavor,
    /// Another rules section, preceded by the divider glyph.
    Divider,
}

/// A piece of tokenized or wrapped rules text.
///
/// The tokenizer emits `Text`, `Symbol`, `Format`, `Bullet`, `NewlineMarker`
/// and `SectionBreak`. Styles on tokenizer output are placeholders; the
/// wrapper applies `Format` directives and assigns the effective style. Lines
/// produced by the wrapper hold only `Text`, `Symbol`, `Bullet` and `Indent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text { value: String, style: FontStyle },
    Symbol { token: String, style: FontStyle },
    Format(Directive),
    Bullet { style: FontStyle },
    Indent(f32),
    NewlineMarker,
    SectionBreak(SectionKind),
}

impl Fragment {
    pub fn text(value: impl Into<String>) -> Self {
        Fragment::Text {
            value: value.into(),
            style: FontStyle::Regular,
        }
    }

    pub fn symbol(token: impl Into<String>) -> Self {
        Fragment::Symbol {
            token: token.into(),
            style: FontStyle::Regular,
        }
    }
}

/// Kind of a block of rules text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Rules,
    Flavor,
}

impl BlockKind {
    /// Style that unformatted text in this block uses.
    pub fn base_style(self) -> FontStyle {
        match self {
            BlockKind::Rules => FontStyle::Regular,
            BlockKind::Flavor => FontStyle::Italic,
        }
    }
}

/// Tokenized text of one block, before wrapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBlock {
    pub fragments: Vec<Fragment>,
    pub kind: BlockKind,
    pub divider_before: bool,
}

impl RawBlock {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Replace `{cardname}` and `{-}`.
///
/// Only the first line of the title is used, and braces are stripped from it
/// so the substitution cannot introduce placeholders.
pub fn substitute(raw: &str, title: Option<&str>) -> String {
    let name: String = title
        .and_then(|t| t.lines().next())
        .unwrap_or("")
        .trim()
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect();

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let inner = &after[..close];
        if inner.contains('{') {
            // Stray brace; a later one may still open a placeholder.
            out.push('{');
            rest = after;
            continue;
        }
        if inner.eq_ignore_ascii_case("cardname") {
            out.push_str(&name);
        } else if inner == "-" {
            out.push(EM_DASH);
        } else {
            out.push_str(&rest[open..open + close + 2]);
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Tokenize raw rules text into fragments.
pub fn tokenize(raw: &str, title: Option<&str>) -> Vec<Fragment> {
    let text = substitute(raw, title);
    let mut fragments = Vec::new();
    let mut literal = String::new();
    let mut rest = text.as_str();

    while let Some(pos) = rest.find(['{', '\n', '\r']) {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("\r\n").or_else(|| tail.strip_prefix('\n')) {
            flush_text(&mut literal, &mut fragments);
            fragments.push(Fragment::NewlineMarker);
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix('\r') {
            rest = after;
            continue;
        }

        // tail starts with '{'
        let after = &tail[1..];
        let inner_end = after.find('}');
        match inner_end {
            Some(end) if !after[..end].contains('{') && !after[..end].is_empty() => {
                flush_text(&mut literal, &mut fragments);
                fragments.push(classify(&after[..end]));
                rest = &after[end + 1..];
            }
            _ => {
                literal.push('{');
                rest = after;
            }
        }
    }
    literal.push_str(rest);
    flush_text(&mut literal, &mut fragments);

    fragments
}

/// Classify the contents of a `{...}` placeholder.
fn classify(inner: &str) -> Fragment {
    let token = inner.trim().to_lowercase();
    match token.as_str() {
        "i" => Fragment::Format(Directive::ItalicOn),
        "/i" | "\\i" => Fragment::Format(Directive::ItalicOff),
        "bullet" => Fragment::Bullet {
            style: FontStyle::Regular,
        },
        "lns" => Fragment::NewlineMarker,
        "flavor" => Fragment::SectionBreak(SectionKind::Flavor),
        "divider" | "end" => Fragment::SectionBreak(SectionKind::Divider),
        _ => Fragment::Symbol {
            token,
            style: FontStyle::Regular,
        },
    }
}

fn flush_text(literal: &mut String, fragments: &mut Vec<Fragment>) {
    if !literal.is_empty() {
        fragments.push(Fragment::text(std::mem::take(literal)));
    }
}

/// Split fragments into blocks at section breaks.
///
/// The first block always exists, even when the text starts with a break.
pub fn split_blocks(fragments: Vec<Fragment>) -> Vec<RawBlock> {
    let mut blocks = vec![RawBlock::default()];

    for fragment in fragments {
        match fragment {
            Fragment::SectionBreak(kind) => blocks.push(RawBlock {
                fragments: Vec::new(),
                kind: match kind {
                    SectionKind::Flavor => BlockKind::Flavor,
                    SectionKind::Divider => BlockKind::Rules,
                },
                divider_before: true,
            }),
            other => {
                if let Some(block) = blocks.last_mut() {
                    block.fragments.push(other);
                }
            }
        }
    }

    blocks
}

/// Tokenize and split in one step.
pub fn parse_blocks(raw: &str, title: Option<&str>) -> Vec<RawBlock> {
    split_blocks(tokenize(raw, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_symbol_in_text() {
        assert_eq!(
            tokenize("Add {R}.", None),
            vec![Fragment::text("Add "), Fragment::symbol("r"), Fragment::text(".")]
        );
    }

    #[test]
    fn test_format_directives() {
        assert_eq!(
            tokenize("{i}Hexproof{/i} and {I}more{\\i}", None),
            vec![
                Fragment::Format(Directive::ItalicOn),
                Fragment::text("Hexproof"),
                Fragment::Format(Directive::ItalicOff),
                Fragment::text(" and "),
                Fragment::Format(Directive::ItalicOn),
                Fragment::text("more"),
                Fragment::Format(Directive::ItalicOff),
            ]
        );
    }

    #[test]
    fn test_line_breaks_and_bullets() {
        assert_eq!(
            tokenize("Choose one {-}{lns}{bullet}Draw.\nDiscard.", None),
            vec![
                Fragment::text("Choose one \u{2014}"),
                Fragment::NewlineMarker,
                Fragment::Bullet { style: FontStyle::Regular },
                Fragment::text("Draw."),
                Fragment::NewlineMarker,
                Fragment::text("Discard."),
            ]
        );
    }

    #[test]
    fn test_cardname_substitution() {
        let fragments = tokenize("When {CardName} enters, draw.", Some("Elvish Visionary\nalt"));
        assert_eq!(fragments, vec![Fragment::text("When Elvish Visionary enters, draw.")]);
    }

    #[test]
    fn test_substitution_cannot_introduce_placeholders() {
        let fragments = tokenize("{cardname}", Some("Mox {W}"));
        assert_eq!(fragments, vec![Fragment::text("Mox W")]);
    }

    #[test]
    fn test_substitution_after_stray_brace() {
        assert_eq!(substitute("Pay { {cardname}", Some("Opt")), "Pay { Opt");
        assert_eq!(substitute("{{-}}", None), "{\u{2014}}");
        assert_eq!(
            tokenize("Pay { {cardname}", Some("Opt")),
            vec![Fragment::text("Pay { Opt")]
        );
    }

    #[test]
    fn test_unknown_and_unterminated() {
        assert_eq!(
            tokenize("{xyz} then {2", None),
            vec![Fragment::symbol("xyz"), Fragment::text(" then {2")]
        );
        assert_eq!(tokenize("a{}b", None), vec![Fragment::text("a{}b")]);
        assert_eq!(
            tokenize("{a{b}", None),
            vec![Fragment::text("{a"), Fragment::symbol("b")]
        );
    }

    #[test]
    fn test_rendered_placeholders_stay_literal() {
        // "[xyz]" is what an unresolved symbol looks like once drawn.
        let once = tokenize("Pay [xyz] and [w].", None);
        assert_eq!(once, vec![Fragment::text("Pay [xyz] and [w].")]);
        let Fragment::Text { value, .. } = &once[0] else {
            panic!("expected text");
        };
        assert_eq!(tokenize(value, None), once);
    }

    #[test]
    fn test_flavor_split() {
        let blocks = parse_blocks("{flavor}Flavor text here", None);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_empty());
        assert_eq!(blocks[0].kind, BlockKind::Rules);
        assert!(!blocks[0].divider_before);
        assert_eq!(blocks[1].kind, BlockKind::Flavor);
        assert!(blocks[1].divider_before);
        assert_eq!(blocks[1].fragments, vec![Fragment::text("Flavor text here")]);
        assert_eq!(blocks[1].kind.base_style(), FontStyle::Italic);
    }

    #[test]
    fn test_divider_split() {
        let blocks = parse_blocks("Flying{divider}Vigilance{flavor}Quiet.", None);
        let kinds: Vec<_> = blocks.iter().map(|b| (b.kind, b.divider_before)).collect();
        assert_eq!(
            kinds,
            vec![
                (BlockKind::Rules, false),
                (BlockKind::Rules, true),
                (BlockKind::Flavor, true),
            ]
        );
    }
}
