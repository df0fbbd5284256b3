//! Greedy word/symbol wrapper.
//!
//! Packs fragments into lines left to right without backtracking. Words are
//! atomic unless a word cannot fit on an empty line, in which case it is
//! broken between characters. Symbols are always atomic.

use super::font::{FontSet, FontStyle};
use super::symbols::SymbolRegistry;
use super::tokenizer::{Directive, Fragment, BULLET};

/// Space after each inline symbol, as a fraction of the font size.
pub const SYMBOL_GAP_RATIO: f32 = 0.1;

/// Measuring context for one candidate font size.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics<'a> {
    pub fonts: &'a FontSet,
    pub symbols: &'a SymbolRegistry,
    pub font_size: f32,
}

impl<'a> TextMetrics<'a> {
    pub fn new(fonts: &'a FontSet, symbols: &'a SymbolRegistry, font_size: f32) -> Self {
        Self {
            fonts,
            symbols,
            font_size,
        }
    }

    pub fn text_width(&self, text: &str, style: FontStyle) -> f32 {
        self.fonts.face(style).text_width(text, self.font_size)
    }

    pub fn char_width(&self, ch: char, style: FontStyle) -> f32 {
        self.fonts.face(style).advance(ch, self.font_size)
    }

    /// Drawn width of a symbol. Unknown tokens measure as their `[token]`
    /// placeholder text.
    pub fn symbol_width(&self, token: &str, style: FontStyle) -> f32 {
        match self.symbols.lookup(token) {
            Some(symbol) => symbol.extent(self.font_size).0 as f32,
            None => self.text_width(&placeholder(token), style),
        }
    }

    pub fn symbol_gap(&self) -> f32 {
        (self.font_size * SYMBOL_GAP_RATIO).round()
    }

    pub fn bullet_width(&self, style: FontStyle) -> f32 {
        self.text_width(BULLET, style)
    }
}

/// Text drawn in place of an unresolved symbol.
pub fn placeholder(token: &str) -> String {
    format!("[{}]", token)
}

/// Whether a line holds text or is an explicit blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Blank,
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    /// Visible width, excluding trailing whitespace and symbol gaps.
    pub width: f32,
    pub kind: LineKind,
}

impl Line {
    fn blank() -> Self {
        Self {
            fragments: Vec::new(),
            width: 0.0,
            kind: LineKind::Blank,
        }
    }

    /// Concatenated text content, with symbols as `{token}`. Handy in tests
    /// and debug logs.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text { value, .. } => out.push_str(value),
                Fragment::Symbol { token, .. } => {
                    out.push('{');
                    out.push_str(token);
                    out.push('}');
                }
                Fragment::Bullet { .. } => out.push_str(BULLET),
                _ => {}
            }
        }
        out
    }
}

/// Line under construction.
struct LineBuilder {
    fragments: Vec<Fragment>,
    cursor: f32,
    visible: f32,
    has_content: bool,
}

impl LineBuilder {
    fn new(indent: f32) -> Self {
        let mut fragments = Vec::new();
        if indent > 0.0 {
            fragments.push(Fragment::Indent(indent));
        }
        Self {
            fragments,
            cursor: indent,
            visible: indent,
            has_content: false,
        }
    }

    fn is_empty(&self) -> bool {
        !self.has_content
    }

    fn push_text(&mut self, value: String, style: FontStyle, width: f32, whitespace: bool) {
        self.fragments.push(Fragment::Text { value, style });
        self.cursor += width;
        if !whitespace {
            self.visible = self.cursor;
        }
        self.has_content = true;
    }

    fn push_atom(&mut self, fragment: Fragment, width: f32, gap: f32) {
        self.fragments.push(fragment);
        self.visible = self.cursor + width;
        self.cursor = self.visible + gap;
        self.has_content = true;
    }

    fn finish(self) -> Line {
        Line {
            fragments: self.fragments,
            width: self.visible,
            kind: LineKind::Normal,
        }
    }
}

/// Wrapper state across fragments.
struct Wrapper<'a> {
    metrics: TextMetrics<'a>,
    max_width: f32,
    lines: Vec<Line>,
    line: LineBuilder,
    indent: f32,
}

impl<'a> Wrapper<'a> {
    fn fits(&self, width: f32) -> bool {
        self.line.cursor + width <= self.max_width
    }

    /// Break caused by running out of width; keeps the hanging indent.
    fn wrap_line(&mut self) {
        let next = LineBuilder::new(self.indent);
        let done = std::mem::replace(&mut self.line, next);
        self.lines.push(done.finish());
    }

    /// Break requested by the text itself; resets the indent. An empty
    /// buffer still produces a blank line.
    fn explicit_break(&mut self) {
        self.indent = 0.0;
        let next = LineBuilder::new(0.0);
        let done = std::mem::replace(&mut self.line, next);
        if done.is_empty() {
            self.lines.push(Line::blank());
        } else {
            self.lines.push(done.finish());
        }
    }

    fn place_whitespace(&mut self, token: &str, style: FontStyle) {
        if self.line.is_empty() {
            return;
        }
        let width = self.metrics.text_width(token, style);
        if self.fits(width) {
            self.line.push_text(token.to_string(), style, width, true);
        } else {
            self.wrap_line();
        }
    }

    fn place_word(&mut self, token: &str, style: FontStyle) {
        let width = self.metrics.text_width(token, style);
        if self.fits(width) {
            self.line.push_text(token.to_string(), style, width, false);
            return;
        }
        if !self.line.is_empty() {
            self.wrap_line();
            if self.fits(width) {
                self.line.push_text(token.to_string(), style, width, false);
                return;
            }
        }
        self.place_characters(token, style);
    }

    /// Fallback for words wider than an empty line.
    fn place_characters(&mut self, token: &str, style: FontStyle) {
        let mut piece = String::new();
        let mut piece_width = 0.0;

        for ch in token.chars() {
            let width = self.metrics.char_width(ch, style);
            let overflow = self.line.cursor + piece_width + width > self.max_width;
            if overflow && (!piece.is_empty() || !self.line.is_empty()) {
                if !piece.is_empty() {
                    self.line
                        .push_text(std::mem::take(&mut piece), style, piece_width, false);
                }
                self.wrap_line();
                piece_width = 0.0;
            }
            piece.push(ch);
            piece_width += width;
        }

        if !piece.is_empty() {
            self.line.push_text(piece, style, piece_width, false);
        }
    }

    fn place_atom(&mut self, fragment: Fragment, width: f32, gap: f32) {
        if !self.fits(width + gap) && !self.line.is_empty() {
            self.wrap_line();
        }
        self.line.push_atom(fragment, width, gap);
    }

    fn finish(mut self) -> Vec<Line> {
        if !self.line.is_empty() {
            self.lines.push(self.line.finish());
        }
        self.lines
    }
}

/// Wrap fragments into lines no wider than `max_width`.
///
/// `base` is the block's unformatted style; `{i}` switches to the other style
/// so emphasis inside flavor text comes out roman.
pub fn wrap(
    fragments: &[Fragment],
    max_width: f32,
    metrics: TextMetrics<'_>,
    base: FontStyle,
) -> Vec<Line> {
    let mut wrapper = Wrapper {
        metrics,
        max_width,
        lines: Vec::new(),
        line: LineBuilder::new(0.0),
        indent: 0.0,
    };
    let mut emphasis = false;

    for fragment in fragments {
        let style = if emphasis { base.toggled() } else { base };

        match fragment {
            Fragment::Format(Directive::ItalicOn) => emphasis = true,
            Fragment::Format(Directive::ItalicOff) => emphasis = false,
            Fragment::Text { value, .. } => {
                for token in split_words(value) {
                    if token.chars().all(char::is_whitespace) {
                        wrapper.place_whitespace(token, style);
                    } else {
                        wrapper.place_word(token, style);
                    }
                }
            }
            Fragment::Symbol { token, .. } => {
                let width = metrics.symbol_width(token, style);
                let symbol = Fragment::Symbol {
                    token: token.clone(),
                    style,
                };
                wrapper.place_atom(symbol, width, metrics.symbol_gap());
            }
            Fragment::Bullet { .. } => {
                let width = metrics.bullet_width(style);
                wrapper.place_atom(Fragment::Bullet { style }, width, 0.0);
                wrapper.indent = wrapper.line.cursor;
            }
            Fragment::Indent(width) => {
                wrapper.line.cursor += width;
                wrapper.line.visible = wrapper.line.cursor;
                wrapper.line.fragments.push(Fragment::Indent(*width));
            }
            Fragment::NewlineMarker | Fragment::SectionBreak(_) => wrapper.explicit_break(),
        }
    }

    wrapper.finish()
}

/// Split text into alternating word and whitespace runs.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
