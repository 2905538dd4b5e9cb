//! Inline markup for text content.
//!
//! Two stages run in a fixed order:
//!
//! ```text
//! raw text ──► highlight stage ──► escaped HTML ──► quote stage ──► HTML
//!              **word** spans                        «…» / "…" callouts
//!              (only escaping)                       (no re-escaping)
//! ```
//!
//! The highlight stage is the only place literal text is escaped. The quote
//! stage operates on its output, so a straight double quote is matched in
//! its escaped form `&quot;`.

use carousel_core::HighlightMode;

/// Highlight color used when the element does not set one.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#ffeb3b";

const HIGHLIGHT_MARKER: &str = "**";
const ESCAPED_QUOTE: &str = "&quot;";

/// A piece of raw text produced by the highlight tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text.
    Plain(&'a str),
    /// Text that was enclosed in `**` markers.
    Highlight(&'a str),
}

impl<'a> Segment<'a> {
    /// Text of the segment without markers.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match self {
            Self::Plain(text) | Self::Highlight(text) => text,
        }
    }
}

/// Resolved colors and sizes used when rendering markup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupStyle {
    /// Highlight color.
    pub highlight_color: String,
    /// Background or text highlighting.
    pub highlight_mode: HighlightMode,
    /// Horizontal padding of background highlights.
    pub highlight_padding: f32,
    /// Corner radius of background highlights.
    pub highlight_radius: f32,
    /// Left border color of quote callouts.
    pub quote_border_color: String,
    /// Left border width of quote callouts.
    pub quote_border_width: f32,
    /// Background of quote callouts.
    pub quote_background_color: String,
    /// Inner padding of quote callouts.
    pub quote_padding: f32,
}

impl Default for MarkupStyle {
    fn default() -> Self {
        Self {
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            highlight_mode: HighlightMode::Background,
            highlight_padding: 4.0,
            highlight_radius: 4.0,
            quote_border_color: "#7e3af2".to_string(),
            quote_border_width: 4.0,
            quote_background_color: "rgba(126, 58, 242, 0.12)".to_string(),
            quote_padding: 8.0,
        }
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for a double-quoted attribute. Single quotes are kept so CSS
/// font stacks stay readable. Quote delimiters become numeric references so
/// the quote stage never matches inside an attribute.
#[must_use]
pub fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '«' => out.push_str("&#171;"),
            '»' => out.push_str("&#187;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Find a span `open … close` at the start of `text`.
///
/// The enclosed text must be non-empty and must not cross a line break.
/// Returns the enclosed text and the total length consumed.
fn delimited<'a>(text: &'a str, open: &str, close: &str) -> Option<(&'a str, usize)> {
    let body = text.strip_prefix(open)?;
    let first = body.chars().next().filter(|&c| c != '\n')?;
    let search_from = first.len_utf8();
    let end = search_from + body[search_from..].find(close)?;
    let inner = &body[..end];
    if inner.contains('\n') {
        return None;
    }
    Some((inner, open.len() + end + close.len()))
}

/// Split raw text into plain and highlighted segments.
///
/// An opening `**` without a matching close on the same line is literal.
#[must_use]
pub fn tokenize_highlights(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(HIGHLIGHT_MARKER) {
        let at = pos + offset;
        match delimited(&text[at..], HIGHLIGHT_MARKER, HIGHLIGHT_MARKER) {
            Some((inner, consumed)) => {
                if plain_start < at {
                    segments.push(Segment::Plain(&text[plain_start..at]));
                }
                segments.push(Segment::Highlight(inner));
                pos = at + consumed;
                plain_start = pos;
            }
            // Retry one character later so `***x**` highlights `*x`.
            None => pos = at + 1,
        }
    }
    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

/// Stage one: escape literal text and wrap highlight spans.
#[must_use]
pub fn render_highlights(text: &str, style: &MarkupStyle) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for segment in tokenize_highlights(text) {
        match segment {
            Segment::Plain(plain) => out.push_str(&escape_html(plain)),
            Segment::Highlight(inner) => {
                let span_style = match style.highlight_mode {
                    HighlightMode::Background => format!(
                        "background-color: {}; padding: 0 {}px; border-radius: {}px; \
                         box-decoration-break: clone; -webkit-box-decoration-break: clone;",
                        style.highlight_color, style.highlight_padding, style.highlight_radius
                    ),
                    HighlightMode::Text => {
                        format!("color: {}; font-weight: 700;", style.highlight_color)
                    }
                };
                out.push_str("<span class=\"highlight\" style=\"");
                out.push_str(&escape_attribute(&span_style));
                out.push_str("\">");
                out.push_str(&escape_html(inner));
                out.push_str("</span>");
            }
        }
    }
    out
}

/// Stage two: turn `«…»` and `&quot;…&quot;` spans of already escaped HTML
/// into block callouts. The delimiters themselves are dropped.
#[must_use]
pub fn render_quotes(html: &str, style: &MarkupStyle) -> String {
    let callout_style = format!(
        "display: block; border-left: {}px solid {}; background: {}; padding: {}px;",
        style.quote_border_width,
        style.quote_border_color,
        style.quote_background_color,
        style.quote_padding
    );
    let callout_open = format!(
        "<span class=\"quote\" style=\"{}\">",
        escape_attribute(&callout_style)
    );

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(ch) = rest.chars().next() {
        let span = delimited(rest, "«", "»").or_else(|| delimited(rest, ESCAPED_QUOTE, ESCAPED_QUOTE));
        if let Some((inner, consumed)) = span {
            out.push_str(&callout_open);
            out.push_str(inner);
            out.push_str("</span>");
            rest = &rest[consumed..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Render raw text through both stages.
#[must_use]
pub fn render_markup(text: &str, style: &MarkupStyle) -> String {
    render_quotes(&render_highlights(text, style), style)
}

/// A run of displayed text as laid out by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Text flowing in the element's own lines.
    Inline(String),
    /// Text of a quote callout, which always sits on its own lines.
    Callout(String),
}

impl Block {
    /// Displayed text of the block.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Inline(text) | Self::Callout(text) => text,
        }
    }
}

/// Text as it is displayed, split at callout boundaries, with highlight
/// markers and quote delimiters removed. Used for measurement.
#[must_use]
pub fn display_blocks(text: &str) -> Vec<Block> {
    let joined: String = tokenize_highlights(text)
        .iter()
        .map(Segment::text)
        .collect();

    let mut blocks = Vec::new();
    let mut inline = String::new();
    let mut rest = joined.as_str();
    while let Some(ch) = rest.chars().next() {
        let span = delimited(rest, "«", "»").or_else(|| delimited(rest, "\"", "\""));
        if let Some((inner, consumed)) = span {
            if !inline.is_empty() {
                blocks.push(Block::Inline(std::mem::take(&mut inline)));
            }
            blocks.push(Block::Callout(inner.to_string()));
            rest = &rest[consumed..];
        } else {
            inline.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    if !inline.is_empty() || blocks.is_empty() {
        blocks.push(Block::Inline(inline));
    }
    blocks
}
