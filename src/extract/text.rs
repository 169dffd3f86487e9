//! Non-mutating text rendering over a parsed document
//!
//! The parsed tree is never modified. Boilerplate is removed by skipping
//! subtrees during rendering instead of deleting nodes.

use scraper::node::Node;
use scraper::ElementRef;

/// Elements removed from a content region before its text is taken
pub(crate) const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav"];

/// Elements ending with a line break when rendered
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "table", "tr", "td", "li", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Elements whose text is never part of the rendered page
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "template"];

/// Renders `root` with line structure
///
/// `<br>` becomes a newline and every block element below `root` is followed
/// by one. `root` itself gets no trailing newline. Subtrees in
/// `STRIPPED_TAGS` and comments are skipped. Entities are left decoded as the
/// parser produced them; call `normalize_text` afterwards.
pub fn block_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_block(root, &mut out);
    out
}

fn render_block(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if STRIPPED_TAGS.contains(&name) || NON_RENDERED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    render_block(child_element, out);
                }
                if BLOCK_TAGS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Concatenated visible text of `element`, with no structure added
pub fn plain_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for piece in visible_strings(element) {
        out.push_str(piece);
    }
    out
}

/// Length in characters of the visible text with each string trimmed and
/// empty strings dropped, joined by single spaces
pub fn rendered_len(element: ElementRef<'_>) -> usize {
    let mut pieces: usize = 0;
    let mut chars: usize = 0;
    for piece in visible_strings(element) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        pieces += 1;
        chars += piece.chars().count();
    }
    chars + pieces.saturating_sub(1)
}

/// Text nodes below `element` in document order, outside script and style
fn visible_strings(element: ElementRef<'_>) -> Vec<&str> {
    let mut pieces = Vec::new();
    collect_strings(element, &mut pieces);
    pieces
}

fn collect_strings<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(el) if !NON_RENDERED_TAGS.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_strings(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

/// Returns true if `element` or one of its ancestors below `region` would be
/// stripped from the region
pub fn is_stripped_within(element: ElementRef<'_>, region: ElementRef<'_>) -> bool {
    let region_id = (*region).id();
    if (*element).id() == region_id {
        return false;
    }
    if STRIPPED_TAGS.contains(&element.value().name()) {
        return true;
    }

    for ancestor in element.ancestors() {
        if ancestor.id() == region_id {
            return false;
        }
        if let Some(el) = ancestor.value().as_element() {
            if STRIPPED_TAGS.contains(&el.name()) {
                return true;
            }
        }
    }
    false
}

/// Normalizes whitespace and decodes HTML entities
///
/// Each line is trimmed, runs of three or more newlines collapse to a single
/// blank line and the result is trimmed.
pub fn normalize_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let unified = decoded.replace("\r\n", "\n");

    let joined = unified
        .split(is_line_break)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::with_capacity(joined.len());
    let mut newlines = 0;
    for c in joined.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }

    out.trim().to_string()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
