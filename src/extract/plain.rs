use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};
use unicode_normalization::UnicodeNormalization;

/// Class names marking navigation and menu containers
const MENU_CLASSES: &[&str] = &[
    "nav",
    "navigation",
    "navbar",
    "menu",
    "sidebar",
    "header",
    "footer",
];

/// Elements dropped together with their content
const DROPPED_TAGS: &[&str] = &["script", "style", "img"];

/// Extracts whole-document text for plain link-following pages
///
/// Script, style and image elements are dropped, anchors contribute their
/// text, and any element carrying one of the menu classes is removed with
/// its content. The remaining text is entity-decoded, NFKC-normalized and
/// collapsed to single spaces.
///
/// # Example
///
/// ```
/// use canton_crawler::extract_plain_text;
///
/// let html = r#"<nav class="menu"><a href="/">Home</a></nav><h1>Title</h1><p>Paragraph <a href="link">link</a></p><script>ignored()</script>"#;
/// assert_eq!(extract_plain_text(html), "Title Paragraph link");
/// ```
pub fn extract_plain_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut pieces = Vec::new();
    let root = document.root_element();
    if !is_dropped(root.value()) {
        collect_text(root, &mut pieces);
    }

    let joined = pieces.join(" ");
    let decoded = html_escape::decode_html_entities(&joined);
    let normalized: String = decoded.nfkc().collect();

    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(el) if !is_dropped(el) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

fn is_dropped(element: &Element) -> bool {
    let name = element.name();
    if DROPPED_TAGS.contains(&name) {
        return true;
    }
    // anchors are unwrapped before menus are matched, so their classes never count
    name != "a" && element.classes().any(|class| MENU_CLASSES.contains(&class))
}
