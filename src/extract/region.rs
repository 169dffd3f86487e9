use crate::extract::text::rendered_len;
use crate::extract::Fallback;
use scraper::{ElementRef, Html, Selector};

/// A way of locating the main content region
type RegionStrategy = for<'a> fn(&'a Html) -> Option<(ElementRef<'a>, Fallback)>;

/// Strategies in priority order; the first one that matches wins
const STRATEGIES: &[RegionStrategy] = &[contenido_table, news_body, novedades_mensaje, largest_block];

/// Locates the element holding the page's main content
///
/// Falls back to the document's root element when no strategy matches.
pub fn find_target_region(document: &Html) -> (ElementRef<'_>, Fallback) {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(document))
        .unwrap_or_else(|| (document.root_element(), Fallback::Largest))
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn contenido_table(document: &Html) -> Option<(ElementRef<'_>, Fallback)> {
    select_first(document, "table.contenido").map(|el| (el, Fallback::Contenido))
}

fn news_body(document: &Html) -> Option<(ElementRef<'_>, Fallback)> {
    select_first(document, "div#news-body").map(|el| (el, Fallback::NewsBody))
}

fn novedades_mensaje(document: &Html) -> Option<(ElementRef<'_>, Fallback)> {
    select_first(document, "div.novedadespop_mensaje").map(|el| (el, Fallback::NovedadesMensaje))
}

/// The candidate block with the most visible text; ties go to the earliest
fn largest_block(document: &Html) -> Option<(ElementRef<'_>, Fallback)> {
    let selector = Selector::parse("div, table, section, article, main, body").ok()?;

    let mut best: Option<(ElementRef<'_>, usize)> = None;
    for candidate in document.select(&selector) {
        let len = rendered_len(candidate);
        match best {
            Some((_, best_len)) if len <= best_len => {}
            _ => best = Some((candidate, len)),
        }
    }

    best.map(|(el, _)| (el, Fallback::Largest))
}
