//! HTML parsing for the catalog site. Every page kind we care about keeps its
//! content inside a `div.inner` section; the extractors in [`extract`] read
//! from that section and degrade to `None`/empty when structure is missing.

/// Static CSS selector, parsed once.
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: std::sync::OnceLock<scraper::Selector> = std::sync::OnceLock::new();
        SELECTOR.get_or_init(|| scraper::Selector::parse($css).expect("static selector"))
    }};
}

pub mod extract;

use scraper::{ElementRef, Html};

/// First `div.inner` of the document.
pub fn primary_section(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(selector!("div.inner")).next()
}

/// Descendant text nodes, each trimmed, empty ones dropped, concatenated.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}
