use scraper::{ElementRef, Html};

use crate::models::CatalogEntry;
use crate::parser::stripped_text;

/// Substring an entry's poster `src` must contain to count as a series tile.
const IMAGE_PATH_MARKER: &str = "image";
pub const DETAIL_SUFFIX: &str = "/details?lang=en";

/// A listing `li` that has a link.
struct Tile<'a> {
    title: String,
    link: ElementRef<'a>,
}

impl Tile<'_> {
    fn has_poster(&self) -> bool {
        self.link
            .select(selector!("img"))
            .next()
            .and_then(|img| img.value().attr("src"))
            .is_some_and(|src| src.contains(IMAGE_PATH_MARKER))
    }
}

/// Series entries listed after the `marker` tile, in page order.
pub fn extract(html: &str, marker: &str, base_url: &str) -> Vec<CatalogEntry> {
    let doc = Html::parse_document(html);

    doc.select(selector!("li"))
        .filter_map(|li| {
            let link = li.select(selector!("a")).next()?;
            let title = link
                .value()
                .attr("title")
                .map(str::to_string)
                .unwrap_or_else(|| stripped_text(link));
            Some(Tile { title, link })
        })
        .skip_while(|tile| tile.title != marker)
        .filter(|tile| tile.title != marker && tile.has_poster())
        .filter_map(|tile| {
            let href = tile.link.value().attr("href")?;
            Some(CatalogEntry {
                detail_url: detail_url(base_url, href),
                title: tile.title,
            })
        })
        .collect()
}

fn detail_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        format!("{}{}", href, DETAIL_SUFFIX)
    } else {
        format!("{}{}{}", base_url.trim_end_matches('/'), href, DETAIL_SUFFIX)
    }
}
