use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;

use crate::parser::{primary_section, stripped_text};

pub const FIRST_SEASON_PATH: &str = "/season/1";

pub fn is_season_label(label: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)^(temporada|season) \d+").unwrap());
    re.is_match(label)
}

/// Season link labels ("Temporada 1", "Season 2", ...) from a season page.
pub fn extract(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Some(section) = primary_section(&doc) else {
        return Vec::new();
    };

    section
        .select(selector!("a"))
        .map(stripped_text)
        .filter(|label| is_season_label(label))
        .collect()
}
