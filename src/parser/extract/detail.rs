use scraper::Html;

use crate::parser::{primary_section, stripped_text};

const BULLET: &str = "•";

/// What a series detail page tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    pub description: Option<String>,
    pub metadata_tags: Option<Vec<String>>,
}

pub fn extract(html: &str) -> DetailInfo {
    let doc = Html::parse_document(html);
    let Some(section) = primary_section(&doc) else {
        return DetailInfo::default();
    };

    let description = section.select(selector!("p")).next().map(stripped_text);

    // Rating, genre and year live in a bullet-separated list
    let metadata_tags = section.select(selector!("ul")).next().map(|ul| {
        ul.select(selector!("li"))
            .map(stripped_text)
            .filter(|t| !t.is_empty() && t != BULLET)
            .collect()
    });

    DetailInfo {
        description,
        metadata_tags,
    }
}
