use scraper::Html;

use crate::error::ExtractError;
use crate::parser::{primary_section, stripped_text};

pub const TITLE_NOT_FOUND: &str = "No encontrado";
pub const DESCRIPTION_NOT_FOUND: &str = "No encontrada";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub description: String,
}

/// Channel name (`h2`) and blurb (`p`). A page without the content section
/// is an error rather than a gap: it means we landed somewhere unexpected.
pub fn extract(html: &str) -> Result<ChannelInfo, ExtractError> {
    let doc = Html::parse_document(html);
    let section = primary_section(&doc).ok_or(ExtractError::MissingSection)?;

    let title = section
        .select(selector!("h2"))
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());
    let description = section
        .select(selector!("p"))
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| DESCRIPTION_NOT_FOUND.to_string());

    Ok(ChannelInfo { title, description })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_missing_nodes() {
        let info = extract(r#"<div class="inner"><span>nothing</span></div>"#).unwrap();
        assert_eq!(info.title, TITLE_NOT_FOUND);
        assert_eq!(info.description, DESCRIPTION_NOT_FOUND);
    }

    #[test]
    fn missing_section_is_an_error() {
        assert_eq!(extract("<h2>Loose</h2>"), Err(ExtractError::MissingSection));
    }
}
