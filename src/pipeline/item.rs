use tracing::debug;

use super::Pipeline;
use crate::fetch::PageSource;
use crate::models::{CatalogEntry, SeriesRecord};
use crate::parser::extract::listing::DETAIL_SUFFIX;
use crate::parser::extract::seasons::FIRST_SEASON_PATH;
use crate::parser::extract::{detail, seasons};

/// Season-one page for a series, derived from its detail URL.
pub fn season_url(detail_url: &str) -> String {
    let base = detail_url.split(DETAIL_SUFFIX).next().unwrap_or(detail_url);
    format!("{}{}", base, FIRST_SEASON_PATH)
}

impl<S: PageSource> Pipeline<S> {
    /// Detail page, then season page. Each miss only blanks the fields it
    /// would have filled; the record itself is always produced.
    pub async fn build_record(&self, entry: CatalogEntry) -> SeriesRecord {
        let detail_html = match self.source.fetch(&entry.detail_url).await {
            Ok(html) => html,
            Err(miss) => {
                debug!("No detail page for {}: {}", entry.title, miss);
                return SeriesRecord::bare(entry);
            }
        };
        let info = detail::extract(&detail_html);

        let seasons_url = season_url(&entry.detail_url);
        let seasons = match self.source.fetch(&seasons_url).await {
            Ok(html) => Some(seasons::extract(&html)),
            Err(miss) => {
                debug!("No season page for {}: {}", entry.title, miss);
                None
            }
        };
        debug!("{}: {:?}", entry.title, seasons);

        SeriesRecord {
            title: entry.title,
            metadata_tags: info.metadata_tags,
            link: entry.detail_url,
            description: info.description,
            seasons,
        }
    }
}
