use futures::future::join_all;
use tracing::{error, info, warn};

use super::Pipeline;
use crate::fetch::PageSource;
use crate::models::{CategoryRef, CategoryResult};
use crate::parser::extract::listing;
use crate::store;

impl<S: PageSource> Pipeline<S> {
    /// Scrape one category and write `<name>_movies.json`. `None` means the
    /// category was skipped and nothing was written.
    pub async fn process_category(&self, category: &CategoryRef) -> Option<String> {
        let html = match self.source.fetch(&category.url).await {
            Ok(html) => html,
            Err(miss) => {
                warn!("Failed to download {}: {} ({})", category.name, category.url, miss);
                return None;
            }
        };

        let entries = listing::extract(&html, &self.listing_marker, &self.base_url);
        info!("In category '{}': {} series", category.name, entries.len());

        let records = join_all(entries.into_iter().map(|entry| self.build_record(entry))).await;
        let result = CategoryResult::new(records);

        let path = store::category_path(&self.output_dir, &category.name);
        if let Err(e) = store::write_json(&path, &result) {
            error!("Failed to save {}: {:#}", category.name, e);
            return None;
        }
        info!("Saved {} series to {:?}", result.count(), path);

        Some(category.name.clone())
    }
}
