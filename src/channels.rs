//! Channel variant: fill in `canal` / `descripcion` for every channel link.

use std::path::Path;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::ExtractError;
use crate::fetch::PageSource;
use crate::models::ChannelCatalog;
use crate::parser::extract::channel::{
    self, ChannelInfo, DESCRIPTION_NOT_FOUND, TITLE_NOT_FOUND,
};
use crate::store;

const ERROR_TITLE: &str = "Error encontrado";
const ERROR_DESCRIPTION: &str = "Descripción no disponible";

async fn scrape_channel<S: PageSource>(
    source: &S,
    url: &str,
) -> Result<ChannelInfo, ExtractError> {
    match source.fetch(url).await {
        Ok(html) => channel::extract(&html),
        Err(_) => Ok(ChannelInfo {
            title: TITLE_NOT_FOUND.to_string(),
            description: DESCRIPTION_NOT_FOUND.to_string(),
        }),
    }
}

/// Scrape every channel concurrently and write results back in place.
/// Returns how many items hit a task failure.
pub async fn augment<S: PageSource>(source: &S, catalog: &mut ChannelCatalog) -> usize {
    let links: Vec<String> = catalog.items().map(|item| item.link().to_string()).collect();
    info!("Waiting on {} channel pages...", links.len());

    let results = join_all(links.iter().map(|link| scrape_channel(source, link))).await;

    let mut failures = 0;
    for (item, result) in catalog.items_mut().zip(results) {
        let info = result.unwrap_or_else(|e| {
            warn!("Error processing {}: {}", item.link(), e);
            failures += 1;
            ChannelInfo {
                title: ERROR_TITLE.to_string(),
                description: ERROR_DESCRIPTION.to_string(),
            }
        });
        item.set_info(info.title, info.description);
    }
    failures
}

pub async fn run_channels<S: PageSource>(
    source: &S,
    input: &Path,
    output: &Path,
) -> Result<ChannelCatalog> {
    let mut catalog: ChannelCatalog = store::read_json(input)
        .with_context(|| format!("Failed to load channels from {:?}", input))?;

    let failures = augment(source, &mut catalog).await;
    info!("All channel pages done ({} with errors)", failures);

    store::write_json(output, &catalog)?;
    info!("Saved channels to {:?}", output);
    Ok(catalog)
}
