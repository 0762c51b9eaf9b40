//! Fetch/extract pipeline: batch → category → item. Fan-out at each level is
//! joined in a fixed order on the caller's task; the fetcher bounds how many
//! requests are actually in flight.

mod batch;
mod category;
mod item;

use std::path::PathBuf;

use crate::fetch::PageSource;
use crate::settings::Settings;

pub use batch::{progress_bar, run_series, BatchReport};

pub struct Pipeline<S> {
    source: S,
    base_url: String,
    listing_marker: String,
    output_dir: PathBuf,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, settings: &Settings) -> Self {
        Self {
            source,
            base_url: settings.base_url.clone(),
            listing_marker: settings.listing_marker.clone(),
            output_dir: settings.output_dir.clone(),
        }
    }
}
