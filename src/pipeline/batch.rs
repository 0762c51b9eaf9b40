use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::Pipeline;
use crate::aggregate;
use crate::fetch::PageSource;
use crate::models::{CategoryRef, CombinedResult};
use crate::store;

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub finished: Vec<String>,
    pub skipped: usize,
    pub combined: CombinedResult,
}

impl<S: PageSource> Pipeline<S> {
    /// Every category at once; a skipped category never affects the others.
    pub async fn run_batch(
        &self,
        categories: &[CategoryRef],
        pb: &ProgressBar,
    ) -> (Vec<String>, usize) {
        let tasks = categories.iter().map(|category| async move {
            let outcome = self.process_category(category).await;
            pb.inc(1);
            outcome
        });
        let outcomes = join_all(tasks).await;

        let mut finished = Vec::new();
        let mut skipped = 0usize;
        for outcome in outcomes {
            match outcome {
                Some(name) => {
                    info!("Finished category '{}'", name);
                    finished.push(name);
                }
                None => skipped += 1,
            }
        }
        (finished, skipped)
    }
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} categories")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Load categories, scrape them all, then merge the per-category files.
pub async fn run_series<S: PageSource>(
    pipeline: &Pipeline<S>,
    categories_file: &Path,
    combined_file: &Path,
    pb: Option<ProgressBar>,
) -> Result<BatchReport> {
    let categories: Vec<CategoryRef> = store::read_json(categories_file)
        .with_context(|| format!("Failed to load categories from {:?}", categories_file))?;
    info!("Loaded {} categories", categories.len());

    let pb = pb.unwrap_or_else(ProgressBar::hidden);
    pb.set_length(categories.len() as u64);
    let (finished, skipped) = pipeline.run_batch(&categories, &pb).await;
    pb.finish_and_clear();
    info!(
        "All categories processed ({} finished, {} skipped)",
        finished.len(),
        skipped
    );

    fs::create_dir_all(&pipeline.output_dir)
        .with_context(|| format!("Failed to create {:?}", pipeline.output_dir))?;
    let combined = aggregate::combine(&pipeline.output_dir, combined_file)?;
    Ok(BatchReport {
        finished,
        skipped,
        combined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{listing, FakeSite};
    use crate::settings::Settings;

    #[tokio::test]
    async fn failing_category_is_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let output_dir = tmp.path().join("Series");
        let categories_file = tmp.path().join("categories.json");
        let combined_file = tmp.path().join("combined_series.json");
        store::write_json(
            &categories_file,
            &serde_json::json!([
                {"Categoria": "Comedy", "Link": "https://site/comedy"},
                {"Categoria": "Broken One", "Link": "https://site/broken"},
                {"Categoria": "Reality TV", "Link": "https://site/reality"}
            ]),
        )
        .unwrap();

        let site = FakeSite::default()
            .with("https://site/comedy", &listing(&[("A", "/s/a")]))
            .with("https://site/reality", &listing(&[]));
        let settings = Settings {
            output_dir: output_dir.clone(),
            ..Settings::default()
        };
        let pipeline = Pipeline::new(site, &settings);

        let report = run_series(&pipeline, &categories_file, &combined_file, None)
            .await
            .unwrap();

        assert_eq!(report.finished, ["Comedy", "Reality TV"]);
        assert_eq!(report.skipped, 1);
        assert!(!output_dir.join("broken_one_movies.json").exists());

        let combined: serde_json::Value = store::read_json(&combined_file).unwrap();
        let keys: Vec<&String> = combined.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["comedy_movies", "reality_tv_movies"]);
        assert_eq!(combined["comedy_movies"]["count"], 1);
        assert_eq!(combined["comedy_movies"]["movies"][0]["titulo"], "A");
        assert!(combined["comedy_movies"]["movies"][0]["descripcion"].is_null());
        assert_eq!(combined["reality_tv_movies"], serde_json::json!({"count": 0, "movies": []}));
    }

    #[tokio::test]
    async fn aggregation_runs_even_when_every_category_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let categories_file = tmp.path().join("categories.json");
        let combined_file = tmp.path().join("combined_series.json");
        store::write_json(
            &categories_file,
            &serde_json::json!([{"Categoria": "Gone", "Link": "https://site/gone"}]),
        )
        .unwrap();
        let settings = Settings {
            output_dir: tmp.path().join("Series"),
            ..Settings::default()
        };
        let pipeline = Pipeline::new(FakeSite::default(), &settings);

        let report = run_series(&pipeline, &categories_file, &combined_file, None)
            .await
            .unwrap();
        assert!(report.finished.is_empty());
        assert!(report.combined.is_empty());
        assert!(combined_file.exists());
    }

    #[tokio::test]
    async fn missing_categories_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(FakeSite::default(), &Settings::default());
        let result = run_series(
            &pipeline,
            &tmp.path().join("categories.json"),
            &tmp.path().join("combined.json"),
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
