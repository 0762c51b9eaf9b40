use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::models::CombinedResult;
use crate::store;

/// Merge every `*.json` in `output_dir` into one document keyed by file stem.
/// All-or-nothing: one unreadable or malformed file fails the whole merge.
pub fn collect(output_dir: &Path) -> Result<CombinedResult> {
    let mut files: Vec<PathBuf> = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to list {:?}", output_dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("Failed to list {:?}", output_dir))?;
    files.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"));
    files.sort();

    let mut combined = CombinedResult::new();
    for path in files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let data: Value = store::read_json(&path)?;
        combined.insert(stem.to_string(), data);
    }
    Ok(combined)
}

pub fn combine(output_dir: &Path, combined_file: &Path) -> Result<CombinedResult> {
    let combined = collect(output_dir)?;
    store::write_json(combined_file, &combined)?;
    info!(
        "Combined {} category files into {:?}",
        combined.len(),
        combined_file
    );
    Ok(combined)
}
