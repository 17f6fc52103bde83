use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use scout_contracts::results::GeneratedImageResult;

/// Writes each generated image under `dir` as `scout-<stamp>-<nn>.<ext>`.
pub fn save_generated_images(dir: &Path, images: &[GeneratedImageResult]) -> Result<Vec<PathBuf>> {
    if images.is_empty() {
        bail!("no generated images to save");
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let stamp = timestamp_millis();
    let mut written = Vec::new();
    for (idx, image) in images.iter().enumerate() {
        let ext = extension_for_mime(image.mime_type());
        let path = dir.join(format!("scout-{stamp}-{:02}.{ext}", idx + 1));
        fs::write(&path, &image.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn extension_for_mime(mime: &str) -> &'static str {
    let lowered = mime.trim().to_ascii_lowercase();
    if lowered.contains("png") {
        return "png";
    }
    if lowered.contains("webp") {
        return "webp";
    }
    "jpg"
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
