//! Report export: artifact fetch, page layout, and PDF painting.
//!
//! Rendering happens in three steps. Artifacts (per-file thumbnails and
//! heatmaps) are fetched first, each awaited on its own so one bad image
//! only costs its slot, never the report. The layout pass is pure and
//! deterministic for fixed inputs. Painting runs on the blocking pool.

pub mod layout;
mod pdf;

use chrono::{DateTime, Utc};
use common::model::file::Buckets;
use image::DynamicImage;
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use layout::ArtifactKey;

/// Renders the triage report for the classified buckets. The timestamp is
/// passed in by the caller; it is the only input that varies between two
/// renders of the same reviewed batch.
pub async fn render_report(
    buckets: &Buckets,
    generated_at: DateTime<Utc>,
    assets_dir: &Path,
) -> Result<Vec<u8>, ReportError> {
    let artifacts = fetch_artifacts(buckets, assets_dir).await;
    let plan = layout::lay_out(buckets, generated_at);
    let bytes = tokio::task::spawn_blocking(move || pdf::paint(&plan, &artifacts)).await??;
    Ok(bytes)
}

/// Loads the thumbnail and heatmap for every classified file. Shared
/// heatmap artifacts are read once and reused across files.
async fn fetch_artifacts(
    buckets: &Buckets,
    assets_dir: &Path,
) -> HashMap<ArtifactKey, DynamicImage> {
    let mut artifacts = HashMap::new();
    let mut heatmap_cache: HashMap<PathBuf, Option<DynamicImage>> = HashMap::new();

    for file in buckets.iter_all() {
        if file.file.mime_type.starts_with("image/") {
            if let Some(img) = load_artifact(file.file.spool_path.clone()).await {
                artifacts.insert(ArtifactKey::Thumbnail(file.file.id), img);
            }
        }

        let heatmap_path = assets_dir.join(file.ai_heatmap.trim_start_matches("/assets/"));
        let cached = match heatmap_cache.get(&heatmap_path) {
            Some(cached) => cached.clone(),
            None => {
                let loaded = load_artifact(heatmap_path.clone()).await;
                heatmap_cache.insert(heatmap_path, loaded.clone());
                loaded
            }
        };
        if let Some(img) = cached {
            artifacts.insert(ArtifactKey::Heatmap(file.file.id), img);
        }
    }
    artifacts
}

/// Reads and decodes one image artifact. A failure is logged and reported
/// as absence; the report continues without it.
async fn load_artifact(path: PathBuf) -> Option<DynamicImage> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("skipping artifact {}: {}", path.display(), e);
            return None;
        }
    };
    match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await {
        Ok(Ok(img)) => Some(img),
        Ok(Err(e)) => {
            warn!("skipping undecodable artifact {}: {}", path.display(), e);
            None
        }
        Err(e) => {
            warn!("artifact decode task failed for {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::model::file::{
        Approval, Category, ClassificationSource, ClassifiedFile, IngestedFile, Modality,
    };
    use std::io::Cursor;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn classified_at(spool_path: PathBuf) -> ClassifiedFile {
        ClassifiedFile {
            file: IngestedFile {
                id: Uuid::new_v4(),
                name: "IC_1_thresh.png".to_string(),
                size: 256,
                mime_type: "image/png".to_string(),
                last_modified: None,
                modality: Modality::Mri,
                clinical_note: None,
                spool_path,
            },
            category: Category::Noise,
            ai_explanation: "Motion artifact detected.".to_string(),
            ai_heatmap: "/assets/ai_heatmap.png".to_string(),
            source: ClassificationSource::Lookup,
            source_index: Some(1),
            approval: Approval::Pending,
            clinician_explanation: None,
        }
    }

    fn write_png(path: &Path) {
        let pixels = image::RgbImage::from_pixel(32, 32, image::Rgb([10, 200, 90]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[tokio::test]
    async fn renders_even_when_every_artifact_is_missing() {
        let dir = TempDir::new().unwrap();
        let mut buckets = Buckets::default();
        buckets
            .noise
            .push(classified_at(dir.path().join("missing_upload.png")));

        let when = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        let bytes = render_report(&buckets, when, dir.path()).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn fetches_spooled_thumbnails_and_shared_heatmaps() {
        let dir = TempDir::new().unwrap();
        let spool = dir.path().join("upload.png");
        write_png(&spool);
        write_png(&dir.path().join("ai_heatmap.png"));

        let mut buckets = Buckets::default();
        buckets.noise.push(classified_at(spool));
        let id = buckets.noise[0].file.id;

        let artifacts = fetch_artifacts(&buckets, dir.path()).await;
        assert!(artifacts.contains_key(&ArtifactKey::Thumbnail(id)));
        assert!(artifacts.contains_key(&ArtifactKey::Heatmap(id)));
    }

    #[tokio::test]
    async fn corrupt_artifacts_are_isolated() {
        let dir = TempDir::new().unwrap();
        let spool = dir.path().join("upload.png");
        std::fs::write(&spool, b"not an image at all").unwrap();
        write_png(&dir.path().join("ai_heatmap.png"));

        let mut buckets = Buckets::default();
        buckets.noise.push(classified_at(spool));
        let id = buckets.noise[0].file.id;

        let artifacts = fetch_artifacts(&buckets, dir.path()).await;
        assert!(!artifacts.contains_key(&ArtifactKey::Thumbnail(id)));
        assert!(artifacts.contains_key(&ArtifactKey::Heatmap(id)));

        let when = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().unwrap();
        let bytes = render_report(&buckets, when, dir.path()).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
