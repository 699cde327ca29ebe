use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::RunConfig;
use crate::date;
use crate::error::RewriteError;
use crate::exif::{self, WriteOutcome};
use crate::sniff;

/// File suffixes searched for, compared case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Collect `.jpg`/`.jpeg` files under `root`, sorted by full path.
///
/// Directories are walked recursively without following symlinks. Symlinked
/// files are left out as well, so every listed path names a distinct file.
/// An empty tree yields an empty list; a missing or non-directory root is an
/// error.
///
/// # Example
///
/// ```rust,no_run
/// use exif_redate::pipeline::collect_images;
/// use std::path::Path;
///
/// let images = collect_images(Path::new("images")).unwrap();
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        // file_type() describes the link itself, not its target
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    images.dedup();
    Ok(images)
}

/// Check if a file has a `.jpg` or `.jpeg` extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Detect, date, and rewrite a single file.
///
/// Nothing is modified unless the content carries a JPEG signature.
pub fn process_image(
    path: &Path,
    offset: chrono::FixedOffset,
) -> Result<WriteOutcome, RewriteError> {
    let file_type = sniff::sniff(path)?;
    log::debug!("  file type = {file_type}");
    if !file_type.is_jpeg() {
        return Err(RewriteError::TypeMismatch {
            detected: file_type.to_string(),
        });
    }

    let timestamp = date::capture_timestamp(path, offset)?;
    log::debug!("  date = {}", timestamp.to_rfc3339());

    if log::log_enabled!(log::Level::Debug) {
        match exif::read_exif(path) {
            Ok(existing) if existing.is_empty() => log::debug!("  no existing EXIF"),
            Ok(existing) => {
                let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".into());
                log::debug!(
                    "  camera = {} {}",
                    show(&existing.make),
                    show(&existing.model)
                );
                log::debug!("  previous DateTime = {}", show(&existing.date_time));
                log::debug!("  DateTimeOriginal = {}", show(&existing.date_time_original));
            }
            Err(e) => log::debug!("  could not read existing EXIF: {e:#}"),
        }
    }

    exif::write_capture_time(path, &timestamp).map_err(RewriteError::Metadata)
}

/// Rewrite every image under the configured root, one file at a time.
///
/// Per-file skips and failures are logged and never stop the run; only an
/// invalid root directory or offset is returned as an error.
pub fn run(config: &RunConfig) -> Result<()> {
    let offset = config.utc_offset()?;
    let images = collect_images(&config.root_dir)
        .with_context(|| format!("Cannot search {}", config.root_dir.display()))?;

    let total = images.len();
    if total == 0 {
        log::info!("No .jpg/.jpeg files found under {}", config.root_dir.display());
    }

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Updating: {}", i + 1, total, image_path.display());

        match process_image(image_path, offset) {
            Ok(WriteOutcome::Updated) => log::info!("  Timestamp written"),
            Ok(WriteOutcome::Unchanged) => log::info!("  Timestamp already up to date"),
            Err(e) if e.is_skip() => log::info!("  Skipping: {e}"),
            Err(e) => log::error!("  {e}"),
        }
    }

    Ok(())
}
