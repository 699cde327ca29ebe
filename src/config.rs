use anyhow::{Context, Result};
use chrono::FixedOffset;
use std::path::PathBuf;

/// Directory searched when none is given.
pub const DEFAULT_IMAGE_DIR: &str = "images";
/// Hours east of UTC applied when none is given (+8 = Singapore).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
/// Westernmost whole-hour zone in use (Baker Island).
pub const MIN_UTC_OFFSET_HOURS: i32 = -12;
/// Easternmost whole-hour zone in use (Line Islands).
pub const MAX_UTC_OFFSET_HOURS: i32 = 14;

/// Everything a run needs, passed explicitly to every step.
///
/// # Example
///
/// ```rust
/// use exif_redate::config::RunConfig;
///
/// let config = RunConfig {
///     root_dir: "photos".into(),
///     utc_offset_hours: 9,
/// };
/// assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 9 * 3600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Root of the tree searched for `.jpg`/`.jpeg` files.
    pub root_dir: PathBuf,
    /// Whole hours from UTC applied to every date parsed from a directory name.
    pub utc_offset_hours: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl RunConfig {
    /// The configured offset as a chrono timezone.
    ///
    /// Fails when the hour count lies outside `-12..=14`.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        if !(MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&self.utc_offset_hours) {
            anyhow::bail!(
                "UTC offset {:+} is out of range ({MIN_UTC_OFFSET_HOURS:+}..={MAX_UTC_OFFSET_HOURS:+} hours)",
                self.utc_offset_hours
            );
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .with_context(|| format!("Invalid UTC offset {:+}", self.utc_offset_hours))
    }
}
