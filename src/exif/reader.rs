use anyhow::{Context, Result};
use nom_exif::*;
use std::path::Path;

// IFD0 DateTime, not exposed by name in every nom-exif release
const TAG_DATE_TIME: u16 = 0x0132;

/// Existing EXIF data extracted from an image, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ExifData {
    pub make: Option<String>,
    pub model: Option<String>,
    /// IFD0 `DateTime`, the field this tool rewrites.
    pub date_time: Option<String>,
    pub date_time_original: Option<String>,
}

impl ExifData {
    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.date_time.is_none()
            && self.date_time_original.is_none()
    }
}

/// Read existing EXIF data from an image file.
pub fn read_exif(path: &Path) -> Result<ExifData> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(ExifData::default());
        }
    };
    let exif: Exif = iter.into();

    let mut data = ExifData::default();

    if let Some(val) = exif.get(ExifTag::Make) {
        data.make = entry_to_string(val);
    }
    if let Some(val) = exif.get(ExifTag::Model) {
        data.model = entry_to_string(val);
    }
    if let Some(val) = exif.get_by_ifd_tag_code(0, TAG_DATE_TIME) {
        data.date_time = entry_to_string(val);
    }
    if let Some(val) = exif.get(ExifTag::DateTimeOriginal) {
        data.date_time_original = entry_to_string(val);
    }

    Ok(data)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}
