use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use img_parts::Bytes;
use img_parts::jpeg::{Jpeg, JpegSegment};
use std::path::Path;

use super::tiff::{self, Entry, Ifd, TAG_DATE_TIME, TAG_OFFSET_TIME, Tiff};

const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const EXIF_PREFIX: &[u8] = b"Exif\0\0";
/// Largest APP1 payload a 16-bit segment length allows.
const MAX_APP1_CONTENTS: usize = u16::MAX as usize - 2;

/// EXIF encoding of a local date-time.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// What the write did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was rewritten with the new timestamp.
    Updated,
    /// The file already held this timestamp and was left alone.
    Unchanged,
}

/// A capture timestamp as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    /// Local date-time from `DateTime`.
    pub local: NaiveDateTime,
    /// UTC offset from `OffsetTime`, when present.
    pub offset: Option<FixedOffset>,
}

impl CaptureTime {
    /// The timestamp with its offset, when the file records one.
    pub fn with_offset(&self) -> Option<DateTime<FixedOffset>> {
        let offset = self.offset?;
        self.local.and_local_timezone(offset).single()
    }

    /// `YYYY-MM-DDTHH:MM:SS±HH:MM`, or without the suffix when no offset is stored.
    pub fn to_rfc3339(&self) -> String {
        match self.with_offset() {
            Some(dt) => dt.to_rfc3339(),
            None => self.local.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

/// The two tags that make up the capture timestamp.
fn capture_entries(timestamp: &DateTime<FixedOffset>) -> [Entry; 2] {
    let local = timestamp.format(EXIF_DATETIME_FORMAT).to_string();
    let offset = timestamp.format("%:z").to_string();
    [
        Entry::ascii(Ifd::Primary, TAG_DATE_TIME, &local),
        Entry::ascii(Ifd::Exif, TAG_OFFSET_TIME, &offset),
    ]
}

/// Set the capture timestamp of a JPEG, preserving all other data.
///
/// Strategy:
/// 1. Read the entire JPEG with img-parts (preserves all segments)
/// 2. Patch `DateTime` (IFD0) and `OffsetTime` (Exif sub-IFD) in the raw
///    TIFF payload, leaving every other entry untouched
/// 3. Create a minimal EXIF segment right after APP0 if the file has none
/// 4. Write back via img-parts (only the APP1 EXIF segment changes)
pub fn write_capture_time(path: &Path, timestamp: &DateTime<FixedOffset>) -> Result<WriteOutcome> {
    let file_bytes = std::fs::read(path).context("Failed to read image file")?;

    // Parse JPEG structure with img-parts (preserves all segments)
    let mut jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    let entries = capture_entries(timestamp);
    let exif_pos = find_exif_segment_pos(&jpeg);

    let original_tiff = match exif_pos {
        Some(pos) => jpeg.segments()[pos].contents()[EXIF_PREFIX.len()..].to_vec(),
        None => {
            log::debug!("  No EXIF segment, creating one");
            tiff::empty_tiff()
        }
    };

    if exif_pos.is_some() {
        let existing = Tiff::parse(&original_tiff).context("Failed to parse existing EXIF")?;
        let mut all_held = true;
        for entry in &entries {
            all_held &= existing.holds(entry)?;
        }
        if all_held {
            return Ok(WriteOutcome::Unchanged);
        }
    }

    let new_tiff = tiff::set_entries(&original_tiff, &entries)
        .context("Failed to update EXIF entries")?;

    let mut contents = Vec::with_capacity(EXIF_PREFIX.len() + new_tiff.len());
    contents.extend_from_slice(EXIF_PREFIX);
    contents.extend_from_slice(&new_tiff);
    if contents.len() > MAX_APP1_CONTENTS {
        anyhow::bail!(
            "EXIF segment would grow to {} bytes, over the {MAX_APP1_CONTENTS} byte limit",
            contents.len()
        );
    }
    let new_segment = JpegSegment::new_with_contents(APP1, Bytes::from(contents));

    let segments = jpeg.segments_mut();
    match exif_pos {
        Some(pos) => segments[pos] = new_segment,
        None => {
            // Right after APP0 (JFIF) when present, otherwise first
            let insert_pos = match segments.first() {
                Some(s) if s.marker() == APP0 => 1,
                _ => 0,
            };
            segments.insert(insert_pos, new_segment);
        }
    }

    let output = jpeg.encoder().bytes();
    std::fs::write(path, &output).context("Failed to write JPEG file")?;

    Ok(WriteOutcome::Updated)
}

/// Read back the capture timestamp written by [`write_capture_time`].
///
/// Returns `None` when the file has no EXIF segment or no `DateTime` tag.
pub fn read_capture_time(path: &Path) -> Result<Option<CaptureTime>> {
    let file_bytes = std::fs::read(path).context("Failed to read image file")?;
    let jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    let Some(pos) = find_exif_segment_pos(&jpeg) else {
        return Ok(None);
    };
    let contents = jpeg.segments()[pos].contents();
    let tiff = Tiff::parse(&contents[EXIF_PREFIX.len()..]).context("Failed to parse EXIF")?;

    let Some(date_time) = tiff.ascii(Ifd::Primary, TAG_DATE_TIME)? else {
        return Ok(None);
    };
    let local = NaiveDateTime::parse_from_str(date_time.trim(), EXIF_DATETIME_FORMAT)
        .with_context(|| format!("Malformed DateTime {date_time:?}"))?;

    let offset = match tiff.ascii(Ifd::Exif, TAG_OFFSET_TIME)? {
        Some(text) => {
            let dt = DateTime::parse_from_str(
                &format!("{date_time} {}", text.trim()),
                "%Y:%m:%d %H:%M:%S %:z",
            )
            .with_context(|| format!("Malformed OffsetTime {text:?}"))?;
            Some(*dt.offset())
        }
        None => None,
    };

    Ok(Some(CaptureTime { local, offset }))
}

/// Find the position of the EXIF APP1 segment in a JPEG.
/// EXIF segments have marker 0xE1 (APP1) and contents starting with "Exif\0\0".
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(EXIF_PREFIX))
}
