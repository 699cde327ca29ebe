//! EXIF capture-timestamp reading and writing.
//!
//! - [`write_capture_time`] — set `DateTime`/`OffsetTime` in a JPEG, leaving
//!   every other tag, segment, and the image data byte-for-byte intact
//! - [`read_capture_time`] — read that pair back
//! - [`read_exif`] — summarise existing metadata for diagnostics

mod reader;
pub mod tiff;
mod writer;

pub use reader::{ExifData, read_exif};
pub use writer::{CaptureTime, EXIF_DATETIME_FORMAT, WriteOutcome, read_capture_time, write_capture_time};
