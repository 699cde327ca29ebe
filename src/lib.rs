//! # exif-redate
//!
//! Rewrite the EXIF capture timestamp of JPEG files from the `YYYY-MM-DD`
//! name of the directory they sit in.
//!
//! ## Quick Start
//!
//! The pipeline module handles the whole enumerate → detect → date → write
//! flow, logging one group of lines per file:
//!
//! ```rust,no_run
//! use exif_redate::config::RunConfig;
//! use exif_redate::pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RunConfig {
//!         root_dir: "images".into(),
//!         utc_offset_hours: 9,
//!     };
//!     pipeline::run(&config)
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Each step can be called on its own:
//!
//! ```rust,no_run
//! use exif_redate::{date, exif, sniff};
//! use chrono::FixedOffset;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("images/2021-06-15/photo.jpg");
//!
//!     // 1. Check the content really is a JPEG
//!     let file_type = sniff::sniff(path)?;
//!     assert!(file_type.is_jpeg(), "{file_type}");
//!
//!     // 2. Derive the timestamp from the parent directory
//!     let offset = FixedOffset::east_opt(9 * 3600).unwrap();
//!     let timestamp = date::capture_timestamp(path, offset)?;
//!
//!     // 3. Write it, then read it back
//!     exif::write_capture_time(path, &timestamp)?;
//!     let stored = exif::read_capture_time(path)?.unwrap();
//!     assert_eq!(stored.to_rfc3339(), "2021-06-15T00:00:00+09:00");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Run configuration (root directory, UTC offset)
//! - [`date`] — Timestamp from a `YYYY-MM-DD` directory name
//! - [`error`] — Per-file outcome errors
//! - [`exif`] — Capture-timestamp reading and writing
//! - [`pipeline`] — File collection and the per-file run loop
//! - [`sniff`] — Signature-based file type detection

pub mod config;
pub mod date;
pub mod error;
pub mod exif;
pub mod pipeline;
pub mod sniff;

#[cfg(test)]
mod test_support;
