//! Content-based file type detection.
//!
//! Only the leading bytes are inspected; the file extension is never trusted.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from the start of a file for classification.
const SNIFF_LEN: u64 = 16;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Which APP segment a JPEG opens with, when recognisable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegFlavor {
    Jfif,
    Exif,
    Plain,
}

/// A file classification derived from signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Jpeg(JpegFlavor),
    Png,
    Gif,
    Tiff,
    WebP,
    Heif,
    Bmp,
    Pdf,
    Zip,
    Empty,
    Unknown,
}

impl FileType {
    /// Whether the capture timestamp may be rewritten in this file.
    pub fn is_jpeg(&self) -> bool {
        matches!(self, Self::Jpeg(_))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            Self::Jpeg(JpegFlavor::Jfif) => "JPEG image data, JFIF standard",
            Self::Jpeg(JpegFlavor::Exif) => "JPEG image data, Exif standard",
            Self::Jpeg(JpegFlavor::Plain) => "JPEG image data",
            Self::Png => "PNG image data",
            Self::Gif => "GIF image data",
            Self::Tiff => "TIFF image data",
            Self::WebP => "RIFF (little-endian) data, Web/P image",
            Self::Heif => "ISO Media, HEIF image",
            Self::Bmp => "PC bitmap",
            Self::Pdf => "PDF document",
            Self::Zip => "Zip archive data",
            Self::Empty => "empty",
            Self::Unknown => "data",
        };
        f.write_str(desc)
    }
}

/// Classify a file by reading its first bytes.
pub fn sniff(path: &Path) -> io::Result<FileType> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniff_bytes(&head))
}

/// Classify an in-memory prefix of a file.
pub fn sniff_bytes(head: &[u8]) -> FileType {
    if head.is_empty() {
        return FileType::Empty;
    }

    if head.starts_with(JPEG_SOI) {
        // SOI, then the first segment: FF Ex len(2) identifier
        let flavor = match (head.get(3), head.get(6..10)) {
            (Some(0xE0), Some(b"JFIF")) => JpegFlavor::Jfif,
            (Some(0xE1), Some(b"Exif")) => JpegFlavor::Exif,
            _ => JpegFlavor::Plain,
        };
        return FileType::Jpeg(flavor);
    }

    if head.starts_with(PNG_SIGNATURE) {
        FileType::Png
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        FileType::Gif
    } else if head.starts_with(b"II*\0") || head.starts_with(b"MM\0*") {
        FileType::Tiff
    } else if head.starts_with(b"RIFF") && head.get(8..12) == Some(b"WEBP".as_slice()) {
        FileType::WebP
    } else if head.get(4..8) == Some(b"ftyp".as_slice()) && is_heif_brand(head.get(8..12)) {
        FileType::Heif
    } else if head.starts_with(b"BM") {
        FileType::Bmp
    } else if head.starts_with(b"%PDF-") {
        FileType::Pdf
    } else if head.starts_with(b"PK\x03\x04") {
        FileType::Zip
    } else {
        FileType::Unknown
    }
}

fn is_heif_brand(brand: Option<&[u8]>) -> bool {
    matches!(
        brand,
        Some(b"heic" | b"heix" | b"hevc" | b"heim" | b"heis" | b"mif1" | b"msf1" | b"avif")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn detects_jfif_jpeg() {
        let t = sniff_bytes(&test_support::minimal_jpeg());
        assert_eq!(t, FileType::Jpeg(JpegFlavor::Jfif));
        assert!(t.is_jpeg());
        assert!(t.to_string().contains("JPEG"));
    }

    #[test]
    fn detects_exif_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x20, b'E', b'x', b'i', b'f', 0, 0];
        assert_eq!(sniff_bytes(&data), FileType::Jpeg(JpegFlavor::Exif));
    }

    #[test]
    fn detects_plain_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43];
        assert_eq!(sniff_bytes(&data), FileType::Jpeg(JpegFlavor::Plain));
        assert_eq!(FileType::Jpeg(JpegFlavor::Plain).to_string(), "JPEG image data");
    }

    #[test]
    fn soi_alone_is_not_enough() {
        assert_eq!(sniff_bytes(&[0xFF, 0xD8]), FileType::Unknown);
    }

    #[test]
    fn detects_other_images() {
        assert_eq!(sniff_bytes(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), FileType::Png);
        assert_eq!(sniff_bytes(b"GIF89a\x40\x01\xf0\x00"), FileType::Gif);
        assert_eq!(sniff_bytes(b"II*\0\x08\0\0\0"), FileType::Tiff);
        assert_eq!(sniff_bytes(b"MM\0*\0\0\0\x08"), FileType::Tiff);
        assert_eq!(sniff_bytes(b"RIFF\x64\0\0\0WEBPVP8X"), FileType::WebP);
        assert_eq!(sniff_bytes(b"\0\0\0\x18ftypheic\0\0\0\0"), FileType::Heif);
        assert_eq!(sniff_bytes(b"BM\x36\0\x0c\0"), FileType::Bmp);
    }

    #[test]
    fn mp4_is_not_heif() {
        assert_eq!(sniff_bytes(b"\0\0\0\x18ftypisom\0\0\x02\0"), FileType::Unknown);
    }

    #[test]
    fn detects_documents_and_archives() {
        assert_eq!(sniff_bytes(b"%PDF-1.7\n"), FileType::Pdf);
        assert_eq!(sniff_bytes(b"PK\x03\x04\x14\0"), FileType::Zip);
        assert_eq!(sniff_bytes(b"hello world"), FileType::Unknown);
        assert_eq!(sniff_bytes(b""), FileType::Empty);
    }

    #[test]
    fn sniff_ignores_extension() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("photo.jpg");
        fs::write(&fake, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0").unwrap();
        assert_eq!(sniff(&fake).unwrap(), FileType::Png);

        let real = dir.path().join("noext");
        fs::write(&real, test_support::minimal_jpeg()).unwrap();
        assert!(sniff(&real).unwrap().is_jpeg());
    }

    #[test]
    fn sniff_empty_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.jpg");
        fs::write(&empty, b"").unwrap();
        assert_eq!(sniff(&empty).unwrap(), FileType::Empty);

        assert!(sniff(&dir.path().join("missing.jpg")).is_err());
    }
}
