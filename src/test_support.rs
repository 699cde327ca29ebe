//! Byte-level JPEG and TIFF fixtures for unit tests.

use crate::exif::tiff::{FORMAT_ASCII, FORMAT_LONG, TAG_EXIF_IFD_POINTER};

pub const MAKE: &str = "Canon";

/// SOI, APP0/JFIF, DQT, SOF0, SOS with a few entropy-coded bytes, EOI.
pub fn minimal_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];

    // APP0 JFIF 1.01, no thumbnail
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);

    // DQT, table 0, all ones
    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[0x01; 64]);

    // SOF0 8x8, one component
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);

    // SOS, one component
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.extend_from_slice(&[0xD2, 0xCF, 0x20, 0xA5, 0x14, 0x51, 0x40]);

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// [`minimal_jpeg`] with an EXIF APP1 segment holding `tiff` right after APP0.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let jpeg = minimal_jpeg();
    let (head, tail) = jpeg.split_at(20);

    let mut data = head.to_vec();
    data.extend_from_slice(&[0xFF, 0xE1]);
    data.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    data.extend_from_slice(b"Exif\0\0");
    data.extend_from_slice(tiff);
    data.extend_from_slice(tail);
    data
}

/// Assembles a TIFF payload with ASCII entries in IFD0 and the Exif sub-IFD.
pub struct TiffBuilder {
    big_endian: bool,
    ifd0: Vec<(u16, String)>,
    exif: Vec<(u16, String)>,
}

impl TiffBuilder {
    pub fn little() -> Self {
        Self { big_endian: false, ifd0: Vec::new(), exif: Vec::new() }
    }

    pub fn big() -> Self {
        Self { big_endian: true, ..Self::little() }
    }

    pub fn ifd0_ascii(mut self, tag: u16, value: &str) -> Self {
        self.ifd0.push((tag, value.to_string()));
        self
    }

    pub fn exif_ascii(mut self, tag: u16, value: &str) -> Self {
        self.exif.push((tag, value.to_string()));
        self
    }

    fn u16(&self, v: u16) -> [u8; 2] {
        if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() }
    }

    fn u32(&self, v: u32) -> [u8; 4] {
        if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() }
    }

    pub fn build(self) -> Vec<u8> {
        let ifd0_len = self.ifd0.len() + usize::from(!self.exif.is_empty());
        let ifd0_offset = 8;
        let exif_offset = ifd0_offset + 2 + ifd0_len * 12 + 4;
        let exif_size = if self.exif.is_empty() { 0 } else { 2 + self.exif.len() * 12 + 4 };
        let mut data_offset = exif_offset + exif_size;

        let mut blobs: Vec<u8> = Vec::new();
        let mut encode = |entries: &[(u16, String)], this: &Self| -> Vec<(u16, [u8; 12])> {
            entries
                .iter()
                .map(|(tag, value)| {
                    let mut bytes = value.as_bytes().to_vec();
                    bytes.push(0);
                    let mut raw = [0u8; 12];
                    raw[0..2].copy_from_slice(&this.u16(*tag));
                    raw[2..4].copy_from_slice(&this.u16(FORMAT_ASCII));
                    raw[4..8].copy_from_slice(&this.u32(bytes.len() as u32));
                    if bytes.len() <= 4 {
                        raw[8..8 + bytes.len()].copy_from_slice(&bytes);
                    } else {
                        raw[8..12].copy_from_slice(&this.u32(data_offset as u32));
                        if bytes.len() % 2 != 0 {
                            bytes.push(0);
                        }
                        data_offset += bytes.len();
                        blobs.extend_from_slice(&bytes);
                    }
                    (*tag, raw)
                })
                .collect()
        };

        let mut ifd0 = encode(&self.ifd0, &self);
        let mut exif = encode(&self.exif, &self);
        if !exif.is_empty() {
            let mut raw = [0u8; 12];
            raw[0..2].copy_from_slice(&self.u16(TAG_EXIF_IFD_POINTER));
            raw[2..4].copy_from_slice(&self.u16(FORMAT_LONG));
            raw[4..8].copy_from_slice(&self.u32(1));
            raw[8..12].copy_from_slice(&self.u32(exif_offset as u32));
            ifd0.push((TAG_EXIF_IFD_POINTER, raw));
        }
        ifd0.sort_by_key(|(tag, _)| *tag);
        exif.sort_by_key(|(tag, _)| *tag);

        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        out.extend_from_slice(&self.u16(42));
        out.extend_from_slice(&self.u32(ifd0_offset as u32));

        let tables = if exif.is_empty() { vec![&ifd0] } else { vec![&ifd0, &exif] };
        for table in tables {
            out.extend_from_slice(&self.u16(table.len() as u16));
            for (_, raw) in table {
                out.extend_from_slice(raw);
            }
            out.extend_from_slice(&self.u32(0));
        }

        out.extend_from_slice(&blobs);
        out
    }
}
