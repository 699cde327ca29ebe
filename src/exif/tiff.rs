//! Entry-level editing of the TIFF structure inside a JPEG EXIF segment.
//!
//! Edits never re-serialise the block. A value with the same format and size
//! is overwritten where it lies; anything else rebuilds only the affected
//! IFDs at the end of the payload, copying the original 12-byte entries
//! verbatim so every out-of-line value keeps its offset.

use anyhow::{Context, Result};

pub const TAG_DATE_TIME: u16 = 0x0132;
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_OFFSET_TIME: u16 = 0x9010;

pub const FORMAT_ASCII: u16 = 2;
pub const FORMAT_LONG: u16 = 4;

const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 12;

/// Byte order declared by the TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn read_u16(self, data: &[u8], offset: usize) -> Result<u16> {
        let bytes: [u8; 2] = data
            .get(offset..offset + 2)
            .and_then(|b| b.try_into().ok())
            .with_context(|| format!("TIFF read at offset {offset} out of bounds"))?;
        Ok(match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(self, data: &[u8], offset: usize) -> Result<u32> {
        let bytes: [u8; 4] = data
            .get(offset..offset + 4)
            .and_then(|b| b.try_into().ok())
            .with_context(|| format!("TIFF read at offset {offset} out of bounds"))?;
        Ok(match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        })
    }

    fn encode_u16(self, val: u16) -> [u8; 2] {
        match self {
            Self::Little => val.to_le_bytes(),
            Self::Big => val.to_be_bytes(),
        }
    }

    pub fn encode_u32(self, val: u32) -> [u8; 4] {
        match self {
            Self::Little => val.to_le_bytes(),
            Self::Big => val.to_be_bytes(),
        }
    }
}

/// The IFD an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ifd {
    /// IFD0, the primary image directory.
    Primary,
    /// The Exif sub-IFD referenced by tag 0x8769.
    Exif,
}

/// A tag value to store, already encoded in the target byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ifd: Ifd,
    pub tag: u16,
    pub format: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

impl Entry {
    /// A NUL-terminated ASCII entry.
    pub fn ascii(ifd: Ifd, tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self {
            ifd,
            tag,
            format: FORMAT_ASCII,
            count: data.len() as u32,
            data,
        }
    }

    fn raw(&self, order: ByteOrder, value_field: [u8; 4]) -> [u8; ENTRY_LEN] {
        let mut raw = [0u8; ENTRY_LEN];
        raw[0..2].copy_from_slice(&order.encode_u16(self.tag));
        raw[2..4].copy_from_slice(&order.encode_u16(self.format));
        raw[4..8].copy_from_slice(&order.encode_u32(self.count));
        raw[8..12].copy_from_slice(&value_field);
        raw
    }
}

/// A parsed image file directory.
#[derive(Debug)]
struct IfdTable {
    offset: usize,
    entries: Vec<[u8; ENTRY_LEN]>,
    next: u32,
}

/// Where an existing entry's value lives.
#[derive(Debug)]
struct Located {
    format: u16,
    count: u32,
    value: std::ops::Range<usize>,
}

/// Read-only view over a TIFF payload (the bytes after `Exif\0\0`).
#[derive(Debug)]
pub struct Tiff<'a> {
    data: &'a [u8],
    order: ByteOrder,
    ifd0: IfdTable,
    exif: Option<IfdTable>,
}

impl<'a> Tiff<'a> {
    /// Parse the header, IFD0, and the Exif sub-IFD if present.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            anyhow::bail!("TIFF data too short ({} bytes)", data.len());
        }
        let order = match &data[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => anyhow::bail!("Invalid TIFF byte order"),
        };
        if order.read_u16(data, 2)? != 42 {
            anyhow::bail!("Invalid TIFF magic number");
        }

        let ifd0_offset = order.read_u32(data, 4)? as usize;
        let ifd0 = read_ifd(data, order, ifd0_offset).context("Failed to read IFD0")?;

        let exif = match find_index(&ifd0, order, TAG_EXIF_IFD_POINTER) {
            Some(index) => {
                let offset = order.read_u32(&ifd0.entries[index], 8)? as usize;
                Some(read_ifd(data, order, offset).context("Failed to read Exif sub-IFD")?)
            }
            None => None,
        };

        Ok(Self { data, order, ifd0, exif })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn table(&self, ifd: Ifd) -> Option<&IfdTable> {
        match ifd {
            Ifd::Primary => Some(&self.ifd0),
            Ifd::Exif => self.exif.as_ref(),
        }
    }

    fn locate(&self, ifd: Ifd, tag: u16) -> Result<Option<Located>> {
        let Some(table) = self.table(ifd) else {
            return Ok(None);
        };
        let Some(index) = find_index(table, self.order, tag) else {
            return Ok(None);
        };
        let raw = &table.entries[index];
        let format = self.order.read_u16(raw, 2)?;
        let count = self.order.read_u32(raw, 4)?;
        let size = format_size(format)
            .and_then(|s| s.checked_mul(count as usize))
            .with_context(|| format!("Unsupported format {format} for tag {tag:#06x}"))?;
        let start = if size <= 4 {
            table.offset + 2 + index * ENTRY_LEN + 8
        } else {
            self.order.read_u32(raw, 8)? as usize
        };
        let value = start..start + size;
        if value.end > self.data.len() {
            anyhow::bail!("Value of tag {tag:#06x} extends beyond TIFF data");
        }
        Ok(Some(Located { format, count, value }))
    }

    /// The value of an ASCII tag, without its terminating NULs.
    pub fn ascii(&self, ifd: Ifd, tag: u16) -> Result<Option<String>> {
        let Some(located) = self.locate(ifd, tag)? else {
            return Ok(None);
        };
        if located.format != FORMAT_ASCII {
            anyhow::bail!("Tag {tag:#06x} is not ASCII (format {})", located.format);
        }
        let bytes = &self.data[located.value];
        let text = String::from_utf8_lossy(bytes);
        Ok(Some(text.trim_end_matches('\0').to_string()))
    }

    /// Whether `entry` is already stored with exactly these bytes.
    pub fn holds(&self, entry: &Entry) -> Result<bool> {
        Ok(match self.locate(entry.ifd, entry.tag)? {
            Some(located) => {
                located.format == entry.format
                    && located.count == entry.count
                    && self.data[located.value] == entry.data[..]
            }
            None => false,
        })
    }
}

/// A TIFF payload with an empty IFD0, used when a JPEG has no EXIF at all.
pub fn empty_tiff() -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN + 6);
    data.extend_from_slice(b"II*\0");
    data.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data
}

/// Store `entries` into a copy of `original` and return the new payload.
///
/// Entries whose tag already exists with the same format and count are
/// patched in place. The rest trigger a rebuild of their IFD (and of IFD0
/// when a new Exif sub-IFD has to be linked in).
pub fn set_entries(original: &[u8], entries: &[Entry]) -> Result<Vec<u8>> {
    let tiff = Tiff::parse(original)?;
    let mut result = original.to_vec();

    let mut pending: Vec<&Entry> = Vec::new();
    for entry in entries {
        match tiff.locate(entry.ifd, entry.tag)? {
            Some(located)
                if located.format == entry.format
                    && located.count == entry.count
                    && located.value.len() == entry.data.len() =>
            {
                log::debug!("  Patching tag {:#06x} in place", entry.tag);
                result[located.value].copy_from_slice(&entry.data);
            }
            _ => pending.push(entry),
        }
    }

    if pending.is_empty() {
        return Ok(result);
    }

    // Re-read so copied entries carry any inline values patched above
    let patched = result.clone();
    let tiff = Tiff::parse(&patched)?;
    let order = tiff.order;

    let exif_pending: Vec<&Entry> = pending.iter().copied().filter(|e| e.ifd == Ifd::Exif).collect();
    let mut ifd0_pending: Vec<Entry> = pending
        .iter()
        .filter(|e| e.ifd == Ifd::Primary)
        .map(|e| Entry::clone(e))
        .collect();

    // === Rebuild the Exif sub-IFD at the end (creating it if absent) ===
    if !exif_pending.is_empty() {
        let (base, next) = match &tiff.exif {
            Some(table) => (table.entries.as_slice(), table.next),
            None => (&[][..], 0),
        };
        log::debug!(
            "  Rebuilding Exif sub-IFD ({} existing entries)",
            base.len()
        );
        let exif_start = append_ifd(&mut result, order, base, &exif_pending, next)?;
        ifd0_pending.push(Entry {
            ifd: Ifd::Primary,
            tag: TAG_EXIF_IFD_POINTER,
            format: FORMAT_LONG,
            count: 1,
            data: order.encode_u32(exif_start).to_vec(),
        });
    }

    // === Rebuild IFD0 at the end ===
    let ifd0_refs: Vec<&Entry> = ifd0_pending.iter().collect();
    log::debug!("  Rebuilding IFD0 ({} existing entries)", tiff.ifd0.entries.len());
    let ifd0_start = append_ifd(&mut result, order, &tiff.ifd0.entries, &ifd0_refs, tiff.ifd0.next)?;

    // Update TIFF header to point to new IFD0
    result[4..8].copy_from_slice(&order.encode_u32(ifd0_start));

    Ok(result)
}

/// Append an IFD built from `existing` raw entries plus `additions`, and
/// return its offset. An addition replaces any existing entry with its tag;
/// entries are written in ascending tag order.
fn append_ifd(
    out: &mut Vec<u8>,
    order: ByteOrder,
    existing: &[[u8; ENTRY_LEN]],
    additions: &[&Entry],
    next: u32,
) -> Result<u32> {
    enum Slot<'e> {
        Kept([u8; ENTRY_LEN]),
        Added(&'e Entry),
    }

    let mut slots: Vec<(u16, Slot)> = Vec::with_capacity(existing.len() + additions.len());
    for raw in existing {
        let tag = order.read_u16(raw, 0)?;
        if !additions.iter().any(|a| a.tag == tag) {
            slots.push((tag, Slot::Kept(*raw)));
        }
    }
    for addition in additions {
        slots.push((addition.tag, Slot::Added(*addition)));
    }
    slots.sort_by_key(|(tag, _)| *tag);

    let count = u16::try_from(slots.len()).context("Too many IFD entries")?;

    // IFDs and their values must start on a word boundary
    pad_to_even(out);
    let start = out.len();
    out.extend_from_slice(&order.encode_u16(count));
    let entries_base = out.len();
    out.resize(entries_base + slots.len() * ENTRY_LEN, 0);
    out.extend_from_slice(&order.encode_u32(next));

    for (i, (_, slot)) in slots.iter().enumerate() {
        let raw = match slot {
            Slot::Kept(raw) => *raw,
            Slot::Added(entry) if entry.data.len() <= 4 => {
                let mut inline = [0u8; 4];
                inline[..entry.data.len()].copy_from_slice(&entry.data);
                entry.raw(order, inline)
            }
            Slot::Added(entry) => {
                pad_to_even(out);
                let data_off = to_offset(out.len())?;
                out.extend_from_slice(&entry.data);
                entry.raw(order, order.encode_u32(data_off))
            }
        };
        let off = entries_base + i * ENTRY_LEN;
        out[off..off + ENTRY_LEN].copy_from_slice(&raw);
    }

    to_offset(start)
}

fn read_ifd(data: &[u8], order: ByteOrder, offset: usize) -> Result<IfdTable> {
    let count = order.read_u16(data, offset)? as usize;
    let start = offset + 2;
    let end = start + count * ENTRY_LEN;
    if end + 4 > data.len() {
        anyhow::bail!("IFD at offset {offset} extends beyond TIFF data");
    }
    let entries = data[start..end]
        .chunks_exact(ENTRY_LEN)
        .map(|chunk| {
            let mut raw = [0u8; ENTRY_LEN];
            raw.copy_from_slice(chunk);
            raw
        })
        .collect();
    let next = order.read_u32(data, end)?;
    Ok(IfdTable { offset, entries, next })
}

fn find_index(table: &IfdTable, order: ByteOrder, tag: u16) -> Option<usize> {
    table
        .entries
        .iter()
        .position(|raw| order.read_u16(raw, 0).ok() == Some(tag))
}

/// Size in bytes of one value of a TIFF field type.
fn format_size(format: u16) -> Option<usize> {
    match format {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 | 13 => Some(4),
        5 | 10 | 12 => Some(8),
        _ => None,
    }
}

fn pad_to_even(out: &mut Vec<u8>) {
    if out.len() % 2 != 0 {
        out.push(0);
    }
}

fn to_offset(pos: usize) -> Result<u32> {
    u32::try_from(pos).context("TIFF data exceeds 4 GiB")
}
