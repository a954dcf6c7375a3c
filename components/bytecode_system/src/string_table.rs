//! Interned constant strings of a module.

use crate::error::{FormatError, FormatResult};
use crate::reader::ByteReader;
use core_types::JsString;

const HEADER_LEN: usize = 8;

fn malformed(reason: impl Into<String>) -> FormatError {
    FormatError::MalformedSection {
        section: "string table",
        reason: reason.into(),
    }
}

/// Constant strings addressed by index.
///
/// Layout: total length (u32, covering the whole section), entry count
/// (u32), one u32 offset per entry relative to the start of the raw bytes,
/// then the concatenated raw bytes. The last entry runs to the end of the
/// section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    entries: Vec<JsString>,
}

impl StringTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `s`, adding it if absent.
    pub fn intern(&mut self, s: &str) -> FormatResult<u16> {
        if let Some(i) = self.entries.iter().position(|e| e.as_str() == s) {
            return Ok(i as u16);
        }
        if self.entries.len() > u16::MAX as usize {
            return Err(FormatError::TooMany {
                what: "string",
                count: self.entries.len() + 1,
                limit: u16::MAX as usize + 1,
            });
        }
        self.entries.push(JsString::from(s));
        Ok((self.entries.len() - 1) as u16)
    }

    /// Entry at `index`.
    pub fn get(&self, index: u16) -> Option<&JsString> {
        self.entries.get(index as usize)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &JsString> {
        self.entries.iter()
    }

    /// Encoded section length.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + 4 * self.entries.len() + self.entries.iter().map(|e| e.len()).sum::<usize>()
    }

    /// Appends the encoded section to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        let mut offset = 0u32;
        for entry in &self.entries {
            out.extend_from_slice(&offset.to_le_bytes());
            offset += entry.len() as u32;
        }
        for entry in &self.entries {
            out.extend_from_slice(entry.as_bytes());
        }
    }

    /// Decodes the section at the reader's position.
    pub fn decode(reader: &mut ByteReader<'_>) -> FormatResult<Self> {
        let length = reader.u32()? as usize;
        let count = reader.u32()? as usize;
        let offsets_len = count
            .checked_mul(4)
            .ok_or_else(|| malformed("entry count overflows"))?;
        if length < HEADER_LEN + offsets_len {
            return Err(malformed(format!(
                "length {} too small for {} entries",
                length, count
            )));
        }
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(reader.u32()? as usize);
        }
        let raw = reader.bytes(length - HEADER_LEN - offsets_len)?;

        let mut entries = Vec::with_capacity(count);
        for (i, &start) in offsets.iter().enumerate() {
            let end = offsets.get(i + 1).copied().unwrap_or(raw.len());
            if start > end || end > raw.len() {
                return Err(malformed(format!("entry {} spans {}..{}", i, start, end)));
            }
            entries.push(JsString::from(String::from_utf8_lossy(&raw[start..end]).into_owned()));
        }
        Ok(StringTable { entries })
    }
}
