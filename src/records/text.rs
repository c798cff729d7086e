//! Shared text blob: de-duplicated, length-prefixed strings referenced by
//! offset from edge-info name entries and sign records.

use rustc_hash::FxHashMap;

use crate::error::{Result, TileError};

/// Build-time string table. Each distinct string is stored once as a u16
/// length prefix plus UTF-8 bytes; `add` returns the stable blob offset.
#[derive(Debug, Default)]
pub struct TextTable {
    blob: Vec<u8>,
    index: FxHashMap<String, u32>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its offset. Strings longer than u16::MAX
    /// bytes are truncated at a char boundary.
    pub fn add(&mut self, text: &str) -> u32 {
        let mut text = text;
        if text.len() > usize::from(u16::MAX) {
            let mut end = usize::from(u16::MAX);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text = &text[..end];
        }
        if let Some(&offset) = self.index.get(text) {
            return offset;
        }
        let offset = self.blob.len() as u32;
        self.blob.extend_from_slice(&(text.len() as u16).to_le_bytes());
        self.blob.extend_from_slice(text.as_bytes());
        self.index.insert(text.to_string(), offset);
        offset
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn into_blob(self) -> Vec<u8> {
        self.blob
    }
}

/// Read the string at `offset` from a text blob.
pub fn get(blob: &[u8], offset: u32) -> Result<&str> {
    let start = offset as usize;
    let end_len = start
        .checked_add(2)
        .filter(|&e| e <= blob.len())
        .ok_or(TileError::Truncated { section: "text" })?;
    let len = usize::from(u16::from_le_bytes([blob[start], blob[start + 1]]));
    let end = end_len
        .checked_add(len)
        .filter(|&e| e <= blob.len())
        .ok_or(TileError::Truncated { section: "text" })?;
    std::str::from_utf8(&blob[end_len..end])
        .map_err(|_| TileError::Truncated { section: "text" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_get() {
        let mut table = TextTable::new();
        let a = table.add("6th Avenue");
        let b = table.add("rue Albert");
        let blob = table.blob().to_vec();
        assert_eq!(get(&blob, a).unwrap(), "6th Avenue");
        assert_eq!(get(&blob, b).unwrap(), "rue Albert");
    }

    #[test]
    fn test_deduplicated() {
        let mut table = TextTable::new();
        let a = table.add("SR 37");
        let b = table.add("SR 37");
        assert_eq!(a, b);
        assert_eq!(table.blob().len(), 2 + 5);
    }

    #[test]
    fn test_empty_string() {
        let mut table = TextTable::new();
        let off = table.add("");
        assert_eq!(get(table.blob(), off).unwrap(), "");
    }

    #[test]
    fn test_truncated_blob() {
        let mut table = TextTable::new();
        table.add("Bodenbroekstraat");
        let blob = &table.blob()[..4];
        assert!(get(blob, 0).is_err());
        assert!(get(table.blob(), 99).is_err());
    }
}
