//! Edge info - variable-length shared metadata for a physical way:
//! polyline shape plus the ordered, language-tagged name table.
//!
//! Record layout (little-endian), length-prefixed in the tile blob:
//!
//!   point_count: u32          // >= 2
//!   name_count:  u8
//!   points:      point_count * (lat: i32, lon: i32)   // 1e-6 degrees
//!   names:       name_count * 12 bytes:
//!     text_off:   u32  // into the shared text blob
//!     pron_off:   u32  // valid when flags has-pronunciation bit set
//!     name_index: u8
//!     flags:      u8   // route_number:1 | side:2 | direction:2 | has_lang:1 | has_pron:1
//!     lang:       u8
//!     alphabet:   u8
//!
//! Records are de-duplicated by content: the two directed edges of a way
//! store the same blob offset.

use rustc_hash::FxHashMap;

use crate::error::{Result, TileError};
use crate::names::lang::{linguistic_map, Language, LinguisticMap, Pronunciation, PronunciationAlphabet};
use crate::names::tags::{Direction, Side};
use crate::names::NameEntry;
use crate::records::text::{self, TextTable};

/// Fixed-point scale for shape coordinates: 1e-6 degrees.
pub const SHAPE_SCALE: f64 = 1_000_000.0;

const NAME_ENTRY_SIZE: usize = 12;

const FLAG_ROUTE_NUMBER: u8 = 1 << 0;
const SIDE_SHIFT: u8 = 1;
const DIRECTION_SHIFT: u8 = 3;
const FLAG_HAS_LANG: u8 = 1 << 5;
const FLAG_HAS_PRON: u8 = 1 << 6;

/// Decoded edge info: shape and names of one physical way.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    /// Polyline, (lat, lon) degrees, at least two points.
    pub shape: Vec<(f64, f64)>,
    pub names: Vec<NameEntry>,
}

impl EdgeInfo {
    pub fn new(shape: Vec<(f64, f64)>, names: Vec<NameEntry>) -> Self {
        Self { shape, names }
    }

    /// Language/pronunciation side table for the name list.
    pub fn linguistic_map(&self) -> LinguisticMap {
        linguistic_map(&self.names)
    }

    /// Encode into record bytes, interning strings into `text`.
    pub fn encode(&self, text: &mut TextTable) -> Result<Vec<u8>> {
        if self.shape.len() < 2 {
            return Err(TileError::ShortShape(self.shape.len()));
        }
        if self.names.len() > usize::from(u8::MAX) {
            return Err(TileError::RecordRangeViolation {
                field: "name_count",
                value: self.names.len() as u64,
                max: u64::from(u8::MAX),
            });
        }
        let mut bytes =
            Vec::with_capacity(5 + self.shape.len() * 8 + self.names.len() * NAME_ENTRY_SIZE);
        bytes.extend_from_slice(&(self.shape.len() as u32).to_le_bytes());
        bytes.push(self.names.len() as u8);
        for &(lat, lon) in &self.shape {
            let lat_fxp = (lat * SHAPE_SCALE).round() as i32;
            let lon_fxp = (lon * SHAPE_SCALE).round() as i32;
            bytes.extend_from_slice(&lat_fxp.to_le_bytes());
            bytes.extend_from_slice(&lon_fxp.to_le_bytes());
        }
        for name in &self.names {
            let text_off = text.add(&name.text);
            let mut flags = 0u8;
            if name.is_route_number {
                flags |= FLAG_ROUTE_NUMBER;
            }
            flags |= (name.side as u8) << SIDE_SHIFT;
            flags |= (name.direction as u8) << DIRECTION_SHIFT;
            let mut lang = 0u8;
            if let Some(l) = name.language {
                flags |= FLAG_HAS_LANG;
                lang = l as u8;
            }
            let mut pron_off = 0u32;
            let mut alphabet = 0u8;
            if let Some(pron) = &name.pronunciation {
                flags |= FLAG_HAS_PRON;
                pron_off = text.add(&pron.text);
                alphabet = pron.alphabet as u8;
            }
            bytes.extend_from_slice(&text_off.to_le_bytes());
            bytes.extend_from_slice(&pron_off.to_le_bytes());
            bytes.push(name.name_index);
            bytes.push(flags);
            bytes.push(lang);
            bytes.push(alphabet);
        }
        Ok(bytes)
    }

    /// Decode a record from its bytes plus the shared text blob.
    pub fn decode(bytes: &[u8], text_blob: &[u8]) -> Result<EdgeInfo> {
        let truncated = || TileError::Truncated {
            section: "edgeinfo",
        };
        if bytes.len() < 5 {
            return Err(truncated());
        }
        let point_count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let name_count = usize::from(bytes[4]);
        if point_count < 2 {
            return Err(TileError::ShortShape(point_count));
        }
        let names_start = 5 + point_count * 8;
        let end = names_start + name_count * NAME_ENTRY_SIZE;
        if bytes.len() < end {
            return Err(truncated());
        }

        let mut shape = Vec::with_capacity(point_count);
        for i in 0..point_count {
            let at = 5 + i * 8;
            let lat_fxp = i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            let lon_fxp = i32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap());
            shape.push((
                f64::from(lat_fxp) / SHAPE_SCALE,
                f64::from(lon_fxp) / SHAPE_SCALE,
            ));
        }

        let mut names = Vec::with_capacity(name_count);
        for i in 0..name_count {
            let at = names_start + i * NAME_ENTRY_SIZE;
            let text_off = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            let pron_off = u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap());
            let name_index = bytes[at + 8];
            let flags = bytes[at + 9];
            let lang = bytes[at + 10];
            let alphabet = bytes[at + 11];

            let language = if flags & FLAG_HAS_LANG != 0 {
                Some(Language::from_u8(lang).ok_or_else(truncated)?)
            } else {
                None
            };
            let pronunciation = if flags & FLAG_HAS_PRON != 0 {
                Some(Pronunciation {
                    alphabet: PronunciationAlphabet::from_u8(alphabet).ok_or_else(truncated)?,
                    text: text::get(text_blob, pron_off)?.to_string(),
                })
            } else {
                None
            };
            names.push(NameEntry {
                text: text::get(text_blob, text_off)?.to_string(),
                name_index,
                language,
                pronunciation,
                is_route_number: flags & FLAG_ROUTE_NUMBER != 0,
                side: Side::from_u8((flags >> SIDE_SHIFT) & 0x3),
                direction: Direction::from_u8((flags >> DIRECTION_SHIFT) & 0x3),
            });
        }
        Ok(EdgeInfo { shape, names })
    }
}

/// Build-time arena of edge-info records, de-duplicated by content.
/// `add` returns the stable blob offset EdgeRecords store; the offset
/// points at a u32 record-length prefix.
#[derive(Debug, Default)]
pub struct EdgeInfoTable {
    blob: Vec<u8>,
    offsets: FxHashMap<Vec<u8>, u32>,
}

impl EdgeInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, info: &EdgeInfo, text: &mut TextTable) -> Result<u32> {
        let record = info.encode(text)?;
        if let Some(&offset) = self.offsets.get(&record) {
            return Ok(offset);
        }
        let offset = self.blob.len() as u32;
        self.blob
            .extend_from_slice(&(record.len() as u32).to_le_bytes());
        self.blob.extend_from_slice(&record);
        self.offsets.insert(record, offset);
        Ok(offset)
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn into_blob(self) -> Vec<u8> {
        self.blob
    }
}

/// Decode the record at `offset` within an edge-info blob.
pub fn decode_at(blob: &[u8], offset: u32, text_blob: &[u8]) -> Result<EdgeInfo> {
    let start = offset as usize;
    if start + 4 > blob.len() {
        return Err(TileError::Truncated {
            section: "edgeinfo",
        });
    }
    let len = u32::from_le_bytes(blob[start..start + 4].try_into().unwrap()) as usize;
    let end = start + 4 + len;
    if end > blob.len() {
        return Err(TileError::Truncated {
            section: "edgeinfo",
        });
    }
    EdgeInfo::decode(&blob[start + 4..end], text_blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_names() -> Vec<NameEntry> {
        let mut first = NameEntry::new("Albert Street");
        first.language = Some(Language::En);
        first.pronunciation = Some(Pronunciation {
            alphabet: PronunciationAlphabet::Ipa,
            text: "ˈælbərt striːt".to_string(),
        });
        let mut second = NameEntry::new("rue Albert");
        second.name_index = 1;
        second.language = Some(Language::Fr);
        let mut route = NameEntry::new("SR 37");
        route.name_index = 2;
        route.is_route_number = true;
        vec![first, second, route]
    }

    #[test]
    fn test_roundtrip() {
        let info = EdgeInfo::new(
            vec![(45.4215, -75.6972), (45.4220, -75.6965)],
            sample_names(),
        );
        let mut text = TextTable::new();
        let bytes = info.encode(&mut text).unwrap();
        let decoded = EdgeInfo::decode(&bytes, text.blob()).unwrap();

        assert_eq!(decoded.names, info.names);
        assert_eq!(decoded.shape.len(), 2);
        for (a, b) in decoded.shape.iter().zip(&info.shape) {
            assert!((a.0 - b.0).abs() < 1.0 / SHAPE_SCALE);
            assert!((a.1 - b.1).abs() < 1.0 / SHAPE_SCALE);
        }
        let map = decoded.linguistic_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&0].language, Some(Language::En));
        assert_eq!(map[&0].pronunciation, "ˈælbərt striːt");
        assert!(map.keys().all(|k| usize::from(*k) < decoded.names.len()));
    }

    #[test]
    fn test_empty_name_list_is_valid() {
        let info = EdgeInfo::new(vec![(0.0, 0.0), (0.001, 0.001)], vec![]);
        let mut text = TextTable::new();
        let bytes = info.encode(&mut text).unwrap();
        let decoded = EdgeInfo::decode(&bytes, text.blob()).unwrap();
        assert!(decoded.names.is_empty());
    }

    #[test]
    fn test_short_shape_rejected() {
        let info = EdgeInfo::new(vec![(0.0, 0.0)], vec![]);
        let mut text = TextTable::new();
        assert!(matches!(
            info.encode(&mut text),
            Err(TileError::ShortShape(1))
        ));
    }

    #[test]
    fn test_name_count_overflow_rejected() {
        // name_count is one byte; 300 entries must not wrap to 44
        let names: Vec<NameEntry> = (0..300)
            .map(|i| NameEntry::new(format!("Street {i}")))
            .collect();
        let info = EdgeInfo::new(vec![(1.0, 2.0), (3.0, 4.0)], names);
        let mut text = TextTable::new();
        assert!(matches!(
            info.encode(&mut text),
            Err(TileError::RecordRangeViolation {
                field: "name_count",
                value: 300,
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let info = EdgeInfo::new(vec![(1.0, 2.0), (3.0, 4.0)], sample_names());
        let mut text = TextTable::new();
        let bytes = info.encode(&mut text).unwrap();
        let err = EdgeInfo::decode(&bytes[..bytes.len() - 3], text.blob());
        assert!(matches!(err, Err(TileError::Truncated { .. })));
    }

    #[test]
    fn test_table_deduplicates() {
        let info = EdgeInfo::new(vec![(1.0, 2.0), (3.0, 4.0)], sample_names());
        let mut text = TextTable::new();
        let mut table = EdgeInfoTable::new();
        let a = table.add(&info, &mut text).unwrap();
        let b = table.add(&info, &mut text).unwrap();
        assert_eq!(a, b);

        let other = EdgeInfo::new(vec![(1.0, 2.0), (3.0, 5.0)], vec![]);
        let c = table.add(&other, &mut text).unwrap();
        assert_ne!(a, c);

        let decoded = decode_at(table.blob(), a, text.blob()).unwrap();
        assert_eq!(decoded.names.len(), 3);
        let decoded_other = decode_at(table.blob(), c, text.blob()).unwrap();
        assert!(decoded_other.names.is_empty());
    }

    #[test]
    fn test_name_indices_stable_across_directions() {
        // the record is shared: both directions decode identical indices
        let info = EdgeInfo::new(vec![(1.0, 2.0), (3.0, 4.0)], sample_names());
        let mut text = TextTable::new();
        let mut table = EdgeInfoTable::new();
        let offset = table.add(&info, &mut text).unwrap();
        let fwd = decode_at(table.blob(), offset, text.blob()).unwrap();
        let bwd = decode_at(table.blob(), offset, text.blob()).unwrap();
        let fwd_indices: Vec<u8> = fwd.names.iter().map(|n| n.name_index).collect();
        let bwd_indices: Vec<u8> = bwd.names.iter().map(|n| n.name_index).collect();
        assert_eq!(fwd_indices, bwd_indices);
        assert_eq!(fwd_indices, vec![0, 1, 2]);
    }
}
