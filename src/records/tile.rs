//! Tile container - the binary tile file.
//!
//! Format (little-endian):
//!
//! Header (64 bytes):
//!   magic:         u32 = 0x5754494C  // "WTIL"
//!   version:       u32 = INTERNAL_VERSION
//!   tile_id:       u64  // packed SpatialTileId, entity index 0
//!   node_count:    u32
//!   edge_count:    u32
//!   edgeinfo_size: u32
//!   sign_count:    u32
//!   text_size:     u32
//!   flags:         u32  // bit 0: elevation present
//!   admin_set:     u32  // reference into the admin lookup this tile was built with
//!   reserved:      [u8; 20]
//!
//! Body: node records, edge records, edge-info blob, sign records, text
//! blob, in that order.
//!
//! Footer (16 bytes): body_crc64, file_crc64.
//!
//! Tiles are immutable once written; any number of readers may decode the
//! same tile concurrently. During a build the tile is exclusively owned
//! by its `TileBuilder`, and `finalize` publishes it atomically (write to
//! a temp file, then rename), so an aborted build never leaves a partial
//! tile visible.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TileError};
use crate::records::edge::{EdgeRecord, EDGE_RECORD_SIZE};
use crate::records::edgeinfo::{self, EdgeInfo, EdgeInfoTable};
use crate::records::node::{NodeRecord, NODE_RECORD_SIZE};
use crate::records::sign::{self, SignInfo, SignOwner, SIGN_RECORD_SIZE};
use crate::records::text::TextTable;
use crate::records::{crc, INTERNAL_VERSION};
use crate::tileid::SpatialTileId;

const MAGIC: u32 = 0x5754_494C; // "WTIL"
const HEADER_SIZE: usize = 64;
const FOOTER_SIZE: usize = 16;

const FLAG_ELEVATION: u32 = 1 << 0;

/// Path of a tile file under a tile directory: `{dir}/{level}/{index}.wtl`.
pub fn tile_path(dir: &Path, id: SpatialTileId) -> PathBuf {
    dir.join(id.level().to_string())
        .join(format!("{}.wtl", id.tile_index()))
}

/// Exclusive owner of a tile under construction.
pub struct TileBuilder {
    id: SpatialTileId,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    edgeinfo: EdgeInfoTable,
    text: TextTable,
    signs: Vec<(SignOwner, SignInfo)>,
    has_elevation: bool,
    admin_set: u32,
}

impl TileBuilder {
    pub fn new(id: SpatialTileId) -> Self {
        Self {
            id: id.tile_base(),
            nodes: Vec::new(),
            edges: Vec::new(),
            edgeinfo: EdgeInfoTable::new(),
            text: TextTable::new(),
            signs: Vec::new(),
            has_elevation: false,
            admin_set: 0,
        }
    }

    pub fn set_elevation_present(&mut self, present: bool) {
        self.has_elevation = present;
    }

    pub fn set_admin_set(&mut self, admin_set: u32) {
        self.admin_set = admin_set;
    }

    /// Add a node, returning its entity id within this tile.
    pub fn add_node(&mut self, node: NodeRecord) -> Result<SpatialTileId> {
        let index = self.nodes.len() as u32;
        let id = self.id.with_entity_index(index);
        if !id.is_valid() {
            return Err(TileError::RecordRangeViolation {
                field: "node_index",
                value: u64::from(index),
                max: u64::from(crate::tileid::MAX_TILE_EDGE_COUNT),
            });
        }
        self.nodes.push(node);
        Ok(id)
    }

    /// Add a directed edge, returning its index within this tile.
    pub fn add_edge(&mut self, edge: EdgeRecord) -> Result<u32> {
        let index = self.edges.len() as u32;
        if !self.id.with_entity_index(index).is_valid() {
            return Err(TileError::RecordRangeViolation {
                field: "edge_index",
                value: u64::from(index),
                max: u64::from(crate::tileid::MAX_TILE_EDGE_COUNT),
            });
        }
        self.edges.push(edge);
        Ok(index)
    }

    /// Intern an edge-info record, returning the offset edge records
    /// store. Both directions of a way get the same offset.
    pub fn add_edge_info(&mut self, info: &EdgeInfo) -> Result<u32> {
        self.edgeinfo.add(info, &mut self.text)
    }

    pub fn add_edge_signs(&mut self, edge_index: u32, signs: Vec<SignInfo>) {
        for s in signs {
            self.signs.push((SignOwner::Edge(edge_index), s));
        }
    }

    pub fn add_node_signs(&mut self, node_index: u32, signs: Vec<SignInfo>) {
        for s in signs {
            self.signs.push((SignOwner::Node(node_index), s));
        }
    }

    /// Validate, serialize and atomically publish the tile under `dir`.
    /// On any error nothing is left behind at the tile path.
    pub fn finalize(mut self, dir: &Path) -> Result<PathBuf> {
        // forward-star consistency before anything touches disk
        let edge_count = self.edges.len() as u32;
        for node in &self.nodes {
            if node.edge_index() + node.edge_count() > edge_count {
                return Err(TileError::RecordRangeViolation {
                    field: "edge_index + edge_count",
                    value: u64::from(node.edge_index() + node.edge_count()),
                    max: u64::from(edge_count),
                });
            }
        }

        let mut sign_bytes = Vec::with_capacity(self.signs.len() * SIGN_RECORD_SIZE);
        for (owner, s) in &self.signs {
            sign::encode(*owner, s, &mut self.text, &mut sign_bytes);
        }
        let edgeinfo_blob = self.edgeinfo.into_blob();
        let text_blob = self.text.into_blob();

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(&MAGIC.to_le_bytes());
        header.extend_from_slice(&INTERNAL_VERSION.to_le_bytes());
        header.extend_from_slice(&self.id.value().to_le_bytes());
        header.extend_from_slice(&(self.nodes.len() as u32).to_le_bytes());
        header.extend_from_slice(&(self.edges.len() as u32).to_le_bytes());
        header.extend_from_slice(&(edgeinfo_blob.len() as u32).to_le_bytes());
        header.extend_from_slice(&(self.signs.len() as u32).to_le_bytes());
        header.extend_from_slice(&(text_blob.len() as u32).to_le_bytes());
        let flags = if self.has_elevation { FLAG_ELEVATION } else { 0 };
        header.extend_from_slice(&flags.to_le_bytes());
        header.extend_from_slice(&self.admin_set.to_le_bytes());
        header.extend_from_slice(&[0u8; 20]);
        assert_eq!(header.len(), HEADER_SIZE);

        let path = tile_path(dir, self.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("wtl.tmp");

        let result = (|| -> Result<()> {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let mut body_digest = crc::Digest::new();
            let mut file_digest = crc::Digest::new();

            writer.write_all(&header)?;
            file_digest.update(&header);

            let mut write_section = |writer: &mut BufWriter<File>, bytes: &[u8]| -> Result<()> {
                writer.write_all(bytes)?;
                body_digest.update(bytes);
                file_digest.update(bytes);
                Ok(())
            };
            for node in &self.nodes {
                write_section(&mut writer, &node.to_bytes())?;
            }
            for edge in &self.edges {
                write_section(&mut writer, &edge.to_bytes())?;
            }
            write_section(&mut writer, &edgeinfo_blob)?;
            write_section(&mut writer, &sign_bytes)?;
            write_section(&mut writer, &text_blob)?;

            writer.write_all(&body_digest.finalize().to_le_bytes())?;
            writer.write_all(&file_digest.finalize().to_le_bytes())?;
            writer.flush()?;
            Ok(())
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        fs::rename(&tmp_path, &path)?;
        debug!(
            tile = self.id.tile_index(),
            level = self.id.level(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "tile finalized"
        );
        Ok(path)
    }
}

/// An immutable, decoded tile. `Send + Sync`; share freely across reader
/// threads.
pub struct Tile {
    id: SpatialTileId,
    has_elevation: bool,
    admin_set: u32,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    edgeinfo_blob: Vec<u8>,
    signs: Vec<(SignOwner, SignInfo)>,
    text_blob: Vec<u8>,
}

impl Tile {
    /// Read and decode the tile for `id` under `dir`.
    pub fn read(dir: &Path, id: SpatialTileId) -> Result<Tile> {
        let mut file = File::open(tile_path(dir, id.tile_base()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Tile::from_bytes(&bytes)
    }

    /// Decode a tile from its file bytes, verifying header, bounds and
    /// checksum. Structural corruption is fatal; missing optional data is
    /// not.
    pub fn from_bytes(bytes: &[u8]) -> Result<Tile> {
        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(TileError::Truncated { section: "header" });
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(TileError::InvalidMagic(magic));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if version != INTERNAL_VERSION {
            return Err(TileError::FormatVersionMismatch {
                found: version,
                expected: INTERNAL_VERSION,
            });
        }
        let id = SpatialTileId::from_raw(u64::from_le_bytes(bytes[8..16].try_into().unwrap()));
        let node_count = u32::from_le_bytes(bytes[16..20].try_into().unwrap()) as usize;
        let edge_count = u32::from_le_bytes(bytes[20..24].try_into().unwrap()) as usize;
        let edgeinfo_size = u32::from_le_bytes(bytes[24..28].try_into().unwrap()) as usize;
        let sign_count = u32::from_le_bytes(bytes[28..32].try_into().unwrap()) as usize;
        let text_size = u32::from_le_bytes(bytes[32..36].try_into().unwrap()) as usize;
        let flags = u32::from_le_bytes(bytes[36..40].try_into().unwrap());
        let admin_set = u32::from_le_bytes(bytes[40..44].try_into().unwrap());

        let body_size = node_count * NODE_RECORD_SIZE
            + edge_count * EDGE_RECORD_SIZE
            + edgeinfo_size
            + sign_count * SIGN_RECORD_SIZE
            + text_size;
        if bytes.len() != HEADER_SIZE + body_size + FOOTER_SIZE {
            return Err(TileError::Truncated { section: "body" });
        }

        let footer_at = bytes.len() - FOOTER_SIZE;
        let stored_body_crc =
            u64::from_le_bytes(bytes[footer_at..footer_at + 8].try_into().unwrap());
        let computed_body_crc = crc::checksum(&bytes[HEADER_SIZE..footer_at]);
        if computed_body_crc != stored_body_crc {
            return Err(TileError::ChecksumMismatch {
                expected: stored_body_crc,
                computed: computed_body_crc,
            });
        }
        let stored_file_crc =
            u64::from_le_bytes(bytes[footer_at + 8..footer_at + 16].try_into().unwrap());
        let computed_file_crc = crc::checksum(&bytes[..footer_at]);
        if computed_file_crc != stored_file_crc {
            return Err(TileError::ChecksumMismatch {
                expected: stored_file_crc,
                computed: computed_file_crc,
            });
        }

        let mut at = HEADER_SIZE;
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            nodes.push(NodeRecord::from_bytes(&bytes[at..at + NODE_RECORD_SIZE])?);
            at += NODE_RECORD_SIZE;
        }
        let mut edges = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            edges.push(EdgeRecord::from_bytes(&bytes[at..at + EDGE_RECORD_SIZE])?);
            at += EDGE_RECORD_SIZE;
        }
        let edgeinfo_blob = bytes[at..at + edgeinfo_size].to_vec();
        at += edgeinfo_size;
        let sign_bytes = &bytes[at..at + sign_count * SIGN_RECORD_SIZE];
        at += sign_count * SIGN_RECORD_SIZE;
        let text_blob = bytes[at..at + text_size].to_vec();

        let mut signs = Vec::with_capacity(sign_count);
        for i in 0..sign_count {
            signs.push(sign::decode(
                &sign_bytes[i * SIGN_RECORD_SIZE..(i + 1) * SIGN_RECORD_SIZE],
                &text_blob,
            )?);
        }

        // forward-star bounds are structural
        for node in &nodes {
            if (node.edge_index() + node.edge_count()) as usize > edge_count {
                return Err(TileError::Truncated { section: "nodes" });
            }
        }

        Ok(Tile {
            id,
            has_elevation: flags & FLAG_ELEVATION != 0,
            admin_set,
            nodes,
            edges,
            edgeinfo_blob,
            signs,
            text_blob,
        })
    }

    pub fn id(&self) -> SpatialTileId {
        self.id
    }

    pub fn has_elevation(&self) -> bool {
        self.has_elevation
    }

    pub fn admin_set(&self) -> u32 {
        self.admin_set
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: u32) -> Option<&NodeRecord> {
        self.nodes.get(index as usize)
    }

    pub fn edge(&self, index: u32) -> Option<&EdgeRecord> {
        self.edges.get(index as usize)
    }

    /// Outbound edges of a node, per the forward-star layout.
    pub fn outbound_edges(&self, node: &NodeRecord) -> &[EdgeRecord] {
        let start = node.edge_index() as usize;
        &self.edges[start..start + node.edge_count() as usize]
    }

    /// Decode the edge-info record an edge points at.
    pub fn edge_info(&self, edge: &EdgeRecord) -> Result<EdgeInfo> {
        edgeinfo::decode_at(&self.edgeinfo_blob, edge.edgeinfo_offset(), &self.text_blob)
    }

    pub fn edge_signs(&self, edge_index: u32) -> Vec<&SignInfo> {
        self.signs
            .iter()
            .filter(|(owner, _)| *owner == SignOwner::Edge(edge_index))
            .map(|(_, s)| s)
            .collect()
    }

    pub fn node_signs(&self, node_index: u32) -> Vec<&SignInfo> {
        self.signs
            .iter()
            .filter(|(owner, _)| *owner == SignOwner::Node(node_index))
            .map(|(_, s)| s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::NameEntry;
    use crate::records::edge::EdgeUse;
    use crate::records::sign::SignType;
    use crate::records::RoadClass;

    fn build_minimal(dir: &Path) -> (SpatialTileId, PathBuf) {
        let tile_id = SpatialTileId::from_lat_lon(40.0, -82.5, 2);
        let mut builder = TileBuilder::new(tile_id);

        let info = EdgeInfo::new(
            vec![(40.01, -82.51), (40.02, -82.52)],
            vec![NameEntry::new("6th Avenue")],
        );
        let offset = builder.add_edge_info(&info).unwrap();

        let a = builder
            .add_node(NodeRecord::new(40.01, -82.51, 0, 1, RoadClass::Primary).unwrap())
            .unwrap();
        let b = builder
            .add_node(NodeRecord::new(40.02, -82.52, 1, 1, RoadClass::Primary).unwrap())
            .unwrap();

        let fwd = EdgeRecord::new(offset, b, 1500, RoadClass::Primary, EdgeUse::Road, true).unwrap();
        let bwd = EdgeRecord::new(offset, a, 1500, RoadClass::Primary, EdgeUse::Road, false).unwrap();
        let fwd_index = builder.add_edge(fwd).unwrap();
        builder.add_edge(bwd).unwrap();

        builder.add_edge_signs(
            fwd_index,
            vec![SignInfo::new(SignType::ExitNumber, "126B")],
        );
        builder.add_node_signs(0, vec![SignInfo::new(SignType::JunctionName, "M Junction")]);

        let path = builder.finalize(dir).unwrap();
        (tile_id, path)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let (tile_id, path) = build_minimal(dir.path());
        assert!(path.exists());

        let tile = Tile::read(dir.path(), tile_id).unwrap();
        assert_eq!(tile.id(), tile_id.tile_base());
        assert_eq!(tile.node_count(), 2);
        assert_eq!(tile.edge_count(), 2);

        let node = tile.node(0).unwrap();
        let edges = tile.outbound_edges(node);
        assert_eq!(edges.len(), 1);
        let info = tile.edge_info(&edges[0]).unwrap();
        assert_eq!(info.names[0].text, "6th Avenue");

        // both directions decode the same shared record
        let fwd_info = tile.edge_info(tile.edge(0).unwrap()).unwrap();
        let bwd_info = tile.edge_info(tile.edge(1).unwrap()).unwrap();
        assert_eq!(fwd_info, bwd_info);

        assert_eq!(tile.edge_signs(0)[0].text, "126B");
        assert_eq!(tile.node_signs(0)[0].text, "M Junction");
        assert!(tile.edge_signs(1).is_empty());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (tile_id, path) = build_minimal(dir.path());
        let _ = tile_id;

        let mut bytes = fs::read(&path).unwrap();
        bytes[4..8].copy_from_slice(&(INTERNAL_VERSION + 1).to_le_bytes());
        // refresh the file crc so only the version check trips
        let footer_at = bytes.len() - FOOTER_SIZE;
        let file_crc = crc::checksum(&bytes[..footer_at]);
        bytes[footer_at + 8..].copy_from_slice(&file_crc.to_le_bytes());

        assert!(matches!(
            Tile::from_bytes(&bytes),
            Err(TileError::FormatVersionMismatch { .. })
        ));
    }

    #[test]
    fn test_corruption_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = build_minimal(dir.path());
        let bytes = fs::read(&path).unwrap();

        // truncated
        assert!(matches!(
            Tile::from_bytes(&bytes[..bytes.len() - 1]),
            Err(TileError::Truncated { .. })
        ));

        // bit flip in the body
        let mut flipped = bytes.clone();
        flipped[HEADER_SIZE + 2] ^= 0xff;
        assert!(matches!(
            Tile::from_bytes(&flipped),
            Err(TileError::ChecksumMismatch { .. })
        ));

        // not a tile at all
        assert!(matches!(
            Tile::from_bytes(&vec![0u8; 128]),
            Err(TileError::InvalidMagic(0))
        ));
    }

    #[test]
    fn test_body_checksum_verified() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = build_minimal(dir.path());
        let mut bytes = fs::read(&path).unwrap();

        // the file crc does not cover the footer, so a corrupted body
        // crc is caught only by its own check
        let footer_at = bytes.len() - FOOTER_SIZE;
        bytes[footer_at] ^= 0xff;
        assert!(matches!(
            Tile::from_bytes(&bytes),
            Err(TileError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_aborted_build_leaves_no_tile() {
        let dir = tempfile::tempdir().unwrap();
        let tile_id = SpatialTileId::from_lat_lon(40.0, -82.5, 2);
        let mut builder = TileBuilder::new(tile_id);
        // node claims an outbound edge that was never added
        builder
            .add_node(NodeRecord::new(40.0, -82.5, 0, 1, RoadClass::Primary).unwrap())
            .unwrap();
        let err = builder.finalize(dir.path());
        assert!(matches!(err, Err(TileError::RecordRangeViolation { .. })));
        assert!(!tile_path(dir.path(), tile_id).exists());
    }

    #[test]
    fn test_concurrent_readers() {
        let dir = tempfile::tempdir().unwrap();
        let (tile_id, _) = build_minimal(dir.path());
        let tile = std::sync::Arc::new(Tile::read(dir.path(), tile_id).unwrap());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let tile = tile.clone();
            handles.push(std::thread::spawn(move || {
                let info = tile.edge_info(tile.edge(0).unwrap()).unwrap();
                assert_eq!(info.names[0].text, "6th Avenue");
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
