//! NodeRecord - fixed 20-byte bit-packed record, one per graph node.
//!
//! The graph is a forward star: a node points at its first outbound
//! directed edge and carries the outbound count; all outbound edges live
//! in the node's own tile. Layout (little-endian):
//!
//!   lat:          f32
//!   lon:          f32
//!   attributes:   u32  // edge_index:22 | edge_count:7 | best_road_class:3
//!   access:       u8   // access bit flags
//!   intersection: u8   // NodeKind
//!   admin:        u16  // admin_index:6 | timezone:6 | dst:1 | spare:3
//!   node_type:    u32  // density:4 | end:1 | transit_stop:23 | spare:4
//!
//! Fields are range-checked at construction; records are never mutated
//! after a tile is finalized, so accessors decode with plain masking.

use crate::error::{Result, TileError};
use crate::records::{RoadClass, INTERNAL_VERSION};

/// Maximum outbound edges per node (7 bits).
pub const MAX_EDGES_PER_NODE: u32 = 127;

pub const NODE_RECORD_SIZE: usize = 20;

const EDGE_INDEX_BITS: u32 = 22;
const EDGE_INDEX_MAX: u32 = (1 << EDGE_INDEX_BITS) - 1;
const DENSITY_MAX: u32 = 15;
const TRANSIT_STOP_MAX: u32 = (1 << 23) - 1;
const ADMIN_INDEX_MAX: u16 = 63;
const TIMEZONE_MAX: u16 = 63;

/// What kind of node this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeKind {
    StreetIntersection = 0,
    Gate = 1,
    Bollard = 2,
    TollBooth = 3,
    TransitStop = 4,
    BorderControl = 5,
}

impl NodeKind {
    pub fn from_u8(value: u8) -> NodeKind {
        use NodeKind::*;
        match value {
            1 => Gate,
            2 => Bollard,
            3 => TollBooth,
            4 => TransitStop,
            5 => BorderControl,
            _ => StreetIntersection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    lat: f32,
    lon: f32,
    attributes: u32,
    access: u8,
    intersection: u8,
    admin: u16,
    node_type: u32,
}

impl NodeRecord {
    /// Create a record. Fails with `RecordRangeViolation` when the edge
    /// index or count exceed their bit-widths; a violation aborts the
    /// tile build.
    pub fn new(
        lat: f32,
        lon: f32,
        edge_index: u32,
        edge_count: u32,
        best_road_class: RoadClass,
    ) -> Result<NodeRecord> {
        if edge_index > EDGE_INDEX_MAX {
            return Err(TileError::RecordRangeViolation {
                field: "edge_index",
                value: u64::from(edge_index),
                max: u64::from(EDGE_INDEX_MAX),
            });
        }
        if edge_count > MAX_EDGES_PER_NODE {
            return Err(TileError::RecordRangeViolation {
                field: "edge_count",
                value: u64::from(edge_count),
                max: u64::from(MAX_EDGES_PER_NODE),
            });
        }
        Ok(NodeRecord {
            lat,
            lon,
            attributes: edge_index
                | (edge_count << EDGE_INDEX_BITS)
                | (u32::from(best_road_class as u8) << 29),
            access: 0,
            intersection: NodeKind::StreetIntersection as u8,
            admin: 0,
            node_type: 0,
        })
    }

    /// Layout version of this record. Bump on any field change.
    pub fn internal_version() -> u32 {
        INTERNAL_VERSION
    }

    pub fn lat(&self) -> f32 {
        self.lat
    }

    pub fn lon(&self) -> f32 {
        self.lon
    }

    /// Index within this tile of the first outbound directed edge.
    pub fn edge_index(&self) -> u32 {
        self.attributes & EDGE_INDEX_MAX
    }

    /// Number of outbound directed edges.
    pub fn edge_count(&self) -> u32 {
        (self.attributes >> EDGE_INDEX_BITS) & 0x7f
    }

    /// Best road class among the outbound edges.
    pub fn best_road_class(&self) -> RoadClass {
        RoadClass::from_u8(((self.attributes >> 29) & 0x7) as u8)
    }

    pub fn access(&self) -> u8 {
        self.access
    }

    pub fn set_access(&mut self, access: u8) {
        self.access = access;
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_u8(self.intersection)
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.intersection = kind as u8;
    }

    pub fn set_admin(&mut self, admin_index: u16, timezone: u16, dst: bool) -> Result<()> {
        if admin_index > ADMIN_INDEX_MAX {
            return Err(TileError::RecordRangeViolation {
                field: "admin_index",
                value: u64::from(admin_index),
                max: u64::from(ADMIN_INDEX_MAX),
            });
        }
        if timezone > TIMEZONE_MAX {
            return Err(TileError::RecordRangeViolation {
                field: "timezone",
                value: u64::from(timezone),
                max: u64::from(TIMEZONE_MAX),
            });
        }
        self.admin = admin_index | (timezone << 6) | (u16::from(dst) << 12);
        Ok(())
    }

    /// Index into the tile's admin table.
    pub fn admin_index(&self) -> u16 {
        self.admin & 0x3f
    }

    pub fn timezone(&self) -> u16 {
        (self.admin >> 6) & 0x3f
    }

    pub fn dst(&self) -> bool {
        (self.admin >> 12) & 1 != 0
    }

    /// Relative road density around the node, 0..=15.
    pub fn set_density(&mut self, density: u32) -> Result<()> {
        if density > DENSITY_MAX {
            return Err(TileError::RecordRangeViolation {
                field: "density",
                value: u64::from(density),
                max: u64::from(DENSITY_MAX),
            });
        }
        self.node_type = (self.node_type & !0xf) | density;
        Ok(())
    }

    pub fn density(&self) -> u32 {
        self.node_type & 0xf
    }

    /// Node connects to a single edge.
    pub fn set_end(&mut self, end: bool) {
        self.node_type = (self.node_type & !(1 << 4)) | (u32::from(end) << 4);
    }

    pub fn end(&self) -> bool {
        (self.node_type >> 4) & 1 != 0
    }

    /// Transit stop linkage; zero means none.
    pub fn set_transit_stop(&mut self, stop: u32) -> Result<()> {
        if stop > TRANSIT_STOP_MAX {
            return Err(TileError::RecordRangeViolation {
                field: "transit_stop",
                value: u64::from(stop),
                max: u64::from(TRANSIT_STOP_MAX),
            });
        }
        self.node_type = (self.node_type & !(TRANSIT_STOP_MAX << 5)) | (stop << 5);
        Ok(())
    }

    pub fn transit_stop(&self) -> u32 {
        (self.node_type >> 5) & TRANSIT_STOP_MAX
    }

    pub fn to_bytes(&self) -> [u8; NODE_RECORD_SIZE] {
        let mut bytes = [0u8; NODE_RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.lat.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.lon.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.attributes.to_le_bytes());
        bytes[12] = self.access;
        bytes[13] = self.intersection;
        bytes[14..16].copy_from_slice(&self.admin.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.node_type.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<NodeRecord> {
        if bytes.len() < NODE_RECORD_SIZE {
            return Err(TileError::Truncated { section: "nodes" });
        }
        Ok(NodeRecord {
            lat: f32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            lon: f32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            attributes: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            access: bytes[12],
            intersection: bytes[13],
            admin: u16::from_le_bytes(bytes[14..16].try_into().unwrap()),
            node_type: u32::from_le_bytes(bytes[16..20].try_into().unwrap()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::access;

    #[test]
    fn test_pack_unpack_fields() {
        let mut node = NodeRecord::new(40.5, -82.7, 1234, 5, RoadClass::Primary).unwrap();
        node.set_access(access::AUTO | access::BICYCLE);
        node.set_admin(12, 33, true).unwrap();
        node.set_density(7).unwrap();
        node.set_kind(NodeKind::Gate);
        node.set_transit_stop(99_000).unwrap();

        let decoded = NodeRecord::from_bytes(&node.to_bytes()).unwrap();
        assert_eq!(decoded.edge_index(), 1234);
        assert_eq!(decoded.edge_count(), 5);
        assert_eq!(decoded.best_road_class(), RoadClass::Primary);
        assert_eq!(decoded.access(), access::AUTO | access::BICYCLE);
        assert_eq!(decoded.admin_index(), 12);
        assert_eq!(decoded.timezone(), 33);
        assert!(decoded.dst());
        assert_eq!(decoded.density(), 7);
        assert_eq!(decoded.kind(), NodeKind::Gate);
        assert_eq!(decoded.transit_stop(), 99_000);
        assert!((decoded.lat() - 40.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_edge_count_range() {
        assert!(NodeRecord::new(0.0, 0.0, 0, MAX_EDGES_PER_NODE, RoadClass::ServiceOther).is_ok());
        let err = NodeRecord::new(0.0, 0.0, 0, MAX_EDGES_PER_NODE + 1, RoadClass::ServiceOther);
        assert!(matches!(
            err,
            Err(TileError::RecordRangeViolation {
                field: "edge_count",
                ..
            })
        ));
    }

    #[test]
    fn test_edge_index_range() {
        let err = NodeRecord::new(0.0, 0.0, 1 << 22, 0, RoadClass::ServiceOther);
        assert!(matches!(
            err,
            Err(TileError::RecordRangeViolation {
                field: "edge_index",
                ..
            })
        ));
    }

    #[test]
    fn test_record_size() {
        let node = NodeRecord::new(1.0, 2.0, 3, 4, RoadClass::Motorway).unwrap();
        assert_eq!(node.to_bytes().len(), NODE_RECORD_SIZE);
    }
}
