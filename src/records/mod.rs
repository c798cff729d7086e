//! Bit-packed fixed records and variable-length blobs making up a tile.

pub mod crc;
pub mod edge;
pub mod edgeinfo;
pub mod node;
pub mod sign;
pub mod text;
pub mod tile;

pub use edge::{EdgeRecord, EdgeUse, EDGE_RECORD_SIZE};
pub use edgeinfo::{EdgeInfo, EdgeInfoTable};
pub use node::{NodeKind, NodeRecord, MAX_EDGES_PER_NODE, NODE_RECORD_SIZE};
pub use sign::{SignInfo, SignOwner, SignType};
pub use text::TextTable;
pub use tile::{Tile, TileBuilder};

/// Version of the record bit layouts. Bumped whenever any field width or
/// semantic of NodeRecord, EdgeRecord, edge-info, sign or text encoding
/// changes; readers reject tiles carrying a different value.
pub const INTERNAL_VERSION: u32 = 1;

/// Road classification, highest importance first. 3 bits in records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RoadClass {
    Motorway = 0,
    Trunk = 1,
    Primary = 2,
    Secondary = 3,
    Tertiary = 4,
    Unclassified = 5,
    Residential = 6,
    ServiceOther = 7,
}

impl RoadClass {
    pub fn from_u8(value: u8) -> RoadClass {
        use RoadClass::*;
        match value {
            0 => Motorway,
            1 => Trunk,
            2 => Primary,
            3 => Secondary,
            4 => Tertiary,
            5 => Unclassified,
            6 => Residential,
            _ => ServiceOther,
        }
    }
}

/// Access bit flags shared by node and edge records.
pub mod access {
    pub const AUTO: u8 = 1 << 0;
    pub const PEDESTRIAN: u8 = 1 << 1;
    pub const BICYCLE: u8 = 1 << 2;
    pub const TRUCK: u8 = 1 << 3;
    pub const EMERGENCY: u8 = 1 << 4;
    pub const TAXI: u8 = 1 << 5;
    pub const BUS: u8 = 1 << 6;
    pub const HOV: u8 = 1 << 7;
    pub const ALL: u8 = u8::MAX;
}
