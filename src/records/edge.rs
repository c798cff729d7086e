//! EdgeRecord - fixed 24-byte bit-packed record, one per directed edge.
//!
//! Two records referencing the same edge-info offset are the two
//! directions of one physical way. Layout (little-endian):
//!
//!   edgeinfo_offset: u32  // offset into the tile's edge-info blob
//!   end_node:        u64  // packed SpatialTileId of the other end
//!   length_m:        u32  // meters, saturated
//!   classification:  u16  // road_class:3 | use:6 | spare:7
//!   flags:           u16  // tunnel, bridge, oneway, roundabout, forward, link, toll
//!   reserved:        u32  // padding to 24 bytes

use crate::error::{Result, TileError};
use crate::records::{RoadClass, INTERNAL_VERSION};
use crate::tileid::SpatialTileId;

pub const EDGE_RECORD_SIZE: usize = 24;

const FLAG_TUNNEL: u16 = 1 << 0;
const FLAG_BRIDGE: u16 = 1 << 1;
const FLAG_ONEWAY: u16 = 1 << 2;
const FLAG_ROUNDABOUT: u16 = 1 << 3;
const FLAG_FORWARD: u16 = 1 << 4;
const FLAG_LINK: u16 = 1 << 5;
const FLAG_TOLL: u16 = 1 << 6;

/// How the edge is used. 6 bits in the classification word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EdgeUse {
    Road = 0,
    Ramp = 1,
    TurnChannel = 2,
    Track = 3,
    Driveway = 4,
    Alley = 5,
    ParkingAisle = 6,
    EmergencyAccess = 7,
    CulDeSac = 8,
    Ferry = 9,
    RailFerry = 10,
}

impl EdgeUse {
    pub fn from_u8(value: u8) -> EdgeUse {
        use EdgeUse::*;
        match value {
            1 => Ramp,
            2 => TurnChannel,
            3 => Track,
            4 => Driveway,
            5 => Alley,
            6 => ParkingAisle,
            7 => EmergencyAccess,
            8 => CulDeSac,
            9 => Ferry,
            10 => RailFerry,
            _ => Road,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    edgeinfo_offset: u32,
    end_node: u64,
    length_m: u32,
    classification: u16,
    flags: u16,
}

impl EdgeRecord {
    /// Create a record for one direction of a way. `forward` is true for
    /// the direction matching the way's shape order.
    pub fn new(
        edgeinfo_offset: u32,
        end_node: SpatialTileId,
        length_m: u32,
        road_class: RoadClass,
        use_: EdgeUse,
        forward: bool,
    ) -> Result<EdgeRecord> {
        if !end_node.is_valid() {
            return Err(TileError::RecordRangeViolation {
                field: "end_node",
                value: end_node.value(),
                max: 0,
            });
        }
        Ok(EdgeRecord {
            edgeinfo_offset,
            end_node: end_node.value(),
            length_m,
            classification: u16::from(road_class as u8) | (u16::from(use_ as u8) << 3),
            flags: if forward { FLAG_FORWARD } else { 0 },
        })
    }

    /// Layout version of this record. Bump on any field change.
    pub fn internal_version() -> u32 {
        INTERNAL_VERSION
    }

    /// Offset of the shared edge-info record within the tile.
    pub fn edgeinfo_offset(&self) -> u32 {
        self.edgeinfo_offset
    }

    pub fn end_node(&self) -> SpatialTileId {
        SpatialTileId::from_raw(self.end_node)
    }

    pub fn length_m(&self) -> u32 {
        self.length_m
    }

    pub fn road_class(&self) -> RoadClass {
        RoadClass::from_u8((self.classification & 0x7) as u8)
    }

    pub fn use_(&self) -> EdgeUse {
        EdgeUse::from_u8(((self.classification >> 3) & 0x3f) as u8)
    }

    pub fn forward(&self) -> bool {
        self.flags & FLAG_FORWARD != 0
    }

    pub fn tunnel(&self) -> bool {
        self.flags & FLAG_TUNNEL != 0
    }

    pub fn set_tunnel(&mut self, on: bool) {
        self.set_flag(FLAG_TUNNEL, on);
    }

    pub fn bridge(&self) -> bool {
        self.flags & FLAG_BRIDGE != 0
    }

    pub fn set_bridge(&mut self, on: bool) {
        self.set_flag(FLAG_BRIDGE, on);
    }

    pub fn oneway(&self) -> bool {
        self.flags & FLAG_ONEWAY != 0
    }

    pub fn set_oneway(&mut self, on: bool) {
        self.set_flag(FLAG_ONEWAY, on);
    }

    pub fn roundabout(&self) -> bool {
        self.flags & FLAG_ROUNDABOUT != 0
    }

    pub fn set_roundabout(&mut self, on: bool) {
        self.set_flag(FLAG_ROUNDABOUT, on);
    }

    pub fn link(&self) -> bool {
        self.flags & FLAG_LINK != 0
    }

    pub fn set_link(&mut self, on: bool) {
        self.set_flag(FLAG_LINK, on);
    }

    pub fn toll(&self) -> bool {
        self.flags & FLAG_TOLL != 0
    }

    pub fn set_toll(&mut self, on: bool) {
        self.set_flag(FLAG_TOLL, on);
    }

    fn set_flag(&mut self, flag: u16, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    pub fn to_bytes(&self) -> [u8; EDGE_RECORD_SIZE] {
        let mut bytes = [0u8; EDGE_RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.edgeinfo_offset.to_le_bytes());
        bytes[4..12].copy_from_slice(&self.end_node.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.length_m.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.classification.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.flags.to_le_bytes());
        // bytes 20..24 reserved
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<EdgeRecord> {
        if bytes.len() < EDGE_RECORD_SIZE {
            return Err(TileError::Truncated { section: "edges" });
        }
        Ok(EdgeRecord {
            edgeinfo_offset: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            end_node: u64::from_le_bytes(bytes[4..12].try_into().unwrap()),
            length_m: u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
            classification: u16::from_le_bytes(bytes[16..18].try_into().unwrap()),
            flags: u16::from_le_bytes(bytes[18..20].try_into().unwrap()),
        })
    }
}
