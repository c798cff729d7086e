//! Spatial tile addressing.
//!
//! A `SpatialTileId` packs (tile index, hierarchy level, entity index) into
//! one 64-bit value. The tile index is derived from a fixed global grid
//! anchored at (-90, -180), row-major, whose cell size depends on the
//! hierarchy level. The entity index addresses one node or directed edge
//! within the tile.
//!
//! Bit layout (low to high):
//!   level:         3 bits  (0..=7)
//!   tile_index:   27 bits
//!   entity_index: 22 bits
//!   unused:       12 bits  (zero for valid ids)
//!
//! The all-ones value is the invalid sentinel.

const LEVEL_BITS: u64 = 3;
const TILE_INDEX_BITS: u64 = 27;
const ENTITY_INDEX_BITS: u64 = 22;

const LEVEL_MASK: u64 = (1 << LEVEL_BITS) - 1;
const TILE_INDEX_MASK: u64 = (1 << TILE_INDEX_BITS) - 1;
const ENTITY_INDEX_MASK: u64 = (1 << ENTITY_INDEX_BITS) - 1;

/// Maximum number of directed edges (and entity indices) per tile: 2^22 - 1.
pub const MAX_TILE_EDGE_COUNT: u32 = 4_194_303;

/// Grid cell size in degrees per hierarchy level. Levels beyond this table
/// are representable in the id but not used by the default hierarchy.
pub const TILE_SIZES: [f64; 3] = [4.0, 1.0, 0.25];

/// Number of grid columns (tiles per row) at a level, or `None` when the
/// level has no configured cell size.
pub fn tiles_per_row(level: u8) -> Option<u32> {
    let size = TILE_SIZES.get(usize::from(level))?;
    Some((360.0 / size).round() as u32)
}

/// 64-bit composite id addressing a tile, or an entity within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpatialTileId(u64);

impl SpatialTileId {
    /// The invalid sentinel id.
    pub const INVALID: SpatialTileId = SpatialTileId(u64::MAX);

    /// Build an id from its parts. Returns the invalid sentinel when any
    /// part exceeds its bit-width.
    pub fn from_parts(tile_index: u32, level: u8, entity_index: u32) -> SpatialTileId {
        if u64::from(level) > LEVEL_MASK
            || u64::from(tile_index) > TILE_INDEX_MASK
            || u64::from(entity_index) > ENTITY_INDEX_MASK
        {
            return SpatialTileId::INVALID;
        }
        SpatialTileId(
            u64::from(level)
                | (u64::from(tile_index) << LEVEL_BITS)
                | (u64::from(entity_index) << (LEVEL_BITS + TILE_INDEX_BITS)),
        )
    }

    /// Compute the tile containing a point at the given hierarchy level.
    /// Entity index is zero. Returns the invalid sentinel when `level` has
    /// no configured cell size or the point is outside the grid.
    pub fn from_lat_lon(lat: f64, lon: f64, level: u8) -> SpatialTileId {
        let (size, ncols) = match (
            TILE_SIZES.get(usize::from(level)),
            tiles_per_row(level),
        ) {
            (Some(&size), Some(ncols)) => (size, ncols),
            _ => return SpatialTileId::INVALID,
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return SpatialTileId::INVALID;
        }
        let nrows = (180.0 / size).round() as u32;
        // Clamp so the +90/+180 edges land in the last row/column.
        let row = (((lat + 90.0) / size) as u32).min(nrows - 1);
        let col = (((lon + 180.0) / size) as u32).min(ncols - 1);
        SpatialTileId::from_parts(row * ncols + col, level, 0)
    }

    /// Reinterpret raw bits as an id. No validation beyond what accessors do.
    pub fn from_raw(value: u64) -> SpatialTileId {
        SpatialTileId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn level(self) -> u8 {
        (self.0 & LEVEL_MASK) as u8
    }

    pub fn tile_index(self) -> u32 {
        ((self.0 >> LEVEL_BITS) & TILE_INDEX_MASK) as u32
    }

    pub fn entity_index(self) -> u32 {
        ((self.0 >> (LEVEL_BITS + TILE_INDEX_BITS)) & ENTITY_INDEX_MASK) as u32
    }

    /// Same tile and level, different entity index. Returns the invalid
    /// sentinel when `entity_index` exceeds 22 bits.
    pub fn with_entity_index(self, entity_index: u32) -> SpatialTileId {
        if self.0 == u64::MAX || u64::from(entity_index) > ENTITY_INDEX_MASK {
            return SpatialTileId::INVALID;
        }
        SpatialTileId::from_parts(self.tile_index(), self.level(), entity_index)
    }

    /// Id of the tile itself (entity index zero).
    pub fn tile_base(self) -> SpatialTileId {
        self.with_entity_index(0)
    }

    pub fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }

    /// Southwest corner of the tile cell, in degrees. `None` when the id
    /// is invalid or its level has no configured cell size.
    pub fn base_lat_lon(self) -> Option<(f64, f64)> {
        if !self.is_valid() {
            return None;
        }
        let size = *TILE_SIZES.get(usize::from(self.level()))?;
        let ncols = tiles_per_row(self.level())?;
        let row = self.tile_index() / ncols;
        let col = self.tile_index() % ncols;
        Some((
            f64::from(row) * size - 90.0,
            f64::from(col) * size - 180.0,
        ))
    }
}
