//! Error types for tile building and decoding.

use thiserror::Error;

/// Errors raised while building or decoding tiles.
///
/// Build-time range violations are fatal for the tile under construction:
/// the builder refuses the record and the caller must abandon the build
/// (no partial file is ever written). Query-time decoding fails only on
/// structural corruption; missing optional data is never an error.
#[derive(Debug, Error)]
pub enum TileError {
    /// Tile was written with a different record layout version.
    #[error("format version mismatch: tile has {found}, reader expects {expected}")]
    FormatVersionMismatch { found: u32, expected: u32 },

    /// A record field exceeded its bit-width at build time.
    #[error("record range violation: {field} = {value} exceeds max {max}")]
    RecordRangeViolation {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// A section of the tile file is shorter than its header claims.
    #[error("truncated tile: {section} section ends past end of file")]
    Truncated { section: &'static str },

    /// Stored CRC-64 does not match the file contents.
    #[error("checksum mismatch: expected {expected:016x}, got {computed:016x}")]
    ChecksumMismatch { expected: u64, computed: u64 },

    /// Bad magic number; not a tile file.
    #[error("invalid magic number: {0:08x}")]
    InvalidMagic(u32),

    /// A polyline shape needs at least two points.
    #[error("edge shape has {0} points, need at least 2")]
    ShortShape(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TileError>;
