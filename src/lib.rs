//! waytile - tiled road-network graph storage.
//!
//! A planet-scale road graph encoded as fixed-size, spatially addressed
//! tiles: bit-packed node and edge records, de-duplicated variable-length
//! edge metadata (shape + multilingual street names), and exit/guide/
//! junction signage, plus the algorithms that resolve names and signs
//! from raw way tags.
//!
//! Ingestion produces per-way tag sets; [`NameResolver`] and
//! [`SignBuilder`] consume them together with an externally supplied
//! [`RegionPolicy`] to produce the records a [`TileBuilder`] serializes.
//! Routing and narrative consumers read finished [`Tile`]s read-only.

pub mod error;
pub mod geo;
pub mod names;
pub mod records;
pub mod region;
pub mod tileid;

pub use error::{Result, TileError};
pub use geo::DistanceApproximator;
pub use names::{Language, NameEntry, NameResolver, SignBuilder};
pub use records::{
    EdgeInfo, EdgeRecord, NodeRecord, RoadClass, SignInfo, SignType, Tile, TileBuilder,
};
pub use region::{RegionPolicy, ScriptMarkers};
pub use tileid::SpatialTileId;
