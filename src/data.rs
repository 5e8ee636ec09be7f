//! Plain data: geometry, OSM events, semantic categories and finalized features.

pub mod feature;
pub mod geometry;
pub mod osm;
pub mod semantic;

pub use feature::{Feature, FeatureHandle, FeatureStore, Tags};
pub use geometry::{BBox, Point};
pub use osm::{OsmEvent, OsmId};
pub use semantic::{Category, Priority, PRIORITY_COUNT};
