//! Loads OpenStreetMap ways into a static binary space partition and answers the two questions a
//! map renderer asks: which ways are visible in this viewport at this zoom, and which way is under
//! the cursor.

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod index;
pub mod map;

pub use data::{BBox, Category, Feature, FeatureHandle, OsmEvent, OsmId, Point, Priority};
pub use etl::pipeline::IngestionPipeline;
pub use index::{Nearest, SpatialIndex};
pub use map::{Composition, FeatureRenderer, Map};
