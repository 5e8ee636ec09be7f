//! Event-driven construction of a [`Map`].
//!
//! Points are cached by id until the ways referencing them are finished; each finished way is
//! classified, optionally filtered, and handed to the spatial index and the feature store.

use std::{collections::HashMap, mem};

use log::{debug, info, warn};

use crate::data::{BBox, Feature, OsmEvent, OsmId, Point, Tags};
use crate::errors::IngestError;
use crate::index::DEFAULT_MAX_DEPTH;
use crate::map::Map;

use super::classify::Classifier;

/// Coordinates closer than this are treated as the same declaration.
const COORD_EPSILON: f64 = 1e-9;

/// Resolved coordinates by node id, alive only while a dataset is being loaded.
#[derive(Debug, Default)]
pub struct PointCache {
    points: HashMap<OsmId, Point>,
    bbox: BBox,
}

impl PointCache {
    pub fn declare(&mut self, id: OsmId, coord: Point) -> Result<(), IngestError> {
        if let Some(existing) = self.points.get(&id) {
            let moved = (existing.x - coord.x).abs() > COORD_EPSILON
                || (existing.y - coord.y).abs() > COORD_EPSILON;
            return if moved { Err(IngestError::DuplicateId(id)) } else { Ok(()) };
        }
        self.bbox.extend(coord);
        self.points.insert(id, coord);
        Ok(())
    }

    pub fn resolve(&self, id: OsmId) -> Result<Point, IngestError> {
        self.points
            .get(&id)
            .copied()
            .ok_or(IngestError::UnresolvedReference(id))
    }

    /// Bounding box of every point declared so far.
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug)]
struct WayBuilder {
    id: OsmId,
    points: Vec<Point>,
    tags: Tags,
}

#[derive(Debug)]
enum WayState {
    Idle,
    Accumulating(WayBuilder),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub points: usize,
    pub emitted: usize,
    pub filtered: usize,
}

pub type TagFilter = Box<dyn Fn(&Tags) -> bool>;

pub struct IngestionPipeline {
    classifier: Classifier,
    max_depth: usize,
    filter: Option<TagFilter>,
    cache: PointCache,
    map: Map,
    state: WayState,
    stats: IngestStats,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        IngestionPipeline::new(DEFAULT_MAX_DEPTH)
    }
}

impl IngestionPipeline {
    pub fn new(max_depth: usize) -> Self {
        IngestionPipeline {
            classifier: Classifier::default(),
            max_depth,
            filter: None,
            cache: PointCache::default(),
            map: Map::new(),
            state: WayState::Idle,
            stats: IngestStats::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Only ways whose tags pass `filter` are emitted; the rest are dropped silently.
    pub fn with_filter(mut self, filter: impl Fn(&Tags) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn handle(&mut self, event: OsmEvent) -> Result<(), IngestError> {
        match event {
            OsmEvent::DeclareExtent { min, max } => self.declare_extent(min, max),
            OsmEvent::DeclarePoint { id, coord } => self.declare_point(id, coord),
            OsmEvent::BeginFeature { id } => self.begin_feature(id),
            OsmEvent::PointRef { id } => self.append_point_ref(id),
            OsmEvent::Tag { key, value } => self.add_tag(key, value),
            OsmEvent::EndFeature => self.end_feature(),
        }
    }

    pub fn declare_extent(&mut self, min: Point, max: Point) -> Result<(), IngestError> {
        self.map.init_index(BBox::from_points(&[min, max]), self.max_depth)
    }

    pub fn declare_point(&mut self, id: OsmId, coord: Point) -> Result<(), IngestError> {
        self.cache.declare(id, coord)?;
        self.stats.points = self.cache.len();
        Ok(())
    }

    pub fn begin_feature(&mut self, id: OsmId) -> Result<(), IngestError> {
        if let WayState::Accumulating(_) = self.state {
            return Err(IngestError::AlreadyInProgress(id));
        }
        if !self.map.is_initialized() {
            self.init_from_cache()?;
        }
        self.state = WayState::Accumulating(WayBuilder {
            id,
            points: Vec::new(),
            tags: Tags::new(),
        });
        Ok(())
    }

    pub fn append_point_ref(&mut self, id: OsmId) -> Result<(), IngestError> {
        let WayState::Accumulating(way) = &mut self.state else {
            return Err(IngestError::NoFeatureInProgress);
        };
        way.points.push(self.cache.resolve(id)?);
        Ok(())
    }

    pub fn add_tag(&mut self, key: String, value: String) -> Result<(), IngestError> {
        let WayState::Accumulating(way) = &mut self.state else {
            return Err(IngestError::NoFeatureInProgress);
        };
        way.tags.insert(key, value);
        Ok(())
    }

    pub fn end_feature(&mut self) -> Result<(), IngestError> {
        let WayState::Accumulating(way) = mem::replace(&mut self.state, WayState::Idle) else {
            return Err(IngestError::NoFeatureInProgress);
        };
        if way.points.is_empty() {
            return Err(IngestError::EmptyFeature(way.id));
        }
        if let Some(filter) = &self.filter {
            if !filter(&way.tags) {
                self.stats.filtered += 1;
                return Ok(());
            }
        }

        let classification = self.classifier.classify(&way.tags);
        let feature = Feature::new(way.id, way.points, classification.category, way.tags);
        self.map.add_feature(feature)?;
        self.stats.emitted += 1;
        Ok(())
    }

    /// Ends the load. The point cache is dropped; only finished features survive.
    pub fn finish(mut self) -> Result<Map, IngestError> {
        if let WayState::Accumulating(way) = &self.state {
            return Err(IngestError::UnfinishedFeature(way.id));
        }
        if !self.map.is_initialized() && !self.cache.is_empty() {
            self.init_from_cache()?;
        }
        info!(
            points = self.stats.points,
            emitted = self.stats.emitted,
            filtered = self.stats.filtered;
            "Ingestion finished"
        );
        Ok(self.map)
    }

    fn init_from_cache(&mut self) -> Result<(), IngestError> {
        let extent = *self.cache.bbox();
        if self.cache.is_empty() {
            warn!("No extent declared and no points seen; building index over an empty box");
        } else {
            debug!(points = self.cache.len(); "Taking extent from point cache");
        }
        self.map.init_index(extent, self.max_depth)
    }
}
