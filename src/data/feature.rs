use std::{collections::HashMap, rc::Rc};

use crate::errors::StoreError;

use super::{
    geometry::{segment_distance_sq, BBox, Point},
    osm::OsmId,
    semantic::{Category, Priority},
};

pub type Tags = HashMap<String, String>;

/// Shared handle to a finalized feature. The store and the spatial index hold clones, as may a
/// caller keeping a "selected" feature around.
pub type FeatureHandle = Rc<Feature>;

/// A classified polyline or polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: OsmId,
    points: Vec<Point>,
    category: Category,
    tags: Tags,
    bbox: BBox,
}

impl Feature {
    pub fn new(id: OsmId, points: Vec<Point>, category: Category, tags: Tags) -> Self {
        let bbox = BBox::from_points(&points);
        Feature {
            id,
            points,
            category,
            tags,
            bbox,
        }
    }

    pub fn id(&self) -> OsmId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> Priority {
        self.category.priority()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    /// Closed ways (first point repeated at the end) describe areas.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Squared distance from `point` to the nearest part of the polyline. A single point is
    /// measured directly; an empty feature is infinitely far away.
    pub fn distance_sq(&self, point: Point) -> f64 {
        match self.points.as_slice() {
            [] => f64::INFINITY,
            [only] => point.distance_sq(*only),
            _ => self
                .segments()
                .map(|(start, end)| segment_distance_sq(point, start, end))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Canonical owner of every ingested feature, keyed by OSM way id.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: HashMap<OsmId, FeatureHandle>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the feature previously stored under `id`, if any.
    pub fn add(&mut self, id: OsmId, feature: FeatureHandle) -> Option<FeatureHandle> {
        self.features.insert(id, feature)
    }

    pub fn get(&self, id: OsmId) -> Result<&FeatureHandle, StoreError> {
        self.features.get(&id).ok_or(StoreError::NotFound(id))
    }

    pub fn contains(&self, id: OsmId) -> bool {
        self.features.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureHandle> {
        self.features.values()
    }
}
