//! The loaded map: every feature by id plus the spatial index over them.

use std::rc::Rc;

use crate::data::{BBox, Feature, FeatureHandle, FeatureStore, OsmId, Point, Priority, PRIORITY_COUNT};
use crate::errors::{IngestError, StoreError};
use crate::index::{Nearest, SpatialIndex};

/// Receives features once their geometry is resolved, e.g. to upload or draw them.
pub trait FeatureRenderer {
    fn render(&mut self, feature: &Feature);
}

impl<F: FnMut(&Feature)> FeatureRenderer for F {
    fn render(&mut self, feature: &Feature) {
        self(feature)
    }
}

/// Per-kind feature counts, for load summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Composition {
    pub closed: usize,
    pub footways: usize,
    pub buildings: usize,
    pub tracks: usize,
    /// Ways drawn wider than a single pixel.
    pub major_roads: usize,
}

#[derive(Debug, Default)]
pub struct Map {
    index: Option<SpatialIndex>,
    store: FeatureStore,
}

impl Map {
    /// An empty map whose index is not built yet. Queries on it come back empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extent(extent: BBox, max_depth: usize) -> Self {
        Map {
            index: Some(SpatialIndex::new(extent, max_depth)),
            store: FeatureStore::new(),
        }
    }

    pub fn init_index(&mut self, extent: BBox, max_depth: usize) -> Result<(), IngestError> {
        if self.index.is_some() {
            return Err(IngestError::AlreadyInitialized);
        }
        self.index = Some(SpatialIndex::new(extent, max_depth));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&SpatialIndex> {
        self.index.as_ref()
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn extent(&self) -> Option<&BBox> {
        self.index.as_ref().map(SpatialIndex::extent)
    }

    pub fn max_depth(&self) -> usize {
        self.index.as_ref().map_or(0, SpatialIndex::max_depth)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn add_feature(&mut self, feature: Feature) -> Result<FeatureHandle, IngestError> {
        let id = feature.id();
        let index = self.index.as_mut().ok_or(IngestError::NotInitialized(id))?;
        if self.store.contains(id) {
            return Err(IngestError::DuplicateFeature(id));
        }
        let handle = Rc::new(feature);
        index.add(Rc::clone(&handle))?;
        self.store.add(id, Rc::clone(&handle));
        Ok(handle)
    }

    pub fn query_window(
        &self,
        viewport: BBox,
        priority_cutoff: usize,
        max_depth: usize,
    ) -> impl Iterator<Item = &FeatureHandle> {
        self.index
            .iter()
            .flat_map(move |index| index.query_window(viewport, priority_cutoff, max_depth))
    }

    /// Feeds every visible feature below `priority_cutoff` to `renderer`, one tier at a time so
    /// that more important tiers are drawn first. Returns how many features were rendered.
    pub fn render(
        &self,
        viewport: BBox,
        priority_cutoff: usize,
        max_depth: usize,
        renderer: &mut impl FeatureRenderer,
    ) -> usize {
        let Some(index) = &self.index else {
            return 0;
        };
        let mut rendered = 0;
        for priority in &Priority::ALL[..priority_cutoff.min(PRIORITY_COUNT)] {
            for feature in index.query_tier(viewport, *priority, max_depth) {
                renderer.render(feature);
                rendered += 1;
            }
        }
        rendered
    }

    pub fn nearest(&self, point: Point, priority_cutoff: usize) -> Nearest {
        self.index
            .as_ref()
            .map(|index| index.nearest(point, priority_cutoff))
            .unwrap_or_default()
    }

    pub fn inspect(&self, id: OsmId) -> Result<&FeatureHandle, StoreError> {
        self.store.get(id)
    }

    pub fn composition(&self) -> Composition {
        let mut composition = Composition::default();
        for feature in self.store.iter() {
            let category = feature.category();
            composition.closed += usize::from(feature.is_closed());
            composition.footways += usize::from(category.is_footway());
            composition.buildings += usize::from(category.is_building());
            composition.tracks += usize::from(category.is_track());
            composition.major_roads += usize::from(category.line_width() > 1);
        }
        composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Category, Tags};

    fn extent() -> BBox {
        BBox::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
    }

    fn feature(id: OsmId, category: Category, coords: &[(f64, f64)]) -> Feature {
        Feature::new(id, coords.iter().map(|&c| c.into()).collect(), category, Tags::new())
    }

    #[test]
    fn unbuilt_map_answers_empty() {
        let map = Map::new();
        assert_eq!(map.query_window(extent(), PRIORITY_COUNT, 16).count(), 0);
        let hit = map.nearest(Point::new(1.0, 1.0), PRIORITY_COUNT);
        assert!(hit.feature.is_none());
        assert_eq!(hit.distance_sq, f64::INFINITY);
    }

    #[test]
    fn adding_before_init_fails() {
        let mut map = Map::new();
        let err = map.add_feature(feature(1, Category::Railway, &[(1.0, 1.0)])).unwrap_err();
        assert_eq!(err, IngestError::NotInitialized(1));
    }

    #[test]
    fn index_is_built_once() {
        let mut map = Map::new();
        map.init_index(extent(), 4).unwrap();
        assert_eq!(map.init_index(extent(), 4), Err(IngestError::AlreadyInitialized));
    }

    #[test]
    fn duplicate_features_are_rejected() {
        let mut map = Map::with_extent(extent(), 4);
        map.add_feature(feature(1, Category::Railway, &[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        let err = map.add_feature(feature(1, Category::Railway, &[(3.0, 3.0)])).unwrap_err();
        assert_eq!(err, IngestError::DuplicateFeature(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn render_goes_tier_by_tier() {
        let mut map = Map::with_extent(extent(), 4);
        map.add_feature(feature(1, Category::Unknown, &[(10.0, 40.0), (10.0, 60.0)])).unwrap();
        map.add_feature(feature(2, Category::HighwayMotorway, &[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        map.add_feature(feature(3, Category::HighwayResidential, &[(70.0, 70.0), (80.0, 80.0)])).unwrap();

        let mut drawn = Vec::new();
        let count = map.render(extent(), PRIORITY_COUNT, 4, &mut |f: &Feature| drawn.push(f.id()));
        assert_eq!(count, 3);
        assert_eq!(drawn, vec![2, 3, 1]);

        drawn.clear();
        map.render(extent(), Priority::Building.tier(), 4, &mut |f: &Feature| drawn.push(f.id()));
        assert_eq!(drawn, vec![2, 3]);
    }

    #[test]
    fn composition_counts_kinds() {
        let mut map = Map::with_extent(extent(), 4);
        map.add_feature(feature(1, Category::Unknown, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 10.0)]))
            .unwrap();
        map.add_feature(feature(2, Category::HighwayTrunk, &[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        map.add_feature(feature(3, Category::FootwaySidewalk, &[(3.0, 3.0), (4.0, 4.0)])).unwrap();
        map.add_feature(feature(4, Category::HighwayTrack, &[(5.0, 5.0), (6.0, 6.0)])).unwrap();

        assert_eq!(
            map.composition(),
            Composition {
                closed: 1,
                footways: 1,
                buildings: 1,
                tracks: 1,
                major_roads: 1,
            }
        );
        assert_eq!(map.store().iter().count(), 4);
    }

    #[test]
    fn inspect_by_id() {
        let mut map = Map::with_extent(extent(), 4);
        map.add_feature(feature(5, Category::Waterway, &[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        assert_eq!(map.inspect(5).map(|f| f.category()), Ok(Category::Waterway));
        assert_eq!(map.inspect(6).map(|f| f.id()), Err(StoreError::NotFound(6)));
    }
}
