use super::geometry::Point;

pub type OsmId = u64;

/// One step of a streamed OSM document, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum OsmEvent {
    DeclareExtent { min: Point, max: Point },
    DeclarePoint { id: OsmId, coord: Point },
    BeginFeature { id: OsmId },
    PointRef { id: OsmId },
    Tag { key: String, value: String },
    EndFeature,
}

impl OsmEvent {
    pub fn tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        OsmEvent::Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Equirectangular projection of a WGS84 coordinate into map units.
pub fn project(lon: f64, lat: f64) -> Point {
    Point::new(lon * lat.to_radians().cos(), lat)
}
