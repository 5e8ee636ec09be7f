use std::ops::{Add, Mul, Sub};

/// A coordinate in projected map units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance_sq(self, other: Point) -> f64 {
        let d = self - other;
        d.dot(d)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Squared distance from `point` to the segment `start..end`.
///
/// The scalar projection onto the segment is clamped to `[0, 1]`, so points beyond either end
/// measure against the nearest endpoint. Zero-length segments degrade to point distance.
pub fn segment_distance_sq(point: Point, start: Point, end: Point) -> f64 {
    let dir = end - start;
    let len_sq = dir.dot(dir);
    if len_sq == 0.0 {
        return point.distance_sq(start);
    }
    let t = ((point - start).dot(dir) / len_sq).clamp(0.0, 1.0);
    point.distance_sq(start + dir * t)
}

/// Axis-aligned bounding box.
///
/// `BBox::default()` is the inverted "nothing seen yet" box that any call to
/// [`BBox::extend`] collapses onto the first point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BBox {
    fn default() -> Self {
        BBox {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }
}

impl BBox {
    pub const fn new(min: Point, max: Point) -> Self {
        BBox { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut bbox = BBox::default();
        for point in points {
            bbox.extend(*point);
        }
        bbox
    }

    /// True until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn extend(&mut self, point: Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    /// Overlap test with strict inequalities on both axes; boxes that only touch do not
    /// intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive containment: points on the border are inside.
    pub fn contains(&self, point: Point) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
    }

    pub fn contains_bbox(&self, other: &BBox) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Halves the box at the midpoint of its longer axis. Ties split along y.
    pub fn split(&self) -> (BBox, BBox) {
        let size = self.size();
        if size.x > size.y {
            let split_x = self.min.x + size.x / 2.0;
            (
                BBox::new(self.min, Point::new(split_x, self.max.y)),
                BBox::new(Point::new(split_x, self.min.y), self.max),
            )
        } else {
            let split_y = self.min.y + size.y / 2.0;
            (
                BBox::new(self.min, Point::new(self.max.x, split_y)),
                BBox::new(Point::new(self.min.x, split_y), self.max),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: f64, y0: f64, x1: f64, y1: f64) -> BBox {
        BBox::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn segment_distance_projects_onto_interior() {
        let d = segment_distance_sq(Point::new(5.0, 5.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(d, 25.0);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);
        assert_eq!(segment_distance_sq(Point::new(-5.0, 0.0), start, end), 25.0);
        assert_eq!(segment_distance_sq(Point::new(13.0, 4.0), start, end), 25.0);
    }

    #[test]
    fn zero_length_segment_is_point_distance() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(segment_distance_sq(p, Point::default(), Point::default()), 25.0);
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(10.0, 0.0, 20.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&bbox(9.0, 9.0, 11.0, 11.0)));
    }

    #[test]
    fn border_points_are_contained() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains(Point::new(10.0, 0.0)));
        assert!(!a.contains(Point::new(10.1, 0.0)));
    }

    #[test]
    fn split_follows_longer_axis() {
        let (left, right) = bbox(0.0, 0.0, 100.0, 10.0).split();
        assert_eq!(left, bbox(0.0, 0.0, 50.0, 10.0));
        assert_eq!(right, bbox(50.0, 0.0, 100.0, 10.0));

        let (top, bottom) = bbox(0.0, 0.0, 10.0, 10.0).split();
        assert_eq!(top, bbox(0.0, 0.0, 10.0, 5.0));
        assert_eq!(bottom, bbox(0.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn default_box_is_empty_until_extended() {
        let mut b = BBox::default();
        assert!(b.is_empty());
        b.extend(Point::new(2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b, bbox(2.0, 3.0, 2.0, 3.0));
    }
}
