use std::{ops::Range, rc::Rc, slice};

use crate::data::{BBox, FeatureHandle, Point, PRIORITY_COUNT};

use super::IndexNode;

/// Lazy depth-first enumeration of the features stored in viewport-overlapping nodes.
///
/// Within a node tiers come out in ascending order. Children whose box does not intersect the
/// viewport are skipped together with their whole subtree.
#[derive(Debug)]
pub struct WindowQuery<'a> {
    viewport: BBox,
    tiers: Range<usize>,
    max_depth: usize,
    stack: Vec<&'a IndexNode>,
    node: Option<&'a IndexNode>,
    tier: usize,
    bucket: slice::Iter<'a, FeatureHandle>,
}

impl<'a> WindowQuery<'a> {
    pub(super) fn new(root: &'a IndexNode, viewport: BBox, tiers: Range<usize>, max_depth: usize) -> Self {
        let tiers = tiers.start..tiers.end.min(PRIORITY_COUNT);
        let mut stack = Vec::new();
        if !tiers.is_empty() && root.depth < max_depth && root.bbox.intersects(&viewport) {
            stack.push(root);
        }
        WindowQuery {
            viewport,
            tier: tiers.start,
            tiers,
            max_depth,
            stack,
            node: None,
            bucket: Default::default(),
        }
    }

    fn visit(&mut self, node: &'a IndexNode) {
        if node.depth + 1 < self.max_depth {
            if let Some((left, right)) = node.children() {
                for child in [right, left] {
                    if child.bbox.intersects(&self.viewport) {
                        self.stack.push(child);
                    }
                }
            }
        }
        self.node = Some(node);
        self.tier = self.tiers.start;
        self.bucket = node.buckets[self.tier].iter();
    }
}

impl<'a> Iterator for WindowQuery<'a> {
    type Item = &'a FeatureHandle;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(feature) = self.bucket.next() {
                return Some(feature);
            }
            if let Some(node) = self.node {
                self.tier += 1;
                if self.tier < self.tiers.end {
                    self.bucket = node.buckets[self.tier].iter();
                    continue;
                }
                self.node = None;
            }
            let node = self.stack.pop()?;
            self.visit(node);
        }
    }
}

/// Result of a nearest-feature lookup. Distances stay squared until someone asks.
#[derive(Debug, Clone)]
pub struct Nearest {
    pub distance_sq: f64,
    pub feature: Option<FeatureHandle>,
}

impl Default for Nearest {
    fn default() -> Self {
        Nearest {
            distance_sq: f64::INFINITY,
            feature: None,
        }
    }
}

impl Nearest {
    pub fn distance(&self) -> f64 {
        self.distance_sq.sqrt()
    }
}

impl IndexNode {
    pub(super) fn nearest(&self, point: Point, priority_cutoff: usize) -> Nearest {
        let mut best = match self.children() {
            Some((left, _)) if left.bbox.contains(point) => left.nearest(point, priority_cutoff),
            Some((_, right)) if right.bbox.contains(point) => right.nearest(point, priority_cutoff),
            _ => Nearest::default(),
        };

        for bucket in &self.buckets[..priority_cutoff] {
            for feature in bucket {
                let distance_sq = feature.distance_sq(point);
                if distance_sq < best.distance_sq {
                    best = Nearest {
                        distance_sq,
                        feature: Some(Rc::clone(feature)),
                    };
                }
            }
        }
        best
    }
}
