//! Static binary space partition over the map extent.
//!
//! The box hierarchy is built once, up front, by halving each box along its longer axis until
//! the depth budget runs out. Features are then pushed down from the root and parked at the
//! first node where they no longer fall into exactly one child, bucketed by draw priority.

mod query;

use std::iter;

use log::debug;

use crate::data::{BBox, FeatureHandle, Point, Priority, PRIORITY_COUNT};
use crate::errors::IndexError;

pub use query::{Nearest, WindowQuery};

pub const DEFAULT_MAX_DEPTH: usize = 16;

type Buckets = [Vec<FeatureHandle>; PRIORITY_COUNT];

#[derive(Debug)]
pub struct IndexNode {
    bbox: BBox,
    depth: usize,
    children: Option<Box<(IndexNode, IndexNode)>>,
    buckets: Buckets,
}

impl IndexNode {
    fn build(bbox: BBox, max_depth: usize, depth: usize) -> Self {
        let children = if depth + 1 >= max_depth {
            None
        } else {
            let (a, b) = bbox.split();
            Some(Box::new((
                IndexNode::build(a, max_depth, depth + 1),
                IndexNode::build(b, max_depth, depth + 1),
            )))
        };
        IndexNode {
            bbox,
            depth,
            children,
            buckets: std::array::from_fn(|_| Vec::new()),
        }
    }

    fn insert(&mut self, feature: FeatureHandle) -> usize {
        if let Some((left, right)) = self.children.as_deref_mut() {
            let bbox = *feature.bbox();
            match (bbox.intersects(&left.bbox), bbox.intersects(&right.bbox)) {
                (true, false) => return left.insert(feature),
                (false, true) => return right.insert(feature),
                // Straddles the split, or is degenerate and touches neither child.
                _ => {}
            }
        }
        self.buckets[feature.priority().tier()].push(feature);
        self.depth
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(&IndexNode, &IndexNode)> {
        self.children.as_deref().map(|(left, right)| (left, right))
    }

    /// Features parked at this node for one tier.
    pub fn features(&self, priority: Priority) -> &[FeatureHandle] {
        &self.buckets[priority.tier()]
    }

    pub fn feature_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

#[derive(Debug)]
pub struct SpatialIndex {
    root: IndexNode,
    max_depth: usize,
    len: usize,
}

impl SpatialIndex {
    /// Builds the empty box hierarchy over `extent`. A depth of one (or zero) yields a single
    /// leaf that holds everything.
    pub fn new(extent: BBox, max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        let root = IndexNode::build(extent, max_depth, 0);
        debug!(
            max_depth = max_depth,
            min_x = extent.min.x,
            min_y = extent.min.y,
            max_x = extent.max.x,
            max_y = extent.max.y;
            "Built spatial index"
        );
        SpatialIndex {
            root,
            max_depth,
            len: 0,
        }
    }

    pub fn extent(&self) -> &BBox {
        &self.root.bbox
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &IndexNode {
        &self.root
    }

    /// Stores `feature` at the deepest node that still contains it cleanly and returns that
    /// node's depth.
    pub fn add(&mut self, feature: FeatureHandle) -> Result<usize, IndexError> {
        if feature.points().is_empty() {
            return Err(IndexError::InvalidFeature(feature.id()));
        }
        let depth = self.root.insert(feature);
        self.len += 1;
        Ok(depth)
    }

    /// Depth-first walk over the nodes overlapping `viewport`, yielding at each node the features
    /// of every tier below `priority_cutoff`. Nodes at `max_depth` or deeper are not visited.
    pub fn query_window(
        &self,
        viewport: BBox,
        priority_cutoff: usize,
        max_depth: usize,
    ) -> WindowQuery<'_> {
        WindowQuery::new(&self.root, viewport, 0..priority_cutoff, max_depth)
    }

    /// Like [`SpatialIndex::query_window`] restricted to a single tier.
    pub fn query_tier(&self, viewport: BBox, priority: Priority, max_depth: usize) -> WindowQuery<'_> {
        let tier = priority.tier();
        WindowQuery::new(&self.root, viewport, tier..tier + 1, max_depth)
    }

    /// Approximate nearest feature among tiers below `priority_cutoff`.
    ///
    /// Descends only into the child containing `point` and never backtracks into its sibling,
    /// so a closer feature just across a split line can be missed.
    pub fn nearest(&self, point: Point, priority_cutoff: usize) -> Nearest {
        self.root.nearest(point, priority_cutoff.min(PRIORITY_COUNT))
    }

    /// Every node, parents before children.
    pub fn nodes(&self) -> impl Iterator<Item = &IndexNode> {
        let mut stack = vec![&self.root];
        iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
            Some(node)
        })
    }

    /// Number of stored features per tier.
    pub fn tier_counts(&self) -> [usize; PRIORITY_COUNT] {
        let mut counts = [0; PRIORITY_COUNT];
        for node in self.nodes() {
            for (count, bucket) in counts.iter_mut().zip(&node.buckets) {
                *count += bucket.len();
            }
        }
        counts
    }
}
