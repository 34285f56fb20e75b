//! Nearest-neighbour lookup into a reference scan.
//!
//! Small scans use a linear scan (O(n) per query, no build cost). Larger
//! scans use a k-d tree. Both return the same neighbours up to ties.

use std::collections::HashMap;
use std::fmt;

use kiddo::SquaredEuclidean;
use kiddo::float::kdtree::KdTree;

use crate::core::types::{Point2D, PointCloud2D};

/// Points per k-d tree leaf.
const TREE_BUCKET: usize = 128;

/// A leaf cannot split when every point in it shares the split coordinate,
/// so clouds where this many points share an x or y value are searched
/// linearly instead.
const MAX_SHARED_COORDINATE: usize = TREE_BUCKET / 2;

type PointTree = KdTree<f32, u64, 2, TREE_BUCKET, u32>;

/// A reference point returned by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance_sq: f32,
}

/// Index over a reference cloud answering "closest point to p" queries.
pub enum NearestNeighborIndex<'a> {
    Linear(&'a PointCloud2D),
    Tree(PointTree),
}

impl<'a> NearestNeighborIndex<'a> {
    /// Build an index, using a k-d tree when the cloud has at least
    /// `kdtree_min_points` points. `0` always selects the linear scan, as
    /// does a cloud with long runs of identical coordinates (straight
    /// axis-aligned walls, repeated returns).
    pub fn build(reference: &'a PointCloud2D, kdtree_min_points: usize) -> Self {
        if kdtree_min_points == 0 || reference.len() < kdtree_min_points {
            return Self::Linear(reference);
        }

        let shared = max_shared_coordinate(reference);
        if shared >= MAX_SHARED_COORDINATE {
            log::debug!(
                "{} points share one coordinate, using linear search over {} points",
                shared,
                reference.len()
            );
            return Self::Linear(reference);
        }

        let mut tree = PointTree::new();
        for (i, point) in reference.iter().enumerate() {
            tree.add(&[point.x, point.y], i as u64);
        }
        Self::Tree(tree)
    }

    /// The reference point closest to `query`.
    ///
    /// The reference cloud must be non-empty.
    pub fn nearest(&self, query: &Point2D) -> Neighbor {
        match self {
            Self::Linear(reference) => {
                let mut best = Neighbor {
                    index: 0,
                    distance_sq: f32::MAX,
                };
                for (i, point) in reference.iter().enumerate() {
                    let d = point.distance_squared(query);
                    if d < best.distance_sq {
                        best = Neighbor {
                            index: i,
                            distance_sq: d,
                        };
                    }
                }
                best
            }
            Self::Tree(tree) => {
                let nearest = tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
                Neighbor {
                    index: nearest.item as usize,
                    distance_sq: nearest.distance,
                }
            }
        }
    }

    /// The two reference points closest to `query`, nearest first.
    ///
    /// The second is `None` for a single-point reference.
    pub fn nearest_two(&self, query: &Point2D) -> (Neighbor, Option<Neighbor>) {
        match self {
            Self::Linear(reference) => {
                let mut first = Neighbor {
                    index: 0,
                    distance_sq: f32::MAX,
                };
                let mut second: Option<Neighbor> = None;
                for (i, point) in reference.iter().enumerate() {
                    let candidate = Neighbor {
                        index: i,
                        distance_sq: point.distance_squared(query),
                    };
                    if candidate.distance_sq < first.distance_sq {
                        if i > 0 {
                            second = Some(first);
                        }
                        first = candidate;
                    } else if second.is_none_or(|s| candidate.distance_sq < s.distance_sq) {
                        second = Some(candidate);
                    }
                }
                (first, second)
            }
            Self::Tree(tree) => {
                let mut found: Vec<Neighbor> = tree
                    .nearest_n::<SquaredEuclidean>(&[query.x, query.y], 2)
                    .into_iter()
                    .map(|n| Neighbor {
                        index: n.item as usize,
                        distance_sq: n.distance,
                    })
                    .collect();
                found.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));

                let mut found = found.into_iter();
                match found.next() {
                    Some(first) => (first, found.next()),
                    None => (
                        Neighbor {
                            index: 0,
                            distance_sq: f32::MAX,
                        },
                        None,
                    ),
                }
            }
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }
}

/// Largest number of points sharing one x value or one y value.
fn max_shared_coordinate(cloud: &PointCloud2D) -> usize {
    let mut counts: HashMap<(bool, u32), usize> = HashMap::with_capacity(cloud.len() * 2);
    let mut max = 0;
    for point in cloud.iter() {
        // + 0.0 folds -0.0 into 0.0
        for key in [(false, (point.x + 0.0).to_bits()), (true, (point.y + 0.0).to_bits())] {
            let count = counts.entry(key).or_insert(0);
            *count += 1;
            max = max.max(*count);
        }
    }
    max
}

impl fmt::Debug for NearestNeighborIndex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear(reference) => write!(f, "Linear({} points)", reference.len()),
            Self::Tree(tree) => write!(f, "Tree({} points)", tree.size()),
        }
    }
}
