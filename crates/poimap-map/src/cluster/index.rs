//! Hierarchical point-clustering index.
//!
//! Points are projected into the unit Mercator square and greedily merged
//! level by level, from `max_zoom + 1` (one node per POI) down to `min_zoom`.
//! At zoom `z` every unvisited node absorbs the unvisited neighbours within
//! `radius / (extent * 2^z)`; each level keeps its own R-tree so a viewport
//! query is a single envelope lookup.

use std::collections::HashMap;

use poimap_core::{Coordinate, Poi};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::projection::{lat_y, lng_x, x_lng, y_lat};
use super::{ClusterEntry, ViewportBounds};

pub const DEFAULT_RADIUS: f64 = 40.0;
pub const DEFAULT_EXTENT: f64 = 512.0;
pub const DEFAULT_MAX_ZOOM: u32 = 17;
pub const DEFAULT_MIN_POINTS: usize = 2;

/// Cluster ids encode the level they were formed on in the low five bits.
const ZOOM_BITS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Merge radius in screen pixels.
    pub radius: f64,
    /// Tile extent in pixels the radius is measured against.
    pub extent: f64,
    pub min_zoom: u32,
    /// Above this zoom every POI is its own marker.
    pub max_zoom: u32,
    pub min_points: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            extent: DEFAULT_EXTENT,
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf(usize),
    Cluster(u64),
}

#[derive(Debug, Clone)]
struct Node {
    x: f64,
    y: f64,
    /// Lowest zoom this node has been visited at; `i32::MAX` until then.
    visited_at: i32,
    num_points: usize,
    kind: NodeKind,
}

/// R-tree entry pointing back into a level's node list.
#[derive(Debug, Clone, Copy)]
struct Slot {
    xy: [f64; 2],
    index: usize,
}

impl RTreeObject for Slot {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xy)
    }
}

impl PointDistance for Slot {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = point[0] - self.xy[0];
        let dy = point[1] - self.xy[1];
        dx * dx + dy * dy
    }
}

struct Level {
    nodes: Vec<Node>,
    tree: RTree<Slot>,
}

impl Level {
    fn new(nodes: Vec<Node>) -> Self {
        let slots = nodes
            .iter()
            .enumerate()
            .map(|(index, n)| Slot {
                xy: [n.x, n.y],
                index,
            })
            .collect();
        Self {
            nodes,
            tree: RTree::bulk_load(slots),
        }
    }
}

/// Immutable clustering index over one POI list.
pub struct ClusterIndex {
    options: ClusterOptions,
    points: Vec<Poi>,
    /// `levels[z]` holds the nodes visible at zoom `z`, for `z` in
    /// `min_zoom..=max_zoom + 1`. Lower slots stay empty.
    levels: Vec<Level>,
    /// Cluster id -> indexes of its members on the level it was formed from.
    children: HashMap<u64, Vec<usize>>,
}

impl std::fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIndex")
            .field("points", &self.points.len())
            .field("clusters", &self.children.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ClusterIndex {
    /// Builds the index. Returns `None` for an empty POI list.
    #[must_use]
    pub fn build(points: &[Poi], options: ClusterOptions) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let leaves: Vec<Node> = points
            .iter()
            .enumerate()
            .map(|(i, poi)| Node {
                x: lng_x(poi.coordinate.longitude),
                y: lat_y(poi.coordinate.latitude),
                visited_at: i32::MAX,
                num_points: 1,
                kind: NodeKind::Leaf(i),
            })
            .collect();

        let top = options.max_zoom as usize + 1;
        let mut levels: Vec<Option<Level>> = (0..=top).map(|_| None).collect();
        let mut children = HashMap::new();
        let mut current = Level::new(leaves);

        for z in (options.min_zoom..=options.max_zoom).rev() {
            let next = cluster_level(&mut current, z, &options, &mut children);
            levels[z as usize + 1] = Some(current);
            current = Level::new(next);
        }
        levels[options.min_zoom as usize] = Some(current);

        let levels = levels
            .into_iter()
            .map(|l| l.unwrap_or_else(|| Level::new(Vec::new())))
            .collect();

        tracing::debug!(
            points = points.len(),
            clusters = children.len(),
            "cluster index built"
        );

        Some(Self {
            options,
            points: points.to_vec(),
            levels,
            children,
        })
    }

    #[must_use]
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Markers intersecting `bounds` at `floor(zoom)`, in a stable order.
    #[must_use]
    pub fn clusters(&self, bounds: &ViewportBounds, zoom: f64) -> Vec<ClusterEntry> {
        let mut min_lng = wrap_lng(bounds.sw[0]);
        let min_lat = bounds.sw[1].clamp(-90.0, 90.0);
        let mut max_lng = if (bounds.ne[0] - 180.0).abs() < f64::EPSILON {
            180.0
        } else {
            wrap_lng(bounds.ne[0])
        };
        let max_lat = bounds.ne[1].clamp(-90.0, 90.0);

        if bounds.ne[0] - bounds.sw[0] >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            // Viewport straddles the antimeridian.
            let mut east = self.clusters(
                &ViewportBounds::new([min_lng, min_lat], [180.0, max_lat]),
                zoom,
            );
            let west = self.clusters(
                &ViewportBounds::new([-180.0, min_lat], [max_lng, max_lat]),
                zoom,
            );
            east.extend(west);
            return east;
        }

        let level = &self.levels[self.limit_zoom(zoom)];
        let envelope = AABB::from_corners(
            [lng_x(min_lng), lat_y(max_lat)],
            [lng_x(max_lng), lat_y(min_lat)],
        );
        let mut hits: Vec<usize> = level
            .tree
            .locate_in_envelope(&envelope)
            .map(|s| s.index)
            .collect();
        hits.sort_unstable();
        hits.into_iter()
            .map(|i| self.entry(&level.nodes[i]))
            .collect()
    }

    /// Zoom at which `cluster_id` breaks apart into more than one marker.
    #[must_use]
    pub fn expansion_zoom(&self, cluster_id: u64) -> Option<u32> {
        if !self.children.contains_key(&cluster_id) {
            return None;
        }
        let mut id = cluster_id;
        let mut zoom = origin_zoom(id).checked_sub(1)?;
        while zoom <= self.options.max_zoom {
            let members = self.members(id)?;
            zoom += 1;
            match members.as_slice() {
                [only] => match only.kind {
                    NodeKind::Cluster(inner) => id = inner,
                    NodeKind::Leaf(_) => break,
                },
                _ => break,
            }
        }
        Some(zoom)
    }

    /// The markers `cluster_id` splits into one level down.
    #[must_use]
    pub fn children(&self, cluster_id: u64) -> Option<Vec<ClusterEntry>> {
        let members = self.members(cluster_id)?;
        Some(members.iter().map(|n| self.entry(n)).collect())
    }

    fn members(&self, cluster_id: u64) -> Option<Vec<&Node>> {
        let level = self.levels.get(origin_zoom(cluster_id) as usize)?;
        let indexes = self.children.get(&cluster_id)?;
        indexes.iter().map(|&i| level.nodes.get(i)).collect()
    }

    // Clamped to a small non-negative integer before the cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn limit_zoom(&self, zoom: f64) -> usize {
        let floor = if zoom.is_finite() { zoom.floor() } else { 0.0 };
        let top = f64::from(self.options.max_zoom + 1);
        floor.clamp(f64::from(self.options.min_zoom), top) as usize
    }

    fn entry(&self, node: &Node) -> ClusterEntry {
        match node.kind {
            NodeKind::Leaf(i) => ClusterEntry::Leaf(self.points[i].clone()),
            NodeKind::Cluster(cluster_id) => ClusterEntry::Cluster {
                cluster_id,
                coordinate: Coordinate::from_lng_lat(x_lng(node.x), y_lat(node.y)),
                point_count: node.num_points,
            },
        }
    }
}

/// Merges `level` (zoom `z + 1`) into the node list for zoom `z`.
fn cluster_level(
    level: &mut Level,
    z: u32,
    options: &ClusterOptions,
    children: &mut HashMap<u64, Vec<usize>>,
) -> Vec<Node> {
    let r = options.radius / (options.extent * 2f64.powf(f64::from(z)));
    let r2 = r * r;
    let marker = i32::try_from(z).unwrap_or(i32::MAX);
    let mut next = Vec::with_capacity(level.nodes.len());

    for i in 0..level.nodes.len() {
        if level.nodes[i].visited_at <= marker {
            continue;
        }
        level.nodes[i].visited_at = marker;

        let (px, py) = (level.nodes[i].x, level.nodes[i].y);
        let mut neighbours: Vec<usize> = level
            .tree
            .locate_within_distance([px, py], r2)
            .map(|s| s.index)
            .filter(|&j| j != i && level.nodes[j].visited_at > marker)
            .collect();
        neighbours.sort_unstable();

        let own = level.nodes[i].num_points;
        let total = own
            + neighbours
                .iter()
                .map(|&j| level.nodes[j].num_points)
                .sum::<usize>();

        if total > own && total >= options.min_points {
            let id = ((i as u64) << ZOOM_BITS) + u64::from(z + 1);
            #[allow(clippy::cast_precision_loss)]
            let (mut wx, mut wy) = (px * own as f64, py * own as f64);
            for &j in &neighbours {
                let n = &mut level.nodes[j];
                n.visited_at = marker;
                #[allow(clippy::cast_precision_loss)]
                let weight = n.num_points as f64;
                wx += n.x * weight;
                wy += n.y * weight;
            }
            let mut members = Vec::with_capacity(neighbours.len() + 1);
            members.push(i);
            members.extend(neighbours);
            children.insert(id, members);

            #[allow(clippy::cast_precision_loss)]
            let count = total as f64;
            next.push(Node {
                x: wx / count,
                y: wy / count,
                visited_at: i32::MAX,
                num_points: total,
                kind: NodeKind::Cluster(id),
            });
        } else {
            next.push(level.nodes[i].clone());
            if total > 1 {
                for &j in &neighbours {
                    level.nodes[j].visited_at = marker;
                    next.push(level.nodes[j].clone());
                }
            }
        }
    }
    next
}

// Masked to five bits, always fits.
#[allow(clippy::cast_possible_truncation)]
fn origin_zoom(cluster_id: u64) -> u32 {
    (cluster_id & ((1 << ZOOM_BITS) - 1)) as u32
}

fn wrap_lng(lng: f64) -> f64 {
    ((lng + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
