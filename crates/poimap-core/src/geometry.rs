//! Geographic helpers over coordinate lists: area containment, centroid,
//! bounding rectangles and image corner ordering.

use geo::{Centroid, Intersects, LineString, Point, Polygon};

use crate::poi::Coordinate;

fn to_polygon(ring: &[Coordinate]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring
        .iter()
        .map(|c| (c.longitude, c.latitude))
        .collect::<Vec<_>>()
        .into();
    Polygon::new(exterior, vec![])
}

/// Returns `true` when `point` lies inside or on the edge of the polygon
/// described by `ring`. Rings with fewer than three vertices contain nothing.
#[must_use]
pub fn contains(ring: &[Coordinate], point: Coordinate) -> bool {
    if ring.len() < 3 {
        return false;
    }
    to_polygon(ring).intersects(&Point::new(point.longitude, point.latitude))
}

/// Centroid of the polygon described by `ring`, or `None` for an empty ring.
#[must_use]
pub fn centroid(ring: &[Coordinate]) -> Option<Coordinate> {
    if ring.is_empty() {
        return None;
    }
    to_polygon(ring)
        .centroid()
        .map(|p| Coordinate::from_lng_lat(p.x(), p.y()))
}

/// South-west and north-east corners of the rectangle enclosing `coords`.
#[must_use]
pub fn bounding_box(coords: &[Coordinate]) -> Option<(Coordinate, Coordinate)> {
    let first = coords.first()?;
    let mut sw = *first;
    let mut ne = *first;
    for c in &coords[1..] {
        sw.latitude = sw.latitude.min(c.latitude);
        sw.longitude = sw.longitude.min(c.longitude);
        ne.latitude = ne.latitude.max(c.latitude);
        ne.longitude = ne.longitude.max(c.longitude);
    }
    Some((sw, ne))
}

/// Reorders a four-corner `bounds` list into the `[lng, lat]` corner order
/// expected by the renderer's image source (indices 0, 2, 1, 3).
///
/// Lists shorter than four entries yield `[0, 0]` for every corner.
#[must_use]
pub fn image_corners(bounds: &[Coordinate]) -> [[f64; 2]; 4] {
    let corner = |idx: usize| -> [f64; 2] {
        if bounds.len() < 4 {
            return [0.0, 0.0];
        }
        bounds[idx].lng_lat()
    };
    [corner(0), corner(2), corner(1), corner(3)]
}
