use crate::{
    core::{constants::MARKER_HIT_THRESHOLD, geo::Point},
    layers::marker::Marker,
    rendering::camera::{screen_to_ndc, CameraModel, ViewProjection},
};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A marker projected into normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProjectedMarker {
    /// Position in the caller's marker list
    order: usize,
    ndc: [f64; 2],
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for ProjectedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.ndc)
    }
}

impl PointDistance for ProjectedMarker {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.ndc[0] - point[0];
        let dy = self.ndc[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Result of a successful hit test
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHit {
    pub marker: Marker,
    /// Position in the marker list the index was built from
    pub index: usize,
    /// Where the marker is drawn, in normalized device coordinates
    pub ndc: Point,
    /// Distance from the query point in normalized device units
    pub distance: f64,
}

/// The marker set and nearest-marker queries against tap positions
#[derive(Debug, Clone)]
pub struct MarkerIndex {
    markers: Vec<Marker>,
    threshold: f64,
}

impl MarkerIndex {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            threshold: MARKER_HIT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// NDC position of every marker, `None` for markers on the far side of the globe
    pub fn project_all(&self, camera: &CameraModel, view_projection: &ViewProjection) -> Vec<Option<Point>> {
        self.markers
            .iter()
            .map(|marker| camera.project(&marker.lat_long, view_projection))
            .collect()
    }

    /// Closest selectable marker to `tap_ndc`, if it lies strictly within the threshold.
    ///
    /// Only markers on the visible hemisphere that carry an id are considered.
    /// Equally distant markers resolve to the one listed first.
    pub fn nearest(&self, tap_ndc: Point, camera: &CameraModel, aspect_ratio: f64) -> Option<MarkerHit> {
        if self.markers.is_empty() {
            return None;
        }
        let view_projection = match camera.view_projection(aspect_ratio) {
            Ok(view_projection) => view_projection,
            Err(_err) => {
                #[cfg(feature = "debug")]
                log::warn!("skipping hit test: {}", _err);
                return None;
            }
        };

        let projected: Vec<ProjectedMarker> = self
            .markers
            .iter()
            .enumerate()
            .filter(|(_, marker)| marker.is_selectable())
            .filter_map(|(order, marker)| {
                camera
                    .project(&marker.lat_long, &view_projection)
                    .map(|ndc| ProjectedMarker {
                        order,
                        ndc: [ndc.x, ndc.y],
                    })
            })
            .collect();
        let tree = RTree::bulk_load(projected);

        let query = [tap_ndc.x, tap_ndc.y];
        let threshold_2 = self.threshold * self.threshold;
        let (closest, distance_2) = tree
            .locate_within_distance(query, threshold_2)
            .map(|candidate| (*candidate, candidate.distance_2(&query)))
            .filter(|(_, distance_2)| *distance_2 < threshold_2)
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then(a.order.cmp(&b.order)))?;

        Some(MarkerHit {
            marker: self.markers[closest.order].clone(),
            index: closest.order,
            ndc: Point::new(closest.ndc[0], closest.ndc[1]),
            distance: distance_2.sqrt(),
        })
    }

    /// [`MarkerIndex::nearest`] for a position in view pixels
    pub fn nearest_on_screen(
        &self,
        tap: Point,
        viewport_size: Point,
        camera: &CameraModel,
    ) -> Option<MarkerHit> {
        if viewport_size.x <= 0.0 || viewport_size.y <= 0.0 {
            return None;
        }
        let ndc = screen_to_ndc(tap, viewport_size);
        self.nearest(ndc, camera, viewport_size.x / viewport_size.y)
    }
}

impl Default for MarkerIndex {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{colors::LocationMarkerColors, geo::LatLong, view_state::CameraPosition};

    fn marker(id: &str, lat: f64, lon: f64) -> Marker {
        Marker::new(LatLong::from_degrees(lat, lon), LocationMarkerColors::default()).with_id(id)
    }

    fn camera() -> CameraModel {
        CameraModel::new(CameraPosition::new(LatLong::default()))
    }

    #[test]
    fn test_empty_index_has_no_hit() {
        let index = MarkerIndex::default();
        assert!(index.nearest(Point::ZERO, &camera(), 1.0).is_none());
    }

    #[test]
    fn test_hit_on_marker_under_tap() {
        let index = MarkerIndex::new(vec![marker("far", 20.0, 20.0), marker("center", 0.0, 0.0)]);
        let hit = index.nearest(Point::new(0.01, -0.01), &camera(), 1.0).unwrap();
        assert_eq!(hit.marker.id.as_deref(), Some("center"));
        assert_eq!(hit.index, 1);
        assert!(hit.distance < 0.03);
    }

    #[test]
    fn test_threshold_is_strict() {
        let index = MarkerIndex::new(vec![marker("center", 0.0, 0.0)]);
        assert!(index.nearest(Point::new(0.03, 0.0), &camera(), 1.0).is_none());
        assert!(index.nearest(Point::new(0.0299, 0.0), &camera(), 1.0).is_some());
    }

    #[test]
    fn test_closest_wins_regardless_of_order() {
        let near = marker("near", 0.0, 0.0);
        let close = marker("close", 0.0, 0.5);
        let tap = Point::new(0.001, 0.0);

        let forward = MarkerIndex::new(vec![close.clone(), near.clone()]);
        let backward = MarkerIndex::new(vec![near, close]);
        let a = forward.nearest(tap, &camera(), 1.0).unwrap();
        let b = backward.nearest(tap, &camera(), 1.0).unwrap();
        assert_eq!(a.marker.id.as_deref(), Some("near"));
        assert_eq!(b.marker.id.as_deref(), Some("near"));
    }

    /// Markers along the equator land about 0.01, 0.05 and 0.10 NDC east of the center
    #[test]
    fn test_nearest_of_three_shuffled() {
        let markers = vec![
            marker("mid", 0.0, 1.0),
            marker("far", 0.0, 2.0),
            marker("near", 0.0, 0.2),
        ];
        let index = MarkerIndex::new(markers.clone());
        let hit = index.nearest(Point::ZERO, &camera(), 1.0).unwrap();
        assert_eq!(hit.marker.id.as_deref(), Some("near"));
        assert_eq!(hit.index, 2);
        assert!((hit.distance - 0.01).abs() < 1e-3, "distance {}", hit.distance);

        let hit = index.nearest(Point::new(0.05, 0.0), &camera(), 1.0).unwrap();
        assert_eq!(hit.marker.id.as_deref(), Some("mid"));

        let without_near = MarkerIndex::new(markers[..2].to_vec());
        assert!(without_near.nearest(Point::ZERO, &camera(), 1.0).is_none());
    }

    #[test]
    fn test_ties_resolve_to_first_marker() {
        let index = MarkerIndex::new(vec![marker("first", 0.0, 0.0), marker("second", 0.0, 0.0)]);
        let hit = index.nearest(Point::ZERO, &camera(), 1.0).unwrap();
        assert_eq!(hit.marker.id.as_deref(), Some("first"));
    }

    #[test]
    fn test_far_side_and_anonymous_markers_are_ignored() {
        let anonymous = Marker::new(LatLong::default(), LocationMarkerColors::default());
        let index = MarkerIndex::new(vec![anonymous, marker("antipode", 0.0, 180.0)]);
        assert!(index.nearest(Point::ZERO, &camera(), 1.0).is_none());

        let projected = index.project_all(&camera(), &camera().view_projection(1.0).unwrap());
        assert!(projected[0].is_some());
        assert!(projected[1].is_none());
    }

    #[test]
    fn test_nearest_on_screen() {
        let index = MarkerIndex::new(vec![marker("center", 0.0, 0.0)]);
        let size = Point::new(1080.0, 1920.0);
        assert!(index
            .nearest_on_screen(Point::new(540.0, 960.0), size, &camera())
            .is_some());
        assert!(index
            .nearest_on_screen(Point::new(100.0, 100.0), size, &camera())
            .is_none());
        assert!(index
            .nearest_on_screen(Point::new(540.0, 960.0), Point::ZERO, &camera())
            .is_none());
    }
}
