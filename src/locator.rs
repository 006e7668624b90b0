//! Nearest-segment queries against a [RoadGraph].
//!
//! Every query scans all segments, so it is linear in the size of the graph.
//! A spatial index would make this logarithmic for large networks.

use crate::graph::RoadGraph;
use crate::math::{project_onto_segment, Point2d};
use crate::SegmentId;

/// The projection of a point onto its nearest segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    /// The nearest segment.
    pub segment: SegmentId,
    /// The closest point on the segment.
    pub point: Point2d,
    /// The fraction along the segment of the closest point, in `[0, 1]`.
    pub progress: f64,
    /// The distance from the query point to the segment in m.
    pub distance: f64,
}

/// Finds the segment nearest to `point`, if the graph has any segments.
pub fn nearest_segment(graph: &RoadGraph, point: Point2d) -> Option<SegmentProjection> {
    graph
        .iter_segments()
        .map(|segment| {
            let (progress, projected, distance) =
                project_onto_segment(point, segment.start(), segment.end());
            SegmentProjection {
                segment: segment.id(),
                point: projected,
                progress,
                distance,
            }
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Finds the segment nearest to `point`, provided it is no more than `radius` metres away.
pub fn nearest_segment_within(
    graph: &RoadGraph,
    point: Point2d,
    radius: f64,
) -> Option<SegmentProjection> {
    nearest_segment(graph, point).filter(|proj| proj.distance <= radius)
}
