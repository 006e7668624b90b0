use super::Route;
use crate::config::SimConfig;
use crate::graph::{RoadGraph, Segment};
use crate::math::{distance, Point2d};
use crate::SegmentId;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use smallvec::SmallVec;

/// A segment an agent may move onto after reaching the end of its current one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NextSegment {
    /// The segment to travel along.
    pub segment: SegmentId,
    /// The progress at which the agent joins the segment.
    pub progress: f64,
    /// The direction of travel along the segment.
    pub direction: i8,
    /// The point at which the agent joins the segment.
    pub entry: Point2d,
}

/// Finds the segments an agent may continue onto after travelling the length
/// of `arrived` in the given direction.
///
/// Segments that would take the agent straight back to where it came from are
/// excluded: the arrival segment itself, and any other segment whose far end
/// lies within `tolerance` metres of the arrival segment's origin.
pub(crate) fn candidates(
    graph: &RoadGraph,
    arrived: &Segment,
    direction: i8,
    tolerance: f64,
) -> SmallVec<[NextSegment; 4]> {
    let node = arrived.node_towards(direction);
    let origin = arrived.point_from(direction);

    graph
        .segments_at(node)
        .filter(|id| *id != arrived.id())
        .filter_map(|id| graph.segment(id))
        .filter_map(|segment| {
            let next = if graph.same_junction(segment.start_node(), node) {
                NextSegment {
                    segment: segment.id(),
                    progress: 0.0,
                    direction: 1,
                    entry: segment.start(),
                }
            } else if graph.same_junction(segment.end_node(), node) {
                NextSegment {
                    segment: segment.id(),
                    progress: 1.0,
                    direction: -1,
                    entry: segment.end(),
                }
            } else {
                return None;
            };
            let exit = segment.point_from(-next.direction);
            (distance(exit, origin) > tolerance).then_some(next)
        })
        .collect()
}

/// Randomly chooses the segment to continue onto at the end of the route's current segment,
/// preferring segments which haven't yet been visited.
///
/// Returns `None` if there is no segment the agent may continue onto.
pub(crate) fn choose_next(
    graph: &RoadGraph,
    route: &Route,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Option<NextSegment> {
    let arrived = graph.segment(route.segment())?;
    let options = candidates(graph, arrived, route.direction(), config.reversal_tolerance);
    let weights = options.iter().map(|next| {
        if route.has_visited(next.segment) {
            config.revisit_weight
        } else {
            1.0
        }
    });
    let dist = WeightedIndex::new(weights).ok()?;
    Some(options[dist.sample(rng)])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::Polyline;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn graph(roads: &[&[(f64, f64)]]) -> RoadGraph {
        let polylines = roads
            .iter()
            .map(|points| Polyline {
                name: "road".into(),
                class: "residential".into(),
                points: points.iter().map(|(x, y)| Point2d::new(*x, *y)).collect(),
            })
            .collect::<Vec<_>>();
        RoadGraph::build(&polylines)
    }

    fn segment_between(graph: &RoadGraph, a: (f64, f64), b: (f64, f64)) -> SegmentId {
        graph
            .iter_segments()
            .find(|s| s.start() == Point2d::new(a.0, a.1) && s.end() == Point2d::new(b.0, b.1))
            .unwrap()
            .id()
    }

    #[test]
    fn continues_along_a_straight_road() {
        let graph = graph(&[&[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)]]);
        let a = segment_between(&graph, (0.0, 0.0), (0.0, 0.001));
        let b = segment_between(&graph, (0.0, 0.001), (0.0, 0.002));

        let next = candidates(&graph, graph.segment(a).unwrap(), 1, 0.5);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].segment, b);
        assert_eq!(next[0].direction, 1);
        assert_eq!(next[0].progress, 0.0);

        // Travelling the other way along `b` leads back onto `a`, backwards
        let next = candidates(&graph, graph.segment(b).unwrap(), -1, 0.5);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].segment, a);
        assert_eq!(next[0].direction, -1);
        assert_eq!(next[0].progress, 1.0);
    }

    #[test]
    fn dead_end_has_no_candidates() {
        let graph = graph(&[&[(0.0, 0.0), (0.0, 0.001)]]);
        let a = graph.iter_segments().next().unwrap();
        assert!(candidates(&graph, a, 1, 0.5).is_empty());
        assert!(candidates(&graph, a, -1, 0.5).is_empty());
    }

    #[test]
    fn doubled_back_road_is_a_reversal() {
        let graph = graph(&[&[(0.0, 0.0), (0.0, 0.001), (0.0, 0.0)]]);
        let a = segment_between(&graph, (0.0, 0.0), (0.0, 0.001));
        assert!(candidates(&graph, graph.segment(a).unwrap(), 1, 0.5).is_empty());
    }

    #[test]
    fn duplicate_road_is_a_reversal() {
        let graph = graph(&[
            &[(0.0, 0.0), (0.0, 0.001)],
            &[(0.0, 0.0), (0.0, 0.001)],
            &[(0.0, 0.001), (0.001, 0.001)],
        ]);
        let arrived = graph
            .iter_segments()
            .find(|s| s.start() == Point2d::new(0.0, 0.0))
            .unwrap();
        let next = candidates(&graph, arrived, 1, 0.5);
        assert_eq!(next.len(), 1);
        assert_eq!(
            graph.segment(next[0].segment).unwrap().end(),
            Point2d::new(0.001, 0.001)
        );
    }

    #[test]
    fn enumerates_every_branch_of_a_junction() {
        let graph = graph(&[
            &[(0.0, -0.001), (0.0, 0.0)],
            &[(0.0, 0.0), (0.0, 0.001)],
            &[(0.0, 0.0), (0.001, 0.0)],
            &[(-0.001, 0.0), (0.0, 0.0)],
        ]);
        let a = segment_between(&graph, (0.0, -0.001), (0.0, 0.0));
        let next = candidates(&graph, graph.segment(a).unwrap(), 1, 0.5);
        assert_eq!(next.len(), 3);
        let west = segment_between(&graph, (-0.001, 0.0), (0.0, 0.0));
        let west = next.iter().find(|n| n.segment == west).unwrap();
        assert_eq!(west.direction, -1);
        assert_eq!(west.entry, Point2d::new(0.0, 0.0));
    }

    #[test]
    fn prefers_unvisited_segments() {
        let graph = graph(&[
            &[(0.0, -0.001), (0.0, 0.0)],
            &[(0.0, 0.0), (0.0, 0.001)],
            &[(0.0, 0.0), (0.001, 0.0)],
        ]);
        let a = segment_between(&graph, (0.0, -0.001), (0.0, 0.0));
        let north = segment_between(&graph, (0.0, 0.0), (0.0, 0.001));
        let route = Route::new(north, 0.0, 1).followed_by(a, 1.0, 1);
        let config = SimConfig {
            revisit_weight: 0.1,
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(3);
        let picks = (0..1000)
            .filter_map(|_| choose_next(&graph, &route, &config, &mut rng))
            .filter(|next| next.segment == north)
            .count();
        assert!(picks > 30 && picks < 200, "revisited {} times", picks);
    }

    #[test]
    fn fully_visited_with_zero_weight_stops() {
        let graph = graph(&[&[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)]]);
        let a = segment_between(&graph, (0.0, 0.0), (0.0, 0.001));
        let b = segment_between(&graph, (0.0, 0.001), (0.0, 0.002));
        let route = Route::new(b, 0.0, 1).followed_by(a, 0.0, 1);
        let config = SimConfig {
            revisit_weight: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(choose_next(&graph, &route, &config, &mut rng), None);
    }
}
