use crate::math::{distance, Point2d};
use crate::{JunctionId, NodeId, NodeSet, RoadId, SegmentId, SegmentSet};
use itertools::Itertools;
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The road classes that agents may travel along.
const TRAVERSABLE_CLASSES: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
];

/// A named road centre line, as supplied by the map collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    /// The name of the road.
    pub name: String,
    /// The road class label, e.g. `"residential"`.
    pub class: String,
    /// The vertices of the centre line.
    pub points: Vec<Point2d>,
}

/// The attributes of a road that contributed segments to the graph.
#[derive(Clone, Debug)]
pub struct RoadInfo {
    /// The name of the road.
    pub name: String,
    /// The road class label.
    pub class: String,
}

/// A vertex of a road polyline.
#[derive(Clone, Debug)]
pub struct Node {
    /// The node ID.
    id: NodeId,
    /// The node's coordinates.
    point: Point2d,
    /// The group of nodes sharing this node's vertex.
    junction: JunctionId,
    /// The segments which start or end at this node.
    segments: SmallVec<[SegmentId; 2]>,
}

/// A straight edge between two consecutive vertices of a road polyline.
#[derive(Clone, Debug)]
pub struct Segment {
    /// The segment ID.
    id: SegmentId,
    /// The road this segment belongs to.
    road: RoadId,
    /// The node at the start of the segment.
    start_node: NodeId,
    /// The node at the end of the segment.
    end_node: NodeId,
    /// The coordinates of the start of the segment.
    start: Point2d,
    /// The coordinates of the end of the segment.
    end: Point2d,
}

/// The immutable road network agents ride on.
#[derive(Clone, Debug, Default)]
pub struct RoadGraph {
    roads: SlotMap<RoadId, RoadInfo>,
    nodes: NodeSet,
    segments: SegmentSet,
    junctions: SlotMap<JunctionId, SmallVec<[NodeId; 4]>>,
}

impl Node {
    /// Gets the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The coordinates of the node.
    pub fn point(&self) -> Point2d {
        self.point
    }

    /// The junction this node belongs to.
    pub fn junction(&self) -> JunctionId {
        self.junction
    }

    /// The segments incident to this node.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// The number of segments incident to this node.
    pub fn degree(&self) -> usize {
        self.segments.len()
    }
}

impl Segment {
    /// Gets the segment's ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The road the segment was built from.
    pub fn road(&self) -> RoadId {
        self.road
    }

    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    pub fn start(&self) -> Point2d {
        self.start
    }

    pub fn end(&self) -> Point2d {
        self.end
    }

    /// The approximate length of the segment in m.
    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Samples the point at fraction `t` along the segment.
    pub fn sample(&self, t: f64) -> Point2d {
        match t {
            t if t <= 0.0 => self.start,
            t if t >= 1.0 => self.end,
            t => crate::math::lerp(self.start, self.end, t),
        }
    }

    /// The node an agent reaches when travelling in the given direction.
    pub fn node_towards(&self, direction: i8) -> NodeId {
        if direction >= 0 {
            self.end_node
        } else {
            self.start_node
        }
    }

    /// The point an agent departs from when travelling in the given direction.
    pub fn point_from(&self, direction: i8) -> Point2d {
        if direction >= 0 {
            self.start
        } else {
            self.end
        }
    }
}

impl RoadGraph {
    /// Builds a road graph from a set of polylines.
    ///
    /// Only polylines of a traversable road class are kept, and polylines with
    /// fewer than two distinct vertices are skipped.
    pub fn build<'a>(polylines: impl IntoIterator<Item = &'a Polyline>) -> Self {
        let mut graph = Self::default();
        let mut vertices = HashMap::<(u64, u64), JunctionId>::new();
        let mut skipped = 0;

        for polyline in polylines {
            if !is_traversable(&polyline.class) {
                skipped += 1;
                continue;
            }
            let points = polyline.points.iter().copied().dedup().collect::<Vec<_>>();
            if points.len() < 2 {
                debug!("Skipping degenerate road {:?}", polyline.name);
                skipped += 1;
                continue;
            }
            graph.add_road(polyline, &points, &mut vertices);
        }

        info!(
            "Built road graph: {} roads ({} skipped), {} segments, {} nodes, {} junctions",
            graph.roads.len(),
            skipped,
            graph.segments.len(),
            graph.nodes.len(),
            graph.junctions.len()
        );
        graph
    }

    /// Adds the segments and nodes of a single road.
    fn add_road(
        &mut self,
        polyline: &Polyline,
        points: &[Point2d],
        vertices: &mut HashMap<(u64, u64), JunctionId>,
    ) {
        let road = self.roads.insert(RoadInfo {
            name: polyline.name.clone(),
            class: polyline.class.clone(),
        });

        let node_ids = points
            .iter()
            .map(|point| {
                let junction = *vertices
                    .entry(vertex_key(*point))
                    .or_insert_with(|| self.junctions.insert(SmallVec::new()));
                let id = self.nodes.insert_with_key(|id| Node {
                    id,
                    point: *point,
                    junction,
                    segments: SmallVec::new(),
                });
                self.junctions[junction].push(id);
                id
            })
            .collect::<Vec<_>>();

        for (&start_node, &end_node) in node_ids.iter().tuple_windows() {
            let start = self.nodes[start_node].point;
            let end = self.nodes[end_node].point;
            let id = self.segments.insert_with_key(|id| Segment {
                id,
                road,
                start_node,
                end_node,
                start,
                end,
            });
            self.nodes[start_node].segments.push(id);
            self.nodes[end_node].segments.push(id);
        }
    }

    /// Returns true if the graph has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Gets a reference to the segment with the given ID.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// Gets a reference to the node with the given ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Gets the attributes of the road with the given ID.
    pub fn road(&self, id: RoadId) -> Option<&RoadInfo> {
        self.roads.get(id)
    }

    /// Returns an iterator over all the segments in the graph.
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// Returns an iterator over all the nodes in the graph.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The number of segments in the graph.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if both nodes share a vertex.
    pub fn same_junction(&self, a: NodeId, b: NodeId) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.junction == b.junction,
            _ => false,
        }
    }

    /// Returns the segments connected at the given node, including those
    /// of other roads sharing the node's vertex.
    pub fn segments_at(&self, node: NodeId) -> impl Iterator<Item = SegmentId> + '_ {
        self.nodes
            .get(node)
            .map(|node| self.junctions[node.junction].as_slice())
            .unwrap_or_default()
            .iter()
            .flat_map(|id| self.nodes[*id].segments.iter().copied())
            .unique()
    }
}

/// The key under which coincident vertices are grouped. Signed zeros are equal.
fn vertex_key(point: Point2d) -> (u64, u64) {
    ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
}

/// Returns true if agents may travel on roads of the given class.
fn is_traversable(class: &str) -> bool {
    TRAVERSABLE_CLASSES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(class))
}
