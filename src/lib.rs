pub use agent::{Agent, AgentStatus, Completion, Route, Transition};
pub use balancer::PopulationBalancer;
pub use cgmath;
pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::SimConfig;
pub use error::ConfigError;
pub use graph::{Node, Polyline, RoadGraph, RoadInfo, Segment};
pub use locator::{nearest_segment, nearest_segment_within, SegmentProjection};
pub use simulation::{AgentFrame, Simulation};
pub use slotmap::{Key, KeyData};
pub use stats::{Statistics, StatusCounts};
pub use util::Interval;
use slotmap::{new_key_type, SlotMap};

mod agent;
mod balancer;
mod clock;
mod config;
mod error;
mod graph;
mod locator;
pub mod math;
mod simulation;
mod stats;
mod util;

new_key_type! {
    /// Unique ID of a [Node].
    pub struct NodeId;
    /// Unique ID of a [Segment].
    pub struct SegmentId;
    /// Unique ID of a source road polyline.
    pub struct RoadId;
    /// Unique ID of a group of nodes sharing a vertex.
    pub struct JunctionId;
    /// Unique ID of an [Agent].
    pub struct AgentId;
}

type NodeSet = SlotMap<NodeId, Node>;
type SegmentSet = SlotMap<SegmentId, Segment>;
type AgentSet = SlotMap<AgentId, Agent>;
