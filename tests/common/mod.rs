#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ride_sim::cgmath::Point2;
use ride_sim::{ManualClock, Polyline, RoadGraph, SegmentId, SimConfig, Simulation};

pub type TestSim = Simulation<ManualClock, StdRng>;

/// Spacing between grid lines, in degrees (about 111 m).
pub const GRID_STEP: f64 = 0.001;

pub fn pt(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

pub fn road(points: &[(f64, f64)]) -> Polyline {
    Polyline {
        name: "test road".into(),
        class: "residential".into(),
        points: points.iter().map(|(x, y)| pt(*x, *y)).collect(),
    }
}

/// A square grid of `n` by `n` roads, which cross at shared vertices.
pub fn grid(n: usize) -> RoadGraph {
    let coords = (0..n).map(|i| i as f64 * GRID_STEP).collect::<Vec<_>>();
    let mut roads = vec![];
    for c in &coords {
        roads.push(road(&coords.iter().map(|x| (*x, *c)).collect::<Vec<_>>()));
        roads.push(road(&coords.iter().map(|y| (*c, *y)).collect::<Vec<_>>()));
    }
    RoadGraph::build(&roads)
}

/// Random positions within a few metres of the vertices of a grid.
pub fn grid_positions(n: usize, count: usize, seed: u64) -> Vec<Point2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(0..n) as f64 * GRID_STEP + rng.gen_range(-0.00003..0.00003);
            let y = rng.gen_range(0..n) as f64 * GRID_STEP + rng.gen_range(-0.00003..0.00003);
            pt(x, y)
        })
        .collect()
}

/// Config in which agents never start or stop except at segment ends,
/// and always continue if they can.
pub fn always_continue() -> SimConfig {
    SimConfig {
        base_start_probability: 0.0,
        base_stop_probability: 0.0,
        endpoint_stop_probability: 0.0,
        ..Default::default()
    }
}

pub fn sim(graph: RoadGraph, config: SimConfig, seed: u64) -> (TestSim, ManualClock) {
    let clock = ManualClock::new(0.0);
    let sim = Simulation::new(graph, config, clock.clone(), StdRng::seed_from_u64(seed))
        .expect("valid config");
    (sim, clock)
}

pub fn segment_from(graph: &RoadGraph, start: (f64, f64), end: (f64, f64)) -> SegmentId {
    graph
        .iter_segments()
        .find(|s| s.start() == pt(start.0, start.1) && s.end() == pt(end.0, end.1))
        .expect("segment exists")
        .id()
}
