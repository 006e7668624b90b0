use std::time::{Duration, Instant};

use ride_sim::cgmath::Point2;
use ride_sim::{Polyline, RoadGraph, SimConfig, Simulation};

/// The number of roads in each direction of the benchmark grid.
const GRID_SIZE: usize = 40;

/// The spacing between grid roads, in degrees.
const GRID_STEP: f64 = 0.001;

fn main() {
    let coords = (0..GRID_SIZE)
        .map(|i| i as f64 * GRID_STEP)
        .collect::<Vec<_>>();
    let roads = coords
        .iter()
        .flat_map(|c| {
            [
                coords.iter().map(|x| Point2::new(*x, *c)).collect::<Vec<_>>(),
                coords.iter().map(|y| Point2::new(*c, *y)).collect::<Vec<_>>(),
            ]
        })
        .enumerate()
        .map(|(i, points)| Polyline {
            name: format!("Road {}", i),
            class: "residential".into(),
            points,
        })
        .collect::<Vec<_>>();
    let graph = RoadGraph::build(&roads);

    let mut sim = Simulation::with_system_clock(graph, SimConfig::default())
        .expect("default config is valid");
    let positions = (0..10_000)
        .map(|i| {
            let x = (i % GRID_SIZE) as f64 * GRID_STEP;
            let y = (i / GRID_SIZE % GRID_SIZE) as f64 * GRID_STEP;
            Point2::new(x, y)
        })
        .collect::<Vec<_>>();
    sim.spawn_population(&positions);

    println!("Simulating...");
    let num_frames = 1000;
    loop {
        let start = Instant::now();
        for _ in 0..num_frames {
            sim.step();
            std::thread::sleep(Duration::from_millis(1));
        }
        let frame = start.elapsed() / num_frames;
        let stats = sim.statistics();
        println!(
            "Avg. frame: {:?} ({} agents, {:.1}% riding, {} in transition)",
            frame, stats.total, stats.riding_pct, stats.in_transition
        );
    }
}
