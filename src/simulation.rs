use crate::agent::{Agent, AgentStatus};
use crate::balancer::PopulationBalancer;
use crate::clock::{PeriodicTimer, SystemClock, TimeSource};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::graph::RoadGraph;
use crate::locator::nearest_segment_within;
use crate::math::Point2d;
use crate::stats::{Statistics, StatusCounts};
use crate::{AgentId, AgentSet, SegmentId};
use log::info;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

/// The state of one agent at the end of a frame, for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentFrame {
    pub id: AgentId,
    pub position: Point2d,
    pub status: AgentStatus,
    pub in_transition: bool,
}

/// A park-and-ride simulation.
///
/// The simulation is driven by calling [Simulation::step] once per frame.
/// Transitions are timed against the [TimeSource], not the number of frames,
/// so the frame rate may vary freely.
pub struct Simulation<C = SystemClock, R = StdRng> {
    /// The road network.
    graph: RoadGraph,
    /// The simulation parameters.
    config: SimConfig,
    /// The agents being simulated.
    agents: AgentSet,
    /// Adjusts the start/stop probabilities to keep the riding ratio near its target.
    balancer: PopulationBalancer,
    /// When the next periodic start/stop check is due.
    check_timer: PeriodicTimer,
    /// The source of wall-clock time.
    clock: C,
    /// The source of randomness.
    rng: R,
    /// The current frame of simulation.
    frame: usize,
}

impl Simulation {
    /// Creates a new simulation timed by the system clock, with an entropy-seeded RNG.
    pub fn with_system_clock(graph: RoadGraph, config: SimConfig) -> Result<Self, ConfigError> {
        Self::new(graph, config, SystemClock::new(), StdRng::from_entropy())
    }
}

impl<C: TimeSource, R: Rng> Simulation<C, R> {
    /// Creates a new simulation with no agents.
    pub fn new(graph: RoadGraph, config: SimConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = clock.now();
        Ok(Self {
            graph,
            balancer: PopulationBalancer::new(&config),
            check_timer: PeriodicTimer::new(config.check_interval, now),
            config,
            agents: Default::default(),
            clock,
            rng,
            frame: 0,
        })
    }

    /// Adds an agent to the simulation.
    ///
    /// A riding agent is placed on the nearest segment within the search radius,
    /// travelling in a random direction. If there is no such segment, it is parked instead.
    pub fn add_agent(&mut self, position: Point2d, status: AgentStatus) -> AgentId {
        let now = self.clock.now();
        let speed = self.config.speed.sample(&mut self.rng);
        let id = self
            .agents
            .insert_with_key(|id| Agent::new(id, position, speed, now));
        if status == AgentStatus::Riding {
            self.ride_from_nearest(id, now);
        }
        id
    }

    /// Adds an agent at each of the given positions. The configured fraction
    /// of them, chosen at random, start out riding.
    pub fn spawn_population(&mut self, positions: &[Point2d]) -> Vec<AgentId> {
        let count = positions.len();
        let riding = (count as f64 * self.config.initial_riding_fraction).round() as usize;
        let mut statuses = vec![AgentStatus::Parked; count];
        for idx in index::sample(&mut self.rng, count, riding.min(count)) {
            statuses[idx] = AgentStatus::Riding;
        }

        let ids = positions
            .iter()
            .zip(statuses)
            .map(|(position, status)| self.add_agent(*position, status))
            .collect::<Vec<_>>();

        let counts = StatusCounts::count(self.agents.values());
        info!(
            "Spawned {} agents: {} parked, {} riding",
            count, counts.parked, counts.riding
        );
        ids
    }

    /// Advances the simulation by one frame.
    ///
    /// Runs the periodic start/stop check if it is due,
    /// then moves every agent by one tick.
    pub fn step(&mut self) {
        let now = self.clock.now();
        if self.check_timer.poll(now) {
            self.periodic_check(now);
        }
        for agent in self.agents.values_mut() {
            agent.tick(&self.graph, &self.config, &mut self.rng, now);
        }
        self.frame += 1;
    }

    /// Rebalances the start/stop probabilities, then randomly starts and stops idle agents.
    fn periodic_check(&mut self, now: f64) {
        let counts = StatusCounts::count(self.agents.values());
        self.balancer.update(&counts);
        let start_p = self.balancer.start_probability();
        let stop_p = self.balancer.stop_probability();

        for agent in self.agents.values_mut() {
            if agent.in_transition() {
                continue;
            }
            match agent.status() {
                AgentStatus::Parked => {
                    if self.rng.gen_bool(start_p) {
                        agent.begin_ride(&self.graph, &self.config, &mut self.rng, now);
                    }
                }
                AgentStatus::Riding => {
                    let p = agent.stop_probability(stop_p, &self.config, now);
                    if self.rng.gen_bool(p) {
                        agent.begin_park(&self.config, &mut self.rng, now);
                    }
                }
            }
        }
    }

    /// Makes up to `count` idle parked agents, chosen at random, start riding.
    ///
    /// # Returns
    /// The number of agents which started riding. Agents with no segment
    /// within the search radius are skipped.
    pub fn start_agents(&mut self, count: usize) -> usize {
        let now = self.clock.now();
        let mut ids = self.idle_agents(AgentStatus::Parked);
        ids.shuffle(&mut self.rng);

        let mut started = 0;
        for id in ids {
            if started >= count {
                break;
            }
            if self.agents[id].begin_ride(&self.graph, &self.config, &mut self.rng, now) {
                started += 1;
            }
        }
        started
    }

    /// Makes up to `count` idle riding agents, chosen at random, park.
    ///
    /// # Returns
    /// The number of agents which began parking.
    pub fn park_agents(&mut self, count: usize) -> usize {
        let now = self.clock.now();
        let mut ids = self.idle_agents(AgentStatus::Riding);
        ids.shuffle(&mut self.rng);

        ids.into_iter()
            .take(count)
            .filter(|id| self.agents[*id].begin_park(&self.config, &mut self.rng, now))
            .count()
    }

    /// Immediately sets the status of an agent.
    ///
    /// A parked agent stays where it is. A riding agent is placed on the nearest
    /// segment within the search radius, travelling in a random direction.
    ///
    /// # Returns
    /// `false` if the agent doesn't exist, is mid-transition,
    /// or has no segment within the search radius to ride on.
    pub fn set_status(&mut self, id: AgentId, status: AgentStatus) -> bool {
        let now = self.clock.now();
        let Some(agent) = self.agents.get_mut(id) else {
            return false;
        };
        if agent.in_transition() {
            return false;
        }
        match (agent.status(), status) {
            (AgentStatus::Riding, AgentStatus::Riding) => true,
            (_, AgentStatus::Parked) => agent.park_in_place(),
            (AgentStatus::Parked, AgentStatus::Riding) => self.ride_from_nearest(id, now),
        }
    }

    /// Immediately places an agent on a segment, riding in the given direction.
    ///
    /// # Returns
    /// `false` if the agent or segment doesn't exist, the agent is mid-transition,
    /// or `progress` is outside `[0, 1]`.
    pub fn place_agent(
        &mut self,
        id: AgentId,
        segment: SegmentId,
        progress: f64,
        direction: i8,
    ) -> bool {
        let now = self.clock.now();
        match self.agents.get_mut(id) {
            Some(agent) => agent.place(&self.graph, segment, progress, direction, now),
            None => false,
        }
    }

    /// Places an agent on its nearest segment, travelling in a random direction.
    fn ride_from_nearest(&mut self, id: AgentId, now: f64) -> bool {
        let agent = &mut self.agents[id];
        let position = agent.position();
        match nearest_segment_within(&self.graph, position, self.config.search_radius) {
            Some(proj) => {
                let direction = if self.rng.gen_bool(0.5) { 1 } else { -1 };
                agent.place(&self.graph, proj.segment, proj.progress, direction, now)
            }
            None => false,
        }
    }

    /// The IDs of agents with the given status which are not mid-transition.
    fn idle_agents(&self, status: AgentStatus) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|agent| agent.status() == status && !agent.in_transition())
            .map(Agent::id)
            .collect()
    }

    /// Summarises the state of the population.
    pub fn statistics(&self) -> Statistics {
        Statistics::collect(self.agents.values())
    }

    /// The IDs of all agents with the given status.
    pub fn query_by_status(&self, status: AgentStatus) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|agent| agent.status() == status)
            .map(Agent::id)
            .collect()
    }

    /// The IDs of all agents within `radius` metres of `centre`.
    pub fn query_in_radius(&self, centre: Point2d, radius: f64) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|agent| agent.distance_to(centre) <= radius)
            .map(Agent::id)
            .collect()
    }

    /// Returns the position and status of every agent, for rendering.
    pub fn iter_frames(&self) -> impl Iterator<Item = AgentFrame> + '_ {
        self.agents.values().map(|agent| AgentFrame {
            id: agent.id(),
            position: agent.position(),
            status: agent.status(),
            in_transition: agent.in_transition(),
        })
    }

    /// Returns an iterator over all the agents in the simulation.
    pub fn iter_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Gets a reference to the agent with the given ID.
    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// The number of agents in the simulation.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Gets the road network.
    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    /// Gets the simulation parameters.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Gets the population balancer.
    pub fn balancer(&self) -> &PopulationBalancer {
        &self.balancer
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the current time from the simulation's clock, in s.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }
}
