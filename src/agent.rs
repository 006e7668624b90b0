use self::navigation::{choose_next, NextSegment};
pub use self::route::Route;
pub use self::transition::{Completion, Transition};
use crate::config::SimConfig;
use crate::graph::RoadGraph;
use crate::locator::nearest_segment_within;
use crate::math::{distance, from_local, Point2d, Vector2d};
use crate::util::Interval;
use crate::{AgentId, SegmentId};
use log::trace;
use rand::Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod navigation;
mod route;
mod transition;

/// Whether an agent is parked or riding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AgentStatus {
    Parked,
    Riding,
}

/// A simulated vehicle which alternates between parking and riding along the road graph.
#[derive(Clone, Debug)]
pub struct Agent {
    /// The agent's ID.
    id: AgentId,
    /// The agent's current coordinates.
    position: Point2d,
    /// The agent's status. While a transition is in progress,
    /// this is the status from before the transition began.
    status: AgentStatus,
    /// The distance travelled each tick, as a fraction of a segment.
    speed: f64,
    /// The time at which the agent last started riding, in s.
    riding_since: f64,
    /// The agent's progress through the road graph, while riding.
    route: Option<Route>,
    /// The in-progress transition, if there is one.
    transition: Option<Transition>,
}

impl Agent {
    /// Creates a new parked agent.
    pub(crate) fn new(id: AgentId, position: Point2d, speed: f64, now: f64) -> Self {
        Self {
            id,
            position,
            status: AgentStatus::Parked,
            speed,
            riding_since: now,
            route: None,
            transition: None,
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's current coordinates.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The agent's status. Agents which are mid-transition report
    /// the status they had when the transition began.
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// The distance the agent travels each tick, as a fraction of a segment.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The time at which the agent last started riding, in s.
    pub fn riding_since(&self) -> f64 {
        self.riding_since
    }

    /// The agent's route. Only present while riding and not in transition.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// The in-progress transition, if there is one.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Whether the agent is part-way through a transition.
    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// The number of segments entered since the agent started riding,
    /// including the segment of a pending segment change.
    pub fn visits(&self) -> Option<u32> {
        match self.transition.as_ref().map(Transition::completion) {
            Some(Completion::AdvanceSegment(route)) => Some(route.visits()),
            _ => self.route.as_ref().map(Route::visits),
        }
    }

    /// The probability that the agent stops at a periodic check, which grows the
    /// longer the agent has been riding.
    pub(crate) fn stop_probability(&self, base: f64, config: &SimConfig, now: f64) -> f64 {
        let riding_time = f64::max(now - self.riding_since, 0.0);
        let p = base * (1.0 + riding_time / config.stop_ramp);
        p.min(config.max_stop_probability).clamp(0.0, 1.0)
    }

    /// Advances the agent by one tick.
    ///
    /// # Parameters
    /// * `graph` - The road graph
    /// * `config` - The simulation parameters
    /// * `rng` - The source of randomness
    /// * `now` - The current time in s
    pub(crate) fn tick(
        &mut self,
        graph: &RoadGraph,
        config: &SimConfig,
        rng: &mut impl Rng,
        now: f64,
    ) {
        if let Some(transition) = &self.transition {
            self.position = transition.position(now);
            if transition.fraction(now) >= 1.0 {
                self.finish_transition(config, rng, now);
            }
        } else if self.status == AgentStatus::Riding {
            self.advance(graph, config, rng, now);
        }
    }

    /// Moves a riding agent along its current segment, and decides what to do
    /// next once it reaches the end.
    fn advance(&mut self, graph: &RoadGraph, config: &SimConfig, rng: &mut impl Rng, now: f64) {
        let Some(route) = &mut self.route else {
            return;
        };
        let Some(segment) = graph.segment(route.segment()) else {
            self.route = None;
            self.status = AgentStatus::Parked;
            return;
        };

        let reached_end = route.advance(self.speed);
        self.position = segment.sample(route.progress());
        if reached_end {
            self.reach_endpoint(graph, config, rng, now);
        }
    }

    /// Decides whether to stop or continue at the end of the current segment.
    fn reach_endpoint(
        &mut self,
        graph: &RoadGraph,
        config: &SimConfig,
        rng: &mut impl Rng,
        now: f64,
    ) {
        let Some(route) = &self.route else {
            return;
        };
        let stop = rng.gen_bool(config.endpoint_stop_probability);
        let exhausted = route.visits() >= config.max_visits;

        let next = if stop || exhausted {
            None
        } else {
            choose_next(graph, route, config, rng)
        };
        match next {
            Some(next) => self.begin_segment_change(next, config, now),
            None => {
                self.begin_park(config, rng, now);
            }
        }
    }

    /// Begins moving onto the next segment.
    fn begin_segment_change(&mut self, next: NextSegment, config: &SimConfig, now: f64) {
        if let Some(route) = self.route.take() {
            trace!("Agent {:?} moving onto segment {:?}", self.id, next.segment);
            let route = route.followed_by(next.segment, next.progress, next.direction);
            self.transition = Some(Transition::new(
                self.position,
                next.entry,
                now,
                config.switch_duration,
                Completion::AdvanceSegment(route),
            ));
        }
    }

    /// Begins moving from the parked position onto the nearest segment.
    ///
    /// # Returns
    /// `false` if the agent isn't parked or idle, or no segment is within the search radius.
    pub(crate) fn begin_ride(
        &mut self,
        graph: &RoadGraph,
        config: &SimConfig,
        rng: &mut impl Rng,
        now: f64,
    ) -> bool {
        if self.status != AgentStatus::Parked || self.in_transition() {
            return false;
        }
        let Some(proj) = nearest_segment_within(graph, self.position, config.search_radius) else {
            return false;
        };

        trace!("Agent {:?} joining segment {:?}", self.id, proj.segment);
        let direction = if rng.gen_bool(0.5) { 1 } else { -1 };
        self.transition = Some(Transition::new(
            self.position,
            proj.point,
            now,
            config.enter_duration.sample(rng),
            Completion::EnterRiding(Route::new(proj.segment, proj.progress, direction)),
        ));
        true
    }

    /// Begins moving from the current position into a nearby parking spot.
    ///
    /// # Returns
    /// `false` if the agent isn't riding or idle.
    pub(crate) fn begin_park(&mut self, config: &SimConfig, rng: &mut impl Rng, now: f64) -> bool {
        if self.status != AgentStatus::Riding || self.in_transition() {
            return false;
        }

        trace!("Agent {:?} parking", self.id);
        self.route = None;
        let target = parking_spot(self.position, config.park_offset, rng);
        self.transition = Some(Transition::new(
            self.position,
            target,
            now,
            config.park_duration.sample(rng),
            Completion::Park,
        ));
        true
    }

    /// Applies the completion action of the current transition.
    fn finish_transition(&mut self, config: &SimConfig, rng: &mut impl Rng, now: f64) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        self.position = transition.target();
        match transition.into_completion() {
            Completion::EnterRiding(route) => {
                self.status = AgentStatus::Riding;
                self.riding_since = now;
                self.route = Some(route);
            }
            Completion::AdvanceSegment(route) => {
                self.route = Some(route);
                if rng.gen_bool(config.speed_change_probability) {
                    self.speed = perturbed_speed(config.speed, rng);
                }
            }
            Completion::Park => {
                self.status = AgentStatus::Parked;
                self.route = None;
            }
        }
    }

    /// Immediately places an idle agent on a segment as riding.
    ///
    /// # Returns
    /// `false` if the agent is in transition, the progress is out of range
    /// or the direction is not +1 or -1.
    pub(crate) fn place(
        &mut self,
        graph: &RoadGraph,
        segment: SegmentId,
        progress: f64,
        direction: i8,
        now: f64,
    ) -> bool {
        if self.in_transition()
            || !Interval::new(0.0, 1.0).contains(progress)
            || !matches!(direction, 1 | -1)
        {
            return false;
        }
        let Some(seg) = graph.segment(segment) else {
            return false;
        };
        if self.status != AgentStatus::Riding {
            self.riding_since = now;
        }
        self.status = AgentStatus::Riding;
        self.position = seg.sample(progress);
        self.route = Some(Route::new(segment, progress, direction));
        true
    }

    /// Immediately parks an idle agent where it is.
    ///
    /// # Returns
    /// `false` if the agent is in transition.
    pub(crate) fn park_in_place(&mut self) -> bool {
        if self.in_transition() {
            return false;
        }
        self.status = AgentStatus::Parked;
        self.route = None;
        true
    }

    /// The distance from the agent to a point, in m.
    pub(crate) fn distance_to(&self, point: Point2d) -> f64 {
        distance(self.position, point)
    }
}

/// Picks a random point within `radius` metres of `position`.
fn parking_spot(position: Point2d, radius: f64, rng: &mut impl Rng) -> Point2d {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let dist = radius * rng.gen::<f64>().sqrt();
    from_local(position, Vector2d::new(angle.cos(), angle.sin()) * dist)
}

/// Samples a new speed, centred on the middle of the speed range.
pub(crate) fn perturbed_speed(range: Interval<f64>, rng: &mut impl Rng) -> f64 {
    let speed = Normal::new(range.midpoint(), 0.25 * range.length())
        .map(|distr| distr.sample(rng))
        .unwrap_or_else(|_| range.midpoint());
    range.clamp(speed)
}
