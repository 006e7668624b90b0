use crate::agent::{Agent, AgentStatus};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of agents in each status.
///
/// Agents mid-transition are counted by the status they had when the transition began.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub parked: usize,
    pub riding: usize,
    pub in_transition: usize,
}

impl StatusCounts {
    /// Counts the agents by status.
    pub fn count<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut counts = Self::default();
        for agent in agents {
            counts.add(agent);
        }
        counts
    }

    fn add(&mut self, agent: &Agent) {
        match agent.status() {
            AgentStatus::Parked => self.parked += 1,
            AgentStatus::Riding => self.riding += 1,
        }
        if agent.in_transition() {
            self.in_transition += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.parked + self.riding
    }

    /// The fraction of agents which are riding, or zero if there are no agents.
    pub fn riding_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.riding as f64 / total as f64,
        }
    }
}

/// A summary of the state of the population.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Statistics {
    pub total: usize,
    pub parked: usize,
    pub riding: usize,
    pub in_transition: usize,
    /// The percentage of agents which are parked.
    pub parked_pct: f64,
    /// The percentage of agents which are riding.
    pub riding_pct: f64,
    /// The mean visit count of agents with an active route.
    pub avg_visit_count: f64,
    /// The largest visit count of any agent with an active route.
    pub max_visit_count: u32,
}

impl Statistics {
    /// Summarises the given agents.
    pub fn collect<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut counts = StatusCounts::default();
        let (mut sum, mut cnt, mut max) = (0u64, 0usize, 0u32);
        for agent in agents {
            counts.add(agent);
            if let Some(visits) = agent.route().map(|route| route.visits()) {
                sum += visits as u64;
                cnt += 1;
                max = max.max(visits);
            }
        }

        let pct = |n: usize| match counts.total() {
            0 => 0.0,
            total => 100.0 * n as f64 / total as f64,
        };
        Self {
            total: counts.total(),
            parked: counts.parked,
            riding: counts.riding,
            in_transition: counts.in_transition,
            parked_pct: pct(counts.parked),
            riding_pct: pct(counts.riding),
            avg_visit_count: if cnt > 0 { sum as f64 / cnt as f64 } else { 0.0 },
            max_visit_count: max,
        }
    }
}
