use crate::config::SimConfig;
use crate::stats::StatusCounts;
use log::debug;

/// A proportional controller which nudges the start and stop probabilities
/// so that the riding share of the population tracks a target ratio.
#[derive(Clone, Debug)]
pub struct PopulationBalancer {
    /// The desired riding ratio.
    target: f64,
    /// The ratio above which the population counts as overfull, as a multiple of `target`.
    upper_band: f64,
    /// The factor applied to the base probabilities when out of balance.
    gain: f64,
    /// The unadjusted start probability.
    base_start: f64,
    /// The unadjusted stop probability.
    base_stop: f64,
    /// The current start probability.
    start: f64,
    /// The current stop probability.
    stop: f64,
}

impl PopulationBalancer {
    /// Creates a balancer from the simulation parameters.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            target: config.target_riding_ratio,
            upper_band: config.upper_band_factor,
            gain: config.balancer_gain,
            base_start: config.base_start_probability,
            base_stop: config.base_stop_probability,
            start: config.base_start_probability,
            stop: config.base_stop_probability,
        }
    }

    /// The probability that a parked agent starts riding at a periodic check.
    pub fn start_probability(&self) -> f64 {
        self.start
    }

    /// The base probability that a riding agent stops at a periodic check.
    pub fn stop_probability(&self) -> f64 {
        self.stop
    }

    /// The desired riding ratio.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Recomputes the start and stop probabilities from the current population.
    pub fn update(&mut self, counts: &StatusCounts) {
        let ratio = counts.riding_ratio();
        let (start, stop) = if ratio < self.target {
            (self.base_start * self.gain, self.base_stop / self.gain)
        } else if ratio > self.upper_band * self.target {
            (self.base_start / self.gain, self.base_stop * self.gain)
        } else {
            (self.base_start, self.base_stop)
        };
        self.start = start.clamp(0.0, 1.0);
        self.stop = stop.clamp(0.0, 1.0);

        debug!(
            "Riding ratio {:.3} (target {:.3}): start p = {:.4}, stop p = {:.4}",
            ratio, self.target, self.start, self.stop
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn counts(parked: usize, riding: usize) -> StatusCounts {
        StatusCounts {
            parked,
            riding,
            in_transition: 0,
        }
    }

    #[test]
    fn boosts_starts_when_too_few_ride() {
        let config = SimConfig::default();
        let mut balancer = PopulationBalancer::new(&config);
        balancer.update(&counts(95, 5));
        assert_approx_eq!(
            balancer.start_probability(),
            config.base_start_probability * config.balancer_gain
        );
        assert_approx_eq!(
            balancer.stop_probability(),
            config.base_stop_probability / config.balancer_gain
        );
    }

    #[test]
    fn boosts_stops_when_too_many_ride() {
        let config = SimConfig::default();
        let mut balancer = PopulationBalancer::new(&config);
        balancer.update(&counts(60, 40));
        assert!(balancer.start_probability() < config.base_start_probability);
        assert!(balancer.stop_probability() > config.base_stop_probability);
    }

    #[test]
    fn leaves_probabilities_alone_within_band() {
        let config = SimConfig::default();
        let mut balancer = PopulationBalancer::new(&config);
        balancer.update(&counts(95, 5));
        balancer.update(&counts(75, 25));
        assert_eq!(balancer.start_probability(), config.base_start_probability);
        assert_eq!(balancer.stop_probability(), config.base_stop_probability);
    }

    #[test]
    fn empty_population_boosts_starts() {
        let config = SimConfig::default();
        let mut balancer = PopulationBalancer::new(&config);
        balancer.update(&counts(0, 0));
        assert!(balancer.start_probability() > config.base_start_probability);
    }
}
