use crate::error::ConfigError;
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The tunable parameters of a simulation.
///
/// Durations are in seconds of wall-clock time, distances in metres,
/// and speeds in fractions of a segment per tick.
///
/// The population balancer is only stable when `check_interval` is large
/// relative to the transition durations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// The maximum distance from a parked agent to a segment it may start riding on, in m.
    pub search_radius: f64,
    /// The duration of the transition onto a road, in s.
    pub enter_duration: Interval<f64>,
    /// The duration of the transition into a parking spot, in s.
    pub park_duration: Interval<f64>,
    /// The duration of the transition from one segment onto the next, in s.
    /// Must be shorter than the shortest park duration.
    pub switch_duration: f64,
    /// The time between periodic start/stop checks, in s.
    pub check_interval: f64,
    /// The probability that a parked agent starts riding at a periodic check.
    pub base_start_probability: f64,
    /// The probability that a riding agent parks at a periodic check,
    /// before accounting for how long it has been riding.
    pub base_stop_probability: f64,
    /// The riding time over which the stop probability grows by one multiple of the base, in s.
    pub stop_ramp: f64,
    /// The upper bound of the periodic stop probability.
    pub max_stop_probability: f64,
    /// The desired fraction of agents that are riding.
    pub target_riding_ratio: f64,
    /// The ratio, as a multiple of the target, above which the population is considered overfull.
    pub upper_band_factor: f64,
    /// The factor by which the balancer scales the base probabilities.
    pub balancer_gain: f64,
    /// The probability of stopping upon reaching the end of a segment.
    pub endpoint_stop_probability: f64,
    /// The maximum number of segments an agent visits before it must park.
    pub max_visits: u32,
    /// The relative weight of already visited segments when choosing the next one.
    pub revisit_weight: f64,
    /// The range of agent speeds.
    pub speed: Interval<f64>,
    /// The probability of perturbing an agent's speed when it changes segments.
    pub speed_change_probability: f64,
    /// The maximum distance between a parking spot and the road, in m.
    pub park_offset: f64,
    /// The distance within which two segment ends are treated as the same point, in m.
    pub reversal_tolerance: f64,
    /// The fraction of the initial population that starts out riding.
    pub initial_riding_fraction: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            search_radius: 50.0,
            enter_duration: Interval::new(1.0, 3.0),
            park_duration: Interval::new(0.5, 1.5),
            switch_duration: 0.3,
            check_interval: 10.0,
            base_start_probability: 0.03,
            base_stop_probability: 0.12,
            stop_ramp: 120.0,
            max_stop_probability: 0.6,
            target_riding_ratio: 0.2,
            upper_band_factor: 1.5,
            balancer_gain: 1.5,
            endpoint_stop_probability: 0.15,
            max_visits: 20,
            revisit_weight: 0.2,
            speed: Interval::new(0.005, 0.015),
            speed_change_probability: 0.1,
            park_offset: 8.0,
            reversal_tolerance: 0.5,
            initial_riding_fraction: 0.15,
        }
    }
}

impl SimConfig {
    /// Checks that every parameter is within its meaningful range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("base start probability", self.base_start_probability),
            ("base stop probability", self.base_stop_probability),
            ("max stop probability", self.max_stop_probability),
            ("target riding ratio", self.target_riding_ratio),
            ("endpoint stop probability", self.endpoint_stop_probability),
            ("revisit weight", self.revisit_weight),
            ("speed change probability", self.speed_change_probability),
            ("initial riding fraction", self.initial_riding_fraction),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }

        let ranges = [
            ("enter duration", self.enter_duration),
            ("park duration", self.park_duration),
            ("speed", self.speed),
        ];
        for (name, range) in ranges {
            if !range.is_ordered() || range.min < 0.0 || !range.max.is_finite() {
                return Err(ConfigError::Range {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let positives = [
            ("search radius", self.search_radius),
            ("check interval", self.check_interval),
            ("stop ramp", self.stop_ramp),
        ];
        for (name, value) in positives {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negatives = [
            ("switch duration", self.switch_duration),
            ("park offset", self.park_offset),
            ("reversal tolerance", self.reversal_tolerance),
        ];
        for (name, value) in non_negatives {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ConfigError::Range {
                    name,
                    min: value,
                    max: value,
                });
            }
        }

        let factors = [
            ("upper band factor", self.upper_band_factor),
            ("balancer gain", self.balancer_gain),
        ];
        for (name, value) in factors {
            if !(value >= 1.0) || !value.is_finite() {
                return Err(ConfigError::BelowOne { name, value });
            }
        }

        if self.switch_duration >= self.park_duration.min {
            return Err(ConfigError::SwitchDuration {
                switch: self.switch_duration,
                park: self.park_duration.min,
            });
        }

        if self.max_visits == 0 {
            return Err(ConfigError::VisitCeiling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_probability() {
        let config = SimConfig {
            endpoint_stop_probability: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Probability {
                name: "endpoint stop probability",
                value: 1.5
            })
        );
    }

    #[test]
    fn rejects_inverted_range() {
        let config = SimConfig {
            speed: Interval::new(0.02, 0.01),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Range { name: "speed", .. })
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = SimConfig {
            check_interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { .. })
        ));
        let config = SimConfig {
            max_visits: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::VisitCeiling));
    }

    #[test]
    fn rejects_weakening_balancer() {
        let config = SimConfig {
            balancer_gain: 0.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BelowOne {
                name: "balancer gain",
                value: 0.5
            })
        );
        let config = SimConfig {
            upper_band_factor: 0.9,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BelowOne { name: "upper band factor", .. })
        ));
        let config = SimConfig {
            balancer_gain: 1.0,
            upper_band_factor: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn switching_is_quicker_than_parking() {
        let config = SimConfig {
            switch_duration: 0.5,
            park_duration: Interval::new(0.5, 1.5),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SwitchDuration {
                switch: 0.5,
                park: 0.5
            })
        );
    }
}
