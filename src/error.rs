use thiserror::Error;

/// A problem with a [SimConfig](crate::SimConfig), reported before a simulation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("{name} must be an ordered, non-negative range, got [{min}, {max}]")]
    Range {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be at least 1, got {value}")]
    BelowOne { name: &'static str, value: f64 },

    #[error("switch duration {switch} must be shorter than the shortest park duration {park}")]
    SwitchDuration { switch: f64, park: f64 },

    #[error("visit ceiling must be at least 1")]
    VisitCeiling,
}
