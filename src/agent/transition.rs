use super::Route;
use crate::math::{lerp, Point2d};

/// A timed, linear movement between two fixed points.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Where the movement started.
    from: Point2d,
    /// Where the movement ends.
    to: Point2d,
    /// The time at which the movement started, in s.
    started: f64,
    /// The length of the movement in s.
    duration: f64,
    /// What happens once the movement is complete.
    completion: Completion,
}

/// The action applied when a [Transition] completes.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    /// Start riding along the route.
    EnterRiding(Route),
    /// Continue riding along the route, which begins on a new segment.
    AdvanceSegment(Route),
    /// Park at the transition's target.
    Park,
}

impl Transition {
    pub(crate) fn new(
        from: Point2d,
        to: Point2d,
        started: f64,
        duration: f64,
        completion: Completion,
    ) -> Self {
        Self {
            from,
            to,
            started,
            duration: duration.max(0.0),
            completion,
        }
    }

    /// Where the movement started.
    pub fn origin(&self) -> Point2d {
        self.from
    }

    /// Where the movement ends.
    pub fn target(&self) -> Point2d {
        self.to
    }

    pub fn started(&self) -> f64 {
        self.started
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    /// The fraction of the transition completed at time `now`, in `[0, 1]`.
    pub fn fraction(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started) / self.duration).clamp(0.0, 1.0)
    }

    /// The interpolated position at time `now`.
    pub fn position(&self, now: f64) -> Point2d {
        let t = self.fraction(now);
        if t >= 1.0 {
            self.to
        } else {
            lerp(self.from, self.to, t)
        }
    }

    /// Consumes the transition, returning its completion action.
    pub(crate) fn into_completion(self) -> Completion {
        self.completion
    }
}
