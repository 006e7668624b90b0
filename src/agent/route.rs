use crate::SegmentId;
use smallvec::SmallVec;

/// An agent's progress through the road network while riding.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// The segment the agent is travelling along.
    segment: SegmentId,
    /// The fraction of the segment from its start node, in `[0, 1]`.
    progress: f64,
    /// +1 when travelling towards the end node, -1 towards the start node.
    direction: i8,
    /// The segment the agent travelled along before the current one.
    previous: Option<SegmentId>,
    /// The segments visited since the agent started riding.
    visited: SmallVec<[SegmentId; 8]>,
    /// The number of segments entered since the agent started riding.
    visits: u32,
}

impl Route {
    /// Creates a route which starts on the given segment.
    pub(crate) fn new(segment: SegmentId, progress: f64, direction: i8) -> Self {
        Self {
            segment,
            progress: progress.clamp(0.0, 1.0),
            direction: direction.signum(),
            previous: None,
            visited: SmallVec::from_elem(segment, 1),
            visits: 1,
        }
    }

    /// Creates the route which results from moving onto the next segment.
    pub(crate) fn followed_by(&self, segment: SegmentId, progress: f64, direction: i8) -> Self {
        let mut visited = self.visited.clone();
        if !visited.contains(&segment) {
            visited.push(segment);
        }
        Self {
            segment,
            progress: progress.clamp(0.0, 1.0),
            direction: direction.signum(),
            previous: Some(self.segment),
            visited,
            visits: self.visits.saturating_add(1),
        }
    }

    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn previous(&self) -> Option<SegmentId> {
        self.previous
    }

    /// The number of segments entered since the agent started riding.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Whether the agent has already travelled along the segment since it started riding.
    pub fn has_visited(&self, segment: SegmentId) -> bool {
        self.visited.contains(&segment)
    }

    /// Moves the agent along the segment by `distance`, a fraction of the segment's length,
    /// in the direction of travel.
    ///
    /// # Returns
    /// `true` iff the agent has reached the end of the segment.
    pub(crate) fn advance(&mut self, distance: f64) -> bool {
        self.progress = (self.progress + distance * self.direction as f64).clamp(0.0, 1.0);
        if self.direction > 0 {
            self.progress >= 1.0
        } else {
            self.progress <= 0.0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn following_tracks_history() {
        let mut ids = SlotMap::<SegmentId, ()>::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));

        let route = Route::new(a, 0.3, 1);
        let next = route.followed_by(b, 1.0, -1);
        assert_eq!(next.previous(), Some(a));
        assert_eq!(next.visits(), 2);
        assert!(next.has_visited(a) && next.has_visited(b));

        let again = next.followed_by(a, 0.0, 1);
        assert_eq!(again.visits(), 3);
        assert_eq!(again.visited.len(), 2);
    }

    #[test]
    fn progress_is_clamped() {
        let mut ids = SlotMap::<SegmentId, ()>::with_key();
        let mut route = Route::new(ids.insert(()), 0.95, 1);
        assert!(!route.advance(0.04));
        assert!(route.advance(0.04));
        assert_eq!(route.progress(), 1.0);

        let mut route = Route::new(ids.insert(()), 0.02, -1);
        assert!(route.advance(0.05));
        assert_eq!(route.progress(), 0.0);
    }
}
