//! Viewport query plumbing: "moveend" debounce, the zoom-derived result
//! limit, and the request id that keeps stale responses off the map.

use std::time::{Duration, Instant};

use crate::map::Viewport;
use crate::wkt::format_point;

/// Quiet period after the last pan/zoom before the view counts as settled
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Fires once per burst of viewport movement, after it stops
pub struct MoveSettle {
    last_move: Option<Instant>,
    delay: Duration,
}

impl MoveSettle {
    pub fn new(delay: Duration) -> Self {
        Self {
            last_move: None,
            delay,
        }
    }

    pub fn note_move(&mut self, now: Instant) {
        self.last_move = Some(now);
    }

    /// True exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_move {
            Some(at) if now.duration_since(at) >= self.delay => {
                self.last_move = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.last_move.is_some()
    }
}

impl Default for MoveSettle {
    fn default() -> Self {
        Self::new(SETTLE_DELAY)
    }
}

/// Monotonic request ids; only the latest issued id is accepted
#[derive(Default)]
pub struct RequestGate {
    latest: u64,
    answered: u64,
}

impl RequestGate {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Take a response; false when a newer request has been issued since
    pub fn accept(&mut self, id: u64) -> bool {
        if id != self.latest {
            return false;
        }
        self.answered = id;
        true
    }

    /// A request has been issued and the latest one has been answered
    pub fn is_answered(&self) -> bool {
        self.latest > 0 && self.answered == self.latest
    }
}

/// Landmarks-in-view query: centre point plus a result cap
#[derive(Clone, Debug, PartialEq)]
pub struct ViewQuery {
    pub center: (f64, f64),
    pub limit: u32,
}

impl ViewQuery {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self {
            center: (viewport.center_lon, viewport.center_lat),
            limit: limit_for_level(viewport.level()),
        }
    }

    /// `POINT(lon lat)` of the centre
    pub fn location(&self) -> String {
        format_point(self.center.0, self.center.1)
    }
}

/// Zoomed-out views cover more landmarks, so ask for more
pub fn limit_for_level(level: f64) -> u32 {
    if level >= 16.0 {
        25
    } else if level >= 14.0 {
        50
    } else if level >= 12.0 {
        100
    } else {
        200
    }
}
