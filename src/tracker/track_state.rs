use nalgebra::{Point2, Vector2};

use crate::geometry::OrientedBox;

/// Lifecycle phase of a velocity-gated track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrackPhase {
    /// No acceptance timer is open; the next candidate seeds the track
    #[default]
    Unseen,
    /// Seeded and collecting gate-passing matches since `since`
    Pending { since: f64 },
    /// Trusted; `reset_since` starts the periodic re-validation timer
    Valid { reset_since: Option<f64> },
}

impl TrackPhase {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Last accepted box together with its planar velocity estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMotion {
    pub last_box: OrientedBox,
    pub velocity: Vector2<f64>,
    pub time: f64,
}

impl TrackMotion {
    pub fn new(last_box: OrientedBox, time: f64) -> Self {
        Self {
            last_box,
            velocity: Vector2::zeros(),
            time,
        }
    }

    /// Dead-reckon the last box to `time`; earlier times return it unmoved.
    pub fn predict(&self, time: f64) -> OrientedBox {
        self.last_box
            .translated_planar(&(self.velocity * self.elapsed(time)))
    }

    pub fn predicted_anchor(&self, time: f64) -> Point2<f64> {
        self.last_box.tracking_anchor() + self.velocity * self.elapsed(time)
    }

    #[inline]
    fn elapsed(&self, time: f64) -> f64 {
        (time - self.time).max(0.0)
    }

    /// Planar velocity implied by moving the anchor to `anchor` at `time`.
    ///
    /// Elapsed times shorter than `min_dt`, including negative ones from
    /// out-of-order frames, carry no velocity information and return the
    /// current estimate.
    pub fn velocity_to(&self, anchor: &Point2<f64>, time: f64, min_dt: f64) -> Vector2<f64> {
        let dt = time - self.time;
        if dt.is_nan() || dt < min_dt || dt == 0.0 {
            return self.velocity;
        }
        (*anchor - self.last_box.tracking_anchor()) / dt
    }
}
