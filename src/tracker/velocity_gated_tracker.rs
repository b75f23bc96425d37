//! Single-object track filter gated on frame-to-frame velocity change.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::geometry::OrientedBox;
use crate::tracker::selection::SelectionPolicy;
use crate::tracker::track_state::{TrackMotion, TrackPhase};

/// Largest accepted change of planar velocity between frames, 20 km/h in m/s.
pub const MAX_SPEED_GRAD: f64 = 4.17;
/// Continuous matching time before a pending track becomes valid, in seconds.
pub const INIT_TIME: f64 = 1.0;
/// Time after which a valid track is re-validated, in seconds.
pub const RESET_TIME: f64 = 1.0;

/// Convert a `(sec, nsec)` stamp into seconds.
#[inline]
pub fn timestamp_from_parts(sec: i64, nsec: i64) -> f64 {
    sec as f64 + 1e-9 * nsec as f64
}

/// Configuration for the [`VelocityGatedTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub max_speed_grad: f64,
    pub init_time: f64,
    pub reset_time: f64,
    /// Elapsed times below this are treated as the same instant
    pub min_dt: f64,
    pub selection: SelectionPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_speed_grad: MAX_SPEED_GRAD,
            init_time: INIT_TIME,
            reset_time: RESET_TIME,
            min_dt: 1e-6,
            selection: SelectionPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_speed_grad", self.max_speed_grad),
            ("init_time", self.init_time),
            ("reset_time", self.reset_time),
            ("min_dt", self.min_dt),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.max_speed_grad == 0.0 {
            return Err(Error::InvalidConfig(
                "max_speed_grad must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one pass over a frame.
enum StepFlow {
    Done(Option<OrientedBox>),
    /// The reset timer expired; the frame must be filtered again from the
    /// demoted state. Carries the output computed before demotion.
    Revalidate(Option<OrientedBox>),
}

/// Tracks one object through per-frame candidate boxes.
///
/// A candidate is accepted when its implied velocity differs from the current
/// estimate by less than `max_speed_grad`. When nothing is acceptable the last
/// box is dead-reckoned forward. A track needs `init_time` of continuous
/// matches to become valid, and a valid track is demoted and re-seeded every
/// `reset_time`.
#[derive(Debug, Clone, Default)]
pub struct VelocityGatedTracker {
    config: TrackerConfig,
    phase: TrackPhase,
    motion: Option<TrackMotion>,
}

impl VelocityGatedTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            phase: TrackPhase::Unseen,
            motion: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    pub fn is_valid(&self) -> bool {
        self.phase.is_valid()
    }

    /// Last accepted box, if any candidate was ever accepted.
    pub fn last_box(&self) -> Option<&OrientedBox> {
        self.motion.as_ref().map(|m| &m.last_box)
    }

    pub fn velocity(&self) -> Option<Vector2<f64>> {
        self.motion.as_ref().map(|m| m.velocity)
    }

    /// Forget everything, as if freshly constructed.
    pub fn reset(&mut self) {
        self.phase = TrackPhase::Unseen;
        self.motion = None;
    }

    /// Filter one frame of candidates, returning at most one box.
    pub fn step(&mut self, candidates: &[OrientedBox], timestamp: f64) -> Option<OrientedBox> {
        match self.advance(candidates, timestamp) {
            StepFlow::Done(output) => output,
            StepFlow::Revalidate(fallback) => match self.advance(candidates, timestamp) {
                StepFlow::Done(output) => output,
                StepFlow::Revalidate(_) => fallback,
            },
        }
    }

    /// [`step`](Self::step) with a `(sec, nsec)` timestamp.
    pub fn step_at(
        &mut self,
        candidates: &[OrientedBox],
        sec: i64,
        nsec: i64,
    ) -> Option<OrientedBox> {
        self.step(candidates, timestamp_from_parts(sec, nsec))
    }

    fn advance(&mut self, candidates: &[OrientedBox], time: f64) -> StepFlow {
        if candidates.is_empty() {
            return StepFlow::Done(self.predict(time));
        }

        match self.phase {
            TrackPhase::Unseen => StepFlow::Done(Some(self.seed(candidates, time))),
            TrackPhase::Pending { since } => {
                let passing = self.gate(candidates, time);
                if passing.is_empty() {
                    debug!(time, "no candidate passed the velocity gate; acceptance timer closed");
                    self.phase = TrackPhase::Unseen;
                    return StepFlow::Done(self.predict(time));
                }

                let chosen = self.accept(&passing, time);
                if time - since > self.config.init_time {
                    debug!(time, since, "track validated");
                    self.phase = TrackPhase::Valid { reset_since: None };
                }
                StepFlow::Done(Some(chosen))
            }
            TrackPhase::Valid { reset_since } => {
                let passing = self.gate(candidates, time);
                let output = if passing.is_empty() {
                    self.predict(time)
                } else {
                    Some(self.accept(&passing, time))
                };

                match reset_since {
                    None => {
                        self.phase = TrackPhase::Valid {
                            reset_since: Some(time),
                        };
                        StepFlow::Done(output)
                    }
                    Some(start) if time - start > self.config.reset_time => {
                        debug!(time, start, "reset timer expired; re-validating track");
                        self.phase = TrackPhase::Unseen;
                        StepFlow::Revalidate(output)
                    }
                    Some(_) => StepFlow::Done(output),
                }
            }
        }
    }

    fn predict(&self, time: f64) -> Option<OrientedBox> {
        self.motion.as_ref().map(|m| m.predict(time))
    }

    fn predicted_anchor(&self, time: f64) -> Option<Point2<f64>> {
        self.motion.as_ref().map(|m| m.predicted_anchor(time))
    }

    fn choose(&self, candidates: &[OrientedBox], time: f64) -> OrientedBox {
        let index = self
            .config
            .selection
            .select(candidates, self.predicted_anchor(time))
            .unwrap_or(0);
        candidates[index]
    }

    /// Start a fresh acceptance window from one of `candidates` (non-empty).
    fn seed(&mut self, candidates: &[OrientedBox], time: f64) -> OrientedBox {
        let chosen = self.choose(candidates, time);
        self.motion = Some(TrackMotion::new(chosen, time));
        self.phase = TrackPhase::Pending { since: time };
        debug!(time, "track seeded; acceptance timer opened");
        chosen
    }

    /// Candidates whose implied velocity is close enough to the current estimate.
    fn gate(&self, candidates: &[OrientedBox], time: f64) -> Vec<OrientedBox> {
        let Some(motion) = self.motion.as_ref() else {
            return candidates.to_vec();
        };
        candidates
            .iter()
            .filter(|c| {
                let velocity = motion.velocity_to(&c.tracking_anchor(), time, self.config.min_dt);
                let change = (velocity - motion.velocity).norm();
                let passes = change < self.config.max_speed_grad;
                if !passes {
                    trace!(time, change, "candidate rejected by velocity gate");
                }
                passes
            })
            .copied()
            .collect()
    }

    /// Adopt one of the gate-passing candidates (non-empty) as the new state.
    fn accept(&mut self, passing: &[OrientedBox], time: f64) -> OrientedBox {
        let chosen = self.choose(passing, time);
        let min_dt = self.config.min_dt;
        let motion = match self.motion {
            Some(prev) => TrackMotion {
                last_box: chosen,
                velocity: prev.velocity_to(&chosen.tracking_anchor(), time, min_dt),
                time,
            },
            None => TrackMotion::new(chosen, time),
        };
        self.motion = Some(motion);
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    /// Box whose tracking anchor sits at `(x, y)`.
    fn anchored(x: f64, y: f64) -> OrientedBox {
        OrientedBox::from_pose(Point3::new(x, y + 1.0, -0.5), 4.0, 2.0, 1.5, 0.0)
    }

    fn assert_anchor(bbox: &OrientedBox, x: f64, y: f64) {
        let anchor = bbox.tracking_anchor();
        assert!(
            (anchor.x - x).abs() < 1e-9 && (anchor.y - y).abs() < 1e-9,
            "anchor {anchor:?} != ({x}, {y})"
        );
    }

    #[test]
    fn test_timestamp_from_parts() {
        assert_eq!(timestamp_from_parts(3, 500_000_000), 3.5);
    }

    #[test]
    fn test_unseen_without_candidates_emits_nothing() {
        let mut tracker = VelocityGatedTracker::default();
        assert!(tracker.step(&[], 0.0).is_none());
        assert!(tracker.step(&[], 1.0).is_none());
        assert_eq!(tracker.phase(), TrackPhase::Unseen);
    }

    #[test]
    fn test_first_candidate_seeds() {
        let mut tracker = VelocityGatedTracker::default();
        let seed = anchored(3.0, 4.0);
        let out = tracker.step(&[seed, anchored(50.0, 0.0)], 2.0).unwrap();
        assert_eq!(out, seed);
        assert_eq!(tracker.phase(), TrackPhase::Pending { since: 2.0 });
        assert_eq!(tracker.velocity(), Some(Vector2::zeros()));
    }

    #[test]
    fn test_pending_prediction_scenario() {
        let mut tracker = VelocityGatedTracker::default();
        tracker.step(&[anchored(0.0, 0.0)], 0.0);

        // velocity (4, 0) passes the 4.17 gate
        let out = tracker.step(&[anchored(2.0, 0.0)], 0.5).unwrap();
        assert_anchor(&out, 2.0, 0.0);
        assert!(tracker.phase().is_pending());

        let predicted = tracker.step(&[], 1.2).unwrap();
        assert_anchor(&predicted, 4.8, 0.0);
        assert_eq!(predicted.corner(4).z, out.corner(4).z);
    }

    #[test]
    fn test_pending_gate_failure_closes_timer() {
        let mut tracker = VelocityGatedTracker::default();
        tracker.step(&[anchored(0.0, 0.0)], 0.0);

        // 10 m in 0.5 s is far outside the gate
        let out = tracker.step(&[anchored(10.0, 0.0)], 0.5).unwrap();
        assert_anchor(&out, 0.0, 0.0);
        assert_eq!(tracker.phase(), TrackPhase::Unseen);

        // next frame re-seeds from the new candidate
        let reseeded = tracker.step(&[anchored(10.0, 0.0)], 0.6).unwrap();
        assert_anchor(&reseeded, 10.0, 0.0);
        assert_eq!(tracker.phase(), TrackPhase::Pending { since: 0.6 });
    }

    #[test]
    fn test_promotion_after_init_time() {
        let mut tracker = VelocityGatedTracker::default();
        for i in 0..=4 {
            let t = 0.25 * i as f64;
            tracker.step(&[anchored(0.5 * i as f64, 0.0)], t);
            assert!(tracker.phase().is_pending(), "pending at t={t}");
        }
        tracker.step(&[anchored(2.5, 0.0)], 1.25);
        assert_eq!(tracker.phase(), TrackPhase::Valid { reset_since: None });
        assert_eq!(tracker.velocity(), Some(Vector2::new(2.0, 0.0)));
    }

    #[test]
    fn test_valid_gate_failure_predicts() {
        let mut tracker = VelocityGatedTracker::default();
        for i in 0..=5 {
            tracker.step(&[anchored(0.5 * i as f64, 0.0)], 0.25 * i as f64);
        }
        assert!(tracker.is_valid());

        let out = tracker.step(&[anchored(40.0, 0.0)], 1.5).unwrap();
        assert_anchor(&out, 3.0, 0.0);
        assert_anchor(tracker.last_box().unwrap(), 2.5, 0.0);
        assert_eq!(tracker.phase(), TrackPhase::Valid { reset_since: Some(1.5) });
    }

    #[test]
    fn test_equal_timestamp_keeps_velocity() {
        let mut tracker = VelocityGatedTracker::default();
        tracker.step(&[anchored(0.0, 0.0)], 0.0);
        tracker.step(&[anchored(1.0, 0.0)], 0.5);
        let out = tracker.step(&[anchored(30.0, 0.0)], 0.5).unwrap();
        assert_anchor(&out, 30.0, 0.0);
        assert_eq!(tracker.velocity(), Some(Vector2::new(2.0, 0.0)));
    }

    #[test]
    fn test_out_of_order_frame_keeps_velocity() {
        let mut tracker = VelocityGatedTracker::default();
        tracker.step(&[anchored(0.0, 0.0)], 1.0);
        tracker.step(&[anchored(1.0, 0.0)], 1.5);
        assert_eq!(tracker.velocity(), Some(Vector2::new(2.0, 0.0)));

        // a frame stamped before the last accepted one
        let out = tracker.step(&[anchored(1.5, 0.0)], 1.25).unwrap();
        assert_anchor(&out, 1.5, 0.0);
        assert_eq!(tracker.velocity(), Some(Vector2::new(2.0, 0.0)));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut tracker = VelocityGatedTracker::default();
        tracker.step(&[anchored(0.0, 0.0)], 0.0);
        tracker.reset();
        assert_eq!(tracker.phase(), TrackPhase::Unseen);
        assert!(tracker.last_box().is_none());
        assert!(tracker.step(&[], 1.0).is_none());
    }

    #[test]
    fn test_config_validate() {
        assert!(TrackerConfig::default().validate().is_ok());
        let bad = TrackerConfig {
            init_time: f64::NAN,
            ..TrackerConfig::default()
        };
        assert!(bad.validate().is_err());
        let zero_gate = TrackerConfig {
            max_speed_grad: 0.0,
            ..TrackerConfig::default()
        };
        assert!(zero_gate.validate().is_err());
    }
}
