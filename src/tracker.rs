mod selection;
mod track_state;
mod velocity_gated_tracker;

pub use selection::SelectionPolicy;
pub use track_state::{TrackMotion, TrackPhase};
pub use velocity_gated_tracker::{
    INIT_TIME, MAX_SPEED_GRAD, RESET_TIME, TrackerConfig, VelocityGatedTracker,
    timestamp_from_parts,
};
