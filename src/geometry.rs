//! Oriented 3D box geometry and the per-cell regression encoding produced by
//! the range-image detection model.

mod containment;
mod encoding;
mod oriented_box;
mod rotation;

pub use containment::point_in_box;
pub use encoding::{
    RegressionTarget, TARGET_CHANNELS, containing_box, decode, decode_with_yaw, encode,
    encode_points,
};
pub use oriented_box::{CORNER_COUNT, OrientedBox};
pub use rotation::{reference_yaw, rotate};
