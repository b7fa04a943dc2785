use derive_more::Display;

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Matrix4 = nalgebra::Matrix4<f64>;

// Scene frame index, starting at 1.
pub type FrameIdx = u32;

#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[display(fmt = "object #{}", _0)]
pub struct ObjectId(pub u32);
