// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod axis;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use axis::Axis;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
