//! Reference geometric primitives.

mod instance;
mod plane;
mod rectangle;
mod sphere;
mod triangle;

pub use instance::Instance;
pub use plane::Plane;
pub use rectangle::Rectangle;
pub use sphere::Sphere;
pub use triangle::Triangle;
