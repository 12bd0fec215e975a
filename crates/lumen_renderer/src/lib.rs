//! Lumen renderer - CPU light transport.
//!
//! A Monte Carlo renderer built around a BSP-tree accelerator and four
//! integrators: Whitted ray tracing, path tracing with next-event
//! estimation, MIS direct lighting, and bidirectional path tracing.
//! Participating media are handled by the Whitted and path tracers.

mod bsp;
mod bucket;
mod camera;
mod config;
mod error;
mod film;
mod heuristic;
mod hit;
mod intersectable;
mod material;
mod medium;
mod primitive;
mod renderer;
mod scene;
mod spectrum;

pub mod integrator;
pub mod light;
pub mod sampling;

pub use bsp::{BspAccelerator, BspConfig, BspStats};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::PinholeCamera;
pub use config::{IntegratorConfig, RenderConfig};
pub use error::{AcceleratorError, SceneError, SceneResult};
pub use film::{clamp_01, color_to_rgba, linear_to_gamma, Film, ImageBuffer, LightImage};
pub use heuristic::{balance_heuristic, power_heuristic, Heuristic};
pub use hit::{tangent_frame, HitRecord};
pub use integrator::{
    BdptConfig, BidirectionalPathTracer, DirectConfig, DirectLightingIntegrator, Integrator, PathTracer,
    PathTracerConfig, SamplingTechnique, WhittedConfig, WhittedIntegrator,
};
pub use intersectable::{Intersectable, IntersectableList};
pub use light::{Light, LightPrimitive, PointLight, RectangleLight};
pub use material::{
    schlick, AreaLightMaterial, Diffuse, Material, Mirror, PointLightMaterial, Refractive, ShadingSample,
};
pub use medium::{HenyeyGreenstein, Homogeneous, Medium};
pub use primitive::{Instance, Plane, Rectangle, Sphere, Triangle};
pub use renderer::{render, render_scene};
pub use scene::{Scene, SceneBuilder, DEFAULT_EPSILON};
pub use spectrum::{Spectrum, SpectrumExt};

/// Re-export math types from lumen_math
pub use lumen_math::{Aabb, Axis, Interval, Mat4, Ray, Vec3};
