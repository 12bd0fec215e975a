//! Render settings.
//!
//! Everything here deserializes from JSON with every field optional, so a
//! settings file only names what it changes.

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::integrator::{
    BdptConfig, BidirectionalPathTracer, DirectConfig, DirectLightingIntegrator, Integrator, PathTracer,
    PathTracerConfig, WhittedConfig, WhittedIntegrator,
};
use crate::scene::DEFAULT_EPSILON;
use crate::{BspConfig, Scene};
use serde::{Deserialize, Serialize};

/// Which integrator renders the image, with its settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IntegratorConfig {
    Whitted(WhittedConfig),
    Path(PathTracerConfig),
    Direct(DirectConfig),
    Bdpt(BdptConfig),
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::Path(PathTracerConfig::default())
    }
}

impl IntegratorConfig {
    /// Default settings for the integrator called `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "whitted" => Some(Self::Whitted(WhittedConfig::default())),
            "path" => Some(Self::Path(PathTracerConfig::default())),
            "direct" => Some(Self::Direct(DirectConfig::default())),
            "bdpt" => Some(Self::Bdpt(BdptConfig::default())),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Whitted(_) => "whitted",
            Self::Path(_) => "path",
            Self::Direct(_) => "direct",
            Self::Bdpt(_) => "bdpt",
        }
    }

    /// Instantiate the integrator over `scene`.
    pub fn build<'s>(&self, scene: &'s Scene) -> Box<dyn Integrator + 's> {
        match *self {
            Self::Whitted(config) => Box::new(WhittedIntegrator::new(scene, config)),
            Self::Path(config) => Box::new(PathTracer::new(scene, config)),
            Self::Direct(config) => Box::new(DirectLightingIntegrator::new(scene, config)),
            Self::Bdpt(config) => Box::new(BidirectionalPathTracer::new(scene, config)),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
    /// Bucket edge in pixels
    pub bucket_size: u32,
    pub integrator: IntegratorConfig,
    pub bsp: BspConfig,
    /// Ray offset used to escape the surface a ray starts on
    pub epsilon: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            samples_per_pixel: 16,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            integrator: IntegratorConfig::default(),
            bsp: BspConfig::default(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}
