//! Demo scenes.

use crate::cli::SceneKind;
use anyhow::{Context, Result};
use lumen_math::{Mat4, Quat, Vec3};
use lumen_renderer::{
    Diffuse, HenyeyGreenstein, Homogeneous, Instance, Material, Mirror, PinholeCamera, Plane, PointLight,
    Rectangle, RectangleLight, Refractive, RenderConfig, Scene, SceneBuilder, Spectrum, Sphere, Triangle,
};
use std::sync::Arc;

pub fn build(kind: SceneKind, config: &RenderConfig) -> Result<Scene> {
    let builder = match kind {
        SceneKind::Cornell => cornell(config),
        SceneKind::Spheres => spheres(config),
        SceneKind::Terrain => terrain(config),
        SceneKind::Media => media(config),
    };
    builder
        .with_epsilon(config.epsilon)
        .with_bsp_config(config.bsp)
        .build()
        .with_context(|| format!("failed to build the {kind:?} scene"))
}

fn camera(config: &RenderConfig, look_from: Vec3, look_at: Vec3, vfov: f32) -> PinholeCamera {
    PinholeCamera::new(look_from, look_at, Vec3::Y, vfov, config.width, config.height)
}

fn diffuse(r: f32, g: f32, b: f32) -> Arc<dyn Material> {
    Arc::new(Diffuse::new(Spectrum::new(r, g, b)))
}

/// Axis-aligned wall as a quad spanned by two edges from `anchor`.
fn quad(anchor: Vec3, edge1: Vec3, edge2: Vec3, material: &Arc<dyn Material>) -> Arc<Rectangle> {
    Arc::new(Rectangle::new(anchor, edge1, edge2, material.clone()))
}

fn cornell(config: &RenderConfig) -> SceneBuilder {
    let mut b = SceneBuilder::new(camera(config, Vec3::new(0.0, 1.0, 3.6), Vec3::new(0.0, 1.0, 0.0), 40.0));

    let white = diffuse(0.73, 0.73, 0.73);
    let red = diffuse(0.65, 0.05, 0.05);
    let green = diffuse(0.12, 0.45, 0.15);

    b.add(quad(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0), &white))
        .add(quad(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0), &white))
        .add(quad(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), &white))
        .add(quad(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 2.0, 0.0), &red))
        .add(quad(Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 2.0, 0.0), &green))
        .add(Arc::new(Sphere::new(
            Vec3::new(-0.45, 0.4, -0.35),
            0.4,
            Arc::new(Mirror::new(Spectrum::splat(0.9))),
        )))
        .add(Arc::new(Sphere::new(Vec3::new(0.45, 0.4, 0.3), 0.4, Arc::new(Refractive::new(1.5)))))
        .add_light(Arc::new(RectangleLight::new(
            Vec3::new(-0.3, 1.99, -0.3),
            Vec3::new(0.6, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.6),
            Spectrum::new(18.0, 16.0, 13.0),
        )));
    b
}

fn spheres(config: &RenderConfig) -> SceneBuilder {
    let mut b = SceneBuilder::new(camera(config, Vec3::new(5.0, 2.5, 6.0), Vec3::new(0.0, 0.6, 0.0), 35.0));

    b.add(Arc::new(Plane::new(Vec3::Y, 0.0, diffuse(0.5, 0.5, 0.5))));

    let palette = [
        diffuse(0.8, 0.3, 0.2),
        diffuse(0.2, 0.5, 0.8),
        diffuse(0.9, 0.8, 0.3),
        Arc::new(Mirror::new(Spectrum::new(0.9, 0.85, 0.8))) as Arc<dyn Material>,
        Arc::new(Refractive::new(1.5)) as Arc<dyn Material>,
    ];
    for i in -3..=3 {
        for j in -2..=2 {
            let material = &palette[(i + 3 + j + 2) as usize % palette.len()];
            let center = Vec3::new(i as f32 * 0.9, 0.25, j as f32 * 0.9);
            b.add(Arc::new(Sphere::new(center, 0.25, material.clone())));
        }
    }

    // Squashed sphere and a tilted panel, placed through instances.
    let unit = Arc::new(Sphere::new(Vec3::ZERO, 1.0, diffuse(0.3, 0.7, 0.4)));
    b.add(Arc::new(Instance::new(
        unit,
        Mat4::from_scale_rotation_translation(
            Vec3::new(0.6, 0.35, 0.6),
            Quat::IDENTITY,
            Vec3::new(0.0, 0.85, 0.0),
        ),
    )));
    let panel = Arc::new(Rectangle::new(
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Arc::new(Mirror::new(Spectrum::splat(0.8))),
    ));
    b.add(Arc::new(Instance::new(
        panel,
        Mat4::from_rotation_translation(Quat::from_rotation_x(1.2), Vec3::new(0.0, 1.0, -2.5)),
    )));

    b.add_light(Arc::new(PointLight::new(Vec3::new(-3.0, 4.0, 2.0), Spectrum::splat(120.0))))
        .add_light(Arc::new(RectangleLight::new(
            Vec3::new(-1.0, 3.5, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Spectrum::splat(60.0),
        )));
    b
}

/// Height of the terrain at `(x, z)`.
fn height(x: f32, z: f32) -> f32 {
    0.35 * (1.7 * x).sin() * (1.3 * z).cos() + 0.12 * (3.1 * x + 2.3 * z).sin()
}

fn terrain(config: &RenderConfig) -> SceneBuilder {
    const CELLS: usize = 64;
    const EXTENT: f32 = 4.0;

    let mut b = SceneBuilder::new(camera(config, Vec3::new(0.0, 2.8, 5.5), Vec3::new(0.0, 0.0, 0.0), 45.0));

    let ground = diffuse(0.45, 0.55, 0.35);
    let step = 2.0 * EXTENT / CELLS as f32;
    let point = |i: usize, j: usize| {
        let x = -EXTENT + i as f32 * step;
        let z = -EXTENT + j as f32 * step;
        Vec3::new(x, height(x, z), z)
    };

    for i in 0..CELLS {
        for j in 0..CELLS {
            let (p00, p10, p01, p11) = (point(i, j), point(i + 1, j), point(i, j + 1), point(i + 1, j + 1));
            b.add(Arc::new(Triangle::new(p00, p01, p10, ground.clone())))
                .add(Arc::new(Triangle::new(p10, p01, p11, ground.clone())));
        }
    }

    b.add(Arc::new(Sphere::new(
        Vec3::new(0.8, height(0.8, 0.5) + 0.4, 0.5),
        0.4,
        Arc::new(Refractive::new(1.5)),
    )))
    .add_light(Arc::new(RectangleLight::new(
        Vec3::new(-2.0, 4.0, -2.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        Spectrum::new(200.0, 190.0, 170.0),
    )))
    .add_light(Arc::new(PointLight::new(Vec3::new(-3.0, 1.5, 3.0), Spectrum::new(20.0, 30.0, 60.0))));
    b
}

fn media(config: &RenderConfig) -> SceneBuilder {
    let mut b = SceneBuilder::new(camera(config, Vec3::new(0.0, 1.2, 5.0), Vec3::new(0.0, 0.8, 0.0), 40.0));

    let fog = Arc::new(Homogeneous::new(
        Spectrum::splat(0.05),
        Spectrum::splat(0.6),
        HenyeyGreenstein::isotropic(),
    ));
    let smoke = Arc::new(
        Homogeneous::new(
            Spectrum::new(0.3, 0.35, 0.4),
            Spectrum::splat(1.2),
            HenyeyGreenstein::new(Spectrum::splat(0.6)),
        )
        .with_steps(16),
    );

    b.add(Arc::new(Plane::new(Vec3::Y, 0.0, diffuse(0.6, 0.6, 0.6))))
        .add(Arc::new(Plane::new(Vec3::Z, 2.0, diffuse(0.5, 0.5, 0.6))))
        .add(Arc::new(Sphere::new(Vec3::new(-1.1, 0.7, 0.0), 0.7, fog)))
        .add(Arc::new(Sphere::new(Vec3::new(1.1, 0.7, -0.3), 0.7, smoke)))
        .add(Arc::new(Sphere::new(Vec3::new(0.0, 0.45, 1.0), 0.45, Arc::new(Refractive::new(1.5)))))
        .add_light(Arc::new(RectangleLight::new(
            Vec3::new(-0.75, 2.8, -0.75),
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.5),
            Spectrum::splat(70.0),
        )));
    b
}
