//! Parallel render loop.
//!
//! Buckets are rendered on the rayon pool. Each fold keeps its own
//! [`LightImage`] for splats; the partial light images are merged at the
//! end and added to the averaged pixels with weight `1 / samples_per_pixel`.

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::integrator::Integrator;
use crate::{ImageBuffer, LightImage, RenderConfig, Scene};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Render `scene` with `integrator`. The image size is the camera's.
pub fn render(scene: &Scene, integrator: &dyn Integrator, config: &RenderConfig) -> ImageBuffer {
    let camera = scene.camera();
    let (width, height) = (camera.image_width, camera.image_height);
    if (width, height) != (config.width, config.height) {
        log::warn!(
            "camera resolution {}x{} overrides configured {}x{}",
            width,
            height,
            config.width,
            config.height
        );
    }

    let buckets = generate_buckets(width, height, config.bucket_size);
    let total = buckets.len();
    let completed = AtomicUsize::new(0);
    let start = Instant::now();

    log::info!(
        "Rendering {}x{} at {} spp in {} buckets",
        width,
        height,
        config.samples_per_pixel,
        total
    );

    let (results, light_image) = buckets
        .par_iter()
        .fold(
            || (Vec::new(), LightImage::new(width, height)),
            |(mut results, mut light_image), bucket| {
                results.push(render_bucket(bucket, scene, integrator, config, &mut light_image));

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 16 == 0 || done == total {
                    log::debug!("{}/{} buckets", done, total);
                }
                (results, light_image)
            },
        )
        .reduce(
            || (Vec::new(), LightImage::new(width, height)),
            |(mut a, light_a), (b, light_b)| {
                a.extend(b);
                (a, light_a.merge(light_b))
            },
        );

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        write_bucket(&mut image, result);
    }
    image.add_light_image(&light_image, 1.0 / config.samples_per_pixel.max(1) as f32);

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

/// Build the integrator named in `config` and render with it.
pub fn render_scene(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let integrator = config.integrator.build(scene);
    log::info!("Integrator: {}", config.integrator.name());
    render(scene, integrator.as_ref(), config)
}

fn write_bucket(image: &mut ImageBuffer, result: &BucketResult) {
    let bucket = &result.bucket;
    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = result.pixels[(local_y * bucket.width + local_x) as usize];
            image.set(bucket.x + local_x, bucket.y + local_y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::{BdptConfig, PathTracerConfig};
    use crate::{Diffuse, IntegratorConfig, PinholeCamera, Plane, RectangleLight, SceneBuilder, Spectrum, SpectrumExt};
    use lumen_math::Vec3;
    use std::sync::Arc;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn room(width: u32, height: u32) -> Scene {
        let camera = PinholeCamera::new(
            Vec3::new(0.0, 1.2, 3.0),
            Vec3::new(0.0, 0.3, 0.0),
            Vec3::Y,
            40.0,
            width,
            height,
        );
        let wall = Arc::new(Diffuse::new(Spectrum::splat(0.6)));
        let mut b = SceneBuilder::new(camera);
        b.add(Arc::new(Plane::new(Vec3::Y, 0.0, wall.clone())))
            .add(Arc::new(Plane::new(Vec3::Z, 2.0, wall)))
            .add_light(Arc::new(RectangleLight::new(
                Vec3::new(-0.5, 2.0, -0.5),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Spectrum::splat(15.0),
            )));
        b.build().expect("scene")
    }

    fn config(width: u32, height: u32, spp: u32, integrator: IntegratorConfig) -> RenderConfig {
        RenderConfig {
            width,
            height,
            samples_per_pixel: spp,
            seed: 7,
            bucket_size: 8,
            integrator,
            ..RenderConfig::default()
        }
    }

    fn total(image: &ImageBuffer) -> f32 {
        image.pixels.iter().map(|p| p.x).sum()
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        init_logging();
        let scene = room(12, 8);
        let config = config(12, 8, 4, IntegratorConfig::Path(PathTracerConfig::default()));
        let a = render_scene(&scene, &config);
        let b = render_scene(&scene, &config);
        assert_eq!(a.pixels, b.pixels);
        assert!(total(&a) > 0.0);
    }

    #[test]
    fn test_every_integrator_renders_finite_image() {
        let scene = room(8, 6);
        for name in ["whitted", "path", "direct", "bdpt"] {
            let integrator = IntegratorConfig::from_name(name).expect("integrator");
            let image = render_scene(&scene, &config(8, 6, 2, integrator));
            assert_eq!(image.pixels.len(), 48);
            assert!(image.pixels.iter().all(|p| p.is_finite() && p.min_element() >= 0.0), "{name}");
            assert!(image.pixels.iter().any(|p| !p.is_black()), "{name}");
        }
    }

    fn compare_bdpt_with_path_tracer(eye: usize, light: usize, depth: usize) {
        init_logging();
        let (width, height, spp) = (16, 12, 128);
        let scene = room(width, height);

        let path = render_scene(
            &scene,
            &config(
                width,
                height,
                spp,
                IntegratorConfig::Path(PathTracerConfig {
                    min_depth: depth,
                    max_depth: depth,
                    termination_probability: 0.5,
                }),
            ),
        );
        let bdpt = render_scene(
            &scene,
            &config(
                width,
                height,
                spp,
                IntegratorConfig::Bdpt(BdptConfig {
                    min_eye_vertices: eye,
                    max_eye_vertices: eye,
                    min_light_vertices: light,
                    max_light_vertices: light,
                    ..BdptConfig::default()
                }),
            ),
        );

        let (p, b) = (total(&path), total(&bdpt));
        assert!(p > 0.0);
        assert!((b - p).abs() < 0.05 * p, "bdpt {b} vs path {p}");
    }

    #[test]
    fn test_bdpt_matches_path_tracer_two_bounces() {
        compare_bdpt_with_path_tracer(3, 1, 2);
    }

    #[test]
    fn test_bdpt_matches_path_tracer_three_bounces() {
        compare_bdpt_with_path_tracer(3, 2, 3);
    }
}
