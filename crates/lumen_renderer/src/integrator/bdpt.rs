//! Bidirectional path tracer.
//!
//! Each sample builds an eye subpath from the camera and a light subpath
//! from a sampled light point, connects every pair of vertices, and weights
//! each connection with the balance heuristic over all strategies that
//! could have produced a path of the same length.
//!
//! Vertex counts include the subpath roots. A strategy `(s, t)` uses the
//! first `s` light vertices and the first `t` eye vertices; `t = 1`
//! contributions are splatted onto the light image.

use super::vertex::{Path, PathVertex, VertexKind};
use super::{spawn_ray, termination_probability, Integrator};
use crate::sampling::uniform;
use crate::{Film, HitRecord, LightImage, Scene, Spectrum, SpectrumExt};
use lumen_math::Ray;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Subpath lengths and termination for [`BidirectionalPathTracer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BdptConfig {
    pub min_eye_vertices: usize,
    pub max_eye_vertices: usize,
    pub min_light_vertices: usize,
    pub max_light_vertices: usize,
    pub eye_termination_probability: f32,
    pub light_termination_probability: f32,
}

impl Default for BdptConfig {
    fn default() -> Self {
        Self {
            min_eye_vertices: 3,
            max_eye_vertices: 8,
            min_light_vertices: 2,
            max_light_vertices: 6,
            eye_termination_probability: 0.5,
            light_termination_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Eye,
    Light,
}

/// Densities of one vertex as seen by a particular strategy.
#[derive(Debug, Clone, Copy)]
struct Densities {
    pdf_fwd: f32,
    pdf_rev: f32,
    delta: bool,
}

impl From<&PathVertex<'_>> for Densities {
    fn from(v: &PathVertex<'_>) -> Self {
        Self {
            pdf_fwd: v.pdf_fwd,
            pdf_rev: v.pdf_rev,
            delta: v.delta,
        }
    }
}

/// Zero densities mark deterministic (specular) steps; they cancel in the
/// ratios and are treated as 1.
#[inline]
fn remap0(pdf: f32) -> f32 {
    if pdf != 0.0 {
        pdf
    } else {
        1.0
    }
}

pub struct BidirectionalPathTracer<'s> {
    scene: &'s Scene,
    config: BdptConfig,
}

impl<'s> BidirectionalPathTracer<'s> {
    pub fn new(scene: &'s Scene, config: BdptConfig) -> Self {
        if config.max_eye_vertices < 2 {
            log::warn!(
                "max_eye_vertices = {} leaves no room for a surface vertex",
                config.max_eye_vertices
            );
        }
        Self { scene, config }
    }

    fn eye_path(&self, ray: &Ray, rng: &mut dyn RngCore) -> Path<'s> {
        let camera = self.scene.camera();
        let mut path = Path::with_capacity(self.config.max_eye_vertices.max(1));
        path.push(PathVertex::camera(HitRecord::root(camera.position())));

        let direction = ray.direction.normalize_or_zero();
        let pdf_dir = camera.pdf_direction(direction);
        if pdf_dir > 0.0 {
            let ray = Ray::new(ray.origin, direction);
            self.walk(&mut path, ray, Spectrum::ONE, pdf_dir, Side::Eye, rng);
        }
        path
    }

    fn light_path(&self, rng: &mut dyn RngCore) -> Path<'s> {
        let mut path = Path::with_capacity(self.config.max_light_vertices.max(1));
        if self.config.max_light_vertices == 0 {
            return path;
        }
        let Some((light, selection)) = self.scene.random_light(rng) else {
            return path;
        };

        let origin = light.sample(rng);
        let pdf_pos = origin.pdf.unwrap_or(1.0) * selection;
        if pdf_pos <= 0.0 {
            return path;
        }
        let root = PathVertex::light(origin, pdf_pos, light.is_delta());
        let alpha = root.alpha;
        let origin = root.hit.clone();
        path.push(root);

        if self.config.max_light_vertices < 2 {
            return path;
        }
        let Some(emitted) = origin.material.emission_sample(&origin, rng) else {
            return path;
        };
        if emitted.pdf <= 0.0 {
            return path;
        }

        let beta = alpha * emitted.emission * (origin.abs_cos(emitted.direction) / emitted.pdf);
        if beta.is_black() {
            return path;
        }
        let ray = spawn_ray(self.scene, &origin, emitted.direction);
        self.walk(&mut path, ray, beta, emitted.pdf, Side::Light, rng);
        path
    }

    /// Extend `path` by random walk, recording forward densities on each new
    /// vertex and reverse densities on its predecessor.
    fn walk(
        &self,
        path: &mut Path<'s>,
        mut ray: Ray,
        mut beta: Spectrum,
        mut pdf_dir: f32,
        side: Side,
        rng: &mut dyn RngCore,
    ) {
        let (min, max, q) = match side {
            Side::Eye => (
                self.config.min_eye_vertices,
                self.config.max_eye_vertices,
                self.config.eye_termination_probability,
            ),
            Side::Light => (
                self.config.min_light_vertices,
                self.config.max_light_vertices,
                self.config.light_termination_probability,
            ),
        };

        while path.len() < max {
            let Some(hit) = self.scene.intersect(&ray) else {
                break;
            };

            // Media boundaries are transparent to bidirectional transport.
            if hit.material.medium().is_some() {
                ray = spawn_ray(self.scene, &hit, ray.direction);
                continue;
            }
            let on_light = hit.is_light();
            if side == Side::Light && on_light {
                break;
            }

            let mut vertex = PathVertex::surface(hit, path.len(), beta);
            if let Some(prev) = path.last() {
                vertex.pdf_fwd = prev.convert_density(pdf_dir, &vertex);
            }
            let hit = vertex.hit.clone();
            path.push(vertex);

            if on_light || path.len() >= max {
                break;
            }

            let q = termination_probability(path.len(), min, max, q);
            if q >= 1.0 || (q > 0.0 && uniform(rng) < q) {
                break;
            }

            let Some(sample) = hit.material.shading_sample(&hit, rng) else {
                break;
            };
            let weight = sample.weight(hit.abs_cos(sample.direction));
            if weight.is_black() {
                break;
            }

            let (pdf_fwd_dir, pdf_rev_dir) = if sample.is_specular {
                (0.0, 0.0)
            } else {
                let reverse = hit.material.probability(&hit.looking(sample.direction), hit.w);
                (sample.pdf, reverse)
            };

            let n = path.len();
            let (head, tail) = path.vertices_mut().split_at_mut(n - 1);
            let current = &mut tail[0];
            current.sample = Some(sample);
            current.delta = sample.is_specular;
            if let Some(prev) = head.last_mut() {
                prev.pdf_rev = current.convert_density(pdf_rev_dir, prev);
            }

            beta *= weight / (1.0 - q);
            pdf_dir = pdf_fwd_dir;
            ray = spawn_ray(self.scene, &hit, sample.direction);
        }
    }

    /// Area density at `next` of continuing from `cur` toward `next`, given
    /// the path reached `cur` from `prev`.
    fn pdf(&self, cur: &PathVertex, prev: Option<&PathVertex>, next: &PathVertex) -> f32 {
        let to_next = next.position() - cur.position();
        let d2 = to_next.length_squared();
        if d2 <= 0.0 {
            return 0.0;
        }
        let wn = to_next / d2.sqrt();

        let pdf_dir = match (cur.kind, prev) {
            (VertexKind::Camera, _) => self.scene.camera().pdf_direction(wn),
            (VertexKind::Light { .. }, _) | (_, None) => {
                cur.hit.material.emission_probability(&cur.hit, wn)
            }
            (VertexKind::Surface, Some(prev)) => {
                let wp = (prev.position() - cur.position()).normalize_or_zero();
                cur.hit.material.probability(&cur.hit.looking(wp), wn)
            }
        };
        cur.convert_density(pdf_dir, next)
    }

    /// Area density of choosing the point under `vertex` as a light origin.
    fn pdf_light_origin(&self, vertex: &PathVertex) -> f32 {
        let Some(light) = vertex.hit.object.and_then(|o| o.as_light()) else {
            return 0.0;
        };
        let area = light.area();
        if area <= 0.0 {
            return 0.0;
        }
        let selection = 1.0 / self.scene.lights().len().max(1) as f32;
        selection / area
    }

    /// Area density at `next` of the light under `light_vertex` emitting
    /// toward it.
    fn pdf_light(&self, light_vertex: &PathVertex, next: &PathVertex) -> f32 {
        let to_next = next.position() - light_vertex.position();
        let d2 = to_next.length_squared();
        if d2 <= 0.0 {
            return 0.0;
        }
        let wn = to_next / d2.sqrt();
        let pdf_dir = light_vertex.hit.material.emission_probability(&light_vertex.hit, wn);
        light_vertex.convert_density(pdf_dir, next)
    }

    /// Balance-heuristic weight of strategy `(s, t)`.
    ///
    /// The densities of the two vertices on either side of the connection
    /// are recomputed for this strategy, then the ratios of every other
    /// strategy's density to this one are accumulated walking outward along
    /// both subpaths.
    fn mis_weight(&self, eye: &Path, light: &Path, s: usize, t: usize) -> f32 {
        if s + t == 2 {
            return 1.0;
        }

        let mut e: Vec<Densities> = eye.vertices()[..t].iter().map(Densities::from).collect();
        let mut l: Vec<Densities> = light.vertices()[..s].iter().map(Densities::from).collect();

        let pt = &eye[t - 1];
        let pt_minus = (t > 1).then(|| &eye[t - 2]);
        let qs = (s > 0).then(|| &light[s - 1]);
        let qs_minus = (s > 1).then(|| &light[s - 2]);

        // The connection vertices are never delta in this strategy.
        e[t - 1].delta = false;
        if s > 0 {
            l[s - 1].delta = false;
        }

        e[t - 1].pdf_rev = match qs {
            Some(qs) => self.pdf(qs, qs_minus, pt),
            None => self.pdf_light_origin(pt),
        };
        if let Some(pt_minus) = pt_minus {
            e[t - 2].pdf_rev = match qs {
                Some(qs) => self.pdf(pt, Some(qs), pt_minus),
                None => self.pdf_light(pt, pt_minus),
            };
        }
        if let Some(qs) = qs {
            l[s - 1].pdf_rev = self.pdf(pt, pt_minus, qs);
        }
        if let (Some(qs), Some(qs_minus)) = (qs, qs_minus) {
            l[s - 2].pdf_rev = self.pdf(qs, Some(pt), qs_minus);
        }

        let total = s + t;
        let allowed = |s_alt: usize, t_alt: usize| {
            s_alt <= self.config.max_light_vertices
                && t_alt <= self.config.max_eye_vertices
                && !(t_alt == 1 && s_alt <= 1)
        };

        let mut sum = 0.0;

        // Shift the connection toward the camera.
        let mut ri = 1.0;
        for i in (1..t).rev() {
            ri *= remap0(e[i].pdf_rev) / remap0(e[i].pdf_fwd);
            if !e[i].delta && !e[i - 1].delta && allowed(total - i, i) {
                sum += ri;
            }
        }

        // Shift the connection toward the light.
        let delta_light = light.vertices().first().is_some_and(|v| v.is_delta_light());
        let mut ri = 1.0;
        for i in (0..s).rev() {
            ri *= remap0(l[i].pdf_rev) / remap0(l[i].pdf_fwd);
            let delta_before = if i > 0 { l[i - 1].delta } else { delta_light };
            if !l[i].delta && !delta_before && allowed(i, total - i) {
                sum += ri;
            }
        }

        let weight = 1.0 / (1.0 + sum);
        if weight.is_finite() {
            weight
        } else {
            0.0
        }
    }

    /// Eye subpath ending on a light (`s = 0`).
    fn emitted(&self, eye: &Path, t: usize) -> Spectrum {
        let pt = &eye[t - 1];
        if !pt.hit.is_light() {
            return Spectrum::ZERO;
        }
        pt.alpha * pt.hit.material.evaluate_emission(&pt.hit, pt.hit.w)
    }

    /// Light subpath vertex `s - 1` seen directly by the camera (`t = 1`).
    /// Returns the raster position and the unweighted contribution.
    fn splat(&self, eye: &Path, light: &Path, s: usize) -> Option<((u32, u32), Spectrum)> {
        let qs = &light[s - 1];
        if qs.delta {
            return None;
        }

        let camera = self.scene.camera();
        let (px, py) = camera.project(qs.position())?;

        let to_camera = camera.position() - qs.position();
        let d2 = to_camera.length_squared();
        if d2 <= 0.0 {
            return None;
        }
        let dir = to_camera / d2.sqrt();

        let f = qs.hit.material.evaluate_brdf(&qs.hit, qs.hit.w, dir);
        let importance = camera.importance(-dir);
        let value = qs.alpha * f * (qs.hit.abs_cos(dir) * importance / d2);
        if value.is_black() || !self.scene.visible(&qs.hit, &eye[0].hit) {
            return None;
        }

        Some(((px as u32, py as u32), value))
    }

    /// Connection of eye vertex `t - 1` with light vertex `s - 1`, both
    /// past their roots on the eye side (`s ≥ 1`, `t ≥ 2`).
    fn connect(&self, eye: &Path, light: &Path, s: usize, t: usize) -> Spectrum {
        let pt = &eye[t - 1];
        let qs = &light[s - 1];
        if pt.delta || qs.delta || pt.hit.is_light() {
            return Spectrum::ZERO;
        }

        let d = qs.position() - pt.position();
        let d2 = d.length_squared();
        if d2 <= 0.0 {
            return Spectrum::ZERO;
        }
        let dir = d / d2.sqrt();

        let f_eye = pt.hit.material.evaluate_brdf(&pt.hit, pt.hit.w, dir);
        let f_light = if s == 1 {
            qs.hit.material.evaluate_emission(&qs.hit, -dir)
        } else {
            qs.hit.material.evaluate_brdf(&qs.hit, qs.hit.w, -dir)
        };
        let g = pt.hit.abs_cos(dir) * qs.hit.abs_cos(-dir) / d2;

        let value = pt.alpha * f_eye * f_light * qs.alpha * g;
        if value.is_black() || !self.scene.visible(&pt.hit, &qs.hit) {
            return Spectrum::ZERO;
        }
        value
    }
}

impl Integrator for BidirectionalPathTracer<'_> {
    fn integrate(&self, ray: &Ray, rng: &mut dyn RngCore, light_image: &mut LightImage) -> Spectrum {
        let eye = self.eye_path(ray, rng);
        let light = self.light_path(rng);

        let mut radiance = Spectrum::ZERO;

        for t in 1..=eye.len() {
            for s in 0..=light.len() {
                if t == 1 && s <= 1 {
                    continue;
                }
                if s + t < 2 {
                    continue;
                }

                if s == 0 {
                    let value = self.emitted(&eye, t);
                    if !value.is_black() {
                        radiance += value * self.mis_weight(&eye, &light, 0, t);
                    }
                } else if t == 1 {
                    if let Some(((x, y), value)) = self.splat(&eye, &light, s) {
                        let splat = (value * self.mis_weight(&eye, &light, s, 1)).sanitized();
                        light_image.add_sample(x, y, splat);
                    }
                } else {
                    let value = self.connect(&eye, &light, s, t);
                    if !value.is_black() {
                        radiance += value * self.mis_weight(&eye, &light, s, t);
                    }
                }
            }
        }

        radiance.sanitized()
    }
}
