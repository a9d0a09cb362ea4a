//! Software rendition of what the GPU draws for a [`Scene`].
//!
//! Follows the same fixed state as the GPU path: clear, `LEQUAL` depth test,
//! counter-clockwise front faces and an opaque fragment stage that outputs
//! the interpolated vertex color. Blending is ignored because every fragment
//! has alpha 1.

use cgmath::{Vector2, Vector3};

pub use gl_wrapper::backend::{DepthFunc, Face};
use gl_wrapper::renderer::FixedState;

use crate::framebuffer::{FrameBuffer, Pixel};
use crate::scene::Scene;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rasterizer {
    pub clear_color: [f32; 4],
    pub depth_test: Option<DepthFunc>,
    pub cull: Option<Face>,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles_drawn: usize,
    pub triangles_culled: usize,
    pub fragments: usize,
}

struct Vertex {
    ndc: Vector3<f32>,
    color: Vector3<f32>,
}

impl From<&FixedState> for Rasterizer {
    fn from(state: &FixedState) -> Self {
        Self {
            clear_color: state.clear_color,
            depth_test: state.depth_test,
            cull: state.cull_enabled.then_some(state.cull_face),
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::from(&FixedState::default())
    }
}

fn edge(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl Rasterizer {
    /// Clears `fb` and draws every triangle of `scene` into it.
    pub fn render(&self, scene: &Scene, fb: &mut FrameBuffer) -> RasterStats {
        fb.clear(Pixel::from_rgba(self.clear_color), 1.0);

        let mut stats = RasterStats::default();

        for [i0, i1, i2] in scene.triangles() {
            let vertex = |i| {
                Some(Vertex {
                    ndc: scene.position(i)?,
                    color: scene.color(i)?,
                })
            };

            let (Some(v0), Some(v1), Some(v2)) = (vertex(i0), vertex(i1), vertex(i2)) else {
                continue;
            };

            match self.draw_triangle([v0, v1, v2], fb) {
                Some(fragments) => {
                    stats.triangles_drawn += 1;
                    stats.fragments += fragments;
                }
                None => stats.triangles_culled += 1,
            }
        }

        stats
    }

    /// Returns `None` when the triangle is culled or degenerate.
    fn draw_triangle(&self, v: [Vertex; 3], fb: &mut FrameBuffer) -> Option<usize> {
        let p = [v[0].ndc.truncate(), v[1].ndc.truncate(), v[2].ndc.truncate()];

        let area = edge(p[0], p[1], p[2]);
        if area == 0.0 {
            return None;
        }

        let front = area > 0.0;
        match self.cull {
            Some(Face::Back) if !front => return None,
            Some(Face::Front) if front => return None,
            _ => {}
        }

        let (w, h) = (fb.width() as f32, fb.height() as f32);

        let min_x = p.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        let max_x = p.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = p.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
        let max_y = p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

        // rows run top to bottom, ndc y runs bottom to top
        let x0 = (((min_x + 1.0) * 0.5 * w).floor().max(0.0)) as usize;
        let x1 = (((max_x + 1.0) * 0.5 * w).ceil().min(w)) as usize;
        let y0 = (((1.0 - max_y) * 0.5 * h).floor().max(0.0)) as usize;
        let y1 = (((1.0 - min_y) * 0.5 * h).ceil().min(h)) as usize;

        let mut fragments = 0;

        for y in y0..y1 {
            for x in x0..x1 {
                let sample = Vector2::new(
                    (x as f32 + 0.5) / w * 2.0 - 1.0,
                    1.0 - (y as f32 + 0.5) / h * 2.0,
                );

                let b0 = edge(p[1], p[2], sample) / area;
                let b1 = edge(p[2], p[0], sample) / area;
                let b2 = edge(p[0], p[1], sample) / area;

                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }

                let z = b0 * v[0].ndc.z + b1 * v[1].ndc.z + b2 * v[2].ndc.z;
                let depth = (z + 1.0) * 0.5;

                if let Some(func) = self.depth_test {
                    let stored = fb.depth(x, y).unwrap_or(1.0);
                    let pass = match func {
                        DepthFunc::Less => depth < stored,
                        DepthFunc::LessOrEqual => depth <= stored,
                    };
                    if !pass {
                        continue;
                    }
                    if let Some(d) = fb.depth_mut(x, y) {
                        *d = depth;
                    }
                }

                let color = v[0].color * b0 + v[1].color * b1 + v[2].color * b2;
                if let Some(px) = fb.pixel_mut(x, y) {
                    *px = Pixel::from(color);
                    fragments += 1;
                }
            }
        }

        Some(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rasterizer: Rasterizer) -> (FrameBuffer, RasterStats) {
        let mut fb = FrameBuffer::new(640, 640);
        let stats = rasterizer.render(&Scene::triangle(), &mut fb);
        (fb, stats)
    }

    fn assert_dominant(px: Pixel, channel: usize) {
        let c = [px.r, px.g, px.b];
        for (i, v) in c.iter().enumerate() {
            if i == channel {
                assert!(*v > 0.9, "{px:?}");
            } else {
                assert!(*v < 0.1, "{px:?}");
            }
        }
        assert_eq!(px.a, 1.0);
    }

    #[test]
    fn corners_carry_vertex_colors() {
        let (fb, stats) = render(Rasterizer::default());

        assert_eq!(stats.triangles_drawn, 1);
        assert_eq!(stats.triangles_culled, 0);

        assert_dominant(fb.pixel(630, 635).unwrap(), 0);
        assert_dominant(fb.pixel(10, 635).unwrap(), 1);
        assert_dominant(fb.pixel(320, 5).unwrap(), 2);
    }

    #[test]
    fn interior_is_interpolated() {
        let (fb, _) = render(Rasterizer::default());

        let px = fb.pixel(320, 427).unwrap();
        for c in [px.r, px.g, px.b] {
            assert!((c - 1.0 / 3.0).abs() < 0.05, "{px:?}");
        }
    }

    #[test]
    fn outside_is_transparent_black() {
        let (fb, _) = render(Rasterizer::default());

        assert_eq!(fb.pixel(0, 0), Some(Pixel::transparent()));
        assert_eq!(fb.pixel(639, 0), Some(Pixel::transparent()));
        assert_eq!(fb.depth(0, 0), Some(1.0));
        assert_eq!(fb.depth(320, 427), Some(0.5));
    }

    #[test]
    fn triangle_winds_clockwise() {
        let rasterizer = Rasterizer {
            cull: Some(Face::Back),
            ..Default::default()
        };
        let (fb, stats) = render(rasterizer);

        assert_eq!(stats.triangles_culled, 1);
        assert!(fb.buffer().iter().all(|p| *p == Pixel::transparent()));
    }

    #[test]
    fn rendering_is_deterministic() {
        let (first, _) = render(Rasterizer::default());
        let (second, _) = render(Rasterizer::default());

        assert_eq!(first.to_rgba8(), second.to_rgba8());
    }

    #[test]
    fn equal_depth_passes_lequal_only() {
        let scene = Scene::triangle();
        let mut fb = FrameBuffer::new(64, 64);

        let lequal = Rasterizer::default();
        let drawn = lequal.render(&scene, &mut fb).fragments;
        assert!(drawn > 0);

        let less = Rasterizer {
            depth_test: Some(DepthFunc::Less),
            ..Default::default()
        };
        // second triangle at the same depth without clearing
        let v = |i: u16| Vertex {
            ndc: scene.position(i).unwrap(),
            color: scene.color(i).unwrap(),
        };
        assert_eq!(less.draw_triangle([v(0), v(1), v(2)], &mut fb), Some(0));
        assert_eq!(lequal.draw_triangle([v(0), v(1), v(2)], &mut fb), Some(drawn));
    }
}
