//! The rendering pipeline orchestrator.
//!
//! [`Projector::render`] drives the three stages: per mesh, transform and
//! project every vertex, cull backfaces and rasterize the surviving
//! triangles into the G-buffer; then sweep the G-buffer once in raster
//! order to light every covered pixel into the framebuffer. The G-buffer
//! sticks around after the render so the six debug views can be produced
//! from it.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::framebuffer::{to_premul, Framebuffer};
use crate::gbuffer::GBuffer;
use crate::math::{Mat4, Vec2, Vec3, Vec4};
use crate::mesh::MeshError;
use crate::rasterizer::{self, Triangle};
use crate::scene::Scene;

/// Counters reported by one render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub meshes: usize,
    /// Triangles submitted, before backface culling.
    pub triangles_total: usize,
    /// Triangles rasterized, after backface culling.
    pub triangles_drawn: usize,
    pub lights: usize,
    pub elapsed: Duration,
}

/// Which G-buffer channel a debug view visualizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Depth,
    InvDepth,
    Position,
    Normal,
    Albedo,
    Specular,
}

#[derive(Debug)]
pub enum ProjectorError {
    /// A mesh failed validation; nothing was rendered.
    InvalidMesh { index: usize, source: MeshError },
    /// A debug view was requested before any render.
    NothingRendered,
    /// The target buffer does not match the G-buffer dimensions.
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl fmt::Display for ProjectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectorError::InvalidMesh { index, source } => {
                write!(f, "mesh {} failed validation: {}", index, source)
            }
            ProjectorError::NothingRendered => write!(f, "nothing has been rendered yet"),
            ProjectorError::DimensionMismatch { expected, actual } => write!(
                f,
                "buffer dimensions {}x{} do not match {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for ProjectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectorError::InvalidMesh { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub struct Projector {
    width: usize,
    height: usize,
    buffer: GBuffer,
    rendered: bool,
}

impl Projector {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: GBuffer::new(width, height),
            rendered: false,
        }
    }

    /// Renders a scene into `target`, which must match the projector's
    /// dimensions. Blocks until the framebuffer is fully written.
    ///
    /// Meshes are validated up front; geometry that degenerates, projects
    /// off-screen or culls away contributes zero pixels but is never an
    /// error.
    pub fn render(
        &mut self,
        scene: &Scene,
        target: &mut Framebuffer,
    ) -> Result<RenderStats, ProjectorError> {
        if target.width() != self.width || target.height() != self.height {
            return Err(ProjectorError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (target.width(), target.height()),
            });
        }
        for (index, mesh) in scene.meshes.iter().enumerate() {
            mesh.validate()
                .map_err(|source| ProjectorError::InvalidMesh { index, source })?;
        }

        let start = Instant::now();
        self.buffer = GBuffer::new(self.width, self.height);
        self.rendered = true;

        let mut stats = RenderStats {
            meshes: 0,
            triangles_total: 0,
            triangles_drawn: 0,
            lights: scene.lights.len(),
            elapsed: Duration::ZERO,
        };

        let view = scene.camera.view_matrix();
        let view_proj = scene.camera.projection_matrix() * view;
        let dim = Vec2::new(self.width as f32, self.height as f32);

        for mesh in &scene.meshes {
            stats.meshes += 1;

            let model = mesh.transform_matrix();
            let model_view_proj = view_proj * model;
            let local_to_cam = view * model;

            // Normals are directions: drop the translation row from the
            // inverse-transpose. A singular model matrix (zero scale)
            // falls back to identity.
            let mut normal_transform = model
                .inverse()
                .unwrap_or_else(Mat4::identity)
                .transpose();
            normal_transform.set(3, 0, 0.0);
            normal_transform.set(3, 1, 0.0);
            normal_transform.set(3, 2, 0.0);

            // Project every vertex to pixel coordinates
            let screen_verts: Vec<Vec2> = mesh
                .positions
                .iter()
                .map(|&p| {
                    let proj = model_view_proj * p;
                    Vec2::new(proj.x + 0.5, proj.y + 0.5) * dim
                })
                .collect();

            for tri in mesh.indices.chunks_exact(3) {
                stats.triangles_total += 1;

                let a = tri[0] as usize;
                let b = tri[1] as usize;
                let c = tri[2] as usize;

                // Counter-clockwise on screen means we are looking at the
                // back side; keep only clockwise triangles
                let ab = screen_verts[b] - screen_verts[a];
                let ac = screen_verts[c] - screen_verts[a];
                if !ab.cross(ac).is_sign_negative() {
                    continue;
                }
                stats.triangles_drawn += 1;

                let normals = match &mesh.normals {
                    Some(normals) => [
                        (normal_transform * normals[a]).normalize(),
                        (normal_transform * normals[b]).normalize(),
                        (normal_transform * normals[c]).normalize(),
                    ],
                    None => {
                        let face = (normal_transform
                            * (mesh.positions[c] - mesh.positions[a])
                                .cross(mesh.positions[b] - mesh.positions[a]))
                        .normalize();
                        [face; 3]
                    }
                };

                let colors = match &mesh.colors {
                    Some(colors) => [colors[a], colors[b], colors[c]],
                    None => [Vec4::WHITE; 3],
                };

                rasterizer::fill_triangle(
                    &mut self.buffer,
                    &Triangle {
                        screen: [screen_verts[a], screen_verts[b], screen_verts[c]],
                        view: [
                            local_to_cam * mesh.positions[a],
                            local_to_cam * mesh.positions[b],
                            local_to_cam * mesh.positions[c],
                        ],
                        normals,
                        colors,
                        shininess: mesh.shininess,
                    },
                );
            }
        }

        self.shade(scene, target);

        stats.elapsed = start.elapsed();
        debug!(
            meshes = stats.meshes,
            drawn = stats.triangles_drawn,
            total = stats.triangles_total,
            "render complete"
        );
        Ok(stats)
    }

    /// Deferred lighting sweep: converts the G-buffer into shaded pixels.
    fn shade(&self, scene: &Scene, target: &mut Framebuffer) {
        let cam_pos = scene.camera.position();

        for y in 0..self.height {
            for x in 0..self.width {
                // Untouched pixels keep the initial background
                if self.buffer.inv_depth(x, y) == 0.0 {
                    continue;
                }
                let data = self.buffer.pixel(x, y);

                // Emitters bypass lighting entirely
                if data.specular < 0.0 {
                    target.set_pixel(x, y, to_premul(Vec4::from(data.albedo)));
                    continue;
                }

                let mut color = Vec3::ZERO;
                for light in &scene.lights {
                    color = color
                        + light.illuminate(
                            data.position,
                            cam_pos,
                            data.normal,
                            data.albedo,
                            data.specular,
                        );
                }
                let color = color.clamp(0.0, 1.0);
                target.set_pixel(x, y, to_premul(Vec4::from(color)));
            }
        }
    }

    /// Read access to the G-buffer of the last render.
    pub fn gbuffer(&self) -> Result<&GBuffer, ProjectorError> {
        if !self.rendered {
            return Err(ProjectorError::NothingRendered);
        }
        Ok(&self.buffer)
    }

    /// Writes a grayscale/rgb visualization of one G-buffer channel into
    /// `target`. The scene provides the camera planes for depth scaling.
    pub fn show_buffer(
        &self,
        kind: BufferKind,
        scene: &Scene,
        target: &mut Framebuffer,
    ) -> Result<(), ProjectorError> {
        if !self.rendered {
            return Err(ProjectorError::NothingRendered);
        }
        if target.width() != self.width || target.height() != self.height {
            return Err(ProjectorError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (target.width(), target.height()),
            });
        }

        match kind {
            BufferKind::Depth => self.show_depth(scene, target),
            BufferKind::InvDepth => self.show_inv_depth(scene, target),
            BufferKind::Position => self.show_position(target),
            BufferKind::Normal => self.show_normal(target),
            BufferKind::Albedo => self.show_albedo(target),
            BufferKind::Specular => self.show_specular(target),
        }
        Ok(())
    }

    fn show_depth(&self, scene: &Scene, target: &mut Framebuffer) {
        let near = scene.camera.near();
        let far = scene.camera.far();

        for y in 0..self.height {
            for x in 0..self.width {
                let mut val = 1.0 - self.buffer.pixel(x, y).depth.clamp(near, far) / (far - near);
                // Non-linear scale for better visualizing
                val *= val;
                target.set_pixel(x, y, to_premul(Vec4::from(Vec3::splat(val))));
            }
        }
    }

    fn show_inv_depth(&self, scene: &Scene, target: &mut Framebuffer) {
        let max = 1.0 / scene.camera.near();
        let min = 1.0 / scene.camera.far();

        for y in 0..self.height {
            for x in 0..self.width {
                let val = self.buffer.inv_depth(x, y).clamp(min, max) / (max - min);
                target.set_pixel(x, y, to_premul(Vec4::from(Vec3::splat(val))));
            }
        }
    }

    fn show_position(&self, target: &mut Framebuffer) {
        for y in 0..self.height {
            for x in 0..self.width {
                let mut val = self.buffer.pixel(x, y).position;
                val.y = -val.y;
                let val = val.clamp(0.0, 1.0);
                target.set_pixel(x, y, to_premul(Vec4::from(val)));
            }
        }
    }

    fn show_normal(&self, target: &mut Framebuffer) {
        for y in 0..self.height {
            for x in 0..self.width {
                let n = self.buffer.pixel(x, y).normal;
                let val = Vec3::new(n.x.abs(), n.y.abs(), n.z.abs()).clamp(0.0, 1.0);
                target.set_pixel(x, y, to_premul(Vec4::from(val)));
            }
        }
    }

    fn show_albedo(&self, target: &mut Framebuffer) {
        for y in 0..self.height {
            for x in 0..self.width {
                let val = self.buffer.pixel(x, y).albedo;
                target.set_pixel(x, y, to_premul(Vec4::from(val)));
            }
        }
    }

    fn show_specular(&self, target: &mut Framebuffer) {
        for y in 0..self.height {
            for x in 0..self.width {
                let val = (self.buffer.pixel(x, y).specular / 256.0).clamp(0.0, 1.0);
                target.set_pixel(x, y, to_premul(Vec4::from(Vec3::splat(val))));
            }
        }
    }
}
