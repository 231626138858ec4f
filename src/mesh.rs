//! Indexed triangle meshes.
//!
//! A [`Mesh`] bundles local-space geometry with a model transform and
//! material data. Per-vertex normals, colors and uvs are optional; absent
//! attributes fall back to face normals, opaque white and zero uvs when the
//! projector prepares triangles for rasterization.

use std::fmt;

use crate::math::{Mat4, Vec2, Vec3, Vec4};

/// Geometry validation failure, reported before rendering begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    /// Index count is not a multiple of three.
    IndicesNotTriples,
    /// An index references a vertex that does not exist.
    IndexOutOfBounds,
    /// Per-vertex normals present but not one per vertex.
    NormalCountMismatch,
    /// Per-vertex colors present but not one per vertex.
    ColorCountMismatch,
    /// Per-vertex uvs present but not one per vertex.
    UvCountMismatch,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::IndicesNotTriples => write!(f, "index count not divisible by 3"),
            MeshError::IndexOutOfBounds => write!(f, "index references a missing vertex"),
            MeshError::NormalCountMismatch => write!(f, "normal count does not match vertex count"),
            MeshError::ColorCountMismatch => write!(f, "color count does not match vertex count"),
            MeshError::UvCountMismatch => write!(f, "uv count does not match vertex count"),
        }
    }
}

impl std::error::Error for MeshError {}

/// An indexed triangle list with a model transform.
///
/// Indices reference `positions` in triples; each triple is one triangle,
/// wound counter-clockwise front-facing in local space.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Model translation.
    pub position: Vec3,
    /// Model rotation as Euler angles in radians, applied X then Y then Z.
    pub euler: Vec3,
    /// Model scale per axis.
    pub scale: Vec3,

    /// Vertex positions in the mesh's local space.
    pub positions: Vec<Vec3>,
    /// Triangle indices into `positions`.
    pub indices: Vec<u32>,
    /// Per-vertex normals; `None` selects flat shading with computed face
    /// normals.
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex rgba colors; `None` renders opaque white.
    pub colors: Option<Vec<Vec4>>,
    /// Per-vertex texture coordinates, reserved for the 2D canvas layer.
    pub uvs: Option<Vec<Vec2>>,

    /// Blinn-Phong shininess exponent. Negative marks the mesh as an
    /// emitter: no lighting applied, albedo written through directly.
    pub shininess: f32,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            euler: Vec3::ZERO,
            scale: Vec3::ONE,
            positions: Vec::new(),
            indices: Vec::new(),
            normals: None,
            colors: None,
            uvs: None,
            shininess: 64.0,
        }
    }
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether the mesh bypasses lighting and writes albedo directly.
    pub fn is_emitter(&self) -> bool {
        self.shininess < 0.0
    }

    /// Smooth meshes carry per-vertex normals; flat meshes get one face
    /// normal per triangle.
    pub fn is_smooth(&self) -> bool {
        self.normals.is_some()
    }

    /// The local-to-world matrix: translate * rotate-euler * scale.
    pub fn transform_matrix(&self) -> Mat4 {
        Mat4::translation(self.position.x, self.position.y, self.position.z)
            * Mat4::rotation_euler(self.euler)
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Checks the structural invariants before the mesh enters the
    /// pipeline.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IndicesNotTriples);
        }
        if self
            .indices
            .iter()
            .any(|&i| i as usize >= self.positions.len())
        {
            return Err(MeshError::IndexOutOfBounds);
        }
        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(MeshError::NormalCountMismatch);
            }
        }
        if let Some(colors) = &self.colors {
            if colors.len() != self.positions.len() {
                return Err(MeshError::ColorCountMismatch);
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != self.positions.len() {
                return Err(MeshError::UvCountMismatch);
            }
        }
        Ok(())
    }
}
