//! Perspective camera.
//!
//! # Coordinate System
//!
//! Right-handed: X right, Y up, and -Z pointing into the scene. The
//! orientation matrix stores the camera's basis vectors as rows
//! (right, up, dir), where `dir` points from the target *toward* the
//! camera. Direction accessors derive from the matrix on read; the matrix
//! is the single source of truth.

use crate::math::{Mat4, Vec3};

/// A perspective camera holding its orientation and inverse-translation
/// matrices separately; the view matrix is their product.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    orientation: Mat4,
    inv_translation: Mat4,
    projection: Mat4,
    fov: f32, // radians
    aspect: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::UP,
            90.0_f32.to_radians(),
            1.0,
            0.1,
            100.0,
        )
    }
}

impl Camera {
    /// Creates a camera at `position` looking at `target`.
    ///
    /// `fov` is the horizontal field of view in radians; `up` is a hint for
    /// orienting the camera roll and need not be orthogonal to the view
    /// direction (it must not be parallel to it).
    pub fn new(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        // Basis: dir faces away from the target, right/up complete the
        // right-handed frame (up = dir x right)
        let dir = (position - target).normalize();
        let right = up.cross(dir).normalize();
        let up = dir.cross(right);

        let mut orientation = Mat4::identity();
        for (row, axis) in [right, up, dir].into_iter().enumerate() {
            orientation.set(row, 0, axis.x);
            orientation.set(row, 1, axis.y);
            orientation.set(row, 2, axis.z);
        }

        let r = (fov * 0.5).tan() * near;
        let t = r / aspect;
        let projection = Mat4::new([
            [near / r, 0.0, 0.0, 0.0],
            [0.0, near / t, 0.0, 0.0],
            [0.0, 0.0, -(far + near) / (far - near), -1.0],
            [0.0, 0.0, -2.0 * far * near / (far - near), 0.0],
        ]);

        Self {
            position,
            orientation,
            inv_translation: Mat4::translation(-position.x, -position.y, -position.z),
            projection,
            fov,
            aspect,
            near,
            far,
        }
    }

    /// The world-to-camera matrix: `orientation * inverse_translation`.
    pub fn view_matrix(&self) -> Mat4 {
        self.orientation * self.inv_translation
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Moves the camera by a world-space delta.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position = self.position + Vec3::new(dx, dy, dz);

        self.inv_translation.set(0, 3, self.inv_translation.get(0, 3) - dx);
        self.inv_translation.set(1, 3, self.inv_translation.get(1, 3) - dy);
        self.inv_translation.set(2, 3, self.inv_translation.get(2, 3) - dz);
    }

    /// Rotates the camera about an axis by right-multiplying the
    /// orientation matrix.
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        self.orientation = self.orientation * Mat4::rotation_axis(axis, angle);
    }

    // =========================================================================
    // Queries - basis vectors are read out of the orientation matrix rows
    // =========================================================================

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    fn basis_row(&self, row: usize) -> Vec3 {
        Vec3::new(
            self.orientation.get(row, 0),
            self.orientation.get(row, 1),
            self.orientation.get(row, 2),
        )
    }

    /// The camera's local +X axis.
    pub fn right(&self) -> Vec3 {
        self.basis_row(0)
    }

    /// The camera's local +Y axis.
    pub fn up(&self) -> Vec3 {
        self.basis_row(1)
    }

    /// The camera's local +Z axis. Points *away* from the target; the view
    /// direction into the scene is `-dir()`.
    pub fn dir(&self) -> Vec3 {
        self.basis_row(2)
    }
}
