//! Edge-function triangle rasterization into the G-buffer.
//!
//! Implements Pineda's method: every pixel center inside the triangle's
//! bounding box is tested against the three directed edge equations. For an
//! edge from A to B, the edge function at point P is
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! the 2D cross product (P - A) x (B - A). A pixel is covered when all
//! three edge values are >= 0, which for this operand order selects
//! clockwise screen-space triangles - the winding the projector's backface
//! cull lets through.
//!
//! The edge values divided by the triangle's doubled signed area are the
//! barycentric weights used for interpolation. Depth is interpolated as
//! -1/z (camera-space z is negative into the scene), which is linear in
//! screen space; colors and normals are deliberately lerped without
//! perspective correction.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use crate::gbuffer::GBuffer;
use crate::math::{Vec2, Vec3, Vec4};

/// One screen-space triangle with the per-vertex attributes the G-buffer
/// stores.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Projected positions in pixel coordinates.
    pub screen: [Vec2; 3],
    /// Camera-space positions, same vertex order.
    pub view: [Vec3; 3],
    /// Per-vertex normals (face normal replicated for flat meshes).
    pub normals: [Vec3; 3],
    /// Per-vertex rgba colors.
    pub colors: [Vec4; 3],
    /// Material shininess; negative marks an emitter.
    pub shininess: f32,
}

/// Signed edge function for point `p` relative to the directed edge
/// `a -> b`. Zero on the edge, positive on its clockwise side.
#[inline]
fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Rasterizes one triangle into the buffer under the depth test.
///
/// The bounding box is rounded to pixel centers and clipped half-open to
/// the buffer, so triangles partially or fully off-screen contribute only
/// their visible pixels. Degenerate (zero-area) triangles write nothing.
pub fn fill_triangle(buffer: &mut GBuffer, tri: &Triangle) {
    let [s0, s1, s2] = tri.screen;

    let min_x = (s0.x.min(s1.x).min(s2.x).round() as i32).max(0);
    let max_x = (s0.x.max(s1.x).max(s2.x).round() as i32).min(buffer.width() as i32);
    let min_y = (s0.y.min(s1.y).min(s2.y).round() as i32).max(0);
    let max_y = (s0.y.max(s1.y).max(s2.y).round() as i32).min(buffer.height() as i32);

    let area = edge_function(s0, s1, s2);
    if area.abs() < f32::EPSILON {
        return;
    }
    let inv_area = 1.0 / area;

    // Camera-space z is negative in front of the camera; flip so that
    // closer surfaces carry larger inverse depth
    let inv_zs = [
        -1.0 / tri.view[0].z,
        -1.0 / tri.view[1].z,
        -1.0 / tri.view[2].z,
    ];

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let e0 = edge_function(s1, s2, p);
            let e1 = edge_function(s2, s0, p);
            let e2 = edge_function(s0, s1, p);

            if e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0 {
                let w0 = e0 * inv_area;
                let w1 = e1 * inv_area;
                let w2 = e2 * inv_area;

                let inv_z = w0 * inv_zs[0] + w1 * inv_zs[1] + w2 * inv_zs[2];

                let position = tri.view[0] * w0 + tri.view[1] * w1 + tri.view[2] * w2;
                let normal = tri.normals[0] * w0 + tri.normals[1] * w1 + tri.normals[2] * w2;
                let color = tri.colors[0] * w0 + tri.colors[1] * w1 + tri.colors[2] * w2;

                buffer.write_fragment(
                    x as usize,
                    y as usize,
                    inv_z,
                    position,
                    normal,
                    color.to_vec3(),
                    tri.shininess,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Clockwise screen triangle covering the upper-left half of a w x h
    /// buffer, at constant camera depth `z`.
    fn cw_triangle(w: f32, h: f32, z: f32, color: Vec4) -> Triangle {
        Triangle {
            screen: [
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, h),
                Vec2::new(w, 0.0),
            ],
            view: [
                Vec3::new(-1.0, 1.0, z),
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
            ],
            normals: [Vec3::new(0.0, 0.0, 1.0); 3],
            colors: [color; 3],
            shininess: 32.0,
        }
    }

    #[test]
    fn covered_pixel_gets_interpolated_attributes() {
        let mut buffer = GBuffer::new(8, 8);
        let tri = cw_triangle(8.0, 8.0, -2.0, Vec4::new(0.25, 0.5, 0.75, 1.0));
        fill_triangle(&mut buffer, &tri);

        // (1, 1) center is well inside the upper-left half
        let data = buffer.pixel(1, 1);
        assert_relative_eq!(buffer.inv_depth(1, 1), 0.5, epsilon = 1e-5);
        assert_relative_eq!(data.depth, 2.0, epsilon = 1e-5);
        assert_relative_eq!(data.albedo.x, 0.25, epsilon = 1e-5);
        assert_relative_eq!(data.albedo.z, 0.75, epsilon = 1e-5);
        assert_relative_eq!(data.normal.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn pixels_outside_triangle_are_untouched() {
        let mut buffer = GBuffer::new(8, 8);
        fill_triangle(&mut buffer, &cw_triangle(8.0, 8.0, -2.0, Vec4::WHITE));

        // (7, 7) lies in the lower-right half, outside the triangle
        assert_eq!(buffer.inv_depth(7, 7), 0.0);
        assert_eq!(buffer.pixel(7, 7).depth, f32::INFINITY);
    }

    #[test]
    fn counter_clockwise_triangle_is_not_filled() {
        let mut buffer = GBuffer::new(8, 8);
        let mut tri = cw_triangle(8.0, 8.0, -2.0, Vec4::WHITE);
        tri.screen.swap(1, 2);
        tri.view.swap(1, 2);
        fill_triangle(&mut buffer, &tri);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(buffer.inv_depth(x, y), 0.0);
            }
        }
    }

    #[test]
    fn degenerate_triangle_writes_nothing() {
        let mut buffer = GBuffer::new(8, 8);
        let mut tri = cw_triangle(8.0, 8.0, -2.0, Vec4::WHITE);
        // Collapse onto a line
        tri.screen = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(8.0, 8.0),
        ];
        fill_triangle(&mut buffer, &tri);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(buffer.inv_depth(x, y), 0.0);
            }
        }
    }

    #[test]
    fn closer_triangle_wins_regardless_of_order() {
        let near = cw_triangle(8.0, 8.0, -2.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let far = cw_triangle(8.0, 8.0, -5.0, Vec4::new(0.0, 0.0, 1.0, 1.0));

        for order in [[&near, &far], [&far, &near]] {
            let mut buffer = GBuffer::new(8, 8);
            for tri in order {
                fill_triangle(&mut buffer, tri);
            }
            let data = buffer.pixel(1, 1);
            assert_relative_eq!(data.depth, 2.0, epsilon = 1e-5);
            assert_relative_eq!(data.albedo.x, 1.0, epsilon = 1e-5);
            assert_relative_eq!(data.albedo.z, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn offscreen_bounding_box_is_clipped() {
        let mut buffer = GBuffer::new(4, 4);
        // Triangle far larger than the buffer
        let tri = cw_triangle(400.0, 400.0, -3.0, Vec4::WHITE);
        fill_triangle(&mut buffer, &tri);
        for y in 0..4 {
            for x in 0..4 {
                assert!(buffer.inv_depth(x, y) > 0.0);
            }
        }
    }

    #[test]
    fn interpolated_inverse_depth_matches_weights() {
        // Slanted triangle: vertex depths differ, so per-pixel inverse
        // depth must follow the barycentric combination
        let mut buffer = GBuffer::new(8, 8);
        let tri = Triangle {
            screen: [
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 8.0),
                Vec2::new(8.0, 0.0),
            ],
            view: [
                Vec3::new(-1.0, 1.0, -2.0),
                Vec3::new(-1.0, -1.0, -8.0),
                Vec3::new(1.0, 1.0, -4.0),
            ],
            normals: [Vec3::new(0.0, 0.0, 1.0); 3],
            colors: [Vec4::WHITE; 3],
            shininess: 32.0,
        };
        fill_triangle(&mut buffer, &tri);

        // Pixel (2, 3) center (2.5, 3.5): weights from the edge functions
        let p = Vec2::new(2.5, 3.5);
        let area = edge_function(tri.screen[0], tri.screen[1], tri.screen[2]);
        let w0 = edge_function(tri.screen[1], tri.screen[2], p) / area;
        let w1 = edge_function(tri.screen[2], tri.screen[0], p) / area;
        let w2 = edge_function(tri.screen[0], tri.screen[1], p) / area;
        let expected = w0 / 2.0 + w1 / 8.0 + w2 / 4.0;
        assert_relative_eq!(buffer.inv_depth(2, 3), expected, epsilon = 1e-5);
    }
}
