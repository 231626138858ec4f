//! Primitive mesh templates.
//!
//! Cube, plane, icosahedron and icosphere constructors. Templates are
//! immutable constants; each builder stamps out a fresh [`Mesh`] with the
//! requested transform and material. Primitives without normal data shade
//! flat; the icosphere carries smooth unit normals.

use std::collections::HashMap;

use crate::math::{Vec3, Vec4};
use crate::mesh::Mesh;

/// Subdivision levels beyond this are clamped; the triangle count grows
/// 4x per level.
pub const MAX_ICOSPHERE_SUBDIVISIONS: u32 = 5;

const CUBE_POSITIONS: [Vec3; 8] = [
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(-0.5, -0.5, 0.5),
];

/*
       0--------1
      /|       /|
     / |      / |
    3--------2  |
    |  4-----|--5
    | /      | /
    |/       |/
    7--------6
*/
#[rustfmt::skip]
const CUBE_INDICES: [u32; 36] = [
    0, 1, 3,  1, 2, 3, // top
    3, 2, 7,  2, 6, 7, // front
    2, 1, 6,  1, 5, 6, // right
    1, 0, 4,  1, 4, 5, // back
    0, 3, 4,  3, 7, 4, // left
    7, 6, 4,  6, 5, 4, // bottom
];

/// Single quad in the XZ plane, wound on both sides so one side always
/// survives backface culling.
const PLANE_POSITIONS: [Vec3; 4] = [
    Vec3::new(-0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(-0.5, 0.0, 0.5),
];

#[rustfmt::skip]
const PLANE_INDICES: [u32; 12] = [
    0, 1, 3,  1, 2, 3,
    0, 3, 1,  1, 3, 2,
];

const ICO_X: f32 = 0.525731112119133606;
const ICO_Z: f32 = 0.850650808352039932;
const ICO_N: f32 = 0.0;

const ICOSAHEDRON_POSITIONS: [Vec3; 12] = [
    Vec3::new(-ICO_X, ICO_N, ICO_Z),
    Vec3::new(ICO_X, ICO_N, ICO_Z),
    Vec3::new(-ICO_X, ICO_N, -ICO_Z),
    Vec3::new(ICO_X, ICO_N, -ICO_Z),
    Vec3::new(ICO_N, ICO_Z, ICO_X),
    Vec3::new(ICO_N, ICO_Z, -ICO_X),
    Vec3::new(ICO_N, -ICO_Z, ICO_X),
    Vec3::new(ICO_N, -ICO_Z, -ICO_X),
    Vec3::new(ICO_Z, ICO_X, ICO_N),
    Vec3::new(-ICO_Z, ICO_X, ICO_N),
    Vec3::new(ICO_Z, -ICO_X, ICO_N),
    Vec3::new(-ICO_Z, -ICO_X, ICO_N),
];

#[rustfmt::skip]
const ICOSAHEDRON_INDICES: [u32; 60] = [
    0, 4, 1,   0, 9, 4,   9, 5, 4,   4, 5, 8,   4, 8, 1,
    8, 10, 1,  8, 3, 10,  5, 3, 8,   5, 2, 3,   2, 7, 3,
    7, 10, 3,  7, 6, 10,  7, 11, 6,  11, 0, 6,  0, 1, 6,
    6, 1, 10,  9, 0, 11,  9, 11, 2,  9, 2, 5,   7, 2, 11,
];

fn from_template(
    positions: &[Vec3],
    indices: &[u32],
    position: Vec3,
    scale: Vec3,
    euler: Vec3,
    color: Vec4,
    shininess: f32,
) -> Mesh {
    Mesh {
        position,
        euler,
        scale,
        colors: Some(vec![color; positions.len()]),
        positions: positions.to_vec(),
        indices: indices.to_vec(),
        shininess,
        ..Default::default()
    }
}

/// A unit cube centered on the origin, flat shaded.
pub fn cube(position: Vec3, scale: Vec3, euler: Vec3, color: Vec4, shininess: f32) -> Mesh {
    from_template(
        &CUBE_POSITIONS,
        &CUBE_INDICES,
        position,
        scale,
        euler,
        color,
        shininess,
    )
}

/// A unit quad in the XZ plane, flat shaded and visible from both sides.
pub fn plane(position: Vec3, scale: Vec3, euler: Vec3, color: Vec4, shininess: f32) -> Mesh {
    from_template(
        &PLANE_POSITIONS,
        &PLANE_INDICES,
        position,
        scale,
        euler,
        color,
        shininess,
    )
}

/// A unit-radius icosahedron, flat shaded.
pub fn icosahedron(position: Vec3, scale: Vec3, euler: Vec3, color: Vec4, shininess: f32) -> Mesh {
    from_template(
        &ICOSAHEDRON_POSITIONS,
        &ICOSAHEDRON_INDICES,
        position,
        scale,
        euler,
        color,
        shininess,
    )
}

/// A unit sphere built by recursive midpoint subdivision of the
/// icosahedron, smooth shaded.
///
/// Each level splits every triangle in four, pushing the new midpoints out
/// to the unit sphere. Midpoints are deduplicated per level through a
/// canonical `(min, max)` edge key so shared edges stay welded.
/// `subdivisions` is clamped to [`MAX_ICOSPHERE_SUBDIVISIONS`].
pub fn icosphere(
    position: Vec3,
    scale: Vec3,
    euler: Vec3,
    color: Vec4,
    shininess: f32,
    subdivisions: u32,
) -> Mesh {
    let subdivisions = subdivisions.min(MAX_ICOSPHERE_SUBDIVISIONS);

    let mut positions = ICOSAHEDRON_POSITIONS.to_vec();
    let mut indices = ICOSAHEDRON_INDICES.to_vec();

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut subdivided = Vec::with_capacity(indices.len() * 4);

        for tri in indices.chunks_exact(3) {
            let mut mids = [0u32; 3];
            for (i, mid) in mids.iter_mut().enumerate() {
                let a = tri[i];
                let b = tri[(i + 1) % 3];
                let edge = (a.min(b), a.max(b));
                *mid = *midpoints.entry(edge).or_insert_with(|| {
                    let point =
                        (positions[a as usize] + positions[b as usize]).normalize();
                    positions.push(point);
                    (positions.len() - 1) as u32
                });
            }

            subdivided.extend_from_slice(&[
                tri[0], mids[0], mids[2],
                tri[1], mids[1], mids[0],
                tri[2], mids[2], mids[1],
                mids[0], mids[1], mids[2],
            ]);
        }

        indices = subdivided;
    }

    // Unit sphere: every vertex is its own normal
    let normals = positions.clone();

    Mesh {
        position,
        euler,
        scale,
        colors: Some(vec![color; positions.len()]),
        normals: Some(normals),
        positions,
        indices,
        shininess,
        ..Default::default()
    }
}
