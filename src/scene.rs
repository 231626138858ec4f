//! Scene description and JSON loading.
//!
//! A scene file is a JSON document with three optional sections:
//!
//! ```json
//! {
//!     "cam":     { "pos": [0, 1, 4], "target": [0, 0, 0] },
//!     "objects": [ { "type": "cube", "pos": [0, 0, 0], "color": [1, 0, 0] } ],
//!     "lights":  [ { "type": "point", "pos": [2, 2, 0] } ]
//! }
//! ```
//!
//! Missing fields take the documented defaults; `scale` and `d_size` accept
//! either a scalar or a three-component vector. Entities with
//! `"disable": true` are dropped. Every light additionally spawns a small
//! emitter icosphere at its position so it shows up in renders.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::light::Light;
use crate::math::{Vec3, Vec4};
use crate::mesh::Mesh;
use crate::primitives::{self, MAX_ICOSPHERE_SUBDIVISIONS};

/// A camera, meshes and lights: everything one render call consumes.
/// Built by the loader, passively read by the projector.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
}

#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "failed to read scene file: {}", e),
            SceneError::Parse(e) => write!(f, "failed to parse scene: {}", e),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::Parse(e)
    }
}

// =============================================================================
// Raw document structure
// =============================================================================

/// A value that may be written as a single scalar or a full vector.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum ScalarOrVec3 {
    Scalar(f32),
    Vector([f32; 3]),
}

impl From<ScalarOrVec3> for Vec3 {
    fn from(v: ScalarOrVec3) -> Self {
        match v {
            ScalarOrVec3::Scalar(s) => Vec3::splat(s),
            ScalarOrVec3::Vector(a) => a.into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct SceneDoc {
    #[serde(default)]
    cam: CameraDoc,
    #[serde(default)]
    objects: Vec<ObjectDoc>,
    #[serde(default)]
    lights: Vec<LightDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CameraDoc {
    pos: [f32; 3],
    target: [f32; 3],
    up: [f32; 3],
    /// Horizontal field of view in degrees.
    fov: f32,
    aspect: f32,
    #[serde(rename = "nearClip")]
    near_clip: f32,
    #[serde(rename = "farClip")]
    far_clip: f32,
}

impl Default for CameraDoc {
    fn default() -> Self {
        Self {
            pos: [0.0, 0.0, 3.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 90.0,
            aspect: 1.0,
            near_clip: 0.1,
            far_clip: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ObjectKind {
    Cube,
    Plane,
    Icosahedron,
    Icosphere,
}

#[derive(Debug, Deserialize)]
struct ObjectDoc {
    #[serde(rename = "type")]
    kind: ObjectKind,
    pos: [f32; 3],
    #[serde(default = "default_scale")]
    scale: ScalarOrVec3,
    #[serde(default)]
    euler: [f32; 3],
    #[serde(default = "default_color")]
    color: [f32; 3],
    #[serde(default = "default_shininess")]
    shininess: f32,
    #[serde(default = "default_subdivide")]
    subdivide: u32,
    #[serde(default)]
    disable: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum LightKind {
    Point,
}

#[derive(Debug, Deserialize)]
struct LightDoc {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: LightKind,
    pos: [f32; 3],
    #[serde(default = "default_color")]
    color: [f32; 3],
    #[serde(default = "default_ambient")]
    ambient: f32,
    #[serde(default = "default_specular")]
    specular: f32,
    #[serde(default = "default_attenuation")]
    attenuation: [f32; 3],
    /// Scale of the emitter sphere spawned to represent the light.
    #[serde(default = "default_d_size")]
    d_size: ScalarOrVec3,
    #[serde(default)]
    disable: bool,
}

fn default_scale() -> ScalarOrVec3 {
    ScalarOrVec3::Scalar(1.0)
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_shininess() -> f32 {
    64.0
}

fn default_subdivide() -> u32 {
    1
}

fn default_ambient() -> f32 {
    0.1
}

fn default_specular() -> f32 {
    2.0
}

fn default_attenuation() -> [f32; 3] {
    [1.0, 0.7, 1.8]
}

fn default_d_size() -> ScalarOrVec3 {
    ScalarOrVec3::Scalar(0.05)
}

/// Subdivision level of the emitter sphere representing a point light.
const LIGHT_SPHERE_SUBDIVISIONS: u32 = 2;

// =============================================================================
// Builders
// =============================================================================

fn build_camera(doc: &CameraDoc) -> Camera {
    Camera::new(
        doc.pos.into(),
        doc.target.into(),
        doc.up.into(),
        doc.fov.to_radians(),
        doc.aspect,
        doc.near_clip,
        doc.far_clip,
    )
}

fn build_object(doc: &ObjectDoc) -> Mesh {
    let color = Vec4::rgb(doc.color[0], doc.color[1], doc.color[2]);
    let position = doc.pos.into();
    let scale = doc.scale.into();
    let euler = doc.euler.into();

    match doc.kind {
        ObjectKind::Cube => primitives::cube(position, scale, euler, color, doc.shininess),
        ObjectKind::Plane => primitives::plane(position, scale, euler, color, doc.shininess),
        ObjectKind::Icosahedron => {
            primitives::icosahedron(position, scale, euler, color, doc.shininess)
        }
        ObjectKind::Icosphere => {
            if doc.subdivide > MAX_ICOSPHERE_SUBDIVISIONS {
                warn!(
                    subdivide = doc.subdivide,
                    max = MAX_ICOSPHERE_SUBDIVISIONS,
                    "icosphere subdivision clamped"
                );
            }
            primitives::icosphere(position, scale, euler, color, doc.shininess, doc.subdivide)
        }
    }
}

fn build_light(doc: &LightDoc) -> Light {
    Light::new(
        doc.pos.into(),
        doc.color.into(),
        doc.ambient,
        doc.specular,
        doc.attenuation,
    )
}

/// The small emitter sphere that stands in for a point light on screen.
fn build_light_sphere(doc: &LightDoc) -> Mesh {
    primitives::icosphere(
        doc.pos.into(),
        doc.d_size.into(),
        Vec3::ZERO,
        Vec4::rgb(doc.color[0], doc.color[1], doc.color[2]),
        -1.0,
        LIGHT_SPHERE_SUBDIVISIONS,
    )
}

impl Scene {
    /// Parses a scene from JSON text, filling defaults.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let doc: SceneDoc = serde_json::from_str(json)?;

        let camera = build_camera(&doc.cam);

        let mut meshes = Vec::new();
        for object in doc.objects.iter().filter(|o| !o.disable) {
            meshes.push(build_object(object));
        }

        let mut lights = Vec::new();
        for light in doc.lights.iter().filter(|l| !l.disable) {
            lights.push(build_light(light));
            meshes.push(build_light_sphere(light));
        }

        debug!(
            meshes = meshes.len(),
            lights = lights.len(),
            "scene loaded"
        );

        Ok(Self {
            camera,
            meshes,
            lights,
        })
    }

    /// Reads and parses a scene file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_document_yields_default_scene() {
        let scene = Scene::from_json("{}").unwrap();
        assert!(scene.meshes.is_empty());
        assert!(scene.lights.is_empty());
        assert_eq!(scene.camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(scene.camera.near(), 0.1);
        assert_relative_eq!(scene.camera.far(), 100.0);
    }

    #[test]
    fn partial_camera_keeps_remaining_defaults() {
        let scene = Scene::from_json(r#"{ "cam": { "pos": [1, 2, 5] } }"#).unwrap();
        assert_eq!(scene.camera.position(), Vec3::new(1.0, 2.0, 5.0));
        assert_relative_eq!(scene.camera.fov(), 90.0_f32.to_radians());
        assert_relative_eq!(scene.camera.aspect(), 1.0);
    }

    #[test]
    fn object_defaults_are_filled() {
        let scene =
            Scene::from_json(r#"{ "objects": [ { "type": "cube", "pos": [0, 1, 0] } ] }"#).unwrap();
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.scale, Vec3::ONE);
        assert_eq!(mesh.euler, Vec3::ZERO);
        assert_relative_eq!(mesh.shininess, 64.0);
        assert_eq!(mesh.colors.as_ref().unwrap()[0], Vec4::WHITE);
    }

    #[test]
    fn scalar_scale_expands_to_vector() {
        let scene = Scene::from_json(
            r#"{ "objects": [ { "type": "plane", "pos": [0, 0, 0], "scale": 2.5 } ] }"#,
        )
        .unwrap();
        assert_eq!(scene.meshes[0].scale, Vec3::splat(2.5));
    }

    #[test]
    fn vector_scale_is_taken_verbatim() {
        let scene = Scene::from_json(
            r#"{ "objects": [ { "type": "plane", "pos": [0, 0, 0], "scale": [1, 2, 3] } ] }"#,
        )
        .unwrap();
        assert_eq!(scene.meshes[0].scale, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn disabled_entities_are_dropped() {
        let scene = Scene::from_json(
            r#"{
                "objects": [
                    { "type": "cube", "pos": [0, 0, 0], "disable": true },
                    { "type": "cube", "pos": [1, 0, 0] }
                ],
                "lights": [
                    { "type": "point", "pos": [0, 2, 0], "disable": true }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].position, Vec3::new(1.0, 0.0, 0.0));
        assert!(scene.lights.is_empty());
    }

    #[test]
    fn light_spawns_emitter_sphere() {
        let scene = Scene::from_json(
            r#"{ "lights": [ { "type": "point", "pos": [0, 2, 0], "color": [1, 0, 0] } ] }"#,
        )
        .unwrap();
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.meshes.len(), 1);

        let sphere = &scene.meshes[0];
        assert!(sphere.is_emitter());
        assert!(sphere.is_smooth());
        assert_eq!(sphere.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(sphere.scale, Vec3::splat(0.05));
        assert_eq!(
            sphere.colors.as_ref().unwrap()[0],
            Vec4::new(1.0, 0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn light_defaults_and_radius() {
        let scene =
            Scene::from_json(r#"{ "lights": [ { "type": "point", "pos": [0, 2, 0] } ] }"#).unwrap();
        let light = &scene.lights[0];
        assert_relative_eq!(light.ambient, 0.1);
        assert_relative_eq!(light.specular, 2.0);
        assert_relative_eq!(light.k_linear, 0.7);
        // Default white light with default attenuation reaches ~5 units
        assert!(light.radius > 4.0 && light.radius < 6.0);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let result = Scene::from_json(r#"{ "objects": [ { "type": "cube" } ] }"#);
        assert!(matches!(result, Err(SceneError::Parse(_))));
    }

    #[test]
    fn unknown_object_type_is_an_error() {
        let result =
            Scene::from_json(r#"{ "objects": [ { "type": "teapot", "pos": [0, 0, 0] } ] }"#);
        assert!(matches!(result, Err(SceneError::Parse(_))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Scene::from_json("{ not json"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn icosphere_subdivide_option_is_honored() {
        let scene = Scene::from_json(
            r#"{ "objects": [ { "type": "icosphere", "pos": [0, 0, 0], "subdivide": 2 } ] }"#,
        )
        .unwrap();
        // 20 * 4^2 triangles
        assert_eq!(scene.meshes[0].triangle_count(), 320);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            Scene::from_file("/nonexistent/scene.json"),
            Err(SceneError::Io(_))
        ));
    }
}
