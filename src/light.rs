//! Point lights for the deferred pass.

use crate::math::Vec3;

/// Maximum channel value contributing to the effective-radius cutoff:
/// attenuated intensity below 1/51.2 of the brightest channel is treated
/// as zero.
const RADIUS_INTENSITY_SCALE: f32 = 51.2;

/// A point light with quadratic distance attenuation.
///
/// The `radius` field caches the distance beyond which the light's
/// contribution is culled. It solves
/// `K_q * d^2 + K_l * d + (K_c - 51.2 * max(r, g, b)) = 0`
/// for its positive root; with a degenerate quadratic (`K_q = 0`) the root
/// is NaN and every distance comparison fails open, so the light is never
/// culled.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    /// Ambient floor folded into this light's contribution.
    pub ambient: f32,
    /// Specular strength multiplier (scene data, reserved).
    pub specular: f32,
    /// Constant attenuation coefficient.
    pub k_constant: f32,
    /// Linear attenuation coefficient.
    pub k_linear: f32,
    /// Quadratic attenuation coefficient.
    pub k_quadratic: f32,
    /// Effective radius derived from color and attenuation.
    pub radius: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE, 0.1, 2.0, [1.0, 0.7, 1.8])
    }
}

impl Light {
    /// Creates a point light, deriving its effective radius from the color
    /// and the attenuation triple `[K_c, K_l, K_q]`.
    pub fn new(
        position: Vec3,
        color: Vec3,
        ambient: f32,
        specular: f32,
        attenuation: [f32; 3],
    ) -> Self {
        let [k_constant, k_linear, k_quadratic] = attenuation;
        let brightest = color.x.max(color.y).max(color.z);
        let radius = (-k_linear
            + (k_linear * k_linear
                - 4.0 * k_quadratic * (k_constant - RADIUS_INTENSITY_SCALE * brightest))
                .sqrt())
            / (2.0 * k_quadratic);

        Self {
            position,
            color,
            ambient,
            specular,
            k_constant,
            k_linear,
            k_quadratic,
            radius,
        }
    }

    /// Distance falloff: `1 / (K_c + K_l * d + K_q * d^2)`.
    pub fn attenuate(&self, distance: f32) -> f32 {
        1.0 / (self.k_constant + self.k_linear * distance + self.k_quadratic * distance * distance)
    }

    /// Blinn-Phong contribution of this light at a surface point.
    ///
    /// Returns zero beyond the effective radius. The ambient term is part
    /// of the per-light sum, so stacking lights raises the ambient floor.
    pub fn illuminate(
        &self,
        point: Vec3,
        cam_pos: Vec3,
        normal: Vec3,
        albedo: Vec3,
        shininess: f32,
    ) -> Vec3 {
        let to_light = self.position - point;
        let distance = to_light.magnitude();
        if distance > self.radius {
            return Vec3::ZERO;
        }
        let attenuation = self.attenuate(distance);
        let light_dir = to_light / distance;

        let diffuse = normal.dot(light_dir).max(0.0);

        let view_dir = (cam_pos - point).normalize();
        let half = (light_dir + view_dir).normalize();
        let specular = normal.dot(half).max(0.0).powf(shininess);

        self.color * albedo * ((self.ambient + diffuse + specular) * attenuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_radius_is_positive_root() {
        // K_c - 51.2 = -50.2; disc = 0.49 + 4 * 1.8 * 50.2
        let light = Light::default();
        let expected = (-0.7 + (0.49_f32 + 4.0 * 1.8 * 50.2).sqrt()) / 3.6;
        assert_relative_eq!(light.radius, expected, epsilon = 1e-4);
    }

    #[test]
    fn degenerate_attenuation_never_culls() {
        // K_q = 0 makes the radius NaN, and NaN comparisons fail open
        let light = Light::new(Vec3::ZERO, Vec3::ONE, 0.0, 2.0, [1.0, 0.0, 0.0]);
        assert!(light.radius.is_nan());
        let lit = light.illuminate(
            Vec3::new(0.0, -100.0, 0.0),
            Vec3::ZERO,
            Vec3::UP,
            Vec3::ONE,
            64.0,
        );
        // A surface 100 units out still receives the full diffuse term
        assert!(lit.x > 0.5);
    }

    #[test]
    fn surface_beyond_radius_gets_nothing() {
        let light = Light::default();
        assert!(light.radius < 6.0);
        let lit = light.illuminate(
            Vec3::new(0.0, -10.0, 0.0),
            Vec3::new(0.0, -9.0, 0.0),
            Vec3::UP,
            Vec3::ONE,
            64.0,
        );
        assert_eq!(lit, Vec3::ZERO);
    }

    #[test]
    fn attenuation_ratio_between_distances() {
        // Identical surfaces at distance 1 and 5 from the light differ by
        // exactly the attenuation ratio
        let light = Light::new(Vec3::ZERO, Vec3::ONE, 0.0, 2.0, [1.0, 0.7, 1.8]);
        let ratio = light.attenuate(1.0) / light.attenuate(5.0);
        let expected = (1.0 + 0.7 * 5.0 + 1.8 * 25.0) / (1.0 + 0.7 + 1.8);
        assert_relative_eq!(ratio, expected, epsilon = 1e-4);
    }

    #[test]
    fn shaded_value_scales_with_attenuation() {
        let light = Light::new(Vec3::ZERO, Vec3::ONE, 0.0, 2.0, [1.0, 0.7, 1.8]);
        // Surfaces directly below the light, normals toward it, camera at
        // the light so the half vector aligns with the normal
        let near = light.illuminate(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::ZERO,
            Vec3::UP,
            Vec3::ONE,
            64.0,
        );
        let far = light.illuminate(
            Vec3::new(0.0, -5.0, 0.0),
            Vec3::ZERO,
            Vec3::UP,
            Vec3::ONE,
            64.0,
        );
        let expected = (1.0 + 0.7 * 5.0 + 1.8 * 25.0) / (1.0 + 0.7 + 1.8);
        assert_relative_eq!(near.x / far.x, expected, epsilon = 1e-3);
    }

    #[test]
    fn grazing_light_contributes_only_ambient() {
        let light = Light::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ONE, 0.1, 2.0, [1.0, 0.0, 0.0]);
        // Normal perpendicular to the light direction, camera opposite the
        // light so the half vector is degenerate-free but off-normal
        let lit = light.illuminate(
            Vec3::ZERO,
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::UP,
            Vec3::ONE,
            64.0,
        );
        // diffuse = 0, specular ~ 0 (half vector perpendicular to normal)
        assert_relative_eq!(lit.x, 0.1, epsilon = 1e-4);
    }
}
