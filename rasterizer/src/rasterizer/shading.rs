use crate::math_prelude::*;

use super::cube_map::CubeMap;
use super::map::{ColorMap, NormalMap, SpecularMap};
use super::shader::{Fragment, FragmentShader};

/// Mirrors `dir` about `normal`. Both are expected to be unit length and to
/// point away from the surface.
#[inline]
pub fn reflect(dir: Vec3, normal: Vec3) -> Vec3 {
    normal * normal.dot(dir) * 2.0 - dir
}

/// Constants of the lighting model.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingConfig {
    pub gloss: f32,
    pub diffuse_coefficient: f32,
    pub ambient_coefficient: f32,
    /// Used when no diffuse map is bound.
    pub diffuse_color: Vec3,
    /// Used when no diffuse map is bound.
    pub ambient_color: Vec3,
    pub specular_color: Vec3,
    /// Every output channel is clamped into `[0, max_channel]`.
    pub max_channel: f32,
    /// Weight of the environment color when a cube map is bound.
    pub reflection_coefficient: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            gloss: 2.0,
            diffuse_coefficient: 0.6,
            ambient_coefficient: 0.4,
            diffuse_color: Vec3::new(0.0, 128.0, 0.0),
            ambient_color: Vec3::new(0.0, 128.0, 0.0),
            specular_color: Vec3::splat(255.0),
            max_channel: 255.0,
            reflection_coefficient: 0.5,
        }
    }
}

/// Optional texture inputs of a surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Materials<'a> {
    pub normal_map: Option<&'a NormalMap>,
    pub diffuse_map: Option<&'a ColorMap>,
    pub specular_map: Option<&'a SpecularMap>,
    pub cube_map: Option<&'a CubeMap>,
}

/// Ambient + Lambertian diffuse + Phong specular, with an optional
/// environment reflection blended on top.
#[derive(Debug, Clone)]
pub struct PhongShader<'a> {
    config: ShadingConfig,
    light_direction: Vec3,
    eye: Vec3,
    materials: Materials<'a>,
}

impl<'a> PhongShader<'a> {
    /// `light_direction` points from the surface towards the light.
    pub fn new(
        config: ShadingConfig,
        light_direction: Vec3,
        eye: Vec3,
        materials: Materials<'a>,
    ) -> Self {
        Self {
            config,
            light_direction: light_direction.normalize_or_zero(),
            eye,
            materials,
        }
    }

    pub fn shade_point(&self, position: Vec3, normal: Vec3, texcoord: Option<Vec2>) -> Vec3 {
        let config = &self.config;
        let materials = &self.materials;

        let normal = match (materials.normal_map, texcoord) {
            (Some(map), Some(uv)) => map.sample_uv(uv),
            _ => normal,
        }
        .normalize_or_zero();

        let (diffuse_base, ambient_base) = match (materials.diffuse_map, texcoord) {
            (Some(map), Some(uv)) => {
                let sample = map.sample_uv(uv);
                (sample, sample)
            }
            _ => (config.diffuse_color, config.ambient_color),
        };
        let specular_coefficient = match (materials.specular_map, texcoord) {
            (Some(map), Some(uv)) => map.sample_uv(uv),
            _ => 1.0,
        };

        let diffuse = diffuse_base * normal.dot(self.light_direction).max(0.0);
        let to_eye = (self.eye - position).normalize_or_zero();
        let highlight = reflect(self.light_direction, normal).dot(to_eye).max(0.0);
        let specular = config.specular_color * highlight.powf(config.gloss);

        let mut color = specular * specular_coefficient
            + diffuse * config.diffuse_coefficient
            + ambient_base * config.ambient_coefficient;

        if let Some(cube_map) = materials.cube_map {
            if let Some(environment) = cube_map.reflected_color(position, normal, self.eye) {
                let phong = self.clamp(color);
                color = phong.lerp(environment, config.reflection_coefficient);
            }
        }

        self.clamp(color)
    }

    // `f32::max` discards NaN, so broken inputs still land in range.
    fn clamp(&self, color: Vec3) -> Vec3 {
        color
            .max(Vec3::ZERO)
            .min(Vec3::splat(self.config.max_channel))
    }
}

impl FragmentShader for PhongShader<'_> {
    fn shade(&self, fragment: &Fragment) -> Vec3 {
        self.shade_point(fragment.position, fragment.normal, fragment.texcoord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn unlit_specular() -> ShadingConfig {
        ShadingConfig {
            specular_color: Vec3::ZERO,
            ..Default::default()
        }
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-3, "{a} != {b}");
    }

    fn random_unit(rng: &mut StdRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let len = v.length();
            if len > 1e-3 && len <= 1.0 {
                return v / len;
            }
        }
    }

    #[test]
    fn reflect_mirrors_about_the_normal() {
        let dir = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_close(reflect(dir, Vec3::Y), Vec3::new(-1.0, 1.0, 0.0).normalize());
        assert_close(reflect(Vec3::Z, Vec3::Z), Vec3::Z);
    }

    #[test]
    fn head_on_light_blends_diffuse_and_ambient() {
        let shader = PhongShader::new(
            unlit_specular(),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            Materials::default(),
        );
        let color = shader.shade_point(Vec3::ZERO, Vec3::Z, None);
        assert_close(color, Vec3::new(0.0, 128.0, 0.0));
    }

    #[test]
    fn light_behind_surface_leaves_only_ambient() {
        let shader = PhongShader::new(
            ShadingConfig::default(),
            Vec3::NEG_Z,
            Vec3::new(0.0, 0.0, 10.0),
            Materials::default(),
        );
        let color = shader.shade_point(Vec3::ZERO, Vec3::Z, None);
        assert_close(color, Vec3::new(0.0, 128.0 * 0.4, 0.0));
    }

    #[test]
    fn specular_highlight_saturates() {
        let shader = PhongShader::new(
            ShadingConfig::default(),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            Materials::default(),
        );
        let color = shader.shade_point(Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0), None);
        assert_eq!(color, Vec3::splat(255.0));
    }

    #[test]
    fn maps_override_base_colors_and_normals() {
        let diffuse = ColorMap::filled(2, 2, Vec3::new(200.0, 100.0, 0.0)).unwrap();
        let flipped = NormalMap::filled(2, 2, Vec3::NEG_Z).unwrap();
        let no_specular = SpecularMap::filled(2, 2, 0.0).unwrap();

        let lit = PhongShader::new(
            ShadingConfig::default(),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            Materials {
                diffuse_map: Some(&diffuse),
                specular_map: Some(&no_specular),
                ..Default::default()
            },
        );
        assert_close(
            lit.shade_point(Vec3::ZERO, Vec3::Z, Some(Vec2::splat(0.5))),
            Vec3::new(200.0, 100.0, 0.0),
        );
        // Without texture coordinates the maps are not consulted.
        assert_eq!(
            lit.shade_point(Vec3::ZERO, Vec3::Z, None),
            Vec3::new(255.0, 255.0, 255.0)
        );

        let facing_away = PhongShader::new(
            unlit_specular(),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            Materials {
                normal_map: Some(&flipped),
                ..Default::default()
            },
        );
        assert_close(
            facing_away.shade_point(Vec3::ZERO, Vec3::Z, Some(Vec2::ZERO)),
            Vec3::new(0.0, 128.0 * 0.4, 0.0),
        );
    }

    #[test]
    fn cube_map_is_blended_by_reflection_coefficient() {
        let sky = ColorMap::filled(1, 1, Vec3::new(10.0, 20.0, 30.0)).unwrap();
        let cube = CubeMap::new(
            sky.clone(),
            sky.clone(),
            sky.clone(),
            sky.clone(),
            sky.clone(),
            sky,
        );
        let materials = Materials {
            cube_map: Some(&cube),
            ..Default::default()
        };

        let mirror = PhongShader::new(
            ShadingConfig {
                reflection_coefficient: 1.0,
                ..unlit_specular()
            },
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            materials,
        );
        assert_close(
            mirror.shade_point(Vec3::ZERO, Vec3::Z, None),
            Vec3::new(10.0, 20.0, 30.0),
        );

        let half = PhongShader::new(unlit_specular(), Vec3::Z, Vec3::new(0.0, 0.0, 10.0), materials);
        assert_close(
            half.shade_point(Vec3::ZERO, Vec3::Z, None),
            Vec3::new(5.0, 74.0, 15.0),
        );
    }

    #[test]
    fn output_channels_stay_in_display_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let config = ShadingConfig {
                gloss: rng.gen_range(0.5..64.0),
                diffuse_color: Vec3::new(
                    rng.gen_range(0.0..=255.0),
                    rng.gen_range(0.0..=255.0),
                    rng.gen_range(0.0..=255.0),
                ),
                ambient_color: Vec3::splat(rng.gen_range(0.0..=255.0)),
                specular_color: Vec3::splat(rng.gen_range(0.0..=255.0)),
                ..Default::default()
            };
            let light = random_unit(&mut rng);
            let normal = random_unit(&mut rng);
            let eye = random_unit(&mut rng) * rng.gen_range(1.0f32..500.0);
            let position = random_unit(&mut rng) * rng.gen_range(0.0f32..50.0);

            let shader = PhongShader::new(config, light, eye, Materials::default());
            let color = shader.shade_point(position, normal, None);
            for channel in color.to_array() {
                assert!((0.0..=255.0).contains(&channel), "{color}");
            }
        }
    }

    #[test]
    fn degenerate_inputs_do_not_produce_nan() {
        let shader = PhongShader::new(
            ShadingConfig::default(),
            Vec3::ZERO,
            Vec3::ZERO,
            Materials::default(),
        );
        let color = shader.shade_point(Vec3::ZERO, Vec3::ZERO, None);
        assert!(!color.is_nan());
        assert_close(color, Vec3::new(0.0, 128.0 * 0.4, 0.0));
    }
}
