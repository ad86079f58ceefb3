use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use rasterizer::math_prelude::*;
use rasterizer::{ColorMap, CubeMap, Map, MapError, NormalMap, SpecularMap};

/// File names of the cube faces inside a cube map directory, in
/// `+X, -X, +Y, -Y, +Z, -Z` order.
pub const CUBE_FACE_FILES: [&str; 6] = [
    "px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png",
];

#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("failed to load image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Converts an image into a map, flipping rows so that `v = 0` addresses the
/// bottom of the image.
fn decode<T: Copy>(image: &RgbImage, texel: impl Fn(&Rgb<u8>) -> T) -> Result<Map<T>, MapError> {
    let (width, height) = image.dimensions();
    let texels = (0..height)
        .rev()
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| texel(image.get_pixel(x, y)))
        .collect();
    Map::new(width as usize, height as usize, texels)
}

pub fn color_map_from_image(image: &RgbImage) -> Result<ColorMap, MapError> {
    decode(image, |p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
}

/// Each channel maps `[0, 255]` onto `[-1, 1]`.
pub fn normal_map_from_image(image: &RgbImage) -> Result<NormalMap, MapError> {
    decode(image, |p| {
        Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0 * 2.0 - Vec3::ONE
    })
}

/// Reflectance is taken from the red channel.
pub fn specular_map_from_image(image: &RgbImage) -> Result<SpecularMap, MapError> {
    decode(image, |p| p[0] as f32 / 255.0)
}

fn load_with<T>(
    path: &Path,
    convert: impl Fn(&RgbImage) -> Result<T, MapError>,
) -> Result<T, MapLoadError> {
    let image = image::open(path)
        .map_err(|source| MapLoadError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    Ok(convert(&image)?)
}

// Optional maps never fail the load, a missing or broken file leaves the
// feature off.
fn load_optional<T>(
    path: &Path,
    kind: &str,
    convert: impl Fn(&RgbImage) -> Result<T, MapError>,
) -> Option<T> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), kind, "no map");
        return None;
    }
    match load_with(path, convert) {
        Ok(map) => {
            tracing::info!(path = %path.display(), kind, "loaded map");
            Some(map)
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), kind, %error, "ignoring map");
            None
        }
    }
}

pub fn load_color_map(path: &Path) -> Option<ColorMap> {
    load_optional(path, "diffuse", color_map_from_image)
}

pub fn load_normal_map(path: &Path) -> Option<NormalMap> {
    load_optional(path, "normal", normal_map_from_image)
}

pub fn load_specular_map(path: &Path) -> Option<SpecularMap> {
    load_optional(path, "specular", specular_map_from_image)
}

/// Loads the six faces named in [`CUBE_FACE_FILES`] from `dir`. Any missing
/// face disables the cube map.
pub fn load_cube_map(dir: &Path) -> Option<CubeMap> {
    let mut faces = Vec::with_capacity(6);
    for name in CUBE_FACE_FILES {
        faces.push(load_optional(&dir.join(name), "cube face", color_map_from_image)?);
    }
    let [px, nx, py, ny, pz, nz]: [ColorMap; 6] = faces.try_into().ok()?;
    Some(CubeMap::new(px, nx, py, ny, pz, nz))
}
