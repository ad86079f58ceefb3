use std::path::Path;

use rasterizer::math_prelude::*;
use rasterizer::{Framebuffer, Model, Rasterizer, RenderError, ShadingConfig};

use crate::camera::OrbitCamera;
use crate::obj::{self, ObjError};
use crate::texture;

/// Largest extent of a model after [`Model::normalize`].
pub const MODEL_BASE_SCALE: f32 = 100.0;

pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::ONE;

/// Mesh file names looked up inside a model directory, in order.
pub const MODEL_FILES: [&str; 2] = ["model.obj", "Model.obj"];

/// Loads a model from an OBJ file, or from a directory holding `model.obj`
/// (or `Model.obj`) next to optional `diffuse.png`, `normal.png` and
/// `specular.png` maps.
pub fn load_model(
    path: &Path,
    cube_map_dir: Option<&Path>,
    normalize: bool,
) -> Result<Model, ObjError> {
    let mut model = if path.is_dir() {
        let mesh = MODEL_FILES
            .iter()
            .map(|name| path.join(name))
            .find(|file| file.is_file())
            .unwrap_or_else(|| path.join(MODEL_FILES[0]));
        let mut model = obj::read_obj(mesh)?;
        model.diffuse_map = texture::load_color_map(&path.join("diffuse.png"));
        model.normal_map = texture::load_normal_map(&path.join("normal.png"));
        model.specular_map = texture::load_specular_map(&path.join("specular.png"));
        model
    } else {
        obj::read_obj(path)?
    };
    model.cube_map = cube_map_dir.and_then(texture::load_cube_map);
    if normalize {
        model.normalize(MODEL_BASE_SCALE);
    }
    Ok(model)
}

/// Everything that determines a frame. Mutate the camera, light or model and
/// call [`ModelViewer::render`] to produce the next one.
pub struct ModelViewer {
    pub camera: OrbitCamera,
    pub light_direction: Vec3,
    pub shading: ShadingConfig,
    pub rasterizer: Rasterizer,
    pub model: Model,
}

impl ModelViewer {
    /// A viewer with an empty model, see [`ModelViewer::set_model`].
    pub fn new(rasterizer: Rasterizer) -> Self {
        Self {
            camera: OrbitCamera::default(),
            light_direction: DEFAULT_LIGHT_DIRECTION,
            shading: ShadingConfig::default(),
            rasterizer,
            model: Model::default(),
        }
    }

    /// Replaces the model and moves the camera back to its default orbit.
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
        self.camera.reset();
    }

    pub fn render(&mut self) -> Result<&Framebuffer, RenderError> {
        let transform = self
            .camera
            .transform(self.rasterizer.width(), self.rasterizer.height());
        self.rasterizer.render_phong(
            &self.model,
            &transform,
            self.light_direction,
            &self.shading,
        )?;

        let frametime = self.rasterizer.frametime();
        let stats = self.rasterizer.stats();
        tracing::info!(
            total = ?frametime.total(),
            geometry = ?frametime.geometry_stage(),
            rasterization = ?frametime.rasterization_stage(),
            shading = ?frametime.shading_stage(),
            "frame time"
        );
        tracing::info!(
            faces = stats.faces_submitted,
            behind_eye = stats.faces_behind_eye,
            outside_depth_range = stats.faces_outside_depth_range,
            back_facing = stats.triangles_back_facing,
            degenerate = stats.triangles_degenerate,
            offscreen = stats.triangles_offscreen,
            fragments = stats.fragments_tested,
            depth_passes = stats.fragments_won,
            pixels = stats.pixels_shaded,
            "frame stats"
        );
        Ok(self.rasterizer.framebuffer())
    }
}
