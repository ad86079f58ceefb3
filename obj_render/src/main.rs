mod camera;
mod obj;
mod scene;
mod texture;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, Error, WrapErr};
use rasterizer::math_prelude::*;
use rasterizer::{Rasterizer, RenderConfig};
use tracing_subscriber::EnvFilter;

use scene::{load_model, ModelViewer};

/// Renders a Wavefront OBJ model to a PNG image with the software rasterizer.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// OBJ file, or a directory with `model.obj` (or `Model.obj`) and
    /// optional `diffuse.png`, `normal.png` and `specular.png`.
    model: PathBuf,

    /// Directory with the six cube map faces `px.png`, `nx.png`, `py.png`,
    /// `ny.png`, `pz.png` and `nz.png`.
    #[arg(long)]
    cube_map: Option<PathBuf>,

    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Camera polar angle in degrees, measured from the up axis.
    #[arg(long, default_value_t = 90.0)]
    polar: f32,

    /// Camera azimuth in degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    azimuth: f32,

    /// Distance between the camera and its target.
    #[arg(long, default_value_t = camera::OrbitCamera::DEFAULT_RADIUS)]
    radius: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset_x: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset_y: f32,

    /// Direction towards the light, as `x,y,z`.
    #[arg(
        long,
        default_value = "1,1,1",
        value_parser = parse_vec3,
        allow_hyphen_values = true
    )]
    light: Vec3,

    /// Worker threads, 0 uses one per core.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    #[arg(long)]
    gloss: Option<f32>,

    #[arg(long)]
    diffuse: Option<f32>,

    #[arg(long)]
    ambient: Option<f32>,

    /// Weight of the cube map reflection, between 0 and 1.
    #[arg(long)]
    reflection: Option<f32>,

    /// Interpolate surface attributes linearly in screen space.
    #[arg(long)]
    flat_interpolation: bool,

    /// Keep the model's original position and scale.
    #[arg(long)]
    no_normalize: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let components = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("`{c}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 components, got {}", components.len())),
    }
}

impl Args {
    fn run(self) -> Result<(), Error> {
        let model = load_model(&self.model, self.cube_map.as_deref(), !self.no_normalize)
            .wrap_err_with(|| format!("failed to load {}", self.model.display()))?;

        let config = RenderConfig {
            threads: self.threads,
            perspective_correct: !self.flat_interpolation,
            ..Default::default()
        };
        let rasterizer = Rasterizer::new(self.width, self.height, config)?;
        let mut viewer = ModelViewer::new(rasterizer);
        viewer.set_model(model);

        if !viewer.camera.set_polar(self.polar.to_radians()) {
            bail!("polar angle must be between 0 and 180 degrees, got {}", self.polar);
        }
        if !viewer.camera.set_azimuth(self.azimuth.to_radians()) {
            bail!("invalid azimuth {}", self.azimuth);
        }
        if !viewer.camera.set_radius(self.radius) {
            bail!(
                "radius must be in [{}, {}), got {}",
                camera::OrbitCamera::MIN_RADIUS,
                camera::OrbitCamera::MAX_RADIUS,
                self.radius
            );
        }
        if !viewer.camera.set_offset_x(self.offset_x) || !viewer.camera.set_offset_y(self.offset_y)
        {
            bail!(
                "target offsets must be within ±{}",
                camera::OrbitCamera::MAX_OFFSET
            );
        }

        let camera = &viewer.camera;
        tracing::debug!(
            polar = camera.polar().to_degrees(),
            azimuth = camera.azimuth().to_degrees(),
            radius = camera.radius(),
            offset = ?camera.offset(),
            eye = ?camera.eye(),
            "camera"
        );

        viewer.light_direction = self.light;
        if let Some(gloss) = self.gloss {
            viewer.shading.gloss = gloss;
        }
        if let Some(diffuse) = self.diffuse {
            viewer.shading.diffuse_coefficient = diffuse;
        }
        if let Some(ambient) = self.ambient {
            viewer.shading.ambient_coefficient = ambient;
        }
        if let Some(reflection) = self.reflection {
            if !(0.0..=1.0).contains(&reflection) {
                bail!("reflection must be between 0 and 1, got {reflection}");
            }
            viewer.shading.reflection_coefficient = reflection;
        }

        let framebuffer = viewer.render()?;
        image::save_buffer(
            &self.output,
            &framebuffer.to_rgb8(),
            framebuffer.width(),
            framebuffer.height(),
            image::ColorType::Rgb8,
        )
        .wrap_err_with(|| format!("failed to write {}", self.output.display()))?;
        tracing::info!(path = %self.output.display(), "saved frame");

        Ok(())
    }
}

fn main() -> Result<(), Error> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    args.run()
}
