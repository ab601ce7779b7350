//! JSON settings file and the runtime objects built from it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lumen_core::{
    Checker, CubeMap, CubeMapPaths, Environment, SceneDescription, SkyGradient, SurfaceTexture, Texture,
};
use lumen_renderer::{Camera, CameraError, CameraSettings, RenderConfig};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Everything a render needs, as stored on disk. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub camera: CameraSettings,
    /// Scene to animate; the reference scene when absent
    pub scene: Option<SceneDescription>,
    /// Albedo image for textured objects; a checkerboard when absent
    pub texture: Option<PathBuf>,
    /// Cube map faces; a sky gradient when absent
    pub environment: Option<CubeMapPaths>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings from `--config` (or defaults) with command line overrides.
    /// `--scene` is loaded and validated here.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(path) = &args.scene {
            let scene = SceneDescription::from_file(path)
                .with_context(|| format!("loading scene {}", path.display()))?;
            settings.scene = Some(scene);
        }
        if let Some(dir) = &args.environment {
            settings.environment = Some(CubeMapPaths::in_directory(dir));
        }
        if let Some(width) = args.width {
            settings.render.width = width;
        }
        if let Some(height) = args.height {
            settings.render.height = height;
        }
        if let Some(spp) = args.spp {
            settings.render.samples_per_pixel = spp;
        }
        settings.render.validate().context("invalid render settings")?;
        Ok(settings)
    }

    /// Validated scene description.
    pub fn scene(&self) -> Result<SceneDescription> {
        match &self.scene {
            Some(scene) => {
                scene.validate().context("invalid scene")?;
                Ok(scene.clone())
            }
            None => Ok(SceneDescription::reference()),
        }
    }

    /// Camera for the configured resolution.
    ///
    /// A basis that is merely not orthonormal is repaired with a warning.
    pub fn camera(&self) -> Result<Camera> {
        let (width, height) = (self.render.width, self.render.height);
        match Camera::new(&self.camera, width, height) {
            Err(CameraError::NonOrthonormalBasis) => {
                let fixed = self
                    .camera
                    .orthonormalized()
                    .context("camera forward and up are degenerate or parallel")?;
                log::warn!(
                    "Camera basis is not orthonormal, using right={} up={} forward={}",
                    fixed.right,
                    fixed.up,
                    fixed.forward
                );
                Camera::new(&fixed, width, height).context("invalid camera settings")
            }
            result => result.context("invalid camera settings"),
        }
    }

    pub fn environment(&self) -> Result<Box<dyn Environment>> {
        match &self.environment {
            Some(paths) => {
                let cube = CubeMap::load(paths).context("loading environment cube map")?;
                Ok(Box::new(cube))
            }
            None => Ok(Box::new(SkyGradient::default())),
        }
    }

    pub fn texture(&self) -> Result<Box<dyn SurfaceTexture>> {
        match &self.texture {
            Some(path) => {
                let texture = Texture::load(path).with_context(|| format!("loading texture {}", path.display()))?;
                Ok(Box::new(texture))
            }
            None => Ok(Box::new(Checker::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lumen_math::Vec3;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.render, RenderConfig::default());
        assert_eq!(settings.camera, CameraSettings::default());
        assert_eq!(settings.scene().unwrap(), SceneDescription::reference());
        assert!(settings.camera().is_ok());
    }

    #[test]
    fn test_full_settings() {
        let json = r#"{
            "render": { "width": 64, "height": 48, "samples_per_pixel": 8, "max_bounces": 6, "min_bounces": 3 },
            "camera": { "position": [0.0, 1.0, 0.0], "vfov": 45.0, "aperture": 0.0 },
            "scene": { "objects": [
                { "name": "lamp", "center": [0.0, 2.0, -8.0], "material": { "kind": "light" },
                  "albedo": [0.0, 0.0, 0.0], "emission": [10.0, 10.0, 10.0],
                  "motion": { "amplitude": [1.0, 0.0, 0.0], "frequency": [2.0, 0.0, 0.0] } },
                { "name": "ball", "center": [0.0, 0.0, -8.0], "radius": 0.5,
                  "material": { "kind": "metal", "fuzz": 0.2 }, "textured": true }
            ] }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.render.width, 64);
        assert_eq!(settings.render.samples_per_pixel, 8);
        assert_eq!(settings.render.exposure, 5.0);
        assert_eq!(settings.camera.position, Vec3::Y);
        assert_eq!(settings.camera.focal_length, 10.0);

        let scene = settings.scene().unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.at(0.0).light_count(), 1);
    }

    #[test]
    fn test_invalid_scene_is_rejected() {
        let json = r#"{ "scene": { "objects": [
            { "center": [0.0, 0.0, -5.0], "radius": -1.0, "material": { "kind": "cosine_diffuse" } }
        ] } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(settings.scene().is_err());
    }

    #[test]
    fn test_skewed_camera_is_repaired() {
        let mut settings = Settings::default();
        settings.camera.up = Vec3::new(0.0, 2.0, 0.3);
        assert!(settings.camera().is_ok());

        settings.camera.up = settings.camera.forward;
        assert!(settings.camera().is_err());

        settings.camera.up = Vec3::Y;
        settings.camera.focal_length = -1.0;
        assert!(settings.camera().is_err());
    }

    #[test]
    fn test_args_override_settings() {
        let args = Args::parse_from(["lumen", "--width", "32", "--height", "16", "--spp", "2"]);
        let settings = Settings::from_args(&args).unwrap();
        assert_eq!((settings.render.width, settings.render.height), (32, 16));
        assert_eq!(settings.render.samples_per_pixel, 2);

        let args = Args::parse_from(["lumen", "--spp", "0"]);
        assert!(Settings::from_args(&args).is_err());
    }

    #[test]
    fn test_scene_and_environment_flags() {
        let path = std::env::temp_dir().join(format!("lumen_scene_{}.json", std::process::id()));
        let json = r#"{ "objects": [
            { "center": [0.0, 0.0, -6.0], "material": { "kind": "light" }, "emission": [4.0, 4.0, 4.0] }
        ] }"#;
        fs::write(&path, json).unwrap();
        let scene_arg = path.to_string_lossy().to_string();

        let args = Args::parse_from(["lumen", "--scene", &scene_arg, "--environment", "/nonexistent/sky"]);
        let settings = Settings::from_args(&args).unwrap();
        assert_eq!(settings.scene().unwrap().len(), 1);
        assert_eq!(settings.environment, Some(CubeMapPaths::in_directory("/nonexistent/sky")));
        assert!(settings.environment().is_err());
        fs::remove_file(&path).ok();

        let args = Args::parse_from(["lumen", "--scene", "/nonexistent/scene.json"]);
        let err = Settings::from_args(&args).unwrap_err();
        assert!(format!("{err:#}").contains("loading scene"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Settings::load(Path::new("/nonexistent/lumen.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading settings"));
    }

    #[test]
    fn test_default_lookups() {
        let settings = Settings::default();
        let env = settings.environment().unwrap();
        assert_eq!(env.lookup(Vec3::Y).w, 1.0);
        let texture = settings.texture().unwrap();
        assert!(texture.albedo(lumen_math::Vec2::new(0.1, 0.1)).max_element() > 0.0);
    }
}
