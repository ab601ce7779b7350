use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Render animated sphere scenes with a CPU path tracer")]
pub struct Args {
    /// JSON settings file (render, camera, scene, texture, environment)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene description file; replaces the scene in the settings file
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Directory holding px/nx/py/ny/pz/nz.png cube map faces
    #[arg(short, long)]
    pub environment: Option<PathBuf>,

    /// Number of frames to render
    #[arg(short = 'n', long, default_value_t = 1)]
    pub frames: u32,

    /// Animation frames per second
    #[arg(long, default_value_t = 24.0)]
    pub fps: f32,

    /// Animation time of the first frame, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f32,

    /// Directory for frame_NNNN.png files
    #[arg(short, long, default_value = "frames")]
    pub output: PathBuf,

    /// Override the image width
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the image height
    #[arg(long)]
    pub height: Option<u32>,

    /// Override the samples per pixel
    #[arg(long, short = 's')]
    pub spp: Option<u32>,

    /// Logging level; RUST_LOG filters still apply on top
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["lumen"]);
        assert!(args.config.is_none());
        assert!(args.scene.is_none() && args.environment.is_none());
        assert_eq!(args.frames, 1);
        assert_eq!(args.fps, 24.0);
        assert_eq!(args.output, PathBuf::from("frames"));
        assert!(matches!(args.log_level, LogLevel::Info));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "lumen", "--config", "scene.json", "-n", "48", "--start", "1.5", "--width", "320", "--height",
            "240", "-s", "16", "--log-level", "debug", "--scene", "orbit.json", "-e", "sky",
        ]);
        assert_eq!(args.scene, Some(PathBuf::from("orbit.json")));
        assert_eq!(args.environment, Some(PathBuf::from("sky")));
        assert_eq!(args.config, Some(PathBuf::from("scene.json")));
        assert_eq!(args.frames, 48);
        assert_eq!(args.start, 1.5);
        assert_eq!((args.width, args.height, args.spp), (Some(320), Some(240), Some(16)));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_clap_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
