/// Render settings and command line parsing
use std::io;
use std::path::PathBuf;

use nalgebra::Vector3;
use rtmesh_core::{ProjectionMode, RotationState};

pub const USAGE: &str = "Usage: rtmesh-terminal [--smooth] [--ortho] [FILE.stl]";

/// Settings for the terminal preview
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub target_fps: u32,
    /// Rotation added every frame (radians)
    pub spin: RotationState,
    /// Direction towards the light
    pub light: Vector3<f64>,
    /// Width over height of one terminal cell
    pub cell_aspect: f64,
    /// Interpolate generated vertex normals instead of flat shading
    pub smooth: bool,
    pub projection: ProjectionMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            spin: RotationState::new(0.01, 0.015, 0.0),
            light: Vector3::new(0.4, 0.6, 1.0).normalize(),
            cell_aspect: 0.5,
            smooth: false,
            projection: ProjectionMode::Perspective,
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: RenderConfig,
    pub stl: Option<PathBuf>,
}

impl Options {
    /// Parse arguments, excluding the program name
    pub fn parse<I>(args: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--smooth" => options.config.smooth = true,
                "--ortho" => options.config.projection = ProjectionMode::Orthographic,
                flag if flag.starts_with("--") => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("unknown option {}\n{}", flag, USAGE),
                    ));
                }
                path => {
                    if options.stl.is_some() {
                        return Err(io::Error::new(io::ErrorKind::InvalidInput, USAGE));
                    }
                    options.stl = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}
