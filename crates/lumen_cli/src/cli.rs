use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Built-in demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Closed box with a ceiling light, a mirror and a glass sphere
    Cornell,
    /// Spheres and quads on a ground plane under a point and an area light
    Spheres,
    /// Triangulated height field, enough geometry to exercise the BSP tree
    Terrain,
    /// Fog and smoke volumes lit through a glass sphere
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntegratorKind {
    Whitted,
    Path,
    Direct,
    Bdpt,
}

impl IntegratorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Whitted => "whitted",
            Self::Path => "path",
            Self::Direct => "direct",
            Self::Bdpt => "bdpt",
        }
    }
}

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

/// Command line arguments. Flags override the settings file.
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Render a demo scene with a choice of light transport integrators")]
pub struct Args {
    #[arg(long, value_enum, default_value = "cornell")]
    pub scene: SceneKind,

    /// Integrator; overrides the one in the settings file
    #[arg(long, value_enum)]
    pub integrator: Option<IntegratorKind>,

    /// Samples per pixel
    #[arg(long, short = 's')]
    pub spp: Option<u32>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads; rayon's default when absent
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// JSON render settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[arg(long, short = 'o', default_value = "out.png")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let args = Args::parse_from([
            "lumen",
            "--scene",
            "terrain",
            "--integrator",
            "bdpt",
            "--spp",
            "8",
            "--threads",
            "2",
        ]);
        assert_eq!(args.scene, SceneKind::Terrain);
        assert_eq!(args.integrator, Some(IntegratorKind::Bdpt));
        assert_eq!(args.spp, Some(8));
        assert_eq!(args.threads, Some(2));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert!(args.width.is_none());
    }
}
