use std::path::PathBuf;

use debris_tracker::{DetectorCfg, SourceSpec, TrackerPaths};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackgroundArg {
    Brightness,
    FrameDifference,
    RunningAverage,
}

// Where annotated frames go while processing
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplayKind {
    Ffplay,
    PreviewFile,
    #[value(name = "none")]
    Off,
}

#[derive(Debug, Clone)]
pub struct InputCfg {
    pub source: SourceSpec,
    pub fps: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetectionCfg {
    pub detector: DetectorCfg,
    pub min_area: u32,
    pub max_area: u32,
    pub visualization: bool,
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub display: DisplayKind,
    pub preview_path: PathBuf,
    pub paths: TrackerPaths,
    pub save_on_exit: bool,

    pub log_file: PathBuf,
    pub verbosity: ReportVerbosity,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub input_cfg: InputCfg,
    pub detection_cfg: DetectionCfg,
    pub output_cfg: OutputCfg,
}
