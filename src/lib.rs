//! # Overview
//! debris_tracker is a library for counting small moving objects (space debris, satellites,
//! meteors) in a telescope or camera feed, frame by frame.
//!
//! # How it works
//! Each frame goes through the following steps:
//! * The frame is converted to luma, and a background model separates the foreground (see
//!   [`BackgroundKind`]). The default model is a running average of previous frames, so
//!   stars and other static features fade into the background.
//! * The foreground mask is median filtered to remove single-pixel sensor noise.
//! * Connected foreground regions are found, and those whose pixel area lies within the
//!   configured [`Thresholds`] are counted.
//!
//! The count for every frame, and the centroid and area of every counted region, are kept in
//! a [`SessionState`] and can be exported to CSV or plotted.
//!
//! # High Level API
//! ```rust
//! use debris_tracker::{Detector, IterSource, SessionState, Tracker};
//! use image::{Rgb, RgbImage};
//!
//! let mut frames = vec![RgbImage::new(64, 64); 3];
//! for y in 20..30 {
//!     for x in 20..30 {
//!         frames[2].put_pixel(x, y, Rgb([255, 255, 255]));
//!     }
//! }
//!
//! let mut tracker = Tracker::new(
//!     IterSource::new(frames),
//!     Detector::default(),
//!     SessionState::default(),
//! );
//! while let Some(_count) = tracker.process_next_frame().unwrap() {}
//!
//! let counts = tracker.session().counts();
//! assert_eq!(counts.len(), 3);
//! assert_eq!(counts[2].region_count, 1);
//! ```
//!
//! The interactive numbered menu is [`run_menu`].
//!
//! # Prerequisites
//! Video files and capture devices are decoded by calling Ffmpeg from the command line, so
//! `ffmpeg` and `ffprobe` must be on the PATH to use [`FfmpegSource`]. The window display
//! additionally needs `ffplay`. Directories of still images and in-memory frames need neither.

pub mod annotate;
pub mod definitions;
pub mod detection;
pub mod export;
pub mod frame_source;
pub mod menu;
pub mod session;

pub use annotate::{annotate, FfplayDisplay, FrameDisplay, NoDisplay, PreviewFileDisplay};
pub use detection::{BackgroundKind, BackgroundSubtractor, Bounds, Detector, DetectorCfg, Region};
pub use export::{
    export_csv, export_sightings_csv, load_csv, load_sightings_csv, plot_counts,
    render_counts_chart, ExportError, PlotError,
};
pub use frame_source::{
    open_source, CaptureError, FfmpegSource, FrameSource, ImageDirSource, IterSource, SourceSpec,
};
pub use menu::{run_menu, Command, MenuState, Tracker, TrackerPaths};
pub use session::{ConfigError, FrameCount, RecordError, SessionState, Sighting, Thresholds};
