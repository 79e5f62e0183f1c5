use std::path::PathBuf;

use ffmpeg_frame_capture::FfmpegError;
use thiserror::Error;

/// Reasons a frame source could not be opened. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// ffmpeg/ffprobe could not open or decode the input.
    #[error("Failed to open capture input {input}: {error}")]
    Ffmpeg { input: String, error: FfmpegError },

    /// Video files and devices are decoded by ffmpeg, which is not installed.
    #[error("ffmpeg and ffprobe must be on the PATH to read {0}")]
    FfmpegUnavailable(String),

    /// The frame directory could not be listed.
    #[error("Failed to read frame directory {}: {error}", .path.display())]
    ReadDir {
        path: PathBuf,
        error: std::io::Error,
    },

    /// The frame directory contains no image files.
    #[error("No image files found in {}", .0.display())]
    EmptyDirectory(PathBuf),
}
