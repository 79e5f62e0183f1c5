use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::VideoInfoError;

/// Various causes of failure for ffmpeg/ffprobe/ffplay functions.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FfmpegError {
    /// The command was not found. Make sure ffmpeg is installed and can be found on the command line.
    #[error("{0} not found. Make sure ffmpeg/ffprobe/ffplay are installed and visible on the command line")]
    CommandNotFound(String),

    /// Io error occurred while executing or talking to the command
    #[error("Ffmpeg IO error: {0}")]
    Io(String),

    /// The command returned a nonzero exit code. Because ffmpeg sometimes prints long error strings
    /// to stderr, The resulting string contains the first few hundred characters of the error message.
    #[error("Internal Ffmpeg Failure: {0}")]
    FfmpegInternal(String),

    /// The command did not finish within the allowed time.
    #[error("{0} timed out")]
    Timeout(String),

    /// Failed to interpret command output as a utf8-string.
    #[error("utf8 parsing/conversion failure")]
    Utf8Conversion,

    /// Ffprobe reported a zero width or height for the input. This usually means the input
    /// has no video stream (for instance an audio file), or the capture device is not a camera.
    #[error("Input has no usable video resolution")]
    InvalidResolution,

    /// Failed to obtain video information.
    #[error("Failed to get video properties")]
    Info(#[from] VideoInfoError),
}
