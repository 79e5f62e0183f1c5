//! Thin wrapper around the `ffmpeg`, `ffprobe` and `ffplay` command line tools.
//!
//! Frames are decoded by an `ffmpeg` child process into raw `rgb24` buffers on its stdout,
//! which are turned into [`image::RgbImage`]s one at a time. The input may be a video file
//! or a live capture device such as a v4l2 camera.
//!
//! # Prerequisites
//! `ffmpeg` and `ffprobe` must be callable from the command line. `ffplay` is only needed
//! for [`FfplayWindow`].

mod ffmpeg_error_kind;
mod ffmpeg_ops;
mod ffmpeg_stats;
mod ffplay;

pub use ffmpeg_error_kind::FfmpegError;
pub use ffmpeg_ops::{
    ffmpeg_and_ffprobe_are_callable, CaptureInput, FfmpegFrameIterRgb, FfmpegFrameReaderBuilder,
    StreamEnd,
};
pub use ffmpeg_stats::{VideoInfo, VideoInfoError};
pub use ffplay::FfplayWindow;
