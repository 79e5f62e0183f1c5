use std::{ffi::OsStr, io::Write, process::Child};

use image::RgbImage;

use crate::{
    ffmpeg_ops::{spawn_ffmpeg_command, FfmpegCommandName::Ffplay},
    FfmpegError,
};

/// An ffplay window that shows raw rgb24 frames piped into its stdin.
///
/// The window size is fixed when it is spawned; frames of any other size are rejected.
#[derive(Debug)]
pub struct FfplayWindow {
    child: Child,
    dimensions: (u32, u32),
}

impl FfplayWindow {
    pub fn spawn(title: &str, (width, height): (u32, u32)) -> Result<Self, FfmpegError> {
        if width == 0 || height == 0 {
            return Err(FfmpegError::InvalidResolution);
        }

        let video_size = format!("{width}x{height}");

        #[rustfmt::skip]
        let args = [
            OsStr::new("-hide_banner"),
            OsStr::new("-loglevel"),     OsStr::new("error"),
            OsStr::new("-window_title"), OsStr::new(title),
            OsStr::new("-f"),            OsStr::new("rawvideo"),
            OsStr::new("-pixel_format"), OsStr::new("rgb24"),
            OsStr::new("-video_size"),   OsStr::new(&video_size),
            OsStr::new("-i"),            OsStr::new("-"),
        ];

        let child = spawn_ffmpeg_command(Ffplay, &args, true, true)?;

        Ok(Self {
            child,
            dimensions: (width, height),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Push one frame to the window. Fails once the user has closed the window.
    pub fn show(&mut self, frame: &RgbImage) -> Result<(), FfmpegError> {
        if frame.dimensions() != self.dimensions {
            return Err(FfmpegError::InvalidResolution);
        }

        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| FfmpegError::Io("ffplay stdin is closed".to_string()))?;

        stdin
            .write_all(frame.as_raw())
            .and_then(|()| stdin.flush())
            .map_err(|e| FfmpegError::Io(format!("{:?}", e.kind())))
    }
}

impl Drop for FfplayWindow {
    fn drop(&mut self) {
        std::mem::drop(self.child.stdin.take());
        let _kill_error = self.child.kill();
        let _wait_error = self.child.wait();
    }
}
