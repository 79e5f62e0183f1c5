use std::path::{Path, PathBuf};

use ffmpeg_frame_capture::{FfmpegError, FfplayWindow};
use image::RgbImage;
use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Display window failed: {0}")]
    Ffplay(#[from] FfmpegError),

    #[error("Failed to write preview image {}: {error}", path.display())]
    Preview {
        path: PathBuf,
        error: image::ImageError,
    },
}

/// Somewhere to show annotated frames.
pub trait FrameDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError>;
}

impl<T: FrameDisplay + ?Sized> FrameDisplay for Box<T> {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        (**self).show(frame)
    }
}

/// Frames are shown in an ffplay window. The window is opened on the first frame and
/// reopened whenever the frame size changes. Once the window fails (usually because the
/// user closed it) the display stays off.
#[derive(Debug)]
pub struct FfplayDisplay {
    title: String,
    window: Option<FfplayWindow>,
    disabled: bool,
}

impl FfplayDisplay {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn try_show(&mut self, frame: &RgbImage) -> Result<(), FfmpegError> {
        let window = match self.window.take() {
            Some(window) if window.dimensions() == frame.dimensions() => window,
            _ => {
                debug!(
                    "Opening display window at {}x{}",
                    frame.width(),
                    frame.height()
                );
                FfplayWindow::spawn(&self.title, frame.dimensions())?
            }
        };

        let window = self.window.insert(window);
        window.show(frame)
    }
}

impl FrameDisplay for FfplayDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        if self.disabled {
            return Ok(());
        }

        self.try_show(frame).map_err(|e| {
            warn!("Display window is unavailable, frames will no longer be shown");
            self.window = None;
            self.disabled = true;
            DisplayError::from(e)
        })
    }
}

/// Each frame overwrites the same image file, for headless machines.
#[derive(Debug, Clone)]
pub struct PreviewFileDisplay {
    path: PathBuf,
}

impl PreviewFileDisplay {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameDisplay for PreviewFileDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        frame.save(&self.path).map_err(|error| DisplayError::Preview {
            path: self.path.clone(),
            error,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl FrameDisplay for NoDisplay {
    fn show(&mut self, _frame: &RgbImage) -> Result<(), DisplayError> {
        Ok(())
    }
}
