use ffmpeg_frame_capture::{CaptureInput, FfmpegFrameIterRgb, FfmpegFrameReaderBuilder, StreamEnd};
use image::RgbImage;
use log::{info, warn};

use super::{CaptureError, FrameSource};

/// Frames decoded by an ffmpeg child process, from a video file or a capture device.
/// The child process is killed when the source is dropped.
#[derive(Debug)]
pub struct FfmpegSource {
    input: CaptureInput,
    frames: FfmpegFrameIterRgb,
    exhausted: bool,
}

impl FfmpegSource {
    pub fn open(input: CaptureInput, fps: Option<&str>) -> Result<Self, CaptureError> {
        let mut builder = FfmpegFrameReaderBuilder::new(input.clone());
        if let Some(fps) = fps {
            builder.fps(fps);
        }

        let (frames, info) = builder.spawn_rgb().map_err(|error| CaptureError::Ffmpeg {
            input: input.to_string(),
            error,
        })?;

        let (width, height) = info.resolution();
        match info.duration() {
            Some(duration) => info!(target: "capture",
                "Opened {input} at {width}x{height}, {:.1}s long",
                duration.as_secs_f64()
            ),
            None => info!(target: "capture", "Opened live input {input} at {width}x{height}"),
        }

        Ok(Self {
            input,
            frames,
            exhausted: false,
        })
    }

    pub fn input(&self) -> &CaptureInput {
        &self.input
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.frames.resolution()
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        if self.exhausted {
            return None;
        }

        let frame = self.frames.next();
        if frame.is_none() {
            self.exhausted = true;
            log_stream_end(&self.input, self.frames.stream_end(), self.frames.frames_read());
        }

        frame
    }
}

fn log_stream_end(input: &CaptureInput, end: Option<StreamEnd>, frames_read: u64) {
    match end {
        Some(StreamEnd::Finished) => {
            info!(target: "capture", "Reached the end of {input} after {frames_read} frames")
        }
        Some(end) => warn!(target: "capture",
            "Frame capture from {input} stopped after {frames_read} frames: {end}"
        ),
        None => warn!(target: "capture",
            "Frame capture from {input} stopped after {frames_read} frames"
        ),
    }
}
