mod capture_error;
mod ffmpeg_source;
mod image_dir_source;

use std::path::PathBuf;

use ffmpeg_frame_capture::{ffmpeg_and_ffprobe_are_callable, CaptureInput};
use image::RgbImage;

pub use capture_error::CaptureError;
pub use ffmpeg_source::FfmpegSource;
pub use image_dir_source::ImageDirSource;

/// A sequence of frames, finite (a file) or not (a camera).
///
/// End of stream is reported as `None`, never as an error. Sources own whatever capture
/// handle they use and release it when dropped.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Option<RgbImage> {
        (**self).next_frame()
    }
}

/// Frames from any iterator of images.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    frames: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = RgbImage>,
{
    pub fn new(frames: impl IntoIterator<Item = RgbImage, IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I> FrameSource for IterSource<I>
where
    I: Iterator<Item = RgbImage>,
{
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.frames.next()
    }
}

/// What the user asked to capture from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A video file, or a directory of still frames.
    Path(PathBuf),
    /// A capture device, opened with the given ffmpeg input format.
    Device { format: String, name: String },
}

/// Open the source described by `spec`. `fps` resamples ffmpeg inputs and is ignored for
/// image directories.
pub fn open_source(
    spec: &SourceSpec,
    fps: Option<&str>,
) -> Result<Box<dyn FrameSource>, CaptureError> {
    let input = match spec {
        SourceSpec::Path(path) if path.is_dir() => {
            return Ok(Box::new(ImageDirSource::open(path)?));
        }
        SourceSpec::Path(path) => CaptureInput::file(path.clone()),
        SourceSpec::Device { format, name } => CaptureInput::device(format.clone(), name.clone()),
    };

    if !ffmpeg_and_ffprobe_are_callable() {
        return Err(CaptureError::FfmpegUnavailable(input.to_string()));
    }

    Ok(Box::new(FfmpegSource::open(input, fps)?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_iter_source_ends_with_none() {
        let frames = vec![RgbImage::new(2, 2), RgbImage::new(2, 2)];
        let mut source = IterSource::new(frames);

        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn FrameSource> =
            Box::new(IterSource::new(vec![RgbImage::new(1, 1)]));
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nothing_here");
        let spec = SourceSpec::Path(missing);

        // not a directory, so this goes to ffmpeg, which either is absent or cannot open it.
        assert!(open_source(&spec, None).is_err());
    }
}
