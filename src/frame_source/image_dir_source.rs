use std::path::{Path, PathBuf};

use image::RgbImage;
use itertools::Itertools;
use log::{info, warn};

use super::{CaptureError, FrameSource};

const IMAGE_EXTS: [&str; 10] = [
    "png", "jpg", "jpeg", "bmp", "tif", "tiff", "gif", "webp", "pgm", "ppm",
];

/// Still frames read from a directory in file name order, e.g. an exported image sequence
/// from a telescope camera.
#[derive(Debug, Clone)]
pub struct ImageDirSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();

        let entries = std::fs::read_dir(dir).map_err(|error| CaptureError::ReadDir {
            path: dir.to_path_buf(),
            error,
        })?;

        let paths = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_image_extension(path))
            .sorted()
            .collect::<Vec<_>>();

        if paths.is_empty() {
            return Err(CaptureError::EmptyDirectory(dir.to_path_buf()));
        }

        info!(target: "capture", "Found {} frames in {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        loop {
            let path = self.paths.next()?;
            match image::open(&path) {
                Ok(img) => return Some(img.to_rgb8()),
                Err(e) => warn!(target: "capture", "Skipping unreadable frame {}: {e}", path.display()),
            }
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn test_frames_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        for (name, level) in [("frame_002.png", 20u8), ("frame_001.png", 10), ("frame_003.png", 30)] {
            RgbImage::from_pixel(4, 3, Rgb([level, level, level]))
                .save(dir.join(name))
                .unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageDirSource::open(dir).unwrap();
        assert_eq!(source.remaining(), 3);

        let levels = std::iter::from_fn(|| source.next_frame())
            .map(|frame| frame.get_pixel(0, 0).0[0])
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![10, 20, 30]);
    }

    #[test]
    fn test_unreadable_frames_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        std::fs::write(dir.join("a.png"), "garbage").unwrap();
        RgbImage::new(2, 2).save(dir.join("b.png")).unwrap();

        let mut source = ImageDirSource::open(dir).unwrap();
        assert_eq!(source.next_frame().map(|f| f.dimensions()), Some((2, 2)));
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();

        assert!(matches!(
            ImageDirSource::open(tmp.path()),
            Err(CaptureError::EmptyDirectory(_))
        ));
    }
}
