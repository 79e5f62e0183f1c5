use image::{GrayImage, RgbImage};
use log::trace;

use super::{
    background::{BackgroundKind, BackgroundSubtractor, RunningAverage},
    region::{regions_in_mask, Region},
};
use crate::{
    definitions::{DEFAULT_DIFF_THRESHOLD, DEFAULT_MEDIAN_RADIUS},
    session::{ConfigError, Thresholds},
};

/// How foreground is separated from the sky before regions are counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorCfg {
    pub background: BackgroundKind,
    /// A pixel is foreground when its difference from the background is at least this.
    pub diff_threshold: u8,
    /// Radius of the median filter applied to the mask. 0 disables it.
    pub median_radius: u32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            background: BackgroundKind::default(),
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            median_radius: DEFAULT_MEDIAN_RADIUS,
        }
    }
}

#[derive(Debug)]
pub struct Detector {
    subtractor: Box<dyn BackgroundSubtractor>,
    median_radius: u32,
}

impl Default for Detector {
    fn default() -> Self {
        Self::with_subtractor(Box::new(RunningAverage::default()), DEFAULT_MEDIAN_RADIUS)
    }
}

impl Detector {
    pub fn new(cfg: DetectorCfg) -> Result<Self, ConfigError> {
        let subtractor = cfg.background.build(cfg.diff_threshold)?;
        Ok(Self::with_subtractor(subtractor, cfg.median_radius))
    }

    pub fn with_subtractor(subtractor: Box<dyn BackgroundSubtractor>, median_radius: u32) -> Self {
        Self {
            subtractor,
            median_radius,
        }
    }

    /// Binary foreground mask for one frame, after the median filter.
    pub fn foreground_mask(&mut self, frame: &RgbImage) -> GrayImage {
        let luma = image::imageops::grayscale(frame);
        let mask = self.subtractor.apply(&luma);

        if self.median_radius > 0 {
            imageproc::filter::median_filter(&mask, self.median_radius, self.median_radius)
        } else {
            mask
        }
    }

    /// Find the regions in the frame whose area lies within the thresholds.
    pub fn detect(&mut self, frame: &RgbImage, thresholds: Thresholds) -> Vec<Region> {
        if frame.width() == 0 || frame.height() == 0 {
            return vec![];
        }

        let mask = self.foreground_mask(frame);
        let regions = regions_in_mask(&mask, thresholds);

        trace!(
            "{} regions within {:?} in {}x{} frame",
            regions.len(),
            thresholds.as_range(),
            frame.width(),
            frame.height()
        );

        regions
    }

    pub fn reset(&mut self) {
        self.subtractor.reset();
    }
}
