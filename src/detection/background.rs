use image::{GrayImage, ImageBuffer, Luma};

use crate::{
    definitions::{DEFAULT_DIFF_THRESHOLD, DEFAULT_LEARNING_RATE},
    session::ConfigError,
};

type GrayImageF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Separates moving or bright foreground from the sky behind it.
///
/// `apply` returns a binary mask (0 or 255) the same size as the input frame.
/// Models that keep history must treat a frame with new dimensions as their first frame.
pub trait BackgroundSubtractor: std::fmt::Debug {
    fn apply(&mut self, frame: &GrayImage) -> GrayImage;

    /// Forget any history.
    fn reset(&mut self);
}

/// Which background model to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundKind {
    Brightness,
    FrameDifference,
    RunningAverage { learning_rate: f32 },
}

impl Default for BackgroundKind {
    fn default() -> Self {
        Self::RunningAverage {
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl BackgroundKind {
    /// # errors
    /// * A running-average learning rate outside `(0, 1]`, or not finite.
    pub fn build(self, threshold: u8) -> Result<Box<dyn BackgroundSubtractor>, ConfigError> {
        let ret: Box<dyn BackgroundSubtractor> = match self {
            Self::Brightness => Box::new(Brightness::new(threshold)),
            Self::FrameDifference => Box::new(FrameDifference::new(threshold)),
            Self::RunningAverage { learning_rate } => {
                Box::new(RunningAverage::new(threshold, learning_rate)?)
            }
        };
        Ok(ret)
    }
}

/// Anything at least as bright as the threshold is foreground.
#[derive(Debug, Clone)]
pub struct Brightness {
    threshold: u8,
}

impl Brightness {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl BackgroundSubtractor for Brightness {
    fn apply(&mut self, frame: &GrayImage) -> GrayImage {
        let mut ret = GrayImage::new(frame.width(), frame.height());
        for (&Luma([pix]), ret_pix) in frame.pixels().zip(ret.pixels_mut()) {
            if pix >= self.threshold {
                *ret_pix = FOREGROUND;
            }
        }
        ret
    }

    fn reset(&mut self) {}
}

/// Foreground is whatever changed by at least the threshold since the previous frame.
#[derive(Debug, Clone)]
pub struct FrameDifference {
    threshold: u8,
    previous: Option<GrayImage>,
}

impl FrameDifference {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }
}

impl BackgroundSubtractor for FrameDifference {
    fn apply(&mut self, frame: &GrayImage) -> GrayImage {
        let mut ret = GrayImage::new(frame.width(), frame.height());

        if let Some(previous) = self
            .previous
            .as_ref()
            .filter(|prev| prev.dimensions() == frame.dimensions())
        {
            for ((&Luma([a_pix]), &Luma([b_pix])), ret_pix) in
                previous.pixels().zip(frame.pixels()).zip(ret.pixels_mut())
            {
                if a_pix.abs_diff(b_pix) >= self.threshold {
                    *ret_pix = FOREGROUND;
                }
            }
        }

        self.previous = Some(frame.clone());
        ret
    }

    fn reset(&mut self) {
        self.previous = None;
    }
}

/// Foreground is whatever differs by at least the threshold from an exponentially
/// weighted average of past frames. Anything that stays still long enough fades
/// into the background.
#[derive(Debug, Clone)]
pub struct RunningAverage {
    threshold: u8,
    learning_rate: f32,
    background: Option<GrayImageF32>,
}

impl Default for RunningAverage {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DIFF_THRESHOLD,
            learning_rate: DEFAULT_LEARNING_RATE,
            background: None,
        }
    }
}

impl RunningAverage {
    /// The learning rate must lie in `(0, 1]`.
    pub fn new(threshold: u8, learning_rate: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold,
            learning_rate: ConfigError::check_learning_rate(learning_rate)?,
            background: None,
        })
    }

    fn seed(frame: &GrayImage) -> GrayImageF32 {
        let mut bg = GrayImageF32::new(frame.width(), frame.height());
        for (Luma([bg_pix]), &Luma([pix])) in bg.pixels_mut().zip(frame.pixels()) {
            *bg_pix = f32::from(pix);
        }
        bg
    }
}

impl BackgroundSubtractor for RunningAverage {
    fn apply(&mut self, frame: &GrayImage) -> GrayImage {
        let mut ret = GrayImage::new(frame.width(), frame.height());

        let stale = self
            .background
            .as_ref()
            .map_or(true, |bg| bg.dimensions() != frame.dimensions());
        if stale {
            self.background = Some(Self::seed(frame));
            return ret;
        }
        let Some(background) = self.background.as_mut() else {
            return ret;
        };

        let thresh = f32::from(self.threshold);
        let rate = self.learning_rate;
        for ((Luma([bg_pix]), &Luma([pix])), ret_pix) in background
            .pixels_mut()
            .zip(frame.pixels())
            .zip(ret.pixels_mut())
        {
            let pix = f32::from(pix);
            if (pix - *bg_pix).abs() >= thresh {
                *ret_pix = FOREGROUND;
            } else {
                *ret_pix = BACKGROUND;
            }
            *bg_pix += rate * (pix - *bg_pix);
        }

        ret
    }

    fn reset(&mut self) {
        self.background = None;
    }
}
