//! Foreground extraction and region counting.

pub mod background;
mod detector;
mod region;

#[cfg(test)]
mod test;

pub use background::{BackgroundKind, BackgroundSubtractor};
pub use detector::{Detector, DetectorCfg};
pub use region::{all_regions, regions_in_mask, Bounds, Region};
