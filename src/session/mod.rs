mod config_error;
mod thresholds;

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, info};
use thiserror::Error;

use crate::{
    definitions::{DEFAULT_VISUALIZATION, FIRST_FRAME_INDEX},
    detection::Region,
};

pub use config_error::ConfigError;
pub use thresholds::Thresholds;

/// Number of regions counted in one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameCount {
    pub frame_index: u64,
    pub region_count: u32,
}

impl FrameCount {
    pub fn new(frame_index: u64, region_count: u32) -> Self {
        Self {
            frame_index,
            region_count,
        }
    }
}

/// One counted region: where it was, how big it was, and when it was seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub frame_index: u64,
    pub x: f64,
    pub y: f64,
    pub area: u32,
    /// Wall clock time, to the millisecond.
    pub detected_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("Frame {index} cannot be recorded after frame {last}: frame indices must increase")]
    OutOfOrder { index: u64, last: u64 },

    #[error("Sighting in frame {index} listed after frame {last}: sightings must be in frame order")]
    SightingOutOfOrder { index: u64, last: u64 },

    #[error("Sighting in frame {index}, which has no frame count")]
    UnknownFrame { index: u64 },
}

/// Everything the tracker remembers between menu commands.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    thresholds: Thresholds,
    visualization: bool,
    counts: Vec<FrameCount>,
    sightings: Vec<Sighting>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Thresholds::default(), DEFAULT_VISUALIZATION)
    }
}

impl SessionState {
    pub fn new(thresholds: Thresholds, visualization: bool) -> Self {
        Self {
            thresholds,
            visualization,
            counts: vec![],
            sightings: vec![],
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn visualization(&self) -> bool {
        self.visualization
    }

    /// Per-frame counts, in increasing frame index order.
    pub fn counts(&self) -> &[FrameCount] {
        &self.counts
    }

    pub fn sightings(&self) -> &[Sighting] {
        &self.sightings
    }

    pub fn set_min_area(&mut self, value: i64) -> Result<Thresholds, ConfigError> {
        let min_area = ConfigError::check_area(value)?;
        self.thresholds = self.thresholds.with_min_area(min_area)?;
        info!("Minimum area set to {min_area}.");
        Ok(self.thresholds)
    }

    pub fn set_max_area(&mut self, value: i64) -> Result<Thresholds, ConfigError> {
        let max_area = ConfigError::check_area(value)?;
        self.thresholds = self.thresholds.with_max_area(max_area)?;
        info!("Maximum area set to {max_area}.");
        Ok(self.thresholds)
    }

    /// Flip the visualization flag and return the new value.
    pub fn toggle_visualization(&mut self) -> bool {
        self.visualization = !self.visualization;
        let state = if self.visualization {
            "enabled"
        } else {
            "disabled"
        };
        info!("Visualization {state}.");
        self.visualization
    }

    /// The index the next processed frame should be recorded under. Saturates at `u64::MAX`,
    /// where recording fails with [`RecordError::OutOfOrder`].
    pub fn next_frame_index(&self) -> u64 {
        self.counts
            .last()
            .map_or(FIRST_FRAME_INDEX, |last| last.frame_index.saturating_add(1))
    }

    pub fn record_frame(&mut self, frame_index: u64, region_count: u32) -> Result<(), RecordError> {
        if let Some(last) = self.counts.last() {
            if frame_index <= last.frame_index {
                return Err(RecordError::OutOfOrder {
                    index: frame_index,
                    last: last.frame_index,
                });
            }
        }

        self.counts.push(FrameCount::new(frame_index, region_count));
        Ok(())
    }

    /// Record the count for a frame together with a sighting for each of its regions,
    /// stamped with the current time.
    pub fn record_detections(
        &mut self,
        frame_index: u64,
        regions: &[Region],
    ) -> Result<FrameCount, RecordError> {
        self.record_detections_at(frame_index, regions, Utc::now().trunc_subsecs(3))
    }

    pub fn record_detections_at(
        &mut self,
        frame_index: u64,
        regions: &[Region],
        detected_at: DateTime<Utc>,
    ) -> Result<FrameCount, RecordError> {
        let region_count = u32::try_from(regions.len()).unwrap_or(u32::MAX);
        self.record_frame(frame_index, region_count)?;

        self.sightings.extend(regions.iter().map(|region| Sighting {
            frame_index,
            x: region.centroid.0,
            y: region.centroid.1,
            area: region.area,
            detected_at,
        }));

        debug!("frame {frame_index}: {region_count} regions");
        Ok(FrameCount::new(frame_index, region_count))
    }

    /// Replace all records with previously exported ones. Counts must be in strictly
    /// increasing frame order, and every sighting must belong to one of the counted frames.
    /// Nothing changes if either list is rejected.
    pub fn replace_records(
        &mut self,
        counts: Vec<FrameCount>,
        sightings: Vec<Sighting>,
    ) -> Result<(), RecordError> {
        for (prev, next) in counts.iter().zip(counts.iter().skip(1)) {
            if next.frame_index <= prev.frame_index {
                return Err(RecordError::OutOfOrder {
                    index: next.frame_index,
                    last: prev.frame_index,
                });
            }
        }

        for (prev, next) in sightings.iter().zip(sightings.iter().skip(1)) {
            if next.frame_index < prev.frame_index {
                return Err(RecordError::SightingOutOfOrder {
                    index: next.frame_index,
                    last: prev.frame_index,
                });
            }
        }

        if let Some(orphan) = sightings.iter().find(|s| {
            counts
                .binary_search_by_key(&s.frame_index, |c| c.frame_index)
                .is_err()
        }) {
            return Err(RecordError::UnknownFrame {
                index: orphan.frame_index,
            });
        }

        info!(
            "Loaded {} frame counts and {} sightings.",
            counts.len(),
            sightings.len()
        );
        self.counts = counts;
        self.sightings = sightings;
        Ok(())
    }
}
