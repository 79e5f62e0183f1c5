use std::path::PathBuf;

use log::warn;

use crate::{
    annotate::{annotate, FrameDisplay, NoDisplay},
    definitions::{DEFAULT_CSV_PATH, DEFAULT_DETECTIONS_PATH, DEFAULT_PLOT_PATH},
    detection::Detector,
    export::{self, ExportError, PlotError},
    frame_source::FrameSource,
    session::{FrameCount, RecordError, SessionState},
};

/// Where the menu's save, plot and load commands read and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerPaths {
    pub counts_csv: PathBuf,
    pub sightings_csv: PathBuf,
    pub plot: PathBuf,
}

impl Default for TrackerPaths {
    fn default() -> Self {
        Self {
            counts_csv: PathBuf::from(DEFAULT_CSV_PATH),
            sightings_csv: PathBuf::from(DEFAULT_DETECTIONS_PATH),
            plot: PathBuf::from(DEFAULT_PLOT_PATH),
        }
    }
}

/// A frame source wired up to a detector, a display and the session it records into.
pub struct Tracker<S> {
    source: S,
    detector: Detector,
    display: Box<dyn FrameDisplay>,
    session: SessionState,
    paths: TrackerPaths,
    save_on_exit: bool,
}

impl<S: FrameSource> Tracker<S> {
    pub fn new(source: S, detector: Detector, session: SessionState) -> Self {
        Self {
            source,
            detector,
            display: Box::new(NoDisplay),
            session,
            paths: TrackerPaths::default(),
            save_on_exit: false,
        }
    }

    pub fn with_display(mut self, display: impl FrameDisplay + 'static) -> Self {
        self.display = Box::new(display);
        self
    }

    pub fn with_paths(mut self, paths: TrackerPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Save both CSV files when the menu exits, if anything was recorded.
    pub fn with_save_on_exit(mut self, save_on_exit: bool) -> Self {
        self.save_on_exit = save_on_exit;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn paths(&self) -> &TrackerPaths {
        &self.paths
    }

    pub fn saves_on_exit(&self) -> bool {
        self.save_on_exit
    }

    pub fn into_session(self) -> SessionState {
        self.session
    }

    /// Pull, detect, show and record one frame. Returns `Ok(None)` once the source is exhausted.
    pub fn process_next_frame(&mut self) -> Result<Option<FrameCount>, RecordError> {
        let Some(frame) = self.source.next_frame() else {
            return Ok(None);
        };

        let frame_index = self.session.next_frame_index();
        let regions = self.detector.detect(&frame, self.session.thresholds());

        if let Some(annotated) = annotate(&frame, &regions, self.session.visualization()) {
            if let Err(e) = self.display.show(&annotated) {
                warn!("Frame {frame_index} not shown: {e}");
            }
        }

        self.session.record_detections(frame_index, &regions).map(Some)
    }

    pub fn save_data(&self) -> Result<(), ExportError> {
        export::export_csv(self.session.counts(), &self.paths.counts_csv)?;
        export::export_sightings_csv(self.session.sightings(), &self.paths.sightings_csv)
    }

    pub fn plot(&self) -> Result<(), PlotError> {
        export::plot_counts(self.session.counts(), &self.paths.plot)
    }

    /// Replace the recorded counts and sightings with the ones in the two CSV files.
    /// Returns how many of each were loaded. Nothing changes if either file is rejected.
    pub fn load_data(&mut self) -> Result<(usize, usize), ExportError> {
        let counts = export::load_csv(&self.paths.counts_csv)?;
        let sightings = export::load_sightings_csv(&self.paths.sightings_csv)?;
        let loaded = (counts.len(), sightings.len());

        self.session.replace_records(counts, sightings)?;
        self.detector.reset();
        Ok(loaded)
    }
}
