/// The default smallest region, in pixels, that is counted as debris. Regions of exactly this
/// area are counted.
pub const DEFAULT_MIN_AREA: u32 = 50;

/// The default largest region, in pixels, that is counted as debris. Regions of exactly this
/// area are counted. Anything bigger is usually a cloud, the moon, or the telescope moving.
pub const DEFAULT_MAX_AREA: u32 = 1000;

/// Whether annotated frames are shown when the tracker starts.
pub const DEFAULT_VISUALIZATION: bool = true;

/// Difference from the background (in 8-bit luma levels) at or above which a pixel is
/// considered foreground. For the brightness model this is the absolute luma level instead.
///
/// Recommended range: 10-60. Lower values pick up sensor noise as debris.
pub const DEFAULT_DIFF_THRESHOLD: u8 = 30;

/// Fraction of each new frame blended into the running-average background.
/// Higher values forget stationary objects faster, but also absorb slow-moving debris.
///
/// Recommended range: 0.01-0.2
pub const DEFAULT_LEARNING_RATE: f32 = 0.05;

/// Radius of the median filter applied to the foreground mask to remove speckle.
/// A radius of 2 is a 5x5 window. 0 disables filtering.
pub const DEFAULT_MEDIAN_RADIUS: u32 = 2;

/// Index given to the first processed frame.
pub const FIRST_FRAME_INDEX: u64 = 1;

//plot geometry
pub const PLOT_WIDTH: u32 = 1000;
pub const PLOT_HEIGHT: u32 = 600;
pub const PLOT_MARGIN: u32 = 50;
pub const PLOT_GRID_LINES: u32 = 5;

pub const DEFAULT_CSV_PATH: &str = "debris_counts.csv";
pub const DEFAULT_DETECTIONS_PATH: &str = "debris_positions.csv";
pub const DEFAULT_PLOT_PATH: &str = "debris_counts.png";
pub const DEFAULT_PREVIEW_PATH: &str = "debris_preview.png";
