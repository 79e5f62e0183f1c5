//! Drawing detections onto frames, and showing the result.

mod display;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};

use crate::detection::Region;

pub use display::{DisplayError, FfplayDisplay, FrameDisplay, NoDisplay, PreviewFileDisplay};

const BOX_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_COLOUR: Rgb<u8> = Rgb([0, 0, 255]);
const CENTROID_RADIUS: i32 = 3;

/// Returns a copy of `frame` with a box around each region and a dot on its centroid,
/// or `None` without doing any work when visualization is disabled.
pub fn annotate(frame: &RgbImage, regions: &[Region], enabled: bool) -> Option<RgbImage> {
    if !enabled {
        return None;
    }

    let mut ret = frame.clone();
    for region in regions {
        draw_hollow_rect_mut(&mut ret, region.bounds.as_rect(), BOX_COLOUR);

        let (x, y) = region.centroid;
        let centre = (x.round() as i32, y.round() as i32);
        draw_filled_circle_mut(&mut ret, centre, CENTROID_RADIUS, CENTROID_COLOUR);
    }

    Some(ret)
}
