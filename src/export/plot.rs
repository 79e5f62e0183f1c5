use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut},
    rect::Rect,
};
use log::info;

use super::PlotError;
use crate::{
    definitions::{PLOT_GRID_LINES, PLOT_HEIGHT, PLOT_MARGIN, PLOT_WIDTH},
    session::FrameCount,
};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([135, 206, 235]);

//fraction of each frame's slot that its bar fills
const BAR_FILL: f32 = 0.8;

/// Bar chart of region count against frame index. Bars are scaled so the busiest frame
/// reaches the top of the plot area.
pub fn render_counts_chart(records: &[FrameCount]) -> Result<RgbImage, PlotError> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(PlotError::NoData);
    };

    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, BACKGROUND);

    let left = PLOT_MARGIN as f32;
    let right = (PLOT_WIDTH - PLOT_MARGIN) as f32;
    let top = PLOT_MARGIN as f32;
    let bottom = (PLOT_HEIGHT - PLOT_MARGIN) as f32;
    let plot_w = right - left;
    let plot_h = bottom - top;

    for line in 1..=PLOT_GRID_LINES {
        let y = bottom - plot_h * line as f32 / PLOT_GRID_LINES as f32;
        draw_line_segment_mut(&mut img, (left, y), (right, y), GRID);
    }

    //indices may span the whole u64 range
    let first_index = first.frame_index.min(last.frame_index);
    let span = last.frame_index.abs_diff(first.frame_index).saturating_add(1);
    let slot_w = plot_w / span as f32;
    let bar_w = (slot_w * BAR_FILL).max(1.0);
    let max_count = records.iter().map(|r| r.region_count).max().unwrap_or(0);

    if max_count > 0 {
        for rec in records {
            let bar_h = (rec.region_count as f32 / max_count as f32 * plot_h).round() as u32;
            if bar_h == 0 {
                continue;
            }

            let slot = rec.frame_index.saturating_sub(first_index) as f32;
            let x = left + slot * slot_w + (slot_w - bar_w) / 2.0;
            let y = bottom as u32 - bar_h;

            let rect = Rect::at(x.round() as i32, y as i32).of_size(bar_w.round() as u32, bar_h);
            draw_filled_rect_mut(&mut img, rect, BAR);
        }
    }

    draw_line_segment_mut(&mut img, (left, top), (left, bottom), AXIS);
    draw_line_segment_mut(&mut img, (left, bottom), (right, bottom), AXIS);

    Ok(img)
}

/// Render the chart and save it. The image format follows the file extension.
pub fn plot_counts(records: &[FrameCount], path: impl AsRef<Path>) -> Result<(), PlotError> {
    let path = path.as_ref();
    let chart = render_counts_chart(records)?;

    chart.save(path).map_err(|error| PlotError::Io {
        path: path.to_path_buf(),
        error,
    })?;

    info!("Saved plot of {} frames to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_data() {
        assert!(matches!(render_counts_chart(&[]), Err(PlotError::NoData)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.png");
        assert!(matches!(plot_counts(&[], &path), Err(PlotError::NoData)));
        assert!(!path.exists());
    }

    #[test]
    fn test_single_bar_fills_plot_height() {
        let chart = render_counts_chart(&[FrameCount::new(1, 5)]).unwrap();

        assert_eq!(chart.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));
        assert_eq!(chart.get_pixel(10, 10), &BACKGROUND);
        assert_eq!(chart.get_pixel(500, 300), &BAR);
        assert_eq!(chart.get_pixel(500, PLOT_MARGIN), &BAR);
        assert_eq!(chart.get_pixel(500, PLOT_MARGIN - 1), &BACKGROUND);
        assert_eq!(chart.get_pixel(PLOT_MARGIN, 300), &AXIS);
        assert_eq!(chart.get_pixel(500, PLOT_HEIGHT - PLOT_MARGIN), &AXIS);
    }

    #[test]
    fn test_bars_scaled_to_busiest_frame() {
        let records = [FrameCount::new(1, 10), FrameCount::new(2, 5)];
        let chart = render_counts_chart(&records).unwrap();

        //two slots of 450px: bars centred at x=275 and x=725
        let bottom = PLOT_HEIGHT - PLOT_MARGIN;
        assert_eq!(chart.get_pixel(275, bottom - 490), &BAR);
        assert_eq!(chart.get_pixel(725, bottom - 240), &BAR);
        assert_ne!(chart.get_pixel(725, bottom - 260), &BAR);
    }

    #[test]
    fn test_full_index_range() {
        let records = [FrameCount::new(0, 1), FrameCount::new(u64::MAX, 2)];
        let chart = render_counts_chart(&records).unwrap();

        assert_eq!(chart.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));
        assert!(chart.pixels().any(|p| *p == BAR));
    }

    #[test]
    fn test_all_zero_counts() {
        let records = [FrameCount::new(1, 0), FrameCount::new(2, 0)];
        let chart = render_counts_chart(&records).unwrap();
        assert!(chart.pixels().all(|p| *p != BAR));
    }

    #[test]
    fn test_plot_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.png");

        plot_counts(&[FrameCount::new(1, 2), FrameCount::new(2, 3)], &path).unwrap();
        let saved = image::open(&path).unwrap();
        assert_eq!(saved.width(), PLOT_WIDTH);
        assert_eq!(saved.height(), PLOT_HEIGHT);
    }

    #[test]
    fn test_plot_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("plot.png");
        assert!(matches!(
            plot_counts(&[FrameCount::new(1, 1)], &path),
            Err(PlotError::Io { .. })
        ));
    }
}
