use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use rand::prelude::*;

use super::{
    background::{Brightness, FrameDifference, RunningAverage},
    BackgroundKind, BackgroundSubtractor, Bounds, Detector, DetectorCfg,
};
use crate::session::Thresholds;

fn util_frame(width: u32, height: u32, pixen: &[u8]) -> RgbImage {
    assert_eq!(pixen.len(), (width * height) as usize);
    let gray = GrayImage::from_raw(width, height, pixen.to_vec()).unwrap();
    RgbImage::from_fn(width, height, |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        Rgb([v, v, v])
    })
}

fn util_detector(background: BackgroundKind, median_radius: u32) -> Detector {
    Detector::new(DetectorCfg {
        background,
        diff_threshold: 30,
        median_radius,
    })
    .unwrap()
}

fn util_draw_block(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
    for yy in y..y + height {
        for xx in x..x + width {
            img.put_pixel(xx, yy, Rgb([255, 255, 255]));
        }
    }
}

fn all_areas() -> Thresholds {
    Thresholds::new(0, u32::MAX).unwrap()
}

//a frame where every pixel is under the threshold gives nothing, whatever the noise.
#[test]
fn test_no_foreground_no_regions() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let width = rng.gen_range(1..64);
        let height = rng.gen_range(1..64);
        let frame = RgbImage::from_fn(width, height, |_, _| {
            Rgb([
                rng.gen_range(0..30),
                rng.gen_range(0..30),
                rng.gen_range(0..30),
            ])
        });

        let mut detector = util_detector(BackgroundKind::Brightness, 0);
        assert!(detector.detect(&frame, all_areas()).is_empty());
    }
}

//the first frame seen by a differencing model has nothing to compare against
#[test]
fn test_differencing_first_frame_is_background() {
    let mut frame = RgbImage::new(40, 40);
    util_draw_block(&mut frame, 5, 5, 10, 10);

    for kind in [
        BackgroundKind::FrameDifference,
        BackgroundKind::RunningAverage { learning_rate: 0.05 },
    ] {
        let mut detector = util_detector(kind, 0);
        assert!(detector.detect(&frame, all_areas()).is_empty());
    }
}

#[test]
fn test_only_blob_within_thresholds_counted() {
    let mut frame = RgbImage::new(200, 200);
    util_draw_block(&mut frame, 5, 5, 10, 12);
    util_draw_block(&mut frame, 60, 60, 90, 100);

    let mut detector = util_detector(BackgroundKind::Brightness, 0);
    let regions = detector.detect(&frame, Thresholds::new(50, 5000).unwrap());

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 120);
    assert_eq!(
        regions[0].bounds,
        Bounds {
            min_x: 5,
            min_y: 5,
            max_x: 14,
            max_y: 16
        }
    );
    assert_eq!(regions[0].centroid, (9.5, 10.5));

    let regions = detector.detect(&frame, all_areas());
    let mut areas = regions.iter().map(|r| r.area).collect::<Vec<_>>();
    areas.sort();
    assert_eq!(areas, vec![120, 9000]);
}

#[test]
fn test_area_bounds_inclusive() {
    #[rustfmt::skip]
    let pixen = [
        255, 255,   0,   0,   0,
        255, 255,   0,   0, 255,
          0,   0,   0,   0,   0,
          0, 255, 255, 255,   0,
    ];
    let frame = util_frame(5, 4, &pixen);
    let mut detector = util_detector(BackgroundKind::Brightness, 0);

    let areas = |detector: &mut Detector, min, max| {
        detector
            .detect(&frame, Thresholds::new(min, max).unwrap())
            .iter()
            .map(|r| r.area)
            .collect::<Vec<_>>()
    };

    assert_eq!(areas(&mut detector, 3, 4), vec![4, 3]);
    assert_eq!(areas(&mut detector, 1, 1), vec![1]);
    assert_eq!(areas(&mut detector, 4, 4), vec![4]);
    assert_eq!(areas(&mut detector, 5, 100), Vec::<u32>::new());
}

//diagonal neighbours belong to the same region.
#[test]
fn test_eight_connectivity() {
    #[rustfmt::skip]
    let pixen = [
        255,   0,   0,   0,
          0, 255,   0,   0,
          0,   0, 255,   0,
          0,   0,   0,   0,
    ];
    let frame = util_frame(4, 4, &pixen);
    let mut detector = util_detector(BackgroundKind::Brightness, 0);

    let regions = detector.detect(&frame, all_areas());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 3);
    assert_eq!(regions[0].centroid, (1.0, 1.0));
    assert_eq!(regions[0].bounds.width(), 3);
    assert_eq!(regions[0].bounds.height(), 3);
}

#[test]
fn test_empty_frame() {
    let frame = RgbImage::new(0, 0);

    for kind in [
        BackgroundKind::Brightness,
        BackgroundKind::FrameDifference,
        BackgroundKind::default(),
    ] {
        let mut detector = util_detector(kind, 2);
        assert!(detector.detect(&frame, all_areas()).is_empty());
    }
}

#[test]
fn test_frame_difference_finds_moving_blob() {
    #[rustfmt::skip]
    let before = [
        0, 255, 255, 0, 0, 0,
        0, 255, 255, 0, 0, 0,
        0,   0,   0, 0, 0, 0,
    ];
    #[rustfmt::skip]
    let after = [
        0, 0, 0, 0, 255, 255,
        0, 0, 0, 0, 255, 255,
        0, 0, 0, 0,   0,   0,
    ];

    let mut detector = util_detector(BackgroundKind::FrameDifference, 0);
    assert!(detector
        .detect(&util_frame(6, 3, &before), all_areas())
        .is_empty());

    let regions = detector.detect(&util_frame(6, 3, &after), all_areas());
    let bounds = regions.iter().map(|r| r.bounds).collect::<Vec<_>>();
    assert_eq!(
        bounds,
        vec![
            Bounds {
                min_x: 1,
                min_y: 0,
                max_x: 2,
                max_y: 1
            },
            Bounds {
                min_x: 4,
                min_y: 0,
                max_x: 5,
                max_y: 1
            },
        ]
    );

    //nothing moved
    assert!(detector
        .detect(&util_frame(6, 3, &after), all_areas())
        .is_empty());
}

#[test]
fn test_frame_difference_resets_on_new_dimensions() {
    let mut detector = util_detector(BackgroundKind::FrameDifference, 0);

    let small = RgbImage::new(10, 10);
    let mut big = RgbImage::new(20, 20);
    util_draw_block(&mut big, 2, 2, 4, 4);

    assert!(detector.detect(&small, all_areas()).is_empty());
    assert!(detector.detect(&big, all_areas()).is_empty());

    let regions = detector.detect(&RgbImage::new(20, 20), all_areas());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 16);
}

//a blob that stops moving is absorbed into the running average.
#[test]
fn test_running_average_absorbs_static_blob() {
    let mut subtractor = RunningAverage::new(30, 0.5).unwrap();
    let dark = GrayImage::new(8, 8);
    let mut lit = GrayImage::new(8, 8);
    lit.put_pixel(3, 3, Luma([255]));

    assert_eq!(subtractor.apply(&dark), GrayImage::new(8, 8));
    assert_eq!(subtractor.apply(&dark), GrayImage::new(8, 8));

    let first = subtractor.apply(&lit);
    assert_eq!(first.get_pixel(3, 3), &Luma([255]));
    assert_eq!(first.pixels().filter(|p| p.0[0] == 255).count(), 1);

    let last = (0..10).map(|_| subtractor.apply(&lit)).last().unwrap();
    assert_eq!(last, GrayImage::new(8, 8));

    subtractor.reset();
    assert_eq!(subtractor.apply(&dark), GrayImage::new(8, 8));
}

#[test]
fn test_brightness_threshold_inclusive() {
    let mut subtractor = Brightness::new(30);
    let frame = GrayImage::from_raw(3, 1, vec![29, 30, 31]).unwrap();
    assert_eq!(subtractor.apply(&frame).into_raw(), vec![0, 255, 255]);
}

#[test]
fn test_frame_difference_threshold_inclusive() {
    let mut subtractor = FrameDifference::new(30);
    let first = GrayImage::from_raw(3, 1, vec![100, 100, 100]).unwrap();
    let second = GrayImage::from_raw(3, 1, vec![129, 130, 70]).unwrap();

    subtractor.apply(&first);
    assert_eq!(subtractor.apply(&second).into_raw(), vec![0, 255, 255]);
}

#[test]
fn test_median_filter_removes_speckle() {
    let mut frame = RgbImage::new(20, 20);
    frame.put_pixel(2, 2, Rgb([255, 255, 255]));
    frame.put_pixel(17, 3, Rgb([255, 255, 255]));
    util_draw_block(&mut frame, 8, 8, 5, 5);

    let mut unfiltered = util_detector(BackgroundKind::Brightness, 0);
    assert_eq!(unfiltered.detect(&frame, all_areas()).len(), 3);

    //the median of a 3x3 window drops lone pixels and the corners of the block
    let mut filtered = util_detector(BackgroundKind::Brightness, 1);
    let regions = filtered.detect(&frame, all_areas());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 21);
    assert_eq!(regions[0].centroid, (10.0, 10.0));
}

#[test]
fn test_colour_frames_use_luma() {
    let frame = RgbImage::from_fn(6, 1, |x, _| {
        if x < 3 {
            Rgb([0, 0, 120])
        } else {
            Rgb([0, 200, 0])
        }
    });

    let luma = imageops::grayscale(&frame);
    assert!(luma.get_pixel(0, 0).0[0] < 30);
    assert!(luma.get_pixel(5, 0).0[0] >= 30);

    let mut detector = util_detector(BackgroundKind::Brightness, 0);
    let regions = detector.detect(&frame, all_areas());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounds.min_x, 3);
}

#[test]
fn test_custom_subtractor() {
    #[derive(Debug)]
    struct Everything;

    impl BackgroundSubtractor for Everything {
        fn apply(&mut self, frame: &GrayImage) -> GrayImage {
            GrayImage::from_pixel(frame.width(), frame.height(), Luma([255]))
        }
        fn reset(&mut self) {}
    }

    let mut detector = Detector::with_subtractor(Box::new(Everything), 0);
    let regions = detector.detect(&RgbImage::new(7, 3), all_areas());
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 21);
}

#[test]
fn test_invalid_learning_rate_rejected() {
    for rate in [f32::NAN, f32::INFINITY, 0.0, -1.0, 5.0] {
        assert!(RunningAverage::new(30, rate).is_err());

        let cfg = DetectorCfg {
            background: BackgroundKind::RunningAverage {
                learning_rate: rate,
            },
            ..DetectorCfg::default()
        };
        assert!(Detector::new(cfg).is_err());
    }
}

//a blob that comes back after the scene went dark again is still found.
#[test]
fn test_running_average_keeps_detecting() {
    let dark = RgbImage::new(20, 20);
    let mut lit = RgbImage::new(20, 20);
    util_draw_block(&mut lit, 5, 5, 4, 4);

    let mut detector = util_detector(BackgroundKind::default(), 0);
    let counts = [&dark, &lit, &dark, &lit]
        .into_iter()
        .map(|frame| detector.detect(frame, all_areas()).len())
        .collect::<Vec<_>>();

    assert_eq!(counts, vec![0, 1, 0, 1]);
}

#[test]
fn test_default_detector_matches_default_cfg() {
    let mut frame = RgbImage::new(20, 20);
    util_draw_block(&mut frame, 5, 5, 6, 6);

    let mut from_default = Detector::default();
    let mut from_cfg = Detector::new(DetectorCfg::default()).unwrap();
    for img in [RgbImage::new(20, 20), frame] {
        assert_eq!(
            from_default.detect(&img, all_areas()),
            from_cfg.detect(&img, all_areas())
        );
    }
}
