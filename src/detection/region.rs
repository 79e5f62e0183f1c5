use image::{GrayImage, Luma};
use imageproc::{
    definitions::Image,
    rect::Rect,
    region_labelling::{connected_components, Connectivity},
};

use crate::session::Thresholds;

/// Inclusive pixel extent of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn extend(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn as_rect(&self) -> Rect {
        Rect::at(self.min_x as i32, self.min_y as i32).of_size(self.width(), self.height())
    }
}

/// A connected blob of foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub area: u32,
    pub bounds: Bounds,
    /// Mean (x, y) of the region's pixels.
    pub centroid: (f64, f64),
}

#[derive(Debug, Clone, Copy)]
struct RegionAcc {
    area: u32,
    bounds: Bounds,
    sum_x: u64,
    sum_y: u64,
}

impl RegionAcc {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            bounds: Bounds::point(x, y),
            sum_x: 0,
            sum_y: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.bounds.extend(x, y);
        self.sum_x += u64::from(x);
        self.sum_y += u64::from(y);
    }

    fn finish(self) -> Region {
        let area = f64::from(self.area);
        Region {
            area: self.area,
            bounds: self.bounds,
            centroid: (self.sum_x as f64 / area, self.sum_y as f64 / area),
        }
    }
}

fn label_regions(mask: &GrayImage) -> Image<Luma<u32>> {
    connected_components(mask, Connectivity::Eight, Luma([0]))
}

/// Every 8-connected foreground region of the mask, in label order.
pub fn all_regions(mask: &GrayImage) -> Vec<Region> {
    let labels = label_regions(mask);

    let mut acc: Vec<Option<RegionAcc>> = vec![];
    for (x, y, Luma([label])) in labels.enumerate_pixels() {
        if *label == 0 {
            continue;
        }
        let idx = *label as usize;
        acc.resize_with((idx + 1).max(acc.len()), || None);
        acc[idx].get_or_insert_with(|| RegionAcc::new(x, y)).add(x, y);
    }

    acc.into_iter().flatten().map(RegionAcc::finish).collect()
}

/// The regions of the mask whose area lies within the thresholds (inclusive).
pub fn regions_in_mask(mask: &GrayImage, thresholds: Thresholds) -> Vec<Region> {
    all_regions(mask)
        .into_iter()
        .filter(|region| thresholds.contains(region.area))
        .collect()
}
