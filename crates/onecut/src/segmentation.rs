use ibfs::Capacity;
use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Object,
    Background,
}

/// Binary labeling of an image produced by one cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    width: u32,
    height: u32,
    labels: Vec<Label>,
    flow: Capacity,
}

impl Segmentation {
    pub(crate) fn new(width: u32, height: u32, labels: Vec<Label>, flow: Capacity) -> Self {
        debug_assert_eq!(labels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            labels,
            flow,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Max-flow value of the cut (energy of the labeling in fixed-point units).
    pub fn flow(&self) -> Capacity {
        self.flow
    }

    pub fn label(&self, x: u32, y: u32) -> Label {
        self.labels[x as usize + y as usize * self.width as usize]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn object_pixels(&self) -> usize {
        self.labels.iter().filter(|&&l| l == Label::Object).count()
    }

    /// Every pixel ended up with the same label.
    pub fn is_degenerate(&self) -> bool {
        let objects = self.object_pixels();
        objects == 0 || objects == self.labels.len()
    }

    /// Fraction of misclassified pixels relative to the box size. Only interior pixels (not on
    /// the image border) are scored; ground truth 255 is object, 0 is background, any other value
    /// is ignored.
    pub fn error_rate(&self, ground_truth: &GrayImage, box_size: usize) -> Result<f64> {
        if ground_truth.dimensions() != self.dimensions() {
            return Err(Error::ImageSize {
                what: "ground truth",
                expected: self.dimensions(),
                found: ground_truth.dimensions(),
            });
        }
        if box_size == 0 {
            return Err(Error::EmptyBox);
        }
        let mut errors = 0usize;
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let wrong = matches!(
                    (ground_truth.get_pixel(x, y).0[0], self.label(x, y)),
                    (0, Label::Object) | (255, Label::Background)
                );
                errors += usize::from(wrong);
            }
        }
        Ok(errors as f64 / box_size as f64)
    }

    /// Object pixels keep their color from `image`, background pixels turn white.
    pub fn to_image(&self, image: &RgbImage) -> Result<RgbImage> {
        if image.dimensions() != self.dimensions() {
            return Err(Error::ImageSize {
                what: "image",
                expected: self.dimensions(),
                found: image.dimensions(),
            });
        }
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            match self.label(x, y) {
                Label::Object => *image.get_pixel(x, y),
                Label::Background => Rgb([255, 255, 255]),
            }
        }))
    }

    /// White object on black background, the ground-truth convention of [`Self::error_rate`].
    pub fn to_mask(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| match self.label(x, y) {
            Label::Object => Luma([255]),
            Label::Background => Luma([0]),
        })
    }
}
