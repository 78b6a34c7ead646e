use image::{DynamicImage, GrayImage, Luma};

/// Bounding box given as a mask image: pure white pixels (luma 255) are outside the box and
/// become hard background, every other pixel is inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxMask {
    width: u32,
    height: u32,
    inside: Vec<bool>,
}

impl BoxMask {
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_luma(&image.to_luma8())
    }

    pub fn from_luma(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            inside: image.pixels().map(|&Luma([l])| l != u8::MAX).collect(),
        }
    }

    /// Axis-aligned rectangle `[x0, x1) x [y0, y1)` inside a `width x height` image.
    pub fn rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        let inside = (0..height)
            .flat_map(|y| (0..width).map(move |x| x >= x0 && x < x1 && y >= y0 && y < y1))
            .collect();
        Self {
            width,
            height,
            inside,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether pixel `p` (row-major index) lies inside the box.
    pub fn contains(&self, p: usize) -> bool {
        self.inside[p]
    }

    /// Number of pixels inside the box.
    pub fn size(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }

    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let p = x as usize + y as usize * self.width as usize;
            Luma([if self.inside[p] { 0 } else { 255 }])
        })
    }
}
