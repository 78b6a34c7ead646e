//! Sparse RGB color binning.

use image::RgbImage;

use crate::error::{Error, Result};

/// Per-pixel color bin ids, compacted so that only bins present in the image get an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBins {
    bin_of: Vec<u32>,
    bin_count: usize,
}

impl ColorBins {
    /// Splits each channel into `ceil(256 / bin_size)` ranges and numbers the occupied
    /// `r + g·B + b·B²` cells in increasing order.
    pub fn new(image: &RgbImage, bin_size: u32) -> Result<Self> {
        if bin_size == 0 || bin_size > 256 {
            return Err(Error::ColorBinSize(bin_size));
        }
        let per_channel = 256usize.div_ceil(bin_size as usize);
        let dense: Vec<usize> = image
            .pixels()
            .map(|px| {
                let [r, g, b] = px.0.map(|c| c as usize / bin_size as usize);
                r + g * per_channel + b * per_channel * per_channel
            })
            .collect();

        let mut compact = vec![u32::MAX; per_channel.pow(3)];
        for &d in &dense {
            compact[d] = 0;
        }
        let mut next = 0u32;
        for slot in compact.iter_mut().filter(|s| **s == 0) {
            *slot = next;
            next += 1;
        }

        Ok(Self {
            bin_of: dense.into_iter().map(|d| compact[d]).collect(),
            bin_count: next as usize,
        })
    }

    /// Bin id of pixel `p` (row-major index).
    pub fn bin(&self, p: usize) -> usize {
        self.bin_of[p] as usize
    }

    /// Number of non-empty bins.
    pub fn len(&self) -> usize {
        self.bin_count
    }

    pub fn is_empty(&self) -> bool {
        self.bin_count == 0
    }

    /// L1 overlap `Σ_bins min(inside, outside)` of the color histograms split by `inside`.
    pub fn histogram_overlap(&self, inside: impl Fn(usize) -> bool) -> u64 {
        let mut counts = vec![(0u64, 0u64); self.bin_count];
        for (p, &bin) in self.bin_of.iter().enumerate() {
            let c = &mut counts[bin as usize];
            if inside(p) {
                c.0 += 1;
            } else {
                c.1 += 1;
            }
        }
        counts.iter().map(|&(i, o)| i.min(o)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn bins_are_compacted_in_dense_order() {
        let mut img = RgbImage::from_pixel(3, 1, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([0, 0, 0]));
        img.put_pixel(2, 0, Rgb([7, 3, 1]));
        let bins = ColorBins::new(&img, 8).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.bin(1), 0);
        assert_eq!(bins.bin(2), 0);
        assert_eq!(bins.bin(0), 1);
    }

    #[test]
    fn overlap_counts_shared_colors() {
        let mut img = RgbImage::from_pixel(4, 1, Rgb([200, 0, 0]));
        img.put_pixel(3, 0, Rgb([0, 0, 200]));
        let bins = ColorBins::new(&img, 16).unwrap();
        // Pixels 0 and 1 inside, 2 and 3 outside: red is shared once.
        assert_eq!(bins.histogram_overlap(|p| p < 2), 1);
    }

    #[test]
    fn bin_size_is_validated() {
        let img = RgbImage::new(1, 1);
        assert!(matches!(ColorBins::new(&img, 0), Err(Error::ColorBinSize(0))));
        assert_eq!(ColorBins::new(&img, 256).unwrap().len(), 1);
    }
}
