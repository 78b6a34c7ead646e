#![forbid(unsafe_code)]

//! "GrabCut in One Cut" (Tang, Gorelick, Veksler, Boykov, ICCV'13) segmentation energy.
//!
//! A bounding box marks everything outside it as hard background. Inside the box a linear
//! ballooning term favours the object, a contrast-sensitive Potts term keeps boundaries on image
//! edges and an L1 color-separation term pushes the object and background histograms apart. The
//! whole energy is one graph cut solved by [`ibfs`].
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use onecut::{BoxMask, Label, OneCut, OneCutParams};
//!
//! let image = RgbImage::from_fn(12, 12, |x, y| {
//!     if (4..8).contains(&x) && (4..8).contains(&y) {
//!         Rgb([20, 20, 20])
//!     } else {
//!         Rgb([230, 230, 230])
//!     }
//! });
//! let mut cut = OneCut::new(&image, OneCutParams::default()).unwrap();
//! cut.construct(&BoxMask::rect(12, 12, 2, 2, 10, 10)).unwrap();
//! let segmentation = cut.run().unwrap();
//! assert_eq!(segmentation.label(0, 0), Label::Background);
//! ```

pub mod bins;
pub mod error;
pub mod mask;
pub mod nlinks;
mod onecut;
pub mod params;
pub mod segmentation;

pub use bins::ColorBins;
pub use error::{Error, Result};
pub use mask::BoxMask;
pub use nlinks::{NeighborLink, compute_links};
pub use onecut::OneCut;
pub use params::{Backend, Connectivity, OneCutParams};
pub use segmentation::{Label, Segmentation};
