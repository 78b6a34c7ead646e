//! Contrast-sensitive pixel neighbour weights.

use image::{Rgb, RgbImage};

use crate::params::Connectivity;

/// One undirected neighbour pair with its contrast weight in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborLink {
    pub p: usize,
    pub q: usize,
    pub weight: f64,
}

const SIGMA_EPSILON: f64 = 1e-10;

/// Squared RGB distance.
fn color_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}

fn neighbor_pairs(
    width: u32,
    height: u32,
    connectivity: Connectivity,
) -> impl Iterator<Item = ((u32, u32), (u32, u32), f64)> {
    let shifts = connectivity.shifts();
    (0..height).flat_map(move |y| {
        (0..width).flat_map(move |x| {
            shifts.iter().filter_map(move |&(dx, dy)| {
                let qx = i64::from(x) + dx;
                let qy = i64::from(y) + dy;
                let inside =
                    qx >= 0 && qy >= 0 && qx < i64::from(width) && qy < i64::from(height);
                inside.then(|| {
                    let dist = ((dx * dx + dy * dy) as f64).sqrt();
                    ((x, y), (qx as u32, qy as u32), dist)
                })
            })
        })
    })
}

/// Weights `exp(-dI / 2σ²) / |p - q|` for every neighbour pair, where `dI` is the squared color
/// distance and `σ²` its mean over the image. A flat image (σ² ≈ 0) gets pure distance weights.
pub fn compute_links(image: &RgbImage, connectivity: Connectivity) -> Vec<NeighborLink> {
    let (width, height) = image.dimensions();
    let index = |(x, y): (u32, u32)| x as usize + y as usize * width as usize;

    let (sum, count) = neighbor_pairs(width, height, connectivity).fold(
        (0.0, 0usize),
        |(sum, count), (p, q, _)| {
            (
                sum + color_distance(image.get_pixel(p.0, p.1), image.get_pixel(q.0, q.1)),
                count + 1,
            )
        },
    );
    let sigma_square = if count == 0 { 0.0 } else { sum / count as f64 };

    neighbor_pairs(width, height, connectivity)
        .map(|(p, q, dist)| {
            let contrast = if sigma_square > SIGMA_EPSILON {
                let d = color_distance(image.get_pixel(p.0, p.1), image.get_pixel(q.0, q.1));
                (-d / 2.0 / sigma_square).exp()
            } else {
                1.0
            };
            NeighborLink {
                p: index(p),
                q: index(q),
                weight: contrast / dist,
            }
        })
        .collect()
}
