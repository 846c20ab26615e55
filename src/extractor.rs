use std::collections::HashSet;
use std::path::Path;

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use kmeans_colors::get_kmeans;
use palette::Srgb;
use tracing::{debug, warn};

use crate::color::Palette;
use crate::error::{ClusteringError, ConfigurationError, Result};

/// `kmeans_colors` stores cluster indices as `u8`.
pub const MAX_CLUSTERS: usize = 256;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_SEED: u64 = 0;

// Sum of squared centroid movement (normalized channels) below which the
// clustering loop stops.
const CONVERGE: f32 = 1e-8;
// A centroid still moving by more than one 8-bit step after clustering means
// the loop ran out of iterations before settling.
const SETTLED_SHIFT: f64 = 1.0 / 255.0;
const U16_MAX: f32 = u16::MAX as f32;

/// Extracts a palette of dominant colors by k-means clustering of pixel colors.
///
/// Samples are read at 16-bit precision and normalized to `[0, 1]` before
/// clustering; centroids are mapped back to 8-bit by dividing the 16-bit value
/// by 256. Initialization is k-means++ driven by the configured seed, so the
/// same image and seed always produce the same palette.
///
/// When a cluster loses all its members, `kmeans_colors` reseeds its centroid
/// with a color drawn from the seeded RNG and keeps iterating.
#[derive(Clone, Debug)]
pub struct PaletteExtractor {
    clusters: usize,
    seed: u64,
    max_iterations: usize,
    downscale: Option<u32>,
}

impl PaletteExtractor {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            downscale: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Nearest-neighbour downscale so the longest side is at most `side`
    /// before sampling. Trades accuracy for speed on large images.
    pub fn with_downscale(mut self, side: u32) -> Self {
        self.downscale = Some(side.max(1));
        self
    }

    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<Palette> {
        let img = image::open(path.as_ref())?;
        self.extract(&img)
    }

    pub fn extract_bytes(&self, input: &[u8]) -> Result<Palette> {
        let img = image::load_from_memory(input)?;
        self.extract(&img)
    }

    pub fn extract(&self, img: &DynamicImage) -> Result<Palette> {
        if self.clusters == 0 || self.clusters > MAX_CLUSTERS {
            return Err(ConfigurationError::InvalidClusterCount {
                got: self.clusters,
                max: MAX_CLUSTERS,
            }
            .into());
        }

        let samples = self.sample(img);

        // k-means++ cannot place more centroids than there are distinct points.
        let distinct = count_distinct(&samples, self.clusters);
        if distinct < self.clusters {
            return Err(ClusteringError::NotEnoughColors {
                requested: self.clusters,
                distinct,
            }
            .into());
        }

        let buf: Vec<Srgb<f32>> = samples
            .iter()
            .map(|&[r, g, b]| {
                Srgb::new(r as f32 / U16_MAX, g as f32 / U16_MAX, b as f32 / U16_MAX)
            })
            .collect();

        debug!(
            samples = buf.len(),
            clusters = self.clusters,
            seed = self.seed,
            "running k-means"
        );
        let kmeans = get_kmeans(
            self.clusters,
            self.max_iterations,
            CONVERGE,
            false,
            &buf,
            self.seed,
        );

        let shift = settle_shift(&buf, &kmeans.centroids);
        if shift > SETTLED_SHIFT {
            warn!(shift, max_iterations = self.max_iterations, "k-means did not settle");
            return Err(ClusteringError::NotConverged(self.max_iterations).into());
        }
        debug!(score = kmeans.score, shift, "k-means settled");

        let colors = kmeans.centroids.iter().map(|&c| to_rgb8(c)).collect();
        Ok(Palette::new(colors))
    }

    /// Every pixel's RGB at 16-bit precision, alpha discarded.
    fn sample(&self, img: &DynamicImage) -> Vec<[u16; 3]> {
        let pixels = match self.downscaled(img) {
            Some(small) => small.to_rgba16(),
            None => img.to_rgba16(),
        };
        pixels.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect()
    }

    fn downscaled(&self, img: &DynamicImage) -> Option<DynamicImage> {
        let side = self.downscale?;
        let (w, h) = img.dimensions();
        let max_side = w.max(h);
        if max_side <= side {
            return None;
        }
        let ratio = side as f32 / max_side as f32;
        let w = ((w as f32) * ratio).round().max(1.0) as u32;
        let h = ((h as f32) * ratio).round().max(1.0) as u32;
        Some(img.resize_exact(w, h, FilterType::Nearest))
    }
}

/// Extract `clusters` dominant colors from `img` with the given seed.
pub fn extract_palette(img: &DynamicImage, clusters: usize, seed: u64) -> Result<Palette> {
    PaletteExtractor::new(clusters).with_seed(seed).extract(img)
}

/// Number of distinct colors, counting no further than `limit`.
fn count_distinct(samples: &[[u16; 3]], limit: usize) -> usize {
    let mut seen = HashSet::with_capacity(limit);
    for s in samples {
        seen.insert(*s);
        if seen.len() >= limit {
            break;
        }
    }
    seen.len()
}

/// Largest centroid movement one more assign/recompute step would cause.
/// Clusters left empty by the extra step do not move.
fn settle_shift(buf: &[Srgb<f32>], centroids: &[Srgb<f32>]) -> f64 {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut counts = vec![0u64; centroids.len()];

    for p in buf {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (idx, c) in centroids.iter().enumerate() {
            let dr = p.red - c.red;
            let dg = p.green - c.green;
            let db = p.blue - c.blue;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = idx;
            }
        }
        sums[best][0] += p.red as f64;
        sums[best][1] += p.green as f64;
        sums[best][2] += p.blue as f64;
        counts[best] += 1;
    }

    centroids
        .iter()
        .zip(sums.iter().zip(&counts))
        .filter(|(_, (_, n))| **n > 0)
        .map(|(c, (sum, &n))| {
            let n = n as f64;
            let dr = sum[0] / n - c.red as f64;
            let dg = sum[1] / n - c.green as f64;
            let db = sum[2] / n - c.blue as f64;
            (dr * dr + dg * dg + db * db).sqrt()
        })
        .fold(0.0, f64::max)
}

fn to_rgb8(c: Srgb<f32>) -> Srgb<u8> {
    let channel = |v: f32| (v * U16_MAX / 256.0).clamp(0.0, 255.0) as u8;
    Srgb::new(channel(c.red), channel(c.green), channel(c.blue))
}
