//! Hough-gradient circle detection.
//!
//! Edge pixels vote along their gradient direction into a coarse accumulator
//! (`dp` pixels per cell). Local maxima above the accumulator threshold become
//! center candidates, strongest first; each candidate's radius is the best
//! supported distance among all edge pixels.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::{debug, trace};

use crate::{
    algorithms::preprocessing::{canny_from_gradients, grayscale, GaussianBlurPreprocessor},
    color::SourceImage,
    config::CircleParams,
    error::Result,
    traits::{ImagePreprocessor, PrimitiveDetector},
    types::{Circle, Primitive},
};

/// Circle detector with the white-center false positive filter
#[derive(Debug, Clone, Default)]
pub struct HoughCircleDetector {
    pub params: CircleParams,
}

impl HoughCircleDetector {
    pub fn new(params: CircleParams) -> Self {
        Self { params }
    }

    /// Raw Hough candidates on a grayscale image, before color filtering.
    pub fn candidates(&self, gray: &GrayImage) -> Result<Vec<Circle>> {
        let p = &self.params;
        let blurred = GaussianBlurPreprocessor { kernel_size: p.blur_kernel_size }.preprocess(gray)?;
        let gx = horizontal_sobel(&blurred);
        let gy = vertical_sobel(&blurred);
        let edges = canny_from_gradients(&gx, &gy, p.canny_high_threshold / 2.0, p.canny_high_threshold);

        let dp = p.dp.max(1.0);
        let (w, h) = blurred.dimensions();
        let acc_w = (w as f32 / dp).ceil() as usize;
        let acc_h = (h as f32 / dp).ceil() as usize;
        if acc_w == 0 || acc_h == 0 {
            return Ok(Vec::new());
        }
        let mut acc = vec![0u32; acc_w * acc_h];
        let mut edge_points = Vec::new();

        let min_r = p.min_radius as f32;
        let max_r = p.max_radius.max(p.min_radius) as f32;
        // half-cell steps so every cell a ray crosses is visited
        let step = dp * 0.5;

        for (x, y, px) in edges.enumerate_pixels() {
            if px[0] == 0 {
                continue;
            }
            let vx = gx.get_pixel(x, y)[0] as f32;
            let vy = gy.get_pixel(x, y)[0] as f32;
            let mag = vx.hypot(vy);
            if mag == 0.0 {
                continue;
            }
            edge_points.push((x as f32, y as f32));
            let (ux, uy) = (vx / mag, vy / mag);

            for sign in [1.0f32, -1.0] {
                let mut last = usize::MAX;
                let mut r = min_r;
                while r <= max_r {
                    let cx = (x as f32 + sign * ux * r) / dp;
                    let cy = (y as f32 + sign * uy * r) / dp;
                    if cx < 0.0 || cy < 0.0 || cx >= acc_w as f32 || cy >= acc_h as f32 {
                        break;
                    }
                    let idx = cy as usize * acc_w + cx as usize;
                    if idx != last {
                        acc[idx] += 1;
                        last = idx;
                    }
                    r += step;
                }
            }
        }

        if edge_points.is_empty() {
            return Ok(Vec::new());
        }

        let centers = local_maxima(&acc, acc_w, acc_h, p.accumulator_threshold);
        trace!(edges = edge_points.len(), centers = centers.len(), "hough accumulator filled");

        let min_dist = h as f32 / p.min_dist_divisor.max(f32::EPSILON);
        let min_dist_sq = min_dist * min_dist;
        let mut circles: Vec<Circle> = Vec::new();
        let mut distances = Vec::with_capacity(edge_points.len());

        for idx in centers {
            let center = [
                ((idx % acc_w) as f32 + 0.5) * dp,
                ((idx / acc_w) as f32 + 0.5) * dp,
            ];
            let too_close = circles.iter().any(|c| {
                let dx = c.center[0] - center[0];
                let dy = c.center[1] - center[1];
                dx * dx + dy * dy < min_dist_sq
            });
            if too_close {
                continue;
            }

            distances.clear();
            distances.extend(edge_points.iter().filter_map(|&(x, y)| {
                let d = (x - center[0]).hypot(y - center[1]);
                (d >= min_r && d <= max_r).then_some(d)
            }));

            if let Some((radius, support)) = best_radius(&distances, min_r, max_r) {
                if support > p.accumulator_threshold {
                    circles.push(Circle { center, radius });
                } else {
                    trace!(?center, support, "center lacks radius support");
                }
            }
        }

        Ok(circles)
    }
}

impl PrimitiveDetector for HoughCircleDetector {
    fn detect(&self, image: &SourceImage) -> Result<Vec<Primitive>> {
        let gray = grayscale(image.rgb());
        let candidates = self.candidates(&gray)?;

        let circles = candidates
            .into_iter()
            .filter(|c| {
                let keep = !image.sample(c.center).is_near_white(self.params.white_cutoff);
                if !keep {
                    debug!(center = ?c.center, radius = c.radius, "dropping circle with white center");
                }
                keep
            })
            .map(Primitive::Circle)
            .collect();

        Ok(circles)
    }
}

/// Indices of cells above `threshold` that dominate their 4-neighbourhood,
/// ordered by descending vote count (ties by position).
fn local_maxima(acc: &[u32], w: usize, h: usize, threshold: u32) -> Vec<usize> {
    let at = |x: usize, y: usize| acc[y * w + x];
    let mut peaks = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = at(x, y);
            if v <= threshold {
                continue;
            }
            let left = x == 0 || v > at(x - 1, y);
            let right = x + 1 == w || v >= at(x + 1, y);
            let up = y == 0 || v > at(x, y - 1);
            let down = y + 1 == h || v >= at(x, y + 1);
            if left && right && up && down {
                peaks.push(y * w + x);
            }
        }
    }
    peaks.sort_by(|&a, &b| acc[b].cmp(&acc[a]).then(a.cmp(&b)));
    peaks
}

/// Radius with the most edge pixels within ±1 px, and that support count.
///
/// Ties go to the fuller center bin, then to the smaller radius. The returned
/// radius is the mean distance inside the winning window.
fn best_radius(distances: &[f32], min_r: f32, max_r: f32) -> Option<(f32, u32)> {
    if distances.is_empty() {
        return None;
    }
    let lo = min_r.floor() as usize;
    let bins = max_r.ceil() as usize - lo + 1;
    let mut hist = vec![0u32; bins];
    for &d in distances {
        let bin = (d.round() as usize).saturating_sub(lo).min(bins - 1);
        hist[bin] += 1;
    }

    let window = |i: usize| -> u32 {
        let start = i.saturating_sub(1);
        let end = (i + 1).min(bins - 1);
        hist[start..=end].iter().sum()
    };
    let best = (0..bins).max_by(|&a, &b| {
        window(a)
            .cmp(&window(b))
            .then(hist[a].cmp(&hist[b]))
            .then(b.cmp(&a))
    })?;
    let support = window(best);
    if support == 0 {
        return None;
    }

    let r = (best + lo) as f32;
    let (sum, count) = distances
        .iter()
        .filter(|&&d| (d - r).abs() <= 1.5)
        .fold((0.0f32, 0u32), |(s, n), &d| (s + d, n + 1));
    let radius = if count > 0 { sum / count as f32 } else { r };
    Some((radius, support))
}
