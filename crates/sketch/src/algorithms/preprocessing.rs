use image::{GrayImage, Luma, Rgb, RgbImage, imageops};
use imageproc::{
    definitions::Image,
    distance_transform::Norm,
    filter::separable_filter_equal,
    gradients::{horizontal_sobel, vertical_sobel},
    map::map_colors,
};
use crate::{config::kernel_sigma, error::Result, traits::ImagePreprocessor};

const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Gaussian blur over exactly `kernel_size` taps (forced odd)
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub kernel_size: u32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { kernel_size: 9 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(separable_filter_equal(image, &gaussian_kernel(self.kernel_size)))
    }
}

/// Normalized 1D Gaussian, sigma derived from the size.
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let size = kernel_size.max(1) | 1;
    let sigma = kernel_sigma(size);
    let half = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Canny edge detector producing a 0/255 edge map
#[derive(Debug, Clone)]
pub struct CannyPreprocessor {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl ImagePreprocessor for CannyPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(canny_edges(image, self.low_threshold, self.high_threshold))
    }
}

/// Repeated 3x3 dilation, closes one-pixel gaps between edge segments
#[derive(Debug, Clone)]
pub struct DilatePreprocessor {
    pub passes: u32,
}

impl Default for DilatePreprocessor {
    fn default() -> Self {
        Self { passes: 1 }
    }
}

impl ImagePreprocessor for DilatePreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut out = image.clone();
        for _ in 0..self.passes {
            out = imageproc::morphology::dilate(&out, Norm::LInf, 1);
        }
        Ok(out)
    }
}

/// Canny on an already smoothed image, 3x3 Sobel gradients.
pub fn canny_edges(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny_from_gradients(&horizontal_sobel(image), &vertical_sobel(image), low, high)
}

/// Non-maximum suppression and hysteresis over precomputed gradients.
///
/// The magnitude is `|gx| + |gy|`. A pixel survives suppression when it beats
/// both neighbours across the edge (ties keep the left or upper pixel). Pixels
/// above `high` seed the edges, which then grow through 8-connected survivors
/// above `low`. Both bounds are strict, so a low bound of 0 admits any
/// non-zero gradient.
pub fn canny_from_gradients(
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
    low: f32,
    high: f32,
) -> GrayImage {
    let (w, h) = gx.dimensions();
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let magnitude: Vec<f32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(x, y)| (x[0] as f32).abs() + (y[0] as f32).abs())
        .collect();
    let at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0.0
        } else {
            magnitude[y as usize * w as usize + x as usize]
        }
    };

    let mut out = GrayImage::new(w, h);
    let mut weak = vec![false; magnitude.len()];
    let mut stack = Vec::new();

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let m = at(x, y);
            if m <= low {
                continue;
            }
            let vx = gx.get_pixel(x as u32, y as u32)[0];
            let vy = gy.get_pixel(x as u32, y as u32)[0];
            let (ax, ay) = ((vx as f32).abs(), (vy as f32).abs());

            let is_peak = if ay < ax * TAN_22_5 {
                m > at(x - 1, y) && m >= at(x + 1, y)
            } else if ay > ax * TAN_67_5 {
                m > at(x, y - 1) && m >= at(x, y + 1)
            } else {
                let s = if (vx < 0) != (vy < 0) { -1 } else { 1 };
                m > at(x - s, y - 1) && m > at(x + s, y + 1)
            };
            if !is_peak {
                continue;
            }

            if m > high {
                out.put_pixel(x as u32, y as u32, Luma([255]));
                stack.push((x, y));
            } else {
                weak[y as usize * w as usize + x as usize] = true;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let idx = ny as usize * w as usize + nx as usize;
                if weak[idx] {
                    weak[idx] = false;
                    out.put_pixel(nx as u32, ny as u32, Luma([255]));
                    stack.push((nx, ny));
                }
            }
        }
    }

    out
}

/// Integer luma with 0.299/0.587/0.114 weights, rounded.
pub fn grayscale(rgb: &RgbImage) -> GrayImage {
    map_colors(rgb, |Rgb([r, g, b])| {
        let y = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
        Luma([((y + 500) / 1000) as u8])
    })
}

/// Crop to even dimensions, halve, then restore the size.
///
/// Downsampling smooths with the 5-tap binomial kernel and keeps even pixels.
/// Upsampling interpolates with weights 1/8, 6/8, 1/8 on even outputs and
/// 1/2, 1/2 on odd ones.
pub fn pyramid_filter(rgb: &RgbImage) -> RgbImage {
    let w = rgb.width() & !1;
    let h = rgb.height() & !1;
    if w < 2 || h < 2 {
        return rgb.clone();
    }
    let cropped = imageops::crop_imm(rgb, 0, 0, w, h).to_image();
    let smoothed = separable_filter_equal(&cropped, &[0.0625f32, 0.25, 0.375, 0.25, 0.0625]);
    let down = RgbImage::from_fn(w / 2, h / 2, |x, y| *smoothed.get_pixel(2 * x, 2 * y));

    RgbImage::from_fn(w, h, |x, y| {
        let mut acc = [0.0f32; 3];
        for (sy, wy) in upsample_taps(y, h / 2) {
            for (sx, wx) in upsample_taps(x, w / 2) {
                let p = down.get_pixel(sx, sy);
                for (a, v) in acc.iter_mut().zip(p.0) {
                    *a += v as f32 * wx * wy;
                }
            }
        }
        Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}

/// Source rows (or columns) and weights behind output index `o`, borders clamped.
fn upsample_taps(o: u32, n: u32) -> [(u32, f32); 3] {
    let i = o / 2;
    let next = (i + 1).min(n - 1);
    if o % 2 == 0 {
        [(i.saturating_sub(1), 0.125), (i, 0.75), (next, 0.125)]
    } else {
        [(i, 0.5), (next, 0.5), (i, 0.0)]
    }
}

/// Intermediate buffers of one edge extraction, each a fresh allocation.
#[derive(Debug, Clone)]
pub struct EdgeStages {
    pub gray: GrayImage,
    pub blurred: GrayImage,
    pub edges: GrayImage,
    pub dilated: GrayImage,
}

/// Grayscale, blur, Canny and dilation over an RGB buffer.
pub fn extract_edges(
    rgb: &RgbImage,
    kernel_size: u32,
    low_threshold: f32,
    high_threshold: f32,
    dilation_passes: u32,
) -> Result<EdgeStages> {
    let gray = grayscale(rgb);
    let blurred = GaussianBlurPreprocessor { kernel_size }.preprocess(&gray)?;
    let edges = CannyPreprocessor { low_threshold, high_threshold }.preprocess(&blurred)?;
    let dilated = DilatePreprocessor { passes: dilation_passes }.preprocess(&edges)?;
    Ok(EdgeStages { gray, blurred, edges, dilated })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([255, 255, 255]));
        for y in 20..40 {
            for x in 20..40 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    fn lit(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn zero_low_threshold_does_not_flood() {
        let stages = extract_edges(&square_image(), 9, 0.0, 100.0, 1).unwrap();
        let count = lit(&stages.edges);
        assert!(count > 0, "square outline should produce edges");
        assert!(count < 60 * 60 / 4, "edge map flooded: {count} pixels");
    }

    #[test]
    fn square_outline_is_one_pixel_wide() {
        let stages = extract_edges(&square_image(), 9, 0.0, 100.0, 1).unwrap();
        for y in 26..34 {
            let row: Vec<u32> = (0..60).filter(|&x| stages.edges.get_pixel(x, y)[0] > 0).collect();
            assert_eq!(row.len(), 2, "row {y}: {row:?}");
        }
    }

    #[test]
    fn mid_luminance_edges_reach_the_upper_threshold() {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([255, 255, 255]));
        for y in 20..40 {
            for x in 20..40 {
                img.put_pixel(x, y, Rgb([30, 200, 30]));
            }
        }
        let blurred = GaussianBlurPreprocessor::default().preprocess(&grayscale(&img)).unwrap();
        assert!(lit(&canny_edges(&blurred, 100.0, 200.0)) > 0);
    }

    #[test]
    fn dilation_grows_edges() {
        let stages = extract_edges(&square_image(), 9, 0.0, 100.0, 1).unwrap();
        assert!(lit(&stages.dilated) > lit(&stages.edges));
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = RgbImage::from_pixel(32, 32, Rgb([90, 120, 30]));
        let stages = extract_edges(&img, 9, 0.0, 100.0, 1).unwrap();
        assert!(stages.dilated.pixels().all(|p| *p == Luma([0])));
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_sized() {
        let k = gaussian_kernel(9);
        assert_eq!(k.len(), 9);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let gray = grayscale(&img);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
    }

    #[test]
    fn pyramid_filter_crops_to_even_size() {
        let img = RgbImage::from_pixel(31, 17, Rgb([10, 10, 10]));
        let out = pyramid_filter(&img);
        assert_eq!(out.dimensions(), (30, 16));
        assert!(out.pixels().all(|p| *p == Rgb([10, 10, 10])));
    }

    #[test]
    fn pyramid_filter_removes_isolated_pixels() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        img.put_pixel(9, 9, Rgb([0, 0, 0]));
        let out = pyramid_filter(&img);
        assert!(out.get_pixel(9, 9)[0] > 200, "{:?}", out.get_pixel(9, 9));
    }

    #[test]
    fn tiny_images_yield_empty_edge_maps() {
        let img = GrayImage::new(2, 2);
        let edges = canny_edges(&img, 0.0, 100.0);
        assert_eq!(edges.dimensions(), (2, 2));
        assert_eq!(lit(&edges), 0);
    }
}
