//! Source image ownership and color sampling.
//!
//! The HSV companion image uses the compact 8-bit encoding: channel 0 holds
//! hue / 2 (0..180), channels 1 and 2 hold saturation and value in 0..255.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// An immutable RGB image plus its HSV conversion, computed once.
#[derive(Debug, Clone)]
pub struct SourceImage {
    rgb: RgbImage,
    hsv: HsvImage,
}

impl SourceImage {
    /// Decode an image file. Any decode failure is fatal for the run.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?;
        Ok(Self::from_rgb(img.to_rgb8()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_rgb(img.to_rgb8()))
    }

    pub fn from_rgb(rgb: RgbImage) -> Self {
        let hsv = to_hsv(&rgb);
        Self { rgb, hsv }
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn hsv(&self) -> &HsvImage {
        &self.hsv
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// Round `point` to the nearest pixel and clamp it into the image.
    pub fn pixel_at(&self, point: [f32; 2]) -> (u32, u32) {
        let clamp = |v: f32, len: u32| -> u32 {
            let max = len.saturating_sub(1) as f32;
            if v.is_nan() { 0 } else { v.round().clamp(0.0, max) as u32 }
        };
        (clamp(point[0], self.width()), clamp(point[1], self.height()))
    }

    /// Read both color representations at `point`.
    pub fn sample(&self, point: [f32; 2]) -> SampledColor {
        let (x, y) = self.pixel_at(point);
        SampledColor {
            rgb: self.rgb.get_pixel(x, y).0,
            hsv: self.hsv.get_pixel(x, y).0,
        }
    }
}

/// Color readings taken at a primitive's reference pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SampledColor {
    pub rgb: [u8; 3],
    /// Raw 8-bit HSV triple (hue / 2, saturation, value).
    pub hsv: [u8; 3],
}

impl SampledColor {
    /// Hue in degrees, 0..360.
    pub fn hue(&self) -> f32 {
        self.hsv[0] as f32 * 2.0
    }

    /// Saturation in 0..100.
    pub fn saturation(&self) -> f32 {
        100.0 * self.hsv[1] as f32 / 255.0
    }

    /// Value in 0..100.
    pub fn value(&self) -> f32 {
        100.0 * self.hsv[2] as f32 / 255.0
    }

    pub fn normalized(&self) -> Hsv {
        Hsv {
            hue: self.hue(),
            saturation: self.saturation(),
            value: self.value(),
        }
    }

    /// Native color scaled to 0..1.
    pub fn display_color(&self) -> [f32; 3] {
        self.rgb.map(|c| c as f32 / 255.0)
    }

    pub fn is_near_white(&self, cutoff: u8) -> bool {
        self.rgb.iter().all(|&c| c > cutoff)
    }
}

/// Hue in degrees, saturation and value in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

pub fn rgb_to_hsv8(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h8 = (h / 2.0).round() as u32 % 180;
    [h8 as u8, s.round() as u8, v as u8]
}

pub fn to_hsv(rgb: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv8(src.0));
    }
    hsv
}
