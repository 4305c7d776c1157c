use image::GrayImage;
use tracing::trace;

use crate::{
    algorithms::{
        preprocessing::{extract_edges, pyramid_filter},
        simplification::{approximate_closed, closed_perimeter, is_convex, max_corner_cosine, polygon_area},
    },
    color::SourceImage,
    config::PolygonParams,
    error::Result,
    traits::PrimitiveDetector,
    types::{LineSegment, Primitive, Rectangle},
};

/// Imageproc-based contour extractor, one point list per border
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

impl ImageprocContourExtractor {
    /// Every outer and hole border of the binary image, as a flat list.
    pub fn extract_contours(&self, binary_image: &GrayImage) -> Vec<Vec<[f64; 2]>> {
        imageproc::contours::find_contours::<i32>(binary_image)
            .into_iter()
            .map(|contour| {
                contour.points
                    .iter()
                    .map(|p| [p.x as f64, p.y as f64])
                    .collect()
            })
            .collect()
    }
}

/// Rectangle and line detector over the dilated edge map
#[derive(Debug, Clone, Default)]
pub struct ContourPolygonDetector {
    pub params: PolygonParams,
}

impl ContourPolygonDetector {
    pub fn new(params: PolygonParams) -> Self {
        Self { params }
    }

    /// Simplify one contour and decide what, if anything, it is.
    pub fn classify_contour(&self, contour: &[[f64; 2]]) -> Option<Primitive> {
        let epsilon = closed_perimeter(contour) * self.params.approx_epsilon_ratio;
        let approx = approximate_closed(contour, epsilon);
        self.classify_polygon(&approx)
    }

    /// Classify an already simplified polygon by its vertex count.
    pub fn classify_polygon(&self, approx: &[[f64; 2]]) -> Option<Primitive> {
        match approx.len() {
            4 => self.as_rectangle(approx).map(Primitive::Rectangle),
            2 => Some(Primitive::LineSegment(segment_box(approx[0], approx[1]))),
            n => {
                trace!(vertices = n, "discarding contour");
                None
            }
        }
    }

    fn as_rectangle(&self, quad: &[[f64; 2]]) -> Option<Rectangle> {
        let area = polygon_area(quad);
        if !(area < self.params.max_rectangle_area) || !is_convex(quad) {
            trace!(area, "quadrilateral rejected by area or convexity");
            return None;
        }
        let cosine = max_corner_cosine(quad);
        if cosine >= self.params.max_corner_cosine {
            trace!(cosine, "quadrilateral corners too far from square");
            return None;
        }

        let (a, c) = (quad[0], quad[2]);
        let width = (c[0] - a[0]).abs();
        let height = (c[1] - a[1]).abs();
        // opposite corners sharing a row or column: a diamond, not a box
        if width == 0.0 || height == 0.0 {
            trace!(width, height, "quadrilateral has a zero-size box");
            return None;
        }
        Some(Rectangle {
            center: [((a[0] + c[0]) / 2.0) as f32, ((a[1] + c[1]) / 2.0) as f32],
            width: width as f32,
            height: height as f32,
            rotation: 0.0,
        })
    }
}

impl PrimitiveDetector for ContourPolygonDetector {
    fn detect(&self, image: &SourceImage) -> Result<Vec<Primitive>> {
        let p = &self.params;
        let filtered;
        let rgb = if p.pyramid_filter {
            filtered = pyramid_filter(image.rgb());
            &filtered
        } else {
            image.rgb()
        };
        let stages = extract_edges(
            rgb,
            p.blur_kernel_size,
            p.canny_low_threshold,
            p.canny_high_threshold,
            p.dilation_passes,
        )?;

        let contours = ImageprocContourExtractor.extract_contours(&stages.dilated);
        trace!(contours = contours.len(), "contours extracted");

        Ok(contours
            .iter()
            .filter_map(|contour| self.classify_contour(contour))
            .collect())
    }
}

/// Minimum-area box of a two point contour: the box spans the segment with
/// zero height and is rotated by the segment's angle.
pub fn segment_box(a: [f64; 2], b: [f64; 2]) -> LineSegment {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    LineSegment {
        center: [((a[0] + b[0]) / 2.0) as f32, ((a[1] + b[1]) / 2.0) as f32],
        width: dx.hypot(dy) as f32,
        height: 0.0,
        angle_degrees: dy.atan2(dx).to_degrees() as f32,
    }
}
