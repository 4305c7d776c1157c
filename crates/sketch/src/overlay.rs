//! Debug rendering of detections over the source image.
//!
//! Purely diagnostic: nothing here feeds back into detection or synthesis.

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut},
    rect::Rect,
};

use crate::{
    color::SourceImage,
    types::{Circle, Detections, LineSegment, Rectangle},
};

pub const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const RECTANGLE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const LINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Copy of the source with every detection drawn on top.
pub fn render_overlay(image: &SourceImage, detections: &Detections) -> RgbImage {
    let mut canvas = image.rgb().clone();
    for circle in &detections.circles {
        draw_circle(&mut canvas, circle);
    }
    for rect in &detections.rectangles {
        draw_rectangle(&mut canvas, rect);
    }
    for line in &detections.lines {
        draw_line(&mut canvas, line);
    }
    canvas
}

fn draw_circle(canvas: &mut RgbImage, circle: &Circle) {
    let center = (circle.center[0].round() as i32, circle.center[1].round() as i32);
    draw_hollow_circle_mut(canvas, center, circle.radius.round() as i32, CIRCLE_COLOR);
    draw_filled_circle_mut(canvas, center, 2, CIRCLE_COLOR);
}

fn draw_rectangle(canvas: &mut RgbImage, rect: &Rectangle) {
    let left = (rect.center[0] - rect.width / 2.0).round() as i32;
    let top = (rect.center[1] - rect.height / 2.0).round() as i32;
    let width = rect.width.round().max(1.0) as u32;
    let height = rect.height.round().max(1.0) as u32;
    draw_hollow_rect_mut(canvas, Rect::at(left, top).of_size(width, height), RECTANGLE_COLOR);
}

fn draw_line(canvas: &mut RgbImage, line: &LineSegment) {
    let half = line.length() / 2.0;
    let (sin, cos) = line.angle_degrees.to_radians().sin_cos();
    let start = (line.center[0] - half * cos, line.center[1] - half * sin);
    let end = (line.center[0] + half * cos, line.center[1] + half * sin);
    draw_line_segment_mut(canvas, start, end, LINE_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> SourceImage {
        SourceImage::from_rgb(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])))
    }

    #[test]
    fn empty_detections_leave_the_image_untouched() {
        let image = white(40, 30);
        assert_eq!(&render_overlay(&image, &Detections::default()), image.rgb());
    }

    #[test]
    fn each_family_has_its_own_color() {
        let image = white(100, 100);
        let detections = Detections {
            circles: vec![Circle { center: [25.0, 25.0], radius: 10.0 }],
            rectangles: vec![Rectangle { center: [70.0, 30.0], width: 20.0, height: 10.0, rotation: 0.0 }],
            lines: vec![LineSegment { center: [50.0, 80.0], width: 40.0, height: 0.0, angle_degrees: 0.0 }],
        };
        let out = render_overlay(&image, &detections);

        assert_eq!(*out.get_pixel(25, 25), CIRCLE_COLOR);
        assert_eq!(*out.get_pixel(60, 25), RECTANGLE_COLOR);
        assert_eq!(*out.get_pixel(50, 80), LINE_COLOR);
        assert_eq!(*out.get_pixel(5, 95), Rgb([255, 255, 255]));
        assert_eq!(image.rgb().get_pixel(25, 25), &Rgb([255, 255, 255]));
    }
}
