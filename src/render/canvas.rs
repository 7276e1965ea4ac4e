use crate::render::projection::clip_segment;
use ab_glyph::{FontVec, PxScale};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
pub const GRAY: Rgba<u8> = Rgba([160, 160, 160, 255]);

/// Half-transparent white behind labels.
pub const LABEL_BOX: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// Keeps segments far outside the image from being rasterised pixel by pixel.
fn clip_to_image(
    image: &RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    pad: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let (w, h) = image.dimensions();
    clip_segment(start, end, (-pad, -pad), (w as f32 + pad, h as f32 + pad))
}

/// Thick line drawn as overlapping discs along the segment.
pub fn draw_thick_segment(
    image: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Rgba<u8>,
    width: f32,
) {
    let Some((start, end)) = clip_to_image(image, start, end, width) else {
        return;
    };

    if width <= 1.0 {
        draw_line_segment_mut(image, start, end, color);
        return;
    }

    let radius = (width / 2.0).max(1.0) as i32;
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = (dx * dx + dy * dy).sqrt();

    if length < 0.001 {
        draw_filled_circle_mut(image, (start.0 as i32, start.1 as i32), radius, color);
        return;
    }

    let step_size = (radius as f32 * 0.5).max(0.5);
    let num_steps = (length / step_size).ceil() as i32;
    let step_x = dx * step_size / length;
    let step_y = dy * step_size / length;

    for i in 0..=num_steps {
        let t = i as f32;
        let x = start.0 + t * step_x;
        let y = start.1 + t * step_y;
        draw_filled_circle_mut(image, (x as i32, y as i32), radius, color);
    }
    draw_filled_circle_mut(image, (end.0 as i32, end.1 as i32), radius, color);
}

pub fn draw_polyline(image: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>, width: f32) {
    for pair in points.windows(2) {
        draw_thick_segment(image, pair[0], pair[1], color, width);
    }
}

/// Dashed polyline; the dash phase carries over from one segment to the next.
pub fn draw_dashed_polyline(
    image: &mut RgbaImage,
    points: &[(f32, f32)],
    color: Rgba<u8>,
    width: f32,
    on: f32,
    off: f32,
) {
    let period = on + off;
    let mut phase = 0.0f32;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = distance(a, b);
        if length < 1e-3 {
            continue;
        }
        let Some((a_clip, b_clip)) = clip_to_image(image, a, b, width) else {
            phase = (phase + length) % period;
            continue;
        };
        phase = (phase + distance(a, a_clip)) % period;

        let dx = b_clip.0 - a_clip.0;
        let dy = b_clip.1 - a_clip.1;
        let visible = distance(a_clip, b_clip);
        let mut travelled = 0.0f32;
        while visible - travelled > 1e-3 {
            let in_dash = phase < on;
            let remaining_in_state = if in_dash { on - phase } else { period - phase };
            let step = remaining_in_state.max(0.01).min(visible - travelled);
            if in_dash {
                let t0 = travelled / visible;
                let t1 = (travelled + step) / visible;
                draw_thick_segment(
                    image,
                    (a_clip.0 + dx * t0, a_clip.1 + dy * t0),
                    (a_clip.0 + dx * t1, a_clip.1 + dy * t1),
                    color,
                    width,
                );
            }
            travelled += step;
            phase = (phase + step) % period;
        }
        phase = (phase + distance(b_clip, b)) % period;
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Alpha-blends `color` over a rectangle, clipped to the image.
pub fn fill_rect_blend(image: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, color: Rgba<u8>) {
    let (iw, ih) = image.dimensions();
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x as i64 + w as i64).max(0) as u32).min(iw);
    let y1 = ((y as i64 + h as i64).max(0) as u32).min(ih);

    for py in y0..y1 {
        for px in x0..x1 {
            image.get_pixel_mut(px, py).blend(&color);
        }
    }
}

pub fn draw_frame(image: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>, width: f32) {
    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
    draw_polyline(image, &corners, color, width);
}

pub fn fill_triangle(image: &mut RgbaImage, corners: [(f32, f32); 3], color: Rgba<u8>) {
    let points: Vec<Point<i32>> = corners
        .iter()
        .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
    if points[0] == points[1] || points[1] == points[2] || points[0] == points[2] {
        return;
    }
    draw_polygon_mut(image, &points, color);
}

/// Font, pixel size and colours for one piece of text.
pub struct TextStyle<'a> {
    pub font: &'a FontVec,
    pub size_px: f32,
    pub color: Rgba<u8>,
    pub bold: bool,
    pub background: Option<Rgba<u8>>,
}

impl<'a> TextStyle<'a> {
    pub fn new(font: &'a FontVec, size_px: f32) -> Self {
        Self {
            font,
            size_px,
            color: BLACK,
            bold: false,
            background: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn boxed(mut self, background: Rgba<u8>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn measure(&self, text: &str) -> (u32, u32) {
        text_size(PxScale::from(self.size_px), self.font, text)
    }
}

/// Draws `text` centred on `(cx, cy)`; returns the top-left corner used.
pub fn draw_text_centered(
    image: &mut RgbaImage,
    style: &TextStyle<'_>,
    text: &str,
    cx: f32,
    cy: f32,
) -> (i32, i32) {
    let (w, h) = style.measure(text);
    let x = (cx - w as f32 / 2.0).round() as i32;
    let y = (cy - h as f32 / 2.0).round() as i32;
    draw_text_at(image, style, text, x, y);
    (x, y)
}

pub fn draw_text_at(image: &mut RgbaImage, style: &TextStyle<'_>, text: &str, x: i32, y: i32) {
    if let Some(background) = style.background {
        let (w, h) = style.measure(text);
        let pad = (style.size_px * 0.3).round() as i32;
        fill_rect_blend(
            image,
            x - pad,
            y - pad,
            w + 2 * pad as u32,
            h + 2 * pad as u32,
            background,
        );
    }

    let scale = PxScale::from(style.size_px);
    draw_text_mut(image, style.color, x, y, scale, style.font, text);
    if style.bold {
        draw_text_mut(image, style.color, x + 1, y, scale, style.font, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thick_segment_paints_along_line() {
        let mut image = RgbaImage::from_pixel(50, 50, WHITE);
        draw_thick_segment(&mut image, (5.0, 25.0), (45.0, 25.0), RED, 4.0);
        assert_eq!(*image.get_pixel(25, 25), RED);
        assert_eq!(*image.get_pixel(25, 10), WHITE);
    }

    #[test]
    fn test_far_away_segment_is_ignored() {
        let mut image = RgbaImage::from_pixel(20, 20, WHITE);
        draw_thick_segment(&mut image, (-1.0e7, -5.0e6), (-2.0e7, 1.0e7), RED, 4.0);
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut image = RgbaImage::from_pixel(100, 10, WHITE);
        draw_dashed_polyline(&mut image, &[(0.0, 5.0), (100.0, 5.0)], BLACK, 1.0, 2.0, 4.0);
        let painted = (0..100).filter(|&x| *image.get_pixel(x, 5) == BLACK).count();
        assert!(painted > 20 && painted < 80, "painted {} pixels", painted);
    }

    #[test]
    fn test_fill_rect_blend_is_clipped_and_blended() {
        let mut image = RgbaImage::from_pixel(10, 10, BLACK);
        fill_rect_blend(&mut image, -5, -5, 10, 10, LABEL_BOX);
        let blended = image.get_pixel(2, 2);
        assert!(blended[0] > 100 && blended[0] < 160);
        assert_eq!(*image.get_pixel(7, 7), BLACK);
    }

    #[test]
    fn test_fill_triangle_ignores_degenerate_input() {
        let mut image = RgbaImage::from_pixel(10, 10, WHITE);
        fill_triangle(&mut image, [(1.0, 1.0), (1.0, 1.0), (5.0, 5.0)], BLACK);
        assert!(image.pixels().all(|p| *p == WHITE));
        fill_triangle(&mut image, [(5.0, 0.0), (9.0, 9.0), (0.0, 9.0)], BLACK);
        assert_eq!(*image.get_pixel(5, 6), BLACK);
    }
}
