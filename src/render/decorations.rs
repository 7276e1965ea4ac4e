use crate::domain::dataset::{BoundaryDataset, CoastlineLayer};
use crate::domain::model::{BoundingBox, ResolvedTarget, TargetOrigin};
use crate::render::canvas::{
    draw_dashed_polyline, draw_polyline, draw_text_at, draw_text_centered, fill_rect_blend,
    fill_triangle, TextStyle, BLACK, GRAY, LABEL_BOX, RED, WHITE,
};
use crate::render::layout::pt;
use crate::render::projection::Viewport;
use ab_glyph::FontVec;
use geo::{BoundingRect, InteriorPoint, LineString, MultiPolygon};
use imageproc::drawing::draw_filled_circle_mut;
use image::{Rgba, RgbaImage};

const KM_PER_DEGREE: f64 = 111.32;

/// Place labels sit this far north of the marker.
const LABEL_OFFSET_DEG: f64 = 1.0;

fn project_ring(viewport: &Viewport, ring: &LineString<f64>) -> Vec<(f32, f32)> {
    ring.coords()
        .map(|c| viewport.to_local(c.x, c.y))
        .collect()
}

fn visible(viewport: &Viewport, bbox: Option<BoundingBox>) -> bool {
    bbox.map_or(true, |bbox| viewport.extent.intersects(&bbox))
}

/// Political borders: every dataset ring as a dotted line.
pub fn draw_borders(panel: &mut RgbaImage, viewport: &Viewport, dataset: &BoundaryDataset) {
    let width = pt(0.8).max(1.0);
    for record in dataset.records() {
        if !visible(viewport, record.bbox) {
            continue;
        }
        for polygon in &record.geometry {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                let points = project_ring(viewport, ring);
                draw_dashed_polyline(panel, &points, BLACK, width, width, width * 1.65);
            }
        }
    }
}

pub fn draw_coastlines(panel: &mut RgbaImage, viewport: &Viewport, coastlines: &CoastlineLayer) {
    let width = pt(0.5).max(1.0);
    for line in coastlines.lines() {
        if !visible(viewport, line.bounding_rect().map(BoundingBox::from)) {
            continue;
        }
        let points = project_ring(viewport, line);
        draw_polyline(panel, &points, BLACK, width);
    }
}

/// Unfilled outline of every ring of `geometry`.
pub fn draw_outline(
    panel: &mut RgbaImage,
    viewport: &Viewport,
    geometry: &MultiPolygon<f64>,
    color: Rgba<u8>,
    width: f32,
) {
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let points = project_ring(viewport, ring);
            draw_polyline(panel, &points, color, width);
        }
    }
}

/// Graticule spacing giving at most six lines across `span` degrees.
pub fn grid_step(span: f64) -> f64 {
    const STEPS: [f64; 16] = [
        0.05, 0.1, 0.2, 0.25, 0.5, 1.0, 2.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0, 90.0,
    ];
    STEPS
        .iter()
        .copied()
        .find(|step| span / step <= 6.0)
        .unwrap_or(90.0)
}

fn grid_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let magnitude = value.abs();
    let number = if (magnitude - magnitude.round()).abs() < 1e-9 {
        format!("{:.0}", magnitude)
    } else {
        let text = format!("{:.2}", magnitude);
        text.trim_end_matches('0').to_string()
    };
    if magnitude < 1e-9 {
        format!("{}°", number)
    } else if value > 0.0 {
        format!("{}°{}", number, positive)
    } else {
        format!("{}°{}", number, negative)
    }
}

pub fn format_lon(lon: f64) -> String {
    format_degrees(lon, 'E', 'W')
}

pub fn format_lat(lat: f64) -> String {
    format_degrees(lat, 'N', 'S')
}

/// Grid lines inside the axes.
pub fn draw_graticule(panel: &mut RgbaImage, viewport: &Viewport) {
    let extent = viewport.extent;
    let step = grid_step(extent.width().max(extent.height()));
    let width = pt(0.5).max(1.0);

    for lon in grid_values(extent.west, extent.east, step) {
        let top = viewport.to_local(lon, extent.north);
        let bottom = viewport.to_local(lon, extent.south);
        draw_polyline(panel, &[top, bottom], GRAY, width);
    }
    for lat in grid_values(extent.south, extent.north, step) {
        let left = viewport.to_local(extent.west, lat);
        let right = viewport.to_local(extent.east, lat);
        draw_polyline(panel, &[left, right], GRAY, width);
    }
}

/// Degree labels on all four edges, drawn on the figure outside the axes.
pub fn draw_graticule_labels(figure: &mut RgbaImage, viewport: &Viewport, font: &FontVec) {
    let extent = viewport.extent;
    let step = grid_step(extent.width().max(extent.height()));
    let style = TextStyle::new(font, pt(8.0));
    let frame = viewport.frame;
    let gap = pt(4.0);

    for lon in grid_values(extent.west, extent.east, step) {
        let label = format_lon(lon);
        let (x, _) = viewport.to_figure(lon, extent.north);
        let (_, h) = style.measure(&label);
        draw_text_centered(
            figure,
            &style,
            &label,
            x,
            frame.y as f32 - gap - h as f32 / 2.0,
        );
        draw_text_centered(
            figure,
            &style,
            &label,
            x,
            (frame.y + frame.height) as f32 + gap + h as f32 / 2.0,
        );
    }
    for lat in grid_values(extent.south, extent.north, step) {
        let label = format_lat(lat);
        let (_, y) = viewport.to_figure(extent.west, lat);
        let (w, _) = style.measure(&label);
        draw_text_centered(
            figure,
            &style,
            &label,
            frame.x as f32 - gap - w as f32 / 2.0,
            y,
        );
        draw_text_centered(
            figure,
            &style,
            &label,
            (frame.x + frame.width) as f32 + gap + w as f32 / 2.0,
            y,
        );
    }
}

/// Largest 1-2-5 length not above `max_km`.
pub fn nice_scale_length(max_km: f64) -> f64 {
    if max_km <= 0.0 || !max_km.is_finite() {
        return 0.0;
    }
    let magnitude = 10f64.powf(max_km.log10().floor());
    [5.0, 2.0, 1.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|length| *length <= max_km)
        .unwrap_or(magnitude)
}

/// Kilometres per horizontal pixel at the map's centre latitude.
pub fn km_per_pixel(viewport: &Viewport) -> f64 {
    let cos_lat = viewport.extent.center_lat().to_radians().cos().max(0.01);
    viewport.degrees_per_pixel() * KM_PER_DEGREE * cos_lat
}

/// Two-segment kilometre bar in the lower-left corner of the axes.
pub fn draw_scale_bar(panel: &mut RgbaImage, viewport: &Viewport, font: Option<&FontVec>) {
    let km_per_px = km_per_pixel(viewport);
    let (width, height) = panel.dimensions();
    let length_km = nice_scale_length(km_per_px * width as f64 * 0.2);
    if length_km <= 0.0 {
        return;
    }
    let length_px = (length_km / km_per_px) as f32;
    let bar_height = pt(3.0);
    let pad = pt(6.0);

    let label = if length_km >= 1.0 {
        format!("{} km", length_km)
    } else {
        format!("{} m", length_km * 1000.0)
    };
    let label_height = font
        .map(|font| TextStyle::new(font, pt(8.0)).measure(&label).1 as f32)
        .unwrap_or(0.0);

    let x0 = pad * 2.0;
    let y_bar = height as f32 - pad * 2.0 - bar_height;
    let box_top = y_bar - label_height - pad * 1.5;
    fill_rect_blend(
        panel,
        (x0 - pad) as i32,
        box_top as i32,
        (length_px + pad * 2.0) as u32,
        (height as f32 - pad - box_top) as u32,
        Rgba([255, 255, 255, 204]),
    );

    let half = length_px / 2.0;
    for (i, color) in [BLACK, WHITE].into_iter().enumerate() {
        let start = x0 + half * i as f32;
        fill_rect_blend(
            panel,
            start as i32,
            y_bar as i32,
            half.ceil() as u32,
            bar_height.ceil() as u32,
            color,
        );
    }
    let outline = [
        (x0, y_bar),
        (x0 + length_px, y_bar),
        (x0 + length_px, y_bar + bar_height),
        (x0, y_bar + bar_height),
        (x0, y_bar),
    ];
    draw_polyline(panel, &outline, BLACK, 1.0);

    if let Some(font) = font {
        let style = TextStyle::new(font, pt(8.0));
        draw_text_centered(
            panel,
            &style,
            &label,
            x0 + length_px / 2.0,
            y_bar - pad * 0.5 - label_height / 2.0,
        );
    }
}

/// "N" at axes fraction (0.1, 0.8) with an arrow up to (0.1, 0.9).
pub fn draw_north_arrow(panel: &mut RgbaImage, viewport: &Viewport, font: Option<&FontVec>) {
    let (tx, ty) = viewport.axes_fraction(0.1, 0.8);
    let (hx, hy) = viewport.axes_fraction(0.1, 0.9);
    let letter_half = pt(12.0) / 2.0;

    let shaft_half = pt(5.0) / 2.0;
    let head_half = pt(15.0) / 2.0;
    let head_length = head_half * 1.2;
    let shaft_bottom = ty - letter_half - pt(2.0);
    let head_base = hy + head_length;

    if shaft_bottom > head_base {
        fill_rect_blend(
            panel,
            (tx - shaft_half) as i32,
            head_base as i32,
            (shaft_half * 2.0) as u32,
            (shaft_bottom - head_base) as u32,
            BLACK,
        );
    }
    fill_triangle(
        panel,
        [(hx, hy), (hx - head_half, head_base), (hx + head_half, head_base)],
        BLACK,
    );

    if let Some(font) = font {
        let style = TextStyle::new(font, pt(12.0));
        draw_text_centered(panel, &style, "N", tx, ty);
    }
}

/// Single line of text at an exact pixel, used for the title.
pub fn draw_title(figure: &mut RgbaImage, viewport: &Viewport, font: &FontVec, title: &str) {
    if title.trim().is_empty() {
        return;
    }
    let style = TextStyle::new(font, pt(12.0)).bold();
    let (w, h) = style.measure(title);
    let frame = viewport.frame;
    // Clear of the top graticule labels.
    let y = frame.y as f32 - pt(8.0) * 2.0 - pt(6.0) - h as f32;
    let x = (frame.x + frame.width / 2.0) as f32 - w as f32 / 2.0;
    draw_text_at(figure, &style, title, x.round() as i32, y.max(0.0).round() as i32);
}

/// Target labels: one per polygon part for a country, a marker plus a label
/// one degree north for a geocoded place.
pub fn draw_target_labels(
    panel: &mut RgbaImage,
    viewport: &Viewport,
    target: &ResolvedTarget,
    font: Option<&FontVec>,
) {
    let style = font.map(|font| TextStyle::new(font, pt(9.0)).boxed(LABEL_BOX));

    match &target.origin {
        TargetOrigin::Country => {
            let Some(style) = style else { return };
            for polygon in &target.geometry {
                let Some(anchor) = polygon.interior_point() else {
                    continue;
                };
                let (x, y) = viewport.to_local(anchor.x(), anchor.y());
                draw_text_centered(panel, &style, &target.label, x, y);
            }
        }
        TargetOrigin::Place { point } => {
            let (x, y) = viewport.to_local(point.x(), point.y());
            let radius = (pt(5.0) / 2.0).round().max(2.0) as i32;
            draw_filled_circle_mut(panel, (x.round() as i32, y.round() as i32), radius, RED);
            if let Some(style) = style {
                let (lx, ly) = viewport.to_local(point.x(), point.y() + LABEL_OFFSET_DEG);
                draw_text_centered(panel, &style, &target.label, lx, ly);
            }
        }
    }
}
