//! Pixel-level edits applied to the working image.
//!
//! Everything here is pure with respect to editor state: functions take an
//! image (and geometry in image space) and either mutate that buffer or return
//! a new one. History bookkeeping lives in `editor`.

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::coords::ImagePoint;

/// Smallest crop accepted on either axis, in image pixels.
pub const MIN_TRIM_SIZE: u32 = 10;

pub const MIN_SATURATION: f32 = 0.0;
pub const MAX_SATURATION: f32 = 5.0;

/// Fill the closed polygon through `points` with an opaque `color`.
pub fn fill_polygon(image: &mut RgbaImage, points: &[ImagePoint], color: [u8; 3]) {
    let mut poly: Vec<Point<i32>> = points
        .iter()
        .map(|p| Point::new(p.x as i32, p.y as i32))
        .collect();
    poly.dedup();

    // The rasteriser closes the ring itself and panics on an explicit closing vertex.
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    let rgba = Rgba([color[0], color[1], color[2], 255]);
    match poly.as_slice() {
        [] => {}
        [p] => {
            if let Some(pixel) = image.get_pixel_mut_checked(p.x as u32, p.y as u32) {
                *pixel = rgba;
            }
        }
        // Collapsed to a segment: nothing to fill, so trace it.
        [a, b] => draw_line_segment_mut(
            image,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            rgba,
        ),
        _ => draw_polygon_mut(image, &poly, rgba),
    }
}

/// A rectangle being dragged out in image space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimSelection {
    pub start: ImagePoint,
    pub end: ImagePoint,
}

impl TrimSelection {
    pub fn new(start: ImagePoint) -> Self {
        Self { start, end: start }
    }

    /// `(left, top, right, bottom)` regardless of drag direction.
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        (
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    pub fn size(&self) -> (u32, u32) {
        let (left, top, right, bottom) = self.bounds();
        (right - left, bottom - top)
    }

    pub fn is_large_enough(&self) -> bool {
        let (w, h) = self.size();
        w >= MIN_TRIM_SIZE && h >= MIN_TRIM_SIZE
    }
}

/// Copy out the region `[left, right) x [top, bottom)` of the selection.
pub fn crop(image: &RgbaImage, selection: &TrimSelection) -> RgbaImage {
    let (left, top, _, _) = selection.bounds();
    let (w, h) = selection.size();
    imageops::crop_imm(image, left, top, w, h).to_image()
}

/// Move points into the coordinate system of a crop whose origin was
/// `(left, top)`, dropping those that fall outside the `size` result.
pub fn rebase_points(
    points: &[ImagePoint],
    origin: (u32, u32),
    size: (u32, u32),
) -> Vec<ImagePoint> {
    points
        .iter()
        .filter_map(|p| {
            let x = p.x.checked_sub(origin.0)?;
            let y = p.y.checked_sub(origin.1)?;
            (x < size.0 && y < size.1).then_some(ImagePoint { x, y })
        })
        .collect()
}

/// Scale each pixel's distance from its own luma by `factor`.
///
/// 1.0 leaves the image untouched, 0.0 yields greyscale, and values above
/// 1.0 push colours further from grey. Alpha is left as is.
pub fn enhance_saturation(image: &RgbaImage, factor: f32) -> RgbaImage {
    let factor = factor.clamp(MIN_SATURATION, MAX_SATURATION);
    if factor == 1.0 {
        return image.clone();
    }

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let gray = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) as f32 / 1000.0;
        let blend = |c: u8| (gray + factor * (c as f32 - gray)).round().clamp(0.0, 255.0) as u8;
        *pixel = Rgba([blend(r), blend(g), blend(b), a]);
    }
    out
}
