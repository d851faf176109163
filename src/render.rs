//! Canvas preview: the (possibly downscaled) working image plus the point,
//! line and selection overlays drawn on top of it.

use eframe::egui;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::time::{Duration, Instant};

use crate::coords::{ImagePoint, ScaleState};
use crate::editor::Editor;
use crate::ops::TrimSelection;

/// How long the canvas size must hold still before the preview is resampled.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(100);

const MARKER_RADIUS: f32 = 3.0;
const MARKER_COLOR: egui::Color32 = egui::Color32::BLUE;
const LINE_WIDTH: f32 = 2.0;
const SELECTION_COLOR: egui::Color32 = egui::Color32::RED;
const SELECTION_WIDTH: f32 = 2.0;
const DASH: f32 = 4.0;

#[derive(Debug, PartialEq)]
enum Refresh {
    UpToDate,
    Rebuild,
    Wait(Duration),
}

#[derive(Default)]
pub struct Preview {
    texture: Option<egui::TextureHandle>,
    built_generation: u64,
    built_size: Option<(u32, u32)>,
    resize_seen: Option<Instant>,
}

impl Preview {
    /// Bring the texture in line with the editor's image and scale.
    ///
    /// A new image is resampled straight away. A canvas resize waits for
    /// [`RESIZE_SETTLE`] and the old texture is stretched until then.
    pub fn refresh(&mut self, ctx: &egui::Context, editor: &Editor) {
        let Some(image) = editor.image() else {
            self.texture = None;
            self.built_size = None;
            return;
        };
        let Some(scale) = editor.scale() else {
            // canvas not laid out yet
            ctx.request_repaint_after(RESIZE_SETTLE);
            return;
        };

        match self.check(editor.generation(), &scale, Instant::now()) {
            Refresh::UpToDate => {}
            Refresh::Wait(left) => ctx.request_repaint_after(left),
            Refresh::Rebuild => self.rebuild(ctx, image, &scale, editor.generation()),
        }
    }

    fn check(&mut self, generation: u64, scale: &ScaleState, now: Instant) -> Refresh {
        if self.texture.is_none() || self.built_generation != generation {
            return Refresh::Rebuild;
        }
        if self.built_size == Some(scale.display_size) {
            self.resize_seen = None;
            return Refresh::UpToDate;
        }
        let seen = *self.resize_seen.get_or_insert(now);
        let waited = now.saturating_duration_since(seen);
        if waited >= RESIZE_SETTLE {
            Refresh::Rebuild
        } else {
            Refresh::Wait(RESIZE_SETTLE - waited)
        }
    }

    fn rebuild(&mut self, ctx: &egui::Context, image: &RgbaImage, scale: &ScaleState, generation: u64) {
        let color_image = if scale.is_downscaled() {
            let (w, h) = scale.display_size;
            to_color_image(&imageops::resize(image, w, h, FilterType::Lanczos3))
        } else {
            to_color_image(image)
        };

        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.built_generation = generation;
        self.built_size = Some(scale.display_size);
        self.resize_seen = None;

        tracing::debug!(
            "preview rebuilt at {}x{} (ratio {:.3})",
            scale.display_size.0,
            scale.display_size.1,
            scale.ratio
        );
    }

    pub fn paint(&self, painter: &egui::Painter, canvas_rect: egui::Rect, editor: &Editor) {
        let Some(scale) = editor.scale() else {
            return;
        };
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                scale.display_rect(canvas_rect.min),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.extend(overlay_shapes(
            canvas_rect.min,
            &scale,
            editor.points(),
            editor.selection(),
        ));
    }
}

fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, image.as_flat_samples().as_slice())
}

/// Markers for every point, lines joining consecutive points, and the
/// dashed outline of a pending selection.
fn overlay_shapes(
    origin: egui::Pos2,
    scale: &ScaleState,
    points: &[ImagePoint],
    selection: Option<&TrimSelection>,
) -> Vec<egui::Shape> {
    let to_screen = |p: ImagePoint| origin + scale.to_display_space(p).to_vec2();
    let mut shapes = Vec::with_capacity(points.len() * 2 + 8);

    let mut prev: Option<egui::Pos2> = None;
    for &point in points {
        let pos = to_screen(point);
        // line first so the marker sits on top of it
        if let Some(prev) = prev {
            shapes.push(egui::Shape::line_segment(
                [prev, pos],
                egui::Stroke::new(LINE_WIDTH, MARKER_COLOR),
            ));
        }
        shapes.push(egui::Shape::circle_filled(pos, MARKER_RADIUS, MARKER_COLOR));
        prev = Some(pos);
    }

    if let Some(selection) = selection {
        let a = to_screen(selection.start);
        let b = to_screen(selection.end);
        let rect = egui::Rect::from_two_pos(a, b);
        let outline = [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
            rect.left_top(),
        ];
        shapes.extend(egui::Shape::dashed_line(
            &outline,
            egui::Stroke::new(SELECTION_WIDTH, SELECTION_COLOR),
            DASH,
            DASH,
        ));
    }

    shapes
}
