use eframe::egui;

// Absorbs f64 noise in `w * (canvas / w)` so exact fits don't floor one pixel short.
const EPSILON: f64 = 1e-6;

/// A pixel position in the (possibly cropped) working image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImagePoint {
    pub x: u32,
    pub y: u32,
}

impl ImagePoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for ImagePoint {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// How the working image is fitted into the canvas for the current frame.
///
/// `ratio` maps image-space distances to canvas-space distances and never
/// exceeds 1.0: small images are shown at native size, large ones are shrunk
/// to fit. The displayed image is centred, so `offset` is the canvas position
/// of its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleState {
    pub ratio: f64,
    pub image_size: (u32, u32),
    pub display_size: (u32, u32),
    pub offset: (i32, i32),
}

impl ScaleState {
    /// Fit an image of `image_size` into a canvas of `canvas` points.
    pub fn fit(canvas: egui::Vec2, image_size: (u32, u32)) -> Self {
        let (w, h) = image_size;
        let cw = canvas.x.max(0.0).floor() as f64;
        let ch = canvas.y.max(0.0).floor() as f64;

        let ratio = if w == 0 || h == 0 {
            1.0
        } else {
            (cw / w as f64).min(ch / h as f64)
        };

        let (ratio, display_size) = if ratio >= 1.0 {
            (1.0, image_size)
        } else {
            let dw = ((w as f64 * ratio + EPSILON).floor() as u32).max(1);
            let dh = ((h as f64 * ratio + EPSILON).floor() as u32).max(1);
            (ratio, (dw, dh))
        };

        let offset = (
            (cw as i64 - display_size.0 as i64).div_euclid(2) as i32,
            (ch as i64 - display_size.1 as i64).div_euclid(2) as i32,
        );

        Self {
            ratio,
            image_size,
            display_size,
            offset,
        }
    }

    pub fn is_downscaled(&self) -> bool {
        self.display_size != self.image_size
    }

    /// Canvas position → image pixel, or `None` when the position lies
    /// outside the displayed image.
    pub fn to_image_space(&self, canvas_pos: egui::Pos2) -> Option<ImagePoint> {
        let rel_x = canvas_pos.x as f64 - self.offset.0 as f64;
        let rel_y = canvas_pos.y as f64 - self.offset.1 as f64;
        let (dw, dh) = self.display_size;

        if rel_x < 0.0 || rel_y < 0.0 || rel_x >= dw as f64 || rel_y >= dh as f64 {
            return None;
        }

        let (w, h) = self.image_size;
        let x = ((rel_x / self.ratio).floor() as u32).min(w.saturating_sub(1));
        let y = ((rel_y / self.ratio).floor() as u32).min(h.saturating_sub(1));
        Some(ImagePoint { x, y })
    }

    /// Image pixel → canvas position. Only used for markers, so no bounds check.
    pub fn to_display_space(&self, point: ImagePoint) -> egui::Pos2 {
        let x = (point.x as f64 * self.ratio + EPSILON).floor() + self.offset.0 as f64;
        let y = (point.y as f64 * self.ratio + EPSILON).floor() + self.offset.1 as f64;
        egui::pos2(x as f32, y as f32)
    }

    /// Where the displayed image sits, given the canvas origin on screen.
    pub fn display_rect(&self, canvas_origin: egui::Pos2) -> egui::Rect {
        let min = canvas_origin + egui::vec2(self.offset.0 as f32, self.offset.1 as f32);
        egui::Rect::from_min_size(
            min,
            egui::vec2(self.display_size.0 as f32, self.display_size.1 as f32),
        )
    }
}
