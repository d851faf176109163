//! Editor state and the operations the UI drives.
//!
//! `Editor` owns the working image, its snapshot history, the polygon point
//! list and the interaction mode. It never touches the toolkit: pointer
//! positions arrive in canvas space and are mapped through the current
//! [`ScaleState`], and failures come back as [`EditError`] for the caller to
//! show.

use eframe::egui;
use image::RgbaImage;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::codec::{self, SaveFormat};
use crate::coords::{ImagePoint, ScaleState};
use crate::history::History;
use crate::ops::{self, TrimSelection, MAX_SATURATION, MIN_SATURATION, MIN_TRIM_SIZE};

#[derive(Debug)]
pub enum EditError {
    NoImage,
    NotEnoughPoints { have: usize },
    SelectionTooSmall { width: u32, height: u32 },
    IncompleteSelection,
    Load(anyhow::Error),
    Save(anyhow::Error),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::NoImage => write!(f, "Open an image first."),
            EditError::NotEnoughPoints { have } => write!(
                f,
                "At least 3 points are needed to fill an area ({have} placed)."
            ),
            EditError::SelectionTooSmall { width, height } => write!(
                f,
                "The selection ({width}x{height}) is too small. Select at least \
                 {MIN_TRIM_SIZE}x{MIN_TRIM_SIZE} pixels."
            ),
            EditError::IncompleteSelection => write!(f, "No area is selected."),
            EditError::Load(e) => write!(f, "Failed to load image: {e:#}"),
            EditError::Save(e) => write!(f, "Failed to save image: {e:#}"),
        }
    }
}

impl std::error::Error for EditError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Primary click adds a polygon point, secondary click fills it.
    #[default]
    Normal,
    /// Press-drag-release selects a rectangle to crop to.
    Trimming,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "Normal",
            Mode::Trimming => "Trimming",
        }
    }
}

/// Pointer input in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pointer {
    Click(egui::Pos2),
    SecondaryClick(egui::Pos2),
    Press(egui::Pos2),
    Drag(egui::Pos2),
    Release(egui::Pos2),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeChange {
    EnteredTrimming,
    LeftTrimming { cropped: Option<(u32, u32)> },
}

pub struct Editor {
    image: Option<RgbaImage>,
    history: History,
    path: Option<PathBuf>,

    points: Vec<ImagePoint>,
    mode: Mode,
    selection: Option<TrimSelection>,

    saturation: f32,
    fill_color: [u8; 3],
    unsaved: bool,

    viewport: egui::Vec2,
    scale: Option<ScaleState>,
    // bumped whenever `image` is replaced or mutated
    generation: u64,
}

impl Editor {
    pub fn new(fill_color: [u8; 3]) -> Self {
        Self {
            image: None,
            history: History::default(),
            path: None,
            points: Vec::new(),
            mode: Mode::Normal,
            selection: None,
            saturation: 1.0,
            fill_color,
            unsaved: false,
            viewport: egui::Vec2::ZERO,
            scale: None,
            generation: 0,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Option<&TrimSelection> {
        self.selection.as_ref()
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn fill_color(&self) -> [u8; 3] {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: [u8; 3]) {
        self.fill_color = color;
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn scale(&self) -> Option<ScaleState> {
        self.scale
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Viewport ───────────────────────────────────────────────────────────

    /// Record the canvas size. Until the canvas reports more than one point
    /// on both axes there is no usable scale and pointer input is ignored.
    pub fn set_viewport(&mut self, canvas: egui::Vec2) {
        if canvas != self.viewport {
            self.viewport = canvas;
            self.refit();
        }
    }

    fn refit(&mut self) {
        let laid_out = self.viewport.x > 1.0 && self.viewport.y > 1.0;
        self.scale = match &self.image {
            Some(img) if laid_out => Some(ScaleState::fit(self.viewport, img.dimensions())),
            _ => None,
        };
    }

    fn to_image_space(&self, canvas_pos: egui::Pos2) -> Option<ImagePoint> {
        self.scale?.to_image_space(canvas_pos)
    }

    fn replace_working(&mut self, image: RgbaImage) {
        self.image = Some(image);
        self.generation += 1;
        self.refit();
    }

    fn require_image(&self) -> Result<(), EditError> {
        if self.image.is_some() {
            Ok(())
        } else {
            tracing::debug!("operation rejected: no image loaded");
            Err(EditError::NoImage)
        }
    }

    // ── File I/O ───────────────────────────────────────────────────────────

    /// Decode `path` and make it the working image. On failure nothing changes.
    pub fn load(&mut self, path: &Path) -> Result<(), EditError> {
        let image = codec::decode(path).map_err(|e| {
            tracing::error!("load {} failed: {e:#}", path.display());
            EditError::Load(e)
        })?;
        tracing::info!(
            "loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        self.set_image(image, Some(path.to_path_buf()));
        Ok(())
    }

    /// Start a fresh session on `image`: one-snapshot history, no points,
    /// no selection, saturation back to 1.0.
    pub fn set_image(&mut self, image: RgbaImage, path: Option<PathBuf>) {
        self.history.reset(&image);
        self.path = path;
        self.points.clear();
        self.selection = None;
        self.saturation = 1.0;
        self.unsaved = false;
        self.replace_working(image);
    }

    pub fn save(&mut self, path: &Path, format: SaveFormat) -> Result<(), EditError> {
        let image = self.image.as_ref().ok_or(EditError::NoImage)?;
        codec::encode(image, path, format).map_err(|e| {
            tracing::error!("save {} failed: {e:#}", path.display());
            EditError::Save(e)
        })?;
        tracing::info!("saved {} as {:?}", path.display(), format);
        self.unsaved = false;
        Ok(())
    }

    // ── Pointer dispatch ───────────────────────────────────────────────────

    pub fn handle_pointer(&mut self, event: Pointer) -> Result<(), EditError> {
        match self.mode {
            Mode::Normal => match event {
                Pointer::Click(pos) => self.add_point_at(pos),
                Pointer::SecondaryClick(pos) => self.fill_at(pos),
                _ => Ok(()),
            },
            Mode::Trimming => match event {
                Pointer::Press(pos) => self.begin_trim(pos),
                Pointer::Drag(pos) => {
                    self.update_trim(pos);
                    Ok(())
                }
                Pointer::Release(pos) => self.end_trim(pos),
                _ => Ok(()),
            },
        }
    }

    fn add_point_at(&mut self, pos: egui::Pos2) -> Result<(), EditError> {
        self.require_image()?;
        if let Some(point) = self.to_image_space(pos) {
            self.add_point(point)?;
        }
        Ok(())
    }

    pub fn add_point(&mut self, point: ImagePoint) -> Result<(), EditError> {
        self.require_image()?;
        self.points.push(point);
        Ok(())
    }

    fn fill_at(&mut self, pos: egui::Pos2) -> Result<(), EditError> {
        self.require_image()?;
        if self.to_image_space(pos).is_none() {
            return Ok(());
        }
        self.fill()
    }

    /// Fill the polygon through the accumulated points. The pre-fill and
    /// post-fill images are both committed, so one undo restores the image
    /// exactly as it was before the fill.
    pub fn fill(&mut self) -> Result<(), EditError> {
        self.require_image()?;
        if self.points.len() < 3 {
            return Err(EditError::NotEnoughPoints {
                have: self.points.len(),
            });
        }
        let Some(image) = self.image.as_mut() else {
            return Err(EditError::NoImage);
        };

        self.history.push(image);
        ops::fill_polygon(image, &self.points, self.fill_color);
        self.history.push(image);
        self.generation += 1;

        tracing::info!(
            "filled {}-point polygon; history {}/{}",
            self.points.len(),
            self.history.index() + 1,
            self.history.len()
        );
        self.points.clear();
        self.unsaved = true;
        Ok(())
    }

    // ── Trimming ───────────────────────────────────────────────────────────

    /// Switch between Normal and Trimming. Leaving Trimming applies the
    /// pending selection, if any.
    pub fn toggle_trimming(&mut self) -> Result<ModeChange, EditError> {
        match self.mode {
            Mode::Normal => {
                self.mode = Mode::Trimming;
                self.selection = None;
                tracing::info!("mode: trimming");
                Ok(ModeChange::EnteredTrimming)
            }
            Mode::Trimming => {
                self.mode = Mode::Normal;
                tracing::info!("mode: normal");
                if self.selection.is_none() {
                    return Ok(ModeChange::LeftTrimming { cropped: None });
                }
                let result = self.crop();
                self.selection = None;
                result.map(|size| ModeChange::LeftTrimming {
                    cropped: Some(size),
                })
            }
        }
    }

    fn begin_trim(&mut self, pos: egui::Pos2) -> Result<(), EditError> {
        self.require_image()?;
        self.selection = None;
        if let Some(point) = self.to_image_space(pos) {
            self.selection = Some(TrimSelection::new(point));
        }
        Ok(())
    }

    fn update_trim(&mut self, pos: egui::Pos2) {
        let Some(point) = self.to_image_space(pos) else {
            return;
        };
        if let Some(selection) = self.selection.as_mut() {
            selection.end = point;
        }
    }

    fn end_trim(&mut self, pos: egui::Pos2) -> Result<(), EditError> {
        let Some(point) = self.to_image_space(pos) else {
            return Ok(());
        };
        let Some(selection) = self.selection.as_mut() else {
            return Ok(());
        };
        selection.end = point;

        if !selection.is_large_enough() {
            let (width, height) = selection.size();
            self.selection = None;
            return Err(EditError::SelectionTooSmall { width, height });
        }
        Ok(())
    }

    /// Crop to the pending selection and return the new image size.
    ///
    /// Polygon points are moved into the cropped image's coordinates and any
    /// that fall outside it are dropped.
    pub fn crop(&mut self) -> Result<(u32, u32), EditError> {
        self.require_image()?;
        let selection = self.selection.ok_or(EditError::IncompleteSelection)?;
        if !selection.is_large_enough() {
            let (width, height) = selection.size();
            tracing::debug!("crop rejected: {width}x{height}");
            self.selection = None;
            return Err(EditError::SelectionTooSmall { width, height });
        }
        let Some(image) = self.image.as_ref() else {
            return Err(EditError::NoImage);
        };

        self.history.push(image);
        let cropped = ops::crop(image, &selection);
        let size = cropped.dimensions();
        self.history.push(&cropped);

        let (left, top, _, _) = selection.bounds();
        self.points = ops::rebase_points(&self.points, (left, top), size);
        self.selection = None;
        self.unsaved = true;
        self.replace_working(cropped);

        tracing::info!(
            "cropped to {}x{}; history {}/{}",
            size.0,
            size.1,
            self.history.index() + 1,
            self.history.len()
        );
        Ok(size)
    }

    #[cfg(test)]
    fn set_selection(&mut self, selection: TrimSelection) {
        self.selection = Some(selection);
    }

    // ── Saturation ─────────────────────────────────────────────────────────

    /// Show the last committed snapshot with saturation `value`.
    /// Nothing is committed to history.
    pub fn set_saturation(&mut self, value: f32) -> Result<(), EditError> {
        self.require_image()?;
        self.saturation = value.clamp(MIN_SATURATION, MAX_SATURATION);
        if let Some(committed) = self.history.current() {
            let enhanced = ops::enhance_saturation(committed, self.saturation);
            self.replace_working(enhanced);
        }
        self.unsaved = true;
        Ok(())
    }

    // ── History ────────────────────────────────────────────────────────────

    /// Step back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.image.is_none() {
            return false;
        }
        let Some(snapshot) = self.history.undo() else {
            tracing::debug!("nothing to undo");
            return false;
        };
        let restored = ops::enhance_saturation(snapshot, self.saturation);
        tracing::info!("undo to {}/{}", self.history.index() + 1, self.history.len());
        self.replace_working(restored);
        self.unsaved = true;
        true
    }

    /// Step forward one snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.image.is_none() {
            return false;
        }
        let Some(snapshot) = self.history.redo() else {
            tracing::debug!("nothing to redo");
            return false;
        };
        let restored = ops::enhance_saturation(snapshot, self.saturation);
        tracing::info!("redo to {}/{}", self.history.index() + 1, self.history.len());
        self.replace_working(restored);
        self.unsaved = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: [u8; 3] = [255, 255, 255];
    const RED: [u8; 3] = [255, 0, 0];

    fn loaded(w: u32, h: u32) -> Editor {
        let mut e = Editor::new(WHITE);
        e.set_image(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])), None);
        e.set_viewport(egui::vec2(w as f32, h as f32));
        e
    }

    fn colorful(w: u32, h: u32) -> RgbaImage {
        let mut img = RgbaImage::new(w, h);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 3) as u8, (y * 5) as u8, 120, 255]);
        }
        img
    }

    fn click(e: &mut Editor, x: f32, y: f32) {
        e.handle_pointer(Pointer::Click(egui::pos2(x, y))).unwrap();
    }

    #[test]
    fn test_fill_scenario() {
        let mut e = loaded(200, 200);
        e.set_fill_color(RED);
        click(&mut e, 10.0, 10.0);
        click(&mut e, 100.0, 10.0);
        click(&mut e, 100.0, 100.0);
        assert_eq!(e.points().len(), 3);

        let before = e.history().len();
        e.handle_pointer(Pointer::SecondaryClick(egui::pos2(50.0, 50.0)))
            .unwrap();

        assert_eq!(e.history().len(), before + 2);
        assert!(e.points().is_empty());
        assert!(e.has_unsaved_changes());
        assert_eq!(e.image().unwrap().get_pixel(90, 20), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_with_points_on_one_pixel() {
        let mut e = loaded(100, 100);
        e.set_fill_color(RED);
        for _ in 0..3 {
            click(&mut e, 20.0, 20.0);
        }
        e.handle_pointer(Pointer::SecondaryClick(egui::pos2(20.0, 20.0)))
            .unwrap();

        assert!(e.points().is_empty());
        assert_eq!(e.history().len(), 3);
        assert_eq!(e.image().unwrap().get_pixel(20, 20), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_needs_three_points() {
        let mut e = loaded(200, 200);
        click(&mut e, 10.0, 10.0);
        click(&mut e, 100.0, 10.0);

        let before = e.history().len();
        let err = e
            .handle_pointer(Pointer::SecondaryClick(egui::pos2(50.0, 50.0)))
            .unwrap_err();
        assert!(matches!(err, EditError::NotEnoughPoints { have: 2 }));
        assert_eq!(e.history().len(), before);
        assert_eq!(e.points().len(), 2);
        assert!(!e.has_unsaved_changes());
    }

    #[test]
    fn test_fill_click_outside_image_is_ignored() {
        let mut e = loaded(100, 100);
        e.set_viewport(egui::vec2(300.0, 300.0));
        for (x, y) in [(110.0, 110.0), (180.0, 110.0), (180.0, 180.0)] {
            click(&mut e, x, y);
        }
        e.handle_pointer(Pointer::SecondaryClick(egui::pos2(5.0, 5.0)))
            .unwrap();
        assert_eq!(e.history().len(), 1);
        assert_eq!(e.points().len(), 3);
    }

    #[test]
    fn test_click_outside_image_adds_nothing() {
        let mut e = loaded(100, 100);
        e.set_viewport(egui::vec2(300.0, 100.0));
        click(&mut e, 50.0, 50.0);
        assert!(e.points().is_empty());
        click(&mut e, 150.0, 50.0);
        assert_eq!(e.points(), &[ImagePoint::new(50, 50)]);
    }

    #[test]
    fn test_undo_restores_pre_fill_in_one_step() {
        let mut e = loaded(200, 200);
        let original = e.image().unwrap().clone();
        for (x, y) in [(10, 10), (100, 10), (100, 100)] {
            e.add_point(ImagePoint::new(x, y)).unwrap();
        }
        e.fill().unwrap();
        let filled = e.image().unwrap().clone();

        assert!(e.undo());
        assert_eq!(e.image().unwrap(), &original);
        assert!(e.redo());
        assert_eq!(e.image().unwrap(), &filled);
        assert!(!e.redo());
    }

    #[test]
    fn test_crop_scenario() {
        let mut e = loaded(300, 300);
        e.add_point(ImagePoint::new(60, 60)).unwrap();
        e.add_point(ImagePoint::new(10, 10)).unwrap();

        assert_eq!(e.toggle_trimming().unwrap(), ModeChange::EnteredTrimming);
        e.handle_pointer(Pointer::Press(egui::pos2(50.0, 50.0))).unwrap();
        e.handle_pointer(Pointer::Drag(egui::pos2(150.0, 100.0))).unwrap();
        e.handle_pointer(Pointer::Release(egui::pos2(250.0, 150.0)))
            .unwrap();
        assert!(e.selection().is_some());

        let change = e.toggle_trimming().unwrap();
        assert_eq!(
            change,
            ModeChange::LeftTrimming {
                cropped: Some((200, 100))
            }
        );
        assert_eq!(e.image().unwrap().dimensions(), (200, 100));
        assert_eq!(e.points(), &[ImagePoint::new(10, 10)]);
        assert_eq!(e.history().len(), 3);
        assert_eq!(e.mode(), Mode::Normal);
        assert!(e.selection().is_none());
        assert_eq!(e.scale().unwrap().image_size, (200, 100));
    }

    #[test]
    fn test_small_selection_is_rejected_on_release() {
        let mut e = loaded(300, 300);
        e.toggle_trimming().unwrap();
        e.handle_pointer(Pointer::Press(egui::pos2(50.0, 50.0))).unwrap();
        let err = e
            .handle_pointer(Pointer::Release(egui::pos2(55.0, 200.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::SelectionTooSmall {
                width: 5,
                height: 150
            }
        ));
        assert!(e.selection().is_none());

        assert_eq!(
            e.toggle_trimming().unwrap(),
            ModeChange::LeftTrimming { cropped: None }
        );
        assert_eq!(e.history().len(), 1);
        assert_eq!(e.image().unwrap().dimensions(), (300, 300));
    }

    #[test]
    fn test_small_selection_is_rejected_on_commit() {
        let mut e = loaded(300, 300);
        e.toggle_trimming().unwrap();
        e.set_selection(TrimSelection {
            start: ImagePoint::new(50, 50),
            end: ImagePoint::new(200, 59),
        });
        let err = e.toggle_trimming().unwrap_err();
        assert!(matches!(err, EditError::SelectionTooSmall { .. }));
        assert_eq!(e.mode(), Mode::Normal);
        assert!(e.selection().is_none());
        assert_eq!(e.history().len(), 1);
        assert_eq!(e.image().unwrap().dimensions(), (300, 300));
    }

    #[test]
    fn test_normal_mode_ignores_drag_and_trimming_ignores_clicks() {
        let mut e = loaded(300, 300);
        e.handle_pointer(Pointer::Press(egui::pos2(10.0, 10.0))).unwrap();
        e.handle_pointer(Pointer::Release(egui::pos2(200.0, 200.0)))
            .unwrap();
        assert!(e.selection().is_none());

        e.toggle_trimming().unwrap();
        click(&mut e, 20.0, 20.0);
        e.handle_pointer(Pointer::SecondaryClick(egui::pos2(20.0, 20.0)))
            .unwrap();
        assert!(e.points().is_empty());
    }

    #[test]
    fn test_edits_without_image_are_rejected() {
        let mut e = Editor::new(WHITE);
        e.set_viewport(egui::vec2(500.0, 500.0));
        assert!(matches!(
            e.handle_pointer(Pointer::Click(egui::pos2(1.0, 1.0))),
            Err(EditError::NoImage)
        ));
        assert!(matches!(e.fill(), Err(EditError::NoImage)));
        assert!(matches!(e.crop(), Err(EditError::NoImage)));
        assert!(matches!(e.set_saturation(2.0), Err(EditError::NoImage)));
        e.toggle_trimming().unwrap();
        assert!(matches!(
            e.handle_pointer(Pointer::Press(egui::pos2(1.0, 1.0))),
            Err(EditError::NoImage)
        ));
        assert!(!e.undo());
        assert!(!e.redo());
        assert!(e.history().is_empty());
        assert_eq!(e.saturation(), 1.0);
    }

    #[test]
    fn test_saturation_is_recomputed_from_committed_snapshot() {
        let mut e = Editor::new(WHITE);
        let img = colorful(40, 40);
        e.set_image(img.clone(), None);

        e.set_saturation(3.0).unwrap();
        e.set_saturation(0.2).unwrap();
        e.set_saturation(1.0).unwrap();
        assert_eq!(e.image().unwrap(), &img);
        assert_eq!(e.history().len(), 1);
        assert!(e.has_unsaved_changes());
    }

    #[test]
    fn test_saturation_reapplied_after_undo() {
        let mut e = Editor::new(WHITE);
        let img = colorful(40, 40);
        e.set_image(img.clone(), None);
        e.set_viewport(egui::vec2(40.0, 40.0));
        for (x, y) in [(1, 1), (30, 1), (30, 30)] {
            e.add_point(ImagePoint::new(x, y)).unwrap();
        }
        e.fill().unwrap();
        e.set_saturation(0.0).unwrap();

        assert!(e.undo());
        assert_eq!(e.image().unwrap(), &ops::enhance_saturation(&img, 0.0));
        assert_eq!(e.saturation(), 0.0);
    }

    #[test]
    fn test_load_failure_keeps_current_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = loaded(30, 20);
        e.add_point(ImagePoint::new(1, 1)).unwrap();
        let before = e.image().unwrap().clone();
        let generation = e.generation();

        let err = e.load(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, EditError::Load(_)));
        assert_eq!(e.image().unwrap(), &before);
        assert_eq!(e.points().len(), 1);
        assert_eq!(e.generation(), generation);
    }

    #[test]
    fn test_load_resets_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        codec::encode(&colorful(64, 32), &path, SaveFormat::Png).unwrap();

        let mut e = loaded(300, 300);
        e.add_point(ImagePoint::new(5, 5)).unwrap();
        e.set_saturation(2.5).unwrap();

        e.load(&path).unwrap();
        assert_eq!(e.image().unwrap().dimensions(), (64, 32));
        assert_eq!(e.history().len(), 1);
        assert!(e.points().is_empty());
        assert_eq!(e.saturation(), 1.0);
        assert!(!e.has_unsaved_changes());
        assert_eq!(e.path(), Some(path.as_path()));
        assert_eq!(e.scale().unwrap().image_size, (64, 32));
    }

    #[test]
    fn test_save_clears_unsaved_and_failure_keeps_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut e = loaded(50, 50);
        for (x, y) in [(1, 1), (40, 1), (40, 40)] {
            e.add_point(ImagePoint::new(x, y)).unwrap();
        }
        e.fill().unwrap();
        assert!(e.has_unsaved_changes());

        let bad = dir.path().join("missing_dir").join("out.png");
        assert!(matches!(
            e.save(&bad, SaveFormat::Png),
            Err(EditError::Save(_))
        ));
        assert!(e.has_unsaved_changes());

        let good = dir.path().join("out.png");
        e.save(&good, SaveFormat::Png).unwrap();
        assert!(!e.has_unsaved_changes());
        assert_eq!(&codec::decode(&good).unwrap(), e.image().unwrap());
    }

    #[test]
    fn test_viewport_not_laid_out_has_no_scale() {
        let mut e = loaded(100, 100);
        e.set_viewport(egui::vec2(1.0, 400.0));
        assert!(e.scale().is_none());
        click(&mut e, 0.0, 0.0);
        assert!(e.points().is_empty());
        e.set_viewport(egui::vec2(400.0, 400.0));
        assert!(e.scale().is_some());
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(EditError::NoImage.to_string(), "Open an image first.");
        assert!(EditError::SelectionTooSmall {
            width: 3,
            height: 40
        }
        .to_string()
        .contains("3x40"));
    }
}
