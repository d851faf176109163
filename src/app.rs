use eframe::egui;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

use crate::codec::{self, FormatKind, SaveFormat, HEIC_SUPPORTED, OPEN_EXTENSIONS};
use crate::editor::{EditError, Editor, Mode, ModeChange, Pointer};
use crate::ops::{MAX_SATURATION, MIN_SATURATION};
use crate::render::Preview;
use crate::settings::Settings;

pub const APP_NAME: &str = "photo-edit";

// ── UI actions ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Open,
    Load(PathBuf),
    Save,
    Exit,
    Undo,
    Redo,
    About,
    ToggleTrimming,
    Saturation(f32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveStatus {
    Saved,
    /// Waiting on the JPEG quality prompt.
    Pending,
    Aborted,
}

struct JpegPrompt {
    path: PathBuf,
    quality: u8,
}

fn notice(level: MessageLevel, title: &str, text: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn report(err: &EditError) {
    match err {
        EditError::Load(_) | EditError::Save(_) => {
            notice(MessageLevel::Error, "Error", &err.to_string())
        }
        _ => notice(MessageLevel::Info, "Notice", &err.to_string()),
    }
}

/// A press that turned into a drag still counts as a click where it started,
/// so Normal mode places a point no matter how far the pointer travels.
fn drag_start_events(origin: egui::Pos2) -> [Pointer; 2] {
    [Pointer::Press(origin), Pointer::Click(origin)]
}

fn hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct PhotoEditApp {
    editor: Editor,
    preview: Preview,
    default_jpeg_quality: u8,

    jpeg_prompt: Option<JpegPrompt>,
    close_after_save: bool,
    allow_close: bool,
    title: String,
}

impl PhotoEditApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            editor: Editor::new(settings.fill_color),
            preview: Preview::default(),
            default_jpeg_quality: settings.jpeg_quality,
            jpeg_prompt: None,
            close_after_save: false,
            allow_close: false,
            title: APP_NAME.to_owned(),
        }
    }

    fn load(&mut self, ctx: &egui::Context, path: &Path) {
        if let Err(e) = self.editor.load(path) {
            report(&e);
            return;
        }
        let title = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{APP_NAME} - {name}"),
            None => APP_NAME.to_owned(),
        };
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }

    fn open_dialog(&mut self, ctx: &egui::Context) {
        let mut dialog = FileDialog::new()
            .add_filter("All supported formats", OPEN_EXTENSIONS)
            .add_filter("JPEG files", &["jpg", "jpeg"])
            .add_filter("PNG files", &["png"]);
        if HEIC_SUPPORTED {
            dialog = dialog.add_filter("HEIC files", &["heic", "heif"]);
        }
        let picked = dialog.add_filter("All files", &["*"]).pick_file();
        if let Some(path) = picked {
            self.load(ctx, &path);
        }
    }

    fn save_dialog(&mut self) -> SaveStatus {
        if self.editor.image().is_none() {
            notice(
                MessageLevel::Info,
                "Notice",
                "There is no image to save. Open an image first.",
            );
            return SaveStatus::Aborted;
        }

        let default_name = self
            .editor
            .path()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .map(|s| format!("{s}.png"))
            .unwrap_or_else(|| "untitled.png".to_owned());

        let mut dialog = FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("PNG files", &["png"])
            .add_filter("JPEG files", &["jpg", "jpeg"]);
        if HEIC_SUPPORTED {
            dialog = dialog.add_filter("HEIC files", &["heic"]);
        }
        let Some(chosen) = dialog.add_filter("All files", &["*"]).save_file() else {
            return SaveStatus::Aborted;
        };

        let (path, kind) = codec::resolve_target(&chosen);
        match kind {
            FormatKind::Jpeg => {
                self.jpeg_prompt = Some(JpegPrompt {
                    path,
                    quality: self.default_jpeg_quality,
                });
                SaveStatus::Pending
            }
            FormatKind::Png => self.write(&path, SaveFormat::Png),
            FormatKind::Heic => self.write(&path, SaveFormat::Heic),
        }
    }

    fn write(&mut self, path: &Path, format: SaveFormat) -> SaveStatus {
        match self.editor.save(path, format) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                report(&e);
                SaveStatus::Aborted
            }
        }
    }

    fn after_save(&mut self, ctx: &egui::Context, status: SaveStatus) {
        if !self.close_after_save {
            return;
        }
        match status {
            SaveStatus::Saved => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            SaveStatus::Aborted => self.close_after_save = false,
            SaveStatus::Pending => {}
        }
    }

    fn toggle_trimming(&mut self) {
        match self.editor.toggle_trimming() {
            Ok(ModeChange::EnteredTrimming) => notice(
                MessageLevel::Info,
                "Trimming mode",
                "Drag from the top-left to the bottom-right of the area to keep.\n\
                 Press Trim again to apply the crop.",
            ),
            Ok(ModeChange::LeftTrimming {
                cropped: Some((w, h)),
            }) => notice(
                MessageLevel::Info,
                "Trimming complete",
                &format!("The image was cropped to {w}x{h}."),
            ),
            Ok(ModeChange::LeftTrimming { cropped: None }) => {}
            Err(e) => report(&e),
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Open => self.open_dialog(ctx),
            Action::Load(path) => self.load(ctx, &path),
            Action::Save => {
                let status = self.save_dialog();
                self.after_save(ctx, status);
            }
            Action::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Action::Undo => {
                self.editor.undo();
            }
            Action::Redo => {
                self.editor.redo();
            }
            Action::About => notice(
                MessageLevel::Info,
                "About",
                &format!(
                    "{APP_NAME} {}\nPolygon fill, crop and saturation editing.",
                    env!("CARGO_PKG_VERSION")
                ),
            ),
            Action::ToggleTrimming => self.toggle_trimming(),
            Action::Saturation(value) => {
                if let Err(e) = self.editor.set_saturation(value) {
                    report(&e);
                }
            }
        }
    }

    /// Ask before closing with unsaved changes: save, discard or stay open.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.allow_close || !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        if !self.editor.has_unsaved_changes() {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);

        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Unsaved changes")
            .set_description("Your changes have not been saved. Save them now?")
            .set_buttons(MessageButtons::YesNoCancel)
            .show();

        match answer {
            MessageDialogResult::Yes => {
                self.close_after_save = true;
                let status = self.save_dialog();
                self.after_save(ctx, status);
            }
            MessageDialogResult::No => {
                tracing::info!("closing without saving");
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            _ => tracing::debug!("close cancelled"),
        }
    }

    fn shortcuts(&self, ctx: &egui::Context) -> Vec<Action> {
        let mut actions = Vec::new();
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(egui::Key::S) {
                actions.push(Action::Save);
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::Z) {
                if i.modifiers.shift {
                    actions.push(Action::Redo);
                } else {
                    actions.push(Action::Undo);
                }
            }
            if let Some(path) = i.raw.dropped_files.iter().find_map(|f| f.path.clone()) {
                actions.push(Action::Load(path));
            }
        });
        actions
    }

    fn menu_bar(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open…").clicked() {
                    actions.push(Action::Open);
                    ui.close_menu();
                }
                if ui
                    .add(egui::Button::new("Save").shortcut_text("Ctrl+S"))
                    .clicked()
                {
                    actions.push(Action::Save);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    actions.push(Action::Exit);
                    ui.close_menu();
                }
            });
            ui.menu_button("Edit", |ui| {
                let history = self.editor.history();
                if ui
                    .add_enabled(
                        history.can_undo(),
                        egui::Button::new("Undo").shortcut_text("Ctrl+Z"),
                    )
                    .clicked()
                {
                    actions.push(Action::Undo);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        history.can_redo(),
                        egui::Button::new("Redo").shortcut_text("Ctrl+Shift+Z"),
                    )
                    .clicked()
                {
                    actions.push(Action::Redo);
                    ui.close_menu();
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    actions.push(Action::About);
                    ui.close_menu();
                }
            });
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.label("Fill colour:");
            let mut color = self.editor.fill_color();
            if ui.color_edit_button_srgb(&mut color).changed() {
                self.editor.set_fill_color(color);
            }
            ui.label(hex(color));
            ui.separator();

            let trimming = self.editor.mode() == Mode::Trimming;
            if ui.selectable_label(trimming, "Trim").clicked() {
                actions.push(Action::ToggleTrimming);
            }
            ui.label(format!("Mode: {}", self.editor.mode().label()));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut value = self.editor.saturation();
                let slider = egui::Slider::new(&mut value, MIN_SATURATION..=MAX_SATURATION)
                    .step_by(0.1)
                    .fixed_decimals(1);
                if ui
                    .add_enabled(self.editor.image().is_some(), slider)
                    .changed()
                {
                    actions.push(Action::Saturation(value));
                }
                ui.label("Saturation:");
            });
        });
    }

    fn jpeg_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.jpeg_prompt.as_mut() else {
            return;
        };
        let mut decision = None;
        egui::Window::new("JPEG quality")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("JPEG quality (1-100):");
                ui.add(egui::DragValue::new(&mut prompt.quality).range(1..=100));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                if let Some(prompt) = self.jpeg_prompt.take() {
                    let status = self.write(
                        &prompt.path,
                        SaveFormat::Jpeg {
                            quality: prompt.quality,
                        },
                    );
                    self.after_save(ctx, status);
                }
            }
            Some(false) => {
                self.jpeg_prompt = None;
                self.after_save(ctx, SaveStatus::Aborted);
            }
            None => {}
        }
    }

    fn canvas(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        self.editor.set_viewport(canvas_rect.size());
        self.preview.refresh(ctx, &self.editor);

        painter.rect_filled(canvas_rect, 0.0, egui::Color32::WHITE);
        self.preview.paint(&painter, canvas_rect, &self.editor);

        if self.jpeg_prompt.is_some() {
            return;
        }

        let to_canvas = |p: egui::Pos2| (p - canvas_rect.min).to_pos2();
        let pointer_pos = || {
            response
                .interact_pointer_pos()
                .or(ctx.input(|i| i.pointer.latest_pos()))
                .map(to_canvas)
        };

        // Each mode picks the events it cares about and ignores the rest.
        let mut events = Vec::new();
        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(p) = pointer_pos() {
                events.extend([Pointer::Press(p), Pointer::Release(p), Pointer::Click(p)]);
            }
        }
        if response.clicked_by(egui::PointerButton::Secondary) {
            if let Some(p) = pointer_pos() {
                events.push(Pointer::SecondaryClick(p));
            }
        }
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(origin) = ctx.input(|i| i.pointer.press_origin()) {
                events.extend(drag_start_events(to_canvas(origin)));
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(p) = pointer_pos() {
                events.push(Pointer::Drag(p));
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let Some(p) = pointer_pos() {
                events.push(Pointer::Release(p));
            }
        }

        for event in events {
            if let Err(e) = self.editor.handle_pointer(event) {
                report(&e);
                break;
            }
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for PhotoEditApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_close_request(ctx);

        let mut actions = if self.jpeg_prompt.is_none() {
            self.shortcuts(ctx)
        } else {
            Vec::new()
        };

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.menu_bar(ui, &mut actions);
        });
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui, &mut actions);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ctx, ui);
        });

        self.jpeg_prompt(ctx);

        for action in actions {
            self.apply(ctx, action);
        }
    }
}
