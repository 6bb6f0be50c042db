use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui;
use image::RgbaImage;

use crate::config::{CloudinaryConfig, EditorConfig};
use crate::extract::PNG_MIME;
use crate::gesture::{self, GestureMode, PointerNormalizer};
use crate::guard;
use crate::region::{Anchor, Corner, HitTarget, Preset, ResizeHandle};
use crate::render;
use crate::session::EditorSession;
use crate::share::{
    self, CloudinaryHost, ComposeOutcome, ImageHost, SHARE_CAPTION, ShareComposer, ShareError,
    WarpcastComposer,
};
use crate::source::{self, LoadError};

const PADDING: f32 = 20.0;
const ANCHOR_ARROWS: [&str; 9] = ["↖", "↑", "↗", "←", "•", "→", "↙", "↓", "↘"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
struct Notice {
    level: Level,
    text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }

    fn color(&self, ui: &egui::Ui) -> egui::Color32 {
        match self.level {
            Level::Info => ui.visuals().text_color(),
            Level::Warning => ui.visuals().warn_fg_color,
            Level::Error => ui.visuals().error_fg_color,
        }
    }
}

pub struct KroppitApp {
    config: EditorConfig,
    session: EditorSession,
    texture: Option<egui::TextureHandle>,
    result_texture: Option<egui::TextureHandle>,
    pointer: PointerNormalizer,
    host: Option<Arc<dyn ImageHost>>,
    composer: Box<dyn ShareComposer>,
    pending_upload: Option<Receiver<Result<String, ShareError>>>,
    notice: Option<Notice>,
}

fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as _, image.height() as _];
    let pixels = image.as_flat_samples();
    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice())
}

fn cursor_for(target: Option<HitTarget>) -> egui::CursorIcon {
    match target {
        None => egui::CursorIcon::Default,
        Some(HitTarget::Body) => egui::CursorIcon::Move,
        Some(HitTarget::Handle(handle)) => match handle {
            ResizeHandle::North | ResizeHandle::South => egui::CursorIcon::ResizeVertical,
            ResizeHandle::East | ResizeHandle::West => egui::CursorIcon::ResizeHorizontal,
            ResizeHandle::Corner(c) | ResizeHandle::Circle(c) => match c {
                Corner::NorthWest | Corner::SouthEast => egui::CursorIcon::ResizeNwSe,
                Corner::NorthEast | Corner::SouthWest => egui::CursorIcon::ResizeNeSw,
            },
        },
    }
}

impl KroppitApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let host: Option<Arc<dyn ImageHost>> =
            match CloudinaryHost::new(CloudinaryConfig::from_env(), config.upload_timeout) {
                Ok(host) => Some(Arc::new(host)),
                Err(e) => {
                    log::error!("Image host unavailable: {}", e);
                    None
                }
            };

        let ctx = cc.egui_ctx.clone();
        let composer = WarpcastComposer::new(move |url| ctx.open_url(egui::OpenUrl::new_tab(url)));

        let mut app = Self {
            session: EditorSession::new(config.max_display_width, config.max_display_height),
            config,
            texture: None,
            result_texture: None,
            pointer: PointerNormalizer::default(),
            host,
            composer: Box::new(composer),
            pending_upload: None,
            notice: None,
        };

        if let Some(path) = app.config.initial_image.clone() {
            app.open_path(&cc.egui_ctx, &path);
        }
        app
    }

    fn load_texture(&mut self, ctx: &egui::Context) {
        self.result_texture = None;
        self.texture = self.session.image().map(|image| {
            let color_image = to_color_image(&image.to_rgba8());
            ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn on_loaded(&mut self, ctx: &egui::Context, result: Result<(), LoadError>) {
        match result {
            Ok(()) => {
                self.notice = None;
                self.pointer = PointerNormalizer::default();
                self.pending_upload = None;
                self.load_texture(ctx);
            }
            Err(e) => {
                log::warn!("Load rejected: {}", e);
                if matches!(e, LoadError::DecodeFailure(_)) {
                    self.load_texture(ctx);
                }
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    fn open_path(&mut self, ctx: &egui::Context, path: &Path) {
        let result = source::open(path).map(|image| self.session.load(image));
        if let Err(LoadError::DecodeFailure(_)) = &result {
            self.session.clear();
        }
        self.on_loaded(ctx, result);
    }

    fn open_dropped(&mut self, ctx: &egui::Context, file: &egui::DroppedFile) {
        if let Some(bytes) = &file.bytes {
            let mime = if file.mime.is_empty() {
                source::mime_from_path(Path::new(&file.name))
            } else {
                file.mime.clone()
            };
            let result = self.session.load_bytes(bytes, &mime);
            self.on_loaded(ctx, result);
        } else if let Some(path) = &file.path {
            self.open_path(ctx, path);
        }
    }

    fn krop(&mut self, ctx: &egui::Context) {
        match self.session.perform_crop() {
            Ok(crop) => {
                let color_image = to_color_image(&crop.image);
                self.result_texture =
                    Some(ctx.load_texture("cropped", color_image, egui::TextureOptions::LINEAR));
                self.notice = Some(Notice::info(format!(
                    "Photo kropped: {}x{}",
                    crop.width(),
                    crop.height()
                )));
            }
            Err(e) => {
                log::warn!("Crop rejected: {}", e);
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    fn download(&mut self) {
        let Some(crop) = self.session.crop() else {
            self.notice = Some(Notice::error("Please crop an image first!"));
            return;
        };
        let file_name = format!("kropped-image-{}.png", share::unix_millis());
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, &crop.png) {
            Ok(()) => {
                log::info!("Saved {} bytes to {}", crop.png.len(), path.display());
                self.notice = Some(Notice::info("Your photo has been kropped and saved."));
            }
            Err(e) => {
                log::error!("Failed to save image: {}", e);
                self.notice = Some(Notice::error(format!("Failed to save image: {}", e)));
            }
        }
    }

    fn share(&mut self) {
        let Some(crop) = self.session.crop() else {
            self.notice = Some(Notice::error("Please crop an image first!"));
            return;
        };
        if let Err(e) = guard::validate(&crop.png, PNG_MIME) {
            log::warn!("Share blocked: {}", e);
            self.notice = Some(Notice::warning(e.to_string()));
            return;
        }
        let Some(host) = &self.host else {
            self.notice = Some(Notice::error("Image hosting is unavailable."));
            return;
        };
        self.pending_upload = Some(share::spawn_upload(
            Arc::clone(host),
            crop.png.clone(),
            PNG_MIME,
        ));
        self.notice = Some(Notice::info("Uploading…"));
    }

    fn poll_upload(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.pending_upload else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
                return;
            }
            Err(TryRecvError::Disconnected) => Err(ShareError::HostUploadFailure(
                "upload worker stopped".to_string(),
            )),
        };
        self.pending_upload = None;

        self.notice = Some(match result {
            Ok(url) => match self.composer.compose(SHARE_CAPTION, &[url]) {
                Ok(ComposeOutcome::Success) => Notice::info("Opening Farcaster with your cropped image."),
                Ok(ComposeOutcome::Cancelled) => Notice::warning("Cast cancelled."),
                Err(e) => {
                    log::error!("{}", e);
                    Notice::error(e.to_string())
                }
            },
            Err(e) => Notice::error(format!("{} Try downloading instead.", e)),
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            if ui.button("Open Image").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_file()
                {
                    self.open_path(ctx, &path);
                }
            }
            if self.texture.is_some() && ui.button("Reset").clicked() {
                self.session.reset();
                self.result_texture = None;
                self.pending_upload = None;
                self.notice = None;
            }
        });

        if self.texture.is_none() {
            return;
        }

        if self.session.showing_result() {
            ui.horizontal(|ui| {
                if ui.button("Download").clicked() {
                    self.download();
                }
                let uploading = self.pending_upload.is_some();
                if ui
                    .add_enabled(!uploading, egui::Button::new("Share to Farcaster"))
                    .clicked()
                {
                    self.share();
                }
                if uploading {
                    ui.spinner();
                }
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Size:");
            for preset in Preset::ALL {
                if ui.button(preset.to_string()).clicked() {
                    self.session.set_preset(preset);
                }
            }
            ui.separator();
            if ui.button("Krop Photo").clicked() {
                self.krop(ctx);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Position:");
            egui::Grid::new("anchor_grid").spacing([2.0, 2.0]).show(ui, |ui| {
                for (i, anchor) in Anchor::ALL.into_iter().enumerate() {
                    if ui
                        .small_button(ANCHOR_ARROWS[i])
                        .on_hover_text(anchor.to_string())
                        .clicked()
                    {
                        self.session.set_anchor(anchor);
                    }
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(texture) = self.texture.clone() else {
            let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
            ui.vertical_centered(|ui| {
                ui.add_space(PADDING * 2.0);
                if hovering {
                    ui.heading("Drop your photo here!");
                } else {
                    ui.heading("Upload your photo");
                    ui.label("Drag & drop or click Open Image");
                }
                ui.weak("PNG, JPG, GIF up to 10MB");
            });
            return;
        };

        let display_size = self.session.canvas();
        let available_size = ui.available_size();
        let total_display_size = display_size + egui::vec2(PADDING * 2.0, PADDING * 2.0);

        // Manual centering
        let x_offset = (available_size.x - total_display_size.x) / 2.0;
        let start_pos = ui.cursor().min + egui::vec2(x_offset.max(0.0), 0.0);
        let target_rect = egui::Rect::from_min_size(start_pos, total_display_size);

        let response = ui.allocate_rect(target_rect, egui::Sense::drag());
        let painter = ui.painter_at(target_rect);
        let image_rect = egui::Rect::from_min_size(
            target_rect.min + egui::vec2(PADDING, PADDING),
            display_size,
        );

        if self.session.showing_result() {
            if let (Some(result), Some(crop)) = (&self.result_texture, self.session.crop()) {
                let content = egui::vec2(crop.width() as f32, crop.height() as f32);
                render::draw_result(&painter, result, image_rect, content);
            }
            return;
        }

        let events = ctx.input(|i| i.events.clone());
        let pointer_events = gesture::coalesce(
            events
                .iter()
                .filter_map(|event| self.pointer.normalize(event, image_rect.min)),
        );
        let mut changed = false;
        for event in pointer_events {
            changed |= self.session.pointer(event);
        }
        if changed {
            ctx.request_repaint();
        }

        let region = *self.session.region();
        let mode = self.session.gesture_mode();
        let cursor = match mode {
            GestureMode::Idle => response
                .hover_pos()
                .map(|pos| pos - image_rect.min.to_vec2())
                .and_then(|pos| region.hit_test(pos)),
            GestureMode::Dragging => Some(HitTarget::Body),
            GestureMode::Resizing(handle) => Some(HitTarget::Handle(handle)),
        };
        if cursor.is_some() {
            ctx.set_cursor_icon(cursor_for(cursor));
        }

        render::draw_base(&painter, &texture, image_rect);
        if render::overlay_visible(self.config.overlay, mode) {
            render::draw_overlay(&painter, image_rect, &region);
            render::draw_handles(&painter, image_rect, &region);
        } else {
            render::draw_border(&painter, render::to_screen(&region, image_rect), region.shape);
        }
    }
}

impl eframe::App for KroppitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped_files.first() {
            self.open_dropped(ctx, file);
        }

        self.poll_upload(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.toolbar(ui, ctx);
            ui.separator();
            self.canvas(ui, ctx);

            if let Some(notice) = &self.notice {
                ui.separator();
                ui.colored_label(notice.color(ui), &notice.text);
            }
        });
    }
}
