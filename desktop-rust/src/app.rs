use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText};
use tokio::runtime::Runtime;

use foodseg_common::render::{self, LogRow};
use foodseg_common::urls::{history_location, with_cache_bust};
use foodseg_common::{
    catalog, ErrorOrigin, FetchTicket, Gallery, GalleryLoad, GalleryMode, HistoryBrowser,
    ImageLocation, LogPage, PageNav, ResultPanel, ResultStore, ResultView, SegmentationResult,
};
use foodseg_dashboard::api::{ApiClient, SegmentBackend};
use foodseg_dashboard::config::Config;
use foodseg_dashboard::error::DashboardError;
use foodseg_dashboard::session::cache_bust_now;
use foodseg_dashboard::source::IMAGE_EXTENSIONS;

use crate::cache::{ImageCache, ImageSlot};
use crate::io::{load_image, run_segment};
use crate::model::{ImageData, RunKind, UiMessage};

const THUMB_MAX: (u32, u32) = (160, 120);
const RESULT_MAX: (u32, u32) = (480, 360);
const NAV_BUTTONS: [(PageNav, &str); 4] = [
    (PageNav::First, "First"),
    (PageNav::Previous, "Previous"),
    (PageNav::Next, "Next"),
    (PageNav::Last, "Last"),
];

pub struct DesktopApp {
    runtime: Runtime,
    client: Option<ApiClient>,
    assets_dir: PathBuf,
    selected_model: String,
    upload_path: Option<PathBuf>,
    uploading: bool,
    store: ResultStore,
    panel: ResultPanel,
    history: HistoryBrowser,
    gallery: Gallery,
    status: String,
    tx: Sender<UiMessage>,
    rx: Receiver<UiMessage>,
    images: ImageCache<egui::TextureHandle>,
    pending_images: Vec<ImageData>,
}

fn location_key(location: &ImageLocation) -> String {
    match location {
        ImageLocation::Remote(url) => url.clone(),
        ImageLocation::Bundled(path) => path.display().to_string(),
    }
}

impl DesktopApp {
    pub fn new(config: &Config, status: String) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("start async runtime")?;
        let (tx, rx) = mpsc::channel();

        let mut app = Self {
            runtime,
            client: config.base().map(ApiClient::new),
            assets_dir: config.assets_dir.clone(),
            selected_model: config.default_model.clone(),
            upload_path: None,
            uploading: false,
            store: ResultStore::new(),
            panel: ResultPanel::default(),
            history: HistoryBrowser::default(),
            gallery: Gallery::new(config.gallery_mode),
            status,
            tx,
            rx,
            images: ImageCache::new(),
            pending_images: Vec::new(),
        };
        let ticket = app.history.start();
        app.spawn_logs(ticket);
        let load = app.gallery.load(app.client.is_some());
        app.apply_gallery_load(load);
        Ok(app)
    }

    fn base(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.base())
    }

    fn is_busy(&self) -> bool {
        self.uploading
            || self.gallery.is_running()
            || self.history.is_loading()
            || self.history.is_replaying()
            || self.images.has_inflight()
            || !self.pending_images.is_empty()
    }

    fn spawn_logs(&mut self, ticket: FetchTicket) {
        let Some(client) = self.client.clone() else {
            self.history
                .complete(ticket, Err::<LogPage, _>(DashboardError::NotConfigured));
            return;
        };
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = client
                .logs(ticket.page, ticket.page_size)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(UiMessage::LogsDone { ticket, outcome });
        });
    }

    fn apply_gallery_load(&mut self, load: GalleryLoad) {
        let GalleryLoad::Fetch(ticket) = load else {
            return;
        };
        let Some(client) = self.client.clone() else {
            return;
        };
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = client.logs(1, ticket.page_size).await.map_err(|e| e.to_string());
            let _ = tx.send(UiMessage::GalleryDone { ticket, outcome });
        });
    }

    fn spawn_segment(
        &self,
        kind: RunKind,
        file_name: String,
        location: Option<ImageLocation>,
        model: String,
        origin: ErrorOrigin,
    ) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tracing::debug!(?kind, file = %file_name, model = %model, "segmentation started");
        self.runtime.spawn(async move {
            let result = run_segment(client, file_name, location, model, origin).await;
            let _ = tx.send(UiMessage::SegmentDone { kind, result });
        });
    }

    fn pick_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.upload_path = Some(path);
        }
    }

    fn submit_upload(&mut self) {
        let Some(path) = self.upload_path.clone() else {
            self.status = render::UPLOAD_PROMPT.to_string();
            return;
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.jpg".to_string());
        let origin = ErrorOrigin::Upload(self.base().unwrap_or_default().to_string());
        self.uploading = true;
        self.spawn_segment(
            RunKind::Upload,
            file_name,
            Some(ImageLocation::Bundled(path)),
            self.selected_model.clone(),
            origin,
        );
    }

    fn run_gallery(&mut self, image_ref: &str) {
        if !self.gallery.begin_run() {
            return;
        }
        let location = self.gallery.location(self.base(), &self.assets_dir, image_ref);
        self.spawn_segment(
            RunKind::Gallery,
            image_ref.to_string(),
            location,
            self.selected_model.clone(),
            ErrorOrigin::Gallery,
        );
    }

    fn replay(&mut self) {
        let Some(request) = self.history.begin_replay() else {
            return;
        };
        let location = history_location(self.base(), &request.image_ref);
        self.spawn_segment(
            RunKind::Replay(request.clone()),
            request.image_ref,
            location,
            request.model_id,
            ErrorOrigin::Logs,
        );
    }

    fn apply_segment(&mut self, kind: RunKind, result: SegmentationResult) {
        match kind {
            RunKind::Upload => self.uploading = false,
            RunKind::Gallery => self.gallery.finish_run(),
            RunKind::Replay(request) => {
                if !self.history.finish_replay(&request, result.is_success(), cache_bust_now()) {
                    tracing::debug!(id = request.entry_id, "replay finished for a closed detail view");
                }
            }
        }
        self.status = match &result.error {
            Some(err) => err.to_string(),
            None => String::new(),
        };

        self.panel.sync(&result);
        let Some(token) = self.store.replace(result) else {
            return;
        };
        if let Some(ticket) = self.history.observe_reload_token(token) {
            self.spawn_logs(ticket);
        }
        if let Some(load) = self.gallery.observe_reload_token(token, self.client.is_some()) {
            self.apply_gallery_load(load);
        }
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::SegmentDone { kind, result } => self.apply_segment(kind, result),
                UiMessage::LogsDone { ticket, outcome } => {
                    if let Err(err) = &outcome {
                        tracing::warn!(page = ticket.page, error = %err, "Error fetching logs");
                    }
                    self.history.complete(ticket, outcome);
                }
                UiMessage::GalleryDone { ticket, outcome } => {
                    if let Err(err) = &outcome {
                        tracing::warn!(error = %err, "Error fetching gallery history");
                    }
                    self.gallery.complete(ticket, outcome);
                }
                UiMessage::ImageLoaded(data) => self.pending_images.push(data),
            }
        }
    }

    fn process_pending_images(&mut self, ctx: &egui::Context) {
        for data in std::mem::take(&mut self.pending_images) {
            if !self.images.is_wanted(&data.key) {
                continue;
            }
            let texture = (!data.is_empty()).then(|| {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(data.size, &data.pixels);
                ctx.load_texture(&data.key, color_image, egui::TextureOptions::default())
            });
            self.images.finish(data.key, texture);
        }
    }

    fn request_image(&mut self, location: &ImageLocation, max: (u32, u32)) -> Option<egui::TextureHandle> {
        let key = location_key(location);
        if let Some(texture) = self.images.get(&key) {
            return Some(texture);
        }
        if !self.images.begin(&key) {
            return None;
        }
        let future = load_image(self.client.clone(), key, location.clone(), max, self.tx.clone());
        self.runtime.spawn(future);
        None
    }

    fn show_image(&mut self, ui: &mut egui::Ui, location: &ImageLocation, max: (u32, u32), alt: &str) {
        let size = egui::vec2(max.0 as f32, max.1 as f32);
        match self.request_image(location, max) {
            Some(texture) => {
                ui.add(egui::Image::new(&texture).max_size(size)).on_hover_text(alt);
            }
            None => {
                let failed = self.images.is_failed(&location_key(location));
                ui.allocate_ui_with_layout(
                    size,
                    egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
                    |ui| {
                        if failed {
                            ui.label("No image");
                        } else {
                            ui.spinner();
                        }
                    },
                );
            }
        }
    }

    fn render_upload(&mut self, ui: &mut egui::Ui) {
        ui.heading("Upload");
        egui::ComboBox::from_label("Model")
            .selected_text(catalog::label_for(&self.selected_model))
            .width(220.0)
            .show_ui(ui, |ui| {
                for option in catalog::list() {
                    ui.selectable_value(&mut self.selected_model, option.id.to_string(), option.label);
                }
            });

        ui.horizontal(|ui| {
            if ui.button("Choose image...").clicked() {
                self.pick_image();
            }
            let name = self
                .upload_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(name).color(Color32::from_gray(170)));
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.uploading, egui::Button::new("Segment"))
                .clicked()
            {
                self.submit_upload();
            }
            if self.uploading {
                ui.spinner();
            }
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui) {
        ui.heading("Segmentation Results");
        let view = self.panel.view(self.store.current(), self.base());
        let image_key = match &view {
            ResultView::Ranked { image_url: Some(url), .. } => {
                Some(with_cache_bust(url, self.store.reload_token().value()))
            }
            _ => None,
        };
        self.images.track(ImageSlot::Result, image_key.as_deref());

        match view {
            ResultView::Error(message) => {
                ui.label(RichText::new(message).color(Color32::from_rgb(230, 90, 90)));
            }
            ResultView::Prompt => {
                ui.label(RichText::new(render::UPLOAD_PROMPT).color(Color32::from_rgb(246, 196, 69)));
            }
            ResultView::Ranked { banner, lines, alt, .. } => {
                ui.label(RichText::new(banner).strong());
                for line in lines {
                    ui.label(line);
                }
                ui.add_space(6.0);
                let label = format!("Show {}", self.panel.variant().toggled().label());
                if ui.button(label).clicked() {
                    self.panel.toggle();
                }
                if let Some(key) = image_key {
                    self.show_image(ui, &ImageLocation::Remote(key), RESULT_MAX, &alt);
                }
            }
        }
    }

    fn render_gallery(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(self.gallery.mode().title());
            let mut mode = self.gallery.mode();
            ui.radio_value(&mut mode, GalleryMode::Curated, "Curated");
            ui.radio_value(&mut mode, GalleryMode::History, "History");
            if let Some(load) = self.gallery.set_mode(mode, self.client.is_some()) {
                self.apply_gallery_load(load);
            }
            if self.gallery.is_running() {
                ui.spinner();
                ui.label("Running...");
            }
        });

        let items = self.gallery.items().to_vec();
        if items.is_empty() {
            ui.label(self.gallery.mode().empty_message());
            return;
        }

        let running = self.gallery.is_running();
        ui.horizontal_wrapped(|ui| {
            for item in &items {
                let location = self.gallery.location(self.base(), &self.assets_dir, &item.image_ref);
                let texture = location
                    .as_ref()
                    .and_then(|loc| self.request_image(loc, THUMB_MAX));
                let size = egui::vec2(THUMB_MAX.0 as f32, THUMB_MAX.1 as f32);
                let response = match texture {
                    Some(texture) => ui.add_enabled(
                        !running,
                        egui::ImageButton::new(egui::Image::new(&texture).max_size(size)),
                    ),
                    None => ui.add_enabled(
                        !running,
                        egui::Button::new(item.image_ref.as_str()).min_size(size),
                    ),
                };
                if response.on_hover_text(item.image_ref.as_str()).clicked() {
                    self.run_gallery(&item.image_ref);
                }
            }
        });
    }

    fn render_logs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Logs");
            if ui
                .add_enabled(!self.history.is_loading(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Some(ticket) = self.history.reload() {
                    self.spawn_logs(ticket);
                }
            }
            if self.history.is_loading() {
                ui.spinner();
            }
        });

        if self.client.is_none() {
            ui.label(
                RichText::new(DashboardError::NotConfigured.to_string())
                    .color(Color32::from_rgb(246, 196, 69)),
            );
        }

        if self.history.is_empty() {
            ui.label(render::NO_LOGS);
        } else {
            let rows: Vec<LogRow> = self.history.entries().iter().map(LogRow::from).collect();
            let ids: Vec<u64> = self.history.entries().iter().map(|e| e.id).collect();
            let selected = self.history.detail().map(|d| d.entry().id);
            egui::Grid::new("logs_table")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for header in ["ID", "Image", "Model", "Best Prediction", "Confidence", "Date"] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for (row, id) in rows.iter().zip(ids) {
                        if ui.selectable_label(selected == Some(id), row.id.as_str()).clicked() {
                            self.history.open_detail(id, cache_bust_now());
                        }
                        ui.label(row.image.as_str());
                        ui.label(row.model.as_str());
                        ui.label(row.prediction.as_str());
                        ui.label(row.confidence.as_str());
                        ui.label(row.date.as_str());
                        ui.end_row();
                    }
                });
        }

        ui.horizontal(|ui| {
            for (nav, label) in NAV_BUTTONS {
                let enabled = self.history.can_navigate(nav);
                if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                    if let Some(ticket) = self.history.navigate(nav) {
                        self.spawn_logs(ticket);
                    }
                }
            }
            let pagination = self.history.pagination();
            ui.label(render::page_caption(pagination));
            ui.label(RichText::new(render::total_caption(pagination)).color(Color32::from_gray(170)));
        });
    }

    fn render_detail(&mut self, ctx: &egui::Context) {
        let Some(detail) = self.history.detail().cloned() else {
            self.images.track(ImageSlot::Detail, None);
            return;
        };
        let detail_url = self.base().map(|base| detail.image_url(base));
        self.images.track(ImageSlot::Detail, detail_url.as_deref());
        let replaying = self.history.is_replaying();
        let entry = detail.entry();
        let mut open = true;
        egui::Window::new(format!("Log #{}", entry.id))
            .open(&mut open)
            .resizable(true)
            .show(ctx, |ui| {
                if let Some(url) = &detail_url {
                    let location = ImageLocation::Remote(url.clone());
                    let alt = entry.prediction().unwrap_or(render::PLACEHOLDER);
                    self.show_image(ui, &location, RESULT_MAX, alt);
                }

                ui.horizontal(|ui| {
                    let label = format!("Show {}", detail.variant().toggled().label());
                    if ui
                        .add_enabled(detail.can_toggle() && !replaying, egui::Button::new(label))
                        .clicked()
                    {
                        self.history.toggle_detail_variant();
                    }
                    if ui
                        .add_enabled(!replaying, egui::Button::new("Run again"))
                        .clicked()
                    {
                        self.replay();
                    }
                    if replaying {
                        ui.spinner();
                    }
                });

                egui::Grid::new("log_detail").striped(true).show(ui, |ui| {
                    for (label, value) in render::detail_fields(entry) {
                        ui.label(RichText::new(label).strong());
                        ui.label(value);
                        ui.end_row();
                    }
                });
            });
        if !open {
            self.history.close_detail();
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();
        self.process_pending_images(ctx);
        if self.is_busy() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Food Segmentation Dashboard");
                ui.separator();
                let base = self.base().unwrap_or("offline").to_string();
                ui.label(RichText::new(base).color(Color32::from_gray(170)));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.status).color(Color32::from_rgb(246, 196, 69)));
                }
            });
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_upload(ui);
                    ui.separator();
                    self.render_result(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.render_gallery(ui);
                    ui.separator();
                    self.render_logs(ui);
                });
        });

        self.render_detail(ctx);
    }
}
