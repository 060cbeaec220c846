//! Main application state and egui frame loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use client_core::staging::{self, StageError};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use egui::Align2;
use rand::Rng as _;
use shared::domain::{
    ChatSettings, Role, SessionId, StagedFile, StagedFileId, MAX_TEMPERATURE, MIN_TEMPERATURE,
};
use shared::protocol::{ChatRequest, SourceCitation, SystemStatus, UploadResponse};
use tracing::warn;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{failure_notice, FailureContext, UiEvent};
use crate::controller::progress::{UploadProgress, SIMULATED_STEP_RANGE};
use crate::controller::toasts::{ToastKind, ToastQueue};
use crate::ui::markup::message_layout_job;
use crate::ui::theme::{visuals_for, PersistedUiSettings, ThemePreference, SETTINGS_STORAGE_KEY};

/// Soft length limit for the composer; longer messages still send but the
/// counter turns red.
const COMPOSER_SOFT_LIMIT: usize = 1000;

const STATUS_POLL_AFTER_CHAT: Duration = Duration::from_millis(200);
const STATUS_POLL_AFTER_UPLOAD: Duration = Duration::from_millis(500);
const STATUS_POLL_AFTER_CLEAR: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub session_id: Option<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            session_id: None,
        }
    }
}

#[derive(Debug)]
struct DisplayMessage {
    role: Role,
    body: String,
    sources: Vec<SourceCitation>,
    timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmAction {
    NewSession,
    ClearChat,
    ClearDocuments,
}

impl ConfirmAction {
    fn prompt(self) -> &'static str {
        match self {
            ConfirmAction::NewSession => {
                "Start a new session? The current conversation will be cleared."
            }
            ConfirmAction::ClearChat => "Clear the conversation? The session is kept.",
            ConfirmAction::ClearDocuments => {
                "Remove all uploaded documents from the index? This cannot be undone."
            }
        }
    }

    fn confirm_label(self) -> &'static str {
        match self {
            ConfirmAction::NewSession => "New Session",
            ConfirmAction::ClearChat => "Clear Chat",
            ConfirmAction::ClearDocuments => "Clear Documents",
        }
    }
}

pub struct DocChatApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    session_id: SessionId,
    chat_settings: ChatSettings,

    staged_files: Vec<StagedFile>,
    next_staged_file_id: u64,
    documents_uploaded: bool,

    composer: String,
    messages: Vec<DisplayMessage>,

    is_uploading: bool,
    is_typing: bool,
    clearing_documents: bool,
    upload_progress: Option<UploadProgress>,
    completed_upload: Option<UploadResponse>,

    system_status: Option<SystemStatus>,
    awaiting_first_status: bool,
    toasts: ToastQueue,
    worker_error: Option<String>,

    settings_open: bool,
    pending_confirm: Option<ConfirmAction>,
    theme: ThemePreference,
    applied_theme: Option<ThemePreference>,
}

impl DocChatApp {
    pub fn bootstrap(
        config: StartupConfig,
        theme: ThemePreference,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            server_url: config.server_url,
            session_id: config.session_id.map(SessionId).unwrap_or_default(),
            chat_settings: ChatSettings::default(),
            staged_files: Vec::new(),
            next_staged_file_id: 0,
            documents_uploaded: false,
            composer: String::new(),
            messages: Vec::new(),
            is_uploading: false,
            is_typing: false,
            clearing_documents: false,
            upload_progress: None,
            completed_upload: None,
            system_status: None,
            awaiting_first_status: true,
            toasts: ToastQueue::default(),
            worker_error: None,
            settings_open: false,
            pending_confirm: None,
            theme,
            applied_theme: None,
        };
        // Initial status fetch so the sidebar populates without waiting for
        // the first user action.
        app.dispatch(BackendCommand::FetchStatus { delay: None });
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                warn!(command = cmd.name(), "backend command queue full");
                self.toasts.push(
                    ToastKind::Warning,
                    "Backend Busy",
                    "Too many pending requests - try again in a moment.",
                );
                false
            }
            Err(TrySendError::Disconnected(cmd)) => {
                warn!(command = cmd.name(), "backend worker is gone");
                self.worker_error = Some("Backend worker stopped unexpectedly.".to_string());
                false
            }
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::WorkerReady => {
                self.worker_error = None;
            }
            UiEvent::WorkerStartupFailed(message) => {
                self.worker_error = Some(message);
            }
            UiEvent::UploadFinished(Ok(response)) => {
                // Success is surfaced when the progress modal finishes its
                // completion animation; stash the response until then.
                if let Some(progress) = &mut self.upload_progress {
                    progress.mark_response_received(Instant::now());
                }
                self.completed_upload = Some(response);
            }
            UiEvent::UploadFinished(Err(failure)) => {
                self.is_uploading = false;
                self.upload_progress = None;
                self.completed_upload = None;
                let (title, message) = failure_notice(FailureContext::Upload, &failure);
                self.toasts.push(ToastKind::Error, title, message);
            }
            UiEvent::ChatFinished(Ok(response)) => {
                self.is_typing = false;
                self.messages.push(DisplayMessage {
                    role: Role::Assistant,
                    body: response.response,
                    sources: response.sources,
                    timestamp: Local::now(),
                });
                self.toasts.push(
                    ToastKind::Success,
                    "Response Generated",
                    format!("Processed in {:.2}s", response.processing_time),
                );
                // Optimistic bump; the delayed poll replaces it with the
                // backend's own count.
                if let Some(status) = &mut self.system_status {
                    status.queries_processed += 1;
                }
                self.dispatch(BackendCommand::FetchStatus {
                    delay: Some(STATUS_POLL_AFTER_CHAT),
                });
            }
            UiEvent::ChatFinished(Err(failure)) => {
                self.is_typing = false;
                let (title, message) = failure_notice(FailureContext::Chat, &failure);
                self.toasts.push(ToastKind::Error, title, message);
            }
            UiEvent::StatusUpdated(status) => {
                // The backend's index is authoritative for chat enablement.
                self.documents_uploaded = status.documents_indexed > 0;
                self.system_status = Some(status);
                self.awaiting_first_status = false;
            }
            UiEvent::StatusUnavailable => {
                self.awaiting_first_status = false;
            }
            UiEvent::DocumentsCleared(Ok(response)) => {
                self.clearing_documents = false;
                self.documents_uploaded = false;
                self.staged_files.clear();
                let message = response
                    .message
                    .unwrap_or_else(|| "All documents cleared successfully".to_string());
                self.toasts
                    .push(ToastKind::Success, "Documents Cleared", message);
                self.dispatch(BackendCommand::FetchStatus {
                    delay: Some(STATUS_POLL_AFTER_CLEAR),
                });
            }
            UiEvent::DocumentsCleared(Err(failure)) => {
                self.clearing_documents = false;
                let (title, message) = failure_notice(FailureContext::ClearDocuments, &failure);
                self.toasts.push(ToastKind::Error, title, message);
            }
        }
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn add_candidate_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let id = StagedFileId(self.next_staged_file_id);
            match staging::stage_candidate(id, path) {
                Ok(file) => {
                    self.next_staged_file_id += 1;
                    self.staged_files.push(file);
                }
                Err(StageError::Rejected(reason)) => {
                    let name = display_name_for(path);
                    use client_core::staging::RejectReason;
                    match reason {
                        RejectReason::UnsupportedType { .. } => self.toasts.push(
                            ToastKind::Warning,
                            "Invalid File Type",
                            format!("{name} is not a supported file type."),
                        ),
                        RejectReason::TooLarge { .. } => self.toasts.push(
                            ToastKind::Warning,
                            "File Too Large",
                            format!("{name} exceeds the 10MB limit."),
                        ),
                    }
                }
                Err(err @ StageError::Unreadable { .. }) => {
                    self.toasts
                        .push(ToastKind::Error, "File Error", err.to_string());
                }
            }
        }
    }

    /// Unknown ids are ignored; the row may have raced a previous removal.
    fn remove_staged_file(&mut self, id: StagedFileId) {
        self.staged_files.retain(|file| file.id != id);
    }

    fn send_enabled(&self) -> bool {
        !self.composer.trim().is_empty()
            && self.documents_uploaded
            && !self.is_typing
            && self.worker_error.is_none()
    }

    fn upload_enabled(&self) -> bool {
        !self.staged_files.is_empty() && !self.is_uploading
    }

    fn upload_button_label(&self) -> String {
        if self.is_uploading {
            "Uploading...".to_string()
        } else {
            match self.staged_files.len() {
                0 => "Upload Documents".to_string(),
                1 => "Upload 1 Document".to_string(),
                n => format!("Upload {n} Documents"),
            }
        }
    }

    fn clear_docs_enabled(&self) -> bool {
        self.documents_uploaded && !self.clearing_documents
    }

    fn send_current_message(&mut self) {
        if !self.send_enabled() {
            return;
        }
        let message = self.composer.trim().to_string();
        let settings = self.chat_settings.clamped();
        let request = ChatRequest {
            message: message.clone(),
            session_id: self.session_id.as_str().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };
        self.messages.push(DisplayMessage {
            role: Role::User,
            body: message,
            sources: Vec::new(),
            timestamp: Local::now(),
        });
        self.composer.clear();
        self.is_typing = true;
        if !self.dispatch(BackendCommand::SendChat { request }) {
            // Undo the optimistic append so the transcript matches reality.
            if let Some(message) = self.messages.pop() {
                self.composer = message.body;
            }
            self.is_typing = false;
        }
    }

    fn start_upload(&mut self) {
        if !self.upload_enabled() {
            return;
        }
        let now = Instant::now();
        let mut progress = UploadProgress::begin(now);
        self.is_uploading = true;
        let files = self.staged_files.clone();
        if self.dispatch(BackendCommand::UploadDocuments { files }) {
            progress.mark_transfer_started(now);
            self.upload_progress = Some(progress);
        } else {
            self.is_uploading = false;
            self.upload_progress = None;
        }
    }

    /// Runs when the progress modal's completion hold expires.
    fn finish_upload_success(&mut self) {
        self.is_uploading = false;
        self.upload_progress = None;
        if let Some(response) = self.completed_upload.take() {
            self.toasts.push(
                ToastKind::Success,
                "Upload Successful",
                format!(
                    "Processed {} document chunks in {:.2}s",
                    response.documents_processed, response.processing_time
                ),
            );
            self.staged_files.clear();
            self.documents_uploaded = true;
            self.dispatch(BackendCommand::FetchStatus {
                delay: Some(STATUS_POLL_AFTER_UPLOAD),
            });
        }
    }

    fn begin_clear_documents(&mut self) {
        if !self.clear_docs_enabled() {
            return;
        }
        self.clearing_documents = true;
        if !self.dispatch(BackendCommand::ClearDocuments) {
            self.clearing_documents = false;
        }
    }

    fn reset_conversation(&mut self) {
        self.messages.clear();
        self.composer.clear();
        self.is_typing = false;
        self.settings_open = false;
        self.session_id = SessionId::fresh();
        self.toasts.push(
            ToastKind::Info,
            "New Session",
            "Started a new conversation.",
        );
    }

    /// Clears the transcript but keeps the session, so follow-up questions
    /// still share backend conversation state.
    fn clear_chat_confirmed(&mut self) {
        self.messages.clear();
        self.composer.clear();
        self.is_typing = false;
        self.toasts
            .push(ToastKind::Info, "Chat Cleared", "Conversation cleared.");
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toasts.push(
            ToastKind::Info,
            "Theme Changed",
            format!("Switched to {}", self.theme.label()),
        );
    }

    fn advance_upload_animation(&mut self) {
        let mut close_modal = false;
        if let Some(progress) = &mut self.upload_progress {
            let now = Instant::now();
            progress.tick(now, rand::thread_rng().gen_range(SIMULATED_STEP_RANGE));
            close_modal = progress.poll_completion(now);
        }
        if close_modal {
            self.finish_upload_success();
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("DocChat");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let theme_icon = match self.theme {
                        ThemePreference::Light => "🌙",
                        ThemePreference::Dark => "☀",
                    };
                    if ui
                        .button(theme_icon)
                        .on_hover_text(self.theme.toggle_hint())
                        .clicked()
                    {
                        self.toggle_theme();
                    }
                    if ui.button("⚙").on_hover_text("Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }
                    if ui.button("New Session").clicked() {
                        self.pending_confirm = Some(ConfirmAction::NewSession);
                    }
                    if ui.button("Clear Chat").clicked() {
                        self.pending_confirm = Some(ConfirmAction::ClearChat);
                    }
                });
            });
            ui.add_space(4.0);
            if let Some(error) = &self.worker_error {
                ui.colored_label(ui.visuals().error_fg_color, error);
                ui.add_space(4.0);
            }
        });
    }

    fn show_documents_panel(&mut self, ctx: &egui::Context, hovering_files: bool) {
        egui::SidePanel::left("documents_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("Documents");
                ui.add_space(6.0);

                let stroke = if hovering_files {
                    egui::Stroke::new(2.0, ui.visuals().selection.bg_fill)
                } else {
                    ui.visuals().widgets.noninteractive.bg_stroke
                };
                egui::Frame::new()
                    .stroke(stroke)
                    .corner_radius(egui::CornerRadius::same(6))
                    .inner_margin(egui::Margin::symmetric(10, 14))
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            if hovering_files {
                                ui.label("Release to add files");
                            } else {
                                ui.label("Drop PDF, TXT or DOCX files here");
                            }
                            ui.small("up to 10MB each");
                            ui.add_space(4.0);
                            if ui.button("Browse Files").clicked() {
                                if let Some(paths) = rfd::FileDialog::new()
                                    .add_filter("Documents", &["pdf", "txt", "docx"])
                                    .pick_files()
                                {
                                    self.add_candidate_paths(&paths);
                                }
                            }
                        });
                    });

                ui.add_space(8.0);
                let mut removed: Option<StagedFileId> = None;
                for file in &self.staged_files {
                    ui.horizontal(|ui| {
                        ui.label(&file.name);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").clicked() {
                                removed = Some(file.id);
                            }
                            ui.small(format_file_size(file.size_bytes));
                        });
                    });
                }
                if let Some(id) = removed {
                    self.remove_staged_file(id);
                }

                ui.add_space(6.0);
                if ui
                    .add_enabled(
                        self.upload_enabled(),
                        egui::Button::new(self.upload_button_label()),
                    )
                    .clicked()
                {
                    self.start_upload();
                }
                let clear_label = if self.clearing_documents {
                    "Clearing..."
                } else {
                    "Clear Documents"
                };
                if ui
                    .add_enabled(self.clear_docs_enabled(), egui::Button::new(clear_label))
                    .clicked()
                {
                    self.pending_confirm = Some(ConfirmAction::ClearDocuments);
                }

                ui.add_space(12.0);
                ui.separator();
                ui.add_space(6.0);
                ui.label(egui::RichText::new("System Status").strong());
                ui.add_space(4.0);
                match &self.system_status {
                    Some(status) => {
                        egui::Grid::new("status_grid").num_columns(2).show(ui, |ui| {
                            ui.label("Documents");
                            ui.label(status.documents_indexed.to_string());
                            ui.end_row();
                            ui.label("Queries");
                            ui.label(status.queries_processed.to_string());
                            ui.end_row();
                            ui.label("Avg query");
                            ui.label(format!("{:.0}ms", status.avg_query_time * 1000.0));
                            ui.end_row();
                            ui.label("Backend");
                            ui.label(&status.backend);
                            ui.end_row();
                        });
                    }
                    None => {
                        ui.small("Status unavailable");
                    }
                }
            });
    }

    fn show_composer_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            let response = ui.add(
                egui::TextEdit::multiline(&mut self.composer)
                    .id_salt("composer")
                    .desired_rows(2)
                    .desired_width(f32::INFINITY)
                    .hint_text("Ask a question about your documents..."),
            );
            let send_shortcut = response.has_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
            ui.horizontal(|ui| {
                let count = self.composer.chars().count();
                let counter = egui::RichText::new(format!("{count}/{COMPOSER_SOFT_LIMIT}")).small();
                if count > COMPOSER_SOFT_LIMIT {
                    ui.label(counter.color(ui.visuals().error_fg_color));
                } else {
                    ui.label(counter);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(self.send_enabled(), egui::Button::new("Send"))
                        .clicked()
                    {
                        self.send_current_message();
                    }
                });
            });
            ui.add_space(6.0);
            if send_shortcut {
                self.send_current_message();
            }
        });
    }

    fn show_messages(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.messages.is_empty() {
                        ui.add_space(24.0);
                        ui.vertical_centered(|ui| {
                            ui.heading("Welcome to DocChat");
                            ui.add_space(6.0);
                            ui.label(
                                "Upload documents on the left, then ask questions about them here.",
                            );
                            ui.small("Answers cite the source passages they were drawn from.");
                        });
                    }
                    for (index, message) in self.messages.iter().enumerate() {
                        ui.add_space(8.0);
                        show_message(ui, index, message);
                    }
                    if self.is_typing {
                        ui.add_space(8.0);
                        let dots = ".".repeat((ui.input(|i| i.time * 2.0) as usize % 3) + 1);
                        ui.small(format!("Assistant is typing{dots}"));
                    }
                    ui.add_space(8.0);
                });
        });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let session_label = self.session_id.as_str().to_string();
        let server_label = self.server_url.clone();
        egui::Window::new("Settings")
            .open(&mut self.settings_open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Temperature");
                ui.add(egui::Slider::new(
                    &mut self.chat_settings.temperature,
                    MIN_TEMPERATURE..=MAX_TEMPERATURE,
                ));
                ui.add_space(4.0);
                ui.label("Max tokens");
                ui.add(
                    egui::DragValue::new(&mut self.chat_settings.max_tokens).range(1..=4096),
                );
                ui.add_space(8.0);
                ui.separator();
                ui.small(format!("Server: {server_label}"));
                ui.small(format!("Session: {session_label}"));
            });
    }

    fn show_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(action) = self.pending_confirm else {
            return;
        };
        let mut decision: Option<bool> = None;
        egui::Window::new("Are you sure?")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(action.prompt());
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                    if ui.button(action.confirm_label()).clicked() {
                        decision = Some(true);
                    }
                });
            });
        if let Some(confirmed) = decision {
            self.pending_confirm = None;
            if confirmed {
                match action {
                    ConfirmAction::NewSession => self.reset_conversation(),
                    ConfirmAction::ClearChat => self.clear_chat_confirmed(),
                    ConfirmAction::ClearDocuments => self.begin_clear_documents(),
                }
            }
        }
    }

    fn show_upload_modal(&self, ctx: &egui::Context) {
        let Some(progress) = &self.upload_progress else {
            return;
        };
        egui::Window::new("Uploading Documents")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.add(
                    egui::ProgressBar::new(progress.fraction())
                        .desired_width(260.0)
                        .show_percentage(),
                );
                ui.add_space(4.0);
                ui.label(progress.status_text());
            });
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        let mut dismissed: Option<u64> = None;
        egui::Area::new(egui::Id::new("toast_overlay"))
            .anchor(Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .show(ctx, |ui| {
                for toast in self.toasts.iter() {
                    let accent = match toast.kind {
                        ToastKind::Success => egui::Color32::from_rgb(34, 197, 94),
                        ToastKind::Error => egui::Color32::from_rgb(239, 68, 68),
                        ToastKind::Warning => egui::Color32::from_rgb(245, 158, 11),
                        ToastKind::Info => egui::Color32::from_rgb(59, 130, 246),
                    };
                    egui::Frame::new()
                        .fill(ui.visuals().extreme_bg_color)
                        .stroke(egui::Stroke::new(1.0, accent))
                        .corner_radius(egui::CornerRadius::same(6))
                        .inner_margin(egui::Margin::symmetric(10, 8))
                        .show(ui, |ui| {
                            ui.set_max_width(280.0);
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&toast.title).strong().color(accent));
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("✕").clicked() {
                                            dismissed = Some(toast.id);
                                        }
                                    },
                                );
                            });
                            ui.label(&toast.message);
                        });
                    ui.add_space(6.0);
                }
            });
        if let Some(id) = dismissed {
            self.toasts.dismiss(id);
        }
    }
}

impl eframe::App for DocChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();
        self.advance_upload_animation();
        self.toasts.prune(Instant::now());

        if self.applied_theme != Some(self.theme) {
            ctx.set_visuals(visuals_for(self.theme));
            self.applied_theme = Some(self.theme);
        }

        // Hold a brief splash until the startup status poll resolves either
        // way, so the workspace never flashes with empty counters.
        if self.awaiting_first_status && self.worker_error.is_none() {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    ui.add(egui::Spinner::new());
                    ui.add_space(8.0);
                    ui.label("Connecting to the backend...");
                });
            });
            ctx.request_repaint_after(Duration::from_millis(150));
            return;
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_candidate_paths(&dropped);
        }
        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        self.show_top_bar(ctx);
        self.show_documents_panel(ctx, hovering_files);
        self.show_composer_panel(ctx);
        self.show_messages(ctx);
        self.show_settings_window(ctx);
        self.show_upload_modal(ctx);
        self.show_confirm_dialog(ctx);
        self.show_toasts(ctx);

        if self.is_uploading || self.is_typing {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(150));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedUiSettings {
            theme: Some(self.theme),
        };
        match serde_json::to_string(&settings) {
            Ok(json) => storage.set_string(SETTINGS_STORAGE_KEY, json),
            Err(err) => warn!("failed to serialize ui settings: {err}"),
        }
    }
}

fn show_message(ui: &mut egui::Ui, index: usize, message: &DisplayMessage) {
    let fill = match message.role {
        Role::User => ui.visuals().faint_bg_color,
        Role::Assistant => ui.visuals().extreme_bg_color,
    };
    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(message.role.display_name()).strong());
                ui.small(message.timestamp.format("%H:%M").to_string());
            });
            let job = message_layout_job(
                &message.body,
                ui.visuals().text_color(),
                ui.visuals().strong_text_color(),
                14.0,
                ui.visuals().code_bg_color,
            );
            ui.label(job);
            if !message.sources.is_empty() {
                egui::CollapsingHeader::new(format!("Sources ({})", message.sources.len()))
                    .id_salt(("message_sources", index))
                    .show(ui, |ui| {
                        for source in &message.sources {
                            let label = match source.metadata.page {
                                Some(page) => {
                                    format!("{} (page {page})", source.metadata.source)
                                }
                                None => source.metadata.source.clone(),
                            };
                            ui.label(egui::RichText::new(label).strong());
                            ui.small(&source.content);
                            ui.add_space(4.0);
                        }
                    });
            }
        });
}

fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable size, trimming trailing zeros ("1.5 MB", "22 Bytes").
fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let mut rendered = format!("{value:.2}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }
    format!("{rendered} {}", UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use client_core::{ApiFailure, StatusCode};
    use shared::protocol::ChatResponse;

    use super::*;

    fn test_app() -> (DocChatApp, Receiver<BackendCommand>) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(16);
        let (_ui_tx, ui_rx) = crossbeam_channel::bounded::<UiEvent>(16);
        let app = DocChatApp::bootstrap(
            StartupConfig::default(),
            ThemePreference::Light,
            cmd_tx,
            ui_rx,
        );
        // Drain the startup status poll so tests see only their own commands.
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::FetchStatus { delay: None })
        ));
        (app, cmd_rx)
    }

    fn toast_titles(app: &DocChatApp) -> Vec<String> {
        app.toasts.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn oversized_candidate_is_rejected_with_a_toast() {
        let (mut app, _cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.pdf");
        let file = std::fs::File::create(&path).expect("create");
        file.set_len(15 * 1024 * 1024).expect("set_len");

        app.add_candidate_paths(&[path]);
        assert!(app.staged_files.is_empty());
        assert_eq!(toast_titles(&app), vec!["File Too Large"]);
    }

    #[test]
    fn unsupported_candidate_is_rejected_with_a_toast() {
        let (mut app, _cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"not really a png").expect("write");

        app.add_candidate_paths(&[path]);
        assert!(app.staged_files.is_empty());
        assert_eq!(toast_titles(&app), vec!["Invalid File Type"]);
    }

    #[test]
    fn valid_candidates_get_sequential_ids() {
        let (mut app, _cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        std::fs::write(&first, b"alpha").expect("write");
        std::fs::write(&second, b"beta").expect("write");

        app.add_candidate_paths(&[first, second]);
        let ids: Vec<u64> = app.staged_files.iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn removing_a_stale_id_is_a_no_op() {
        let (mut app, _cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"alpha").expect("write");
        app.add_candidate_paths(&[path]);

        app.remove_staged_file(StagedFileId(99));
        assert_eq!(app.staged_files.len(), 1);

        app.remove_staged_file(StagedFileId(0));
        assert!(app.staged_files.is_empty());
    }

    #[test]
    fn upload_button_label_pluralizes() {
        let (mut app, _cmd_rx) = test_app();
        assert_eq!(app.upload_button_label(), "Upload Documents");

        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        std::fs::write(&first, b"alpha").expect("write");
        std::fs::write(&second, b"beta").expect("write");

        app.add_candidate_paths(std::slice::from_ref(&first));
        assert_eq!(app.upload_button_label(), "Upload 1 Document");
        app.add_candidate_paths(&[second]);
        assert_eq!(app.upload_button_label(), "Upload 2 Documents");

        app.is_uploading = true;
        assert_eq!(app.upload_button_label(), "Uploading...");
    }

    #[test]
    fn sending_appends_user_message_and_queues_the_request() {
        let (mut app, cmd_rx) = test_app();
        app.documents_uploaded = true;
        app.composer = "  What is the refund policy?  ".to_string();
        app.send_current_message();

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::User);
        assert_eq!(app.messages[0].body, "What is the refund policy?");
        assert!(app.composer.is_empty());
        assert!(app.is_typing);

        match cmd_rx.try_recv() {
            Ok(BackendCommand::SendChat { request }) => {
                assert_eq!(request.message, "What is the refund policy?");
                assert_eq!(request.session_id, "default");
                assert_eq!(request.temperature, ChatSettings::default().temperature);
            }
            other => panic!("expected SendChat, got {:?}", other.map(|c| c.name())),
        }
    }

    #[test]
    fn send_requires_documents_and_text_and_no_pending_reply() {
        let (mut app, _cmd_rx) = test_app();
        assert!(!app.send_enabled());

        app.composer = "hello".to_string();
        assert!(!app.send_enabled(), "blocked until documents are uploaded");

        app.documents_uploaded = true;
        assert!(app.send_enabled());

        app.composer = "   ".to_string();
        assert!(!app.send_enabled());

        app.composer = "hello".to_string();
        app.is_typing = true;
        assert!(!app.send_enabled());
    }

    #[test]
    fn status_poll_derives_chat_enablement_from_the_index() {
        let (mut app, _cmd_rx) = test_app();
        app.handle_event(UiEvent::StatusUpdated(SystemStatus {
            documents_indexed: 5,
            queries_processed: 0,
            avg_query_time: 0.0,
            backend: "chroma".to_string(),
        }));
        assert!(app.documents_uploaded);

        app.handle_event(UiEvent::StatusUpdated(SystemStatus {
            documents_indexed: 0,
            queries_processed: 0,
            avg_query_time: 0.0,
            backend: "chroma".to_string(),
        }));
        assert!(!app.documents_uploaded);
    }

    #[test]
    fn startup_splash_resolves_on_first_status_result() {
        let (mut app, _cmd_rx) = test_app();
        assert!(app.awaiting_first_status);
        app.handle_event(UiEvent::StatusUpdated(SystemStatus {
            documents_indexed: 1,
            queries_processed: 0,
            avg_query_time: 0.0,
            backend: "chroma".to_string(),
        }));
        assert!(!app.awaiting_first_status);

        let (mut unreachable, _cmd_rx) = test_app();
        unreachable.handle_event(UiEvent::StatusUnavailable);
        assert!(!unreachable.awaiting_first_status);
        assert!(unreachable.system_status.is_none());
    }

    #[test]
    fn chat_success_appends_reply_and_schedules_a_poll() {
        let (mut app, cmd_rx) = test_app();
        app.is_typing = true;
        app.system_status = Some(SystemStatus {
            documents_indexed: 3,
            queries_processed: 7,
            avg_query_time: 0.4,
            backend: "chroma".to_string(),
        });

        app.handle_event(UiEvent::ChatFinished(Ok(ChatResponse {
            response: "Refunds are accepted within **30 days**.".to_string(),
            sources: vec![],
            processing_time: 1.87,
        })));

        assert!(!app.is_typing);
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::Assistant);
        assert_eq!(
            app.system_status.as_ref().map(|s| s.queries_processed),
            Some(8)
        );
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Response Generated");
        assert_eq!(toast.message, "Processed in 1.87s");
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::FetchStatus { delay: Some(d) }) if d == STATUS_POLL_AFTER_CHAT
        ));
    }

    #[test]
    fn chat_failure_surfaces_backend_detail() {
        let (mut app, _cmd_rx) = test_app();
        app.is_typing = true;
        app.handle_event(UiEvent::ChatFinished(Err(ApiFailure::Backend {
            status: StatusCode::BAD_REQUEST,
            detail: Some("No documents uploaded. Please upload documents first.".to_string()),
        })));

        assert!(!app.is_typing);
        assert!(app.messages.is_empty());
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Chat Error");
        assert_eq!(
            toast.message,
            "No documents uploaded. Please upload documents first."
        );
    }

    #[test]
    fn upload_success_is_finalized_when_the_modal_closes() {
        let (mut app, cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"alpha").expect("write");
        app.add_candidate_paths(&[path]);
        app.is_uploading = true;
        app.upload_progress = Some(UploadProgress::begin(Instant::now()));

        app.handle_event(UiEvent::UploadFinished(Ok(UploadResponse {
            documents_processed: 12,
            processing_time: 3.5,
        })));
        // Modal still open: staged files untouched until the animation ends.
        assert!(app.is_uploading);
        assert_eq!(app.staged_files.len(), 1);

        app.finish_upload_success();
        assert!(!app.is_uploading);
        assert!(app.staged_files.is_empty());
        assert!(app.documents_uploaded);
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Upload Successful");
        assert_eq!(toast.message, "Processed 12 document chunks in 3.50s");
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::FetchStatus { delay: Some(d) }) if d == STATUS_POLL_AFTER_UPLOAD
        ));
    }

    #[test]
    fn upload_failure_closes_modal_and_keeps_staged_files() {
        let (mut app, _cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"alpha").expect("write");
        app.add_candidate_paths(&[path]);
        app.is_uploading = true;
        app.upload_progress = Some(UploadProgress::begin(Instant::now()));

        app.handle_event(UiEvent::UploadFinished(Err(ApiFailure::Backend {
            status: StatusCode::BAD_REQUEST,
            detail: Some("No valid documents found".to_string()),
        })));

        assert!(!app.is_uploading);
        assert!(app.upload_progress.is_none());
        assert_eq!(app.staged_files.len(), 1);
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Upload Failed");
        assert_eq!(toast.message, "No valid documents found");
    }

    #[test]
    fn clear_failure_keeps_documents_flag() {
        let (mut app, _cmd_rx) = test_app();
        app.documents_uploaded = true;
        app.clearing_documents = true;

        app.handle_event(UiEvent::DocumentsCleared(Err(ApiFailure::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        })));

        assert!(app.documents_uploaded);
        assert!(!app.clearing_documents);
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Clear Failed");
        assert_eq!(toast.message, "Failed to clear documents");
    }

    #[test]
    fn clear_success_resets_documents_flag_and_polls() {
        let (mut app, cmd_rx) = test_app();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pending.txt");
        std::fs::write(&path, b"still staged").expect("write");
        app.add_candidate_paths(&[path]);
        app.documents_uploaded = true;
        app.clearing_documents = true;

        app.handle_event(UiEvent::DocumentsCleared(Ok(
            shared::protocol::ClearDocumentsResponse {
                message: Some("All documents cleared successfully".to_string()),
            },
        )));

        assert!(!app.documents_uploaded);
        assert!(!app.clearing_documents);
        assert!(app.staged_files.is_empty());
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::FetchStatus { delay: Some(d) }) if d == STATUS_POLL_AFTER_CLEAR
        ));
    }

    #[test]
    fn theme_toggle_round_trips_and_announces() {
        let (mut app, _cmd_rx) = test_app();
        app.toggle_theme();
        assert_eq!(app.theme, ThemePreference::Dark);
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Theme Changed");
        assert_eq!(toast.message, "Switched to Dark Mode");

        app.toggle_theme();
        assert_eq!(app.theme, ThemePreference::Light);
    }

    #[test]
    fn new_session_clears_the_transcript() {
        let (mut app, _cmd_rx) = test_app();
        app.messages.push(DisplayMessage {
            role: Role::User,
            body: "hi".to_string(),
            sources: Vec::new(),
            timestamp: Local::now(),
        });
        app.is_typing = true;

        app.reset_conversation();
        assert!(app.messages.is_empty());
        assert!(!app.is_typing);
        assert_ne!(app.session_id, SessionId::default());
    }

    #[test]
    fn clear_chat_resets_the_transcript_but_keeps_the_session() {
        let (mut app, _cmd_rx) = test_app();
        app.messages.push(DisplayMessage {
            role: Role::User,
            body: "hi".to_string(),
            sources: Vec::new(),
            timestamp: Local::now(),
        });
        app.composer = "draft".to_string();
        app.is_typing = true;
        let session_before = app.session_id.clone();

        app.clear_chat_confirmed();
        assert!(app.messages.is_empty());
        assert!(app.composer.is_empty());
        assert!(!app.is_typing);
        assert_eq!(app.session_id, session_before);
        let toast = app.toasts.iter().next().expect("toast");
        assert_eq!(toast.title, "Chat Cleared");
    }

    #[test]
    fn file_sizes_render_like_the_sidebar_expects() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(22), "22 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_610_612_736), "1.5 GB");
    }
}
