//! Application main loop

use anyhow::Result;
use app_core::{
    AppConfig, AppState, Command, DefaultPreviewLoader, FileId, IntakeInput, IntakeJob,
    IntakeSource, PreviewContent, ResourceManager, Viewer,
};
use app_ui::components::{
    pagination, pick_files, pick_folder, ConfirmDialog, Dialog, DialogResult, FileTable,
    JobStatus, Pagination, PaginationInfo, StatusBar, StatusInfo, TableAction, UploadAction,
    UploadPanel, ViewerAction, ViewerModal,
};
use app_ui::{InputHandler, Renderer, Theme};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Main application state for the event loop
struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    // UI
    input_handler: InputHandler,
    theme: Theme,
    pending_delete: Option<ConfirmDialog<FileId>>,
    /// Picker requested this frame; opened once the frame is painted
    pending_pick: Option<UploadAction>,
    status_message: String,
    repaint_now: bool,
    exit_requested: bool,

    // Domain
    config: AppConfig,
    state: AppState,
    viewer: Viewer,
    resources: ResourceManager,
    jobs: Vec<IntakeJob>,

    // Dropped last so the viewer and jobs can still reach it
    runtime: tokio::runtime::Runtime,
}

impl App {
    fn new(config: AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("file-shelf-worker")
            .build()?;

        let resources = ResourceManager::new();
        let loader = DefaultPreviewLoader::new(&config.viewer, resources.clone());
        let viewer = Viewer::new(runtime.handle().clone(), Arc::new(loader));
        let state = AppState::with_demo_records(config.clone());

        Ok(Self {
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,

            input_handler: InputHandler::new(&config.keybindings),
            theme: Theme::by_name(&config.general.theme),
            pending_delete: None,
            pending_pick: None,
            status_message: String::new(),
            repaint_now: true,
            exit_requested: false,

            config,
            state,
            viewer,
            resources,
            jobs: Vec::new(),

            runtime,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("FileShelf")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.general.window_width,
                self.config.general.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        self.theme.apply(&self.egui_ctx);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);

        Ok(())
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(egui_state) = self.egui_state.as_mut() else {
            return;
        };

        let raw_input = egui_state.take_egui_input(&window);
        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| self.ui(ctx));

        if let Some(egui_state) = self.egui_state.as_mut() {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        self.repaint_now = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());

        let clipped_primitives = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.paint(
                &clipped_primitives,
                &full_output.textures_delta,
                full_output.pixels_per_point,
                self.theme.background,
            ) {
                tracing::error!("Render failed: {}", e);
            }
        }

        // Native pickers block, so they run between frames
        if let Some(action) = self.pending_pick.take() {
            self.execute_command(match action {
                UploadAction::PickFiles => Command::UploadFiles,
                UploadAction::PickFolder => Command::UploadFolder,
            });
        }
    }

    fn ui(&mut self, ctx: &egui::Context) {
        self.poll_jobs();
        if self.viewer.poll() {
            self.repaint_now = true;
        }

        let (hovering, dropped) = ctx.input(|i| (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone()));
        if !dropped.is_empty() {
            self.handle_drop(dropped);
        }

        let jobs: Vec<JobStatus> = self.jobs.iter().map(JobStatus::from_job).collect();
        let upload_action = egui::TopBottomPanel::top("upload_panel")
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("FileShelf");
                ui.add_space(8.0);
                let action = UploadPanel::ui(ui, &self.theme, hovering, &jobs);
                ui.add_space(8.0);
                action
            })
            .inner;

        let status = StatusInfo::from_state(&self.state, &self.status_message);
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            StatusBar::ui(ui, &status);
        });

        let page_info = PaginationInfo::from_state(&self.state);
        let (table_action, page_action) = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.heading(format!("Uploaded Files ({})", self.state.catalog().len()));
                ui.separator();
                let table_action = egui::ScrollArea::vertical()
                    .max_height((ui.available_height() - 48.0).max(120.0))
                    .show(ui, |ui| FileTable::ui(ui, self.state.visible(), &self.theme))
                    .inner;
                ui.separator();
                let page_action = Pagination::ui(ui, &page_info);
                (table_action, page_action)
            })
            .inner;

        let viewer_action = ViewerModal::ui(ctx, self.viewer.state(), &self.theme);

        let confirmed = match self.pending_delete.as_mut().map(|d| d.ui(ctx)) {
            Some(DialogResult::Ok(id)) => Some(id),
            Some(DialogResult::Cancel) => {
                self.pending_delete = None;
                None
            }
            _ => None,
        };
        if let Some(id) = confirmed {
            self.pending_delete = None;
            self.delete(&id);
        }

        if upload_action.is_some() {
            self.pending_pick = upload_action;
        }

        if let Some(action) = page_action {
            pagination::apply(&mut self.state, action);
        }

        match table_action {
            Some(TableAction::View(id)) => self.view(&id),
            Some(TableAction::Delete(id)) => self.request_delete(id),
            None => {}
        }

        match viewer_action {
            Some(ViewerAction::Close) => self.viewer.close(),
            Some(ViewerAction::OpenExternal) => self.open_external(),
            Some(ViewerAction::Delete(id)) => self.request_delete(id),
            None => {}
        }

        if !self.jobs.is_empty() || self.viewer.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn execute_command(&mut self, cmd: Command) {
        tracing::debug!("Command: {}", cmd);
        match cmd {
            Command::NextPage => self.state.next_page(),
            Command::PrevPage => self.state.prev_page(),
            Command::FirstPage => self.state.first_page(),
            Command::LastPage => self.state.last_page(),
            Command::CyclePageSize => self.state.cycle_items_per_page(),
            Command::UploadFiles => self.upload(pick_files()),
            Command::UploadFolder => self.upload(pick_folder()),
            Command::CloseViewer => {
                if let Some(dialog) = self.pending_delete.as_mut() {
                    dialog.close();
                    self.pending_delete = None;
                } else {
                    self.viewer.close();
                }
            }
            Command::Exit => self.exit_requested = true,
        }
    }

    fn upload(&mut self, paths: Vec<PathBuf>) {
        self.start_intake(paths.into_iter().map(IntakeInput::from).collect());
    }

    fn start_intake(&mut self, inputs: Vec<IntakeInput>) {
        if inputs.is_empty() {
            tracing::debug!("Upload cancelled");
            return;
        }
        let job = IntakeJob::spawn_inputs(self.runtime.handle(), inputs, self.state.intake_options());
        self.jobs.push(job);
    }

    /// One drop is one batch, in drop order
    fn handle_drop(&mut self, files: Vec<egui::DroppedFile>) {
        let inputs = files
            .into_iter()
            .filter_map(|file| match (file.path, file.bytes) {
                (Some(path), _) => Some(IntakeInput::Path(path)),
                (None, Some(bytes)) => Some(IntakeSource::from_bytes(file.name, bytes).into()),
                (None, None) => {
                    tracing::warn!("Dropped item {} has no path or content", file.name);
                    None
                }
            })
            .collect();
        self.start_intake(inputs);
    }

    fn poll_jobs(&mut self) {
        let mut batches = Vec::new();
        let mut errors = Vec::new();

        self.jobs.retain_mut(|job| match job.poll() {
            Some(Ok(sources)) => {
                batches.push(sources);
                false
            }
            Some(Err(e)) => {
                errors.push(e.user_message());
                false
            }
            None => !job.is_finished(),
        });

        for sources in batches {
            let added = self.state.ingest(sources, Utc::now());
            self.status_message = format!("Uploaded {} files", added);
            self.repaint_now = true;
        }
        if let Some(error) = errors.pop() {
            self.status_message = format!("Upload failed: {}", error);
        }
    }

    fn view(&mut self, id: &FileId) {
        match self.state.find(id) {
            Some(record) => self.viewer.open(record.clone()),
            None => tracing::debug!("View of unknown id {} ignored", id),
        }
    }

    fn request_delete(&mut self, id: FileId) {
        if !self.config.catalog.confirm_delete {
            self.delete(&id);
            return;
        }
        if let Some(record) = self.state.find(&id) {
            self.pending_delete = Some(ConfirmDialog::new_delete(record.name(), id));
        }
    }

    fn delete(&mut self, id: &FileId) {
        if let Some(record) = self.state.delete_viewed(id, &mut self.viewer) {
            self.status_message = format!("Deleted {}", record.name());
        }
    }

    fn open_external(&mut self) {
        if let Some(PreviewContent::Pdf(pdf)) = self.viewer.state().content() {
            if let Err(e) = pdf.open_external() {
                tracing::warn!("Could not open {:?}: {}", pdf.path(), e);
                self.status_message = e.user_message();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        let consumed = match (&mut self.egui_state, &self.window) {
            (Some(egui_state), Some(window)) => {
                let response = egui_state.on_window_event(window, &event);
                if response.repaint {
                    window.request_redraw();
                }
                response.consumed
            }
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if let Some(cmd) = self.input_handler.handle_key(&event) {
                    self.execute_command(cmd);
                }
            }

            WindowEvent::MouseInput { state, button, .. } if !consumed => {
                if let Some(cmd) = self.input_handler.handle_mouse_button(button, state) {
                    self.execute_command(cmd);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input_handler.update_modifiers(modifiers.state());
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }

        if self.exit_requested {
            tracing::info!("Exit requested");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let busy = !self.jobs.is_empty() || self.viewer.is_busy();
        if let Some(window) = &self.window {
            if busy || self.repaint_now {
                window.request_redraw();
            }
        }

        if busy {
            event_loop.set_control_flow(ControlFlow::wait_duration(Duration::from_millis(50)));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.viewer.close();
        tracing::info!(
            "Shutting down ({} files, {} preview handles live)",
            self.state.catalog().len(),
            self.resources.live()
        );
    }
}

/// Run the application
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
