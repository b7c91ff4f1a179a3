#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use clap::Parser;
use cumi_dashboard::{
    app,
    backend::{is_backend_active, HttpBackend, UploadFile},
    calculation::{CalculationType, QValueMethod, Selection},
    config,
    dashboard::{Dashboard, Notice, NoticeLevel, WAKE_MESSAGE},
    i18n,
    inactivity::OVERLAY_MESSAGE,
    numfmt,
    proportions::SHEET_LABELS,
    results::{DensityLabel, DetailSection, ResultView},
    startup,
    table::{cell_text, DataTable},
};
use eframe::{egui, App, Frame};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use image::GenericImageView;
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fs, thread};

fn main() {
    startup::init_tracing();
    if let Err(err) = run() {
        tracing::error!(error = %err, "GUI terminated");
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = startup::Args::parse();
    let config_path = args.config_path();
    let app_cfg = startup::load_config(&args)?;
    let dashboard = Dashboard::new(app::connect(&app_cfg)?, app_cfg.dashboard_settings());

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("CUMI GBD & q-value Dashboard")
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "CUMI GBD & q-value Dashboard",
        options,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx, app_cfg.font_path().as_deref()) {
                tracing::warn!("font: {e}");
            }
            Box::new(GuiApp::new(app_cfg, config_path, dashboard))
        }),
    )?;
    Ok(())
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["cumi.png", "icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .insert(0, font_name);
    ctx.set_fonts(fonts);
}

/// 한글 표시용 폰트를 적용한다.
/// 1) 설정의 font_path
/// 2) assets/fonts/malgun.ttf
/// 3) Windows 시스템 폰트(맑은 고딕/굴림 등)
/// 모두 실패하면 기본 폰트를 유지하고 Err를 돌려준다.
fn setup_fonts(ctx: &egui::Context, user_font: Option<&Path>) -> Result<(), String> {
    if let Some(path) = user_font {
        let bytes = fs::read(path)
            .map_err(|e| format!("Failed to read font file ({}): {e}", path.display()))?;
        apply_font_bytes(ctx, bytes, "user_font");
        return Ok(());
    }

    let asset_path = Path::new("assets/fonts/malgun.ttf");
    if asset_path.exists() {
        let bytes = fs::read(asset_path).map_err(|e| format!("Failed to read font file: {e}"))?;
        apply_font_bytes(ctx, bytes, "korean_font");
        return Ok(());
    }

    if let Some(windir) = std::env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        for cand in ["malgun.ttf", "malgunsl.ttf", "gulim.ttc", "batang.ttc"] {
            let p = fonts.join(cand);
            if p.exists() {
                let bytes = fs::read(&p)
                    .map_err(|e| format!("Failed to read system font ({}): {e}", p.display()))?;
                apply_font_bytes(ctx, bytes, "korean_font");
                return Ok(());
            }
        }
    }

    Err("Korean font not found. Set font_path in settings if Hangul is not rendered.".into())
}

fn notice_color(level: NoticeLevel) -> egui::Color32 {
    match level {
        NoticeLevel::Info => egui::Color32::from_rgb(90, 150, 230),
        NoticeLevel::Success => egui::Color32::from_rgb(70, 170, 90),
        NoticeLevel::Warning => egui::Color32::from_rgb(220, 170, 40),
        NoticeLevel::Error => egui::Color32::from_rgb(220, 70, 70),
    }
}

fn label_choice_text(label: DensityLabel) -> &'static str {
    match label {
        DensityLabel::PackingDensity => "q_<d> = packing density %",
        DensityLabel::Porosity => "q_<d> = porosity %",
    }
}

/// 깨우기 확인을 기다리는 업로드. 스피너를 한 프레임 그린 뒤 실행한다.
struct PendingUpload {
    file: UploadFile,
    shown: bool,
}

struct GuiApp {
    config: config::Config,
    config_path: PathBuf,
    tr: i18n::Translator,
    dashboard: Dashboard<HttpBackend>,
    notices: Vec<Notice>,
    view: Option<ResultView>,
    date_input: String,
    pending_upload: Option<PendingUpload>,
    /// 혼합비 표를 새로 그릴 때마다 증가 (열 폭 초기화)
    grid_epoch: u64,
    last_tick: Instant,
    apply_initial_view_size: bool,
    // 설정
    show_settings_modal: bool,
    lang_input: String,
    base_url_input: String,
    font_path_input: String,
    label_input: DensityLabel,
    window_alpha: f32,
    settings_status: Option<String>,
}

impl GuiApp {
    fn new(
        config: config::Config,
        config_path: PathBuf,
        dashboard: Dashboard<HttpBackend>,
    ) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        tracing::info!(lang = %lang_code, "GUI language resolved");
        Self {
            lang_input: config.language.clone(),
            base_url_input: config.base_url.clone(),
            font_path_input: config.font_path.clone().unwrap_or_default(),
            label_input: config.modified_q_label,
            window_alpha: config.window_alpha.clamp(0.3, 1.0),
            config,
            config_path,
            tr,
            dashboard,
            notices: Vec::new(),
            view: None,
            date_input: String::new(),
            pending_upload: None,
            grid_epoch: 0,
            last_tick: Instant::now(),
            apply_initial_view_size: true,
            show_settings_modal: false,
            settings_status: None,
        }
    }

    fn txt(&self, key: &str, default: &str) -> String {
        self.tr.lookup(key).unwrap_or_else(|| default.to_string())
    }

    /// 한 동작이 끝난 뒤 새 알림이 있으면 표시 목록을 바꾼다.
    fn collect_notices(&mut self) {
        let fresh = self.dashboard.take_notices();
        if !fresh.is_empty() {
            self.notices = fresh;
        }
    }

    fn reload(&mut self) {
        self.dashboard.reload(Instant::now());
        self.notices.clear();
        self.view = None;
        self.date_input.clear();
        self.pending_upload = None;
        self.grid_epoch += 1;
    }

    fn start_upload(&mut self, path: &Path) {
        let file = match UploadFile::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                self.notices = vec![Notice {
                    level: NoticeLevel::Error,
                    text: format!("Could not read {}: {e}", path.display()),
                }];
                return;
            }
        };
        if is_backend_active(self.dashboard.backend()) {
            self.run_upload(file, true);
        } else {
            self.pending_upload = Some(PendingUpload { file, shown: false });
        }
    }

    /// `alive`는 방금 보낸 `/ping` 결과. 깨어 있으면 다시 확인하지 않는다.
    fn run_upload(&mut self, file: UploadFile, alive: bool) {
        self.view = None;
        self.date_input.clear();
        let _ = self.dashboard.upload_after_ping(file, alive, thread::sleep);
        self.collect_notices();
    }

    fn apply_settings(&mut self, ctx: &egui::Context) {
        self.config.language = self.lang_input.clone();
        self.config.base_url = self.base_url_input.trim().to_string();
        self.config.window_alpha = self.window_alpha;
        self.config.modified_q_label = self.label_input;
        let font = self.font_path_input.trim();
        self.config.font_path = (!font.is_empty()).then(|| font.to_string());

        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr =
            i18n::Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        match app::connect(&self.config) {
            Ok(backend) => self.dashboard.set_backend(backend),
            Err(e) => {
                self.settings_status = Some(format!("Backend error: {e}"));
                return;
            }
        }
        self.dashboard.set_settings(self.config.dashboard_settings());
        self.view = self.dashboard.result_view();
        if let Some(path) = self.config.font_path() {
            if let Err(e) = setup_fonts(ctx, Some(&path)) {
                self.settings_status = Some(e);
                return;
            }
        }
        self.settings_status = Some(match self.config.save_to(&self.config_path) {
            Ok(()) => self.txt("gui.settings.saved", "Saved."),
            Err(e) => format!("Save error: {e}"),
        });
    }

    /// 입력이 있었거나 주기 틱이 지났으면 비활성 여부를 다시 계산한다.
    fn track_activity(&mut self, ctx: &egui::Context) {
        let interacted = ctx.input(|i| {
            i.pointer.any_pressed()
                || i.events
                    .iter()
                    .any(|e| matches!(e, egui::Event::Key { .. } | egui::Event::Text(_)))
        });
        let now = Instant::now();
        let tick_due = now.duration_since(self.last_tick) >= self.config.refresh_interval();
        if interacted || tick_due {
            self.last_tick = now;
            self.dashboard.observe_activity(now);
        }
        ctx.request_repaint_after(self.config.refresh_interval());
    }

    fn ui_upload(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.txt("gui.upload.title", "Upload Excel or CSV file"));
        ui.horizontal(|ui| {
            let busy = self.pending_upload.is_some();
            let browse = egui::Button::new(self.txt("gui.upload.browse", "Browse files..."));
            if ui.add_enabled(!busy, browse).clicked() {
                if let Some(path) = FileDialog::new()
                    .add_filter("Spreadsheet", &["xlsx", "xls", "csv"])
                    .pick_file()
                {
                    self.start_upload(&path);
                }
            }
            if let Some(name) = &self.dashboard.session().uploaded_file {
                ui.label(name);
            }
        });
        if self.pending_upload.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(WAKE_MESSAGE);
            });
        }
    }

    fn ui_date(&mut self, ui: &mut egui::Ui) {
        let Some(range) = self.dashboard.session().date_range else {
            return;
        };
        ui.separator();
        ui.label(format!("Available date range: {}", range.display()));
        ui.horizontal(|ui| {
            ui.label(self.txt("gui.date.select", "Select a date:"));
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.date_input)
                    .hint_text("DD-MM-YYYY")
                    .desired_width(120.0),
            );
            let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if submitted || ui.button(self.txt("gui.date.apply", "Apply")).clicked() {
                if let Ok(date) = self.dashboard.select_date_text(&self.date_input) {
                    self.date_input = cumi_dashboard::dates::to_display(date);
                }
                self.collect_notices();
            }
        });
        if self.dashboard.session().selected_date.is_some()
            && ui.button("🔍 Verify Sample Data").clicked()
        {
            let _ = self.dashboard.verify_sample_data();
            self.collect_notices();
        }
    }

    fn ui_sample_data(&mut self, ui: &mut egui::Ui) {
        let Some(sample) = self.dashboard.sample_view() else {
            return;
        };
        if sample.sheets.is_empty() {
            return;
        }
        egui::CollapsingHeader::new(format!("Sample Data for {}", sample.date))
            .default_open(true)
            .show(ui, |ui| {
                for sheet in &sample.sheets {
                    ui.strong(format!("📄 Sheet: {}", sheet.name));
                    data_table_ui(ui, ("sample", &sheet.name), &sheet.table);
                    ui.add_space(6.0);
                }
            });
    }

    fn ui_selectors(&mut self, ui: &mut egui::Ui) {
        if self.dashboard.session().selected_date.is_none() {
            return;
        }
        ui.separator();
        let current = self.dashboard.session().selection();
        let mut ty = current.calculation_type();
        let mut method = current.method();
        egui::Grid::new("selectors").num_columns(2).show(ui, |ui| {
            ui.label(self.txt("gui.calc.type", "Select Calculation Type:"));
            egui::ComboBox::from_id_source("calc_type")
                .selected_text(ty.label())
                .show_ui(ui, |ui| {
                    for option in CalculationType::ALL {
                        ui.selectable_value(&mut ty, option, option.label());
                    }
                });
            ui.end_row();
            if ty == CalculationType::QValues {
                ui.label(self.txt("gui.calc.method", "Select q-value Calculation Method:"));
                egui::ComboBox::from_id_source("q_method")
                    .selected_text(method.label())
                    .width(320.0)
                    .show_ui(ui, |ui| {
                        for option in QValueMethod::ALL {
                            ui.selectable_value(&mut method, option, option.label());
                        }
                    });
                ui.end_row();
            }
        });
        let next = Selection::from_parts(ty, method);
        if next != current {
            self.dashboard.select(next);
            self.view = None;
        }
    }

    fn ui_inputs(&mut self, ui: &mut egui::Ui) {
        let Some(kind) = self.dashboard.session().selection().kind() else {
            return;
        };
        if self.dashboard.take_table_reset() {
            self.grid_epoch += 1;
        }

        ui.label(self.txt("gui.proportions.title", "Edit Proportions"));
        let mut values = self.dashboard.session().proportions.draft();
        let mut changed = false;
        egui::Grid::new(("proportions", self.grid_epoch))
            .striped(true)
            .num_columns(2)
            .show(ui, |ui| {
                ui.strong("Sheet");
                ui.strong("Proportion");
                ui.end_row();
                for (label, value) in SHEET_LABELS.iter().zip(values.iter_mut()) {
                    ui.label(*label);
                    changed |= ui
                        .add(egui::DragValue::new(value).speed(0.01).max_decimals(4))
                        .changed();
                    ui.end_row();
                }
            });
        if changed {
            let _ = self.dashboard.edit_proportions(values);
        }

        if kind.requires_porosity() {
            let mut porosity = self.dashboard.session().porosity_input.clone();
            ui.label(kind.porosity_prompt());
            if ui
                .add(egui::TextEdit::singleline(&mut porosity).desired_width(120.0))
                .changed()
            {
                self.dashboard.set_porosity_input(porosity);
            }
        }

        let readiness = self.dashboard.readiness();
        if let Some(message) = readiness.error_message() {
            ui.colored_label(notice_color(NoticeLevel::Error), format!("⚠️ {message}"));
        }
        if let Some(label) = readiness.button_label() {
            if ui.button(label).clicked() {
                if let Ok(view) = self.dashboard.calculate() {
                    self.view = Some(view);
                }
                self.collect_notices();
            }
        }
    }

    fn ui_notices(&self, ui: &mut egui::Ui) {
        for notice in &self.notices {
            ui.colored_label(notice_color(notice.level), &notice.text);
        }
    }

    fn ui_results(&self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            return;
        };
        ui.separator();
        ui.heading("Results");
        for line in &view.headline {
            ui.strong(line);
        }
        if let Some(heading) = view.list_heading {
            ui.label(egui::RichText::new(heading).strong().size(16.0));
        }
        for line in &view.lines {
            ui.label(format!("🔹 {line}"));
        }
        if let Some(detail) = &view.detail {
            detail_ui(ui, detail);
        }
    }
}

/// 접힌 상세 영역: 표와 (있으면) 회귀 그래프.
fn detail_ui(ui: &mut egui::Ui, detail: &DetailSection) {
    egui::CollapsingHeader::new(detail.title)
        .default_open(false)
        .show(ui, |ui| {
            if let Some(warning) = detail.empty_warning {
                ui.colored_label(notice_color(NoticeLevel::Warning), warning);
            } else {
                ui.strong(detail.table_heading);
                data_table_ui(ui, ("detail", detail.title), &detail.table);
            }
            let Some(section) = &detail.plot else {
                return;
            };
            ui.add_space(8.0);
            ui.strong(section.heading);
            match &section.plot {
                Ok(plot) => {
                    let legend = plot.legend();
                    Plot::new(("regression", detail.title))
                        .legend(Legend::default())
                        .x_axis_label(plot.spec.x_label)
                        .y_axis_label(plot.spec.y_label)
                        .height(320.0)
                        .show(ui, |plot_ui| {
                            plot_ui.points(
                                Points::new(PlotPoints::from(plot.points.clone()))
                                    .name("Data Points")
                                    .radius(3.5),
                            );
                            plot_ui.line(
                                Line::new(PlotPoints::from(plot.fitted_points()))
                                    .name(legend)
                                    .width(2.0),
                            );
                        });
                    ui.small(plot.spec.title);
                }
                Err(e) => {
                    ui.colored_label(notice_color(NoticeLevel::Warning), e.to_string());
                }
            }
        });
}

fn data_table_ui(ui: &mut egui::Ui, id: impl std::hash::Hash, table: &DataTable) {
    if table.is_empty() {
        return;
    }
    egui::ScrollArea::both()
        .id_source(egui::Id::new(&id).with("scroll"))
        .max_height(280.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            egui::Grid::new(egui::Id::new(&id).with("grid"))
                .striped(true)
                .show(ui, |ui| {
                    for column in table.columns() {
                        ui.strong(column);
                    }
                    ui.end_row();
                    for row in table.rows() {
                        for cell in row {
                            ui.label(cell_text(cell));
                        }
                        ui.end_row();
                    }
                });
        });
}

/// 비활성 오버레이. 클릭하면 사라지지만 비활성 상태는 유지된다.
fn inactivity_overlay(ctx: &egui::Context) -> bool {
    let rect = ctx.screen_rect();
    let mut clicked = false;
    egui::Area::new(egui::Id::new("inactivity_overlay"))
        .order(egui::Order::Foreground)
        .fixed_pos(rect.min)
        .show(ctx, |ui| {
            let response = ui.allocate_rect(rect, egui::Sense::click());
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(215));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                OVERLAY_MESSAGE,
                egui::FontId::proportional(28.0),
                egui::Color32::WHITE,
            );
            clicked = response.clicked();
        });
    clicked
}

impl App for GuiApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 최초 1회 화면 크기 조정
        if self.apply_initial_view_size {
            if let Some(screen) = ctx.input(|i| {
                let r = i.screen_rect();
                r.is_positive().then(|| r.size())
            }) {
                let target = egui::vec2((screen.x * 0.60).max(900.0), (screen.y * 0.70).max(700.0));
                ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(target));
                self.apply_initial_view_size = false;
            }
        }

        // 스피너를 그린 다음 프레임에서 깨우기 + 업로드를 실행한다.
        if let Some(pending) = self.pending_upload.take() {
            if pending.shown {
                self.run_upload(pending.file, false);
            } else {
                self.pending_upload = Some(PendingUpload {
                    shown: true,
                    ..pending
                });
                ctx.request_repaint();
            }
        }

        self.track_activity(ctx);

        // 투명도 적용
        let mut style = (*ctx.style()).clone();
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        // 상단 바
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.txt("gui.nav.app_title", "CUMI GBD & q-value Dashboard"));
                ui.separator();
                if ui.button(self.txt("gui.reload", "Reload")).clicked() {
                    self.reload();
                }
                if ui.button(self.txt("gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
                ui.label(
                    egui::RichText::new(self.dashboard.backend().base_url())
                        .small()
                        .weak(),
                );
            });
        });

        // 설정 모달
        if self.show_settings_modal {
            let mut open = true;
            let mut save = false;
            egui::Window::new(self.txt("gui.settings.title", "Settings"))
                .collapsible(false)
                .resizable(true)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label(self.txt("gui.settings.base_url", "Backend URL"));
                    ui.text_edit_singleline(&mut self.base_url_input);
                    ui.separator();
                    ui.label(self.txt("gui.settings.lang", "Language"));
                    egui::ComboBox::from_id_source("lang_choice")
                        .selected_text(&self.lang_input)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.lang_input, "auto".into(), "System");
                            ui.selectable_value(
                                &mut self.lang_input,
                                "en-us".into(),
                                "English (US)",
                            );
                            ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                        });
                    ui.separator();
                    ui.label(self.txt("gui.settings.modified_label", "Modified q-value labels"));
                    for label in [DensityLabel::PackingDensity, DensityLabel::Porosity] {
                        ui.radio_value(&mut self.label_input, label, label_choice_text(label));
                    }
                    ui.separator();
                    ui.label(self.txt("gui.settings.alpha", "Window transparency"));
                    ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                    ui.separator();
                    ui.label(self.txt("gui.settings.font", "Font file (.ttf/.ttc)"));
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut self.font_path_input);
                        if ui.button("...").clicked() {
                            if let Some(p) = FileDialog::new()
                                .add_filter("Font", &["ttf", "ttc", "otf"])
                                .pick_file()
                            {
                                self.font_path_input = p.display().to_string();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button(self.txt("gui.settings.save", "Save settings")).clicked() {
                        save = true;
                    }
                    if let Some(msg) = &self.settings_status {
                        ui.label(msg);
                    }
                });
            if save {
                self.apply_settings(ctx);
            }
            self.show_settings_modal = open;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.heading("Green Bulk Density (GBD) and q-value Calculator");
                    ui.add_space(4.0);
                    self.ui_upload(ui);
                    self.ui_date(ui);
                    self.ui_sample_data(ui);
                    self.ui_selectors(ui);
                    self.ui_inputs(ui);
                    ui.add_space(6.0);
                    self.ui_notices(ui);
                    self.ui_results(ui);
                    ui.add_space(12.0);
                    ui.small(format!(
                        "Proportions sent as: {}",
                        numfmt::join_floats(&self.dashboard.session().proportions.draft())
                    ));
                });
        });

        if self.dashboard.session().inactivity.overlay_visible() && inactivity_overlay(ctx) {
            self.dashboard.dismiss_overlay();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumi_dashboard::backend::BackendSettings;

    fn app() -> GuiApp {
        let cfg = config::Config {
            base_url: "http://127.0.0.1:9".into(),
            ..config::Config::default()
        };
        let backend = HttpBackend::new(BackendSettings {
            base_url: cfg.base_url.clone(),
            ..BackendSettings::default()
        })
        .unwrap();
        let dashboard = Dashboard::new(backend, cfg.dashboard_settings());
        GuiApp::new(cfg, PathBuf::from("config.toml"), dashboard)
    }

    #[test]
    fn new_app_starts_empty() {
        let app = app();
        assert!(app.view.is_none());
        assert!(app.notices.is_empty());
        assert_eq!(app.window_alpha, 1.0);
        assert_eq!(app.dashboard.backend().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn reload_resets_inputs() {
        let mut app = app();
        app.date_input = "15-01-2024".into();
        app.notices.push(Notice {
            level: NoticeLevel::Info,
            text: "x".into(),
        });
        app.dashboard.select(Selection::Gbd);
        app.reload();
        assert!(app.date_input.is_empty());
        assert!(app.notices.is_empty());
        assert_eq!(app.dashboard.session().selection(), Selection::Unselected);
        assert_eq!(app.grid_epoch, 1);
    }

    #[test]
    fn notice_levels_have_distinct_colors() {
        let colors = [
            NoticeLevel::Info,
            NoticeLevel::Success,
            NoticeLevel::Warning,
            NoticeLevel::Error,
        ]
        .map(notice_color);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
