/*!
 * Desktop front end for vitaldash.
 *
 * Loads a patient CSV, exposes the sex / department / disease filters, the chart kind,
 * axes and probe inputs, and shows the resulting legend, tooltips and summary.
 * The current chart can be written to SVG.
 */

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use vitaldash::models::sex_label;
use vitaldash::palette::Rgb8;
use vitaldash::{Action, DashError, Dashboard, DashboardConfig, Dataset, NumericField, PlotKind};

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match DashboardConfig::discover(None) {
        Ok(c) => c,
        Err(err) => {
            log::warn!("ignoring settings file: {err}");
            DashboardConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([700.0, 450.0])
            .with_title("vitaldash"),
        ..Default::default()
    };

    eframe::run_native(
        "vitaldash",
        options,
        Box::new(|_cc| Ok(Box::new(DashApp::new(config)))),
    )
}

type LoadResult = Result<Dataset, DashError>;

struct DashApp {
    csv_path: String,
    output_dir: String,
    config: DashboardConfig,
    dash: Option<Dashboard>,

    disease_query: String,
    dark_mode: bool,

    is_loading: bool,
    status_message: String,
    error_message: String,
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl DashApp {
    fn new(config: DashboardConfig) -> Self {
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();
        Self {
            csv_path: String::new(),
            output_dir: home_dir,
            config,
            dash: None,
            disease_query: String::new(),
            dark_mode: false,
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        }
    }

    fn start_load(&mut self) {
        if self.csv_path.trim().is_empty() {
            self.error_message = "Please choose a CSV file".to_string();
            return;
        }
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Loading dataset...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);
        let path = PathBuf::from(self.csv_path.trim());
        let outcome = self.config.outcome_column.clone();
        thread::spawn(move || {
            let _ = sender.send(vitaldash::storage::load_csv(&path, &outcome));
        });
    }

    fn check_load_result(&mut self) {
        if let Some(receiver) = &self.load_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.is_loading = false;
            self.load_receiver = None;
            match result {
                Ok(data) => {
                    self.status_message = format!("Loaded {} rows", data.len());
                    self.error_message.clear();
                    self.disease_query.clear();
                    self.dash = Some(Dashboard::new(data, self.config.clone()));
                }
                Err(err) => {
                    // a failed load keeps the previous dataset on screen
                    self.error_message = format!("Failed to load data: {err}");
                    self.status_message.clear();
                }
            }
        }
    }

    fn save_svg(&mut self) {
        let Some(dash) = &self.dash else { return };
        let slug = match dash.state().plot_kind {
            PlotKind::Distribution => "distribution",
            PlotKind::Scatter => "scatter",
            PlotKind::Pie => "pie",
            PlotKind::DeathRate => "death_rate",
        };
        let path = PathBuf::from(&self.output_dir).join(format!("vitaldash_{slug}.svg"));
        match dash.render_svg(&path) {
            Ok(()) => {
                self.status_message = format!("Chart written to {}", path.display());
                self.error_message.clear();
            }
            Err(err) => self.error_message = format!("Failed to create chart: {err}"),
        }
    }
}

fn color32(c: Rgb8) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

fn axis_combo(ui: &mut egui::Ui, id: &str, current: Option<NumericField>) -> Option<Option<NumericField>> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.map_or("None", |f| f.label()))
        .show_ui(ui, |ui| {
            if ui.selectable_label(current.is_none(), "None").clicked() {
                picked = Some(None);
            }
            for f in NumericField::AXES {
                if ui.selectable_label(current == Some(f), f.label()).clicked() {
                    picked = Some(Some(f));
                }
            }
        });
    picked
}

/// Filter widgets. Returns the actions the user triggered this frame.
fn filter_panel(ui: &mut egui::Ui, dash: &Dashboard, disease_query: &mut String) -> Vec<Action> {
    let mut actions = Vec::new();
    let domain = dash.dataset().domain();
    let state = dash.state();

    ui.label("Sex");
    let mut all = state.sexes.len() == domain.sexes.len();
    if ui.checkbox(&mut all, "All").changed() {
        actions.push(Action::SetAllSexes(all));
    }
    for s in &domain.sexes {
        let mut on = state.sexes.contains(s);
        if ui.checkbox(&mut on, sex_label(s)).changed() {
            actions.push(Action::ToggleSex(s.clone()));
        }
    }

    ui.separator();
    ui.label("Department");
    let mut all = state.departments.len() == domain.departments.len();
    if ui.checkbox(&mut all, "All").changed() {
        actions.push(Action::SetAllDepartments(all));
    }
    for d in &domain.departments {
        let mut on = state.departments.contains(d);
        if ui.checkbox(&mut on, d).changed() {
            actions.push(Action::ToggleDepartment(d.clone()));
        }
    }

    ui.separator();
    ui.label("Disease");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(disease_query)
            .on_hover_text("Type to narrow the disease list");
        if ui.button("Clear").clicked() {
            disease_query.clear();
            actions.push(Action::SelectDisease(None));
        }
    });
    if let Some(dx) = &state.disease {
        ui.label(format!("Selected: {dx}"));
    }
    let needle = disease_query.to_lowercase();
    egui::ScrollArea::vertical()
        .id_salt("diseases")
        .max_height(160.0)
        .show(ui, |ui| {
            for dx in domain
                .diseases
                .iter()
                .filter(|d| needle.is_empty() || d.to_lowercase().contains(&needle))
            {
                let selected = state.disease.as_deref() == Some(dx.as_str());
                if ui.selectable_label(selected, dx).clicked() {
                    actions.push(Action::ToggleDisease(dx.clone()));
                }
            }
        });

    ui.separator();
    ui.label("Chart");
    for kind in PlotKind::ALL {
        if ui.radio(state.plot_kind == kind, kind.label()).clicked() {
            actions.push(Action::SetPlotKind(kind));
        }
    }

    if state.plot_kind.uses_x() {
        ui.horizontal(|ui| {
            ui.label("X:");
            if let Some(f) = axis_combo(ui, "x_field", state.x_field) {
                actions.push(Action::SetXField(f));
            }
        });
    }
    if state.plot_kind.uses_y() {
        ui.horizontal(|ui| {
            ui.label("Y:");
            if let Some(f) = axis_combo(ui, "y_field", state.y_field) {
                actions.push(Action::SetYField(f));
            }
        });
    }

    if matches!(state.plot_kind, PlotKind::Scatter | PlotKind::DeathRate) {
        ui.separator();
        let mut has_probe = state.probe_x.is_some() || state.probe_y.is_some();
        if ui.checkbox(&mut has_probe, "Your input").changed() && !has_probe {
            actions.push(Action::ClearProbe);
        }
        if has_probe {
            let mut px = state.probe_x.unwrap_or(0.0);
            let mut py = state.probe_y.unwrap_or(0.0);
            let mut changed = state.probe_x.is_none();
            ui.horizontal(|ui| {
                ui.label("x");
                changed |= ui.add(egui::DragValue::new(&mut px).speed(0.5)).changed();
                if state.plot_kind.uses_y() {
                    ui.label("y");
                    changed |= ui.add(egui::DragValue::new(&mut py).speed(0.5)).changed();
                }
            });
            if changed {
                actions.push(Action::SetProbe {
                    x: Some(px),
                    y: state.plot_kind.uses_y().then_some(py),
                });
            }
        }
    }
    actions
}

/// Legend, marks and summary. Returns the index of a clicked legend entry.
fn view_panel(ui: &mut egui::Ui, dash: &Dashboard) -> Option<usize> {
    let view = dash.view();
    let mut clicked = None;

    ui.heading(&view.title);
    if let Some(reason) = view.empty_reason() {
        ui.colored_label(egui::Color32::GRAY, reason.message());
    }

    if let Some(title) = &view.legend.title {
        ui.strong(title);
    }
    for (i, entry) in view.legend.entries.iter().enumerate() {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color32(entry.color));
            if entry.action.is_some() {
                if ui.link(&entry.label).clicked() {
                    clicked = Some(i);
                }
            } else {
                ui.label(&entry.label);
            }
        });
    }

    if !view.summary.is_empty() {
        ui.separator();
        for line in &view.summary {
            ui.label(line);
        }
    }

    if !view.marks.is_empty() {
        ui.separator();
        ui.label(format!("{} marks (hover for details)", view.marks.len()));
        egui::ScrollArea::vertical().id_salt("marks").show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for m in &view.marks {
                    ui.small_button(&m.id).on_hover_text(&m.tooltip);
                }
            });
        });
    }
    clicked
}

impl eframe::App for DashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_result();
        if self.is_loading {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("CSV:");
                ui.text_edit_singleline(&mut self.csv_path);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("CSV", &["csv"])
                        .pick_file()
                {
                    self.csv_path = path.to_string_lossy().to_string();
                }
                if ui
                    .add_enabled(!self.is_loading, egui::Button::new("Load"))
                    .clicked()
                {
                    self.start_load();
                }
                if self.is_loading {
                    ui.spinner();
                }
                ui.separator();
                if ui.checkbox(&mut self.dark_mode, "Dark").changed() {
                    ctx.set_visuals(if self.dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    });
                }
            });
            ui.horizontal(|ui| {
                ui.label("Output directory:");
                ui.text_edit_singleline(&mut self.output_dir);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new().pick_folder()
                {
                    self.output_dir = path.to_string_lossy().to_string();
                }
                if ui
                    .add_enabled(self.dash.is_some(), egui::Button::new("Save SVG"))
                    .clicked()
                {
                    self.save_svg();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        let mut actions = Vec::new();
        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match &self.dash {
                    Some(dash) => actions = filter_panel(ui, dash, &mut self.disease_query),
                    None => {
                        ui.label("Load a CSV to start.");
                    }
                });
            });

        let mut legend_click = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(dash) = &self.dash {
                legend_click = view_panel(ui, dash);
            }
        });

        // state changes happen after drawing so the frame shows one consistent view
        if let Some(dash) = &mut self.dash {
            for action in actions {
                if let Err(err) = dash.dispatch(action) {
                    self.error_message = err.to_string();
                }
            }
            if let Some(i) = legend_click
                && let Err(err) = dash.click_legend(i)
            {
                self.error_message = err.to_string();
            }
        }
    }
}
