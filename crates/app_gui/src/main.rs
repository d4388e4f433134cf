use anyhow::Context as _;
use eframe::{App, Frame, NativeOptions, egui};
use rfd::FileDialog;
use std::path::Path;
use std::sync::Arc;
use stellar_core::{
    ClassifiedObservation, FeatureVector, Pipeline, PipelineConfig, QueryOutcome, UniformPicker,
    export_csv,
};

const CONFIG_FILE: &str = "stellar.toml";

fn main() {
    tracing_subscriber::fmt::init();
    let pipeline = match load_pipeline() {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            eprintln!("Failed to start: {e:#}");
            std::process::exit(1);
        }
    };
    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        "Stellar Classification",
        options,
        Box::new(move |_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(pipeline)))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}

/// Loads the deployment config (falling back to defaults when no
/// stellar.toml is present) and the model artifacts, once, at startup.
fn load_pipeline() -> anyhow::Result<Pipeline> {
    let config_path = Path::new(CONFIG_FILE);
    let config = if config_path.exists() {
        PipelineConfig::load(config_path).context("reading stellar.toml")?
    } else {
        PipelineConfig::default()
    };
    Pipeline::from_config(&config).context("loading model artifacts")
}

struct UiApp {
    pipeline: Arc<Pipeline>,
    input: FeatureVector,
    last_input: Option<FeatureVector>,
    picker: UniformPicker,
    outcome: Option<QueryOutcome>,
    texture: Option<egui::TextureHandle>,
    history: Vec<ClassifiedObservation>,
    status: String,
}

impl UiApp {
    fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            // Slider defaults of the original deployment.
            input: FeatureVector {
                alpha: 150.0,
                delta: 150.0,
                u: 22.0,
                g: 22.0,
                r: 25.0,
                i: 10.0,
                z: 5.0,
                redshift: 2.0,
            },
            last_input: None,
            picker: UniformPicker::new(),
            outcome: None,
            texture: None,
            history: Vec::new(),
            status: String::new(),
        }
    }

    fn classify(&mut self, ctx: &egui::Context) {
        match self.pipeline.run(&self.input, &mut self.picker) {
            Ok(outcome) => {
                let illustration = &outcome.illustration;
                let size = [
                    illustration.width() as usize,
                    illustration.height() as usize,
                ];
                let color = egui::ColorImage::from_rgb(size, illustration.pixels.as_raw());
                let name = format!("illustration:{}", illustration.path.display());
                self.texture = Some(ctx.load_texture(name, color, egui::TextureOptions::LINEAR));
                self.history.push(ClassifiedObservation {
                    input: self.input,
                    class: outcome.prediction.class,
                    confidence: outcome.prediction.confidence,
                });
                self.outcome = Some(outcome);
                self.status.clear();
            }
            Err(e) => {
                tracing::warn!("classification failed: {e}");
                self.outcome = None;
                self.texture = None;
                self.status = format!("Classification failed: {e}");
            }
        }
    }

    fn render_sliders(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.add(egui::Slider::new(&mut self.input.alpha, 0.0..=360.0).text("Ascension angle"));
        ui.add(egui::Slider::new(&mut self.input.delta, 0.0..=360.0).text("Declination angle"));
        ui.add(egui::Slider::new(&mut self.input.u, 0.0..=30.0).text("Ultraviolet"));
        ui.add(egui::Slider::new(&mut self.input.g, 0.0..=30.0).text("Green"));
        ui.add(egui::Slider::new(&mut self.input.r, 0.0..=30.0).text("Red"));
        ui.add(egui::Slider::new(&mut self.input.i, 0.0..=30.0).text("Infrared (I)"));
        ui.add(egui::Slider::new(&mut self.input.z, 0.0..=30.0).text("Infrared (Z)"));
        ui.add(egui::Slider::new(&mut self.input.redshift, 0.0..=10.0).text("Redshift"));
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Stellar Classification");
                let can_export = !self.history.is_empty();
                if ui
                    .add_enabled(can_export, egui::Button::new("Export CSV"))
                    .clicked()
                    && let Some(path) = FileDialog::new()
                        .add_filter("CSV", &["csv"])
                        .set_file_name("stellar_classification.csv")
                        .save_file()
                {
                    match export_csv(&self.history, &path) {
                        Ok(()) => self.status = format!("CSV exported: {}", path.display()),
                        Err(e) => self.status = format!("Export failed: {e}"),
                    }
                }
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        egui::SidePanel::left("observation").show(ctx, |ui| {
            self.render_sliders(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(outcome) = &self.outcome {
                ui.label(&outcome.prediction.sentence);
                ui.add_space(6.0);
                if let Some(texture) = &self.texture {
                    let size = egui::Vec2::new(
                        outcome.illustration.width() as f32,
                        outcome.illustration.height() as f32,
                    );
                    let (resp, painter) = ui.allocate_painter(size, egui::Sense::hover());
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(texture.id(), resp.rect, uv, egui::Color32::WHITE);
                }
                ui.add_space(6.0);
                ui.label(format!(
                    "A random {} image taken from nasa.gov image gallery.",
                    outcome.prediction.class.display_name().to_lowercase()
                ));
            }
        });

        if self.last_input != Some(self.input) {
            self.last_input = Some(self.input);
            self.classify(ctx);
        }
    }
}
