use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SegmentReviewerApp {
    pub state: AppState,
}

impl SegmentReviewerApp {
    /// Start the window, loading `output_path` right away if given.
    pub fn new(output_path: Option<PathBuf>) -> Self {
        let mut app = Self::default();
        if let Some(path) = output_path {
            app.state.output_path = path.display().to_string();
            app.state.load();
        }
        app
    }
}

impl eframe::App for SegmentReviewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_shortcuts(ctx, &mut self.state);

        // ---- Top panel: directory selection ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: decisions ----
        egui::TopBottomPanel::bottom("decision_bar").show(ctx, |ui| {
            panels::bottom_bar(ui, &mut self.state);
        });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::record_plot(ui, &self.state);
        });
    }
}
