mod app;
mod color;
mod data;
mod error;
mod session;
mod state;
mod store;
mod ui;

use std::path::PathBuf;

use app::SegmentReviewerApp;
use clap::Parser;
use eframe::egui;

/// Keep/reject reviewer for numbered ECG segment CSVs in <OUTPUT_PATH>/pcb.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Folder containing the pcb/ directory; can also be chosen in the window.
    output_path: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 640.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ECG Segment Reviewer",
        options,
        Box::new(move |_cc| Ok(Box::new(SegmentReviewerApp::new(args.output_path)))),
    )
}
