use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points, Polygon};

use crate::color::WavePalette;
use crate::data::model::SIGNAL_COLUMN;
use crate::state::{AppState, RecordView, View};
use crate::store::naming::QUARANTINE_SUBDIR;

// ---------------------------------------------------------------------------
// Record plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current view in the central panel.
pub fn record_plot(ui: &mut Ui, state: &AppState) {
    match &state.view {
        View::Empty => centered(ui, "Enter an output_path and press Load.", None),
        View::Error(msg) => centered(ui, msg, Some(Color32::RED)),
        View::Done { kept, rejected } => {
            let text = if *kept == 0 {
                format!("Review complete.\nNo files kept.\n{rejected} rejected, moved to pcb/{QUARANTINE_SUBDIR}/")
            } else {
                format!(
                    "Review complete.\nKept files renumbered: 1.csv .. {kept}.csv\n{rejected} rejected, moved to pcb/{QUARANTINE_SUBDIR}/"
                )
            };
            centered(ui, &text, None);
        }
        View::Record(view) => signal_plot(ui, view, &state.palette),
    }
}

fn centered(ui: &mut Ui, text: &str, color: Option<Color32>) {
    ui.centered_and_justified(|ui: &mut Ui| {
        let mut text = RichText::new(text).heading();
        if let Some(c) = color {
            text = text.color(c);
        }
        ui.label(text);
    });
}

/// Signal over sample index, shaded label intervals, peak markers.
fn signal_plot(ui: &mut Ui, view: &RecordView, palette: &WavePalette) {
    ui.vertical_centered(|ui: &mut Ui| ui.strong(view.title()));

    let (y_min, y_max) = finite_range(&view.signal);

    Plot::new("record_plot")
        .legend(egui_plot::Legend::default().position(egui_plot::Corner::RightTop))
        .x_axis_label("Sample index")
        .y_axis_label(SIGNAL_COLUMN)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Shade each run across the signal's value range. Polygons sharing
            // a name share one legend entry.
            for label in &view.labels.intervals {
                let fill = palette.fill_for(label.column);
                for iv in &label.intervals {
                    let (a, b) = (iv.start as f64 - 0.5, iv.end as f64 + 0.5);
                    let rect: PlotPoints =
                        vec![[a, y_min], [b, y_min], [b, y_max], [a, y_max]].into();
                    plot_ui.polygon(
                        Polygon::new(rect)
                            .name(label.column)
                            .fill_color(fill)
                            .stroke(Stroke::NONE),
                    );
                }
            }

            let points: PlotPoints = view
                .signal
                .iter()
                .enumerate()
                .map(|(i, &y)| [i as f64, y])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name(SIGNAL_COLUMN)
                    .color(Color32::LIGHT_GRAY)
                    .width(1.0),
            );

            for peak in &view.labels.peaks {
                let markers: PlotPoints = peak
                    .indices
                    .iter()
                    .filter_map(|&i| {
                        let y = *view.signal.get(i)?;
                        y.is_finite().then_some([i as f64, y])
                    })
                    .collect();
                plot_ui.points(
                    Points::new(markers)
                        .name(peak.column)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(3.5)
                        .color(palette.color_for(peak.column)),
                );
            }
        });
}

/// Min / max over the finite samples, padded; `(-1, 1)` when there are none.
fn finite_range(signal: &[f64]) -> (f64, f64) {
    let (min, max) = signal
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(f64::EPSILON.sqrt());
    (min - pad, max + pad)
}
