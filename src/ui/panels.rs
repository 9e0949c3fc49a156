use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, MessageLevel};

fn path_field_id() -> egui::Id {
    egui::Id::new("output_path_field")
}

// ---------------------------------------------------------------------------
// Top bar – directory selection
// ---------------------------------------------------------------------------

/// Render the output_path field, Browse / Load buttons and the last message.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("output_path:");
        let field = ui.add(
            egui::TextEdit::singleline(&mut state.output_path)
                .id(path_field_id())
                .desired_width(420.0)
                .hint_text("folder containing pcb/"),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("Browse…").clicked() {
            open_folder_dialog(state);
        }
        if ui.button("Load").clicked() || submitted {
            state.load();
        }
    });

    if let Some(msg) = &state.message {
        let color = match msg.level {
            MessageLevel::Info => ui.visuals().weak_text_color(),
            MessageLevel::Warning => Color32::from_rgb(230, 160, 30),
            MessageLevel::Error => Color32::RED,
        };
        ui.label(RichText::new(&msg.text).color(color));
    }
}

// ---------------------------------------------------------------------------
// Bottom bar – decisions and progress
// ---------------------------------------------------------------------------

/// Render Reject / Keep (and Retry after a failed renumber) plus progress.
pub fn bottom_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let enabled = state.can_decide();
        if ui
            .add_enabled(enabled, egui::Button::new("Reject (←)"))
            .clicked()
        {
            state.reject();
        }
        if ui
            .add_enabled(enabled, egui::Button::new("Keep (→)"))
            .clicked()
        {
            state.keep();
        }
        if state.can_retry_renumber() && ui.button("Retry renumber").clicked() {
            state.retry_renumber();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.label(&state.status);
        });
    });
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// → keep, ← reject, Esc quit. Ignored while the path field is being edited.
pub fn handle_shortcuts(ctx: &egui::Context, state: &mut AppState) {
    if ctx.memory(|m| m.has_focus(path_field_id())) {
        return;
    }
    let (keep, reject, quit) = ctx.input(|i| {
        (
            i.key_pressed(egui::Key::ArrowRight),
            i.key_pressed(egui::Key::ArrowLeft),
            i.key_pressed(egui::Key::Escape),
        )
    });
    if keep {
        state.keep();
    } else if reject {
        state.reject();
    }
    if quit {
        log::info!("Review aborted; undecided records left as they are");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Select output_path")
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Selected output_path {}", path.display());
        state.output_path = path.display().to_string();
    }
}
