use std::path::PathBuf;

use crate::color::WavePalette;
use crate::data::intervals::{summarize, LabelSummary};
use crate::data::model::{Record, RecordId};
use crate::error::ReviewError;
use crate::session::{ReviewSession, SessionState, Step};
use crate::store::naming::QUARANTINE_SUBDIR;
use crate::store::DirStore;

// ---------------------------------------------------------------------------
// What the central panel shows
// ---------------------------------------------------------------------------

/// A loaded record reduced to what the plot draws.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    pub id: RecordId,
    pub signal: Vec<f64>,
    pub labels: LabelSummary,
}

impl RecordView {
    pub fn from_record(record: &Record) -> Self {
        RecordView {
            id: record.id,
            signal: record.signal.clone(),
            labels: summarize(record),
        }
    }

    pub fn title(&self) -> String {
        format!("{}.csv", self.id)
    }
}

/// Display state of the central panel.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// No session yet.
    Empty,
    Record(RecordView),
    /// Inert message in place of a plot.
    Error(String),
    Done { kept: usize, rejected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Message {
            level,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Contents of the output_path field.
    pub output_path: String,

    /// Active review (None until a directory is loaded).
    pub session: Option<ReviewSession<DirStore>>,

    pub view: View,

    /// Progress line in the bottom bar.
    pub status: String,

    /// Last error / warning shown in the top bar.
    pub message: Option<Message>,

    pub palette: WavePalette,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            session: None,
            view: View::Empty,
            status: "Select an output_path and press Load.".to_string(),
            message: None,
            palette: WavePalette::default(),
        }
    }
}

impl AppState {
    /// Start reviewing `<output_path>/pcb`.
    pub fn load(&mut self) {
        let output_path = self.output_path.trim();
        if output_path.is_empty() {
            self.message = Some(Message::new(
                MessageLevel::Error,
                "Please enter an output_path.",
            ));
            return;
        }
        let store = DirStore::for_output_path(&PathBuf::from(output_path));
        self.start(store);
    }

    /// Replace any running session with one over `store`.
    pub fn start(&mut self, store: DirStore) {
        match ReviewSession::start(store) {
            Ok(session) => {
                let text = format!(
                    "Loaded {} record(s) from {}",
                    session.working_set().len(),
                    session.store().dir().display()
                );
                log::info!("{text}");
                self.session = Some(session);
                self.message = Some(Message::new(MessageLevel::Info, text));
                self.refresh_view();
            }
            Err(e) => {
                // An empty directory is valid, just nothing to do.
                let level = match e {
                    ReviewError::NoCandidates(_) => MessageLevel::Warning,
                    _ => MessageLevel::Error,
                };
                match level {
                    MessageLevel::Warning => log::warn!("{e}"),
                    _ => log::error!("{e}"),
                }
                self.message = Some(Message::new(level, e.to_string()));
            }
        }
    }

    /// Whether keep/reject are currently meaningful.
    pub fn can_decide(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_finished())
    }

    /// Whether the last renumber failed and may be retried.
    pub fn can_retry_renumber(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.state() == SessionState::Finished { renumbered: None })
    }

    pub fn keep(&mut self) {
        self.decide(|session| session.keep());
    }

    pub fn reject(&mut self) {
        self.decide(|session| session.reject());
    }

    pub fn retry_renumber(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.retry_renumber() {
            Ok(_) => {
                self.message = None;
                self.refresh_view();
            }
            Err(e) => self.report(e),
        }
    }

    fn decide(
        &mut self,
        apply: impl FnOnce(&mut ReviewSession<DirStore>) -> crate::error::Result<Step>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.is_finished() {
            return;
        }
        match apply(session) {
            Ok(_) => {
                self.message = None;
                self.refresh_view();
            }
            Err(e) => {
                // A failed renumber still ends the review.
                self.report(e);
                if self.session.as_ref().is_some_and(|s| s.is_finished()) {
                    self.refresh_view();
                }
            }
        }
    }

    fn report(&mut self, e: ReviewError) {
        log::error!("{e}");
        self.message = Some(Message::new(MessageLevel::Error, e.to_string()));
    }

    /// Rebuild `view` and `status` from the session.
    pub fn refresh_view(&mut self) {
        let Some(session) = &self.session else {
            self.view = View::Empty;
            return;
        };

        match session.state() {
            SessionState::Reviewing => {
                let position = session.cursor() + 1;
                let total = session.working_set().len();
                match session.load_current() {
                    Some(Ok(record)) => {
                        let view = RecordView::from_record(&record);
                        self.status = format!("{position}/{total}  |  {}", view.title());
                        self.view = View::Record(view);
                    }
                    Some(Err(e)) => {
                        self.status = format!("{position}/{total}  (read error)");
                        self.view = View::Error(e.to_string());
                    }
                    None => self.view = View::Empty,
                }
            }
            SessionState::Finished {
                renumbered: Some(kept),
            } => {
                self.status = format!("Done. Kept={kept}, Rejected in {QUARANTINE_SUBDIR}/.");
                self.view = View::Done {
                    kept,
                    rejected: session.rejected(),
                };
            }
            SessionState::Finished { renumbered: None } => {
                self.status = "Renumbering failed".to_string();
                self.view = View::Error(
                    self.message
                        .as_ref()
                        .map(|m| m.text.clone())
                        .unwrap_or_else(|| "Renumbering failed".to_string()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::data::model::LabelColumn;

    const HEADER: &str = "V5,P-wave,P-peak,QRS-complex,R-peak,T-wave,T-peak";

    fn output_dir(records: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let pcb = dir.path().join("pcb");
        fs::create_dir(&pcb).unwrap();
        for (name, body) in records {
            fs::write(pcb.join(name), body).unwrap();
        }
        dir
    }

    fn loaded(dir: &tempfile::TempDir) -> AppState {
        let mut state = AppState::default();
        state.output_path = dir.path().display().to_string();
        state.load();
        state
    }

    #[test]
    fn test_empty_path_is_error() {
        let mut state = AppState::default();
        state.load();
        assert_eq!(state.message.unwrap().level, MessageLevel::Error);
    }

    #[test]
    fn test_missing_pcb_is_error_and_empty_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let state = loaded(&dir);
        assert_eq!(state.message.as_ref().unwrap().level, MessageLevel::Error);
        assert!(state.session.is_none());

        let dir = output_dir(&[("notes.txt", "")]);
        let state = loaded(&dir);
        assert_eq!(state.message.as_ref().unwrap().level, MessageLevel::Warning);
        assert!(state.session.is_none());
    }

    #[test]
    fn test_record_view_has_intervals() {
        let body = format!("{HEADER}\n0.1,1,0,0,0,0,0\n0.2,1,1,0,0,0,0\n0.3,0,0,1,1,0,0\n");
        let dir = output_dir(&[("4.csv", body.as_str())]);
        let state = loaded(&dir);

        let View::Record(view) = &state.view else {
            panic!("expected record view, got {:?}", state.view);
        };
        assert_eq!(view.title(), "4.csv");
        assert_eq!(view.signal.len(), 3);
        let p_wave = &view.labels.intervals[0];
        assert_eq!(p_wave.column, LabelColumn::PWave);
        assert_eq!(p_wave.intervals.len(), 1);
        assert_eq!(state.status, "1/1  |  4.csv");
    }

    #[test]
    fn test_review_to_completion() {
        let good = format!("{HEADER}\n0.1,0,0,0,0,0,0\n");
        let dir = output_dir(&[
            ("3.csv", good.as_str()),
            ("8.csv", "broken"),
            ("11.csv", good.as_str()),
        ]);
        let mut state = loaded(&dir);

        state.keep();
        assert!(matches!(state.view, View::Error(_)));
        assert_eq!(state.status, "2/3  (read error)");

        state.reject();
        state.keep();
        assert_eq!(state.view, View::Done { kept: 2, rejected: 1 });
        assert!(!state.can_decide());

        let pcb = dir.path().join("pcb");
        assert!(pcb.join("1.csv").exists());
        assert!(pcb.join("2.csv").exists());
        assert!(!pcb.join("11.csv").exists());
        assert!(pcb.join("_rejected").join("8.csv").exists());
    }
}
