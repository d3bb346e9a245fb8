//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event
//! handling).  The built form is owned here — one instance per task
//! process, never shared.

use std::path::PathBuf;

use serde_json::Value;

use crate::config::{TaskInfo, UserConfig};
use crate::core::data::{self, RecordStore};
use crate::core::layout::BuiltForm;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Form,
    Help,
}

/// Top-level application state.
pub struct AppState {
    /// The built form: registry + resolved layout tree.
    pub form: BuiltForm,
    /// Interactive component ids in document order.
    pub focus_ring: Vec<String>,
    /// Index into `focus_ring`.
    pub focused: usize,
    /// Task identity (title bar).
    pub task: TaskInfo,
    /// Records to annotate; `None` when launched without a data file.
    pub store: Option<RecordStore>,
    /// Where annotations are appended.
    pub output_path: Option<PathBuf>,
    /// Annotator identity written into saved records.
    pub user: String,
    /// User-configurable keybindings.
    pub config: UserConfig,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(form: BuiltForm, task: TaskInfo, config: UserConfig) -> Self {
        let focus_ring = form.focus_order();
        Self {
            form,
            focus_ring,
            focused: 0,
            task,
            store: None,
            output_path: None,
            user: "default_user".to_string(),
            config,
            active_view: ActiveView::default(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Id of the currently focused component.
    pub fn focused_id(&self) -> Option<&str> {
        self.focus_ring.get(self.focused).map(String::as_str)
    }

    pub fn focus_next(&mut self) {
        if !self.focus_ring.is_empty() {
            self.focused = (self.focused + 1) % self.focus_ring.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.focus_ring.is_empty() {
            self.focused =
                (self.focused + self.focus_ring.len() - 1) % self.focus_ring.len();
        }
    }

    /// Push the current record's values onto the form widgets.
    pub fn sync_record(&mut self) {
        let Some(store) = &self.store else { return };
        let annotated = store
            .current_key()
            .map(|k| store.is_annotated(k))
            .unwrap_or(false);
        if let Some(record) = store.current() {
            let record = record.clone();
            data::apply_record(&record, annotated, &mut self.form.registry);
        }
    }

    pub fn goto_next_record(&mut self) {
        if let Some(store) = &mut self.store {
            store.advance();
        }
        self.sync_record();
    }

    pub fn goto_prev_record(&mut self) {
        if let Some(store) = &mut self.store {
            store.retreat();
        }
        self.sync_record();
    }

    /// Jump to the record with the given key (search-box submit).
    pub fn jump_to_key(&mut self, key: &str) {
        let found = match &mut self.store {
            Some(store) => store.jump_to(key),
            None => false,
        };
        if found {
            self.sync_record();
            self.status_message = Some(format!("jumped to `{key}`"));
        } else {
            self.status_message = Some(format!("no record with key `{key}`"));
        }
    }

    /// Collect edited values and append them to the output file.
    pub fn save_current(&mut self) {
        let Some(output) = self.output_path.clone() else {
            self.status_message = Some("no output file configured".to_string());
            return;
        };
        let Some(key) = self
            .store
            .as_ref()
            .and_then(|s| s.current_key())
            .map(str::to_string)
        else {
            self.status_message = Some("no record to save".to_string());
            return;
        };

        let mut record = data::collect_values(&self.form.registry);
        let key_field = self
            .store
            .as_ref()
            .map(|s| s.key_field().to_string())
            .unwrap_or_default();
        record.insert(key_field, Value::String(key.clone()));
        if !self.task.id.is_empty() {
            record.insert("task".to_string(), Value::String(self.task.id.clone()));
        }
        record.insert("user".to_string(), Value::String(self.user.clone()));
        record.insert(
            "annotated_at".to_string(),
            Value::String(chrono::Local::now().to_rfc3339()),
        );

        match data::save_annotation(&output, &record) {
            Ok(()) => {
                if let Some(store) = &mut self.store {
                    store.mark_annotated(&key);
                }
                // Refresh computed fields (annotation status) on screen.
                self.sync_record();
                self.status_message = Some(format!("saved `{key}`"));
            }
            Err(e) => {
                tracing::debug!("save failed: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Header line: task name plus record progress.
    pub fn header_line(&self) -> String {
        let title = if self.task.name.is_empty() {
            self.task.id.clone()
        } else {
            self.task.name.clone()
        };
        match &self.store {
            Some(store) => format!(" {title} — {}", store.progress()),
            None => format!(" {title}"),
        }
    }
}
