//! Record store — JSONL-backed annotation data.
//!
//! One config maps to one JSONL input file (one JSON object per line) and
//! one output file that annotations are appended to.  The store owns the
//! record cursor and the annotated-key set; mapping values onto widgets
//! goes through each component's `data_field` — the component layer never
//! interprets that attribute, this module does.
//!
//! Data fields starting with `_computed_` are synthesized here (currently
//! only the annotation-status text) and never read from records.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use super::component::Widget;
use super::registry::ComponentRegistry;

/// One input record / one collected annotation.
pub type Record = Map<String, Value>;

/// Prefix for data fields the data layer computes instead of reading.
pub const COMPUTED_PREFIX: &str = "_computed_";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read records {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid JSON record: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write annotation to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize annotation record: {0}")]
    Serialize(#[source] serde_json::Error),
}

// ───────────────────────────────────────── record store ──────

/// All records for one task, plus navigation state.
pub struct RecordStore {
    records: Vec<Record>,
    /// Record attribute used as the stable key (e.g. `model_id`).
    key_field: String,
    /// Keys that already have a saved annotation.
    annotated: HashSet<String>,
    cursor: usize,
}

impl RecordStore {
    /// Load all records from a JSONL file.  Blank lines are skipped; a
    /// malformed line is a hard error naming the line number.
    pub fn load(path: &Path, key_field: &str) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| DataError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).map_err(|source| DataError::Json {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            records.push(record);
        }

        tracing::debug!("loaded {} records from {}", records.len(), path.display());
        Ok(Self {
            records,
            key_field: key_field.to_string(),
            annotated: HashSet::new(),
            cursor: 0,
        })
    }

    /// Seed the annotated-key set from a previous output file.  A missing
    /// file just means nothing is annotated yet.
    pub fn load_annotated(&mut self, output: &Path) -> Result<(), DataError> {
        let file = match File::open(output) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(DataError::Read {
                    path: output.to_path_buf(),
                    source,
                })
            }
        };
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| DataError::Read {
                path: output.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).map_err(|source| DataError::Json {
                    path: output.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            if let Some(key) = record.get(&self.key_field).and_then(Value::as_str) {
                self.annotated.insert(key.to_string());
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Record attribute used as the stable key.
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn current(&self) -> Option<&Record> {
        self.records.get(self.cursor)
    }

    /// Key of the current record, if it has one.
    pub fn current_key(&self) -> Option<&str> {
        self.current()?.get(&self.key_field).and_then(Value::as_str)
    }

    /// Move to the next record, wrapping at the end.
    pub fn advance(&mut self) {
        if !self.records.is_empty() {
            self.cursor = (self.cursor + 1) % self.records.len();
        }
    }

    /// Move to the previous record, wrapping at the start.
    pub fn retreat(&mut self) {
        if !self.records.is_empty() {
            self.cursor = (self.cursor + self.records.len() - 1) % self.records.len();
        }
    }

    /// Jump to the record whose key equals `key`.  Returns false when no
    /// record matches.
    pub fn jump_to(&mut self, key: &str) -> bool {
        let found = self.records.iter().position(|r| {
            r.get(&self.key_field).and_then(Value::as_str) == Some(key)
        });
        match found {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    pub fn is_annotated(&self, key: &str) -> bool {
        self.annotated.contains(key)
    }

    pub fn mark_annotated(&mut self, key: &str) {
        self.annotated.insert(key.to_string());
    }

    /// Progress line for the UI, e.g. `"3 / 120 (2 annotated)"`.
    pub fn progress(&self) -> String {
        if self.records.is_empty() {
            return "0 / 0".to_string();
        }
        format!(
            "{} / {} ({} annotated)",
            self.cursor + 1,
            self.records.len(),
            self.annotated.len()
        )
    }
}

// ───────────────────────────────────────── widget mapping ────

/// Render a record attribute as widget text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // Arrays of strings flatten to a comma-joined line.
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Annotation-status text for the `_computed_status` data field.
pub fn annotation_status(annotated: bool) -> &'static str {
    if annotated {
        "✔ annotated"
    } else {
        "✗ not annotated"
    }
}

/// Map a record's attributes onto the built widgets through `data_field`.
///
/// Missing attributes clear the widget; `_computed_` fields are filled
/// from store state, not from the record.
pub fn apply_record(record: &Record, annotated: bool, registry: &mut ComponentRegistry) {
    let ids: Vec<String> = registry.ids().map(str::to_string).collect();
    for id in ids {
        let Some(built) = registry.get_mut(&id) else {
            continue;
        };
        let field = built.spec.data_field().to_string();
        if let Some(computed) = field.strip_prefix(COMPUTED_PREFIX) {
            if computed == "status" {
                built.widget.set_text(annotation_status(annotated));
            }
            continue;
        }
        let text = record.get(&field).map(value_text).unwrap_or_default();
        built.widget.set_text(&text);
    }
}

/// Collect editable widget values back into a record, keyed by each
/// component's `data_field`.  Buttons and computed fields are skipped;
/// flagged textboxes also emit `<field>_flagged` when their error
/// checkbox is set.
pub fn collect_values(registry: &ComponentRegistry) -> Record {
    let mut out = Record::new();
    for (_, built) in registry.iter() {
        let field = built.spec.data_field();
        if field.starts_with(COMPUTED_PREFIX) {
            continue;
        }
        match &built.widget {
            Widget::Button => {}
            widget => {
                if built.spec.interactive() {
                    out.insert(field.to_string(), Value::String(widget.value_text()));
                }
                if let Some(true) = widget.flag() {
                    out.insert(format!("{field}_flagged"), Value::Bool(true));
                }
            }
        }
    }
    out
}

/// Append one annotation record to the output JSONL file, creating parent
/// directories on first write.
pub fn save_annotation(path: &Path, record: &Record) -> Result<(), DataError> {
    let write_err = |source| DataError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    let line = serde_json::to_string(record).map_err(DataError::Serialize)?;
    writeln!(file, "{line}").map_err(write_err)?;
    Ok(())
}

// ───────────────────────────────────────── tests ─────────────
