//! Configuration — form definitions and user keybindings.
//!
//! Two separate concerns live here:
//!
//! 1. **Form configs**: one TOML file per annotation task, parsed once at
//!    startup.  A file either carries the two-part schema
//!    (`[[components]]` + `[layout]`) or the legacy flat `[[fields]]`
//!    list; [`FormConfig::strategy`] picks the build path.
//! 2. **User config**: keybindings, stored as a simple key-value text
//!    file at `$XDG_CONFIG_HOME/anno-form/config.toml` (default
//!    `~/.config/anno-form/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::core::component::ComponentSpec;
use crate::core::error::{BuildError, ConfigError};
use crate::core::layout::{self, BuiltForm, LayoutEntry, LayoutNode};

// ───────────────────────────────────────── form config ───────

/// Task identity shown in the UI chrome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Where records come from and where annotations go.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub records: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Record attribute used as the stable key.
    pub key_field: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records: None,
            output: None,
            key_field: "model_id".to_string(),
        }
    }
}

/// One entry of the legacy flat field list (`FIELD_CONFIG` in the old
/// tool).  Placement lives on the field itself (`order`, `column`)
/// instead of in a layout tree.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "legacy_field_type")]
    pub type_tag: String,
    pub lines: Option<u16>,
    #[serde(default)]
    pub has_checkbox: bool,
    pub checkbox_label: Option<String>,
    pub placeholder: Option<String>,
    pub interactive: Option<bool>,
    pub flex: Option<u16>,
    /// Explicit ordering; fields without one keep their list position.
    pub order: Option<u32>,
    /// `"left"` or `"right"`; any column present switches the converted
    /// layout to a two-column split.
    pub column: Option<String>,
}

fn legacy_field_type() -> String {
    "textbox".to_string()
}

/// Which build path a loaded form config takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Two-part schema: components + layout tree.
    Declarative,
    /// Legacy flat field list with per-field placement attributes.
    LegacyFields,
}

/// A parsed form configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub task: TaskInfo,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    pub layout: Option<LayoutNode>,
    #[serde(default)]
    pub fields: Vec<LegacyField>,
}

impl FormConfig {
    /// Parse a form config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// One-shot format detection: the new schema wins when both parts are
    /// present; a config with neither is an error.
    pub fn strategy(&self) -> Result<BuildStrategy, ConfigError> {
        if !self.components.is_empty() && self.layout.is_some() {
            Ok(BuildStrategy::Declarative)
        } else if !self.components.is_empty() {
            Err(ConfigError::MissingLayout)
        } else if !self.fields.is_empty() {
            Ok(BuildStrategy::LegacyFields)
        } else {
            Err(ConfigError::EmptyForm)
        }
    }

    /// Build the form, dispatching on the detected strategy.
    pub fn build(&self) -> Result<BuiltForm, BuildError> {
        match self.strategy()? {
            BuildStrategy::Declarative => {
                let layout = self.layout.as_ref().ok_or(ConfigError::MissingLayout)?;
                layout::build_layout(&self.components, layout)
            }
            BuildStrategy::LegacyFields => {
                tracing::debug!("legacy field list detected, converting");
                let (components, tree) = convert_legacy(&self.fields);
                layout::build_layout(&components, &tree)
            }
        }
    }
}

/// Convert a legacy field list into an equivalent components + layout
/// pair.  Fields sort by their own `order` attribute (list position when
/// absent); any `column` attribute turns the layout into a two-column
/// split, left fields flat, right fields in a vstack.
fn convert_legacy(fields: &[LegacyField]) -> (Vec<ComponentSpec>, LayoutNode) {
    let mut ordered: Vec<(u32, usize, &LegacyField)> = fields
        .iter()
        .enumerate()
        .map(|(idx, f)| (f.order.unwrap_or(idx as u32), idx, f))
        .collect();
    ordered.sort_by_key(|&(order, idx, _)| (order, idx));

    let components: Vec<ComponentSpec> = ordered
        .iter()
        .map(|&(_, _, f)| ComponentSpec {
            id: f.key.clone(),
            type_tag: f.type_tag.clone(),
            label: f.label.clone(),
            lines: f.lines,
            has_checkbox: f.has_checkbox,
            checkbox_label: f.checkbox_label.clone(),
            placeholder: f.placeholder.clone(),
            interactive: f.interactive,
            flex: f.flex,
            ..Default::default()
        })
        .collect();

    let two_column = ordered.iter().any(|&(_, _, f)| f.column.is_some());
    let tree = if two_column {
        let left: Vec<String> = ordered
            .iter()
            .filter(|&&(_, _, f)| f.column.as_deref() == Some("left"))
            .map(|&(_, _, f)| f.key.clone())
            .collect();
        let right: Vec<LayoutEntry> = ordered
            .iter()
            .filter(|&&(_, _, f)| f.column.as_deref() != Some("left"))
            .map(|&(_, _, f)| LayoutEntry::Component(f.key.clone()))
            .collect();
        LayoutNode::TwoColumn {
            elem_id: None,
            left,
            left_scale: None,
            right: Box::new(LayoutEntry::Container(Box::new(LayoutNode::Vstack {
                elem_id: None,
                children: right,
            }))),
            right_scale: None,
        }
    } else {
        LayoutNode::Vstack {
            elem_id: None,
            children: ordered
                .iter()
                .map(|&(_, _, f)| LayoutEntry::Component(f.key.clone()))
                .collect(),
        }
    };

    (components, tree)
}

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the annotation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FocusNext,
    FocusPrev,
    PrevRecord,
    NextRecord,
    SaveRecord,
    ToggleFlag,
    ToggleHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help overlay).
    pub const ALL: &[Action] = &[
        Action::FocusNext,
        Action::FocusPrev,
        Action::PrevRecord,
        Action::NextRecord,
        Action::SaveRecord,
        Action::ToggleFlag,
        Action::ToggleHelp,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::FocusNext => "Next Field",
            Action::FocusPrev => "Prev Field",
            Action::PrevRecord => "Prev Record",
            Action::NextRecord => "Next Record",
            Action::SaveRecord => "Save Annotation",
            Action::ToggleFlag => "Toggle Error Flag",
            Action::ToggleHelp => "Help",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::FocusNext => "focus_next",
            Action::FocusPrev => "focus_prev",
            Action::PrevRecord => "prev_record",
            Action::NextRecord => "next_record",
            Action::SaveRecord => "save_record",
            Action::ToggleFlag => "toggle_flag",
            Action::ToggleHelp => "toggle_help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT are
    /// compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Display / config-file string (e.g. `"Ctrl+s"`, `"PageUp"`, `"F1"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::BackTab => "BackTab".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+s"`, `"PageUp"`, `"F1"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            s if s.chars().count() == 1 => KeyCode::Char(s.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── user config ───────

/// User configuration — keybindings.
///
/// Every default binding carries a modifier or a special key: plain
/// printable characters must stay free for text entry into the focused
/// field.
pub struct UserConfig {
    pub bindings: HashMap<Action, KeyBind>,
}

impl UserConfig {
    pub fn default_bindings() -> HashMap<Action, KeyBind> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let shift = KeyModifiers::SHIFT;
        let mut m = HashMap::new();

        m.insert(FocusNext, KeyBind::new(Tab, n));
        // Terminals report Shift+Tab as its own key code.
        m.insert(FocusPrev, KeyBind::new(BackTab, shift));
        m.insert(PrevRecord, KeyBind::new(PageUp, n));
        m.insert(NextRecord, KeyBind::new(PageDown, n));
        m.insert(SaveRecord, KeyBind::new(Char('s'), ctrl));
        m.insert(ToggleFlag, KeyBind::new(Char('f'), ctrl));
        m.insert(ToggleHelp, KeyBind::new(F(1), n));
        m.insert(Quit, KeyBind::new(Esc, n));

        m
    }

    /// Find the action bound to a key event.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(_, bind)| bind.matches(event))
            .map(|(&action, _)| action)
    }

    /// Display the binding for an action (for the help overlay).
    pub fn display_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(bind) => bind.display(),
            None => "unbound".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: next field | {}/{}: records | {}: save | {}: help",
            self.display_binding(Action::FocusNext),
            self.display_binding(Action::PrevRecord),
            self.display_binding(Action::NextRecord),
            self.display_binding(Action::SaveRecord),
            self.display_binding(Action::ToggleHelp),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                return Self {
                    bindings: Self::parse_config(&contents),
                };
            }
        }
        let config = Self {
            bindings: Self::default_bindings(),
        };
        // First run: write the defaults so there is a file to edit.
        if let Err(e) = config.save() {
            tracing::debug!("could not write default config: {e}");
        }
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> HashMap<Action, KeyBind> {
        let mut bindings = Self::default_bindings();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let Some(action) = Action::from_config_key(key.trim()) else {
                continue;
            };
            if let Some(bind) = KeyBind::parse(value.trim().trim_matches('"')) {
                bindings.insert(action, bind);
            }
        }

        bindings
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# anno-form configuration".to_string(),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Tab, BackTab, Enter, Esc, PageUp, PageDown,".to_string(),
            "#   Up, Down, Left, Right, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(bind) = self.bindings.get(&action) {
                lines.push(format!("{} = {}", action.config_key(), bind.display()));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/anno-form/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("anno-form").join("config.toml")
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::RenderedNode;

    #[test]
    fn declarative_config_parses_and_builds() {
        let toml = r#"
            [task]
            id = "whole_annotation"
            name = "Whole-object annotation"

            [data]
            key_field = "model_id"

            [[components]]
            id = "image_url"
            type = "image"
            label = "GIF preview"

            [[components]]
            id = "category"
            type = "textbox"
            label = "Category"
            lines = 1
            has_checkbox = true

            [[components]]
            id = "save_btn"
            type = "button"
            label = "Save"
            variant = "primary"

            [layout]
            type = "two_column"
            left = ["image_url"]
            left_scale = 1
            right_scale = 2

            [layout.right]
            type = "vstack"
            elem_id = "info_column"
            children = ["category", "save_btn"]
        "#;

        let config: FormConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.strategy().unwrap(), BuildStrategy::Declarative);
        assert_eq!(config.task.id, "whole_annotation");
        assert_eq!(config.data.key_field, "model_id");

        let form = config.build().unwrap();
        assert_eq!(form.registry.len(), 3);
        assert_eq!(
            form.tree.document_order(),
            ["image_url", "category", "save_btn"]
        );
    }

    #[test]
    fn nested_containers_parse_inside_children() {
        let toml = r#"
            [[components]]
            id = "a"
            type = "textbox"

            [[components]]
            id = "b"
            type = "textbox"

            [layout]
            type = "tree"
            children = [
                "a",
                { type = "hstack", elem_id = "row", children = ["b"] },
            ]
        "#;

        let config: FormConfig = toml::from_str(toml).unwrap();
        let form = config.build().unwrap();
        assert_eq!(form.tree.document_order(), ["a", "b"]);

        let RenderedNode::Stack { children, .. } = &form.tree else {
            panic!("expected stack root");
        };
        assert!(matches!(
            &children[1],
            RenderedNode::Stack { elem_id: Some(id), .. } if id == "row"
        ));
    }

    #[test]
    fn legacy_fields_select_the_legacy_strategy() {
        let toml = r#"
            [[fields]]
            key = "category"
            label = "Category"
            lines = 1

            [[fields]]
            key = "description"
            label = "Description"
            lines = 3
        "#;

        let config: FormConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.strategy().unwrap(), BuildStrategy::LegacyFields);

        let form = config.build().unwrap();
        assert_eq!(form.tree.document_order(), ["category", "description"]);
        // Legacy fields default to textboxes.
        assert_eq!(
            form.registry.get("category").unwrap().spec.type_tag,
            "textbox"
        );
    }

    #[test]
    fn legacy_order_attribute_overrides_list_position() {
        let toml = r#"
            [[fields]]
            key = "second"
            order = 2

            [[fields]]
            key = "first"
            order = 1
        "#;

        let config: FormConfig = toml::from_str(toml).unwrap();
        let form = config.build().unwrap();
        assert_eq!(form.tree.document_order(), ["first", "second"]);
    }

    #[test]
    fn legacy_columns_convert_to_two_column_layout() {
        let toml = r#"
            [[fields]]
            key = "gif"
            type = "image"
            column = "left"

            [[fields]]
            key = "category"
            column = "right"

            [[fields]]
            key = "material"
            column = "right"
        "#;

        let config: FormConfig = toml::from_str(toml).unwrap();
        let form = config.build().unwrap();

        let RenderedNode::TwoColumn { left, right, .. } = &form.tree else {
            panic!("expected two_column");
        };
        assert_eq!(left, &[RenderedNode::Component("gif".into())]);
        assert_eq!(right.document_order(), ["category", "material"]);
    }

    #[test]
    fn empty_config_is_rejected() {
        let config: FormConfig = toml::from_str("").unwrap();
        assert!(matches!(config.strategy(), Err(ConfigError::EmptyForm)));

        let missing_layout: FormConfig = toml::from_str(
            r#"
            [[components]]
            id = "a"
            type = "textbox"
        "#,
        )
        .unwrap();
        assert!(matches!(
            missing_layout.strategy(),
            Err(ConfigError::MissingLayout)
        ));
    }

    #[test]
    fn keybind_parse_round_trips_display() {
        for raw in ["Ctrl+s", "PageUp", "F1", "Shift+BackTab", "Esc", "Space"] {
            let bind = KeyBind::parse(raw).unwrap();
            assert_eq!(bind.display(), raw, "round trip failed for {raw}");
        }
        assert!(KeyBind::parse("Hyper+x").is_none());
    }

    #[test]
    fn user_config_parses_overrides_and_keeps_defaults() {
        let bindings = UserConfig::parse_config(
            "# comment\nsave_record = Ctrl+w\nnot_an_action = F5\n",
        );
        assert_eq!(
            bindings.get(&Action::SaveRecord),
            Some(&KeyBind::new(KeyCode::Char('w'), KeyModifiers::CONTROL))
        );
        // Untouched actions keep their defaults.
        assert_eq!(
            bindings.get(&Action::Quit),
            Some(&KeyBind::new(KeyCode::Esc, KeyModifiers::NONE))
        );
    }
}
