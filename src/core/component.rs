//! Declarative component model.
//!
//! A form is described by a flat list of [`ComponentSpec`]s — one per UI
//! element — plus a layout tree that places them.  The spec is pure data
//! deserialized from the form config; building it produces a [`Widget`],
//! the mutable value-holding handle the rest of the app works with.
//!
//! Design notes:
//! - `id` doubles as the element identifier exposed to external styling;
//!   there is no separate position or order field — placement comes from
//!   the layout tree alone.
//! - `data_field` names the backing record attribute and defaults to `id`.
//!   The component layer passes it through without interpreting it; the
//!   data layer resolves it.

use serde::Deserialize;

// ───────────────────────────────────────── kinds ─────────────

/// Closed set of component kinds the factory can build.
///
/// The string tags are the external configuration vocabulary; adding a
/// kind means adding a case here and a construction arm in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Image,
    Textbox,
    Search,
    Html,
    Button,
    Slider,
    Checkbox,
}

impl ComponentKind {
    /// Ordered list of all kinds; tag lookup scans it.
    pub const ALL: &[ComponentKind] = &[
        ComponentKind::Image,
        ComponentKind::Textbox,
        ComponentKind::Search,
        ComponentKind::Html,
        ComponentKind::Button,
        ComponentKind::Slider,
        ComponentKind::Checkbox,
    ];

    /// Configuration tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Image => "image",
            ComponentKind::Textbox => "textbox",
            ComponentKind::Search => "search",
            ComponentKind::Html => "html",
            ComponentKind::Button => "button",
            ComponentKind::Slider => "slider",
            ComponentKind::Checkbox => "checkbox",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

// ───────────────────────────────────────── spec value ────────

/// Initial `value` attribute — its type depends on the component kind
/// (markup for `html`, a number for `slider`, a flag for `checkbox`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SpecValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SpecValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SpecValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpecValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── descriptor ────────

/// One declaratively configured UI element.
///
/// `type` stays a raw string until build time so an unknown tag can be
/// reported together with the id that carries it, rather than as an
/// anonymous deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub label: String,

    /// Backing record attribute; `None` means "same as id" (resolved by
    /// the `data_field()` accessor).
    pub data_field: Option<String>,

    // ── textbox / search ───────────────────────────────────────
    pub placeholder: Option<String>,
    pub lines: Option<u16>,
    pub interactive: Option<bool>,
    #[serde(default)]
    pub has_checkbox: bool,
    pub checkbox_label: Option<String>,
    pub searchable: Option<bool>,
    pub search_field: Option<String>,

    // ── button ─────────────────────────────────────────────────
    pub variant: Option<String>,

    // ── slider ─────────────────────────────────────────────────
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub step: Option<f64>,

    /// Initial value (html markup, slider position, checkbox state).
    pub value: Option<SpecValue>,

    /// Relative width inside an `hstack` (and legacy column sizing).
    pub flex: Option<u16>,
}

impl ComponentSpec {
    /// Backing data attribute for this component (defaults to the id).
    pub fn data_field(&self) -> &str {
        self.data_field.as_deref().unwrap_or(&self.id)
    }

    /// Text-entry height in lines (textbox/search only).
    pub fn lines(&self) -> u16 {
        self.lines.unwrap_or(1).max(1)
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or("")
    }

    /// Whether the user can edit this component.
    ///
    /// Images are display-only unless opted in; a `search` box follows its
    /// `searchable` attribute; everything else is interactive by default.
    pub fn interactive(&self) -> bool {
        if let Some(explicit) = self.interactive {
            return explicit;
        }
        match ComponentKind::from_tag(&self.type_tag) {
            Some(ComponentKind::Image) | Some(ComponentKind::Html) => false,
            Some(ComponentKind::Search) => self.searchable.unwrap_or(true),
            _ => true,
        }
    }

    /// Marker shown next to a flagged textbox label.
    pub fn checkbox_label(&self) -> &str {
        self.checkbox_label.as_deref().unwrap_or("✗")
    }

    pub fn variant(&self) -> &str {
        self.variant.as_deref().unwrap_or("primary")
    }

    pub fn minimum(&self) -> f64 {
        self.minimum.unwrap_or(0.0)
    }

    pub fn maximum(&self) -> f64 {
        self.maximum.unwrap_or(1.0)
    }

    pub fn step(&self) -> f64 {
        self.step.unwrap_or(0.01)
    }

    pub fn flex(&self) -> u16 {
        self.flex.unwrap_or(1).max(1)
    }
}

// ───────────────────────────────────────── widget handle ─────

/// Mutable value state of one built component.
///
/// Construction happens exactly once per id during the build pass; after
/// that only the *values* here change (through the editing loop) — never
/// the kind or the id set.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Display-only media slot.  Terminals can't decode a GIF, so the
    /// widget holds the file path and renders a framed placeholder.
    Image { path: Option<String> },
    /// Free-text entry.  `flag` is the per-field error checkbox: present
    /// when the spec sets `has_checkbox`.
    Textbox { text: String, flag: Option<bool> },
    /// Textbox variant that jumps to a record on submit.
    Search { query: String },
    /// Raw markup pass-through (rendered as plain text).
    Html { markup: String },
    Button,
    Slider { value: f64 },
    Checkbox { checked: bool },
}

impl Widget {
    /// Current value as a display string (what gets collected back into
    /// the record under `data_field`).
    pub fn value_text(&self) -> String {
        match self {
            Widget::Image { path } => path.clone().unwrap_or_default(),
            Widget::Textbox { text, .. } => text.clone(),
            Widget::Search { query } => query.clone(),
            Widget::Html { markup } => markup.clone(),
            Widget::Button => String::new(),
            Widget::Slider { value } => format!("{value}"),
            Widget::Checkbox { checked } => checked.to_string(),
        }
    }

    /// Overwrite the value from a record attribute rendered as text.
    /// Buttons have no value; sliders parse leniently and keep their
    /// current position on garbage input.
    pub fn set_text(&mut self, new: &str) {
        match self {
            Widget::Image { path } => {
                *path = if new.is_empty() { None } else { Some(new.to_string()) };
            }
            Widget::Textbox { text, .. } => *text = new.to_string(),
            Widget::Search { query } => *query = new.to_string(),
            Widget::Html { markup } => *markup = new.to_string(),
            Widget::Button => {}
            Widget::Slider { value } => {
                if let Ok(v) = new.parse::<f64>() {
                    if v.is_finite() {
                        *value = v;
                    }
                }
            }
            Widget::Checkbox { checked } => {
                *checked = matches!(new, "true" | "1" | "yes");
            }
        }
    }

    /// The error-flag checkbox attached to a textbox, if any.
    pub fn flag(&self) -> Option<bool> {
        match self {
            Widget::Textbox { flag, .. } => *flag,
            _ => None,
        }
    }
}

// ───────────────────────────────────────── tests ─────────────
