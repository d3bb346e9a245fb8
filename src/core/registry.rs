//! Component builder and registry.
//!
//! The registry is an insertion-ordered `id → built component` map owned
//! by whoever builds the form (no process-wide singleton — each task
//! process owns an independent instance).  It is populated during the
//! single layout-resolution pass and is structurally read-only afterward:
//! widget values mutate, the id set never does.

use std::collections::HashMap;

use super::component::{ComponentKind, ComponentSpec, Widget};
use super::error::ConfigError;

/// A spec together with the widget it produced.
#[derive(Debug, Clone)]
pub struct BuiltComponent {
    pub spec: ComponentSpec,
    pub widget: Widget,
}

/// Insertion-ordered mapping from component id to its built widget.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Ids in build (= first-reference) order.
    order: Vec<String>,
    entries: HashMap<String, BuiltComponent>,
}

/// Single dispatch from type tag to widget construction.
///
/// Per-kind defaults live on [`ComponentSpec`]; this arm only decides the
/// initial value state.  An unknown tag reports the id that carries it.
fn build_widget(spec: &ComponentSpec) -> Result<Widget, ConfigError> {
    let kind = ComponentKind::from_tag(&spec.type_tag).ok_or_else(|| ConfigError::UnknownType {
        id: spec.id.clone(),
        ty: spec.type_tag.clone(),
    })?;

    Ok(match kind {
        ComponentKind::Image => Widget::Image { path: None },
        ComponentKind::Textbox => Widget::Textbox {
            text: String::new(),
            flag: spec.has_checkbox.then_some(false),
        },
        ComponentKind::Search => Widget::Search {
            query: String::new(),
        },
        ComponentKind::Html => Widget::Html {
            markup: spec
                .value
                .as_ref()
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        },
        ComponentKind::Button => Widget::Button,
        ComponentKind::Slider => Widget::Slider {
            value: spec
                .value
                .as_ref()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.5),
        },
        ComponentKind::Checkbox => Widget::Checkbox {
            checked: spec
                .value
                .as_ref()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        },
    })
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one component from its spec and record it under its id.
    ///
    /// Fails without touching the registry if the type tag is unknown or
    /// the id is empty / already built — an id is built at most once.
    pub fn create_component(&mut self, spec: &ComponentSpec) -> Result<&Widget, ConfigError> {
        if spec.id.is_empty() {
            return Err(ConfigError::EmptyId);
        }
        if self.entries.contains_key(&spec.id) {
            return Err(ConfigError::DuplicateId(spec.id.clone()));
        }

        let widget = build_widget(spec)?;
        tracing::debug!("built component `{}` ({})", spec.id, spec.type_tag);

        self.order.push(spec.id.clone());
        self.entries.insert(
            spec.id.clone(),
            BuiltComponent {
                spec: spec.clone(),
                widget,
            },
        );
        Ok(&self.entries[&spec.id].widget)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up a built component.
    pub fn get(&self, id: &str) -> Option<&BuiltComponent> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BuiltComponent> {
        self.entries.get_mut(id)
    }

    /// Widget handle for an id.
    pub fn get_component(&self, id: &str) -> Option<&Widget> {
        self.entries.get(id).map(|c| &c.widget)
    }

    /// The error-flag checkbox state attached to a textbox, if any.
    pub fn get_checkbox(&self, id: &str) -> Option<bool> {
        self.entries.get(id).and_then(|c| c.widget.flag())
    }

    /// Iterate `(id, component)` in build order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuiltComponent)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), &self.entries[id]))
    }

    /// Ids in build order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, ty: &str) -> ComponentSpec {
        ComponentSpec {
            id: id.into(),
            type_tag: ty.into(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_and_registers_in_order() {
        let mut reg = ComponentRegistry::new();
        reg.create_component(&spec("img", "image")).unwrap();
        reg.create_component(&spec("title", "textbox")).unwrap();
        reg.create_component(&spec("save", "button")).unwrap();

        let ids: Vec<&str> = reg.ids().collect();
        assert_eq!(ids, ["img", "title", "save"]);
        assert_eq!(reg.get_component("title"), Some(&Widget::Textbox {
            text: String::new(),
            flag: None,
        }));
    }

    #[test]
    fn unknown_type_names_id_and_type_and_leaves_registry_untouched() {
        let mut reg = ComponentRegistry::new();
        let err = reg.create_component(&spec("x", "bogus")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("x"), "missing id in: {msg}");
        assert!(msg.contains("bogus"), "missing type in: {msg}");
        assert!(!reg.contains("x"));
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut reg = ComponentRegistry::new();
        reg.create_component(&spec("a", "textbox")).unwrap();
        let err = reg.create_component(&spec("a", "image")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId(id) if id == "a"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn textbox_flag_follows_has_checkbox() {
        let mut reg = ComponentRegistry::new();
        let mut flagged = spec("material", "textbox");
        flagged.has_checkbox = true;
        reg.create_component(&flagged).unwrap();
        reg.create_component(&spec("plain", "textbox")).unwrap();

        assert_eq!(reg.get_checkbox("material"), Some(false));
        assert_eq!(reg.get_checkbox("plain"), None);
    }
}
