//! Layout tree resolution.
//!
//! A form config names its components once, flat, and arranges them with a
//! separate layout tree: nested `vstack` / `hstack` containers, a
//! root-only `two_column` split, and bare component ids as leaves.  This
//! module walks that tree depth-first in pre-order, builds each referenced
//! component on first reference (at most once), and produces a
//! [`RenderedNode`] tree mirroring the config plus the populated
//! [`ComponentRegistry`].
//!
//! Sibling order in `children` (and in `left`) is the sole source of
//! visual ordering — there is no per-component order field.
//!
//! Validation is eager: the whole (components, layout) pair is checked
//! before any widget is built, so a malformed config fails startup with a
//! precise error instead of surfacing mid-render.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::component::ComponentSpec;
use super::error::{BuildError, ConfigError, ReferenceError};
use super::registry::ComponentRegistry;

// ───────────────────────────────────────── config schema ─────

/// One slot in a container: either a component reference or a nested
/// container.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayoutEntry {
    Component(String),
    Container(Box<LayoutNode>),
}

/// Layout tree node as written in the form config.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    /// Children stacked top to bottom.
    Vstack {
        #[serde(default)]
        elem_id: Option<String>,
        #[serde(default)]
        children: Vec<LayoutEntry>,
    },
    /// Children side by side.
    Hstack {
        #[serde(default)]
        elem_id: Option<String>,
        #[serde(default)]
        children: Vec<LayoutEntry>,
    },
    /// Alias for a plain vertical sequence.
    Tree {
        #[serde(default)]
        children: Vec<LayoutEntry>,
    },
    /// Root-only split: a flat list of components on the left, one nested
    /// node (typically a vstack) on the right, sized by the two scales.
    TwoColumn {
        #[serde(default)]
        elem_id: Option<String>,
        #[serde(default)]
        left: Vec<String>,
        left_scale: Option<u16>,
        right: Box<LayoutEntry>,
        right_scale: Option<u16>,
    },
}

// ───────────────────────────────────────── rendered tree ─────

/// Stacking direction of a resolved container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Resolved layout tree: every leaf is a component id guaranteed to exist
/// in the registry built alongside it.
#[derive(Debug, PartialEq)]
pub enum RenderedNode {
    /// A placed component; carries its own id as the element identifier.
    Component(String),
    Stack {
        axis: Axis,
        /// External styling hook, propagated verbatim from the config.
        elem_id: Option<String>,
        children: Vec<RenderedNode>,
    },
    TwoColumn {
        elem_id: Option<String>,
        left: Vec<RenderedNode>,
        left_scale: u16,
        right: Box<RenderedNode>,
        right_scale: u16,
    },
}

impl RenderedNode {
    /// Component ids in document order (pre-order, left before right).
    pub fn document_order(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RenderedNode::Component(id) => out.push(id),
            RenderedNode::Stack { children, .. } => {
                for child in children {
                    child.collect_ids(out);
                }
            }
            RenderedNode::TwoColumn { left, right, .. } => {
                for child in left {
                    child.collect_ids(out);
                }
                right.collect_ids(out);
            }
        }
    }
}

/// A fully built form: the populated registry plus the resolved tree.
///
/// Owned by the application state — building the same config twice yields
/// two structurally identical but fully independent forms.
#[derive(Debug)]
pub struct BuiltForm {
    pub registry: ComponentRegistry,
    pub tree: RenderedNode,
}

impl BuiltForm {
    /// Ids of interactive components in document order (focus ring).
    pub fn focus_order(&self) -> Vec<String> {
        self.tree
            .document_order()
            .into_iter()
            .filter(|id| {
                self.registry
                    .get(id)
                    .is_some_and(|c| c.spec.interactive())
            })
            .map(str::to_string)
            .collect()
    }
}

// ───────────────────────────────────────── validation ────────

/// Check the (components, layout) pair without building anything.
///
/// Catches duplicate / empty ids, unknown type tags, dangling or repeated
/// layout references, and `two_column` anywhere below the root.
pub fn validate(components: &[ComponentSpec], layout: &LayoutNode) -> Result<(), BuildError> {
    use super::component::ComponentKind;

    let mut ids = HashSet::new();
    for spec in components {
        if spec.id.is_empty() {
            return Err(ConfigError::EmptyId.into());
        }
        if !ids.insert(spec.id.as_str()) {
            return Err(ConfigError::DuplicateId(spec.id.clone()).into());
        }
        if ComponentKind::from_tag(&spec.type_tag).is_none() {
            return Err(ConfigError::UnknownType {
                id: spec.id.clone(),
                ty: spec.type_tag.clone(),
            }
            .into());
        }
    }

    let mut placed = HashSet::new();
    validate_node(layout, true, &ids, &mut placed)
}

fn validate_node<'a>(
    node: &'a LayoutNode,
    at_root: bool,
    ids: &HashSet<&str>,
    placed: &mut HashSet<&'a str>,
) -> Result<(), BuildError> {
    match node {
        LayoutNode::Vstack { children, .. }
        | LayoutNode::Hstack { children, .. }
        | LayoutNode::Tree { children } => {
            for entry in children {
                validate_entry(entry, ids, placed)?;
            }
            Ok(())
        }
        LayoutNode::TwoColumn { left, right, .. } => {
            if !at_root {
                return Err(ConfigError::NestedTwoColumn.into());
            }
            for id in left {
                validate_ref(id, ids, placed)?;
            }
            validate_entry(right, ids, placed)
        }
    }
}

fn validate_entry<'a>(
    entry: &'a LayoutEntry,
    ids: &HashSet<&str>,
    placed: &mut HashSet<&'a str>,
) -> Result<(), BuildError> {
    match entry {
        LayoutEntry::Component(id) => validate_ref(id, ids, placed),
        LayoutEntry::Container(node) => validate_node(node, false, ids, placed),
    }
}

fn validate_ref<'a>(
    id: &'a str,
    ids: &HashSet<&str>,
    placed: &mut HashSet<&'a str>,
) -> Result<(), BuildError> {
    if !ids.contains(id) {
        return Err(ReferenceError::Undefined(id.to_string()).into());
    }
    if !placed.insert(id) {
        return Err(ReferenceError::DuplicatePlacement(id.to_string()).into());
    }
    Ok(())
}

// ───────────────────────────────────────── resolution ────────

/// Build the form: validate, then walk the layout once, creating each
/// referenced component on first reference and mirroring the tree.
///
/// Components never referenced by the layout are not built; the registry
/// holds exactly the placed set, in document order.
pub fn build_layout(
    components: &[ComponentSpec],
    layout: &LayoutNode,
) -> Result<BuiltForm, BuildError> {
    validate(components, layout)?;

    let specs: HashMap<&str, &ComponentSpec> =
        components.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut registry = ComponentRegistry::new();
    let tree = resolve(layout, &specs, &mut registry)?;
    tracing::debug!(
        components = registry.len(),
        "form built from {} declared specs",
        components.len()
    );
    Ok(BuiltForm { registry, tree })
}

fn resolve(
    node: &LayoutNode,
    specs: &HashMap<&str, &ComponentSpec>,
    registry: &mut ComponentRegistry,
) -> Result<RenderedNode, BuildError> {
    Ok(match node {
        LayoutNode::Vstack { elem_id, children } => RenderedNode::Stack {
            axis: Axis::Vertical,
            elem_id: elem_id.clone(),
            children: resolve_children(children, specs, registry)?,
        },
        LayoutNode::Hstack { elem_id, children } => RenderedNode::Stack {
            axis: Axis::Horizontal,
            elem_id: elem_id.clone(),
            children: resolve_children(children, specs, registry)?,
        },
        LayoutNode::Tree { children } => RenderedNode::Stack {
            axis: Axis::Vertical,
            elem_id: None,
            children: resolve_children(children, specs, registry)?,
        },
        LayoutNode::TwoColumn {
            elem_id,
            left,
            left_scale,
            right,
            right_scale,
        } => {
            let mut left_nodes = Vec::with_capacity(left.len());
            for id in left {
                left_nodes.push(resolve_leaf(id, specs, registry)?);
            }
            let right_node = resolve_entry(right, specs, registry)?;
            RenderedNode::TwoColumn {
                elem_id: elem_id.clone(),
                left: left_nodes,
                left_scale: left_scale.unwrap_or(1).max(1),
                right: Box::new(right_node),
                right_scale: right_scale.unwrap_or(2).max(1),
            }
        }
    })
}

fn resolve_children(
    children: &[LayoutEntry],
    specs: &HashMap<&str, &ComponentSpec>,
    registry: &mut ComponentRegistry,
) -> Result<Vec<RenderedNode>, BuildError> {
    let mut out = Vec::with_capacity(children.len());
    for entry in children {
        out.push(resolve_entry(entry, specs, registry)?);
    }
    Ok(out)
}

fn resolve_entry(
    entry: &LayoutEntry,
    specs: &HashMap<&str, &ComponentSpec>,
    registry: &mut ComponentRegistry,
) -> Result<RenderedNode, BuildError> {
    match entry {
        LayoutEntry::Component(id) => resolve_leaf(id, specs, registry),
        LayoutEntry::Container(node) => resolve(node, specs, registry),
    }
}

fn resolve_leaf(
    id: &str,
    specs: &HashMap<&str, &ComponentSpec>,
    registry: &mut ComponentRegistry,
) -> Result<RenderedNode, BuildError> {
    // Validation already proved the id exists and appears once; the
    // lookup stays fallible so a direct `resolve` call without prior
    // validation still fails cleanly.
    let spec = specs
        .get(id)
        .ok_or_else(|| ReferenceError::Undefined(id.to_string()))?;
    if !registry.contains(id) {
        registry.create_component(spec)?;
    }
    Ok(RenderedNode::Component(id.to_string()))
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::component::Widget;

    fn spec(id: &str, ty: &str) -> ComponentSpec {
        ComponentSpec {
            id: id.into(),
            type_tag: ty.into(),
            ..Default::default()
        }
    }

    fn labeled(id: &str, ty: &str, label: &str) -> ComponentSpec {
        ComponentSpec {
            label: label.into(),
            ..spec(id, ty)
        }
    }

    fn vstack(children: Vec<LayoutEntry>) -> LayoutNode {
        LayoutNode::Vstack {
            elem_id: None,
            children,
        }
    }

    fn leaf(id: &str) -> LayoutEntry {
        LayoutEntry::Component(id.into())
    }

    #[test]
    fn minimal_two_column_scenario() {
        let components = vec![
            spec("img", "image"),
            labeled("title", "textbox", "Title"),
        ];
        let layout = LayoutNode::TwoColumn {
            elem_id: None,
            left: vec!["img".into()],
            left_scale: None,
            right: Box::new(LayoutEntry::Container(Box::new(vstack(vec![leaf(
                "title",
            )])))),
            right_scale: None,
        };

        let form = build_layout(&components, &layout).unwrap();
        assert_eq!(form.registry.len(), 2);

        let RenderedNode::TwoColumn {
            left,
            right,
            left_scale,
            right_scale,
            ..
        } = &form.tree
        else {
            panic!("expected two_column root");
        };
        assert_eq!(left, &[RenderedNode::Component("img".into())]);
        assert_eq!(*left_scale, 1);
        assert_eq!(*right_scale, 2);
        assert_eq!(
            **right,
            RenderedNode::Stack {
                axis: Axis::Vertical,
                elem_id: None,
                children: vec![RenderedNode::Component("title".into())],
            }
        );
    }

    #[test]
    fn sibling_order_is_preserved() {
        let components = vec![
            spec("a", "textbox"),
            spec("b", "textbox"),
            spec("c", "textbox"),
        ];
        // Deliberately place in an order different from the declaration.
        let layout = vstack(vec![leaf("c"), leaf("a"), leaf("b")]);

        let form = build_layout(&components, &layout).unwrap();
        assert_eq!(form.tree.document_order(), ["c", "a", "b"]);
        // Registry order follows first reference, not declaration order.
        let ids: Vec<&str> = form.registry.ids().collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn dangling_reference_names_the_missing_id() {
        let components = vec![spec("present", "textbox")];
        let layout = vstack(vec![leaf("present"), leaf("missing")]);

        let err = build_layout(&components, &layout).unwrap_err();
        assert!(matches!(
            &err,
            BuildError::Reference(ReferenceError::Undefined(id)) if id == "missing"
        ));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn duplicate_placement_is_rejected() {
        let components = vec![spec("a", "textbox")];
        let layout = vstack(vec![leaf("a"), leaf("a")]);

        let err = build_layout(&components, &layout).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Reference(ReferenceError::DuplicatePlacement(id)) if id == "a"
        ));
    }

    #[test]
    fn unknown_type_fails_before_any_widget_is_built() {
        let components = vec![spec("ok", "textbox"), spec("x", "bogus")];
        let layout = vstack(vec![leaf("ok")]);

        let err = build_layout(&components, &layout).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("x") && msg.contains("bogus"), "got: {msg}");
    }

    #[test]
    fn nested_two_column_is_rejected() {
        let components = vec![spec("a", "textbox"), spec("b", "textbox")];
        let inner = LayoutNode::TwoColumn {
            elem_id: None,
            left: vec!["a".into()],
            left_scale: None,
            right: Box::new(leaf("b")),
            right_scale: None,
        };
        let layout = vstack(vec![LayoutEntry::Container(Box::new(inner))]);

        let err = build_layout(&components, &layout).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::NestedTwoColumn)
        ));
    }

    #[test]
    fn elem_id_propagates_to_rendered_containers() {
        let components = vec![spec("a", "textbox")];
        let layout = LayoutNode::Hstack {
            elem_id: Some("top_row".into()),
            children: vec![leaf("a")],
        };

        let form = build_layout(&components, &layout).unwrap();
        let RenderedNode::Stack { elem_id, axis, .. } = &form.tree else {
            panic!("expected stack root");
        };
        assert_eq!(elem_id.as_deref(), Some("top_row"));
        assert_eq!(*axis, Axis::Horizontal);
    }

    #[test]
    fn rebuild_is_structurally_identical() {
        let components = vec![spec("img", "image"), spec("note", "textbox")];
        let layout = vstack(vec![leaf("img"), leaf("note")]);

        let first = build_layout(&components, &layout).unwrap();
        let second = build_layout(&components, &layout).unwrap();

        assert_eq!(first.tree, second.tree);
        let a: Vec<&str> = first.registry.ids().collect();
        let b: Vec<&str> = second.registry.ids().collect();
        assert_eq!(a, b);
        for id in a {
            assert_eq!(
                first.registry.get_component(id),
                second.registry.get_component(id)
            );
        }
    }

    #[test]
    fn round_trip_lookup_after_build() {
        let components = vec![spec("img", "image"), labeled("title", "textbox", "Title")];
        let layout = vstack(vec![leaf("img"), leaf("title")]);

        let form = build_layout(&components, &layout).unwrap();
        assert_eq!(form.tree.document_order(), ["img", "title"]);
        assert_eq!(
            form.registry.get_component("img"),
            Some(&Widget::Image { path: None })
        );
        assert_eq!(form.registry.get("title").unwrap().spec.label, "Title");
    }

    #[test]
    fn unreferenced_components_are_not_built() {
        let components = vec![spec("used", "textbox"), spec("unused", "textbox")];
        let layout = vstack(vec![leaf("used")]);

        let form = build_layout(&components, &layout).unwrap();
        assert_eq!(form.registry.len(), 1);
        assert!(form.registry.get_component("unused").is_none());
    }

    #[test]
    fn focus_order_skips_non_interactive_components() {
        let mut frozen = spec("frozen", "textbox");
        frozen.interactive = Some(false);
        let components = vec![
            spec("img", "image"),
            frozen,
            spec("note", "textbox"),
            spec("save_btn", "button"),
        ];
        let layout = vstack(vec![
            leaf("img"),
            leaf("frozen"),
            leaf("note"),
            leaf("save_btn"),
        ]);

        let form = build_layout(&components, &layout).unwrap();
        assert_eq!(form.focus_order(), ["note", "save_btn"]);
    }
}
