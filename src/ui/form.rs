//! Form renderer — walks the resolved layout tree and splits the terminal
//! area to match.
//!
//! Vertical stacks split by each child's preferred height, horizontal
//! stacks and the two-column root share width by flex / scale weights.
//! Children always render in tree order; the tree itself was fixed at
//! build time, so rendering is infallible.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

use crate::core::layout::{Axis, BuiltForm, RenderedNode};

use super::widgets;

/// Render a whole [`BuiltForm`], highlighting the focused component.
pub struct FormView<'a> {
    form: &'a BuiltForm,
    focused: Option<&'a str>,
}

impl<'a> FormView<'a> {
    pub fn new(form: &'a BuiltForm) -> Self {
        Self {
            form,
            focused: None,
        }
    }

    pub fn focused(mut self, id: Option<&'a str>) -> Self {
        self.focused = id;
        self
    }
}

impl Widget for FormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_node(&self.form.tree, self.form, self.focused, area, buf);
    }
}

/// Vertical footprint of a node: a fixed row count, or `None` to flex
/// into whatever is left (anything containing an image flexes).
fn preferred_height(node: &RenderedNode, form: &BuiltForm) -> Option<u16> {
    match node {
        RenderedNode::Component(id) => {
            let built = form.registry.get(id)?;
            widgets::preferred_height(built)
        }
        RenderedNode::Stack {
            axis: Axis::Vertical,
            children,
            ..
        } => children
            .iter()
            .map(|c| preferred_height(c, form))
            .sum::<Option<u16>>(),
        RenderedNode::Stack {
            axis: Axis::Horizontal,
            children,
            ..
        } => children
            .iter()
            .map(|c| preferred_height(c, form))
            .try_fold(0u16, |acc, h| h.map(|h| acc.max(h))),
        RenderedNode::TwoColumn { .. } => None,
    }
}

fn vertical_constraint(node: &RenderedNode, form: &BuiltForm) -> Constraint {
    match preferred_height(node, form) {
        Some(h) => Constraint::Length(h),
        None => Constraint::Fill(1),
    }
}

/// Horizontal share of a node inside an hstack: leaf components use their
/// `flex` attribute, containers weigh 1.
fn horizontal_constraint(node: &RenderedNode, form: &BuiltForm) -> Constraint {
    let weight = match node {
        RenderedNode::Component(id) => form
            .registry
            .get(id)
            .map(|built| built.spec.flex())
            .unwrap_or(1),
        _ => 1,
    };
    Constraint::Fill(weight)
}

fn render_node(
    node: &RenderedNode,
    form: &BuiltForm,
    focused: Option<&str>,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match node {
        RenderedNode::Component(id) => {
            if let Some(built) = form.registry.get(id) {
                widgets::render_component(built, focused == Some(id.as_str()), area, buf);
            }
        }
        RenderedNode::Stack {
            axis: Axis::Vertical,
            children,
            ..
        } => {
            let constraints: Vec<Constraint> = children
                .iter()
                .map(|c| vertical_constraint(c, form))
                .collect();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(area);
            for (child, chunk) in children.iter().zip(chunks.iter()) {
                render_node(child, form, focused, *chunk, buf);
            }
        }
        RenderedNode::Stack {
            axis: Axis::Horizontal,
            children,
            ..
        } => {
            let constraints: Vec<Constraint> = children
                .iter()
                .map(|c| horizontal_constraint(c, form))
                .collect();
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(constraints)
                .split(area);
            for (child, chunk) in children.iter().zip(chunks.iter()) {
                render_node(child, form, focused, *chunk, buf);
            }
        }
        RenderedNode::TwoColumn {
            left,
            left_scale,
            right,
            right_scale,
            ..
        } => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Fill(*left_scale),
                    Constraint::Fill(*right_scale),
                ])
                .split(area);

            // Left region: flat component list stacked vertically.
            let constraints: Vec<Constraint> =
                left.iter().map(|c| vertical_constraint(c, form)).collect();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(columns[0]);
            for (child, row) in left.iter().zip(rows.iter()) {
                render_node(child, form, focused, *row, buf);
            }

            render_node(right, form, focused, columns[1], buf);
        }
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::component::ComponentSpec;
    use crate::core::layout::{build_layout, LayoutEntry, LayoutNode};

    fn spec(id: &str, ty: &str) -> ComponentSpec {
        ComponentSpec {
            id: id.into(),
            type_tag: ty.into(),
            ..Default::default()
        }
    }

    fn built(components: Vec<ComponentSpec>, layout: LayoutNode) -> BuiltForm {
        build_layout(&components, &layout).unwrap()
    }

    #[test]
    fn textbox_height_follows_lines() {
        let mut tall = spec("desc", "textbox");
        tall.lines = Some(3);
        let form = built(
            vec![spec("a", "textbox"), tall],
            LayoutNode::Vstack {
                elem_id: None,
                children: vec![
                    LayoutEntry::Component("a".into()),
                    LayoutEntry::Component("desc".into()),
                ],
            },
        );

        let a = &form.tree.document_order()[0];
        assert_eq!(
            preferred_height(&RenderedNode::Component(a.to_string()), &form),
            Some(3)
        );
        assert_eq!(
            preferred_height(&RenderedNode::Component("desc".into()), &form),
            Some(5)
        );
        // The whole vstack is the sum of its children.
        assert_eq!(preferred_height(&form.tree, &form), Some(8));
    }

    #[test]
    fn stacks_containing_images_flex() {
        let form = built(
            vec![spec("img", "image"), spec("a", "textbox")],
            LayoutNode::Vstack {
                elem_id: None,
                children: vec![
                    LayoutEntry::Component("img".into()),
                    LayoutEntry::Component("a".into()),
                ],
            },
        );
        assert_eq!(preferred_height(&form.tree, &form), None);
        assert_eq!(
            vertical_constraint(&form.tree, &form),
            Constraint::Fill(1)
        );
    }

    #[test]
    fn rendering_draws_every_component() {
        let form = built(
            vec![
                spec("img", "image"),
                spec("title", "textbox"),
                spec("save_btn", "button"),
            ],
            LayoutNode::TwoColumn {
                elem_id: None,
                left: vec!["img".into()],
                left_scale: None,
                right: Box::new(LayoutEntry::Container(Box::new(LayoutNode::Vstack {
                    elem_id: None,
                    children: vec![
                        LayoutEntry::Component("title".into()),
                        LayoutEntry::Component("save_btn".into()),
                    ],
                }))),
                right_scale: None,
            },
        );

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        FormView::new(&form)
            .focused(Some("title"))
            .render(area, &mut buf);

        let rendered: String = buf
            .content
            .iter()
            .map(|cell| cell.symbol().to_string())
            .collect();
        assert!(rendered.contains("[no media]"));
    }
}
