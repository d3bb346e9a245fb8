//! Per-kind rendering of built components.
//!
//! Each function draws one component into its assigned area.  Focus only
//! changes chrome (border style); the widget value itself comes from the
//! registry entry.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget as _, Wrap},
};

use crate::core::component::Widget as FieldWidget;
use crate::core::registry::BuiltComponent;

use super::theme::Theme;

/// Draw one component.  Dispatches on the built widget's kind.
pub fn render_component(built: &BuiltComponent, focused: bool, area: Rect, buf: &mut Buffer) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    match &built.widget {
        FieldWidget::Image { path } => render_image(built, path.as_deref(), area, buf),
        FieldWidget::Textbox { text, flag } => {
            render_text_entry(built, text, *flag, focused, area, buf)
        }
        FieldWidget::Search { query } => render_text_entry(built, query, None, focused, area, buf),
        FieldWidget::Html { markup } => render_html(markup, area, buf),
        FieldWidget::Button => render_button(built, focused, area, buf),
        FieldWidget::Slider { value } => render_slider(built, *value, focused, area, buf),
        FieldWidget::Checkbox { checked } => render_checkbox(built, *checked, focused, area, buf),
    }
}

fn field_block(built: &BuiltComponent, focused: bool) -> Block<'_> {
    let border = if focused {
        Theme::focused_border_style()
    } else {
        Theme::border_style()
    };
    Block::default()
        .title(Span::styled(
            format!(" {} ", built.spec.label),
            Theme::label_style(),
        ))
        .borders(Borders::ALL)
        .border_style(border)
}

fn render_image(built: &BuiltComponent, path: Option<&str>, area: Rect, buf: &mut Buffer) {
    let block = field_block(built, false);
    let inner = block.inner(area);
    block.render(area, buf);

    // Terminals can't decode the media itself; show the backing path so
    // the annotator can open it externally.
    let text = match path {
        Some(p) => format!("[media] {p}"),
        None => "[no media]".to_string(),
    };
    Paragraph::new(text)
        .style(Theme::image_placeholder_style())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn render_text_entry(
    built: &BuiltComponent,
    text: &str,
    flag: Option<bool>,
    focused: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let mut block = field_block(built, focused);
    // The error-checkbox marker lives in the field's title.
    if let Some(raised) = flag {
        let marker = format!(" {} ", built.spec.checkbox_label());
        let style = if raised {
            Theme::flag_style()
        } else {
            Theme::border_style()
        };
        block = block.title_top(Line::from(Span::styled(marker, style)).right_aligned());
    }

    let inner = block.inner(area);
    block.render(area, buf);

    let para = if text.is_empty() && !built.spec.placeholder().is_empty() {
        Paragraph::new(built.spec.placeholder()).style(Theme::placeholder_style())
    } else if built.spec.interactive() {
        Paragraph::new(text).style(Theme::value_style())
    } else {
        Paragraph::new(text).style(Theme::readonly_style())
    };
    para.wrap(Wrap { trim: false }).render(inner, buf);

    // Block cursor at the end of the text when focused and editable.
    if focused && built.spec.interactive() && inner.width > 0 && inner.height > 0 {
        let col = (text.chars().count() as u16).min(inner.width - 1);
        if let Some(cell) = buf.cell_mut((inner.x + col, inner.y)) {
            cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
        }
    }
}

fn render_html(markup: &str, area: Rect, buf: &mut Buffer) {
    // Markup passes through as plain text — styling hooks belong to the
    // external presentation layer, not to the core.
    Paragraph::new(markup)
        .style(Theme::value_style())
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_button(built: &BuiltComponent, focused: bool, area: Rect, buf: &mut Buffer) {
    let style = match built.spec.variant() {
        "primary" => Theme::primary_button_style(),
        _ => Theme::secondary_button_style(),
    };
    let border = if focused {
        Theme::focused_border_style()
    } else {
        Theme::border_style()
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    block.render(area, buf);

    let label = if built.spec.label.is_empty() {
        "Button"
    } else {
        &built.spec.label
    };
    Paragraph::new(Line::from(Span::styled(format!(" {label} "), style)))
        .alignment(Alignment::Center)
        .render(inner, buf);
}

fn render_slider(built: &BuiltComponent, value: f64, focused: bool, area: Rect, buf: &mut Buffer) {
    let (min, max) = (built.spec.minimum(), built.spec.maximum());
    let span = (max - min).abs().max(f64::EPSILON);
    let ratio = ((value - min) / span).clamp(0.0, 1.0);

    Gauge::default()
        .block(field_block(built, focused))
        .gauge_style(Theme::slider_style())
        .ratio(ratio)
        .label(format!("{value:.2}"))
        .render(area, buf);
}

fn render_checkbox(built: &BuiltComponent, checked: bool, focused: bool, area: Rect, buf: &mut Buffer) {
    let mark = if checked { "[x]" } else { "[ ]" };
    let mark_style = if focused {
        Theme::focused_border_style()
    } else {
        Theme::value_style()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(mark, mark_style),
        Span::raw(" "),
        Span::styled(built.spec.label.clone(), Theme::label_style()),
    ]))
    .render(area, buf);
}

/// Preferred height in rows for a component, used by the layout splitter.
/// Images report `None`: they flex to fill leftover space.
pub fn preferred_height(built: &BuiltComponent) -> Option<u16> {
    match &built.widget {
        FieldWidget::Image { .. } => None,
        FieldWidget::Textbox { .. } | FieldWidget::Search { .. } => {
            Some(built.spec.lines() + 2) // content + borders
        }
        FieldWidget::Html { .. } => Some(1),
        FieldWidget::Button => Some(3),
        FieldWidget::Slider { .. } => Some(3),
        FieldWidget::Checkbox { .. } => Some(1),
    }
}
