//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── form fields ────────────────────────────────────────────
    pub fn label_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn placeholder_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn readonly_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn flag_style() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    // ── focus ──────────────────────────────────────────────────
    pub fn focused_border_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    // ── buttons ────────────────────────────────────────────────
    pub fn primary_button_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn secondary_button_style() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn slider_style() -> Style {
        Style::default().fg(Color::Green).bg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn image_placeholder_style() -> Style {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::ITALIC)
    }
}
