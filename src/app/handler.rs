//! Keyboard input handling.
//!
//! Bound actions are checked first; everything else falls through to the
//! focused widget as an edit.  Default bindings all carry a modifier or a
//! special key, so plain typing always reaches the focused field.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Action;
use crate::core::component::Widget;

use super::state::{ActiveView, AppState};

pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Help overlay swallows everything; any key closes it.
    if state.active_view == ActiveView::Help {
        state.active_view = ActiveView::Form;
        return;
    }

    if let Some(action) = state.config.match_key(key) {
        perform(state, action);
        return;
    }

    edit_focused(state, key);
}

fn perform(state: &mut AppState, action: Action) {
    match action {
        Action::FocusNext => state.focus_next(),
        Action::FocusPrev => state.focus_prev(),
        Action::PrevRecord => state.goto_prev_record(),
        Action::NextRecord => state.goto_next_record(),
        Action::SaveRecord => state.save_current(),
        Action::ToggleFlag => toggle_flag(state),
        Action::ToggleHelp => state.active_view = ActiveView::Help,
        Action::Quit => state.should_quit = true,
    }
}

/// Flip the error checkbox of the focused textbox, if it has one.
fn toggle_flag(state: &mut AppState) {
    let Some(id) = state.focused_id().map(str::to_string) else {
        return;
    };
    let Some(built) = state.form.registry.get_mut(&id) else {
        return;
    };
    let message = match &mut built.widget {
        Widget::Textbox {
            flag: Some(raised), ..
        } => {
            *raised = !*raised;
            if *raised {
                format!("flagged `{}`", built.spec.label)
            } else {
                format!("unflagged `{}`", built.spec.label)
            }
        }
        _ => "focused field has no error flag".to_string(),
    };
    state.status_message = Some(message);
}

/// State change that can't happen while the focused widget is borrowed.
enum Deferred {
    None,
    FocusNext,
    Jump(String),
    Press,
}

/// Route an unbound key to the focused widget.
fn edit_focused(state: &mut AppState, key: KeyEvent) {
    let Some(id) = state.focused_id().map(str::to_string) else {
        return;
    };

    // Reject chars carrying Ctrl/Alt so unbound shortcuts don't type.
    let plain = key
        .modifiers
        .intersection(KeyModifiers::CONTROL | KeyModifiers::ALT)
        .is_empty();

    let deferred = {
        let Some(built) = state.form.registry.get_mut(&id) else {
            return;
        };
        if !built.spec.interactive() {
            return;
        }
        match &mut built.widget {
            Widget::Textbox { text, .. } => match key.code {
                KeyCode::Char(c) if plain => {
                    text.push(c);
                    Deferred::None
                }
                KeyCode::Backspace => {
                    text.pop();
                    Deferred::None
                }
                KeyCode::Enter if built.spec.lines() > 1 => {
                    text.push('\n');
                    Deferred::None
                }
                KeyCode::Enter => Deferred::FocusNext,
                _ => Deferred::None,
            },
            Widget::Search { query } => match key.code {
                KeyCode::Char(c) if plain => {
                    query.push(c);
                    Deferred::None
                }
                KeyCode::Backspace => {
                    query.pop();
                    Deferred::None
                }
                KeyCode::Enter => {
                    let needle = query.trim().to_string();
                    if needle.is_empty() {
                        Deferred::None
                    } else {
                        Deferred::Jump(needle)
                    }
                }
                _ => Deferred::None,
            },
            Widget::Checkbox { checked } => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    *checked = !*checked;
                }
                Deferred::None
            }
            Widget::Slider { value } => {
                let (min, max, step) = (
                    built.spec.minimum(),
                    built.spec.maximum(),
                    built.spec.step(),
                );
                match key.code {
                    KeyCode::Left => *value = (*value - step).max(min),
                    KeyCode::Right => *value = (*value + step).min(max),
                    _ => {}
                }
                Deferred::None
            }
            Widget::Button => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    Deferred::Press
                } else {
                    Deferred::None
                }
            }
            Widget::Image { .. } | Widget::Html { .. } => Deferred::None,
        }
    };

    match deferred {
        Deferred::None => {}
        Deferred::FocusNext => state.focus_next(),
        Deferred::Jump(needle) => state.jump_to_key(&needle),
        Deferred::Press => press_button(state, &id),
    }
}

/// Buttons are wired by well-known ids: `prev_btn`, `next_btn`,
/// `save_btn`.
fn press_button(state: &mut AppState, id: &str) {
    match id {
        "prev_btn" => state.goto_prev_record(),
        "next_btn" => state.goto_next_record(),
        "save_btn" => state.save_current(),
        other => {
            state.status_message = Some(format!("button `{other}` has no action"));
        }
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::core::component::ComponentSpec;
    use crate::core::layout::{build_layout, LayoutEntry, LayoutNode};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn state_with(specs: Vec<ComponentSpec>) -> AppState {
        let children = specs
            .iter()
            .map(|s| LayoutEntry::Component(s.id.clone()))
            .collect();
        let layout = LayoutNode::Vstack {
            elem_id: None,
            children,
        };
        let form = build_layout(&specs, &layout).unwrap();
        AppState::new(
            form,
            Default::default(),
            UserConfig {
                bindings: UserConfig::default_bindings(),
            },
        )
    }

    fn spec(id: &str, ty: &str) -> ComponentSpec {
        ComponentSpec {
            id: id.into(),
            type_tag: ty.into(),
            ..Default::default()
        }
    }

    #[test]
    fn typing_edits_the_focused_textbox() {
        let mut state = state_with(vec![spec("category", "textbox")]);
        for c in "chair".chars() {
            handle_key(&mut state, key(KeyCode::Char(c)));
        }
        handle_key(&mut state, key(KeyCode::Backspace));
        assert_eq!(
            state.form.registry.get_component("category").unwrap().value_text(),
            "chai"
        );
    }

    #[test]
    fn tab_moves_focus_in_document_order() {
        let mut state = state_with(vec![
            spec("a", "textbox"),
            spec("b", "checkbox"),
            spec("c", "button"),
        ]);
        assert_eq!(state.focused_id(), Some("a"));
        handle_key(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focused_id(), Some("b"));
        handle_key(&mut state, key(KeyCode::Tab));
        handle_key(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focused_id(), Some("a")); // wraps
    }

    #[test]
    fn space_toggles_focused_checkbox() {
        let mut state = state_with(vec![spec("done", "checkbox")]);
        handle_key(&mut state, key(KeyCode::Char(' ')));
        assert_eq!(
            state.form.registry.get_component("done"),
            Some(&Widget::Checkbox { checked: true })
        );
    }

    #[test]
    fn arrows_step_focused_slider_within_bounds() {
        let mut s = spec("confidence", "slider");
        s.step = Some(0.25);
        let mut state = state_with(vec![s]);

        handle_key(&mut state, key(KeyCode::Right));
        assert_eq!(
            state.form.registry.get_component("confidence"),
            Some(&Widget::Slider { value: 0.75 })
        );
        handle_key(&mut state, key(KeyCode::Right));
        handle_key(&mut state, key(KeyCode::Right));
        // Clamped at the configured maximum.
        assert_eq!(
            state.form.registry.get_component("confidence"),
            Some(&Widget::Slider { value: 1.0 })
        );
    }

    #[test]
    fn ctrl_chars_do_not_type_into_textboxes() {
        let mut state = state_with(vec![spec("note", "textbox")]);
        handle_key(&mut state, ctrl('x'));
        assert_eq!(
            state.form.registry.get_component("note").unwrap().value_text(),
            ""
        );
    }

    #[test]
    fn ctrl_f_toggles_the_error_flag() {
        let mut s = spec("material", "textbox");
        s.has_checkbox = true;
        let mut state = state_with(vec![s]);

        handle_key(&mut state, ctrl('f'));
        assert_eq!(state.form.registry.get_checkbox("material"), Some(true));
        handle_key(&mut state, ctrl('f'));
        assert_eq!(state.form.registry.get_checkbox("material"), Some(false));
    }

    #[test]
    fn esc_quits_and_f1_opens_help() {
        let mut state = state_with(vec![spec("a", "textbox")]);
        handle_key(&mut state, key(KeyCode::F(1)));
        assert_eq!(state.active_view, ActiveView::Help);
        // Any key closes the overlay without editing the form.
        handle_key(&mut state, key(KeyCode::Char('z')));
        assert_eq!(state.active_view, ActiveView::Form);
        assert_eq!(
            state.form.registry.get_component("a").unwrap().value_text(),
            ""
        );

        handle_key(&mut state, key(KeyCode::Esc));
        assert!(state.should_quit);
    }
}
