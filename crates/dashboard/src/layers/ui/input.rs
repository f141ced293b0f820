use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use protocol::ScriptKind;

use super::app::{AppState, InputMode, Pane, PathTarget};
use crate::layers::service::Controller;
use crate::layers::session::capture::{clear_image, ImageSource};
use crate::layers::session::demo::DEMO_IDS;
use crate::layers::session::form::DEFAULT_SENDER;

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut AppState, controller: &Controller) -> bool {
    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc => {
                app.confirm_quit = false;
                return false;
            }
            _ => {
                app.confirm_quit = false;
            }
        }
    }

    if app.mode != InputMode::Normal {
        handle_edit_key(key, app, controller);
        return false;
    }

    if app.view.alert.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.view.dismiss_alert();
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.confirm_quit = true;
            return false;
        }
        KeyCode::Tab => {
            app.next_pane();
            return false;
        }
        KeyCode::Esc => {
            app.view.notice = None;
            return false;
        }
        KeyCode::Char('A') => {
            controller.analyze(&mut app.view);
            return false;
        }
        KeyCode::Char('P') => {
            app.view.toggle_privacy();
            return false;
        }
        KeyCode::Char('R') => {
            controller.export_report(&mut app.view);
            return false;
        }
        KeyCode::Char('o') => {
            app.toggle_assistant();
            return false;
        }
        _ => {}
    }

    match app.pane {
        Pane::Form => handle_form_key(key, app, controller),
        Pane::Results => handle_results_key(key, app, controller),
        Pane::Assistant => handle_assistant_key(key, app, controller),
        Pane::Calculator => handle_calculator_key(key, app, controller),
    }
    false
}

fn handle_form_key(key: KeyEvent, app: &mut AppState, controller: &Controller) {
    let view = &mut app.view;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => view.form.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.form.select_prev(),
        KeyCode::Char('a') => view.form.add_row(DEFAULT_SENDER, ""),
        KeyCode::Char('x') => {
            let index = view.form.selected;
            if let Err(alert) = view.form.remove_row(index) {
                view.raise(alert);
            }
        }
        KeyCode::Char('e') | KeyCode::Enter => app.mode = InputMode::EditText,
        KeyCode::Char('s') => app.mode = InputMode::EditSender,
        KeyCode::Char('i') => app.open_path_prompt(PathTarget::Screenshot),
        KeyCode::Char('c') => clear_image(view),
        KeyCode::Char(digit @ '1'..='9') => {
            let id = digit.to_string();
            if DEMO_IDS.contains(&id.as_str()) {
                controller.load_demo(&id);
            }
        }
        _ => {}
    }
}

fn handle_results_key(key: KeyEvent, app: &mut AppState, controller: &Controller) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.page_size()),
        KeyCode::PageUp => app.scroll_up(app.page_size()),
        KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.page_size());
        }
        KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.page_size());
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.half_page_size());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.half_page_size());
        }
        KeyCode::Char('g') => {
            if app.pending_g {
                app.scroll_to_top();
            } else {
                app.pending_g = true;
            }
        }
        KeyCode::Char('G') => app.scroll_to_bottom(),
        KeyCode::Char('d') => controller.generate_script(&mut app.view, ScriptKind::DeclineMoney),
        KeyCode::Char('v') => {
            controller.generate_script(&mut app.view, ScriptKind::VerifyIdentity)
        }
        KeyCode::Char('b') => controller.generate_script(&mut app.view, ScriptKind::BreakContact),
        _ => app.pending_g = false,
    }
}

fn handle_assistant_key(key: KeyEvent, app: &mut AppState, controller: &Controller) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.mode = InputMode::ChatInput,
        KeyCode::Char('n') => app.view.assistant.select_next_suggestion(),
        KeyCode::Char('u') => {
            if app.view.assistant.use_suggestion() {
                controller.send_chat(&mut app.view);
            }
        }
        KeyCode::Char('m') => app.open_path_prompt(PathTarget::ChatImage),
        _ => {}
    }
}

fn handle_calculator_key(key: KeyEvent, app: &mut AppState, controller: &Controller) {
    let form = &mut app.view.financial.form;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::Char('k') => form.focus = form.focus.prev(),
        KeyCode::Char(' ') => form.cycle_payment_method(),
        KeyCode::Enter => {
            if form.focused_text_mut().is_some() {
                app.mode = InputMode::CalcField;
            } else {
                form.cycle_payment_method();
            }
        }
        KeyCode::Char('c') => controller.calculate_financial(&mut app.view),
        _ => {}
    }
}

fn handle_edit_key(key: KeyEvent, app: &mut AppState, controller: &Controller) {
    match key.code {
        KeyCode::Esc => {
            app.mode = InputMode::Normal;
            app.path_input.clear();
        }
        KeyCode::Enter => submit_edit(app, controller),
        KeyCode::Backspace => {
            if let Some(buffer) = app.edit_buffer() {
                buffer.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(buffer) = app.edit_buffer() {
                buffer.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_edit(app: &mut AppState, controller: &Controller) {
    match app.mode {
        InputMode::ChatInput => {
            app.mode = InputMode::Normal;
            controller.send_chat(&mut app.view);
        }
        InputMode::PathPrompt(target) => {
            let Some(path) = app.take_path_input() else {
                return;
            };
            let path = PathBuf::from(path);
            match target {
                PathTarget::Screenshot => {
                    controller.attach_image(&mut app.view, path, ImageSource::Picker)
                }
                PathTarget::ChatImage => controller.attach_chat_image(&mut app.view, path),
            }
        }
        _ => app.mode = InputMode::Normal,
    }
}

/// Terminals deliver a dropped file as a pasted path. Outside of text entry a
/// paste is taken as a screenshot drop; inside it is typed into the buffer.
pub(crate) fn handle_paste(text: &str, app: &mut AppState, controller: &Controller) {
    if app.mode != InputMode::Normal {
        if let Some(buffer) = app.edit_buffer() {
            buffer.extend(text.chars().filter(|ch| !ch.is_control()));
        }
        return;
    }
    if let Some(path) = dropped_path(text) {
        controller.attach_image(&mut app.view, path, ImageSource::Drop);
    }
}

fn dropped_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| {
            trimmed
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
        })
        .unwrap_or(trimmed);
    let path = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    (!path.is_empty()).then(|| PathBuf::from(path.replace("\\ ", " ")))
}
