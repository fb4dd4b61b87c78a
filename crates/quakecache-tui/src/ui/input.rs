//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! button presses and navigation.

use crossterm::event::{KeyCode, KeyEvent};

use quakecache_core::dashboard::{Action, Button};
use quakecache_core::render::{ContainerView, RecordsKind};

use crate::app::{App, AppState, Focus, PAGE_SCROLL_SIZE};

/// Key that presses a button from anywhere on the dashboard
pub fn hotkey(button: Button) -> char {
    match button {
        Button::FetchData => 'f',
        Button::ShowSummary => 's',
        Button::ShowOriginal => 'o',
        Button::ClearStore => 'c',
    }
}

fn button_for_key(c: char) -> Option<Button> {
    Button::ALL
        .into_iter()
        .find(|b| hotkey(*b) == c.to_ascii_lowercase())
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::ShowingAlert => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_alert();
            }
            false
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            false
        }
        AppState::ConfirmingQuit => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                true
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
                false
            }
            _ => false,
        },
        AppState::Quitting => true,
        AppState::Normal => handle_normal_input(app, key),
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char(c) => {
            if let Some(button) = button_for_key(c) {
                app.press(button);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Left => {
            app.focus = Focus::Buttons;
            app.prev_button();
        }
        KeyCode::Right => {
            app.focus = Focus::Buttons;
            app.next_button();
        }
        KeyCode::Up => {
            app.focus = Focus::Container;
            app.move_row(-1);
        }
        KeyCode::Down => {
            app.focus = Focus::Container;
            app.move_row(1);
        }
        KeyCode::PageUp => app.move_row(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_row(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.row_selection = 0,
        KeyCode::End => app.row_selection = app.row_count().saturating_sub(1),
        KeyCode::Enter => match app.focus {
            Focus::Buttons => {
                let button = app.selected_button();
                app.press(button);
            }
            Focus::Container => app.select_summary_row(),
        },
        KeyCode::Esc => {
            if matches!(
                app.view,
                ContainerView::Records { kind: RecordsKind::Filtered(_), .. }
            ) {
                app.dispatch(Action::ShowSummary);
            }
        }
        _ => {}
    }
    false
}
