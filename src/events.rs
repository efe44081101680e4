use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::common::tab_at;
use crate::ui::TAB_ROW;

/// Where `e` writes the dashboard export.
pub const EXPORT_FILE: &str = "dashboard_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Dispatch a terminal event.
pub fn handle_event(app: &mut App, event: Event) {
    match event {
        // some platforms also report releases
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        _ => {}
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Resources),
        KeyCode::Char('2') => app.set_view(View::Io),
        KeyCode::Char('3') => app.set_view(View::Network),

        // Instances
        KeyCode::Char('i') | KeyCode::Char(']') => app.next_instance(),
        KeyCode::Char('I') | KeyCode::Char('[') => app.prev_instance(),

        // Thresholds
        KeyCode::Char('T') => app.toggle_thresholds(),
        KeyCode::Char('t') => app.next_threshold(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => app.adjust_threshold(1.0),
        KeyCode::Char('-') | KeyCode::Down => app.adjust_threshold(-1.0),

        KeyCode::Esc => app.go_back(),
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.prev_view(),
        MouseEventKind::ScrollDown => app.next_view(),

        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.row == TAB_ROW {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
            }
        }

        // Right-click closes panels
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}
