// event handling

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::tui::app::App;

pub enum Action {
    None,
    Quit,
    SignOut,
    ClearHistory,
    Send(String),
}

pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_event(app: &mut App, event: Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        _ => Action::None,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    // control keys drive the panels, everything else edits the line
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('o') => Action::SignOut,
            KeyCode::Char('x') if !app.loading => Action::ClearHistory,
            KeyCode::Char('b') => {
                app.toggle_breathing();
                Action::None
            }
            KeyCode::Char('t') => {
                app.cycle_theme();
                Action::None
            }
            KeyCode::Char('l') => {
                app.toggle_logs();
                Action::None
            }
            KeyCode::Char('a') => {
                app.move_cursor_start();
                Action::None
            }
            KeyCode::Char('e') => {
                app.move_cursor_end();
                Action::None
            }
            KeyCode::Char('u') => {
                app.clear_input();
                Action::None
            }
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => {
            app.dismiss_alert();
            Action::None
        }
        KeyCode::Enter => match app.submit() {
            Some(text) => Action::Send(text),
            None => Action::None,
        },
        KeyCode::Char(c) => {
            app.insert_char(c);
            Action::None
        }
        KeyCode::Backspace => {
            app.delete_char();
            Action::None
        }
        KeyCode::Delete => {
            app.delete_char_forward();
            Action::None
        }
        KeyCode::Left => {
            app.move_cursor_left();
            Action::None
        }
        KeyCode::Right => {
            app.move_cursor_right();
            Action::None
        }
        KeyCode::Home => {
            app.move_cursor_start();
            Action::None
        }
        KeyCode::End => {
            app.move_cursor_end();
            Action::None
        }
        KeyCode::Up | KeyCode::PageUp => {
            app.scroll_up();
            Action::None
        }
        KeyCode::Down | KeyCode::PageDown => {
            app.scroll_down();
            Action::None
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::Session;
    use crate::tui::theme::ThemeKind;

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
        handle_event(app, Event::Key(KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn typing_then_enter_sends() {
        let mut app = App::with_theme(Session::new("ana"), String::new(), ThemeKind::Dusk);
        for c in "hey".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }

        match press(&mut app, KeyCode::Enter, KeyModifiers::NONE) {
            Action::Send(text) => assert_eq!(text, "hey"),
            _ => panic!("expected Send"),
        }
    }

    #[test]
    fn ctrl_keys_quit_and_sign_out() {
        let mut app = App::with_theme(Session::new("ana"), String::new(), ThemeKind::Dusk);
        assert!(matches!(
            press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::Quit
        ));
        assert!(matches!(
            press(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL),
            Action::SignOut
        ));
        assert!(matches!(
            press(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL),
            Action::ClearHistory
        ));
        // q without ctrl is just a letter
        press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.input, "q");
    }

    #[test]
    fn no_clearing_while_a_reply_is_pending() {
        let mut app = App::with_theme(Session::new("ana"), String::new(), ThemeKind::Dusk);
        for c in "hey".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert!(matches!(
            press(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL),
            Action::None
        ));
        // quitting still works while loading
        assert!(matches!(
            press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL),
            Action::Quit
        ));
    }
}
