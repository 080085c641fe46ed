use crate::app::{App, MenuItem};
use crate::state::app_state::EntryColumn;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if is_quit(&key_event) && guard.state.form.is_none() {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let request = if guard.state.alert.is_some() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
            guard.dismiss_alert();
        }
        None
    } else if guard.state.confirm.is_some() {
        match key_event.code {
            Char('y') | Char('Y') => guard.confirm_yes(),
            Char('n') | Char('N') | KeyCode::Esc => {
                guard.confirm_no();
                None
            }
            _ => None,
        }
    } else if guard.state.form.is_some() {
        handle_form_keys(&mut guard, key_event)
    } else if guard.state.show_intro {
        if key_event.code == KeyCode::Enter {
            guard.dismiss_intro();
        }
        None
    } else if guard.state.active_tab == MenuItem::Scores && guard.state.scores.sheet.is_some() {
        handle_sheet_keys(&mut guard, key_event)
    } else {
        handle_tab_keys(&mut guard, key_event)
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}

fn is_quit(key_event: &KeyEvent) -> bool {
    matches!(
        (key_event.code, key_event.modifiers),
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL)
    )
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    if key_event.code == KeyCode::Esc {
        app.close_form();
        return None;
    }
    if key_event.code == KeyCode::Enter {
        return app.submit_form();
    }
    let form = app.state.form.as_mut()?;
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        (KeyCode::Tab | KeyCode::Down, _) => form.next_field(),
        (KeyCode::BackTab | KeyCode::Up, _) => form.prev_field(),
        (KeyCode::Backspace, _) => form.backspace(),
        (Char(c), _) => form.push_char(c),
        _ => {}
    }
    None
}

fn handle_sheet_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    let column = app.state.scores.sheet.as_ref()?.column;
    match key_event.code {
        KeyCode::Esc => app.close_score_sheet(),
        Char('s') => return app.submit_score_sheet(),
        Char('+') | Char('=') => app.edit_sheet(|sheet, _| sheet.adjust_score(1)),
        Char('-') => app.edit_sheet(|sheet, _| sheet.adjust_score(-1)),
        KeyCode::Tab => app.edit_sheet(|sheet, _| {
            sheet.switch_side();
            Ok(())
        }),
        Char('j') | KeyCode::Down => app.edit_sheet(|sheet, _| {
            sheet.row_down();
            Ok(())
        }),
        Char('k') | KeyCode::Up => app.edit_sheet(|sheet, _| {
            sheet.row_up();
            Ok(())
        }),
        Char('l') | KeyCode::Right => app.edit_sheet(|sheet, _| {
            sheet.column = sheet.column.next();
            Ok(())
        }),
        Char('h') | KeyCode::Left => app.edit_sheet(|sheet, _| {
            sheet.column = sheet.column.prev();
            Ok(())
        }),
        Char(']') | KeyCode::Enter => app.edit_sheet(|sheet, rosters| sheet.cycle_player(rosters, true)),
        Char('[') => app.edit_sheet(|sheet, rosters| sheet.cycle_player(rosters, false)),
        Char('x') => app.edit_sheet(|sheet, _| sheet.remove_current()),
        Char(c @ '0'..='9') if column == EntryColumn::Minute => {
            let digit = c as u8 - b'0';
            app.edit_sheet(|sheet, _| sheet.push_minute_digit(digit));
        }
        KeyCode::Backspace if column == EntryColumn::Minute => {
            app.edit_sheet(|sheet, _| sheet.clear_minute_digit())
        }
        _ => {}
    }
    None
}

fn handle_tab_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Tab switching
        (_, Char('1'), _) => return app.update_tab(MenuItem::Table),
        (_, Char('2'), _) => return app.update_tab(MenuItem::Fixtures),
        (_, Char('3'), _) => return app.update_tab(MenuItem::Results),
        (_, Char('4'), _) => return app.update_tab(MenuItem::Squads),
        (_, Char('5'), _) => return app.update_tab(MenuItem::Scores),
        (_, Char('6'), _) => return app.update_tab(MenuItem::Manage),
        (_, Char('?'), _) => return app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Session
        (_, Char('L'), _) => app.open_login(),
        (_, Char('O'), _) => app.logout(),
        (_, Char('r'), _) => return Some(NetworkRequest::LoadLeague),

        // Score entry
        (MenuItem::Scores, KeyCode::Enter, _) => app.open_score_sheet(),

        // Registration / management
        (MenuItem::Manage, KeyCode::Tab, _) => app.manage_next_section(),
        (MenuItem::Manage, Char('n'), _) => app.manage_new(),
        (MenuItem::Manage, Char('e'), _) => app.manage_edit(),
        (MenuItem::Manage, Char('a'), _) => return app.manage_toggle_active(),
        (MenuItem::Manage, Char('d'), _) => app.manage_delete(),

        // Navigation
        (_, Char('j') | KeyCode::Down, _) => app.scroll_down(),
        (_, Char('k') | KeyCode::Up, _) => app.scroll_up(),

        // Global
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready_app() -> App {
        let mut app = App::new(AppSettings::default());
        app.dismiss_intro();
        app
    }

    #[test]
    fn test_form_swallows_typed_characters() {
        let mut app = ready_app();
        app.open_login();
        for c in "q1?".chars() {
            handle_form_keys(&mut app, press(Char(c)));
        }
        let form = app.state.form.as_ref().unwrap();
        assert_eq!(form.fields[0].value, "q1?");
        assert_eq!(app.state.active_tab, MenuItem::Table);
    }

    #[test]
    fn test_form_enter_submits_login() {
        let mut app = ready_app();
        app.open_login();
        handle_form_keys(&mut app, press(Char('a')));
        handle_form_keys(&mut app, press(KeyCode::Tab));
        handle_form_keys(&mut app, press(Char('b')));
        match handle_form_keys(&mut app, press(KeyCode::Enter)) {
            Some(NetworkRequest::Login { email, password }) => {
                assert_eq!((email.as_str(), password.as_str()), ("a", "b"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_number_keys_switch_public_tabs() {
        let mut app = ready_app();
        assert!(handle_tab_keys(&mut app, press(Char('3'))).is_none());
        assert_eq!(app.state.active_tab, MenuItem::Results);
        handle_tab_keys(&mut app, press(Char('?')));
        handle_tab_keys(&mut app, press(KeyCode::Esc));
        assert_eq!(app.state.active_tab, MenuItem::Results);
    }

    #[test]
    fn test_manage_key_without_login_asks_for_login() {
        let mut app = ready_app();
        handle_tab_keys(&mut app, press(Char('6')));
        assert_eq!(app.state.active_tab, MenuItem::Table);
        assert!(app.state.form.is_some());
    }
}
