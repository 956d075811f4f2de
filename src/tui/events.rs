//! Event handling for the TUI
//!
//! Vim-style navigation plus checkbox and filter toggles

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::highlight::HighlightCategory;

use super::app::App;

/// Handle a key event, returns true if app should quit
pub fn handle_event(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay first
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return false;
    }

    let page = app.page_size;
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => return true,
        (KeyCode::Enter, _) => {
            app.confirm();
            return true;
        }

        // Navigation
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => app.with_widget(|w| w.move_down()),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => app.with_widget(|w| w.move_up()),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
            app.with_widget(|w| w.page_down(page))
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
            app.with_widget(|w| w.page_up(page))
        }
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => app.with_widget(|w| w.jump_to_top()),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => app.with_widget(|w| w.jump_to_bottom()),

        // Expansion
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => app.with_widget(|w| w.expand()),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => app.with_widget(|w| w.collapse()),
        (KeyCode::Tab, _) => app.with_widget(|w| w.toggle_expand()),

        // Checkboxes
        (KeyCode::Char(' '), _) => app.with_widget(|w| w.toggle_check()),
        (KeyCode::Char('a'), _) => app.with_widget(|w| w.check_all(true)),
        (KeyCode::Char('n'), _) => app.with_widget(|w| w.check_all(false)),

        // Filters
        (KeyCode::Char('s'), _) => app.toggle_simplify(),
        (KeyCode::Char('d'), _) => app.toggle_deselect_duplicates(),
        (KeyCode::Char('r'), _) => app.reload_report(),

        // Highlights
        (KeyCode::Char(c @ '1'..='4'), _) => {
            let idx = (c as usize) - ('1' as usize);
            app.toggle_highlight(HighlightCategory::ALL[idx]);
        }

        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        std::fs::write(
            &path,
            r#"[{"filepath": "d", "filename": "d", "description": "dir",
                 "children": [{"filepath": "d/a.exe", "filename": "a.exe"},
                              {"filepath": "d/b.txt", "filename": "b.txt"}]}]"#,
        )
        .unwrap();
        let app = App::new(path, false, &Config::default()).unwrap();
        (dir, app)
    }

    #[test]
    fn test_quit_keys() {
        let (_dir, mut app) = app();
        assert!(handle_event(&mut app, key(KeyCode::Char('q'))));
        assert!(handle_event(&mut app, key(KeyCode::Esc)));
        assert!(app.confirmed.is_none());
    }

    #[test]
    fn test_enter_confirms_selection() {
        let (_dir, mut app) = app();
        assert!(handle_event(&mut app, key(KeyCode::Enter)));
        let names: Vec<_> = app.confirmed.unwrap().into_iter().map(|s| s.filename).collect();
        assert_eq!(names, vec!["a.exe"]);
    }

    #[test]
    fn test_navigation_and_check() {
        let (_dir, mut app) = app();
        handle_event(&mut app, key(KeyCode::Char('j')));
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.widget().cursor(), 2);
        handle_event(&mut app, key(KeyCode::Char(' ')));
        let names: Vec<_> = app.tree.selected().into_iter().map(|s| s.filename).collect();
        assert_eq!(names, vec!["d", "a.exe", "b.txt"]);

        handle_event(&mut app, key(KeyCode::Char('h')));
        assert_eq!(app.widget().cursor(), 0);
        handle_event(&mut app, key(KeyCode::Char('h')));
        assert_eq!(app.widget().rows().len(), 1);
    }

    #[test]
    fn test_filter_and_highlight_keys() {
        let (_dir, mut app) = app();
        handle_event(&mut app, key(KeyCode::Char('s')));
        assert!(!app.tree.filters().simplify_magic);
        handle_event(&mut app, key(KeyCode::Char('d')));
        assert!(!app.tree.filters().deselect_duplicates);
        handle_event(&mut app, key(KeyCode::Char('2')));
        assert!(app.highlights.contains(&HighlightCategory::Exec));
    }

    #[test]
    fn test_help_swallows_keys() {
        let (_dir, mut app) = app();
        handle_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        assert!(!handle_event(&mut app, key(KeyCode::Char('j'))));
        assert_eq!(app.widget().cursor(), 0);
        assert!(!handle_event(&mut app, key(KeyCode::Char('q'))));
        assert!(!app.show_help);
    }
}
