use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(reply) => app.receive_reply(reply),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on every screen
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return;
    }

    if app.session.is_configured() {
        handle_chat_key(app, key);
    } else {
        handle_config_key(app, key);
    }
}

/// Configuration form: provider picker plus a masked credential field.
fn handle_config_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let cursor = &mut app.credential_cursor;
    match key.code {
        KeyCode::Enter => app.save_configuration(),
        KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => app.cycle_provider(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Backspace => cursor.backspace(app.session.credential_mut()),
        KeyCode::Delete => cursor.delete(app.session.credential_mut()),
        KeyCode::Left => cursor.left(app.session.credential()),
        KeyCode::Right => cursor.right(app.session.credential()),
        KeyCode::Home => cursor.home(),
        KeyCode::End => cursor.end(app.session.credential()),
        KeyCode::Char(c) if !ctrl => cursor.insert(app.session.credential_mut(), c),
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('x') if ctrl => app.clear_configuration(),
        KeyCode::Char('u') if ctrl => {
            let half = app.half_page();
            app.scroll_up(half);
        }
        KeyCode::Char('d') if ctrl => {
            let half = app.half_page();
            app.scroll_down(half);
        }
        KeyCode::PageUp => {
            let page = app.chat_height.max(1);
            app.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.chat_height.max(1);
            app.scroll_down(page);
        }
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),

        // Alt+Enter inserts a line break; the input is disabled while awaiting
        KeyCode::Enter if alt => {
            if !app.session.is_pending() {
                app.input_cursor.insert(app.session.input_mut(), '\n');
            }
        }
        KeyCode::Enter => app.submit(),
        _ if app.session.is_pending() => {}

        KeyCode::Backspace => app.input_cursor.backspace(app.session.input_mut()),
        KeyCode::Delete => app.input_cursor.delete(app.session.input_mut()),
        KeyCode::Left => app.input_cursor.left(app.session.input()),
        KeyCode::Right => app.input_cursor.right(app.session.input()),
        KeyCode::Home => app.input_cursor.home(),
        KeyCode::End => app.input_cursor.end(app.session.input()),
        KeyCode::Char(c) if !ctrl => app.input_cursor.insert(app.session.input_mut(), c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_chat_core::{ChatRole, FileStore, KeyValueStore, OpenAIClient, Provider, SessionState};
    use folio_chat_core::ChatSession;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    fn test_app(dir: &tempfile::TempDir) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let store = FileStore::open(dir.path().join("storage.json")).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        // Nothing listens here; only the unsupported provider is submitted in tests
        let backend = OpenAIClient::with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        (App::new(ChatSession::mount(store), backend, tx), rx)
    }

    #[test]
    fn typing_a_key_and_pressing_enter_configures() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);

        type_text(&mut app, "sk-test");
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.session.state(), SessionState::Idle);
        assert_eq!(app.session.store().get("llm_api_key").as_deref(), Some("sk-test"));
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn enter_with_empty_key_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.session.state(), SessionState::Unconfigured);
        assert_eq!(app.session.last_error(), Some("Please enter your API key"));
        assert!(!dir.path().join("storage.json").exists());
    }

    #[test]
    fn arrow_keys_cycle_provider_before_configuring() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.session.provider(), Provider::Anthropic);
        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.session.provider(), Provider::OpenAI);
    }

    #[tokio::test]
    async fn submit_round_trips_through_the_event_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut rx) = test_app(&dir);

        handle_event(&mut app, key(KeyCode::Down)); // Anthropic: fails without network
        type_text(&mut app, "sk-test");
        handle_event(&mut app, key(KeyCode::Enter));

        type_text(&mut app, "hi");
        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.session.state(), SessionState::Awaiting);
        assert_eq!(app.session.input(), "");

        // Typing is ignored while the request is in flight
        type_text(&mut app, "more");
        assert_eq!(app.session.input(), "");

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event);

        assert_eq!(app.session.state(), SessionState::Error);
        let roles: Vec<ChatRole> = app.session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]);
        assert!(app.session.messages()[2].content.contains("coming soon"));
    }

    #[test]
    fn ctrl_x_clears_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);
        type_text(&mut app, "sk-test");
        handle_event(&mut app, key(KeyCode::Enter));

        handle_event(&mut app, ctrl('x'));

        assert_eq!(app.session.state(), SessionState::Unconfigured);
        assert!(app.session.messages().is_empty());
        let reopened = FileStore::open(dir.path().join("storage.json")).unwrap();
        assert!(reopened.get("llm_api_key").is_none());
        assert!(reopened.get("llm_provider").is_none());
    }

    #[test]
    fn ctrl_c_quits_from_any_screen() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn alt_enter_adds_a_line_break() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(&dir);
        type_text(&mut app, "sk-test");
        handle_event(&mut app, key(KeyCode::Enter));

        type_text(&mut app, "a");
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
        type_text(&mut app, "b");

        assert_eq!(app.session.input(), "a\nb");
        assert_eq!(app.session.messages().len(), 1);
    }
}
