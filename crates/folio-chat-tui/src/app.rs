use std::sync::Arc;

use folio_chat_core::{ChatSession, FileStore, OpenAIClient, Reply};
use tokio::sync::mpsc::UnboundedSender;

use crate::input::Cursor;
use crate::tui::AppEvent;

pub struct App {
    pub should_quit: bool,
    pub session: ChatSession<FileStore>,
    pub backend: Arc<OpenAIClient>,
    events: UnboundedSender<AppEvent>,

    // Text field cursors (the buffers live in the session)
    pub credential_cursor: Cursor,
    pub input_cursor: Cursor,

    // Chat scrolling
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16, // Inner height of the chat area, set on render
    pub chat_width: u16,  // Inner width of the chat area, set on render

    pub animation_frame: u8,
}

impl App {
    pub fn new(session: ChatSession<FileStore>, backend: OpenAIClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            session,
            backend: Arc::new(backend),
            events,
            credential_cursor: Cursor::default(),
            input_cursor: Cursor::default(),
            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
        }
    }

    pub fn cycle_provider(&mut self) {
        let next = self.session.provider().next();
        self.session.set_provider(next);
    }

    pub fn save_configuration(&mut self) {
        if self.session.save_configuration().is_ok() {
            self.credential_cursor.home();
            self.input_cursor.home();
            self.follow_tail = true;
        }
    }

    pub fn clear_configuration(&mut self) {
        // Storage failures are already shown through the session's error line
        let _ = self.session.clear_configuration();
        self.credential_cursor.home();
        self.input_cursor.home();
        self.chat_scroll = 0;
        self.follow_tail = true;
    }

    /// Starts a request for the current draft on a background task. Does
    /// nothing if the session refuses the submit.
    pub fn submit(&mut self) {
        let request = match self.session.begin_submit() {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(reason = %err, "submit ignored");
                return;
            }
        };

        self.input_cursor.home();
        self.follow_tail = true;

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let reply = request.send(backend.as_ref()).await;
            // The receiver is gone only when the app is shutting down
            let _ = events.send(AppEvent::Reply(reply));
        });
    }

    pub fn receive_reply(&mut self, reply: Reply) {
        if self.session.complete(reply) {
            self.follow_tail = true;
        }
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
