use std::sync::Arc;

use harbor_watch_core::{BackendAdapter, BackendError, BackendKind, ChatSession, ExchangeOutcome};
use tokio::task::JoinHandle;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // Chat state - the session owns transcript, input, loading, and visibility
    pub session: ChatSession,
    pub adapter: Arc<dyn BackendAdapter>,
    pub backend: BackendKind,
    pub input_cursor: usize, // cursor position in chars
    pub exchange_task: Option<JoinHandle<ExchangeOutcome>>,

    // Chat panel layout (updated during render)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(
        adapter: Arc<dyn BackendAdapter>,
        backend: BackendKind,
        greeting: Option<&str>,
        context: Option<String>,
    ) -> Self {
        let mut session = match greeting {
            Some(greeting) => ChatSession::with_greeting(greeting),
            None => ChatSession::new(),
        };
        session.set_context(context);

        Self {
            should_quit: false,
            session,
            adapter,
            backend,
            input_cursor: 0,
            exchange_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
        }
    }

    pub fn toggle_chat(&mut self) {
        self.session.toggle();
        if self.session.is_open() {
            self.scroll_chat_to_bottom();
        }
    }

    /// Start an exchange on a background task. Ignored while one is in flight.
    pub fn submit_chat(&mut self) {
        let Some(exchange) = self.session.begin_submit(self.adapter.as_ref()) else {
            return;
        };
        self.input_cursor = 0;
        self.exchange_task = Some(tokio::spawn(exchange.dispatch(self.adapter.clone())));

        // Scroll to bottom so "Thinking..." is visible
        self.scroll_chat_to_bottom();
    }

    /// Hand a finished exchange back to the session.
    pub async fn poll_exchange(&mut self) {
        let finished = self
            .exchange_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.exchange_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(BackendError::interrupted(e.to_string())),
            };
            self.session.finish(outcome);
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// The input line is read-only while a reply is pending.
    pub fn input_locked(&self) -> bool {
        self.session.is_loading()
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        if self.input_locked() {
            return;
        }
        let mut input = self.session.pending_input().to_string();
        let byte_pos = char_to_byte_index(&input, self.input_cursor);
        input.insert(byte_pos, c);
        self.session.update_input(input);
        self.input_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.input_cursor > 0 && !self.input_locked() {
            self.input_cursor -= 1;
            let mut input = self.session.pending_input().to_string();
            let byte_pos = char_to_byte_index(&input, self.input_cursor);
            input.remove(byte_pos);
            self.session.update_input(input);
        }
    }

    pub fn delete(&mut self) {
        if self.input_locked() {
            return;
        }
        let mut input = self.session.pending_input().to_string();
        if self.input_cursor < input.chars().count() {
            let byte_pos = char_to_byte_index(&input, self.input_cursor);
            input.remove(byte_pos);
            self.session.update_input(input);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.pending_input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.session.pending_input().chars().count();
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Scroll chat to bottom so the newest turn is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.transcript() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = u16::try_from(char_count / wrap_width + 1).unwrap_or(u16::MAX);
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.session.is_loading() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            16
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use harbor_watch_core::prompt::ERROR_REPLY;
    use harbor_watch_core::{ChatMessage, ChatRequest};

    struct EchoAdapter;

    #[async_trait]
    impl BackendAdapter for EchoAdapter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn send(&self, request: ChatRequest<'_>) -> ExchangeOutcome {
            Ok(request.latest_user_text().map(|t| format!("echo: {}", t)))
        }
    }

    struct PanickingAdapter;

    #[async_trait]
    impl BackendAdapter for PanickingAdapter {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn send(&self, _request: ChatRequest<'_>) -> ExchangeOutcome {
            panic!("adapter blew up");
        }
    }

    fn app_with(adapter: Arc<dyn BackendAdapter>) -> App {
        App::new(adapter, BackendKind::Proxy, None, Some("Tide 1.2m rising".to_string()))
    }

    async fn wait_for_exchange(app: &mut App) {
        while app.exchange_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_exchange().await;
        }
    }

    #[test]
    fn editing_is_utf8_safe() {
        let mut app = app_with(Arc::new(EchoAdapter));
        for c in "tíde".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.cursor_left();
        app.backspace();
        assert_eq!(app.session.pending_input(), "tde");
        app.cursor_home();
        app.delete();
        assert_eq!(app.session.pending_input(), "de");
        app.cursor_end();
        assert_eq!(app.input_cursor, 2);
        app.cursor_right();
        assert_eq!(app.input_cursor, 2);
    }

    #[tokio::test]
    async fn submit_runs_in_background_and_finishes_on_poll() {
        let mut app = app_with(Arc::new(EchoAdapter));
        for c in "swell?".chars() {
            app.insert_char(c);
        }
        app.submit_chat();

        assert!(app.session.is_loading());
        assert_eq!(app.input_cursor, 0);
        assert_eq!(app.session.pending_input(), "");

        // Input is locked until the reply lands
        app.insert_char('x');
        app.backspace();
        app.delete();
        app.submit_chat();
        assert_eq!(app.session.pending_input(), "");
        assert_eq!(app.input_cursor, 0);
        assert_eq!(app.session.transcript().len(), 1);

        wait_for_exchange(&mut app).await;
        assert!(!app.session.is_loading());
        assert_eq!(
            app.session.transcript(),
            &[ChatMessage::user("swell?"), ChatMessage::assistant("echo: swell?")]
        );

        app.insert_char('x');
        assert_eq!(app.session.pending_input(), "x");
    }

    #[test]
    fn scroll_saturates_on_huge_transcripts() {
        let mut app = app_with(Arc::new(EchoAdapter));
        let huge = "w".repeat(5_000_000);
        app.chat_width = 1;
        app.chat_height = 10;
        app.session = ChatSession::with_greeting(&huge);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX - 10);
    }

    #[tokio::test]
    async fn panicked_task_becomes_error_reply() {
        let mut app = app_with(Arc::new(PanickingAdapter));
        app.insert_char('?');
        app.submit_chat();
        wait_for_exchange(&mut app).await;

        assert!(!app.session.is_loading());
        assert_eq!(
            app.session.transcript().last(),
            Some(&ChatMessage::assistant(ERROR_REPLY))
        );
    }
}
