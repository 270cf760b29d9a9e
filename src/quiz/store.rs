use std::collections::HashMap;
use std::sync::Mutex;

use super::QuizSession;

/// In-memory chat id → session map. One session per chat; a new quiz simply
/// overwrites the old one. Nothing survives a restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, QuizSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, chat_id: i64, session: QuizSession) {
        self.sessions.lock().unwrap().insert(chat_id, session);
    }

    /// Runs `f` on the chat's session while holding the store lock, so two
    /// rapid taps from the same chat are scored one after the other. Returns
    /// `None` when the chat has no session.
    pub fn with_session<T>(&self, chat_id: i64, f: impl FnOnce(&mut QuizSession) -> T) -> Option<T> {
        self.sessions.lock().unwrap().get_mut(&chat_id).map(f)
    }

    pub fn remove(&self, chat_id: i64) {
        self.sessions.lock().unwrap().remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::super::Question;
    use super::*;

    fn session(text: &str) -> QuizSession {
        let question = Question::new(
            text,
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            0,
            "e",
        )
        .unwrap();
        QuizSession::new(vec![question])
    }

    #[test]
    fn put_then_with_session_finds_it() {
        let store = SessionStore::new();
        store.put(7, session("uno"));
        let text = store.with_session(7, |s| s.current_question().unwrap().text().to_string());
        assert_eq!(text.as_deref(), Some("uno"));
    }

    #[test]
    fn put_overwrites_existing_session() {
        let store = SessionStore::new();
        store.put(7, session("uno"));
        store.put(7, session("dos"));
        let text = store.with_session(7, |s| s.current_question().unwrap().text().to_string());
        assert_eq!(text.as_deref(), Some("dos"));
    }

    #[test]
    fn with_session_on_unknown_chat_is_none() {
        let store = SessionStore::new();
        assert!(store.with_session(42, |_| ()).is_none());
    }

    #[test]
    fn remove_is_fine_when_absent() {
        let store = SessionStore::new();
        store.remove(42);
        store.put(7, session("uno"));
        store.remove(7);
        assert!(store.with_session(7, |_| ()).is_none());
    }
}
