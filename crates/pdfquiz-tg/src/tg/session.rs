use parking_lot::Mutex;
use std::collections::HashMap;
use teloxide::types::UserId;

/// Text of an accepted PDF that waits for the user to say how many
/// questions to generate from it.
struct Session {
    pending_text: String,
}

/// Per-user conversation state. A user either has a pending session
/// (waiting for the question count) or is idle.
#[derive(Default)]
pub(crate) struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    /// Starts waiting for the question count. Returns `true` if there was
    /// a pending session that is now replaced.
    pub(crate) fn begin(&self, user: UserId, pending_text: String) -> bool {
        self.sessions
            .lock()
            .insert(user, Session { pending_text })
            .is_some()
    }

    /// Ends the session and hands out its text
    pub(crate) fn take(&self, user: UserId) -> Option<String> {
        self.sessions
            .lock()
            .remove(&user)
            .map(|session| session.pending_text)
    }

    /// Returns `true` if there was a pending session
    pub(crate) fn cancel(&self, user: UserId) -> bool {
        self.sessions.lock().remove(&user).is_some()
    }

    pub(crate) fn is_pending(&self, user: UserId) -> bool {
        self.sessions.lock().contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    #[test]
    fn lifecycle() {
        let store = SessionStore::default();
        assert!(!store.is_pending(ALICE));

        assert!(!store.begin(ALICE, "first".to_owned()));
        assert!(store.is_pending(ALICE));
        assert!(!store.is_pending(BOB));

        assert!(store.begin(ALICE, "second".to_owned()));
        assert_eq!(store.take(ALICE).as_deref(), Some("second"));

        assert!(!store.is_pending(ALICE));
        assert_eq!(store.take(ALICE), None);
    }

    #[test]
    fn cancel() {
        let store = SessionStore::default();
        assert!(!store.cancel(ALICE));

        store.begin(ALICE, "text".to_owned());
        store.begin(BOB, "other".to_owned());

        assert!(store.cancel(ALICE));
        assert!(!store.is_pending(ALICE));
        assert!(store.is_pending(BOB));
    }
}
