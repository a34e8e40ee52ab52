use patungan_application::ports::{Session, SessionProvider};
use patungan_domain::model::UserId;

/// Session provider with a fixed signed-in user. Stands in for a real
/// authentication layer in tests and the demo binary.
pub struct FixedSessionProvider {
    session: Option<Session>,
}

impl FixedSessionProvider {
    pub fn signed_in(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            session: Some(Session {
                user_id,
                token: token.into(),
            }),
        }
    }

    pub fn signed_out() -> Self {
        Self { session: None }
    }
}

impl SessionProvider for FixedSessionProvider {
    fn current_session(&self) -> Option<Session> {
        self.session.clone()
    }
}
