use medseek_types::Session;

/// Which view the app shell shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppState {
    #[default]
    Setup,
    Chat(Session),
}

impl AppState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AppState::Setup => None,
            AppState::Chat(session) => Some(session),
        }
    }

    pub fn session_created(&mut self, session: Session) {
        if let AppState::Chat(current) = self {
            log::warn!(
                "Replacing active session {} with {}",
                current.session_id,
                session.session_id
            );
        }
        *self = AppState::Chat(session);
    }

    /// Always returns to the setup form, whatever happened to the backend call
    pub fn session_closed(&mut self) {
        *self = AppState::Setup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medseek_types::Specialty;

    #[test]
    fn test_created_then_closed() {
        let mut state = AppState::default();
        assert_eq!(state.session(), None);

        state.session_created(Session::new("s1", "a@b.com", Some(Specialty::Pediatrics)));
        let session = state.session().unwrap();
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.user_id, "a@b.com");

        state.session_closed();
        assert_eq!(state, AppState::Setup);
    }
}
