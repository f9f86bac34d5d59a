use medseek_types::{ClientError, CreateSessionRequest, CreateSessionResponse, Session, Specialty};

pub const MISSING_FIELDS: &str = "Please fill in all fields";

/// Values entered on the session setup form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub name: String,
    /// Email address or phone number; becomes the session's user id
    pub contact: String,
    pub specialty: Specialty,
}

impl SetupForm {
    pub fn validate(&self) -> Result<CreateSessionRequest, ClientError> {
        if self.name.trim().is_empty() || self.contact.trim().is_empty() {
            return Err(ClientError::Validation(MISSING_FIELDS.to_string()));
        }
        // Blank checks trim; the contact itself is sent exactly as entered
        Ok(CreateSessionRequest {
            user_id: self.contact.clone(),
            specialty: Some(self.specialty),
        })
    }
}

/// Submission state of the setup form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupState {
    busy: bool,
    error: Option<String>,
}

impl SetupState {
    /// Inputs are disabled while a request is in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Inline error text, if the last submission failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a submission. Returns the request to send, or `None` when the
    /// form is invalid or a request is already in flight.
    pub fn submit(&mut self, form: &SetupForm) -> Option<CreateSessionRequest> {
        if self.busy {
            log::debug!("Ignoring submit while a session request is in flight");
            return None;
        }
        self.error = None;
        match form.validate() {
            Ok(request) => {
                self.busy = true;
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Finish a submission started with [`SetupState::submit`]
    pub fn finish(
        &mut self,
        request: &CreateSessionRequest,
        result: Result<CreateSessionResponse, ClientError>,
    ) -> Option<Session> {
        self.busy = false;
        match result {
            Ok(response) => {
                log::info!("Session created: {}", response.session_id);
                Some(Session::new(
                    response.session_id,
                    request.user_id.clone(),
                    request.specialty,
                ))
            }
            Err(e) => {
                log::error!("Failed to create session: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, contact: &str) -> SetupForm {
        SetupForm {
            name: name.to_string(),
            contact: contact.to_string(),
            specialty: Specialty::Pediatrics,
        }
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        for f in [form("", "a@b.com"), form("Ann", ""), form("  ", "a@b.com"), form("", "")] {
            let mut state = SetupState::default();
            assert_eq!(state.submit(&f), None);
            assert_eq!(state.error(), Some(MISSING_FIELDS));
            assert!(!state.is_busy());
        }
    }

    #[test]
    fn test_valid_submit_marks_busy_and_blocks_resubmit() {
        let mut state = SetupState::default();
        let request = state.submit(&form("Ann", "a@b.com")).unwrap();
        assert_eq!(request.user_id, "a@b.com");
        assert_eq!(request.specialty, Some(Specialty::Pediatrics));
        assert!(state.is_busy());
        assert_eq!(state.submit(&form("Ann", "a@b.com")), None);
    }

    #[test]
    fn test_contact_is_sent_as_entered() {
        let mut state = SetupState::default();
        let request = state.submit(&form("Ann", " a@b.com ")).unwrap();
        assert_eq!(request.user_id, " a@b.com ");
    }

    #[test]
    fn test_success_preserves_identifiers() {
        let mut state = SetupState::default();
        let request = state.submit(&form("Ann", "a@b.com")).unwrap();
        let session = state
            .finish(
                &request,
                Ok(CreateSessionResponse {
                    session_id: "s1".to_string(),
                    status: Some("active".to_string()),
                }),
            )
            .unwrap();
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.user_id, "a@b.com");
        assert_eq!(session.specialty, Some(Specialty::Pediatrics));
        assert!(!state.is_busy());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_failure_shows_error_and_reenables_form() {
        let mut state = SetupState::default();
        let request = state.submit(&form("Ann", "a@b.com")).unwrap();
        let err = ClientError::network("Failed to create session", "HTTP 502");
        assert_eq!(state.finish(&request, Err(err)), None);
        assert!(!state.is_busy());
        assert_eq!(state.error(), Some("Failed to create session: HTTP 502"));

        // Resubmitting clears the previous error
        assert!(state.submit(&form("Ann", "a@b.com")).is_some());
        assert_eq!(state.error(), None);
    }
}
