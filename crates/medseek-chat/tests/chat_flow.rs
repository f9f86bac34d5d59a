use std::cell::RefCell;

use futures::executor::block_on;
use medseek_chat::{
    end_session, socket_url, AppState, ChatSession, ClientConfig, ConnectionState, EchoPolicy,
    FrameOutcome, SetupForm, SetupState,
};
use medseek_types::{ClientError, CreateSessionResponse, Message, Specialty};

fn create_session(state: &mut SetupState, app: &mut AppState) {
    let form = SetupForm {
        name: "Ann".to_string(),
        contact: "a@b.com".to_string(),
        specialty: Specialty::Pediatrics,
    };
    let request = state.submit(&form).expect("form is valid");
    assert_eq!(
        serde_json::to_string(&request).unwrap(),
        r#"{"user_id":"a@b.com","specialty":"pediatrics"}"#
    );

    let response: CreateSessionResponse =
        serde_json::from_str(r#"{"session_id":"s1","status":"active"}"#).unwrap();
    let session = state.finish(&request, Ok(response)).expect("session created");
    app.session_created(session);
}

#[test]
fn test_consultation_round_trip() {
    let config = ClientConfig::default();
    let mut setup = SetupState::default();
    let mut app = AppState::default();

    create_session(&mut setup, &mut app);
    let session = app.session().cloned().expect("chat view is active");
    assert_eq!(
        socket_url("http:", "localhost", &config.ws_path, &session.session_id, &session.user_id),
        "ws://localhost/ws?session_id=s1&user_id=a@b.com"
    );

    let mut chat = ChatSession::with_config(session, &config);
    chat.on_open();

    let frame = chat.prepare_send("hello").expect("connected and idle");
    assert_eq!(frame.to_json().unwrap(), r#"{"type":"message","content":"hello"}"#);
    assert!(chat.is_waiting());

    // Backend echoes the raw frame, then replies
    chat.on_frame(r#"{"type":"message","content":"hello"}"#);
    let outcome = chat.on_frame(
        r#"{"type":"message","content":"hi, how can I help?","user_id":"assistant"}"#,
    );
    assert_eq!(outcome, FrameOutcome::Appended);
    assert_eq!(
        chat.messages().last(),
        Some(&Message::from_assistant("hi, how can I help?"))
    );
    assert!(!chat.is_waiting());
    assert_eq!(chat.messages().len(), 2);
}

#[test]
fn test_optimistic_echo_shows_message_once() {
    let config = ClientConfig {
        echo_policy: EchoPolicy::Optimistic,
        ..ClientConfig::default()
    };
    let mut setup = SetupState::default();
    let mut app = AppState::default();
    create_session(&mut setup, &mut app);

    let mut chat = ChatSession::with_config(app.session().cloned().unwrap(), &config);
    chat.on_open();
    chat.prepare_send("hello").unwrap();
    chat.on_frame(r#"{"type":"message","content":"hello"}"#);
    chat.on_frame(r#"{"type":"message","content":"hi","user_id":"assistant"}"#);

    let contents: Vec<&str> = chat.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hello", "hi"]);
}

#[test]
fn test_ending_session_clears_state_even_when_close_fails() {
    let mut setup = SetupState::default();
    let mut app = AppState::default();
    create_session(&mut setup, &mut app);

    let chat = RefCell::new(ChatSession::with_config(
        app.session().cloned().unwrap(),
        &ClientConfig::default(),
    ));
    chat.borrow_mut().on_open();
    chat.borrow_mut().prepare_send("hello").unwrap();

    let app = RefCell::new(app);
    let ended = block_on(end_session(
        &chat,
        |_| async { Err(ClientError::network("Failed to close session", "HTTP 404")) },
        || async { Ok(()) },
        || app.borrow_mut().session_closed(),
    ));

    assert!(ended);
    assert_eq!(*app.borrow(), AppState::Setup);

    // The socket loop sees the close and must not schedule a reconnect
    let mut chat = chat.into_inner();
    assert_eq!(chat.on_disconnect(), None);
    assert_eq!(chat.connection(), ConnectionState::Closed);
    assert!(!chat.is_waiting());
}

#[test]
fn test_validation_failure_never_creates_session() {
    let mut setup = SetupState::default();
    let app = AppState::default();
    let form = SetupForm {
        name: String::new(),
        contact: "a@b.com".to_string(),
        specialty: Specialty::default(),
    };
    assert!(setup.submit(&form).is_none());
    assert_eq!(setup.error(), Some("Please fill in all fields"));
    assert_eq!(app, AppState::Setup);
}
