//! Chat session state machine.
//!
//! Tracks the socket lifecycle of one consultation, the append-only message
//! list and the "waiting for the doctor" flag. The browser view feeds socket
//! events in and renders whatever this reports back.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;

use medseek_types::{ClientError, ClientFrame, CloseAck, Message, MessageKind, Session};

use crate::config::{ClientConfig, EchoPolicy};
use crate::reconnect::{Backoff, ReconnectPolicy};

/// Lifecycle of the session's socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Waiting `delay_ms` before reconnect attempt `attempt` (1-based)
    Reconnecting { attempt: u32, delay_ms: u32 },
    Closed,
}

/// What an inbound frame did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The message list grew by one entry
    Appended,
    /// Server echo of a message already shown optimistically
    EchoSuppressed,
    /// Status or unknown frame, logged only
    Ignored,
    /// Payload could not be parsed; nothing changed
    Malformed(ClientError),
}

pub struct ChatSession {
    session: Session,
    echo_policy: EchoPolicy,
    messages: Vec<Message>,
    connection: ConnectionState,
    waiting: bool,
    backoff: Backoff,
    closing: bool,
    // Optimistically shown messages whose server echo has not arrived yet
    pending_echoes: VecDeque<String>,
}

impl ChatSession {
    pub fn new(session: Session, echo_policy: EchoPolicy, reconnect: ReconnectPolicy) -> Self {
        Self {
            session,
            echo_policy,
            messages: Vec::new(),
            connection: ConnectionState::Connecting,
            waiting: false,
            backoff: Backoff::new(reconnect),
            closing: false,
            pending_echoes: VecDeque::new(),
        }
    }

    pub fn with_config(session: Session, config: &ClientConfig) -> Self {
        Self::new(session, config.echo_policy, config.reconnect)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Open
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// True once the user has ended the session
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Whether the input box should accept a message right now
    pub fn can_send(&self) -> bool {
        self.is_connected() && !self.waiting && !self.closing
    }

    /// Append previously stored messages. Returns how many were added.
    pub fn load_history(&mut self, history: Vec<Message>) -> usize {
        let before = self.messages.len();
        self.messages.extend(
            history
                .into_iter()
                .filter(|m| matches!(m.kind, MessageKind::Message | MessageKind::Error)),
        );
        self.messages.len() - before
    }

    /// A (re)connect attempt is starting. Returns false if the user already
    /// ended the session and no socket should be opened.
    pub fn on_connecting(&mut self) -> bool {
        if self.closing {
            self.connection = ConnectionState::Closed;
            return false;
        }
        self.connection = ConnectionState::Connecting;
        true
    }

    pub fn on_open(&mut self) {
        log::info!("Socket open for session {}", self.session.session_id);
        self.connection = ConnectionState::Open;
        self.backoff.reset();
    }

    /// Build the outbound frame for `text`, or `None` when sending is not
    /// possible (not connected, waiting for a reply, or blank input).
    pub fn prepare_send(&mut self, text: &str) -> Option<ClientFrame> {
        if text.trim().is_empty() {
            return None;
        }
        if !self.can_send() {
            log::debug!(
                "Dropping send: connection={:?} waiting={}",
                self.connection,
                self.waiting
            );
            return None;
        }

        if self.echo_policy == EchoPolicy::Optimistic {
            self.messages
                .push(Message::from_user(self.session.user_id.clone(), text));
            self.pending_echoes.push_back(text.to_string());
        }
        self.waiting = true;

        Some(ClientFrame::Message {
            content: text.to_string(),
        })
    }

    /// Apply one inbound socket payload
    pub fn on_frame(&mut self, text: &str) -> FrameOutcome {
        let mut msg = match Message::parse_frame(text) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("{}", e);
                return FrameOutcome::Malformed(e);
            }
        };

        // Any well-formed frame ends the wait, whatever its kind or sender
        self.waiting = false;

        match msg.kind {
            MessageKind::Message => {
                if msg.is_from_assistant() {
                    self.messages.push(msg);
                    return FrameOutcome::Appended;
                }

                // The backend rebroadcasts the raw client frame, without a sender
                let own = match msg.user_id.as_deref() {
                    None => true,
                    Some(id) => id == self.session.user_id,
                };
                if !own {
                    self.messages.push(msg);
                    return FrameOutcome::Appended;
                }

                if self.echo_policy == EchoPolicy::Optimistic
                    && self.pending_echoes.front() == Some(&msg.content)
                {
                    self.pending_echoes.pop_front();
                    return FrameOutcome::EchoSuppressed;
                }

                msg.user_id = Some(self.session.user_id.clone());
                self.messages.push(msg);
                FrameOutcome::Appended
            }
            MessageKind::Error => {
                log::warn!("Backend error: {}", msg.content);
                self.messages.push(msg);
                FrameOutcome::Appended
            }
            MessageKind::Status => {
                log::info!("Status from backend: {}", msg.content);
                FrameOutcome::Ignored
            }
            MessageKind::Unknown => {
                log::warn!("Unhandled frame: {}", text);
                FrameOutcome::Ignored
            }
        }
    }

    /// The socket errored or closed. Returns the delay before the next
    /// reconnect attempt, or `None` when the session should stay closed.
    pub fn on_disconnect(&mut self) -> Option<u32> {
        self.waiting = false;
        self.pending_echoes.clear();

        if self.closing {
            self.connection = ConnectionState::Closed;
            return None;
        }

        match self.backoff.next_delay() {
            Some(delay_ms) => {
                let attempt = self.backoff.attempts();
                log::info!(
                    "Connection lost. Reconnect attempt {}/{} in {}ms",
                    attempt,
                    self.backoff.max_attempts(),
                    delay_ms
                );
                self.connection = ConnectionState::Reconnecting { attempt, delay_ms };
                Some(delay_ms)
            }
            None => {
                log::warn!("Giving up on reconnecting session {}", self.session.session_id);
                self.connection = ConnectionState::Closed;
                None
            }
        }
    }

    /// The user ended the session. Cancels any pending reconnect and
    /// returns whether a socket is open and needs closing.
    pub fn begin_close(&mut self) -> bool {
        self.closing = true;
        self.is_connected()
    }

    pub fn finish_close(&mut self) {
        self.closing = true;
        self.waiting = false;
        self.connection = ConnectionState::Closed;
    }

    /// Text for the header status indicator
    pub fn status_label(&self) -> String {
        match self.connection {
            ConnectionState::Open => "● Connected".to_string(),
            ConnectionState::Connecting => "● Connecting...".to_string(),
            ConnectionState::Reconnecting { attempt, .. } => {
                format!("● Reconnecting ({}/{})", attempt, self.backoff.max_attempts())
            }
            ConnectionState::Closed => "● Disconnected".to_string(),
        }
    }
}

/// End the consultation. Cleanup is best effort: a failed close call or
/// socket close is logged and `on_closed` still runs.
///
/// `close_session` receives the session id; `close_socket` runs after the
/// close call settles. Returns false if the session was already being ended.
pub async fn end_session<C, CF, S, SF>(
    chat: &RefCell<ChatSession>,
    close_session: C,
    close_socket: S,
    on_closed: impl FnOnce(),
) -> bool
where
    C: FnOnce(String) -> CF,
    CF: Future<Output = Result<CloseAck, ClientError>>,
    S: FnOnce() -> SF,
    SF: Future<Output = Result<(), ClientError>>,
{
    let session_id = {
        let mut state = chat.borrow_mut();
        if state.is_closing() {
            return false;
        }
        state.begin_close();
        state.session().session_id.clone()
    };

    match close_session(session_id.clone()).await {
        Ok(ack) => log::info!("Session {} closed: {}", session_id, ack.status),
        Err(e) => log::error!("{}", e),
    }

    if let Err(e) = close_socket().await {
        log::warn!("{}", e);
    }

    chat.borrow_mut().finish_close();
    on_closed();
    true
}
