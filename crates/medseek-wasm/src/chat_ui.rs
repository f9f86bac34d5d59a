use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use medseek_chat::{ChatSession, ClientConfig, ConnectionState, FrameOutcome};
use medseek_types::{Message, MessageKind, Session, SpecialtyInfo};
use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::api::ApiClient;
use crate::dom::{self, EventListener};
use crate::markdown;
use crate::utils::escape_html;
use crate::viewport::{self, BottomScroller, KeyboardSubscription};
use crate::websocket::{self, WsReceiver, WsSender};

/// Called once the session has been ended and its socket closed
pub type SessionClosed = Rc<dyn Fn()>;

/// Mounted chat window. Dropping it unmounts the view and closes the socket.
pub struct ChatView {
    inner: Rc<ChatInner>,
    _listeners: Vec<EventListener>,
    _keyboard: Option<KeyboardSubscription>,
}

struct ChatInner {
    document: Document,
    api: Rc<ApiClient>,
    connect_timeout_ms: u32,
    state: RefCell<ChatSession>,
    sender: RefCell<Option<WsSender>>,
    on_closed: SessionClosed,
    mounted: Cell<bool>,
    scroller: BottomScroller,
}

impl ChatView {
    pub fn mount(
        document: &Document,
        root: &web_sys::Element,
        api: Rc<ApiClient>,
        config: &ClientConfig,
        session: Session,
        on_closed: SessionClosed,
    ) -> Result<Self, JsValue> {
        root.set_inner_html(&render_shell(&session));

        let inner = Rc::new(ChatInner {
            document: document.clone(),
            api,
            connect_timeout_ms: config.connect_timeout_ms,
            state: RefCell::new(ChatSession::with_config(session, config)),
            sender: RefCell::new(None),
            on_closed,
            mounted: Cell::new(true),
            scroller: BottomScroller::default(),
        });
        inner.render()?;

        let mut listeners = Vec::new();

        let form = dom::get_element_by_id(document, "messageForm")?;
        {
            let inner = inner.clone();
            listeners.push(EventListener::new(form.as_ref(), "submit", move |event| {
                event.prevent_default();
                let inner = inner.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = send_message_handler(inner).await {
                        log::error!("Failed to send message: {:?}", e);
                    }
                });
            })?);
        }

        let close_btn = dom::get_element_by_id(document, "closeButton")?;
        {
            let inner = inner.clone();
            listeners.push(EventListener::new(close_btn.as_ref(), "click", move |_| {
                let inner = inner.clone();
                wasm_bindgen_futures::spawn_local(end_session_handler(inner));
            })?);
        }

        let window = crate::window()?;
        let keyboard = {
            let inner = inner.clone();
            viewport::on_keyboard_toggle(&window, move |event| {
                log::debug!("Keyboard {}, scrolling messages", event.name());
                inner.scroll_messages(false);
            })?
        };

        wasm_bindgen_futures::spawn_local(run(inner.clone()));

        Ok(Self {
            inner,
            _listeners: listeners,
            _keyboard: keyboard,
        })
    }
}

impl Drop for ChatView {
    fn drop(&mut self) {
        self.inner.mounted.set(false);
        self.inner.scroller.cancel();

        let socket_open = {
            let mut state = self.inner.state.borrow_mut();
            if state.is_closing() {
                return;
            }
            state.begin_close()
        };
        // Unmounted without ending the session; only an open socket needs closing
        if socket_open {
            if let Some(mut sender) = self.inner.sender.borrow_mut().take() {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = sender.close().await {
                        log::warn!("{}", e);
                    }
                });
            }
        }
    }
}

/// Socket lifecycle: load history, connect, pump frames, reconnect with backoff
async fn run(inner: Rc<ChatInner>) {
    let session = inner.state.borrow().session().clone();

    match inner.api.get_session_messages(&session.session_id).await {
        Ok(history) => {
            let added = inner.state.borrow_mut().load_history(history);
            if added > 0 {
                log::info!("Loaded {} earlier messages", added);
                inner.render_or_log();
            }
        }
        Err(e) => log::warn!("{}", e),
    }

    loop {
        if !inner.state.borrow_mut().on_connecting() {
            break;
        }
        inner.render_or_log();

        let connected = match inner.api.socket_url(&session.session_id, &session.user_id) {
            Ok(url) => websocket::connect(&url, inner.connect_timeout_ms).await,
            Err(e) => Err(e),
        };

        match connected {
            Ok((mut sender, mut receiver)) => {
                if inner.state.borrow().is_closing() {
                    // Session ended while the socket was opening
                    if let Err(e) = sender.close().await {
                        log::warn!("{}", e);
                    }
                    break;
                }
                *inner.sender.borrow_mut() = Some(sender);
                inner.state.borrow_mut().on_open();
                inner.render_or_log();

                message_loop(&inner, &mut receiver).await;
                inner.sender.borrow_mut().take();
            }
            Err(e) => log::error!("{}", e),
        }

        let delay = inner.state.borrow_mut().on_disconnect();
        inner.render_or_log();
        match delay {
            Some(delay_ms) => TimeoutFuture::new(delay_ms).await,
            None => break,
        }
    }

    log::info!("Chat connection finished for session {}", session.session_id);
}

async fn message_loop(inner: &Rc<ChatInner>, receiver: &mut WsReceiver) {
    loop {
        match receiver.receive().await {
            Ok(Some(text)) => {
                let outcome = inner.state.borrow_mut().on_frame(&text);
                // Any parsed frame may have cleared the waiting flag
                if !matches!(outcome, FrameOutcome::Malformed(_)) {
                    inner.render_or_log();
                }
            }
            Ok(None) => return,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        }
    }
}

async fn send_message_handler(inner: Rc<ChatInner>) -> Result<(), JsValue> {
    let input = dom::get_input_by_id(&inner.document, "messageInput")?;
    let text = input.value();

    let frame = inner.state.borrow_mut().prepare_send(&text);
    let Some(frame) = frame else {
        return Ok(());
    };

    input.set_value("");
    inner.render()?;

    let sender = inner.sender.borrow_mut().take();
    let Some(mut sender) = sender else {
        log::warn!("No open socket to send on");
        return Ok(());
    };

    if let Err(e) = sender.send(&frame).await {
        // The receiver sees the broken socket and drives the reconnect
        log::error!("{}", e);
    }

    if inner.state.borrow().is_closing() {
        if let Err(e) = sender.close().await {
            log::warn!("{}", e);
        }
    } else {
        let mut slot = inner.sender.borrow_mut();
        if slot.is_none() {
            *slot = Some(sender);
        }
    }

    Ok(())
}

/// End the consultation from the header button
async fn end_session_handler(inner: Rc<ChatInner>) {
    let api = inner.api.clone();
    let ui = inner.clone();
    let ended = medseek_chat::end_session(
        &inner.state,
        |session_id| async move {
            ui.render_or_log();
            api.close_session(&session_id).await
        },
        || {
            let sender = inner.sender.borrow_mut().take();
            async move {
                match sender {
                    Some(mut sender) => sender.close().await,
                    None => Ok(()),
                }
            }
        },
        || (inner.on_closed)(),
    )
    .await;

    if !ended {
        log::debug!("Session already ending");
    }
}

impl ChatInner {
    fn render_or_log(&self) {
        if let Err(e) = self.render() {
            log::error!("Failed to render chat: {:?}", e);
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        if !self.mounted.get() {
            return Ok(());
        }
        self.render_status()?;
        self.render_messages()?;
        self.render_controls()
    }

    fn render_status(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        let status = dom::get_element_by_id(&self.document, "connectionStatus")?;
        let class = match state.connection() {
            ConnectionState::Open => "connected",
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => "connecting",
            ConnectionState::Closed => "disconnected",
        };
        status.set_class_name(&format!("status-indicator {}", class));
        dom::set_text_content(&status, &state.status_label());
        Ok(())
    }

    fn render_messages(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        let info = state.session().specialty_info();
        let container = dom::get_element_by_id(&self.document, "messagesContainer")?;

        let mut html = String::new();
        if state.messages().is_empty() {
            html.push_str(&render_welcome(info));
        }
        for msg in state.messages() {
            html.push_str(&render_message(info, msg));
        }
        if state.is_waiting() {
            html.push_str(&render_typing(info));
        }
        container.set_inner_html(&html);
        drop(state);

        self.scroll_messages(true);
        Ok(())
    }

    fn render_controls(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        let can_send = state.can_send();

        dom::get_input_by_id(&self.document, "messageInput")?.set_disabled(!can_send);

        let send = dom::get_button_by_id(&self.document, "sendButton")?;
        send.set_disabled(!can_send);
        send.set_text_content(Some(if state.is_waiting() { "Sending..." } else { "Send" }));

        dom::get_button_by_id(&self.document, "closeButton")?.set_disabled(state.is_closing());
        Ok(())
    }

    /// Keep the newest entry visible
    fn scroll_messages(&self, smooth: bool) {
        if !self.mounted.get() {
            return;
        }
        if let Ok(container) = dom::get_element_by_id(&self.document, "messagesContainer") {
            self.scroller.scroll(&container, smooth);
        }
    }
}

fn render_shell(session: &Session) -> String {
    let info = session.specialty_info();
    format!(
        r#"
        <div class="chat-window">
          <div class="chat-header">
            <div class="header-content">
              <h1>{emoji} MedSeek {title} Consultation</h1>
              <p class="user-info">Session with {user}</p>
            </div>
            <div class="header-status">
              <span id="connectionStatus" class="status-indicator connecting"></span>
              <button type="button" id="closeButton" class="close-button">End Session</button>
            </div>
          </div>
          <div class="messages-container" id="messagesContainer"></div>
          <form id="messageForm" class="message-form">
            <input type="text" id="messageInput" class="message-input" autocomplete="off"
                   placeholder="Describe your symptoms or ask a medical question...">
            <button type="submit" id="sendButton" class="send-button">Send</button>
          </form>
        </div>
        "#,
        emoji = info.emoji,
        title = escape_html(info.title),
        user = escape_html(&session.user_id),
    )
}

fn render_welcome(info: &SpecialtyInfo) -> String {
    let guidelines: String = info
        .guidelines
        .iter()
        .map(|line| format!("<li>{}</li>", escape_html(line)))
        .collect();
    format!(
        r#"<div class="welcome-message"><h2>{}</h2><p>{}</p><div class="guidelines"><h3>Guidelines:</h3><ul>{}</ul></div></div>"#,
        escape_html(info.welcome),
        escape_html(info.description),
        guidelines
    )
}

fn render_message(info: &SpecialtyInfo, msg: &Message) -> String {
    if msg.kind == MessageKind::Error {
        return format!(
            r#"<div class="message error-message"><div class="message-content"><span class="message-role">⚠️ Error</span><p>{}</p></div></div>"#,
            escape_html(&msg.content)
        );
    }

    let assistant = msg.is_from_assistant();
    let (class, role) = if assistant {
        ("assistant-message", format!("{} {}", info.emoji, info.doctor_role))
    } else {
        ("user-message", "👤 You".to_string())
    };
    let markdown_class = if assistant { " markdown" } else { "" };

    format!(
        r#"<div class="message {}"><div class="message-content"><span class="message-role">{}</span><div class="message-text{}">{}</div></div></div>"#,
        class,
        escape_html(&role),
        markdown_class,
        markdown::render_message_content(&msg.content, assistant)
    )
}

fn render_typing(info: &SpecialtyInfo) -> String {
    format!(
        r#"<div class="message assistant-message"><div class="message-content"><span class="message-role">{} {}</span><p class="typing-indicator"><span></span><span></span><span></span></p></div></div>"#,
        info.emoji,
        escape_html(info.doctor_role)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use medseek_types::Specialty;

    #[test]
    fn test_assistant_reply_is_rendered_as_markdown() {
        let info = Specialty::Pediatrics.info();
        let html = render_message(info, &Message::from_assistant("**rest** well"));
        assert!(html.contains("assistant-message"));
        assert!(html.contains("👶 Pediatrician"));
        assert!(html.contains("<strong>rest</strong>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let info = SpecialtyInfo::general();
        let html = render_message(info, &Message::from_user("a@b.com", "<b>pain</b>\nsince monday"));
        assert!(html.contains("user-message"));
        assert!(html.contains("&lt;b&gt;pain&lt;/b&gt;<br>since monday"));
    }

    #[test]
    fn test_error_frames_render_as_errors() {
        let msg = Message {
            kind: MessageKind::Error,
            content: "Error processing message".to_string(),
            user_id: None,
        };
        let html = render_message(SpecialtyInfo::general(), &msg);
        assert!(html.contains("error-message"));
        assert!(html.contains("Error processing message"));
    }

    #[test]
    fn test_welcome_lists_guidelines() {
        let info = SpecialtyInfo::general();
        let html = render_welcome(info);
        assert!(html.contains("Welcome to MedSeek"));
        assert_eq!(html.matches("<li>").count(), info.guidelines.len());
    }

    #[test]
    fn test_shell_escapes_user_id() {
        let session = Session::new("s1", "<x>@b.com", Some(Specialty::Dermatology));
        let html = render_shell(&session);
        assert!(html.contains("Session with &lt;x&gt;@b.com"));
        assert!(html.contains("Dermatology"));
    }
}
