use std::cell::RefCell;
use std::rc::Rc;

use medseek_chat::{AppState, ClientConfig};
use medseek_types::Session;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::api::ApiClient;
use crate::chat_ui::{ChatView, SessionClosed};
use crate::dom;
use crate::session_setup::{SessionCreated, SessionSetupView};
use crate::viewport::PlatformAdapter;

// Views are held only so their listeners and sockets live until replaced
#[allow(dead_code)]
enum View {
    Setup(SessionSetupView),
    Chat(ChatView),
}

/// App shell: shows the setup form until a session exists, then the chat
pub struct App {
    document: Document,
    root: Element,
    config: ClientConfig,
    api: Rc<ApiClient>,
    state: RefCell<AppState>,
    view: RefCell<Option<View>>,
    _platform: Option<PlatformAdapter>,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Rc<Self>, JsValue> {
        let window = crate::window()?;
        let document = crate::document()?;
        let root = dom::get_element_by_id(&document, &config.root_id)?;
        let platform = PlatformAdapter::install(&window)?;

        Ok(Rc::new(Self {
            document,
            root,
            api: Rc::new(ApiClient::new(&config)),
            config,
            state: RefCell::new(AppState::default()),
            view: RefCell::new(None),
            _platform: platform,
        }))
    }

    pub fn start(self: &Rc<Self>) -> Result<(), JsValue> {
        self.show_current()
    }

    /// Mount the view that matches the current app state
    fn show_current(self: &Rc<Self>) -> Result<(), JsValue> {
        let session = self.state.borrow().session().cloned();
        match session {
            Some(session) => self.show_chat(session),
            None => self.show_setup(),
        }
    }

    fn show_setup(self: &Rc<Self>) -> Result<(), JsValue> {
        let app = Rc::downgrade(self);
        let on_created: SessionCreated = Rc::new(move |session| {
            if let Some(app) = app.upgrade() {
                app.session_created(session);
            }
        });

        let view = SessionSetupView::mount(&self.document, &self.root, self.api.clone(), on_created)?;
        self.replace_view(View::Setup(view));
        Ok(())
    }

    fn show_chat(self: &Rc<Self>, session: Session) -> Result<(), JsValue> {
        let app = Rc::downgrade(self);
        let on_closed: SessionClosed = Rc::new(move || {
            if let Some(app) = app.upgrade() {
                app.session_closed();
            }
        });

        let view = ChatView::mount(
            &self.document,
            &self.root,
            self.api.clone(),
            &self.config,
            session,
            on_closed,
        )?;
        self.replace_view(View::Chat(view));
        Ok(())
    }

    fn session_created(self: &Rc<Self>, session: Session) {
        log::info!(
            "Starting chat for session {} as {}",
            session.session_id,
            session.user_id
        );
        self.state.borrow_mut().session_created(session);
        if let Err(e) = self.show_current() {
            log::error!("Failed to open chat: {:?}", e);
        }
    }

    fn session_closed(self: &Rc<Self>) {
        self.state.borrow_mut().session_closed();
        if let Err(e) = self.show_current() {
            log::error!("Failed to show setup form: {:?}", e);
        }
    }

    fn replace_view(&self, view: View) {
        let previous = self.view.borrow_mut().replace(view);
        // Dropped outside the borrow: tearing down a chat view may close its socket
        drop(previous);
    }
}
