use std::cell::RefCell;
use std::rc::Rc;

use medseek_chat::{SetupForm, SetupState};
use medseek_types::{Session, Specialty};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::api::ApiClient;
use crate::dom::{self, EventListener};
use crate::utils::escape_html;

/// Called with the new session once the backend has created it
pub type SessionCreated = Rc<dyn Fn(Session)>;

pub struct SessionSetupView {
    _listeners: Vec<EventListener>,
}

impl SessionSetupView {
    pub fn mount(
        document: &Document,
        root: &Element,
        api: Rc<ApiClient>,
        on_created: SessionCreated,
    ) -> Result<Self, JsValue> {
        root.set_inner_html(&render_form());
        let state = Rc::new(RefCell::new(SetupState::default()));
        render_state(document, &state.borrow())?;
        render_description(document)?;

        let mut listeners = Vec::new();

        let form = dom::get_element_by_id(document, "setupForm")?;
        {
            let document = document.clone();
            listeners.push(EventListener::new(form.as_ref(), "submit", move |event| {
                event.prevent_default();
                let document = document.clone();
                let api = api.clone();
                let state = state.clone();
                let on_created = on_created.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = submit_handler(document, api, state, on_created).await {
                        log::error!("Failed to submit setup form: {:?}", e);
                    }
                });
            })?);
        }

        let select = dom::get_select_by_id(document, "specialtySelect")?;
        {
            let document = document.clone();
            listeners.push(EventListener::new(select.as_ref(), "change", move |_| {
                if let Err(e) = render_description(&document) {
                    log::error!("Failed to update specialty description: {:?}", e);
                }
            })?);
        }

        Ok(Self {
            _listeners: listeners,
        })
    }
}

async fn submit_handler(
    document: Document,
    api: Rc<ApiClient>,
    state: Rc<RefCell<SetupState>>,
    on_created: SessionCreated,
) -> Result<(), JsValue> {
    let form = read_form(&document)?;

    let request = state.borrow_mut().submit(&form);
    render_state(&document, &state.borrow())?;
    let Some(request) = request else {
        return Ok(());
    };

    log::info!("Creating session for {}", request.user_id);
    let result = api.create_session(&request).await;

    let session = state.borrow_mut().finish(&request, result);
    match session {
        Some(session) => on_created(session),
        None => render_state(&document, &state.borrow())?,
    }

    Ok(())
}

fn read_form(document: &Document) -> Result<SetupForm, JsValue> {
    let name = dom::get_input_by_id(document, "userName")?.value();
    let contact = dom::get_input_by_id(document, "userContact")?.value();
    let specialty = selected_specialty(document)?;

    Ok(SetupForm {
        name,
        contact,
        specialty,
    })
}

fn selected_specialty(document: &Document) -> Result<Specialty, JsValue> {
    let value = dom::get_select_by_id(document, "specialtySelect")?.value();
    Ok(Specialty::from_key(&value).unwrap_or_default())
}

fn render_state(document: &Document, state: &SetupState) -> Result<(), JsValue> {
    let busy = state.is_busy();

    dom::get_input_by_id(document, "userName")?.set_disabled(busy);
    dom::get_input_by_id(document, "userContact")?.set_disabled(busy);
    dom::get_select_by_id(document, "specialtySelect")?.set_disabled(busy);

    let button = dom::get_button_by_id(document, "startButton")?;
    button.set_disabled(busy);
    button.set_text_content(Some(if busy {
        "Creating Session..."
    } else {
        "Start Consultation"
    }));

    let error = dom::get_html_element_by_id(document, "setupError")?;
    match state.error() {
        Some(message) => {
            dom::set_text_content(&error, message);
            dom::show_element(&error);
        }
        None => {
            dom::set_text_content(&error, "");
            dom::hide_element(&error);
        }
    }

    Ok(())
}

fn render_description(document: &Document) -> Result<(), JsValue> {
    let info = selected_specialty(document)?.info();
    let description = dom::get_element_by_id(document, "specialtyDescription")?;
    dom::set_text_content(&description, info.description);
    Ok(())
}

fn render_form() -> String {
    let options: String = Specialty::ALL
        .iter()
        .map(|specialty| {
            let info = specialty.info();
            let selected = if *specialty == Specialty::default() {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{}>{} {}</option>"#,
                specialty.as_str(),
                selected,
                info.emoji,
                escape_html(info.title)
            )
        })
        .collect();

    format!(
        r#"
        <div class="session-setup">
          <div class="setup-container">
            <div class="setup-card">
              <h1>MedSeek</h1>
              <p class="subtitle">Online Doctor Consultation</p>
              <form id="setupForm" novalidate>
                <div class="form-group">
                  <label for="userName">Your Name</label>
                  <input type="text" id="userName" placeholder="Enter your full name" autocomplete="name">
                </div>
                <div class="form-group">
                  <label for="userContact">Email or Phone</label>
                  <input type="text" id="userContact" placeholder="Enter your email or phone number" autocomplete="email">
                </div>
                <div class="form-group">
                  <label for="specialtySelect">Department</label>
                  <select id="specialtySelect">{}</select>
                  <p class="specialty-description" id="specialtyDescription"></p>
                </div>
                <div class="error-message" id="setupError"></div>
                <button type="submit" id="startButton" class="start-button">Start Consultation</button>
              </form>
              <div class="info-box">
                <h3>How It Works</h3>
                <ul>
                  <li>Chat with our AI doctor for initial consultation</li>
                  <li>Get medical guidance based on your symptoms</li>
                  <li>Receive recommendations for professional care if needed</li>
                  <li>All conversations are private and secure</li>
                </ul>
              </div>
            </div>
          </div>
        </div>
        "#,
        options
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_lists_every_specialty_with_default_selected() {
        let html = render_form();
        for specialty in Specialty::ALL {
            assert!(html.contains(&format!(r#"value="{}""#, specialty.as_str())));
        }
        assert!(html.contains(r#"<option value="obstetrics" selected>"#));
        assert_eq!(html.matches(" selected>").count(), 1);
    }
}
