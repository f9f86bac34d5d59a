use wasm_bindgen::JsValue;

/// Get the current page protocol (`http:` or `https:`)
pub fn get_page_protocol() -> String {
    web_sys::window()
        .and_then(|w| w.location().protocol().ok())
        .unwrap_or_else(|| "http:".to_string())
}

/// Get the current host
pub fn get_host() -> Result<String, JsValue> {
    web_sys::window()
        .and_then(|w| w.location().host().ok())
        .ok_or_else(|| JsValue::from_str("Failed to get host"))
}

/// Browser user agent, empty when unavailable
pub fn user_agent() -> String {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default()
}

/// Whether the page runs on an iOS device
pub fn is_ios() -> bool {
    medseek_chat::is_ios(&user_agent())
}

/// Encode a value for use inside a query string
pub fn encode_query_value(value: &str) -> String {
    String::from(js_sys::encode_uri_component(value))
}

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b onclick="x">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
