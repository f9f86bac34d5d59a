/// Socket scheme matching the page scheme
pub fn socket_scheme(page_protocol: &str) -> &'static str {
    if page_protocol == "https:" {
        "wss:"
    } else {
        "ws:"
    }
}

/// Socket URL for a session. Query values are inserted as given; the browser
/// layer encodes them first.
pub fn socket_url(
    page_protocol: &str,
    host: &str,
    ws_path: &str,
    session_id: &str,
    user_id: &str,
) -> String {
    format!(
        "{}//{}{}?session_id={}&user_id={}",
        socket_scheme(page_protocol),
        host,
        ws_path,
        session_id,
        user_id
    )
}

/// Join the API base and an endpoint path without doubling slashes
pub fn api_url(api_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
