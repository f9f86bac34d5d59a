use pulldown_cmark::{html, Event, Options, Parser};

/// Render doctor replies (markdown) to HTML. Raw HTML in the reply is escaped.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Render message text: markdown for the doctor, escaped text with line breaks otherwise
pub fn render_message_content(content: &str, use_markdown: bool) -> String {
    if use_markdown {
        render_markdown(content)
    } else {
        crate::utils::escape_html(content).replace('\n', "<br>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown() {
        let md = "## Advice\n\nDrink **plenty** of water.\n\n- rest\n- fluids";
        let html = render_markdown(md);
        assert!(html.contains("<h2>"));
        assert!(html.contains("<strong>plenty</strong>"));
        assert!(html.contains("<li>rest</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_plain_content_keeps_line_breaks() {
        assert_eq!(
            render_message_content("a < b\nsecond line", false),
            "a &lt; b<br>second line"
        );
    }
}
