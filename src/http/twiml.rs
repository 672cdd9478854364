//! Twilio messaging response envelope.

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Wrap `body` in a TwiML response holding a single message
pub fn message(body: &str) -> String {
    format!(
        "{XML_DECLARATION}<Response><Message><Body>{}</Body></Message></Response>",
        escape_text(body)
    )
}

/// Escape XML character data
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
