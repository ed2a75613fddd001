//! Injection of evaluated config into template HTML.
//!
//! # Responsibilities
//! - Serialize the payload as script-safe JSON
//! - Insert the config script before `</head>`, or prepend it
//! - Set content type and cache policy headers
//!
//! # Design Decisions
//! - `<`, `>`, `&`, U+2028 and U+2029 are emitted as `\uXXXX` escapes; they can
//!   only occur inside JSON strings, so the script text still parses to the
//!   original payload
//! - Responses are visitor-specific, so shared caches must not store them

use axum::http::{header, HeaderMap, HeaderValue};

use crate::remote_config::EvaluatedConfig;

/// Global holding the evaluated config on the page.
pub const CONFIG_GLOBAL: &str = "window.__QS_RC__";

/// Global tagging where the config came from.
pub const SOURCE_GLOBAL: &str = "window.__QS_RC_SOURCE__";

/// Value of `SOURCE_GLOBAL` for server-evaluated config.
pub const SOURCE_TAG: &str = "server-template";

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const CACHE_POLICY: &str = "private, no-cache, max-age=0, must-revalidate";

/// Serialize `config` for embedding inside a `<script>` element.
pub fn script_safe_json(config: &EvaluatedConfig) -> String {
    let json = serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string());
    let mut out = String::with_capacity(json.len() + 16);
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// The `<script>` block carrying the config.
pub fn config_script(config: &EvaluatedConfig) -> String {
    format!(
        "<script>{SOURCE_GLOBAL}=\"{SOURCE_TAG}\";{CONFIG_GLOBAL}={};</script>",
        script_safe_json(config)
    )
}

/// Inject `config` into `html`. Without config the HTML is returned as is.
pub fn compose(html: String, config: Option<&EvaluatedConfig>) -> String {
    let Some(config) = config else {
        return html;
    };
    let script = config_script(config);

    match find_head_close(&html) {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..at]);
            out.push_str(&script);
            out.push_str(&html[at..]);
            out
        }
        None => script + &html,
    }
}

/// Byte offset of the first `</head>`, ignoring ASCII case.
fn find_head_close(html: &str) -> Option<usize> {
    const NEEDLE: &[u8] = b"</head>";
    html.as_bytes()
        .windows(NEEDLE.len())
        .position(|w| w.eq_ignore_ascii_case(NEEDLE))
}

/// Set the headers every served page carries.
pub fn apply_page_headers(headers: &mut HeaderMap, body_len: usize) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_POLICY));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
}
