//! Randomization identity resolution.
//!
//! # Responsibilities
//! - Parse the request `Cookie` header
//! - Return the visitor's existing randomization id, or issue a new one
//!   with a long-lived `Set-Cookie`
//!
//! # Design Decisions
//! - An existing non-empty id is never overwritten or rotated
//! - Cookie values are percent-decoded; undecodable values are kept raw

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, HeaderValue};
use percent_encoding::percent_decode_str;
use uuid::Uuid;

use crate::config::schema::IdentityConfig;
use crate::observability::metrics;

/// Default cookie carrying the randomization id.
pub const RANDOMIZATION_COOKIE: &str = "qs_rcid";

/// Default cookie lifetime: 400 days.
pub const RANDOMIZATION_MAX_AGE_SECS: u64 = 400 * 24 * 60 * 60;

/// Parse a `Cookie` header value into name -> decoded value.
///
/// Entries without `=` or with an empty name are skipped. The first
/// occurrence of a name wins.
pub fn parse_cookies(raw: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in raw.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || cookies.contains_key(name) {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        let decoded = percent_decode_str(value)
            .decode_utf8()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        cookies.insert(name.to_string(), decoded);
    }
    cookies
}

/// Collect cookies from every `Cookie` header on the request.
///
/// Headers are read lossily: a cookie carrying raw non-ASCII bytes only
/// garbles its own value, never its neighbours.
pub fn request_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for value in headers.get_all(header::COOKIE) {
        let raw = String::from_utf8_lossy(value.as_bytes());
        for (name, value) in parse_cookies(&raw) {
            cookies.entry(name).or_insert(value);
        }
    }
    cookies
}

/// Issues and reads the randomization cookie.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    cookie_name: String,
    max_age_secs: u64,
}

impl IdentityResolver {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
        }
    }

    /// Return the visitor's randomization id, issuing one if absent.
    ///
    /// A `Set-Cookie` header is appended to `response_headers` only when a new
    /// id is issued.
    pub fn ensure_identity(&self, request_headers: &HeaderMap, response_headers: &mut HeaderMap) -> String {
        if let Some(existing) = request_cookies(request_headers).remove(&self.cookie_name) {
            if !existing.is_empty() {
                return existing;
            }
        }

        let id = Uuid::new_v4().to_string();
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax; Secure",
            self.cookie_name, id, self.max_age_secs
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response_headers.append(header::SET_COOKIE, value);
                metrics::record_identity_issued();
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode randomization cookie"),
        }
        id
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(&IdentityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("qs_rcid=abc; theme=dark;  lang = en-US ");
        assert_eq!(cookies["qs_rcid"], "abc");
        assert_eq!(cookies["theme"], "dark");
        assert_eq!(cookies["lang"], "en-US");
    }

    #[test]
    fn test_parse_cookies_skips_malformed() {
        let cookies = parse_cookies("novalue; =orphan; ok=1;;");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["ok"], "1");
    }

    #[test]
    fn test_parse_cookies_decodes_values() {
        let cookies = parse_cookies("name=J%C3%BCrgen%20K; quoted=\"a%3Db\"; bad=%FF%FE; eq=a=b");
        assert_eq!(cookies["name"], "Jürgen K");
        assert_eq!(cookies["quoted"], "a=b");
        assert_eq!(cookies["bad"], "%FF%FE");
        assert_eq!(cookies["eq"], "a=b");
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(parse_cookies("a=1; a=2")["a"], "1");
    }

    #[test]
    fn test_existing_identity_returned_unchanged() {
        let resolver = IdentityResolver::default();
        let request = with_cookie("theme=dark; qs_rcid=visitor-123");
        let mut response = HeaderMap::new();

        assert_eq!(resolver.ensure_identity(&request, &mut response), "visitor-123");
        assert!(response.get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_new_identity_issued() {
        let resolver = IdentityResolver::default();
        let mut response = HeaderMap::new();

        let id = resolver.ensure_identity(&HeaderMap::new(), &mut response);
        assert!(Uuid::parse_str(&id).is_ok());
        let cookie = response.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(
            cookie,
            format!("qs_rcid={id}; Path=/; Max-Age=34560000; SameSite=Lax; Secure")
        );
    }

    #[test]
    fn test_empty_identity_is_replaced() {
        let resolver = IdentityResolver::default();
        let mut response = HeaderMap::new();

        let id = resolver.ensure_identity(&with_cookie("qs_rcid="), &mut response);
        assert!(!id.is_empty());
        assert!(response.get(header::SET_COOKIE).is_some());
    }

    #[test]
    fn test_ensure_identity_is_idempotent() {
        let resolver = IdentityResolver::default();
        let mut first_response = HeaderMap::new();
        let issued = resolver.ensure_identity(&HeaderMap::new(), &mut first_response);

        let request = with_cookie(&format!("qs_rcid={issued}"));
        for _ in 0..2 {
            let mut response = HeaderMap::new();
            assert_eq!(resolver.ensure_identity(&request, &mut response), issued);
            assert!(response.is_empty());
        }
    }

    #[test]
    fn test_non_ascii_neighbour_keeps_identity() {
        let resolver = IdentityResolver::default();
        let mut request = HeaderMap::new();
        request.insert(
            header::COOKIE,
            HeaderValue::from_bytes("qs_rcid=visitor-123; name=Jürgen".as_bytes()).unwrap(),
        );
        assert!(request[header::COOKIE].to_str().is_err());
        let mut response = HeaderMap::new();

        assert_eq!(resolver.ensure_identity(&request, &mut response), "visitor-123");
        assert!(response.get(header::SET_COOKIE).is_none());
        assert_eq!(request_cookies(&request)["name"], "Jürgen");
    }

    #[test]
    fn test_multiple_cookie_headers_merge() {
        let resolver = IdentityResolver::default();
        let mut request = HeaderMap::new();
        request.append(header::COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        request.append(header::COOKIE, HeaderValue::from_bytes(b"caf\xe9=1; qs_rcid=visitor-9").unwrap());
        request.append(header::COOKIE, HeaderValue::from_static("qs_rcid=later; lang=fr"));

        let cookies = request_cookies(&request);
        assert_eq!(cookies["theme"], "dark");
        assert_eq!(cookies["lang"], "en");
        assert_eq!(cookies["qs_rcid"], "visitor-9");

        for _ in 0..2 {
            let mut response = HeaderMap::new();
            assert_eq!(resolver.ensure_identity(&request, &mut response), "visitor-9");
            assert!(response.is_empty());
        }
    }

    #[test]
    fn test_default_max_age() {
        assert_eq!(RANDOMIZATION_MAX_AGE_SECS, 34_560_000);
        assert_eq!(IdentityConfig::default().max_age_secs, RANDOMIZATION_MAX_AGE_SECS);
        assert_eq!(IdentityConfig::default().cookie_name, RANDOMIZATION_COOKIE);
    }
}
