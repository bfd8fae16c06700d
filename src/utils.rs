//! Utility functions and helpers

use crate::error::{FetchError, Result};
use std::collections::BTreeMap;
use url::form_urlencoded;
use url::Url;

/// URL validation and query string utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Parse an absolute URL, rejecting anything the client cannot request
    pub fn parse_url(input: &str) -> Result<Url> {
        Url::parse(input.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))
    }

    /// Append query parameters after any the URL already carries.
    ///
    /// Existing pairs are left as they are, including duplicates of the
    /// appended keys.
    pub fn append_queries(url: &mut Url, queries: &BTreeMap<String, String>) {
        if queries.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(queries.iter());
    }
}

/// Request body encoding utilities
pub struct BodyUtils;

impl BodyUtils {
    /// Encode pairs as `application/x-www-form-urlencoded`
    pub fn encode_form(fields: &BTreeMap<String, String>) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish()
    }

    /// Join cookies into a single `Cookie` header value, after `existing` if
    /// one was already set.
    ///
    /// Names must be tokens and values cookie-octets (RFC 6265), so a value
    /// can never close its pair and start another.
    pub fn cookie_header(
        cookies: &BTreeMap<String, String>,
        existing: Option<&str>,
    ) -> Result<Option<String>> {
        let mut pairs = Vec::with_capacity(cookies.len());
        for (name, value) in cookies {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(FetchError::InvalidHeader(format!(
                    "Invalid cookie name '{}'",
                    name
                )));
            }
            if !is_cookie_value(value) {
                return Err(FetchError::InvalidHeader(format!(
                    "Invalid value for cookie '{}'",
                    name
                )));
            }
            pairs.push(format!("{}={}", name, value));
        }
        let joined = pairs.join("; ");

        Ok(
            match (existing.map(str::trim).filter(|e| !e.is_empty()), joined.is_empty()) {
                (_, true) => None,
                (Some(existing), false) => Some(format!("{}; {}", existing, joined)),
                (None, false) => Some(joined),
            },
        )
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

fn is_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner.bytes().all(is_cookie_octet)
}
