//! HTTP response handling

use std::collections::HashMap;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{StatusCode, Version};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::Result;

/// Transport metadata of a completed response
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub version: Version,
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
}

/// A completed response with parsed headers and a fully read body
#[derive(Debug, Clone)]
pub struct Response {
    raw: ResponseInfo,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    /// Consume a transport response, reading its body to the end.
    ///
    /// The body stream belongs to `response` and is released when it is
    /// dropped, whether reading succeeds or fails.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let raw = ResponseInfo {
            version: response.version(),
            status: response.status(),
            url: response.url().clone(),
            headers: response.headers().clone(),
        };
        let headers = parse_headers(&raw.headers);
        let body = response.bytes().await?.to_vec();

        Ok(Self { raw, headers, body })
    }

    pub fn raw(&self) -> &ResponseInfo {
        &self.raw
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }

    pub fn version(&self) -> Version {
        self.raw.version
    }

    /// Final URL, after any redirects the client followed
    pub fn url(&self) -> &Url {
        &self.raw.url
    }

    pub fn is_success(&self) -> bool {
        self.raw.status.is_success()
    }

    /// Headers keyed by lower-case name
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body decoded with the charset declared in `Content-Type`, UTF-8 otherwise
    pub fn text(&self) -> String {
        decode_body_with_charset(&self.body, self.content_type())
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Re-indent a JSON body for display
    pub fn json_pretty(&self) -> Result<String> {
        let value: Value = serde_json::from_slice(&self.body)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

fn parse_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut parsed: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match parsed.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                parsed.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }
    parsed
}

fn extract_charset(content_type: Option<&str>) -> Option<String> {
    content_type?
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

fn decode_body_with_charset(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = extract_charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}
