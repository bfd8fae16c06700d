//! HTTP client module
//!
//! [`RequestBuilder`] collects the request settings and sends them through a
//! [`Transport`]; the result comes back as a fully read [`Response`].

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION};
use reqwest::Request;
use url::Url;

pub mod auth;
pub mod request;
pub mod response;
pub mod transport;

pub use request::{Body, JsonBody, RequestBuilder};
pub use response::{Response, ResponseInfo};
pub use transport::Transport;

fn log_request(request: &Request) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let url = request.url();
    log::debug!("> {} {}", request.method(), request_path(url));

    if let Some(host) = url.host_str() {
        match url.port() {
            Some(port) => log::debug!("> Host: {}:{}", host, port),
            None => log::debug!("> Host: {}", host),
        }
    }

    for (name, value) in request.headers().iter() {
        log::debug!("> {}: {}", name, loggable_value(name, value));
    }
}

/// Header value as it may appear in logs; credentials are masked.
fn loggable_value<'a>(name: &HeaderName, value: &'a HeaderValue) -> &'a str {
    if value.is_sensitive() || [AUTHORIZATION, PROXY_AUTHORIZATION, COOKIE].contains(name) {
        return "<redacted>";
    }
    value.to_str().unwrap_or("<non-utf8>")
}

fn request_path(url: &Url) -> String {
    match url[url::Position::BeforePath..].trim() {
        "" => "/".to_string(),
        path => path.to_string(),
    }
}
