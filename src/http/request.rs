//! Chainable request builder

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::{Client, Request};
use serde::Serialize;

use super::auth::Auth;
use super::log_request;
use super::response::Response;
use super::transport::{Transport, TransportSource};
use crate::config::{ClientConfig, HttpMethod};
use crate::error::{FetchError, Result};
use crate::utils::{BodyUtils, UrlUtils};

/// Payload sent with POST and PUT requests.
///
/// JSON and form payloads share one slot; whichever was set last is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(JsonBody),
    Form(BTreeMap<String, String>),
}

/// A value already run through `serde_json`.
///
/// Encoding happens when the body is set so the caller's value need not be
/// kept around; a failure is held and reported when the request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    Encoded(Vec<u8>),
    Rejected(String),
}

/// Accumulates request settings and sends them.
///
/// Every setter overwrites its field and hands the builder back, so calls
/// chain. Settings survive a send, so the same builder can be sent again.
///
/// ```no_run
/// # async fn demo() -> fetchkit::Result<()> {
/// use fetchkit::http::RequestBuilder;
///
/// let response = RequestBuilder::new()
///     .set_url("https://example.com/items?page=2")
///     .header("Content-Type", "application/json")
///     .query("sort", "name")
///     .set_json(&serde_json::json!({ "name": "widget" }))
///     .post()
///     .await?;
/// println!("{} {}", response.status(), response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<HttpMethod>,
    url: String,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    queries: BTreeMap<String, String>,
    body: Option<Body>,
    transport: TransportSource,
    last_request: Option<Request>,
}

impl RequestBuilder {
    /// An empty builder that creates a fresh client for every send
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh client from `config` on every send
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            transport: TransportSource::PerSend(config),
            ..Self::default()
        }
    }

    /// Send through a shared client, reusing its connection pool
    pub fn with_client(client: Client) -> Self {
        Self::with_transport(Arc::new(client))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: TransportSource::Shared(transport),
            ..Self::default()
        }
    }

    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = Some(method);
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    /// Replace all configured headers
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = collect_pairs(headers);
        self
    }

    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all configured cookies
    pub fn set_cookies<I, K, V>(&mut self, cookies: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.cookies = collect_pairs(cookies);
        self
    }

    pub fn cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Replace all configured query parameters
    pub fn set_queries<I, K, V>(&mut self, queries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.queries = collect_pairs(queries);
        self
    }

    pub fn query(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.queries.insert(name.into(), value.into());
        self
    }

    /// Send `value` as a JSON body, replacing any form body
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        let encoded = match serde_json::to_vec(value) {
            Ok(bytes) => JsonBody::Encoded(bytes),
            Err(err) => JsonBody::Rejected(err.to_string()),
        };
        self.body = Some(Body::Json(encoded));
        self
    }

    /// Send `fields` form-urlencoded, replacing any JSON body
    pub fn set_form<I, K, V>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        self.body = Some(Body::Form(fields));
        self
    }

    /// Add one form field, switching a JSON body over to a form body
    pub fn form_field(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        let (name, value) = (name.into(), value.to_string());
        if let Some(Body::Form(fields)) = &mut self.body {
            fields.insert(name, value);
        } else {
            self.body = Some(Body::Form(BTreeMap::from([(name, value)])));
        }
        self
    }

    pub fn basic_auth(&mut self, username: &str, password: Option<&str>) -> &mut Self {
        self.header(AUTHORIZATION.as_str(), Auth::basic(username, password))
    }

    pub fn bearer_auth(&mut self, token: &str) -> &mut Self {
        self.header(AUTHORIZATION.as_str(), Auth::bearer(token))
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn queries(&self) -> &BTreeMap<String, String> {
        &self.queries
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// The request realized by the most recent send
    pub fn last_request(&self) -> Option<&Request> {
        self.last_request.as_ref()
    }

    pub async fn get(&mut self) -> Result<Response> {
        self.send_with(HttpMethod::Get).await
    }

    pub async fn post(&mut self) -> Result<Response> {
        self.send_with(HttpMethod::Post).await
    }

    pub async fn put(&mut self) -> Result<Response> {
        self.send_with(HttpMethod::Put).await
    }

    pub async fn delete(&mut self) -> Result<Response> {
        self.send_with(HttpMethod::Delete).await
    }

    pub async fn patch(&mut self) -> Result<Response> {
        self.send_with(HttpMethod::Patch).await
    }

    /// Send with the configured method and URL
    pub async fn send(&mut self) -> Result<Response> {
        require_url(&self.url)?;
        let method = self.method.ok_or(FetchError::MissingMethod)?;
        self.send_with(method).await
    }

    /// Send to `url` with a method given by name, e.g. `"POST"`
    pub async fn send_to(&mut self, url: &str, method: &str) -> Result<Response> {
        require_url(url)?;
        let method: HttpMethod = method.parse()?;
        self.dispatch(url, method).await
    }

    /// Run a send to completion outside of any async runtime.
    ///
    /// Fails with [`FetchError::Internal`] when called from within a Tokio
    /// runtime, where blocking would stall the executor.
    pub fn send_blocking(&mut self, method: HttpMethod) -> Result<Response> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(FetchError::Internal(
                "send_blocking called from within an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Internal(format!("Failed to create async runtime: {}", e)))?;

        runtime.block_on(self.send_with(method))
    }

    /// Realize the transport request for `url` without sending it
    pub fn prepare(&self, url: &str, method: HttpMethod) -> Result<Request> {
        require_url(url)?;

        let body = if method.carries_body() {
            self.encode_body()?
        } else {
            None
        };

        let target = UrlUtils::parse_url(url)?;
        let mut request = Request::new(method.as_reqwest(), target);
        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }

        self.apply_headers(request.headers_mut())?;
        self.apply_cookies(request.headers_mut())?;
        UrlUtils::append_queries(request.url_mut(), &self.queries);

        Ok(request)
    }

    async fn send_with(&mut self, method: HttpMethod) -> Result<Response> {
        let url = self.url.clone();
        self.dispatch(&url, method).await
    }

    /// Sends, turning a panic anywhere below into [`FetchError::Internal`].
    async fn dispatch(&mut self, url: &str, method: HttpMethod) -> Result<Response> {
        match AssertUnwindSafe(self.execute(url, method))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&*panic);
                log::error!("{} {} aborted: {}", method, url, message);
                Err(FetchError::Internal(message))
            }
        }
    }

    async fn execute(&mut self, url: &str, method: HttpMethod) -> Result<Response> {
        let request = self.prepare(url, method)?;
        self.last_request = request.try_clone();

        let transport = self.transport.resolve()?;
        log_request(&request);

        let response = transport.execute(request).await.map_err(|err| {
            log::debug!("{} {} failed: {}", method, url, err);
            FetchError::Transport(err)
        })?;

        Response::read(response).await
    }

    fn encode_body(&self) -> Result<Option<Vec<u8>>> {
        match &self.body {
            None => Ok(None),
            Some(Body::Json(JsonBody::Encoded(bytes))) => Ok(Some(bytes.clone())),
            Some(Body::Json(JsonBody::Rejected(message))) => {
                Err(FetchError::Serialization(message.clone()))
            }
            Some(Body::Form(fields)) => Ok(Some(BodyUtils::encode_form(fields).into_bytes())),
        }
    }

    fn apply_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.trim().as_bytes())
                .map_err(|e| FetchError::InvalidHeader(format!("'{}': {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::InvalidHeader(format!("'{}': {}", key, e)))?;
            headers.insert(name, value);
        }
        Ok(())
    }

    fn apply_cookies(&self, headers: &mut HeaderMap) -> Result<()> {
        let existing = headers.get(COOKIE).and_then(|v| v.to_str().ok());
        if let Some(cookie) = BodyUtils::cookie_header(&self.cookies, existing)? {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| FetchError::InvalidHeader(format!("'Cookie': {}", e)))?;
            headers.insert(COOKIE, value);
        }
        Ok(())
    }
}

fn require_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(FetchError::MissingUrl);
    }
    Ok(())
}

fn collect_pairs<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
