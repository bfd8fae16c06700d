//! Transport executors
//!
//! A [`Transport`] turns a realized `reqwest::Request` into a
//! `reqwest::Response`. Builders either share one executor or build a fresh
//! client per send from a [`ClientConfig`].

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::{Client, Request, Response};

use crate::config::ClientConfig;
use crate::error::Result;

/// Executes realized requests.
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> BoxFuture<'_, reqwest::Result<Response>>;
}

impl Transport for Client {
    fn execute(&self, request: Request) -> BoxFuture<'_, reqwest::Result<Response>> {
        Client::execute(self, request).boxed()
    }
}

/// Where a builder gets its executor from on each send.
#[derive(Clone)]
pub(crate) enum TransportSource {
    /// A new client per send, nothing pooled between sends.
    PerSend(ClientConfig),
    Shared(Arc<dyn Transport>),
}

impl TransportSource {
    pub(crate) fn resolve(&self) -> Result<Arc<dyn Transport>> {
        match self {
            TransportSource::PerSend(config) => Ok(Arc::new(config.build_client()?)),
            TransportSource::Shared(transport) => Ok(Arc::clone(transport)),
        }
    }
}

impl Default for TransportSource {
    fn default() -> Self {
        TransportSource::PerSend(ClientConfig::default())
    }
}

impl fmt::Debug for TransportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportSource::PerSend(config) => f.debug_tuple("PerSend").field(config).finish(),
            TransportSource::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}
