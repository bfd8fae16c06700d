//! fetchkit - a fluent HTTP request builder
//!
//! Configure method, URL, headers, cookies, query parameters and a JSON or
//! form body on a [`RequestBuilder`], trigger it with one of the verb
//! methods, and read the parsed [`Response`]. Transport concerns are left to
//! `reqwest`.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod utils;

pub use config::{ClientConfig, HttpMethod};
pub use error::{FetchError, Result};
pub use http::{RequestBuilder, Response};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
