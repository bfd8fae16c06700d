//! Configuration management for fetchkit

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method};

use crate::error::{FetchError, Result};

/// HTTP method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Whether a configured body is attached for this method.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    pub(crate) fn as_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        };
        write!(f, "{}", method)
    }
}

impl FromStr for HttpMethod {
    type Err = FetchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(FetchError::MissingMethod);
        }
        match token.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(FetchError::InvalidMethod(token.to_string())),
        }
    }
}

/// Settings for the client built on every send when no shared transport is
/// injected.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: None,
            connect_timeout: None,
            user_agent: Some(format!("fetchkit/{}", crate::VERSION)),
        }
    }
}

impl ClientConfig {
    /// Build a fresh `reqwest::Client` from this configuration
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder.build().map_err(FetchError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, HttpMethod};
    use crate::error::FetchError;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().expect("get"), HttpMethod::Get);
        assert_eq!(
            " Patch ".parse::<HttpMethod>().expect("patch"),
            HttpMethod::Patch
        );
    }

    #[test]
    fn empty_method_is_missing() {
        let err = "".parse::<HttpMethod>().expect_err("empty");
        assert!(matches!(err, FetchError::MissingMethod));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "BREW".parse::<HttpMethod>().expect_err("unknown");
        assert!(matches!(err, FetchError::InvalidMethod(ref m) if m == "BREW"));
    }

    #[test]
    fn display_round_trips_through_reqwest() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
        ] {
            assert_eq!(method.to_string(), method.as_reqwest().as_str());
        }
    }

    #[test]
    fn only_post_and_put_carry_a_body() {
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
        assert!(!HttpMethod::Patch.carries_body());
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Put.carries_body());
    }

    #[test]
    fn default_config_builds_a_client() {
        let config = ClientConfig::default();
        assert!(config
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.starts_with("fetchkit/")));
        config.build_client().expect("client should build");
    }
}
