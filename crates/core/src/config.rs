//! Client connection configuration
//!
//! A [`Config`] holds the credentials and transport settings for one client.
//! It is replaced through [`ConfigUpdate`] values that are merged field by
//! field: fields left as `None` keep their previous value, and the nested
//! request options are merged the same way instead of being replaced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Per-request transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Request timeout in milliseconds, covering connect through body
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Connection and authentication settings for a client
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret used as the HMAC key
    pub key: Option<String>,

    /// Name of the upload account key
    pub key_name: Option<String>,

    /// Storage host name, e.g. `example-nsu.akamaihd.net`
    pub host: Option<String>,

    /// Use https instead of http
    #[serde(default)]
    pub use_tls: bool,

    /// Append response bodies to protocol error messages
    #[serde(default)]
    pub verbose: bool,

    /// Transport settings
    #[serde(default)]
    pub request: RequestOptions,
}

// The key never shows up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_name", &self.key_name)
            .field("host", &self.host)
            .field("use_tls", &self.use_tls)
            .field("verbose", &self.verbose)
            .field("request", &self.request)
            .finish()
    }
}

/// Partial update of [`RequestOptions`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptionsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Partial update of [`Config`]; unset fields keep their current value
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_tls: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestOptionsUpdate>,
}

impl fmt::Debug for ConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigUpdate")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_name", &self.key_name)
            .field("host", &self.host)
            .field("use_tls", &self.use_tls)
            .field("verbose", &self.verbose)
            .field("request", &self.request)
            .finish()
    }
}

impl ConfigUpdate {
    /// Set the HMAC key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the key name
    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    /// Set the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Enable or disable https
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = Some(use_tls);
        self
    }

    /// Enable or disable verbose error messages
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set the request timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request = Some(RequestOptionsUpdate {
            timeout_ms: Some(timeout_ms),
        });
        self
    }
}

/// Borrowed view of the settings every signed request needs
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub key: &'a str,
    pub key_name: &'a str,
    pub host: &'a str,
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial update into this configuration
    pub fn merge(&mut self, update: ConfigUpdate) {
        if let Some(key) = update.key {
            self.key = Some(key);
        }
        if let Some(key_name) = update.key_name {
            self.key_name = Some(key_name);
        }
        if let Some(host) = update.host {
            self.host = Some(host);
        }
        if let Some(use_tls) = update.use_tls {
            self.use_tls = use_tls;
        }
        if let Some(verbose) = update.verbose {
            self.verbose = verbose;
        }
        if let Some(request) = update.request {
            self.request.merge(request);
        }
    }

    /// Return a copy with `update` merged on top
    pub fn merged(&self, update: ConfigUpdate) -> Self {
        let mut config = self.clone();
        config.merge(update);
        config
    }

    /// Host, or a configuration error when unset
    pub fn host(&self) -> Result<&str> {
        required(self.host.as_deref(), "host")
    }

    /// Resolve the credentials required to sign a request
    ///
    /// Fails with [`Error::Config`] naming the first missing field.
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        Ok(Credentials {
            key: required(self.key.as_deref(), "key")?,
            key_name: required(self.key_name.as_deref(), "key_name")?,
            host: self.host()?,
        })
    }
}

impl RequestOptions {
    /// Merge a partial update into these options
    pub fn merge(&mut self, update: RequestOptionsUpdate) {
        if let Some(timeout_ms) = update.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Config(format!("'{field}' is not set"))),
    }
}
