//! Named storage operations
//!
//! [`NetStorage`] owns its [`Config`] and a [`Transport`]. Each operation is a
//! fixed method and action preset over the dispatcher.

use jiff::Timestamp;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{Config, ConfigUpdate};
use crate::dispatch::{RequestParams, Response, dispatch, dispatch_to};
use crate::error::{Error, Result};
use crate::signer::QueryParams;
use crate::transport::{Method, Transport};

/// Client for a NetStorage-style storage API
#[derive(Debug, Clone)]
pub struct NetStorage<T> {
    config: Config,
    transport: T,
}

impl<T: Transport> NetStorage<T> {
    /// Create a client with the default configuration
    pub fn new(transport: T) -> Self {
        Self {
            config: Config::default(),
            transport,
        }
    }

    /// Create a client with `update` merged over the defaults
    pub fn with_config(transport: T, update: ConfigUpdate) -> Self {
        let mut client = Self::new(transport);
        client.set_config(update);
        client
    }

    /// Merge a partial update into the configuration
    pub fn set_config(&mut self, update: ConfigUpdate) -> &mut Self {
        self.config.merge(update);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Independent copy of this client with `update` applied
    pub fn fork(&self, update: ConfigUpdate) -> Self
    where
        T: Clone,
    {
        Self {
            config: self.config.merged(update),
            transport: self.transport.clone(),
        }
    }

    async fn simple(&self, path: &str, method: Method, query: QueryParams) -> Result<Response> {
        dispatch(
            &self.transport,
            &self.config,
            path,
            RequestParams::new(method, query),
        )
        .await
    }

    /// File or directory metadata
    pub async fn stat(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Get, QueryParams::action("stat"))
            .await
    }

    /// Directory listing
    pub async fn dir(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Get, QueryParams::action("dir"))
            .await
    }

    /// Disk usage of a directory
    pub async fn du(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Get, QueryParams::action("du"))
            .await
    }

    /// Delete a file or symlink
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Put, QueryParams::action("delete"))
            .await
    }

    /// Create a directory
    pub async fn mkdir(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Put, QueryParams::action("mkdir"))
            .await
    }

    /// Remove an empty directory
    pub async fn rmdir(&self, path: &str) -> Result<Response> {
        self.simple(path, Method::Put, QueryParams::action("rmdir"))
            .await
    }

    /// Rename `from` to `to`
    pub async fn rename(&self, from: &str, to: &str) -> Result<Response> {
        let query = QueryParams::action("rename").with("destination", to);
        self.simple(from, Method::Put, query).await
    }

    /// Create a symlink at `link` pointing to `target`
    pub async fn symlink(&self, target: &str, link: &str) -> Result<Response> {
        let query = QueryParams::action("symlink").with("target", target);
        self.simple(link, Method::Put, query).await
    }

    /// Set the modification time from a textual date
    ///
    /// Accepts an RFC 3339 timestamp or integer unix seconds. Anything else
    /// fails with [`Error::Validation`] before a request is made.
    pub async fn mtime(&self, path: &str, date: &str) -> Result<Response> {
        let timestamp = parse_date(date)?;
        self.mtime_at(path, timestamp).await
    }

    /// Set the modification time
    pub async fn mtime_at(&self, path: &str, date: Timestamp) -> Result<Response> {
        let query = QueryParams::action("mtime").with("mtime", date.as_second());
        self.simple(path, Method::Put, query).await
    }

    /// Upload `reader` to `path`, streaming it as the request body
    pub async fn upload<R>(&self, reader: R, path: &str) -> Result<Response>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let query = QueryParams::action("upload").with("upload-type", "binary");
        let params = RequestParams::new(Method::Put, query).body(Box::new(reader));
        dispatch(&self.transport, &self.config, path, params).await
    }

    /// Download `path`, streaming the body into `sink`
    pub async fn download<W>(&self, path: &str, sink: &mut W) -> Result<Response>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let params = RequestParams::new(Method::Get, QueryParams::action("download"));
        dispatch_to(&self.transport, &self.config, path, params, sink).await
    }

    /// Whether `path` exists
    ///
    /// A 404 from `stat` means `false`; any other error propagates.
    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        match self.stat(path).await {
            Ok(response) => Ok(response
                .document()
                .and_then(|doc| doc.get("stat"))
                .is_some_and(|stat| !stat.entries("file").is_empty())),
            Err(err) if err.status() == Some(404) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn parse_date(date: &str) -> Result<Timestamp> {
    let date = date.trim();
    if let Ok(seconds) = date.parse::<i64>() {
        return Timestamp::from_second(seconds)
            .map_err(|e| Error::Validation(format!("Invalid date '{date}': {e}")));
    }
    date.parse::<Timestamp>()
        .map_err(|_| Error::Validation(format!("Invalid date '{date}': expected RFC 3339 or unix seconds")))
}
