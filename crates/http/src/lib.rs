//! ns-http: reqwest transport for the ns client
//!
//! This crate provides the implementation of the ns-core `Transport` trait
//! using reqwest. It is the only crate that depends on an HTTP library.

pub mod transport;

pub use transport::HttpTransport;

/// Client type used with the reqwest transport
pub type Client = ns_core::NetStorage<HttpTransport>;

/// Create a client configured from `update`
pub fn connect(update: ns_core::ConfigUpdate) -> ns_core::Result<Client> {
    Ok(ns_core::NetStorage::with_config(HttpTransport::new()?, update))
}
