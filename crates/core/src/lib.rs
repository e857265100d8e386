//! ns-core: Core library for the ns NetStorage client
//!
//! This crate provides:
//! - Client configuration with partial, deep-merged updates
//! - Request signing (nonce, auth-data line, HMAC-SHA256 signature)
//! - URI construction
//! - XML response normalization
//! - Request dispatch and the named storage operations
//! - Settings file and profile management for the CLI
//!
//! Networking goes through the [`Transport`] trait, so the crate does not
//! depend on any HTTP library.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod nonce;
pub mod profile;
pub mod settings;
pub mod signer;
pub mod transport;
pub mod uri;
pub mod xml;

pub use client::NetStorage;
pub use config::{Config, ConfigUpdate, Credentials, RequestOptions, RequestOptionsUpdate};
pub use dispatch::{RequestParams, Response, dispatch, dispatch_to};
pub use error::{Error, Result};
pub use nonce::next_nonce;
pub use profile::{Profile, ProfileManager};
pub use settings::{Settings, SettingsManager};
pub use signer::{AuthHeaders, QueryParams, build_auth_headers};
pub use transport::{BodyReader, HttpRequest, HttpResponse, Method, Transport};
pub use uri::build_uri;
pub use xml::{Attributes, Child, Document, Element, XmlElement, normalize, parse_document};
