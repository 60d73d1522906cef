//! HTTP adapters for patchsync.
//!
//! Implements the core ports on top of reqwest:
//! - [`HttpTransfer`] streams one file per call for the download coordinator
//! - [`HttpManifestSource`] and [`FileManifestSource`] fetch manifest documents
//!
//! Transient failures (5xx, connection errors) are retried with
//! exponential backoff. Client errors fail fast.

#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod source;
mod transfer;

#[cfg(test)]
mod test_server;

pub use client::{HttpClient, parse_url};
pub use config::{HttpConfig, USER_AGENT};
pub use error::{HttpError, HttpResult};
pub use source::{FileManifestSource, HttpManifestSource, is_remote, source_for};
pub use transfer::HttpTransfer;
