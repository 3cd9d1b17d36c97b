//! docbench-client: HTTP client for document-processing services
//!
//! Implements [`docbench_core::ProcessingClient`] against a service that
//! accepts documents on `POST /process` and answers with a
//! `{success, message, data}` envelope.

#![warn(missing_docs)]

pub mod config;
pub mod http;
pub mod wire;

pub use config::{ClientConfig, ConfigValidationError, SubmitMode};
pub use http::HttpProcessClient;
pub use wire::{ProcessData, ProcessResponse};
