//! Synthetic document corpus
//!
//! This crate provides:
//!
//! - [`DocumentGenerator`]: text payloads of an exact byte size
//! - [`SyntheticCorpus`]: the `CorpusBuilder` that stages one document per
//!   size class for every session

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generator;
pub mod staging;

pub use generator::{DocumentGenerator, VOCABULARY};
pub use staging::{prepare_staging_area, SyntheticCorpus, DEFAULT_SIZE_CLASSES};
