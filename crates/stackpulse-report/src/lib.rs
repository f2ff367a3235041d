//! Fact reporting.
//!
//! Turns identity-resolution results into typed [`stackpulse_core::Fact`]
//! records and delivers them to the reporting service in a single batch.

pub mod api;
pub mod hasher;

pub use api::{FactsApi, HttpFactsApi};
pub use hasher::MetaHasher;
